#![allow(dead_code)]

pub const SONG_1_ID: &str = "SOUPIRU12A6D4FA1E1";
pub const SONG_1_TITLE: &str = "Der Kleine Dompfaff";
pub const ARTIST_1_ID: &str = "ARJIE2Y1187B994AB7";
pub const ARTIST_1_NAME: &str = "Line Renaud";
pub const SONG_1_DURATION: f64 = 152.92036;

pub const SONG_2_ID: &str = "SOCIWDW12A8C13D406";
pub const SONG_2_TITLE: &str = "Soul Deep";
pub const ARTIST_2_ID: &str = "ARMJAGH1187FB546F3";
pub const ARTIST_2_NAME: &str = "The Box Tops";
pub const SONG_2_DURATION: f64 = 148.03546;

/// 2018-11-02 01:25:34.796 UTC
pub const TS_1: i64 = 1541121934796;
pub const TS_1_START_TIME: &str = "2018-11-02 01:25:34.796";
/// 2018-11-02 01:30:34.796 UTC
pub const TS_2: i64 = 1541122234796;
