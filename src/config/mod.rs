mod file_config;

pub use file_config::FileConfig;

use crate::etl::{EtlSettings, LoadOptions, OnFileError};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub extension: String,
    pub on_error: OnFileError,
    pub commit_every: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("sparkify.db"),
            song_data: PathBuf::from("data/song_data"),
            log_data: PathBuf::from("data/log_data"),
            extension: "json".to_string(),
            on_error: OnFileError::Abort,
            commit_every: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub extension: String,
    pub on_error: OnFileError,
    pub commit_every: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let song_data = file
            .song_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data.clone());
        validate_data_dir("song_data", &song_data)?;

        let log_data = file
            .log_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data.clone());
        validate_data_dir("log_data", &log_data)?;

        let extension = file
            .extension
            .unwrap_or_else(|| cli.extension.clone())
            .trim_start_matches('.')
            .to_string();
        if extension.is_empty() {
            bail!("extension must not be empty");
        }

        let on_error = match file.on_error {
            Some(s) => match parse_on_error(&s) {
                Some(policy) => policy,
                None => bail!("Invalid on_error value {:?}, expected \"abort\" or \"skip\"", s),
            },
            None => cli.on_error,
        };

        let commit_every = file.commit_every.unwrap_or(cli.commit_every);
        if commit_every == 0 {
            bail!("commit_every must be at least 1");
        }

        Ok(Self {
            db_path,
            song_data,
            log_data,
            extension,
            on_error,
            commit_every,
        })
    }

    pub fn etl_settings(&self) -> EtlSettings {
        EtlSettings {
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            options: LoadOptions {
                extension: self.extension.clone(),
                on_error: self.on_error,
                commit_every: self.commit_every,
            },
        }
    }
}

fn validate_data_dir(name: &str, dir: &Path) -> Result<()> {
    if !dir.exists() {
        bail!("{} directory does not exist: {:?}", name, dir);
    }
    if !dir.is_dir() {
        bail!("{} is not a directory: {:?}", name, dir);
    }
    Ok(())
}

/// Parses an error policy name, case insensitive.
fn parse_on_error(s: &str) -> Option<OnFileError> {
    OnFileError::from_str(s, true).ok()
}
