use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings read from the optional TOML file. Every value present here wins
/// over the command line.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub db_path: Option<String>,
    pub song_data: Option<String>,
    pub log_data: Option<String>,
    pub extension: Option<String>,
    /// "abort" or "skip"
    pub on_error: Option<String>,
    pub commit_every: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("etl.toml");
        std::fs::write(
            &path,
            r#"
song_data = "/srv/data/song_data"
on_error = "skip"
commit_every = 10
"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();

        assert_eq!(
            config,
            FileConfig {
                song_data: Some("/srv/data/song_data".to_string()),
                on_error: Some("skip".to_string()),
                commit_every: Some(10),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_load_empty_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        assert_eq!(FileConfig::load(&path).unwrap(), FileConfig::default());
    }

    #[test]
    fn test_load_errors() {
        let tmp = TempDir::new().unwrap();

        let missing = FileConfig::load(&tmp.path().join("missing.toml")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read config file"));

        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "commit_every = \"ten\"").unwrap();
        let bad = FileConfig::load(&path).unwrap_err();
        assert!(bad.to_string().contains("Failed to parse config file"));
    }
}
