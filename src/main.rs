use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sparkify_etl::config;
use sparkify_etl::etl::{run_pipeline, EtlError, OnFileError};
use sparkify_etl::warehouse::SqliteWarehouseStore;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Error reading current directory: {}", e))?;
    Ok(cwd.join(original_path))
}

/// Load the Sparkify song and activity datasets into a SQLite star schema.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override command line values.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite warehouse database file. Created when missing.
    #[clap(long, value_parser = parse_path, default_value = "sparkify.db")]
    pub db_path: PathBuf,

    /// Directory holding the song metadata files.
    #[clap(long, value_parser = parse_path, default_value = "data/song_data")]
    pub song_data: PathBuf,

    /// Directory holding the activity log files.
    #[clap(long, value_parser = parse_path, default_value = "data/log_data")]
    pub log_data: PathBuf,

    /// Extension of the data files.
    #[clap(long, default_value = "json")]
    pub extension: String,

    /// What to do when a file fails to load.
    #[clap(long, value_enum, default_value = "abort")]
    pub on_error: OnFileError,

    /// Commit after this many loaded files.
    #[clap(long, default_value_t = 1)]
    pub commit_every: usize,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_path: args.db_path.clone(),
            song_data: args.song_data.clone(),
            log_data: args.log_data.clone(),
            extension: args.extension.clone(),
            on_error: args.on_error,
            commit_every: args.commit_every,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_path: {:?}", app_config.db_path);
    info!("  song_data: {:?}", app_config.song_data);
    info!("  log_data: {:?}", app_config.log_data);
    info!(
        "  on_error: {:?}, commit_every: {}",
        app_config.on_error, app_config.commit_every
    );

    if !app_config.db_path.exists() {
        info!("Creating new warehouse database at {:?}", app_config.db_path);
    }
    let store = SqliteWarehouseStore::new(&app_config.db_path).map_err(EtlError::Connection)?;

    let summary = run_pipeline(&store, &app_config.etl_settings())?;

    let skipped = summary.songs.skipped.len() + summary.logs.skipped.len();
    if skipped > 0 {
        info!("Done, {} files were skipped", skipped);
    } else {
        info!("Done");
    }
    Ok(())
}
