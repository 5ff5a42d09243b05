use anyhow::{Context, Result};
use clap::Parser;
use songplay_etl::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_DB_PATH, DEFAULT_LOG_DATA, DEFAULT_SONG_DATA,
};
use songplay_etl::pipeline;
use songplay_etl::transform::ArtistNameSource;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "songplay-etl")]
#[command(about = "Load song catalog and activity logs into a SQLite star schema")]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Root of the song catalog tree.
    #[clap(long, default_value = DEFAULT_SONG_DATA, value_parser = parse_path)]
    pub song_data: PathBuf,

    /// Root of the activity log tree.
    #[clap(long, default_value = DEFAULT_LOG_DATA, value_parser = parse_path)]
    pub log_data: PathBuf,

    /// Path to the SQLite warehouse file, created if missing.
    #[clap(long, default_value = DEFAULT_DB_PATH, value_parser = parse_path)]
    pub db: PathBuf,

    /// Drop and recreate all tables before loading.
    #[clap(long, default_value_t = false)]
    pub reset: bool,

    /// Catalog field the artist name is read from.
    #[clap(long, value_enum, default_value_t = ArtistNameSource::Title)]
    pub artist_name_source: ArtistNameSource,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            db_path: self.db.clone(),
            reset: self.reset,
            artist_name_source: self.artist_name_source,
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
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening warehouse at {:?}...", config.db_path);
    if config.reset {
        info!("Resetting warehouse tables");
    }

    let summary = pipeline::run(&config)
        .with_context(|| format!("Load into {:?} failed", config.db_path))?;

    info!("");
    info!("Load Summary");
    info!("============");
    info!(
        "Catalog files: {} ({} rows applied)",
        summary.catalog.files_processed, summary.catalog.rows_applied
    );
    info!(
        "Log files: {} ({} rows applied)",
        summary.log.files_processed, summary.log.rows_applied
    );
    info!("");
    info!("Warehouse contains:");
    info!("  Songs: {}", summary.counts.songs);
    info!("  Artists: {}", summary.counts.artists);
    info!("  Users: {}", summary.counts.users);
    info!("  Time: {}", summary.counts.time);
    info!("  Songplays: {}", summary.counts.songplays);

    Ok(())
}
