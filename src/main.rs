//! # Media Organizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione degli input dell'utente
//! - Caricamento della configurazione e avvio dell'organizer
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (sorgente, media root, workers, etc.)
//! 2. Configura il logging (INFO o DEBUG, `RUST_LOG` ha la precedenza)
//! 3. Valida che la directory sorgente esista
//! 4. Carica il file di configurazione e applica gli override da CLI
//! 5. Verifica exiftool, esegue il run e stampa il riepilogo
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-organizer ~/camera-roll --media-root ~/media --workers 4 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use media_organizer::{Config, MediaOrganizer, PhotoStrategy};

#[derive(Parser)]
#[command(name = "media-organizer")]
#[command(about = "Sort photos and videos into year/month folders by capture date")]
struct Args {
    /// Directory scanned for photos and videos
    source: PathBuf,

    /// Root of the year/month hierarchy
    #[arg(short, long)]
    media_root: Option<PathBuf>,

    /// Number of files processed at once
    #[arg(short, long)]
    workers: Option<usize>,

    /// Config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Metadata tool command
    #[arg(long)]
    exiftool: Option<String>,

    /// Tag queried through the metadata tool
    #[arg(long)]
    tag: Option<String>,

    /// Read photo dates through the metadata tool as well
    #[arg(long)]
    exiftool_only: bool,

    /// Don't query the metadata tool when a photo's EXIF block can't be decoded
    #[arg(long)]
    no_fallback: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref media_root) = self.media_root {
            config.media_root = media_root.clone();
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(ref command) = self.exiftool {
            config.exiftool_command = command.clone();
        }
        if let Some(ref tag) = self.tag {
            config.date_tag = tag.clone();
        }
        if self.exiftool_only {
            config.photo_strategy = PhotoStrategy::ExifTool;
        }
        if self.no_fallback {
            config.exiftool_fallback = false;
        }
        if self.no_progress {
            config.show_progress = false;
        }
    }
}

async fn load_config(args: &Args) -> Result<Config> {
    let path = match args.config {
        Some(ref path) => {
            if !path.exists() {
                return Err(anyhow::anyhow!("Config file does not exist: {}", path.display()));
            }
            Some(path.clone())
        }
        None => Config::default_path(),
    };

    let mut config = match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            Config::from_file(&path).await?
        }
        None => Config::default(),
    };

    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.source.exists() {
        return Err(anyhow::anyhow!("Source directory does not exist: {}", args.source.display()));
    }
    if !args.source.is_dir() {
        return Err(anyhow::anyhow!("Source is not a directory: {}", args.source.display()));
    }

    let config = load_config(&args).await?;
    let organizer = MediaOrganizer::new(config)?;
    organizer.check_dependencies().await;

    let summary = organizer.run(&args.source).await?;
    println!("{}", summary.stats.summary_line());

    if let Some(e) = summary.traversal_error {
        error!("Run stopped early: {}", e);
        return Err(e.into());
    }

    Ok(())
}
