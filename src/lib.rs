//! # Media Organizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `file_manager`: Classificazione per estensione e discovery dei file
//! - `date_extractor`: Data di scatto (EXIF embedded o exiftool)
//! - `platform`: Nome e disponibilità del tool esterno per piattaforma
//! - `organizer`: Orchestratore, worker pool, destinazioni e spostamenti
//! - `progress`: Progress bar e statistiche
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use media_organizer::{Config, MediaOrganizer};
//!
//! let organizer = MediaOrganizer::new(Config::default())?;
//! let summary = organizer.run(Path::new("camera-roll")).await?;
//! println!("{}", summary.stats.summary_line());
//! ```

pub mod config;
pub mod date_extractor;
pub mod error;
pub mod file_manager;
pub mod organizer;
pub mod platform;
pub mod progress;

pub use config::{Config, PhotoStrategy};
pub use date_extractor::{CaptureDate, DateExtractor, DateStrategy};
pub use error::OrganizeError;
pub use file_manager::{FileManager, MediaKind};
pub use organizer::{MediaOrganizer, RunSummary};
pub use progress::OrganizeStats;
