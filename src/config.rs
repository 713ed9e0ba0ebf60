//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di organizzazione
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `media_root`: Radice dell'albero anno/mese (default: "media")
//! - `workers`: Numero massimo di task concorrenti (default: 2)
//! - `exiftool_command`: Comando del tool esterno (default: "exiftool")
//! - `exiftool_args`: Argomenti extra passati prima del tag
//! - `date_tag`: Tag interrogato con exiftool (default: "DateTimeOriginal")
//! - `photo_strategy`: Strategia per le foto (EXIF embedded o exiftool)
//! - `exiftool_fallback`: Usa exiftool se la decodifica embedded fallisce
//! - `show_progress`: Mostra la progress bar
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     workers: 4,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How photos get their capture date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoStrategy {
    /// Decode the EXIF block in-process
    Embedded,
    /// Query the external tool, same as videos
    ExifTool,
}

/// Configuration for a sorting run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the year/month hierarchy
    pub media_root: PathBuf,
    /// Maximum number of relocation tasks running at once
    pub workers: usize,
    /// External metadata tool
    pub exiftool_command: String,
    /// Extra arguments placed before the tag query
    pub exiftool_args: Vec<String>,
    /// Tag queried through the external tool
    pub date_tag: String,
    /// Strategy used for photos
    pub photo_strategy: PhotoStrategy,
    /// Query the external tool when the embedded decode fails
    pub exiftool_fallback: bool,
    /// Draw the progress bar
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
            workers: 2,
            exiftool_command: "exiftool".to_string(),
            exiftool_args: Vec::new(),
            date_tag: "DateTimeOriginal".to_string(),
            photo_strategy: PhotoStrategy::Embedded,
            exiftool_fallback: true,
            show_progress: true,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if self.date_tag.trim().is_empty() {
            return Err(anyhow::anyhow!("Date tag must not be empty"));
        }

        if self.exiftool_command.trim().is_empty() {
            return Err(anyhow::anyhow!("Exiftool command must not be empty"));
        }

        if self.media_root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Media root must not be empty"));
        }

        if self.media_root.exists() && !self.media_root.is_dir() {
            return Err(anyhow::anyhow!(
                "Media root is not a directory: {}",
                self.media_root.display()
            ));
        }

        Ok(())
    }

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("media-organizer").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
