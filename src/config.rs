//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con la Transform Policy e le opzioni del run
//! - Fornisce validazione dei parametri (errori `Policy`, fatali all'avvio)
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `max_dimension`: lato maggiore massimo in pixel (default: 1200)
//! - `quality`: qualità JPEG (1-100, default: 85)
//! - `workers`: numero di worker paralleli (default: CPU disponibili)
//! - `extensions`: allow-list delle estensioni (default: jpg, jpeg, png)
//! - `filter`: algoritmo di resize (default: Lanczos)
//! - `dry_run`: simulazione senza modifiche (default: false)
//! - `json_output`: eventi JSON su stdout (default: false)
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     max_dimension: 1600,
//!     quality: 80,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::OptimizeError;
use crate::resize::ResizeAlgorithm;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image extensions the codec can decode and re-encode
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Configuration for asset optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum size in pixels of the larger image side
    pub max_dimension: u32,
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Number of parallel workers
    pub workers: usize,
    /// Case-insensitive extension allow-list, without leading dots
    pub extensions: Vec<String>,
    /// Resampling filter used when shrinking
    pub filter: ResizeAlgorithm,
    /// Dry run - encode but never replace files
    pub dry_run: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dimension: 1200,
            quality: 85,
            workers: default_workers(),
            extensions: SUPPORTED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            filter: ResizeAlgorithm::default(),
            dry_run: false,
            json_output: false,
        }
    }
}

/// Number of available processing units, falling back to 1
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.quality == 0 || self.quality > 100 {
            return Err(OptimizeError::Policy(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }

        if self.max_dimension == 0 {
            return Err(OptimizeError::Policy(
                "max dimension must be a positive number of pixels".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(OptimizeError::Policy(
                "number of workers must be greater than 0".to_string(),
            ));
        }

        if self.extensions.is_empty() {
            return Err(OptimizeError::Policy(
                "extension allow-list must not be empty".to_string(),
            ));
        }

        for ext in &self.extensions {
            let normalized = ext.trim_start_matches('.').to_lowercase();
            if !SUPPORTED_EXTENSIONS.contains(&normalized.as_str()) {
                return Err(OptimizeError::Policy(format!(
                    "unsupported extension '{}' (supported: {})",
                    ext,
                    SUPPORTED_EXTENSIONS.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Load configuration from file. A missing file is a `Policy` error.
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(OptimizeError::Policy(format!(
                "config file {} not found",
                path.display()
            ))
            .into());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
