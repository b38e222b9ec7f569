//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico
//! (script di build del sito, CI).
//!
//! ## Tipi di messaggi (uno per riga su stdout):
//! - `start`: inizio del run con la configurazione effettiva
//! - `file_complete`: esito di un singolo asset
//! - `progress`: contatori correnti
//! - `complete`: fine del run con statistiche finali e codice di uscita
//! - `error`: errore fatale (root illeggibile, configurazione non valida)

use crate::config::Config;
use crate::outcome::AssetOutcome;
use crate::progress::OptimizationStats;
use crate::resize::ResizeAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    #[serde(rename = "start")]
    Start {
        input_dir: PathBuf,
        config: JsonConfig,
    },

    #[serde(rename = "file_complete")]
    FileComplete {
        #[serde(flatten)]
        outcome: AssetOutcome,
    },

    #[serde(rename = "progress")]
    Progress {
        current: usize,
        discovered: usize,
        files_optimized: usize,
        files_unchanged: usize,
        errors: usize,
        bytes_saved: u64,
    },

    #[serde(rename = "complete")]
    Complete {
        files_processed: usize,
        files_optimized: usize,
        files_unchanged: usize,
        errors: usize,
        total_bytes_saved: u64,
        average_reduction: f64,
        duration_seconds: f64,
        interrupted: bool,
        exit_code: u8,
    },

    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub max_dimension: u32,
    pub quality: u8,
    pub workers: usize,
    pub extensions: Vec<String>,
    pub filter: ResizeAlgorithm,
    pub dry_run: bool,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(input_dir: PathBuf, config: JsonConfig) -> Self {
        Self::Start { input_dir, config }
    }

    pub fn file_complete(outcome: &AssetOutcome) -> Self {
        Self::FileComplete {
            outcome: outcome.clone(),
        }
    }

    pub fn progress(
        current: usize,
        discovered: usize,
        files_optimized: usize,
        files_unchanged: usize,
        errors: usize,
        bytes_saved: u64,
    ) -> Self {
        Self::Progress {
            current,
            discovered,
            files_optimized,
            files_unchanged,
            errors,
            bytes_saved,
        }
    }

    pub fn complete(
        stats: &OptimizationStats,
        duration_seconds: f64,
        interrupted: bool,
        exit_code: u8,
    ) -> Self {
        Self::Complete {
            files_processed: stats.files_processed,
            files_optimized: stats.files_optimized,
            files_unchanged: stats.files_unchanged,
            errors: stats.errors,
            total_bytes_saved: stats.total_bytes_saved,
            average_reduction: stats.overall_reduction_percent(),
            duration_seconds,
            interrupted,
            exit_code,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_dimension: config.max_dimension,
            quality: config.quality,
            workers: config.workers,
            extensions: config.extensions.clone(),
            filter: config.filter,
            dry_run: config.dry_run,
        }
    }
}
