//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Definisce `FailureKind`, la tassonomia esposta nel Run Result e nel JSON
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: file non leggibili/scrivibili, rename fallito
//! - `Decode`: immagine corrotta o formato non supportato
//! - `Encode`: errore del codec durante la ricodifica
//! - `Policy`: configurazione non valida (fatale all'avvio)
//! - `RootUnreadable`: la directory radice non può essere letta (fatale)
//!
//! Solo `Policy` e `RootUnreadable` interrompono il run; gli altri vengono
//! convertiti in un outcome `failed` per il singolo asset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Custom error types for asset optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Invalid configuration: {0}")]
    Policy(String),

    #[error("Cannot read root directory {}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OptimizeError {
    /// Map the error onto the reported failure taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            OptimizeError::Io(_) | OptimizeError::RootUnreadable { .. } => FailureKind::Io,
            OptimizeError::Decode(_) => FailureKind::Decode,
            OptimizeError::Encode(_) => FailureKind::Encode,
            OptimizeError::Policy(_) => FailureKind::Policy,
        }
    }
}

/// Failure category attached to a failed asset outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    #[serde(rename = "io-error")]
    Io,
    #[serde(rename = "decode-error")]
    Decode,
    #[serde(rename = "encode-error")]
    Encode,
    #[serde(rename = "policy-error")]
    Policy,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Io => "io-error",
            FailureKind::Decode => "decode-error",
            FailureKind::Encode => "encode-error",
            FailureKind::Policy => "policy-error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
