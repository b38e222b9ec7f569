//! # Post Asset Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test di integrazione
//!
//! ## Architettura dei moduli:
//! - `config`: Transform Policy, opzioni del run e validazione
//! - `error`: Tipi di errore custom e tassonomia dei fallimenti
//! - `file_manager`: Discovery lazy, allow-list estensioni, sostituzione atomica
//! - `resize`: Calcolo delle dimensioni di destinazione e filtri
//! - `image_processor`: Pipeline per singola immagine (JPEG/PNG)
//! - `orientation`: Tag EXIF Orientation e raddrizzamento dei pixel
//! - `outcome`: Esiti per asset e Run Result
//! - `optimizer`: Orchestratore, worker pool e progress tracking
//! - `progress`: Progress bar e statistiche
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```ignore
//! use post_asset_optimizer::{AssetOptimizer, Config};
//!
//! let optimizer = AssetOptimizer::new(Config::default())?;
//! let result = optimizer.run(Path::new("assets/images/posts")).await?;
//! std::process::exit(result.status().exit_code() as i32);
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod optimizer;
pub mod orientation;
pub mod outcome;
pub mod progress;
pub mod resize;

pub use config::Config;
pub use error::{FailureKind, OptimizeError};
pub use optimizer::AssetOptimizer;
pub use outcome::{AssetOutcome, Candidate, OutcomeStatus, RunResult, RunStatus};
pub use resize::{Dimensions, ResizeAlgorithm};
