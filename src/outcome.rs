//! # Run Result Module
//!
//! Esiti per singolo asset e risultato complessivo di un'esecuzione.
//!
//! ## Strutture dati:
//! - `Candidate`: path trovato dal walker, marcato con l'istante della discovery
//! - `Asset`: path, dimensione originale e momento della discovery
//! - `AssetOutcome`: esito di un asset (ottimizzato, no-op, fallito)
//! - `RunResult`: sequenza ordinabile per path degli esiti di un run
//! - `RunStatus`: stato finale del run, da cui deriva il codice di uscita
//!
//! Il Run Result non viene mai persistito.

use crate::error::{FailureKind, OptimizeError};
use crate::file_manager::FileManager;
use crate::resize::Dimensions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Current time in unix seconds
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A path yielded by the directory walk, not yet opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// Unix seconds at which the walker found it
    pub discovered_at: u64,
}

impl Candidate {
    /// Stamp `path` as discovered now
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            discovered_at: unix_now(),
        }
    }
}

/// An image discovered during a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub path: PathBuf,
    pub original_size: u64,
    /// Unix seconds
    pub discovered_at: u64,
}

impl Asset {
    pub fn new(path: PathBuf, original_size: u64, discovered_at: u64) -> Self {
        Self {
            path,
            original_size,
            discovered_at,
        }
    }
}

/// What happened to a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum OutcomeStatus {
    /// Resized and re-encoded (committed unless the run was a dry run)
    Optimized {
        original_size: u64,
        optimized_size: u64,
        original_dimensions: Dimensions,
        new_dimensions: Dimensions,
    },
    /// Already within bounds, left untouched
    NoOp { size: u64 },
    Failed { kind: FailureKind, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetOutcome {
    pub path: PathBuf,
    pub discovered_at: u64,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl AssetOutcome {
    pub fn optimized(
        asset: &Asset,
        optimized_size: u64,
        original_dimensions: Dimensions,
        new_dimensions: Dimensions,
    ) -> Self {
        Self {
            path: asset.path.clone(),
            discovered_at: asset.discovered_at,
            status: OutcomeStatus::Optimized {
                original_size: asset.original_size,
                optimized_size,
                original_dimensions,
                new_dimensions,
            },
        }
    }

    pub fn no_op(asset: &Asset) -> Self {
        Self {
            path: asset.path.clone(),
            discovered_at: asset.discovered_at,
            status: OutcomeStatus::NoOp {
                size: asset.original_size,
            },
        }
    }

    pub fn failed(path: &Path, discovered_at: u64, error: &OptimizeError) -> Self {
        Self {
            path: path.to_path_buf(),
            discovered_at,
            status: OutcomeStatus::Failed {
                kind: error.kind(),
                reason: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }

    /// Bytes saved by this asset (0 unless optimized)
    pub fn bytes_saved(&self) -> u64 {
        match self.status {
            OutcomeStatus::Optimized {
                original_size,
                optimized_size,
                ..
            } => original_size.saturating_sub(optimized_size),
            _ => 0,
        }
    }

    /// Size before processing, when known
    pub fn original_size(&self) -> u64 {
        match self.status {
            OutcomeStatus::Optimized { original_size, .. } => original_size,
            OutcomeStatus::NoOp { size } => size,
            OutcomeStatus::Failed { .. } => 0,
        }
    }

    pub fn reduction_percent(&self) -> f64 {
        match self.status {
            OutcomeStatus::Optimized {
                original_size,
                optimized_size,
                ..
            } => FileManager::calculate_reduction(original_size, optimized_size),
            _ => 0.0,
        }
    }
}

/// Final state of a run, mapped onto process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// At least one success, or nothing to do
    Success,
    /// The root directory could not be read, or the policy was invalid
    Fatal,
    /// Candidates existed and every one of them failed
    AllFailed,
}

impl RunStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Fatal => 1,
            RunStatus::AllFailed => 2,
        }
    }
}

/// Outcomes of one invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub outcomes: Vec<AssetOutcome>,
    /// True when the run stopped dispatching early (Ctrl-C)
    pub interrupted: bool,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: AssetOutcome) {
        self.outcomes.push(outcome);
    }

    /// Stable sort by path for deterministic reporting
    pub fn sort_by_path(&mut self) {
        self.outcomes.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn optimized_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Optimized { .. }))
            .count()
    }

    pub fn no_op_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::NoOp { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &AssetOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn failure_count_of(&self, kind: FailureKind) -> usize {
        self.failures()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { kind: k, .. } if k == kind))
            .count()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn total_bytes_saved(&self) -> u64 {
        self.outcomes.iter().map(|o| o.bytes_saved()).sum()
    }

    pub fn status(&self) -> RunStatus {
        if self.failure_count() > 0 && self.success_count() == 0 {
            RunStatus::AllFailed
        } else {
            RunStatus::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(path: &str, size: u64) -> Asset {
        Asset::new(PathBuf::from(path), size, 0)
    }

    fn decode_failure(path: &str) -> AssetOutcome {
        AssetOutcome::failed(Path::new(path), 0, &OptimizeError::Decode("corrupt".into()))
    }

    #[test]
    fn test_empty_run_is_success() {
        let result = RunResult::new();
        assert!(result.is_empty());
        assert_eq!(result.status(), RunStatus::Success);
        assert_eq!(result.status().exit_code(), 0);
    }

    #[test]
    fn test_all_failed_run() {
        let mut result = RunResult::new();
        result.push(decode_failure("a.jpg"));
        result.push(decode_failure("b.jpg"));
        assert_eq!(result.status(), RunStatus::AllFailed);
        assert_eq!(result.status().exit_code(), 2);
    }

    #[test]
    fn test_partial_failure_is_success() {
        let mut result = RunResult::new();
        result.push(decode_failure("a.jpg"));
        result.push(AssetOutcome::no_op(&asset("b.jpg", 10)));
        assert_eq!(result.status(), RunStatus::Success);
        assert_eq!(result.failure_count_of(FailureKind::Decode), 1);
        assert_eq!(result.failure_count_of(FailureKind::Io), 0);
    }

    #[test]
    fn test_counts_and_savings() {
        let mut result = RunResult::new();
        let big = asset("z.jpg", 1000);
        result.push(AssetOutcome::optimized(
            &big,
            400,
            Dimensions::new(2400, 1600),
            Dimensions::new(1200, 800),
        ));
        result.push(AssetOutcome::no_op(&asset("a.png", 50)));

        assert_eq!(result.optimized_count(), 1);
        assert_eq!(result.no_op_count(), 1);
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.total_bytes_saved(), 600);
        assert_eq!(result.outcomes[0].reduction_percent(), 60.0);

        result.sort_by_path();
        assert_eq!(result.outcomes[0].path, PathBuf::from("a.png"));
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(decode_failure("x.jpg")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "decode-error");
        assert_eq!(json["path"], "x.jpg");
    }
}
