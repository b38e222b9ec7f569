//! # Progress Tracking Module
//!
//! Tracker thread-safe condiviso tra i worker.
//! Gestisce sia output JSON che progress bar tradizionale.

use crate::{
    config::Config,
    json_output::JsonMessage,
    outcome::{AssetOutcome, OutcomeStatus},
    progress::ProgressManager,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Counters {
    discovered: usize,
    completed: usize,
    optimized: usize,
    unchanged: usize,
    skipped: usize,
    errors: usize,
    bytes_saved: u64,
}

/// Tracker progress unificato
#[derive(Clone)]
pub struct ProgressTracker {
    json_output: bool,
    counters: Arc<Mutex<Counters>>,
    progress_manager: ProgressManager,
}

impl ProgressTracker {
    pub fn new(config: &Config) -> Self {
        let progress_manager = if config.json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new()
        };

        Self {
            json_output: config.json_output,
            counters: Arc::new(Mutex::new(Counters::default())),
            progress_manager,
        }
    }

    /// Registra un nuovo candidato trovato dal walker
    pub async fn add_discovered(&self) {
        self.counters.lock().await.discovered += 1;
        self.progress_manager.add_pending();
    }

    /// Gestisce completamento file con eventi JSON automatici
    pub async fn handle_file_completion(&self, file_path: &Path, outcome: Option<&AssetOutcome>) {
        let file_name = file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let message = {
            let mut counters = self.counters.lock().await;
            counters.completed += 1;

            match outcome {
                Some(o) => match &o.status {
                    OutcomeStatus::Optimized { .. } => {
                        counters.optimized += 1;
                        counters.bytes_saved += o.bytes_saved();
                        format!("[OK] {}: {:.1}% saved", file_name, o.reduction_percent())
                    }
                    OutcomeStatus::NoOp { .. } => {
                        counters.unchanged += 1;
                        format!("[SKIP] {}: already within bounds", file_name)
                    }
                    OutcomeStatus::Failed { kind, .. } => {
                        counters.errors += 1;
                        format!("[ERROR] {}: {}", file_name, kind)
                    }
                },
                None => {
                    counters.skipped += 1;
                    format!("[SKIP] {}: not a regular file", file_name)
                }
            }
        };

        if self.json_output {
            if let Some(outcome) = outcome {
                JsonMessage::file_complete(outcome).emit();
            }
            self.emit_progress().await;
        }

        self.progress_manager.update(&message);
    }

    /// Invia evento JSON con i contatori correnti
    async fn emit_progress(&self) {
        let counters = self.counters.lock().await;
        JsonMessage::progress(
            counters.completed,
            counters.discovered,
            counters.optimized,
            counters.unchanged,
            counters.errors,
            counters.bytes_saved,
        )
        .emit();
    }

    /// Numero di candidati saltati in silenzio (non file regolari)
    pub async fn skipped(&self) -> usize {
        self.counters.lock().await.skipped
    }

    /// Finalizza progress bar
    pub fn finish(&self, summary: &str) {
        self.progress_manager.finish(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Asset;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_counts_each_kind_of_completion() {
        let tracker = ProgressTracker::new(&Config {
            json_output: true,
            ..Default::default()
        });

        for _ in 0..3 {
            tracker.add_discovered().await;
        }

        let no_op = AssetOutcome::no_op(&Asset::new(PathBuf::from("a.jpg"), 10, 0));
        tracker.handle_file_completion(Path::new("a.jpg"), Some(&no_op)).await;
        tracker.handle_file_completion(Path::new("b.jpg"), None).await;
        tracker.handle_file_completion(Path::new("c.jpg"), None).await;

        assert_eq!(tracker.skipped().await, 2);
        let counters = tracker.counters.lock().await;
        assert_eq!(counters.discovered, 3);
        assert_eq!(counters.completed, 3);
        assert_eq!(counters.unchanged, 1);
    }
}
