//! # Asset Optimizer Main Orchestrator
//!
//! Orchestratore principale: scan lazy della directory, worker pool limitato
//! da un semaforo, raccolta degli esiti nel `RunResult` e report finale.

use crate::{
    config::Config,
    error::OptimizeError,
    file_manager::{ExtensionFilter, FileManager, STALE_STAGING_AGE},
    json_output::{JsonConfig, JsonMessage},
    optimizer::{progress_tracker::ProgressTracker, task_optimizer::TaskOptimizer},
    outcome::{Candidate, OutcomeStatus, RunResult},
    progress::OptimizationStats,
};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, error, info, warn};

/// Candidates buffered between the directory walker and the dispatcher
const CANDIDATE_BUFFER: usize = 256;

/// Requests a graceful stop: no new candidates are dispatched, assets
/// already in flight still finish their atomic replace.
#[derive(Clone)]
pub struct StopHandle(Arc<watch::Sender<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.send_replace(true);
    }
}

/// Orchestratore principale
pub struct AssetOptimizer {
    config: Config,
    stop_sender: Arc<watch::Sender<bool>>,
}

impl AssetOptimizer {
    /// Crea nuova istanza dell'ottimizzatore; fallisce con `Policy` se la
    /// configurazione non è valida
    pub fn new(config: Config) -> Result<Self, OptimizeError> {
        config.validate()?;
        let (stop_sender, _) = watch::channel(false);
        Ok(Self {
            config,
            stop_sender: Arc::new(stop_sender),
        })
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop_sender.clone())
    }

    /// Controlla se è stato ricevuto un segnale di stop
    fn should_stop(receiver: &watch::Receiver<bool>) -> bool {
        *receiver.borrow()
    }

    /// Esegue il processo di ottimizzazione su `root`.
    ///
    /// Errors only when the root directory itself cannot be read; per-asset
    /// failures are recorded in the returned [`RunResult`].
    pub async fn run(&self, root: &Path) -> Result<RunResult> {
        let start_time = std::time::Instant::now();

        FileManager::ensure_readable_dir(root)?;

        self.emit_start_message(root);
        self.log_configuration();

        let progress_tracker = ProgressTracker::new(&self.config);
        let mut result = self.process_files_concurrently(root, progress_tracker.clone()).await?;
        result.sort_by_path();

        let stats = OptimizationStats::from_run(&result);
        progress_tracker.finish(&stats.format_summary());

        let skipped = progress_tracker.skipped().await;
        if skipped > 0 {
            debug!("{} candidates were not regular files and were skipped", skipped);
        }

        self.print_final_stats(&result, &stats, start_time.elapsed().as_secs_f64());

        Ok(result)
    }

    fn emit_start_message(&self, root: &Path) {
        if self.config.json_output {
            JsonMessage::start(root.to_path_buf(), JsonConfig::from(&self.config)).emit();
        } else {
            info!("Starting asset optimization in: {}", root.display());
        }
    }

    fn log_configuration(&self) {
        info!(
            "Policy: max dimension {}px, JPEG quality {}, filter {:?}",
            self.config.max_dimension, self.config.quality, self.config.filter
        );
        info!(
            "Workers: {} | Extensions: {}",
            self.config.workers,
            self.config.extensions.join(", ")
        );
        if self.config.dry_run {
            info!("Dry run mode: No files will be modified");
        }
    }

    /// Walks `root` on a blocking thread and dispatches each candidate to a
    /// worker as soon as a permit is free.
    async fn process_files_concurrently(
        &self,
        root: &Path,
        progress_tracker: ProgressTracker,
    ) -> Result<RunResult> {
        let (candidate_tx, mut candidate_rx) = mpsc::channel::<Candidate>(CANDIDATE_BUFFER);
        let filter = ExtensionFilter::new(&self.config.extensions);
        let walk_root = root.to_path_buf();
        let sweep_staged_before = if self.config.dry_run {
            None
        } else {
            SystemTime::now().checked_sub(STALE_STAGING_AGE)
        };

        let walker = tokio::task::spawn_blocking(move || {
            for path in FileManager::scan_candidates(&walk_root, filter, sweep_staged_before) {
                if candidate_tx.blocking_send(Candidate::new(path)).is_err() {
                    // Dispatcher stopped, stop walking.
                    break;
                }
            }
        });

        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let stop_receiver = self.stop_sender.subscribe();
        let task_optimizer = TaskOptimizer::new(self.config.clone());
        let mut tasks = Vec::new();
        let mut result = RunResult::new();

        while let Some(candidate) = candidate_rx.recv().await {
            let permit = semaphore.clone().acquire_owned().await?;

            if Self::should_stop(&stop_receiver) {
                warn!("Stop requested, waiting for in-flight assets to finish");
                result.interrupted = true;
                break;
            }

            progress_tracker.add_discovered().await;
            let worker = task_optimizer.clone();
            let tracker = progress_tracker.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let path = candidate.path.clone();
                let outcome = worker.process_single_file(candidate).await;
                tracker.handle_file_completion(&path, outcome.as_ref()).await;
                outcome
            }));
        }
        drop(candidate_rx);

        for joined in futures::future::join_all(tasks).await {
            match joined {
                Ok(Some(outcome)) => result.push(outcome),
                Ok(None) => {}
                Err(e) => error!("Worker task failed: {}", e),
            }
        }

        if let Err(e) = walker.await {
            error!("Directory walker failed: {}", e);
        }

        Ok(result)
    }

    /// Stampa statistiche finali
    fn print_final_stats(&self, result: &RunResult, stats: &OptimizationStats, duration: f64) {
        if self.config.json_output {
            JsonMessage::complete(
                stats,
                duration,
                result.interrupted,
                result.status().exit_code(),
            )
            .emit();
            return;
        }

        if result.is_empty() {
            info!("No images found to process");
        }

        info!("=== Optimization Complete ===");
        info!("Candidates processed: {}", result.len());
        info!("Files optimized: {}", stats.files_optimized);
        info!("Files already within bounds: {}", stats.files_unchanged);
        info!("Errors: {}", stats.errors);
        info!("Bytes saved: {}", FileManager::format_size(stats.total_bytes_saved));
        info!("Overall reduction: {:.2}%", stats.overall_reduction_percent());
        info!("Duration: {:.2}s", duration);

        for outcome in result.failures() {
            if let OutcomeStatus::Failed { kind, reason } = &outcome.status {
                error!("  {} [{}]: {}", outcome.path.display(), kind, reason);
            }
        }

        if result.interrupted {
            warn!("Run was interrupted before every candidate was dispatched");
        }
    }
}
