//! # Task Optimizer Module
//!
//! Worker per l'ottimizzazione di singoli file.
//! Sposta il lavoro del codec (CPU-bound) su un thread blocking e isola
//! eventuali panic del codec al singolo asset.

use crate::{
    config::Config,
    error::OptimizeError,
    image_processor::ImageProcessor,
    outcome::{AssetOutcome, Candidate},
};
use tracing::{debug, error};

/// Worker per elaborazione singoli file
#[derive(Clone)]
pub struct TaskOptimizer {
    image_processor: ImageProcessor,
}

impl TaskOptimizer {
    pub fn new(config: Config) -> Self {
        Self {
            image_processor: ImageProcessor::new(config),
        }
    }

    /// Processa un singolo file.
    ///
    /// `None` means the candidate was skipped (vanished or not a regular file).
    pub async fn process_single_file(&self, candidate: Candidate) -> Option<AssetOutcome> {
        debug!("Starting process_single_file for: {}", candidate.path.display());

        let processor = self.image_processor.clone();
        let task_candidate = candidate.clone();
        match tokio::task::spawn_blocking(move || processor.process(&task_candidate)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Codec task for {} did not complete: {}", candidate.path.display(), e);
                Some(AssetOutcome::failed(
                    &candidate.path,
                    candidate.discovered_at,
                    &OptimizeError::Decode(format!("codec aborted: {}", e)),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeStatus;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_process_single_file_runs_pipeline() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hero.png");
        RgbImage::from_pixel(320, 160, Rgb([200, 100, 50])).save(&path).unwrap();

        let task = TaskOptimizer::new(Config {
            max_dimension: 80,
            workers: 1,
            ..Default::default()
        });
        let outcome = task
            .process_single_file(Candidate::new(path.clone()))
            .await
            .unwrap();

        assert!(matches!(outcome.status, OutcomeStatus::Optimized { .. }));
        assert_eq!(outcome.path, path);
    }

    #[tokio::test]
    async fn test_vanished_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let task = TaskOptimizer::new(Config::default());

        assert!(task
            .process_single_file(Candidate::new(temp.path().join("gone.jpg")))
            .await
            .is_none());
    }
}
