//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di ottimizzazione.
//!
//! ## Responsabilità:
//! - Progress bar visuale con `indicatif` per feedback real-time
//! - Statistiche aggregate di un run (ottimizzati, invariati, errori, byte risparmiati)
//! - Report finale leggibile
//!
//! La discovery dei file è lazy, quindi la lunghezza della barra cresce man mano
//! che il walker trova nuovi candidati.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [=======================>----------------] 58/97 (59%) [OK] beach.jpg: 63.1% saved
//! ```

use crate::file_manager::FileManager;
use crate::outcome::{OutcomeStatus, RunResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for asset optimization
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a progress bar whose length grows as candidates are discovered
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A bar that draws nothing, for JSON mode
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Account for one more discovered candidate
    pub fn add_pending(&self) {
        self.bar.inc_length(1);
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics tracker for optimization results
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_optimized: usize,
    pub files_unchanged: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
    pub errors: usize,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_run(result: &RunResult) -> Self {
        let mut stats = Self::new();
        for outcome in &result.outcomes {
            match &outcome.status {
                OutcomeStatus::Optimized {
                    original_size,
                    optimized_size,
                    ..
                } => stats.add_optimized(*original_size, *optimized_size),
                OutcomeStatus::NoOp { size } => stats.add_unchanged(*size),
                OutcomeStatus::Failed { .. } => stats.add_error(),
            }
        }
        stats
    }

    pub fn add_optimized(&mut self, original_size: u64, new_size: u64) {
        self.files_processed += 1;
        self.files_optimized += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_unchanged(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_unchanged += 1;
        self.total_original_size += original_size;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Optimized: {} | Unchanged: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_optimized,
            self.files_unchanged,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptimizeError;
    use crate::outcome::{Asset, AssetOutcome};
    use crate::resize::Dimensions;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_stats_from_run() {
        let mut result = RunResult::new();
        result.push(AssetOutcome::optimized(
            &Asset::new(PathBuf::from("a.jpg"), 1000, 0),
            250,
            Dimensions::new(2000, 1000),
            Dimensions::new(1200, 600),
        ));
        result.push(AssetOutcome::no_op(&Asset::new(PathBuf::from("b.jpg"), 1000, 0)));
        result.push(AssetOutcome::failed(
            Path::new("c.jpg"),
            0,
            &OptimizeError::Encode("boom".into()),
        ));

        let stats = OptimizationStats::from_run(&result);
        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.files_optimized, 1);
        assert_eq!(stats.files_unchanged, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.total_bytes_saved, 750);
        assert_eq!(stats.overall_reduction_percent(), 37.5);
        assert!(stats.format_summary().contains("Errors: 1"));
    }

    #[test]
    fn test_empty_stats() {
        let stats = OptimizationStats::from_run(&RunResult::new());
        assert_eq!(stats, OptimizationStats::new());
        assert_eq!(stats.overall_reduction_percent(), 0.0);
    }
}
