//! # Optimizer Module
//!
//! Orchestrazione del processo di ottimizzazione, separata in sottomoduli:
//! - `asset_optimizer`: Orchestratore principale (scan lazy, worker pool, report)
//! - `task_optimizer`: Worker per singoli file
//! - `progress_tracker`: Contatori condivisi, progress bar ed eventi JSON
//!
//! ## Flusso di esecuzione:
//! 1. **Validazione**: configurazione e leggibilità della directory radice
//! 2. **Discovery**: il walker gira su un thread blocking e alimenta un canale
//! 3. **Parallel processing**: un semaforo limita i worker attivi
//! 4. **Raccolta**: gli esiti confluiscono nel `RunResult`, ordinato per path
//! 5. **Reporting**: statistiche finali e lista dei fallimenti

pub mod asset_optimizer;
pub mod task_optimizer;
pub mod progress_tracker;

pub use asset_optimizer::AssetOptimizer;
pub use task_optimizer::TaskOptimizer;
pub use progress_tracker::ProgressTracker;
