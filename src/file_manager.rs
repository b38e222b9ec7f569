//! # File Management Module
//!
//! Questo modulo gestisce tutte le operazioni sui file e la discovery delle immagini.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva e lazy dei candidati in una directory
//! - Filtro per estensione tramite allow-list case-insensitive
//! - Sostituzione atomica: temp file nella stessa directory + rename
//! - Pulizia dei temp file rimasti da un run interrotto (SIGKILL)
//! - Utilità per calcoli dimensioni e percentuali
//!
//! ## Sicurezza operazioni:
//! - Il file originale non viene mai scritto direttamente
//! - Un temp file non confermato viene rimosso al drop
//! - Il rename avviene nella stessa directory, quindi è atomico
//!
//! ## Esempio:
//! ```ignore
//! let filter = ExtensionFilter::new(&config.extensions);
//! FileManager::ensure_readable_dir(&root)?;
//! for path in FileManager::scan_candidates(&root, filter, None) {
//!     // process image
//! }
//! ```

use crate::error::OptimizeError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Random characters tempfile puts between the prefix and the suffix
const STAGING_RANDOM_LEN: usize = 6;

/// Staging files younger than this may belong to a live run and are kept
pub const STALE_STAGING_AGE: Duration = Duration::from_secs(60);

/// Case-insensitive extension allow-list
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let extensions = extensions
            .iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        Self { extensions }
    }

    pub fn matches(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext_lower = ext.to_string_lossy().to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext_lower)
            }
            None => false,
        }
    }
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Fail with `RootUnreadable` unless `root` is a directory we can list
    pub fn ensure_readable_dir(root: &Path) -> Result<(), OptimizeError> {
        std::fs::read_dir(root)
            .map(|_| ())
            .map_err(|source| OptimizeError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            })
    }

    /// Lazily walk `root` and yield every entry whose extension passes `filter`.
    ///
    /// Entries are not checked for being regular files here; that precondition
    /// belongs to the per-asset step so a vanished match is skipped, not fatal.
    /// Unreadable subdirectories are logged and skipped.
    ///
    /// With `sweep_staged_before`, staging files left by an interrupted run
    /// and last modified before that instant are removed along the way.
    pub fn scan_candidates(
        root: &Path,
        filter: ExtensionFilter,
        sweep_staged_before: Option<SystemTime>,
    ) -> impl Iterator<Item = PathBuf> {
        let staging_filter = filter.clone();
        WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Skipping unreadable entry during scan: {}", e);
                    None
                }
            })
            .filter(|e| !e.file_type().is_dir())
            .filter(move |e| match sweep_staged_before {
                Some(cutoff) if Self::is_staged_replacement(e.path(), &staging_filter) => {
                    Self::sweep_staged(e, cutoff);
                    false
                }
                _ => true,
            })
            .map(|e| e.into_path())
            .filter(move |path| filter.matches(path))
    }

    /// True for names shaped like [`FileManager::stage_replacement`] output:
    /// `.<original>.<random>.tmp` where `<original>` passes `filter`.
    pub fn is_staged_replacement(path: &Path, filter: &ExtensionFilter) -> bool {
        let inner = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix('.'))
            .and_then(|n| n.strip_suffix(".tmp"));

        match inner.and_then(|n| n.rsplit_once('.')) {
            Some((original, random)) => {
                !original.is_empty()
                    && random.len() == STAGING_RANDOM_LEN
                    && random.chars().all(|c| c.is_ascii_alphanumeric())
                    && filter.matches(Path::new(original))
            }
            None => false,
        }
    }

    fn sweep_staged(entry: &walkdir::DirEntry, cutoff: SystemTime) {
        if !entry.file_type().is_file() {
            return;
        }

        let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
        match modified {
            Some(modified) if modified < cutoff => match std::fs::remove_file(entry.path()) {
                Ok(()) => warn!("Removed stale staging file {}", entry.path().display()),
                Err(e) => warn!("Cannot remove stale staging file {}: {}", entry.path().display(), e),
            },
            _ => debug!("Keeping recent staging file {}", entry.path().display()),
        }
    }

    /// Write `contents` to a temp file next to `original`, flushed to disk and
    /// carrying the original's permissions. Nothing touches `original` until
    /// the returned file is passed to [`FileManager::commit_replacement`];
    /// dropping it instead removes the temp file.
    pub fn stage_replacement(original: &Path, contents: &[u8]) -> Result<NamedTempFile, OptimizeError> {
        let parent = original
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = original
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut staged = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".tmp")
            .rand_bytes(STAGING_RANDOM_LEN)
            .tempfile_in(parent)?;

        staged.write_all(contents)?;
        staged.as_file().sync_all()?;

        let permissions = std::fs::metadata(original)?.permissions();
        std::fs::set_permissions(staged.path(), permissions)?;

        debug!("Staged replacement for {} at {}", original.display(), staged.path().display());
        Ok(staged)
    }

    /// Atomically rename a staged temp file over `original`
    pub fn commit_replacement(staged: NamedTempFile, original: &Path) -> Result<(), OptimizeError> {
        staged
            .persist(original)
            .map_err(|e| OptimizeError::Io(e.error))?;
        Ok(())
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
