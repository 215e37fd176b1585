use std::path::{Path, PathBuf};

use snafu::{Snafu, ensure};
use tracing::{debug, warn};

use crate::{
    config::{SettingsPersistError, SettingsStore, ToolSettings},
    ext::BestEffortPathExt,
};

/// How far a newly chosen tool path got.
#[derive(Debug)]
pub enum Remembered {
    Persisted,
    /// Saving failed. The path is still good for the current run.
    SessionOnly { error: SettingsPersistError },
}

/// A usable tool location is an existing regular file.
pub fn is_tool_file(path: &Path) -> bool {
    path.is_file()
}

/// Picks the tool path for this run: an explicit path wins over the stored one.
pub async fn resolve_divine_path(
    explicit: Option<&Path>,
    store: &impl SettingsStore,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        debug!(
            "Using Divine path from the command line: {}",
            path.best_effort_path_display()
        );
        return Some(path.to_path_buf());
    }
    store.load().await.divine_path
}

/// Validates and stores a new tool path.
///
/// An invalid selection leaves the stored value untouched. A failed save is
/// not an error: the caller keeps using the path for this run.
pub async fn remember_divine_path(
    path: &Path,
    store: &impl SettingsStore,
) -> Result<Remembered, InvalidToolPathError> {
    ensure!(
        is_tool_file(path),
        InvalidToolPathSnafu {
            path: path.best_effort_path_display(),
        }
    );

    let settings = ToolSettings {
        divine_path: Some(path.to_path_buf()),
    };
    match store.save(&settings).await {
        Ok(()) => Ok(Remembered::Persisted),
        Err(error) => {
            warn!("Could not save the Divine path, using it for this run only: {error}");
            Ok(Remembered::SessionOnly { error })
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Invalid file selected for Divine: {}", path))]
pub struct InvalidToolPathError {
    path: String,
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tempfile::{NamedTempFile, TempDir};

    use super::*;
    use crate::config::FileSettingsStore;

    /// In-memory store that can be told to refuse writes.
    #[derive(Default)]
    struct MemoryStore {
        settings: RefCell<ToolSettings>,
        read_only: bool,
    }

    impl SettingsStore for MemoryStore {
        async fn load(&self) -> ToolSettings {
            self.settings.borrow().clone()
        }

        async fn save(&self, settings: &ToolSettings) -> Result<(), SettingsPersistError> {
            if self.read_only {
                // Reuse the file store's error by writing below a regular file.
                let blocker = NamedTempFile::new().unwrap();
                return FileSettingsStore::at(blocker.path().join("settings.yaml"))
                    .save(settings)
                    .await;
            }
            *self.settings.borrow_mut() = settings.clone();
            Ok(())
        }
    }

    #[compio::test]
    async fn explicit_path_wins_over_stored_one() {
        let store = MemoryStore::default();
        *store.settings.borrow_mut() = ToolSettings {
            divine_path: Some("/stored/Divine".into()),
        };

        let resolved = resolve_divine_path(Some(Path::new("/explicit/Divine")), &store).await;

        assert_eq!(resolved, Some(PathBuf::from("/explicit/Divine")));
    }

    #[compio::test]
    async fn stored_path_is_used_without_override() {
        let store = MemoryStore::default();
        *store.settings.borrow_mut() = ToolSettings {
            divine_path: Some("/stored/Divine".into()),
        };

        let resolved = resolve_divine_path(None, &store).await;

        assert_eq!(resolved, Some(PathBuf::from("/stored/Divine")));
    }

    #[compio::test]
    async fn nothing_configured_resolves_to_none() {
        assert_eq!(resolve_divine_path(None, &MemoryStore::default()).await, None);
    }

    #[compio::test]
    async fn valid_selection_is_persisted() {
        let tool = NamedTempFile::new().unwrap();
        let store = MemoryStore::default();

        let remembered = remember_divine_path(tool.path(), &store).await.unwrap();

        assert!(matches!(remembered, Remembered::Persisted));
        assert_eq!(store.load().await.divine_path.as_deref(), Some(tool.path()));
    }

    #[compio::test]
    async fn invalid_selection_keeps_previous_value() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::default();
        *store.settings.borrow_mut() = ToolSettings {
            divine_path: Some("/stored/Divine".into()),
        };

        let result = remember_divine_path(dir.path(), &store).await;

        assert!(result.is_err());
        assert_eq!(
            store.load().await.divine_path,
            Some(PathBuf::from("/stored/Divine"))
        );
    }

    #[compio::test]
    async fn failed_save_degrades_to_session_only() {
        let tool = NamedTempFile::new().unwrap();
        let store = MemoryStore {
            read_only: true,
            ..Default::default()
        };

        let remembered = remember_divine_path(tool.path(), &store).await.unwrap();

        assert!(matches!(remembered, Remembered::SessionOnly { .. }));
    }
}
