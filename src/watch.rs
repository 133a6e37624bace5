//! Settings file watcher.
//!
//! Reader settings change only through the settings file, so the viewer
//! watches it and re-applies the file to the live session when it changes.
//! notify runs its callback on an internal thread; events are forwarded to
//! the UI thread over an `mpsc` channel and drained without blocking.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{Context, Result};
use log::debug;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

pub struct SettingsWatcher {
    rx: mpsc::Receiver<()>,
    path: PathBuf,
    _watcher: RecommendedWatcher, // Drop stops watching
}

impl SettingsWatcher {
    /// Watch `path`, which does not have to exist yet.
    ///
    /// The parent directory is watched (NonRecursive) and events are filtered
    /// by file name, so atomic saves (write + rename) and the file's first
    /// creation are both seen.
    pub fn new(path: &Path) -> Result<Self> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let parent = parent
            .canonicalize()
            .with_context(|| format!("cannot watch {}", parent.display()))?;
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("cannot watch {}: no file name", path.display()))?
            .to_owned();
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    if ours && relevant {
                        let _ = tx.send(());
                    }
                }
            },
            notify::Config::default(),
        )?;
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;
        debug!("watch: {} (via {})", path.display(), parent.display());

        Ok(Self {
            rx,
            path: path.to_path_buf(),
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return true if the file has changed since last check (non-blocking).
    /// Multiple queued notifications are collapsed into a single true.
    pub fn has_changed(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for_change(w: &SettingsWatcher) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if w.has_changed() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn sees_creation_and_modification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let w = SettingsWatcher::new(&path).unwrap();
        assert!(!w.has_changed());

        std::fs::write(&path, "[reader]\n").unwrap();
        assert!(wait_for_change(&w));
    }

    #[test]
    fn missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("config.toml");
        assert!(SettingsWatcher::new(&path).is_err());
    }
}
