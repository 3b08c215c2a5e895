use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use tracing::{debug, info};

use crate::{Result, schema::Settings};

/// File-backed owner of the process-wide [`Settings`].
///
/// Every mutation goes through [`ConfigStore::update`], which flushes the
/// whole document to disk before returning. The inner lock is a
/// `std::sync::Mutex` because it is never held across an `.await`.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    settings: Mutex<Settings>,
}

impl ConfigStore {
    /// Load state from `path`, synthesizing defaults when the file is absent
    /// or empty. A file that exists but cannot be parsed is an error.
    pub fn load(path: impl Into<PathBuf>, default_model: &str) -> Result<Self> {
        let path = path.into();
        let settings = load_settings(&path, default_model)?;
        Ok(Self {
            path,
            settings: Mutex::new(settings),
        })
    }

    /// Wrap already-built settings; nothing is read from `path`.
    pub fn with_settings(path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            path: path.into(),
            settings: Mutex::new(settings),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> Settings {
        self.lock().clone()
    }

    /// Run `f` against the current state without persisting.
    pub fn read<T>(&self, f: impl FnOnce(&Settings) -> T) -> T {
        f(&self.lock())
    }

    /// Mutate the state in place, then write it to disk.
    ///
    /// The in-memory mutation is kept even when the write fails; the error
    /// is returned so callers can report it.
    pub fn update<T>(&self, f: impl FnOnce(&mut Settings) -> T) -> Result<T> {
        let mut guard = self.lock();
        let value = f(&mut guard);
        save_settings(&self.path, &guard)?;
        Ok(value)
    }

    /// Write the current state to disk.
    pub fn save(&self) -> Result<()> {
        let guard = self.lock();
        save_settings(&self.path, &guard)
    }
}

/// Read settings from `path`.
pub fn load_settings(path: &Path, default_model: &str) -> Result<Settings> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no state file found, using defaults");
            return Ok(Settings::with_model(default_model));
        },
        Err(e) => return Err(e.into()),
    };

    if raw.trim().is_empty() {
        debug!(path = %path.display(), "state file is empty, using defaults");
        return Ok(Settings::with_model(default_model));
    }

    let mut settings: Settings = serde_json::from_str(&raw)?;
    if settings.model.trim().is_empty() {
        settings.model = default_model.to_owned();
    }
    debug!(
        path = %path.display(),
        bound_channel = ?settings.bound_channel,
        conversations = settings.conversations.len(),
        "loaded state file"
    );
    Ok(settings)
}

/// Serialize `settings` as pretty JSON and replace the file at `path`.
///
/// Written to a sibling temp file first and renamed into place.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(settings)?;

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("json.tmp.{nanos}"));
    std::fs::write(&temp_path, data)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    debug!(path = %path.display(), "saved state file");
    Ok(())
}
