//! Small JSON files kept in the per-user data directory.

use std::{
    fs,
    io,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    de::DeserializeOwned,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

use crate::core::VocabookError;

const APP_NAME: &str = "vocabook";

/// `<local data dir>/vocabook`, created on first use. Falls back to the working
/// directory when there is no data dir or it cannot be created.
pub fn app_data_dir() -> PathBuf {
    let Some(data_dir) = dirs::data_local_dir() else {
        warn!("No local data directory on this system, using the working directory");
        return PathBuf::from(".");
    };

    let app_dir = data_dir.join(APP_NAME);
    if let Err(e) = fs::create_dir_all(&app_dir) {
        warn!("Unable to create {}: {}. Using the working directory", app_dir.display(), e);
        return PathBuf::from(".");
    }
    app_dir
}

pub fn data_file(name: &str) -> PathBuf {
    app_data_dir().join(name)
}

/// Writes `data` next to `path` first and renames it over, so a crash never leaves
/// a half-written file behind.
pub fn write_json_to<T: Serialize>(data: &T, path: &Path) -> Result<(), VocabookError> {
    let json = serde_json::to_string_pretty(data)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json)?;
    fs::rename(&staging, path)?;
    debug!("Saved {}", path.display());
    Ok(())
}

/// Reads a JSON file. A missing file is `Ok(None)`.
pub fn read_json_from<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, VocabookError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let data = serde_json::from_str(&json)?;
    debug!("Loaded {}", path.display());
    Ok(Some(data))
}

pub fn save_json<T: Serialize>(data: &T, name: &str) -> Result<(), VocabookError> {
    write_json_to(data, &data_file(name))
}

/// Loads a data file, falling back to defaults when it is missing or unreadable.
pub fn load_json_or_default<T: DeserializeOwned + Default>(name: &str) -> T {
    read_json_or_default(&data_file(name))
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json_from(path) {
        Ok(Some(data)) => data,
        Ok(None) => T::default(),
        Err(e) => {
            warn!("Failed to load {}: {}. Using defaults.", path.display(), e);
            T::default()
        }
    }
}
