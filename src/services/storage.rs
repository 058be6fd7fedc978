//! JSON document persistence helpers

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::StoreError;

/// Default data directory, e.g. `~/.local/share/shadowbox-timer`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shadowbox-timer")
}

/// Read a JSON document, or `T::default()` when the file does not exist yet
pub fn load_json<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    match fs::read_to_string(path) {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} does not exist yet", path.display());
            Ok(T::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Write a JSON document through a temporary file so readers never see half a file
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    debug!("Saved {}", path.display());
    Ok(())
}

/// Short unique id: base-36 milliseconds followed by a base-36 sequence number
pub fn generate_id() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}{}", to_base36(millis), to_base36(seq))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
