use log::error;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::settings::SettingsRecord;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable per-account settings, one JSON file per email address.
pub struct AccountStore {
    base: PathBuf,
}

impl AccountStore {
    pub fn new(base: PathBuf) -> Self {
        AccountStore { base }
    }

    fn account_path(&self, email: &str) -> PathBuf {
        self.base.join(format!("{}.json", file_stem(email)))
    }

    pub fn load(&self, email: &str) -> Result<Option<SettingsRecord>, StorageError> {
        let path = self.account_path(email);

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                error!("Failed to parse settings file {}: {}", path.display(), e);
                Err(e.into())
            }
        }
    }

    /// Replaces the stored record; readers never see a half-written file.
    pub fn save(&self, email: &str, record: &SettingsRecord) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.base)?;

        let content = serde_json::to_string_pretty(record)?;
        let path = self.account_path(email);
        // Each writer stages its own file so overlapping saves never share one.
        let mut staging = NamedTempFile::new_in(&self.base)?;
        staging.write_all(content.as_bytes())?;
        staging.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Maps an email to a file name that cannot escape the store folder.
/// A leading dot and anything outside `[A-Za-z0-9@.-]` become `_xx` (hex
/// byte), so distinct addresses never collide.
fn file_stem(email: &str) -> String {
    let mut stem = String::with_capacity(email.len());
    for byte in email.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'@' | b'-' => stem.push(byte as char),
            b'.' if !stem.is_empty() => stem.push('.'),
            _ => {
                let _ = write!(stem, "_{byte:02x}");
            }
        }
    }
    stem
}
