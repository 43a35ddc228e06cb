//! Case record persistence with file locking.
//!
//! A case file holds the committed fracture list for the active case.
//! Saves are atomic (temp file plus rename) so a crash never leaves a
//! half-written case behind.

use crate::{CaseRecord, Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl CaseRecord {
    /// Load a case from a file with shared locking
    ///
    /// Returns a fresh case if the file doesn't exist. If the file is
    /// corrupted, logs a warning and returns a fresh case.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No case file found, starting a fresh case");
            return Ok(Self::new());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open case file {:?}: {}. Starting fresh.", path, e);
                return Ok(Self::new());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock case file {:?}: {}. Starting fresh.", path, e);
            return Ok(Self::new());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read case file {:?}: {}. Starting fresh.", path, e);
            return Ok(Self::new());
        }

        file.unlock()?;

        match serde_json::from_str::<CaseRecord>(&contents) {
            Ok(case) => {
                tracing::debug!("Loaded case {} from {:?}", case.id, path);
                Ok(case)
            }
            Err(e) => {
                tracing::warn!("Failed to parse case file {:?}: {}. Starting fresh.", path, e);
                Ok(Self::new())
            }
        }
    }

    /// Save the case to a file with exclusive locking
    ///
    /// Writes to a temp file in the same directory, syncs it, then
    /// renames it over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            Error::Case(format!("case path {:?} has no parent directory", path))
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved case {} to {:?}", self.id, path);
        Ok(())
    }

    /// Load the case, modify it, and save it back atomically
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut CaseRecord) -> Result<()>,
    {
        let mut case = Self::load(path)?;
        f(&mut case)?;
        case.save(path)?;
        Ok(case)
    }
}
