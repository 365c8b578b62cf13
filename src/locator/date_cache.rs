//! On-disk cache of resolved dates.
//!
//! A plain JSON mapping from ISO date string to block number, consulted
//! before any node call and replaced wholesale on commit.

use std::{collections::BTreeMap, fs, path::PathBuf};

use crate::error::ScanError;

pub struct DateCache {
    path: PathBuf,
    entries: BTreeMap<String, u64>,
}

impl DateCache {
    pub fn restore(path: impl Into<PathBuf>) -> Result<Self, ScanError> {
        let path = path.into();
        let entries = if path.exists() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes).map_err(|e| ScanError::CorruptState {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, date: &str) -> Option<u64> {
        self.entries.get(date).copied()
    }

    pub fn insert(&mut self, date: &str, block: u64) {
        self.entries.insert(date.to_string(), block);
    }

    pub fn commit(&self) -> Result<(), ScanError> {
        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec(&self.entries).map_err(|e| ScanError::CorruptState {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
