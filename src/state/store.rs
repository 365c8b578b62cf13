//! Durable storage for [`CheckpointedState`].
//!
//! The state is one JSON document replaced wholesale on every commit: the
//! serialized bytes go to a temp file that is renamed over the target, so
//! a crash mid-write leaves the previous commit intact and the checkpoint
//! can never run ahead of the events it implies.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;

use crate::error::ScanError;

use super::checkpoint::CheckpointedState;

pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted state, or return an empty one if the file does
    /// not exist yet. An unparseable file is surfaced as `CorruptState`;
    /// it is never silently discarded or repaired.
    pub fn restore(&self) -> Result<CheckpointedState, ScanError> {
        if !self.path.exists() {
            return Ok(CheckpointedState::new());
        }

        let bytes = fs::read(&self.path)?;
        serde_json::from_slice(&bytes).map_err(|e| ScanError::CorruptState {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Persist the full event mapping and advance `last_scanned_block` to
    /// `upto_block`. This is the only place the checkpoint moves.
    pub fn commit(
        &self,
        state: &mut CheckpointedState,
        upto_block: u64,
    ) -> Result<(), ScanError> {
        state.advance(upto_block);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec(state).map_err(|e| ScanError::CorruptState {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        debug!(
            "committed {} events up to block {} -> {}",
            state.event_count(),
            upto_block,
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;
    use tempfile::tempdir;

    use super::*;
    use crate::state::checkpoint::{EventKind, EventRecord};

    #[test]
    fn restore_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonStateFile::new(dir.path().join("state.json"));
        let state = store.restore().unwrap();
        assert_eq!(state.last_scanned_block, None);
        assert_eq!(state.event_count(), 0);
    }

    #[test]
    fn commit_then_restore_round_trips() {
        let dir = tempdir().unwrap();
        let store = JsonStateFile::new(dir.path().join("state.json"));

        let mut state = CheckpointedState::new();
        state
            .merge(EventRecord {
                block_number: 42,
                tx_hash: "0xcc".to_string(),
                log_index: 1,
                kind: EventKind::Sync {
                    reserve0: U256::from(10u64),
                    reserve1: U256::from(20u64),
                },
            })
            .unwrap();
        store.commit(&mut state, 42).unwrap();

        let restored = store.restore().unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.last_scanned_block, Some(42));
    }

    #[test]
    fn corrupt_file_is_reported_not_repaired() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = JsonStateFile::new(&path);
        assert!(matches!(
            store.restore(),
            Err(ScanError::CorruptState { .. })
        ));
        // The broken file must still be on disk for diagnosis.
        assert!(path.exists());
    }
}
