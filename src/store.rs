//! Append-only CSV store for balance observations.
//!
//! File layout:
//! ```text
//! timestamp,balance
//! 2024-03-01T12:30:05.000Z,1234.56
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::types::Observation;

/// Header row written once when the file is created
pub const HEADER: [&str; 2] = ["timestamp", "balance"];

/// CSV-backed observation store
#[derive(Debug, Clone)]
pub struct ObservationStore {
    path: PathBuf,
}

impl ObservationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with a header if it is missing or empty.
    ///
    /// Existing content is never truncated or rewritten.
    pub fn ensure_initialized(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;

        let len = file.metadata().map_err(|source| self.io_error(source))?.len();
        if len > 0 {
            debug!("[STORE] Using existing {}", self.path.display());
            return Ok(());
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADER)?;
        let header = self.finish(writer)?;

        file.write_all(&header).map_err(|source| self.io_error(source))?;
        file.sync_data().map_err(|source| self.io_error(source))?;

        info!("[STORE] Created {}", self.path.display());
        Ok(())
    }

    /// Append one observation as a single write.
    ///
    /// A torn last line left by an earlier interrupted append is dropped first,
    /// and a failed write is truncated back so the file never keeps a partial row.
    pub fn append(&self, observation: &Observation) -> StoreResult<()> {
        self.append_with(observation, |file, bytes| {
            file.write_all(bytes)?;
            file.sync_data()
        })
    }

    fn append_with<F>(&self, observation: &Observation, write: F) -> StoreResult<()>
    where
        F: FnOnce(&mut File, &[u8]) -> io::Result<()>,
    {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;

        let start = self.repair_tail(&mut file)?;

        // Header goes out in the same write when nothing survived the repair
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if start == 0 {
            writer.write_record(HEADER)?;
        }
        writer.serialize(observation.to_record())?;
        let row = self.finish(writer)?;

        if let Err(source) = write(&mut file, &row) {
            if let Err(e) = file.set_len(start) {
                error!(
                    "[STORE] Failed to roll back partial row in {}: {}",
                    self.path.display(),
                    e
                );
            }
            return Err(self.io_error(source));
        }

        debug!("[STORE] Appended {} bytes to {}", row.len(), self.path.display());
        Ok(())
    }

    /// Truncate an unterminated last line; returns the resulting length.
    fn repair_tail(&self, file: &mut File) -> StoreResult<u64> {
        const CHUNK: u64 = 4096;

        let len = file.metadata().map_err(|source| self.io_error(source))?.len();
        let mut end = len;
        let mut buf = vec![0u8; CHUNK as usize];

        while end > 0 {
            let start = end.saturating_sub(CHUNK);
            let chunk = &mut buf[..(end - start) as usize];
            file.seek(SeekFrom::Start(start))
                .and_then(|_| file.read_exact(chunk))
                .map_err(|source| self.io_error(source))?;

            if let Some(pos) = chunk.iter().rposition(|&b| b == b'\n') {
                end = start + pos as u64 + 1;
                break;
            }
            end = start;
        }

        if end < len {
            warn!(
                "[STORE] Dropping {} bytes of incomplete row at end of {}",
                len - end,
                self.path.display()
            );
            file.set_len(end).map_err(|source| self.io_error(source))?;
        }
        Ok(end)
    }

    fn finish(&self, writer: csv::Writer<Vec<u8>>) -> StoreResult<Vec<u8>> {
        writer
            .into_inner()
            .map_err(|e| self.io_error(e.into_error()))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
