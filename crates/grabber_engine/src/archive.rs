use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use engine_logging::{engine_info, engine_warn};
use grabber_core::{archive_entry_name, TaskIndex};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("compression task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Bytes,
}

impl ArchiveEntry {
    /// Entry for the task at `index`, named after its URL's extension.
    pub fn for_task(index: TaskIndex, url: &str, bytes: Bytes) -> Self {
        Self {
            name: archive_entry_name(index, url),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedArchive {
    pub bytes: Bytes,
    pub suggested_name: String,
    pub entry_count: usize,
}

/// `images_<unix-millis>.zip`
pub fn suggested_archive_name(unix_millis: i64) -> String {
    format!("images_{unix_millis}.zip")
}

/// Collects successful payloads and compresses them in one pass.
#[derive(Debug)]
pub struct ArchiveBuilder {
    entries: Mutex<BTreeMap<String, Bytes>>,
    compression_level: i64,
}

impl ArchiveBuilder {
    pub fn new(compression_level: i64) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            compression_level,
        }
    }

    /// Inserts by name; a repeated name replaces the earlier payload.
    pub fn add(&self, entry: ArchiveEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.insert(entry.name.clone(), entry.bytes).is_some() {
            engine_warn!("archive entry {} replaced", entry.name);
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compresses every entry into a zip. Consumes the builder, so it runs once per job.
    ///
    /// With no entries this still yields a valid, empty archive; deciding
    /// whether that is an error is left to the caller.
    pub fn finalize(self, suggested_name: String) -> Result<FinishedArchive, ArchiveError> {
        let entries = self
            .entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if entries.is_empty() {
            engine_warn!("finalizing archive {} with no entries", suggested_name);
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level));
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in &entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        let bytes = zip.finish()?.into_inner();

        engine_info!(
            "archive {} finalized: {} entries, {} bytes",
            suggested_name,
            entries.len(),
            bytes.len()
        );
        Ok(FinishedArchive {
            bytes: Bytes::from(bytes),
            suggested_name,
            entry_count: entries.len(),
        })
    }
}
