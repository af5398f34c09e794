//! Manifest assembly.

use std::fs;
use std::path::Path;

use crate::error::{ExportError, Result};
use crate::types::ImageManifestEntry;

/// Collects manifest entries in the order images were exported.
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    entries: Vec<ImageManifestEntry>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ImageManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: ImageManifestEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ImageManifestEntry] {
        &self.entries
    }

    pub fn finish(self) -> Vec<ImageManifestEntry> {
        self.entries
    }

    /// One UTF-8 JSON document per entry.
    pub fn to_json_records(&self) -> Result<Vec<Vec<u8>>> {
        self.entries
            .iter()
            .map(|entry| {
                serde_json::to_vec(entry).map_err(|e| ExportError::Parse {
                    message: format!("Failed to serialize manifest entry '{}': {}", entry.name, e),
                    help: None,
                })
            })
            .collect()
    }

    /// Write all entries as a pretty-printed JSON array.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| ExportError::Parse {
            message: format!("Failed to serialize manifest: {}", e),
            help: None,
        })?;
        fs::write(path, json).map_err(|e| ExportError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write manifest: {}", e),
        })
    }
}
