//! On-disk layout for exported configuration documents
//!
//! One directory per resource kind, one pretty-printed JSON file per node,
//! named by the node's identity. The sanitizer and restorer walk the same
//! layout directory-by-directory, files in sorted order, so runs are
//! reproducible and the stages need no cross-kind coordination.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::ResourceKind;

/// Handle on a configuration directory tree
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base: PathBuf,
}

impl ConfigStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory holding one kind's documents
    pub fn kind_dir(&self, kind: ResourceKind) -> PathBuf {
        self.base.join(kind.dir_name())
    }

    /// Create the per-kind directory layout
    pub fn ensure_layout(&self) -> Result<()> {
        for kind in ResourceKind::all() {
            let dir = self.kind_dir(*kind);
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Persist a document under its identity, pretty-printed
    pub fn write(&self, kind: ResourceKind, name: &str, doc: &Value) -> Result<PathBuf> {
        let dir = self.kind_dir(kind);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let path = dir.join(format!("{}.json", name));
        Self::write_document(&path, doc)?;
        tracing::info!("dumped {}: {}.json", kind, name);
        Ok(path)
    }

    /// Serialize a document to a path, pretty-printed with a trailing newline
    pub fn write_document(path: &Path, doc: &Value) -> Result<()> {
        let mut rendered = serde_json::to_string_pretty(doc)
            .with_context(|| format!("Failed to serialize {}", path.display()))?;
        rendered.push('\n');
        fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Sorted list of document files for a kind. A missing directory yields
    /// an empty list rather than an error.
    pub fn document_paths(&self, kind: ResourceKind) -> Result<Vec<PathBuf>> {
        let dir = self.kind_dir(kind);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read directory {}", dir.display()))?
                .path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Read and parse a stored document. Unreadable or malformed content is
    /// reported as a warning and skipped, never treated as fatal.
    pub fn read_document(path: &Path) -> Option<Value> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Identity (file stem) of a stored document
    pub fn document_name(path: &Path) -> Option<&str> {
        path.file_stem().and_then(|s| s.to_str())
    }
}
