use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::PipelineError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @requires: Upstream artifact, halting the stage when absent
    pub fn require_artifact<P: AsRef<Path>>(path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        if Self::file_exists(path) {
            Ok(())
        } else {
            Err(PipelineError::MissingArtifact(path.to_path_buf()))
        }
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Non-blank lines of a reference file, trailing newline characters removed
    pub fn read_reference_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let content = Self::read_to_string(path)?;
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect())
    }

    /// Read and deserialize a JSON file
    pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let path = path.as_ref();
        let content = Self::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            PipelineError::MalformedInput {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Write bytes through a temp file in the target directory and rename it into place
    ///
    /// Readers never observe a half-written file.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self::ensure_dir(parent)?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {:?}", parent))?;
        temp.write_all(content)
            .with_context(|| format!("Failed to write temp file for {:?}", path))?;
        temp.flush()?;
        temp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move output into place: {:?}", path))?;

        Ok(())
    }

    /// Serialize as indented JSON, non-ASCII kept literal, and write atomically
    pub fn write_json_atomic<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
        let mut json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        json.push('\n');
        Self::write_atomic(path, json.as_bytes())
    }
}
