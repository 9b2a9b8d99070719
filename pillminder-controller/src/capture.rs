//! Schedule capture
//!
//! A capture source delivers schedule payloads as text while a record
//! session runs. The session keeps only distinct payloads, so a source may
//! report the same one repeatedly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Source of captured schedule payloads
pub trait Capture: Send {
    /// Payloads seen since the last call
    fn poll(&mut self) -> Vec<String>;
}

/// Reads `*.json` payloads dropped into a directory
///
/// Each file is consumed once it has been read.
#[derive(Debug, Clone)]
pub struct InboxCapture {
    dir: PathBuf,
}

impl InboxCapture {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn pending(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Capture for InboxCapture {
    fn poll(&mut self) -> Vec<String> {
        let files = match self.pending() {
            Ok(files) => files,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("cannot scan {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut payloads = Vec::with_capacity(files.len());
        for path in files {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    debug!("captured {}", path.display());
                    payloads.push(text);
                }
                Err(e) => {
                    warn!("cannot read {}: {}", path.display(), e);
                    continue;
                }
            }
            if let Err(e) = fs::remove_file(&path) {
                warn!("cannot remove {}: {}", path.display(), e);
            }
        }
        payloads
    }
}
