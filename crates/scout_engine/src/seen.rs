use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use scout_logging::{scout_debug, scout_info};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("store directory missing or not writable: {0}")]
    StoreDir(String),
    #[error("entry cannot be stored on a single line: {0:?}")]
    InvalidEntry(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Durable set of links that have already been announced.
pub trait SeenStore: Send + Sync {
    /// All recorded links. Absent storage is an empty set.
    fn read_all(&self) -> Result<HashSet<String>, PersistError>;

    /// Appends `link`. Returns only once the entry is durable.
    fn record(&self, link: &str) -> Result<(), PersistError>;
}

/// Ensure the store directory exists; create if missing.
pub fn ensure_store_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::StoreDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::StoreDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::StoreDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::StoreDir(e.to_string()))?;
    Ok(())
}

/// One link per line, UTF-8, newline-terminated. Never rewritten, only appended.
#[derive(Debug, Clone)]
pub struct LineFileSeenStore {
    path: PathBuf,
}

impl LineFileSeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeenStore for LineFileSeenStore {
    fn read_all(&self) -> Result<HashSet<String>, PersistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                scout_debug!("No seen store at {:?} yet", self.path);
                return Ok(HashSet::new());
            }
            Err(err) => return Err(err.into()),
        };

        let links: HashSet<String> = content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(ToOwned::to_owned)
            .collect();
        scout_debug!("Loaded {} seen links from {:?}", links.len(), self.path);
        Ok(links)
    }

    fn record(&self, link: &str) -> Result<(), PersistError> {
        if link.is_empty() || link.contains(['\n', '\r']) {
            return Err(PersistError::InvalidEntry(link.to_string()));
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_store_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        let entry = if ends_mid_line(&mut file)? {
            scout_debug!("{:?} lacks a final newline; terminating it", self.path);
            format!("\n{link}\n")
        } else {
            format!("{link}\n")
        };
        file.write_all(entry.as_bytes())?;
        file.flush()?;
        file.sync_all()?;

        scout_info!("Recorded {} in {:?}", link, self.path);
        Ok(())
    }
}

fn ends_mid_line(file: &mut fs::File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
