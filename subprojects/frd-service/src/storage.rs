//! Access to the friend services system save data archive.
//!
//! Paths are archive-relative and start with `/`, e.g. `/config` or `/1/friendlist`.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use tracing::debug;

/// System save data id of the friend services archive.
pub const SAVE_DATA_ID: u32 = 0x0001_0032;

/// Files of one system save data archive.
pub trait SaveArchive: Send {
    /// Reads a whole file.
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Replaces a whole file, creating it and its directory if needed.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError>;
}

/// Archive backed by a directory of the host filesystem.
#[derive(Debug, Clone)]
pub struct HostSaveArchive {
    root: PathBuf,
}

impl HostSaveArchive {
    /// Opens the friend services archive under `nand_dir`, creating it when missing.
    pub fn open(nand_dir: &Path) -> Result<Self, StorageError> {
        let root = Self::archive_dir(nand_dir);
        if !root.is_dir() {
            debug!(path = %root.display(), "creating system save data archive");
            fs_err::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    /// Host directory holding the archive.
    pub fn archive_dir(nand_dir: &Path) -> PathBuf {
        nand_dir
            .join("data")
            .join("00000000000000000000000000000000")
            .join("sysdata")
            .join(format!("{SAVE_DATA_ID:08x}"))
            .join("00000000")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = path.trim_start_matches('/');
        let valid = !relative.is_empty()
            && relative
                .split('/')
                .all(|part| !part.is_empty() && part != "." && part != "..");
        if !valid {
            return Err(StorageError::InvalidPath(path.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

impl SaveArchive for HostSaveArchive {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let host_path = self.host_path(path)?;
        fs_err::read(host_path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path.to_owned()),
            _ => StorageError::Io(error),
        })
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let host_path = self.host_path(path)?;
        if let Some(parent) = host_path.parent() {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(host_path, data)?;
        Ok(())
    }
}

/// Archive held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.files.insert(path.into(), data);
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }
}

impl SaveArchive for MemoryArchive {
    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.get(path)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| StorageError::NotFound(path.to_owned()))
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        self.insert(path, data.to_vec());
        Ok(())
    }
}

/// Error accessing the save data archive.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file \"{0}\" not found")]
    NotFound(String),

    #[error("invalid archive path \"{0}\"")]
    InvalidPath(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
