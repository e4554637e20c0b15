//! Filesystem and archive utilities

use std::fs;
use std::path::Path;

use crate::error::{RaceError, Result};

/// Create a directory and all of its parents if they do not exist yet
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Recursively remove a file or directory.
///
/// A missing path is not an error; returns whether anything was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

/// Unpacks candidate archives into an installation directory
pub trait Archiver {
    /// Extract `archive` into `dest`, which must already exist
    fn unpack(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// Archiver backed by zip archives
#[derive(Debug, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn unpack(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = fs::File::open(archive)?;
        let mut zip = zip::ZipArchive::new(file)
            .map_err(|e| RaceError::Archive(format!("cannot read [{}]: {e}", archive.display())))?;
        zip.extract(dest).map_err(|e| {
            RaceError::Archive(format!(
                "cannot extract [{}] to [{}]: {e}",
                archive.display(),
                dest.display()
            ))
        })
    }
}
