//! End-of-race housekeeping

use std::fs::File;
use std::io::copy;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::collaborators::Sweeper;
use crate::config::ConfigStore;
use crate::error::{RaceError, Result};
use crate::io;

/// Sweeper archiving the race's log directory into a single zip and
/// removing the unpacked logs afterwards.
#[derive(Debug, Default)]
pub struct LogSweeper;

impl Sweeper for LogSweeper {
    fn run(&mut self, cfg: &ConfigStore) -> Result<()> {
        let log_root = cfg.get_str("system", "log.root.dir")?;
        let log_root = Path::new(&log_root);
        if !log_root.is_dir() {
            tracing::debug!(dir = %log_root.display(), "no logs to sweep");
            return Ok(());
        }

        let archive = log_root.with_extension("zip");
        zip_dir(log_root, &archive)?;
        io::remove_if_exists(log_root)?;
        tracing::info!(archive = %archive.display(), "race logs archived");
        println!("Race logs archived at {}", archive.display());
        Ok(())
    }
}

/// Write the contents of `src` recursively into a zip archive at `dest`
fn zip_dir(src: &Path, dest: &Path) -> Result<()> {
    let file = File::create(dest)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    add_dir(&mut writer, src, src, &options)?;
    writer
        .finish()
        .map_err(|e| RaceError::Archive(e.to_string()))?;
    Ok(())
}

fn add_dir(
    writer: &mut zip::ZipWriter<File>,
    base: &Path,
    dir: &Path,
    options: &SimpleFileOptions,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let name = path
            .strip_prefix(base)
            .expect("entry path is under the base directory")
            .to_string_lossy()
            .replace('\\', "/");
        if path.is_dir() {
            writer
                .add_directory(name, options.clone())
                .map_err(|e| RaceError::Archive(e.to_string()))?;
            add_dir(writer, base, &path, options)?;
        } else {
            writer
                .start_file(name, options.clone())
                .map_err(|e| RaceError::Archive(e.to_string()))?;
            copy(&mut File::open(&path)?, writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scope;
    use crate::io::{Archiver, ZipArchiver};
    use std::fs;

    #[test]
    fn test_sweep_archives_and_removes_logs() {
        let root = tempfile::tempdir().unwrap();
        let log_root = root.path().join("logs");
        fs::create_dir_all(log_root.join("geonames/defaults")).unwrap();
        fs::write(log_root.join("geonames/defaults/candidate.out.log"), b"ok").unwrap();

        let mut cfg = ConfigStore::new();
        cfg.set(Scope::Global, "system", "log.root.dir", log_root.clone());

        LogSweeper.run(&cfg).unwrap();

        let archive = log_root.with_extension("zip");
        assert!(archive.is_file());
        assert!(!log_root.exists());

        // the archive unpacks back to the original layout
        let unpacked = root.path().join("unpacked");
        fs::create_dir_all(&unpacked).unwrap();
        ZipArchiver.unpack(&archive, &unpacked).unwrap();
        assert_eq!(
            fs::read(unpacked.join("geonames/defaults/candidate.out.log")).unwrap(),
            b"ok"
        );
    }

    #[test]
    fn test_sweep_without_logs_is_noop() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = ConfigStore::new();
        cfg.set(
            Scope::Global,
            "system",
            "log.root.dir",
            root.path().join("never-created"),
        );
        LogSweeper.run(&cfg).unwrap();
    }
}
