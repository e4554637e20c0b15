//! Local candidate lifecycle
//!
//! `LocalMechanic` runs the candidate on the benchmark host itself: it owns
//! the provisioner, boots the unpacked binary as a child process and tears
//! the installation down between setups.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::collaborators::{Cluster, Mechanic};
use crate::config::ConfigStore;
use crate::error::{RaceError, Result};
use crate::io::{self, ZipArchiver};
use crate::provision::Provisioner;
use crate::track::{Track, TrackSetup};

/// Mechanic that provisions and launches the candidate on the local host
pub struct LocalMechanic {
    provisioner: Provisioner,
}

impl LocalMechanic {
    /// Create a mechanic backed by zip archive extraction
    pub fn new() -> Self {
        Self {
            provisioner: Provisioner::new(Box::new(ZipArchiver)),
        }
    }
}

impl Default for LocalMechanic {
    fn default() -> Self {
        Self::new()
    }
}

impl Mechanic for LocalMechanic {
    fn prepare_candidate(&mut self, cfg: &mut ConfigStore) -> Result<()> {
        let archive = cfg.get_str("builder", "candidate.bin.path")?;
        if !Path::new(&archive).is_file() {
            return Err(RaceError::Archive(format!(
                "candidate archive [{archive}] does not exist"
            )));
        }
        tracing::info!(archive = %archive, "candidate ready");
        Ok(())
    }

    fn start_engine(
        &mut self,
        track: &Track,
        setup: &TrackSetup,
        cfg: &mut ConfigStore,
    ) -> Result<Cluster> {
        self.provisioner.prepare(track, setup, cfg)?;

        let binary_path = PathBuf::from(cfg.get_str("provisioning", "local.binary.path")?);
        let launch_cmd = cfg.get_str("builder", "candidate.launch.cmd")?;
        let log_dir = PathBuf::from(cfg.get_str("system", "track.setup.log.dir")?);
        io::ensure_dir(&log_dir)?;

        let stdout = File::create(log_dir.join("candidate.out.log"))?;
        let stderr = File::create(log_dir.join("candidate.err.log"))?;
        let child = Command::new(binary_path.join(&launch_cmd))
            .current_dir(&binary_path)
            .stdout(stdout)
            .stderr(stderr)
            .spawn()?;
        tracing::info!(pid = child.id(), cmd = %launch_cmd, "candidate started");

        Ok(Cluster {
            binary_path,
            process: Some(child),
        })
    }

    fn stop_engine(&mut self, cluster: &mut Cluster) -> Result<()> {
        if let Some(mut child) = cluster.process.take() {
            // kill fails when the process already exited on its own
            let _ = child.kill();
            let status = child.wait()?;
            tracing::info!(status = %status, "candidate stopped");
        }
        Ok(())
    }

    fn revise_candidate(&mut self, cfg: &mut ConfigStore) -> Result<()> {
        self.provisioner.cleanup(cfg)
    }
}
