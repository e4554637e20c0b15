//! External load driver
//!
//! The load generator itself is not part of the race-control core.
//! `ExternalDriver` hands off to an operator-configured command and records
//! the outcome of each run as a result record in the setup's log directory.

use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use crate::collaborators::{Cluster, Driver};
use crate::config::ConfigStore;
use crate::error::{RaceError, Result};
use crate::io;
use crate::report::{RaceResult, RESULT_FILE};
use crate::track::{Track, TrackSetup};

/// Driver shelling out to a configured load command.
///
/// The command receives the run context through `PITWALL_*` environment
/// variables. When no command is configured the load phase is skipped with
/// a warning, which keeps provisioning dry-runs possible.
#[derive(Debug, Default)]
pub struct ExternalDriver;

impl Driver for ExternalDriver {
    fn setup(
        &mut self,
        _cluster: &Cluster,
        track: &Track,
        setup: &TrackSetup,
        cfg: &mut ConfigStore,
    ) -> Result<()> {
        let log_dir = PathBuf::from(cfg.get_str("system", "track.setup.log.dir")?);
        io::ensure_dir(&log_dir)?;
        tracing::debug!(track = %track.name, setup = %setup.name, "driver ready");
        Ok(())
    }

    fn go(
        &mut self,
        cluster: &Cluster,
        track: &Track,
        setup: &TrackSetup,
        cfg: &mut ConfigStore,
    ) -> Result<()> {
        let Some(command) = cfg.get_str_opt("driver", "command")? else {
            tracing::warn!("no driver command configured; skipping load phase");
            return Ok(());
        };
        let log_dir = PathBuf::from(cfg.get_str("system", "track.setup.log.dir")?);

        tracing::info!(command = %command, "handing off to load driver");
        let started = Instant::now();
        let status = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .env("PITWALL_TRACK", &track.name)
            .env("PITWALL_TRACK_SETUP", &setup.name)
            .env("PITWALL_CANDIDATE", &cluster.binary_path)
            .env("PITWALL_LOG_DIR", &log_dir)
            .status()?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let result = RaceResult {
            track: track.name.clone(),
            setup: setup.name.clone(),
            duration_ms,
            exit_status: status.code().unwrap_or(-1),
        };
        std::fs::write(
            log_dir.join(RESULT_FILE),
            serde_json::to_string_pretty(&result)
                .map_err(|e| RaceError::Driver(e.to_string()))?,
        )?;

        if !status.success() {
            return Err(RaceError::Driver(format!(
                "load command failed with {status} on track [{}] setup [{}]",
                track.name, setup.name
            )));
        }
        Ok(())
    }

    fn tear_down(
        &mut self,
        track: &Track,
        setup: &TrackSetup,
        _cfg: &mut ConfigStore,
    ) -> Result<()> {
        tracing::debug!(track = %track.name, setup = %setup.name, "driver state released");
        Ok(())
    }
}
