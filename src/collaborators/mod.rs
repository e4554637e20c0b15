//! Collaborator seams consumed by race control
//!
//! These traits are the integration points of the orchestration core. The
//! crate ships thin local implementations (`mechanic`, `driver`, `report`,
//! `sweep`, `track`) but race control only ever sees the traits, so tests
//! substitute recording fakes and heavier implementations can be swapped in
//! without touching the control loop.

use std::path::PathBuf;
use std::process::Child;

use crate::config::ConfigStore;
use crate::error::Result;
use crate::track::{Track, TrackSetup};

/// Handle to a running candidate cluster, returned by `Mechanic::start_engine`
#[derive(Debug)]
pub struct Cluster {
    /// Root of the unpacked candidate binary
    pub binary_path: PathBuf,
    /// Running candidate process, if one was spawned
    pub process: Option<Child>,
}

/// Candidate build/start/stop lifecycle
pub trait Mechanic {
    /// One-time candidate preparation, independent of any track setup
    fn prepare_candidate(&mut self, cfg: &mut ConfigStore) -> Result<()>;

    /// Provision the candidate for one track setup and boot it
    fn start_engine(
        &mut self,
        track: &Track,
        setup: &TrackSetup,
        cfg: &mut ConfigStore,
    ) -> Result<Cluster>;

    /// Stop a running cluster
    fn stop_engine(&mut self, cluster: &mut Cluster) -> Result<()>;

    /// Prepare the candidate for the next setup's installation
    fn revise_candidate(&mut self, cfg: &mut ConfigStore) -> Result<()>;
}

/// External load driver executing the benchmark against a running cluster
pub trait Driver {
    /// Configure the driver for one track-setup run
    fn setup(
        &mut self,
        cluster: &Cluster,
        track: &Track,
        setup: &TrackSetup,
        cfg: &mut ConfigStore,
    ) -> Result<()>;

    /// Run the benchmark load
    fn go(
        &mut self,
        cluster: &Cluster,
        track: &Track,
        setup: &TrackSetup,
        cfg: &mut ConfigStore,
    ) -> Result<()>;

    /// Release driver-side state after a run
    fn tear_down(&mut self, track: &Track, setup: &TrackSetup, cfg: &mut ConfigStore)
        -> Result<()>;
}

/// Track-specific environment setup
pub trait Marshal {
    /// Prepare workload fixtures for a track
    fn setup(&mut self, track: &Track, cfg: &mut ConfigStore) -> Result<()>;
}

/// Renders accumulated results for the operator
pub trait SummaryReporter {
    /// Report results for one track; must not touch the benchmark environment
    fn report(&mut self, track: &Track, cfg: &ConfigStore) -> Result<()>;
}

/// End-of-race housekeeping, invoked once after all tracks complete
pub trait Sweeper {
    /// Run the sweep
    fn run(&mut self, cfg: &ConfigStore) -> Result<()>;
}
