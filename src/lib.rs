//! pitwall - benchmark race orchestrator for server candidates
//!
//! This library provides the control core for running a performance benchmark
//! against a server candidate across one or more track setups:
//!
//! - **Config**: layered configuration store with scope-shadowed reads
//! - **Provision**: candidate installation, configuration and teardown
//! - **Race control**: command resolution and the participant lifecycle
//! - **Collaborators**: the trait seams for mechanic, driver, marshal,
//!   reporter and sweeper, with thin local implementations

pub mod cli;
pub mod collaborators;
pub mod config;
pub mod driver;
pub mod error;
pub mod io;
pub mod mechanic;
pub mod paths;
pub mod process;
pub mod provision;
pub mod racecontrol;
pub mod report;
pub mod sweep;
pub mod track;

// Re-export commonly used types
pub use config::{ConfigStore, ConfigValue, Scope};
pub use error::{RaceError, Result};
pub use provision::Provisioner;
pub use racecontrol::{Command, Participant, Press, RaceControl, RacingTeam};
pub use track::{Track, TrackSetup};
