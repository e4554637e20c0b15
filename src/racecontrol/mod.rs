//! Race control
//!
//! Top-level control loop: resolves which participants run for the requested
//! command, drives the two-phase participant protocol (`prepare` once with
//! the full track list, then `race` once per participant per track) and
//! triggers the end-of-race sweep. Single pass, fail-fast, no retries.

mod press;
mod team;

pub use press::Press;
pub use team::RacingTeam;

use crate::collaborators::Sweeper;
use crate::config::{ConfigStore, Scope};
use crate::error::{RaceError, Result};
use crate::track::Track;

/// The fixed command set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Race and report
    All,
    /// Race only
    Race,
    /// Report only
    Report,
}

impl Command {
    /// Resolve a command name; unrecognized input is a terminal,
    /// user-visible error.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "all" => Ok(Command::All),
            "race" => Ok(Command::Race),
            "report" => Ok(Command::Report),
            other => Err(RaceError::UnknownCommand(other.to_owned())),
        }
    }
}

/// A unit of work executed per track.
///
/// `prepare` is called once with the full track list (upfront ETA, one-time
/// setup of heavyweight collaborators); `race` is called once per track and
/// must not rely on residual state from a previous track.
pub trait Participant {
    /// One-time preparation with the full track list
    fn prepare(&mut self, tracks: &[Track], cfg: &mut ConfigStore) -> Result<()>;

    /// Execute this participant's work for one track
    fn race(&mut self, track: &Track, cfg: &mut ConfigStore) -> Result<()>;
}

/// Builds participants and the sweeper for race control.
///
/// Keeps the command-to-participant mapping independent of how collaborators
/// are constructed, so tests substitute recording fakes.
pub trait Garage {
    /// A racing team wired to this garage's collaborators
    fn racing_team(&mut self) -> Box<dyn Participant>;

    /// A press participant, optionally in report-only mode
    fn press(&mut self, report_only: bool) -> Box<dyn Participant>;

    /// The end-of-race sweeper
    fn sweeper(&mut self) -> Box<dyn Sweeper>;
}

/// Top-level race loop
pub struct RaceControl {
    participants: Vec<Box<dyn Participant>>,
    sweeper: Box<dyn Sweeper>,
}

impl RaceControl {
    /// Resolve the participant list for a command name
    pub fn for_command(name: &str, garage: &mut dyn Garage) -> Result<Self> {
        let command = Command::parse(name)?;
        tracing::info!(command = name, "executing command");
        let participants: Vec<Box<dyn Participant>> = match command {
            Command::All => vec![garage.racing_team(), garage.press(false)],
            Command::Race => vec![garage.racing_team()],
            Command::Report => vec![garage.press(true)],
        };
        Ok(Self {
            participants,
            sweeper: garage.sweeper(),
        })
    }

    /// Run the race: prepare every participant, iterate tracks, sweep.
    ///
    /// The first hard error aborts the race; scoped configuration of a failed
    /// run may be inconsistent, so later tracks are not attempted.
    pub fn start(&mut self, tracks: &[Track], cfg: &mut ConfigStore) -> Result<()> {
        for participant in &mut self.participants {
            participant.prepare(tracks, cfg)?;
        }

        for track in tracks {
            cfg.reset(Scope::Benchmark);
            for participant in &mut self.participants {
                participant.race(track, cfg)?;
            }
        }

        println!("\nAll tracks done.");
        self.sweeper.run(cfg)
    }
}
