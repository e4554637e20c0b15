//! Track and track-setup definitions
//!
//! A track is a named benchmark workload with one or more configuration
//! variants (track setups). The workload internals live outside this core;
//! here tracks are plain data loaded from a JSON definition file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collaborators::Marshal;
use crate::config::ConfigStore;
use crate::error::{RaceError, Result};
use crate::io;
use crate::paths::RacePaths;

/// A named benchmark workload definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track name
    pub name: String,
    /// Estimated total benchmark duration, used only for the operator ETA
    #[serde(default)]
    pub estimated_benchmark_minutes: u64,
    /// Ordered configuration variants
    pub setups: Vec<TrackSetup>,
}

/// One configuration variant of a track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSetup {
    /// Setup name, unique within its track
    pub name: String,
    /// Candidate-side settings for this setup
    #[serde(default)]
    pub candidate: CandidateSettings,
}

/// Optional candidate configuration carried by a track setup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateSettings {
    /// Replaces the candidate's bundled logging config verbatim when set
    #[serde(default)]
    pub custom_logging_config: Option<String>,
    /// Free-form text appended to the candidate's main config file
    #[serde(default)]
    pub custom_config_snippet: Option<String>,
}

impl Track {
    /// Load track definitions from a JSON file holding either a single track
    /// or a list of tracks.
    pub fn load(path: &Path) -> Result<Vec<Track>> {
        let raw = fs::read_to_string(path)?;
        let tracks = match serde_json::from_str::<Vec<Track>>(&raw) {
            Ok(tracks) => tracks,
            Err(_) => serde_json::from_str::<Track>(&raw)
                .map(|track| vec![track])
                .map_err(|e| {
                    RaceError::Track(format!(
                        "cannot parse track file [{}]: {e}",
                        path.display()
                    ))
                })?,
        };
        for track in &tracks {
            track.validate()?;
        }
        Ok(tracks)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RaceError::Track("track name must not be empty".into()));
        }
        if self.setups.is_empty() {
            return Err(RaceError::Track(format!(
                "track [{}] declares no setups",
                self.name
            )));
        }
        for (idx, setup) in self.setups.iter().enumerate() {
            if self.setups[..idx].iter().any(|s| s.name == setup.name) {
                return Err(RaceError::Track(format!(
                    "track [{}] declares setup [{}] more than once",
                    self.name, setup.name
                )));
            }
        }
        Ok(())
    }
}

/// Marshal that prepares local track fixtures.
///
/// The real workload fixtures (datasets, mappings) are owned by the external
/// driver; this marshal only guarantees the track directories exist before
/// any setup runs.
#[derive(Debug, Default)]
pub struct FixtureMarshal;

impl Marshal for FixtureMarshal {
    fn setup(&mut self, track: &Track, cfg: &mut ConfigStore) -> Result<()> {
        let paths = RacePaths::from_config(cfg)?;
        let track_root = paths.track_root(&track.name);
        io::ensure_dir(&track_root)?;
        tracing::debug!(track = %track.name, dir = %track_root.display(), "track fixtures ready");
        Ok(())
    }
}
