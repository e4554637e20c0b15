//! Directory layout of a race
//!
//! All derived directories hang off two roots seeded at Global scope:
//! the race root (installations, fixtures) and the log root.

use std::path::PathBuf;

use crate::config::ConfigStore;
use crate::error::Result;

/// Resolves race, track and track-setup directories from configuration
#[derive(Debug, Clone)]
pub struct RacePaths {
    race_root: PathBuf,
    log_root: PathBuf,
}

impl RacePaths {
    /// Read the race and log roots from configuration
    pub fn from_config(cfg: &ConfigStore) -> Result<Self> {
        Ok(Self {
            race_root: PathBuf::from(cfg.get_str("system", "race.root.dir")?),
            log_root: PathBuf::from(cfg.get_str("system", "log.root.dir")?),
        })
    }

    /// Root directory of one track's run
    pub fn track_root(&self, track: &str) -> PathBuf {
        self.race_root.join("tracks").join(track)
    }

    /// Root directory of one track-setup run, holding the installation
    pub fn track_setup_root(&self, track: &str, setup: &str) -> PathBuf {
        self.track_root(track).join(setup)
    }

    /// Log directory of one track-setup run
    pub fn track_setup_logs(&self, track: &str, setup: &str) -> PathBuf {
        self.log_root.join(track).join(setup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scope;

    fn paths() -> RacePaths {
        let mut cfg = ConfigStore::new();
        cfg.set(Scope::Global, "system", "race.root.dir", "/races/2026-08-25");
        cfg.set(Scope::Global, "system", "log.root.dir", "/races/2026-08-25/logs");
        RacePaths::from_config(&cfg).unwrap()
    }

    #[test]
    fn test_track_dirs_nest_under_race_root() {
        let paths = paths();
        assert_eq!(
            paths.track_root("geonames"),
            PathBuf::from("/races/2026-08-25/tracks/geonames")
        );
        assert_eq!(
            paths.track_setup_root("geonames", "4gheap"),
            PathBuf::from("/races/2026-08-25/tracks/geonames/4gheap")
        );
    }

    #[test]
    fn test_setup_logs_nest_under_log_root() {
        let paths = paths();
        assert_eq!(
            paths.track_setup_logs("geonames", "defaults"),
            PathBuf::from("/races/2026-08-25/logs/geonames/defaults")
        );
    }

    #[test]
    fn test_missing_roots_fail() {
        let cfg = ConfigStore::new();
        assert!(RacePaths::from_config(&cfg).is_err());
    }
}
