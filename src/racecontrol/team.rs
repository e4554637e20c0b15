//! The racing team participant

use crate::collaborators::{Driver, Marshal, Mechanic};
use crate::config::{ConfigStore, Scope};
use crate::error::Result;
use crate::paths::RacePaths;
use crate::process;
use crate::racecontrol::Participant;
use crate::track::{Track, TrackSetup};

/// Participant that provisions, boots, drives and tears down the candidate
/// for every selected track setup.
pub struct RacingTeam {
    mechanic: Box<dyn Mechanic>,
    driver: Box<dyn Driver>,
    marshal: Box<dyn Marshal>,
}

impl RacingTeam {
    /// Create a team from its collaborators
    pub fn new(
        mechanic: Box<dyn Mechanic>,
        driver: Box<dyn Driver>,
        marshal: Box<dyn Marshal>,
    ) -> Self {
        Self {
            mechanic,
            driver,
            marshal,
        }
    }

    fn eta_minutes(tracks: &[Track]) -> u64 {
        tracks.iter().map(|t| t.estimated_benchmark_minutes).sum()
    }

    /// Engine lifecycle for one selected setup. Strictly sequential: the
    /// mechanic's engine and the scoped configuration assume single occupancy.
    fn run_setup(&mut self, track: &Track, setup: &TrackSetup, cfg: &mut ConfigStore) -> Result<()> {
        println!("Racing on track '{}' with setup '{}'", track.name, setup.name);
        tracing::info!(track = %track.name, setup = %setup.name, "racing");

        let mut cluster = self.mechanic.start_engine(track, setup, cfg)?;
        self.driver.setup(&cluster, track, setup, cfg)?;
        self.driver.go(&cluster, track, setup, cfg)?;
        self.mechanic.stop_engine(&mut cluster)?;
        self.driver.tear_down(track, setup, cfg)?;
        self.mechanic.revise_candidate(cfg)
    }
}

impl Participant for RacingTeam {
    fn prepare(&mut self, tracks: &[Track], cfg: &mut ConfigStore) -> Result<()> {
        self.mechanic.prepare_candidate(cfg)?;
        println!(
            "Racing on {} track(s). Overall ETA: {} minutes (depending on your hardware)\n",
            tracks.len(),
            Self::eta_minutes(tracks)
        );
        Ok(())
    }

    fn race(&mut self, track: &Track, cfg: &mut ConfigStore) -> Result<()> {
        let selected = cfg.get_list("benchmarks", "tracksetups.selected")?;
        // we are specific about which processes we kill: an unrelated
        // co-located service such as a metrics store must survive
        let node_prefix = cfg.get_str("provisioning", "node.name.prefix")?;
        process::kill_running_instances(&node_prefix);

        self.marshal.setup(track, cfg)?;

        let paths = RacePaths::from_config(cfg)?;
        cfg.set(
            Scope::Benchmark,
            "system",
            "track.root.dir",
            paths.track_root(&track.name),
        );

        for setup in &track.setups {
            if !selected.iter().any(|s| s == &setup.name) {
                tracing::debug!(setup = %setup.name, "skipping track setup (not selected)");
                continue;
            }

            cfg.reset(Scope::TrackSetup);
            cfg.set(
                Scope::TrackSetup,
                "system",
                "track.setup.root.dir",
                paths.track_setup_root(&track.name, &setup.name),
            );
            cfg.set(
                Scope::TrackSetup,
                "system",
                "track.setup.log.dir",
                paths.track_setup_logs(&track.name, &setup.name),
            );

            let outcome = self.run_setup(track, setup, cfg);
            if let Err(e) = &outcome {
                tracing::error!(track = %track.name, setup = %setup.name, error = %e, "race aborted");
            }
            outcome?;
        }
        Ok(())
    }
}
