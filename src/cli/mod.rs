//! CLI argument parsing and command handling

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::collaborators::Sweeper;
use crate::config::{ConfigStore, Scope};
use crate::driver::ExternalDriver;
use crate::mechanic::LocalMechanic;
use crate::racecontrol::{Garage, Participant, Press, RaceControl, RacingTeam};
use crate::report::TextSummaryReporter;
use crate::sweep::LogSweeper;
use crate::track::{FixtureMarshal, Track};

/// pitwall - benchmark race orchestrator for server candidates
#[derive(Parser, Debug)]
#[command(name = "pitwall")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Command to execute (all, race, report)
    #[arg(default_value = "all")]
    pub command: String,

    /// Track definition file (JSON, single track or list)
    #[arg(short, long)]
    pub track_file: PathBuf,

    /// Candidate binary archive to race
    #[arg(short, long)]
    pub candidate_archive: PathBuf,

    /// Root directory for races, installations and logs
    #[arg(long, default_value = "benchmarks")]
    pub root_dir: PathBuf,

    /// Track setups to run; all declared setups when omitted
    #[arg(long, value_delimiter = ',')]
    pub track_setups: Vec<String>,

    /// Environment name, used to derive the cluster name
    #[arg(long, env = "PITWALL_ENV_NAME", default_value = "local")]
    pub env_name: String,

    /// Keep the candidate installation and data paths after the race
    #[arg(long)]
    pub preserve_install: bool,

    /// Extra data roots; data persists there across runs of the same track
    #[arg(long, value_delimiter = ',')]
    pub data_paths: Vec<String>,

    /// Launch script of the unpacked candidate, relative to its root
    #[arg(long, default_value = "bin/candidate")]
    pub launch_cmd: String,

    /// Name prefix of the unpacked candidate directory inside the archive
    #[arg(long, default_value = "candidate-")]
    pub dist_prefix: String,

    /// Subdirectory of the track-setup root holding the installation
    #[arg(long, default_value = "install")]
    pub install_dir: String,

    /// Process-name prefix of candidate nodes, used to kill leftovers
    #[arg(long, default_value = "pitwall-node-")]
    pub node_prefix: String,

    /// External load command; the load phase is skipped when omitted
    #[arg(long)]
    pub driver_command: Option<String>,
}

impl Cli {
    /// Run the requested command
    pub fn run(&self) -> Result<()> {
        let tracks = Track::load(&self.track_file).with_context(|| {
            format!("failed to load tracks from {}", self.track_file.display())
        })?;

        println!("pitwall - benchmark race orchestrator");
        println!("  Command:    {}", self.command);
        println!("  Tracks:     {}", track_names(&tracks));
        println!("  Candidate:  {}", self.candidate_archive.display());
        println!("  Env:        {}", self.env_name);
        println!();

        let mut cfg = ConfigStore::new();
        self.seed_config(&mut cfg, &tracks)?;

        let mut garage = LocalGarage;
        let mut control = RaceControl::for_command(&self.command, &mut garage)?;
        control.start(&tracks, &mut cfg)?;
        Ok(())
    }

    /// Seed the Global scope from CLI arguments. Global values live for the
    /// whole process and are never cleared.
    fn seed_config(&self, cfg: &mut ConfigStore, tracks: &[Track]) -> Result<()> {
        let race_root = self.race_root()?;
        let log_root = race_root.join("logs");

        cfg.set(Scope::Global, "system", "env.name", self.env_name.as_str());
        cfg.set(Scope::Global, "system", "race.root.dir", race_root);
        cfg.set(Scope::Global, "system", "log.root.dir", log_root);

        cfg.set(
            Scope::Global,
            "builder",
            "candidate.bin.path",
            self.candidate_archive.as_path(),
        );
        cfg.set(
            Scope::Global,
            "builder",
            "candidate.launch.cmd",
            self.launch_cmd.as_str(),
        );
        cfg.set(
            Scope::Global,
            "builder",
            "candidate.dist.prefix",
            self.dist_prefix.as_str(),
        );

        cfg.set(
            Scope::Global,
            "provisioning",
            "local.install.dir",
            self.install_dir.as_str(),
        );
        cfg.set(
            Scope::Global,
            "provisioning",
            "install.preserve",
            self.preserve_install,
        );
        cfg.set(
            Scope::Global,
            "provisioning",
            "node.name.prefix",
            self.node_prefix.as_str(),
        );
        if !self.data_paths.is_empty() {
            cfg.set(
                Scope::Global,
                "provisioning",
                "datapaths",
                self.data_paths.clone(),
            );
        }

        let selected = if self.track_setups.is_empty() {
            tracks
                .iter()
                .flat_map(|t| t.setups.iter().map(|s| s.name.clone()))
                .collect()
        } else {
            self.track_setups.clone()
        };
        cfg.set(Scope::Global, "benchmarks", "tracksetups.selected", selected);

        if let Some(command) = &self.driver_command {
            cfg.set(Scope::Global, "driver", "command", command.as_str());
        }
        Ok(())
    }

    /// The race root: a fresh timestamped directory, except in report-only
    /// mode where the last recorded race is reread.
    fn race_root(&self) -> Result<PathBuf> {
        let races = self.root_dir.join("races");
        if self.command == "report" {
            if let Some(last) = latest_race_root(&races)? {
                return Ok(last);
            }
        }
        let stamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
        Ok(races.join(stamp.to_string()))
    }
}

/// Most recent race directory under `races`, by timestamp-ordered name
fn latest_race_root(races: &Path) -> Result<Option<PathBuf>> {
    if !races.is_dir() {
        return Ok(None);
    }
    let mut dirs: Vec<PathBuf> = fs::read_dir(races)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs.pop())
}

fn track_names(tracks: &[Track]) -> String {
    tracks
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Garage wiring the local collaborator implementations
struct LocalGarage;

impl Garage for LocalGarage {
    fn racing_team(&mut self) -> Box<dyn Participant> {
        Box::new(RacingTeam::new(
            Box::new(LocalMechanic::new()),
            Box::new(ExternalDriver),
            Box::new(FixtureMarshal),
        ))
    }

    fn press(&mut self, report_only: bool) -> Box<dyn Participant> {
        Box::new(Press::new(Box::new(TextSummaryReporter), report_only))
    }

    fn sweeper(&mut self) -> Box<dyn Sweeper> {
        Box::new(LogSweeper)
    }
}
