//! Race result reporting

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collaborators::SummaryReporter;
use crate::config::ConfigStore;
use crate::error::Result;
use crate::track::Track;

/// Result record of one track-setup run, written by the driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    /// Track name
    pub track: String,
    /// Track-setup name
    pub setup: String,
    /// Wall-clock duration of the load phase
    pub duration_ms: u64,
    /// Exit status of the load command
    pub exit_status: i32,
}

/// File name of the per-setup result record inside the setup log dir
pub const RESULT_FILE: &str = "results.json";

/// Reporter printing a plain-text summary per track
#[derive(Debug, Default)]
pub struct TextSummaryReporter;

impl SummaryReporter for TextSummaryReporter {
    fn report(&mut self, track: &Track, cfg: &ConfigStore) -> Result<()> {
        let log_root = cfg.get_str("system", "log.root.dir")?;
        let results = collect_results(&Path::new(&log_root).join(&track.name))?;
        if results.is_empty() {
            println!("No results recorded for track '{}'.", track.name);
            return Ok(());
        }

        println!("\nResults for track '{}':", track.name);
        println!("{:<24} {:>14} {:>8}", "track setup", "duration (ms)", "status");
        for result in &results {
            println!(
                "{:<24} {:>14} {:>8}",
                result.setup, result.duration_ms, result.exit_status
            );
        }
        Ok(())
    }
}

/// Gather every setup result record under a track's log directory,
/// ordered by setup name.
pub(crate) fn collect_results(track_log_dir: &Path) -> Result<Vec<RaceResult>> {
    let mut results = Vec::new();
    if !track_log_dir.is_dir() {
        return Ok(results);
    }
    for entry in fs::read_dir(track_log_dir)? {
        let path = entry?.path();
        let result_file = path.join(RESULT_FILE);
        if !result_file.is_file() {
            continue;
        }
        let raw = fs::read_to_string(&result_file)?;
        match serde_json::from_str::<RaceResult>(&raw) {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::warn!(file = %result_file.display(), error = %e, "skipping unreadable result record");
            }
        }
    }
    results.sort_by(|a, b| a.setup.cmp(&b.setup));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_result(dir: &Path, setup: &str, duration_ms: u64) {
        let setup_dir = dir.join(setup);
        fs::create_dir_all(&setup_dir).unwrap();
        let result = RaceResult {
            track: "geonames".into(),
            setup: setup.into(),
            duration_ms,
            exit_status: 0,
        };
        fs::write(
            setup_dir.join(RESULT_FILE),
            serde_json::to_string_pretty(&result).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_collect_results_ordered_by_setup() {
        let dir = tempfile::tempdir().unwrap();
        write_result(dir.path(), "4gheap", 1200);
        write_result(dir.path(), "defaults", 900);

        let results = collect_results(dir.path()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].setup, "4gheap");
        assert_eq!(results[1].setup, "defaults");
        assert_eq!(results[1].duration_ms, 900);
    }

    #[test]
    fn test_missing_track_dir_yields_no_results() {
        let dir = tempfile::tempdir().unwrap();
        let results = collect_results(&dir.path().join("nope")).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_unreadable_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_result(dir.path(), "defaults", 900);
        let broken = dir.path().join("broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(RESULT_FILE), "{not json").unwrap();

        let results = collect_results(dir.path()).unwrap();
        assert_eq!(results.len(), 1);
    }
}
