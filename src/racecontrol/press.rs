//! The press participant

use crate::collaborators::SummaryReporter;
use crate::config::{ConfigStore, Scope};
use crate::error::Result;
use crate::racecontrol::Participant;
use crate::track::Track;

/// Participant that only reports results; it never touches the benchmark
/// environment.
pub struct Press {
    reporter: Box<dyn SummaryReporter>,
    report_only: bool,
}

impl Press {
    /// Create a press participant; in report-only mode no race precedes it
    /// and the reporter reads the results of the last recorded race.
    pub fn new(reporter: Box<dyn SummaryReporter>, report_only: bool) -> Self {
        Self {
            reporter,
            report_only,
        }
    }
}

impl Participant for Press {
    fn prepare(&mut self, _tracks: &[Track], cfg: &mut ConfigStore) -> Result<()> {
        cfg.set(Scope::Global, "reporting", "report.only", self.report_only);
        Ok(())
    }

    fn race(&mut self, track: &Track, cfg: &mut ConfigStore) -> Result<()> {
        self.reporter.report(track, cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingReporter {
        reported: Rc<RefCell<Vec<String>>>,
    }

    impl SummaryReporter for RecordingReporter {
        fn report(&mut self, track: &Track, _cfg: &ConfigStore) -> Result<()> {
            self.reported.borrow_mut().push(track.name.clone());
            Ok(())
        }
    }

    fn track(name: &str) -> Track {
        Track {
            name: name.into(),
            estimated_benchmark_minutes: 1,
            setups: vec![crate::track::TrackSetup {
                name: "defaults".into(),
                candidate: Default::default(),
            }],
        }
    }

    #[test]
    fn test_press_records_report_only_mode_and_delegates() {
        let reported = Rc::new(RefCell::new(Vec::new()));
        let mut press = Press::new(
            Box::new(RecordingReporter {
                reported: Rc::clone(&reported),
            }),
            true,
        );
        let mut cfg = ConfigStore::new();
        let track = track("geonames");

        press.prepare(&[track.clone()], &mut cfg).unwrap();
        assert!(cfg.get_bool("reporting", "report.only").unwrap());

        press.race(&track, &mut cfg).unwrap();
        assert_eq!(*reported.borrow(), vec!["geonames"]);
    }
}
