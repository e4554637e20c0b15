//! Process utilities

use sysinfo::{ProcessExt, System, SystemExt};

/// Terminate every running process whose name starts with `name_prefix`.
///
/// The prefix must be narrow: a co-located metrics store or editor session
/// must never match. An empty prefix is refused outright rather than matching
/// every process on the host. Returns the number of processes signalled.
pub fn kill_running_instances(name_prefix: &str) -> usize {
    if name_prefix.is_empty() {
        tracing::warn!("refusing to kill processes with an empty name prefix");
        return 0;
    }

    let mut system = System::new_all();
    system.refresh_processes();

    let mut killed = 0;
    for process in system.processes().values() {
        if process.name().starts_with(name_prefix) {
            tracing::info!(pid = %process.pid(), name = process.name(), "killing running candidate instance");
            if process.kill() {
                killed += 1;
            }
        }
    }
    killed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prefix_kills_nothing() {
        assert_eq!(kill_running_instances(""), 0);
    }

    #[test]
    fn test_unmatched_prefix_kills_nothing() {
        assert_eq!(kill_running_instances("pitwall-test-no-such-process-"), 0);
    }
}
