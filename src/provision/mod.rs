//! Candidate provisioning
//!
//! The provisioner prepares the runtime environment for one track-setup run:
//! it unpacks the candidate binary into an isolated installation directory,
//! rewrites its configuration files, and later tears the installation down.
//! Configuration files are treated as opaque text with append-only mutation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigStore, Scope};
use crate::error::{RaceError, Result};
use crate::io::{self, Archiver};
use crate::track::{Track, TrackSetup};

const LOGGING_CONFIG_FILE: &str = "config/logging.yml";
const CANDIDATE_CONFIG_FILE: &str = "config/candidate.yml";

/// Installs the candidate for one track setup and cleans up afterwards
pub struct Provisioner {
    archiver: Box<dyn Archiver>,
}

impl Provisioner {
    /// Create a provisioner using the given archive extractor
    pub fn new(archiver: Box<dyn Archiver>) -> Self {
        Self { archiver }
    }

    /// Install the candidate and rewrite its configuration for `setup`.
    ///
    /// Records the resolved binary path and data paths at TrackSetup scope
    /// for consumption by later stages.
    pub fn prepare(&self, track: &Track, setup: &TrackSetup, cfg: &mut ConfigStore) -> Result<()> {
        self.install_binary(cfg)?;
        self.configure(track, setup, cfg)
    }

    /// Tear down the current installation.
    ///
    /// Honors the operator's preserve flag; removing already-absent paths is
    /// a no-op, so calling this twice is safe.
    pub fn cleanup(&self, cfg: &ConfigStore) -> Result<()> {
        let preserve = cfg.get_bool("provisioning", "install.preserve")?;
        let install_dir = self.install_dir(cfg)?;
        if preserve {
            tracing::info!(dir = %install_dir.display(), "preserving benchmark candidate installation");
            return Ok(());
        }

        tracing::info!(dir = %install_dir.display(), "wiping benchmark candidate installation");
        io::remove_if_exists(&install_dir)?;
        if let Some(data_paths) = cfg.get_list_opt("provisioning", "datapaths")? {
            for path in data_paths {
                io::remove_if_exists(Path::new(&path))?;
            }
        }
        Ok(())
    }

    fn install_binary(&self, cfg: &mut ConfigStore) -> Result<()> {
        let archive = cfg.get_str("builder", "candidate.bin.path")?;
        let install_dir = self.install_dir(cfg)?;
        tracing::info!(dir = %install_dir.display(), "preparing candidate locally");
        io::ensure_dir(&install_dir)?;
        tracing::info!(archive = %archive, dir = %install_dir.display(), "unpacking candidate");
        self.archiver.unpack(Path::new(&archive), &install_dir)?;

        let binary_path = self.locate_unpacked(&install_dir, cfg)?;
        // config may differ per track setup, so the binary path is
        // reinitialized every iteration at TrackSetup scope
        cfg.set(
            Scope::TrackSetup,
            "provisioning",
            "local.binary.path",
            binary_path,
        );
        Ok(())
    }

    /// Discover the single unpacked candidate directory.
    ///
    /// Zero or multiple matches mean the archive layout is not what the
    /// operator configured; picking one arbitrarily would race against the
    /// wrong binary, so this fails instead.
    fn locate_unpacked(&self, install_dir: &Path, cfg: &ConfigStore) -> Result<PathBuf> {
        let prefix = cfg.get_str("builder", "candidate.dist.prefix")?;
        let mut matches: Vec<PathBuf> = fs::read_dir(install_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_dir()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        if matches.len() != 1 {
            return Err(RaceError::AmbiguousInstallation {
                pattern: format!("{prefix}*"),
                found: matches.len(),
            });
        }
        Ok(matches.remove(0))
    }

    fn configure(&self, track: &Track, setup: &TrackSetup, cfg: &mut ConfigStore) -> Result<()> {
        self.configure_logging(setup, cfg)?;
        self.configure_candidate(track, setup, cfg)
    }

    fn configure_logging(&self, setup: &TrackSetup, cfg: &ConfigStore) -> Result<()> {
        let Some(log_cfg) = &setup.candidate.custom_logging_config else {
            return Ok(());
        };
        let binary_path = PathBuf::from(cfg.get_str("provisioning", "local.binary.path")?);
        tracing::info!(setup = %setup.name, "replacing bundled log configuration with custom config");
        let target = binary_path.join(LOGGING_CONFIG_FILE);
        if let Some(parent) = target.parent() {
            io::ensure_dir(parent)?;
        }
        fs::write(target, log_cfg)?;
        Ok(())
    }

    /// Append the cluster name, the data-path directive and any custom
    /// snippet to the candidate's main config file, in that fixed order.
    fn configure_candidate(
        &self,
        track: &Track,
        setup: &TrackSetup,
        cfg: &mut ConfigStore,
    ) -> Result<()> {
        let binary_path = PathBuf::from(cfg.get_str("provisioning", "local.binary.path")?);
        let env_name = cfg.get_str("system", "env.name")?;
        let data_paths = self.data_paths(track, cfg)?;
        tracing::info!(paths = ?data_paths, "using data paths");
        cfg.set(
            Scope::TrackSetup,
            "provisioning",
            "local.data.paths",
            data_paths.clone(),
        );

        let config_file = binary_path.join(CANDIDATE_CONFIG_FILE);
        let mut contents = if config_file.exists() {
            fs::read_to_string(&config_file)?
        } else {
            String::new()
        };
        contents.push_str(&format!("\ncluster.name: benchmark.{env_name}\n"));
        contents.push_str(&format!("\npath.data: {}", data_paths.join(", ")));
        if let Some(snippet) = &setup.candidate.custom_config_snippet {
            contents.push_str(&format!("\n{snippet}"));
        }
        if let Some(parent) = config_file.parent() {
            io::ensure_dir(parent)?;
        }
        fs::write(&config_file, contents)?;
        Ok(())
    }

    /// One path per configured data root, suffixed with the track name so
    /// data can persist across repeated runs of the same track; a single
    /// default path under the install dir when no roots are configured.
    fn data_paths(&self, track: &Track, cfg: &ConfigStore) -> Result<Vec<String>> {
        match cfg.get_list_opt("provisioning", "datapaths")? {
            Some(roots) if !roots.is_empty() => Ok(roots
                .iter()
                .map(|root| format!("{root}/{}", track.name))
                .collect()),
            _ => {
                let install_dir = self.install_dir(cfg)?;
                Ok(vec![format!("{}/data", install_dir.display())])
            }
        }
    }

    fn install_dir(&self, cfg: &ConfigStore) -> Result<PathBuf> {
        let root = cfg.get_str("system", "track.setup.root.dir")?;
        let install = cfg.get_str("provisioning", "local.install.dir")?;
        Ok(PathBuf::from(root).join(install))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::CandidateSettings;

    /// Archiver fake that materializes a fixed set of directories instead of
    /// reading a real archive.
    struct FakeArchiver {
        dirs: Vec<&'static str>,
    }

    impl Archiver for FakeArchiver {
        fn unpack(&self, _archive: &Path, dest: &Path) -> Result<()> {
            for dir in &self.dirs {
                fs::create_dir_all(dest.join(dir))?;
            }
            Ok(())
        }
    }

    fn track() -> Track {
        Track {
            name: "geonames".into(),
            estimated_benchmark_minutes: 60,
            setups: vec![TrackSetup {
                name: "defaults".into(),
                candidate: CandidateSettings::default(),
            }],
        }
    }

    fn setup() -> TrackSetup {
        track().setups.remove(0)
    }

    fn base_config(root: &Path) -> ConfigStore {
        let mut cfg = ConfigStore::new();
        cfg.set(Scope::Global, "system", "env.name", "unittest");
        cfg.set(
            Scope::Global,
            "system",
            "track.setup.root.dir",
            root.join("geonames/defaults"),
        );
        cfg.set(Scope::Global, "provisioning", "local.install.dir", "install");
        cfg.set(Scope::Global, "provisioning", "install.preserve", false);
        cfg.set(
            Scope::Global,
            "builder",
            "candidate.bin.path",
            root.join("candidate.zip"),
        );
        cfg.set(Scope::Global, "builder", "candidate.dist.prefix", "candidate-");
        cfg
    }

    fn provisioner(dirs: Vec<&'static str>) -> Provisioner {
        Provisioner::new(Box::new(FakeArchiver { dirs }))
    }

    #[test]
    fn test_prepare_records_binary_and_data_paths() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        let prov = provisioner(vec!["candidate-1.0.0"]);

        prov.prepare(&track(), &setup(), &mut cfg).unwrap();

        let binary = cfg.get_str("provisioning", "local.binary.path").unwrap();
        assert!(binary.ends_with("candidate-1.0.0"));

        let install_dir = root.path().join("geonames/defaults/install");
        let data = cfg.get_list("provisioning", "local.data.paths").unwrap();
        assert_eq!(data, vec![format!("{}/data", install_dir.display())]);
    }

    #[test]
    fn test_configure_appends_in_fixed_order() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        let prov = provisioner(vec!["candidate-1.0.0"]);
        let setup = TrackSetup {
            name: "defaults".into(),
            candidate: CandidateSettings {
                custom_logging_config: Some("loglevel: debug".into()),
                custom_config_snippet: Some("index.store: niofs".into()),
            },
        };

        prov.prepare(&track(), &setup, &mut cfg).unwrap();

        let binary = PathBuf::from(cfg.get_str("provisioning", "local.binary.path").unwrap());
        let logging = fs::read_to_string(binary.join(LOGGING_CONFIG_FILE)).unwrap();
        assert_eq!(logging, "loglevel: debug");

        let main = fs::read_to_string(binary.join(CANDIDATE_CONFIG_FILE)).unwrap();
        let cluster_at = main.find("cluster.name: benchmark.unittest").unwrap();
        let data_at = main.find("path.data: ").unwrap();
        let snippet_at = main.find("index.store: niofs").unwrap();
        assert!(cluster_at < data_at);
        assert!(data_at < snippet_at);
    }

    #[test]
    fn test_explicit_data_roots_are_suffixed_with_track_name() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        cfg.set(
            Scope::Global,
            "provisioning",
            "datapaths",
            vec!["/a".to_owned(), "/b".to_owned()],
        );
        let prov = provisioner(vec!["candidate-1.0.0"]);

        prov.prepare(&track(), &setup(), &mut cfg).unwrap();

        let data = cfg.get_list("provisioning", "local.data.paths").unwrap();
        assert_eq!(data, vec!["/a/geonames", "/b/geonames"]);
    }

    #[test]
    fn test_zero_unpacked_directories_is_ambiguous() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        let prov = provisioner(vec![]);

        let err = prov.prepare(&track(), &setup(), &mut cfg).unwrap_err();
        assert!(matches!(
            err,
            RaceError::AmbiguousInstallation { found: 0, .. }
        ));
    }

    #[test]
    fn test_multiple_unpacked_directories_are_ambiguous() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        let prov = provisioner(vec!["candidate-1.0.0", "candidate-2.0.0"]);

        let err = prov.prepare(&track(), &setup(), &mut cfg).unwrap_err();
        assert!(matches!(
            err,
            RaceError::AmbiguousInstallation { found: 2, .. }
        ));
    }

    #[test]
    fn test_unrelated_directories_are_not_candidates() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        let prov = provisioner(vec!["candidate-1.0.0", "README-dir"]);

        prov.prepare(&track(), &setup(), &mut cfg).unwrap();
        let binary = cfg.get_str("provisioning", "local.binary.path").unwrap();
        assert!(binary.ends_with("candidate-1.0.0"));
    }

    #[test]
    fn test_cleanup_removes_install_and_data_paths() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        let extra = root.path().join("extra-data");
        fs::create_dir_all(&extra).unwrap();
        cfg.set(
            Scope::Global,
            "provisioning",
            "datapaths",
            vec![extra.to_string_lossy().into_owned()],
        );
        let prov = provisioner(vec!["candidate-1.0.0"]);
        prov.prepare(&track(), &setup(), &mut cfg).unwrap();

        let install_dir = root.path().join("geonames/defaults/install");
        assert!(install_dir.exists());

        prov.cleanup(&cfg).unwrap();
        assert!(!install_dir.exists());
        assert!(!extra.exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        let prov = provisioner(vec!["candidate-1.0.0"]);
        prov.prepare(&track(), &setup(), &mut cfg).unwrap();

        prov.cleanup(&cfg).unwrap();
        // nothing left to remove; still a no-op success
        prov.cleanup(&cfg).unwrap();
        assert!(!root.path().join("geonames/defaults/install").exists());
    }

    #[test]
    fn test_preserve_flag_keeps_installation() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        cfg.set(Scope::Global, "provisioning", "install.preserve", true);
        let extra = root.path().join("extra-data");
        fs::create_dir_all(&extra).unwrap();
        cfg.set(
            Scope::Global,
            "provisioning",
            "datapaths",
            vec![extra.to_string_lossy().into_owned()],
        );
        let prov = provisioner(vec!["candidate-1.0.0"]);
        prov.prepare(&track(), &setup(), &mut cfg).unwrap();

        prov.cleanup(&cfg).unwrap();
        assert!(root.path().join("geonames/defaults/install").exists());
        assert!(extra.exists());
    }

    #[test]
    fn test_missing_mandatory_key_propagates() {
        let root = tempfile::tempdir().unwrap();
        let mut cfg = base_config(root.path());
        // drop the archive path by rebuilding without it
        let mut bare = ConfigStore::new();
        bare.set(
            Scope::Global,
            "system",
            "track.setup.root.dir",
            root.path().join("geonames/defaults"),
        );
        bare.set(Scope::Global, "provisioning", "local.install.dir", "install");
        let prov = provisioner(vec!["candidate-1.0.0"]);

        let err = prov.prepare(&track(), &setup(), &mut bare).unwrap_err();
        assert!(matches!(err, RaceError::ConfigMissing { .. }));

        // sanity: the full config still works
        prov.prepare(&track(), &setup(), &mut cfg).unwrap();
    }
}
