//! Session bootstrap: picks a backend once, at start, from the config.

use std::path::PathBuf;

use crate::config::{Config, Mode};
use crate::error::CoreResult;
use crate::fs::sim::{find_snapshot, save_snapshot};
use crate::fs::{LiveFs, SimFs};
use crate::manager::FileManager;

/// Root name of the tree created when there is neither a snapshot nor a
/// folder to scan.
pub const EMPTY_SIMULATION_ROOT: &str = "simulation";

/// A running file manager on one of the two backends.
///
/// The backend never changes for the lifetime of a session, so frontends
/// match once and then work with a concrete [`FileManager`].
#[derive(Debug)]
pub enum Session {
    Live(FileManager<LiveFs>),
    Simulated {
        manager: FileManager<SimFs>,
        snapshot_dir: PathBuf,
    },
}

impl Session {
    /// Opens a session as described by `config`.
    ///
    /// Live sessions start at `general.start_path`, or at the drive
    /// container when it is unset. Simulated sessions restore the first
    /// loadable snapshot in `simulation.snapshot_dir`; when there is none
    /// they scan `simulation.scan_root`, and failing that start with an
    /// empty root folder.
    ///
    /// # Errors
    ///
    /// - The start path or scan root cannot be opened.
    /// - The snapshot directory cannot be listed.
    pub fn open(config: &Config) -> CoreResult<Self> {
        match config.general.mode {
            Mode::Live => {
                let fs = LiveFs::new();
                let start = match &config.general.start_path {
                    Some(path) => fs.open(path)?,
                    None => fs.drives(),
                };
                tracing::info!("opened live session");
                Ok(Session::Live(FileManager::with_folder(fs, start)))
            }
            Mode::Simulated => {
                let sim = config.simulation.clone();
                let fs = match find_snapshot(&sim.snapshot_dir)? {
                    Some(fs) => fs,
                    None => match &sim.scan_root {
                        Some(root) => SimFs::scan(root, sim.content_cap())?,
                        None => {
                            tracing::info!("no snapshot or scan root, starting empty");
                            SimFs::new(EMPTY_SIMULATION_ROOT)
                        }
                    },
                };
                let root = fs.root();
                tracing::info!("opened simulated session on {}", fs.root_name());
                Ok(Session::Simulated {
                    manager: FileManager::with_folder(fs, root),
                    snapshot_dir: sim.snapshot_dir,
                })
            }
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Session::Live(_) => Mode::Live,
            Session::Simulated { .. } => Mode::Simulated,
        }
    }

    /// Ends the session. A simulated tree is written to its snapshot
    /// directory and the artifact path returned; live sessions do no I/O.
    pub fn close(self) -> CoreResult<Option<PathBuf>> {
        match self {
            Session::Live(_) => Ok(None),
            Session::Simulated {
                manager,
                snapshot_dir,
            } => save_snapshot(manager.fs(), &snapshot_dir).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileSystem, LiveObject};
    use std::fs;
    use tempfile::TempDir;

    fn simulated(snapshot_dir: &TempDir, scan_root: Option<PathBuf>) -> Config {
        let mut config = Config::default();
        config.general.mode = Mode::Simulated;
        config.simulation.snapshot_dir = snapshot_dir.path().to_path_buf();
        config.simulation.scan_root = scan_root;
        config
    }

    #[test]
    fn live_session_starts_at_drive_container() {
        let session = Session::open(&Config::default()).unwrap();
        match session {
            Session::Live(fm) => assert_eq!(fm.current_folder(), Some(&LiveObject::Drives)),
            other => panic!("expected live session, got {other:?}"),
        }
    }

    #[test]
    fn live_session_starts_at_configured_path() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.general.start_path = Some(tmp.path().to_path_buf());

        let session = Session::open(&config).unwrap();
        assert_eq!(session.mode(), Mode::Live);
        match &session {
            Session::Live(fm) => {
                let folder = fm.current_folder().unwrap();
                assert_eq!(fm.fs().path(folder), tmp.path().canonicalize().unwrap());
            }
            other => panic!("expected live session, got {other:?}"),
        }
        assert_eq!(session.close().unwrap(), None);
    }

    #[test]
    fn live_session_with_missing_start_path_fails() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.general.start_path = Some(tmp.path().join("missing"));
        assert!(Session::open(&config).is_err());
    }

    #[test]
    fn simulated_session_without_sources_starts_empty() {
        let snapshots = TempDir::new().unwrap();
        let session = Session::open(&simulated(&snapshots, None)).unwrap();
        match &session {
            Session::Simulated { manager, .. } => {
                assert_eq!(manager.fs().root_name(), EMPTY_SIMULATION_ROOT);
                assert_eq!(manager.fs().node_count(), 1);
            }
            other => panic!("expected simulated session, got {other:?}"),
        }
    }

    #[test]
    fn simulated_session_scans_then_restores_snapshot() {
        let source = TempDir::new().unwrap();
        let real = source.path().join("data");
        fs::create_dir(&real).unwrap();
        fs::write(real.join("a.txt"), "hello").unwrap();
        let snapshots = TempDir::new().unwrap();
        let config = simulated(&snapshots, Some(real.clone()));

        let mut session = Session::open(&config).unwrap();
        if let Session::Simulated { manager, .. } = &mut session {
            let mut messages = Vec::new();
            manager.make_directory("made", &mut messages).unwrap();
            assert!(messages.is_empty());
        }
        let artifact = session.close().unwrap().unwrap();
        assert_eq!(artifact, snapshots.path().join("data.simul"));

        // The real folder is untouched by simulated work.
        assert!(!real.join("made").exists());
        fs::remove_dir_all(&real).unwrap();

        let session = Session::open(&config).unwrap();
        match &session {
            Session::Simulated { manager, .. } => {
                assert!(manager.fs().resolve("data/made").is_ok());
                let file = manager.fs().resolve("data/a.txt").unwrap();
                assert_eq!(manager.fs().read_content(&file).unwrap(), b"hello".to_vec());
            }
            other => panic!("expected simulated session, got {other:?}"),
        }
    }
}
