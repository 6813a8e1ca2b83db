//! One-time import of a real directory into a simulated tree.

use std::io::Read;
use std::path::Path;

use super::{Node, NodeData, SimFs};
use crate::error::{CoreError, CoreResult};
use crate::fs::live::{LiveFs, LiveObject};
use crate::fs::naming::resolve_collision;
use crate::fs::object::{FileSystem, ObjectKind};
use crate::message::MessageCode;

/// Bytes of file content captured per file unless configured otherwise.
pub const DEFAULT_CONTENT_CAP: usize = 1024;

impl SimFs {
    /// Builds a simulated tree from the real directory at `path`.
    ///
    /// Every file keeps its real size, but only the first `content_cap`
    /// bytes of its content are captured (`None` captures everything).
    /// Folders that cannot be listed because access is denied are kept as
    /// empty folders and the scan continues with their siblings. Symbolic
    /// links are skipped.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the path does not exist.
    /// - [`CoreError::NotADirectory`] if the path is not a directory.
    /// - Any other error met on an entry that is not access-related.
    pub fn scan(path: &Path, content_cap: Option<usize>) -> CoreResult<SimFs> {
        let live = LiveFs::new();
        let root = live.open(path)?;
        if !matches!(root, LiveObject::Folder(_)) {
            return Err(CoreError::NotADirectory(path.to_path_buf()));
        }

        let mut sim = SimFs::new(&live.name(&root));
        let root_id = sim.root;
        if let Some(Some(node)) = sim.nodes.get_mut(root_id) {
            node.created = live.creation_time(&root)?;
            node.modified = live.last_modified_time(&root)?;
            node.attributes = live.attributes(&root)?;
        }

        let mut scanner = Scanner {
            live,
            content_cap,
            skipped: 0,
        };
        scanner.scan_folder(&mut sim, &root, root_id)?;
        tracing::info!(
            "scanned {} into {} simulated nodes ({} entries skipped)",
            path.display(),
            sim.node_count(),
            scanner.skipped
        );
        Ok(sim)
    }
}

struct Scanner {
    live: LiveFs,
    content_cap: Option<usize>,
    skipped: usize,
}

impl Scanner {
    fn scan_folder(&mut self, sim: &mut SimFs, folder: &LiveObject, id: usize) -> CoreResult<()> {
        let children = match self.live.content(folder) {
            Ok(children) => children,
            Err(e) if is_skippable(&e) => {
                tracing::debug!("skipping unreadable folder {}: {e}", self.live.path(folder).display());
                self.skipped += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for child in children {
            let Some(child_path) = child.real_path() else {
                continue;
            };
            let is_link = std::fs::symlink_metadata(child_path)
                .map(|m| m.is_symlink())
                .unwrap_or(false);
            if is_link {
                tracing::debug!("skipping symlink {}", child_path.display());
                self.skipped += 1;
                continue;
            }

            match self.capture(sim, &child, id) {
                Ok(()) => {}
                Err(e) if is_skippable(&e) => {
                    tracing::debug!("skipping {}: {e}", child_path.display());
                    self.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn capture(&mut self, sim: &mut SimFs, object: &LiveObject, parent: usize) -> CoreResult<()> {
        let live = self.live;
        let name = scanned_name(sim, object, parent);
        let created = live.creation_time(object)?;
        let modified = live.last_modified_time(object)?;
        let attributes = live.attributes(object)?;

        match object {
            LiveObject::Folder(_) => {
                let id = sim.attach(
                    parent,
                    Node {
                        name,
                        created,
                        modified,
                        attributes,
                        parent: None,
                        data: NodeData::Folder {
                            folders: Vec::new(),
                            files: Vec::new(),
                        },
                    },
                );
                self.scan_folder(sim, object, id)
            }
            LiveObject::File(path) => {
                let size = live.size_in_bytes(object)?;
                let content = read_prefix(path, self.content_cap).unwrap_or_else(|e| {
                    tracing::debug!("content of {} not captured: {e}", path.display());
                    Vec::new()
                });
                sim.attach(
                    parent,
                    Node {
                        name,
                        created,
                        modified,
                        attributes,
                        parent: None,
                        data: NodeData::File { size, content },
                    },
                );
                Ok(())
            }
            LiveObject::Drives => Ok(()),
        }
    }
}

/// The entry's own name, not normalized, made unique among its siblings.
/// Names that differ only in Unicode form, or that lossy conversion
/// merges, must still land as distinct nodes.
fn scanned_name(sim: &SimFs, object: &LiveObject, parent: usize) -> String {
    let raw = object
        .real_path()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = match object {
        LiveObject::File(_) => ObjectKind::File,
        LiveObject::Folder(_) | LiveObject::Drives => ObjectKind::Folder,
    };
    let taken = sim.child_names(parent, kind);
    resolve_collision(&taken, &raw, &raw, kind)
}

/// Access problems and entries that vanished mid-scan do not abort the import.
fn is_skippable(err: &CoreError) -> bool {
    err.message_code() == MessageCode::RestrictedAccess || matches!(err, CoreError::NotFound(_))
}

fn read_prefix(path: &Path, cap: Option<usize>) -> CoreResult<Vec<u8>> {
    let mut file = std::fs::File::open(path).map_err(|e| CoreError::from_io(path, e))?;
    let mut buf = Vec::new();
    let result = match cap {
        Some(limit) => file.take(limit as u64).read_to_end(&mut buf),
        None => file.read_to_end(&mut buf),
    };
    result.map_err(|e| CoreError::from_io(path, e))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("docs/deep")).unwrap();
        fs::write(tmp.path().join("docs/report.txt"), "report").unwrap();
        fs::write(tmp.path().join("docs/deep/notes.md"), "note").unwrap();
        fs::write(tmp.path().join("top.txt"), "abc").unwrap();
        tmp
    }

    #[test]
    fn scan_mirrors_structure() {
        let tmp = tree();
        let sim = SimFs::scan(tmp.path(), Some(DEFAULT_CONTENT_CAP)).unwrap();
        let root_name = tmp.path().file_name().unwrap().to_string_lossy().into_owned();

        assert_eq!(sim.root_name(), root_name);
        assert_eq!(sim.node_count(), 6);
        let notes = sim.resolve(&format!("{root_name}/docs/deep/notes.md")).unwrap();
        assert_eq!(sim.read_content(&notes).unwrap(), b"note".to_vec());
        assert_eq!(sim.size_in_bytes(&sim.root()).unwrap(), 13);
    }

    #[test]
    fn scan_caps_content_but_keeps_size() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("big.bin"), vec![7u8; 4000]).unwrap();

        let sim = SimFs::scan(tmp.path(), Some(DEFAULT_CONTENT_CAP)).unwrap();
        let file = sim.content(&sim.root()).unwrap()[0];

        assert_eq!(sim.size_in_bytes(&file).unwrap(), 4000);
        assert_eq!(sim.read_content(&file).unwrap().len(), DEFAULT_CONTENT_CAP);
    }

    #[test]
    fn scan_without_cap_captures_everything() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("big.bin"), vec![7u8; 4000]).unwrap();

        let sim = SimFs::scan(tmp.path(), None).unwrap();
        let file = sim.content(&sim.root()).unwrap()[0];
        assert_eq!(sim.read_content(&file).unwrap().len(), 4000);
    }

    #[test]
    fn scan_copies_timestamps() {
        let tmp = tree();
        let sim = SimFs::scan(tmp.path(), None).unwrap();
        let live = LiveFs::new();
        let real = live.open(&tmp.path().join("top.txt")).unwrap();
        let simulated = sim
            .resolve(&format!("{}/top.txt", sim.root_name()))
            .unwrap();

        assert_eq!(
            sim.last_modified_time(&simulated).unwrap(),
            live.last_modified_time(&real).unwrap()
        );
    }

    #[test]
    fn scan_nonexistent_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = SimFs::scan(&tmp.path().join("missing"), None);
        assert!(matches!(result.unwrap_err(), CoreError::NotFound(_)));
    }

    #[test]
    fn scan_file_returns_not_a_directory() {
        let tmp = tree();
        let result = SimFs::scan(&tmp.path().join("top.txt"), None);
        assert!(matches!(result.unwrap_err(), CoreError::NotADirectory(_)));
    }

    #[cfg(unix)]
    #[test]
    fn scan_skips_symlinks() {
        let tmp = tree();
        std::os::unix::fs::symlink(tmp.path(), tmp.path().join("loop")).unwrap();

        let sim = SimFs::scan(tmp.path(), None).unwrap();
        assert_eq!(sim.node_count(), 6);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn scan_keeps_names_differing_only_in_normal_form() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("\u{e9}.txt"), "composed").unwrap();
        fs::write(tmp.path().join("e\u{301}.txt"), "decomposed").unwrap();

        let sim = SimFs::scan(tmp.path(), None).unwrap();
        let root = sim.root();
        let names: Vec<String> = sim
            .content(&root)
            .unwrap()
            .iter()
            .map(|o| sim.name(o))
            .collect();

        assert_eq!(names.len(), 2);
        assert_ne!(names[0], names[1]);
        for name in &names {
            let path = format!("{}/{name}", sim.root_name());
            assert!(sim.exists(&sim.resolve(&path).unwrap()));
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn scan_renames_names_merged_by_lossy_conversion() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(OsStr::from_bytes(b"a\xff")), "1").unwrap();
        fs::write(tmp.path().join(OsStr::from_bytes(b"a\xfe")), "2").unwrap();

        let sim = SimFs::scan(tmp.path(), None).unwrap();
        let root = sim.root();
        let mut names: Vec<String> = sim
            .content(&root)
            .unwrap()
            .iter()
            .map(|o| sim.name(o))
            .collect();
        names.sort();
        assert_eq!(names, vec!["a\u{fffd}".to_string(), "a\u{fffd}(1)".to_string()]);
    }

    #[test]
    fn skippable_errors() {
        assert!(is_skippable(&CoreError::PermissionDenied("/x".into())));
        assert!(is_skippable(&CoreError::NotFound("/x".into())));
        assert!(!is_skippable(&CoreError::Snapshot("bad".into())));
    }
}
