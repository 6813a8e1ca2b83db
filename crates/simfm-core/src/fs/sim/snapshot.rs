//! Snapshot persistence for simulated trees.
//!
//! A snapshot is the simulated tree written out as nested nodes inside a
//! versioned JSON envelope. One artifact is kept per simulated root, named
//! `<root name>.simul`. The format is private to this crate; only
//! [`save_snapshot`] and [`load_snapshot`] are expected to read or write it.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::{Node, NodeData, SimFs};
use crate::error::{CoreError, CoreResult};
use crate::fs::object::Attributes;

/// File name suffix of snapshot artifacts.
pub const SNAPSHOT_EXTENSION: &str = ".simul";

const SNAPSHOT_VERSION: u32 = 1;

/// Serializable form of a whole simulated tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub root: SnapshotNode,
}

/// One node of a [`Snapshot`]. Children are stored inline, so the
/// serialized form is always a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotNode {
    Folder {
        name: String,
        created: SystemTime,
        modified: SystemTime,
        #[serde(default)]
        attributes: Attributes,
        #[serde(default)]
        children: Vec<SnapshotNode>,
    },
    File {
        name: String,
        created: SystemTime,
        modified: SystemTime,
        #[serde(default)]
        attributes: Attributes,
        size: u64,
        #[serde(default)]
        content: Vec<u8>,
    },
}

impl SimFs {
    /// Captures the current tree as a [`Snapshot`].
    pub fn to_snapshot(&self) -> Snapshot {
        let root = match self.nodes.get(self.root).and_then(Option::as_ref) {
            Some(node) => self.snapshot_node(node),
            // The root is never freed; delete refuses it.
            None => SnapshotNode::Folder {
                name: String::new(),
                created: SystemTime::UNIX_EPOCH,
                modified: SystemTime::UNIX_EPOCH,
                attributes: Attributes::default(),
                children: Vec::new(),
            },
        };
        Snapshot {
            version: SNAPSHOT_VERSION,
            root,
        }
    }

    fn snapshot_node(&self, node: &Node) -> SnapshotNode {
        match &node.data {
            NodeData::File { size, content } => SnapshotNode::File {
                name: node.name.clone(),
                created: node.created,
                modified: node.modified,
                attributes: node.attributes,
                size: *size,
                content: content.clone(),
            },
            NodeData::Folder { folders, files } => SnapshotNode::Folder {
                name: node.name.clone(),
                created: node.created,
                modified: node.modified,
                attributes: node.attributes,
                children: folders
                    .iter()
                    .chain(files)
                    .filter_map(|&child| self.nodes.get(child).and_then(Option::as_ref))
                    .map(|child| self.snapshot_node(child))
                    .collect(),
            },
        }
    }

    /// Rebuilds a tree from a [`Snapshot`].
    ///
    /// # Errors
    ///
    /// - [`CoreError::Snapshot`] if the version is unknown or the root is a file.
    pub fn from_snapshot(snapshot: Snapshot) -> CoreResult<SimFs> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CoreError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        let SnapshotNode::Folder {
            name,
            created,
            modified,
            attributes,
            children,
        } = snapshot.root
        else {
            return Err(CoreError::Snapshot("snapshot root is not a folder".to_string()));
        };

        let mut sim = SimFs::new(&name);
        let root = sim.root;
        if let Some(Some(node)) = sim.nodes.get_mut(root) {
            node.created = created;
            node.modified = modified;
            node.attributes = attributes;
        }
        for child in children {
            sim.restore(root, child);
        }
        Ok(sim)
    }

    fn restore(&mut self, parent: usize, snapshot: SnapshotNode) {
        match snapshot {
            SnapshotNode::File {
                name,
                created,
                modified,
                attributes,
                size,
                content,
            } => {
                self.attach(
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
            }
            SnapshotNode::Folder {
                name,
                created,
                modified,
                attributes,
                children,
            } => {
                let id = self.attach(
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
                for child in children {
                    self.restore(id, child);
                }
            }
        }
    }
}

/// Writes `sim` to `<dir>/<root name>.simul`, replacing any previous artifact.
///
/// Falls back to the working directory when `dir` does not exist.
/// Returns the path written.
pub fn save_snapshot(sim: &SimFs, dir: &Path) -> CoreResult<PathBuf> {
    let dir = snapshot_dir(dir)?;
    let path = dir.join(format!("{}{SNAPSHOT_EXTENSION}", artifact_stem(sim.root_name())));
    let bytes = serde_json::to_vec(&sim.to_snapshot())
        .map_err(|e| CoreError::Snapshot(e.to_string()))?;
    std::fs::write(&path, bytes).map_err(|e| CoreError::from_io(&path, e))?;
    tracing::info!("saved simulated tree to {}", path.display());
    Ok(path)
}

/// Reads one snapshot artifact.
pub fn load_snapshot(path: &Path) -> CoreResult<SimFs> {
    let bytes = std::fs::read(path).map_err(|e| CoreError::from_io(path, e))?;
    let snapshot: Snapshot =
        serde_json::from_slice(&bytes).map_err(|e| CoreError::Snapshot(e.to_string()))?;
    SimFs::from_snapshot(snapshot)
}

/// Loads the first readable `.simul` artifact in `dir` (by file name order).
///
/// Falls back to the working directory when `dir` does not exist. Artifacts
/// that fail to load are logged and skipped. Returns `Ok(None)` when no
/// artifact could be loaded.
pub fn find_snapshot(dir: &Path) -> CoreResult<Option<SimFs>> {
    let dir = snapshot_dir(dir)?;
    let read_dir = std::fs::read_dir(&dir).map_err(|e| CoreError::from_io(&dir, e))?;

    let mut candidates: Vec<PathBuf> = read_dir
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .map(|n| n.to_string_lossy().ends_with(SNAPSHOT_EXTENSION))
                    .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    for path in candidates {
        match load_snapshot(&path) {
            Ok(sim) => {
                tracing::info!("loaded simulated tree from {}", path.display());
                return Ok(Some(sim));
            }
            Err(e) => tracing::warn!("ignoring snapshot {}: {e}", path.display()),
        }
    }
    Ok(None)
}

fn snapshot_dir(dir: &Path) -> CoreResult<PathBuf> {
    if dir.is_dir() {
        Ok(dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()?)
    }
}

/// Turns a root name into something usable as a file name.
fn artifact_stem(root_name: &str) -> String {
    let stem: String = root_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    if stem.trim_matches('_').is_empty() {
        "root".to_string()
    } else {
        stem
    }
}
