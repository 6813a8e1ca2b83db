//! The simulated backend: an in-memory folder tree.
//!
//! Nodes live in an arena indexed by id; a node stores its parent as an id,
//! so parent/child links never form an ownership cycle. Ids are never
//! reused, which makes a [`SimObject`] handle a stable identity: two handles
//! are equal only if they point at the same node.
//!
//! Each folder keeps two name-sorted child lists, one for folders and one
//! for files. [`FileSystem::content`] exposes them merged, folders first.

mod scan;
pub mod snapshot;

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::error::{CoreError, CoreResult};
use crate::fs::naming::{is_valid_name, resolve_collision};
use crate::fs::object::{Attributes, FileSystem, ObjectKind};

pub use scan::DEFAULT_CONTENT_CAP;
pub use snapshot::{find_snapshot, load_snapshot, save_snapshot, Snapshot, SNAPSHOT_EXTENSION};

/// Handle to a node of a [`SimFs`] tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimObject {
    id: usize,
    kind: ObjectKind,
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    created: SystemTime,
    modified: SystemTime,
    attributes: Attributes,
    parent: Option<usize>,
    data: NodeData,
}

#[derive(Debug, Clone)]
enum NodeData {
    File {
        size: u64,
        content: Vec<u8>,
    },
    Folder {
        folders: Vec<usize>,
        files: Vec<usize>,
    },
}

impl Node {
    fn kind(&self) -> ObjectKind {
        match self.data {
            NodeData::File { .. } => ObjectKind::File,
            NodeData::Folder { .. } => ObjectKind::Folder,
        }
    }
}

/// An in-memory file tree rooted at a single folder.
#[derive(Debug, Clone)]
pub struct SimFs {
    nodes: Vec<Option<Node>>,
    root: usize,
}

impl SimFs {
    /// Creates a tree holding only an empty root folder.
    pub fn new(root_name: &str) -> Self {
        let now = SystemTime::now();
        let root = Node {
            name: root_name.to_string(),
            created: now,
            modified: now,
            attributes: Attributes::default(),
            parent: None,
            data: NodeData::Folder {
                folders: Vec::new(),
                files: Vec::new(),
            },
        };
        Self {
            nodes: vec![Some(root)],
            root: 0,
        }
    }

    /// Returns the root folder.
    pub fn root(&self) -> SimObject {
        SimObject {
            id: self.root,
            kind: ObjectKind::Folder,
        }
    }

    /// Returns the root folder's name.
    pub fn root_name(&self) -> &str {
        self.nodes[self.root]
            .as_ref()
            .map(|n| n.name.as_str())
            .unwrap_or_default()
    }

    /// Number of nodes currently in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Finds the object at a `/`-separated virtual path starting with the root name.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if any component is missing.
    pub fn resolve(&self, path: &str) -> CoreResult<SimObject> {
        let not_found = || CoreError::NotFound(PathBuf::from(path));
        let mut components = path.split('/').filter(|c| !c.is_empty() && *c != ".");

        match components.next() {
            Some(first) if first == self.root_name() => {}
            _ => return Err(not_found()),
        }

        let mut current = self.root();
        for component in components {
            let (folders, files) = self.children(current.id).ok_or_else(not_found)?;
            current = folders
                .iter()
                .chain(files)
                .filter_map(|&id| self.handle(id))
                .find(|obj| self.nodes[obj.id].as_ref().map(|n| n.name.as_str()) == Some(component))
                .ok_or_else(not_found)?;
        }
        Ok(current)
    }

    /// Creates a file with `content` in `folder`, renaming on collision.
    pub fn create_file(
        &mut self,
        folder: &SimObject,
        name: &str,
        content: Vec<u8>,
    ) -> CoreResult<SimObject> {
        self.folder_node(folder)?;
        if !is_valid_name(name) {
            return Err(CoreError::InvalidName(name.to_string()));
        }
        let taken = self.child_names(folder.id, ObjectKind::File);
        let resolved = resolve_collision(&taken, name, name, ObjectKind::File);
        let now = SystemTime::now();
        let id = self.attach(
            folder.id,
            Node {
                name: resolved,
                created: now,
                modified: now,
                attributes: Attributes::default(),
                parent: None,
                data: NodeData::File {
                    size: content.len() as u64,
                    content,
                },
            },
        );
        self.touch(folder.id);
        Ok(SimObject {
            id,
            kind: ObjectKind::File,
        })
    }

    fn handle(&self, id: usize) -> Option<SimObject> {
        self.nodes.get(id)?.as_ref().map(|n| SimObject { id, kind: n.kind() })
    }

    fn node(&self, object: &SimObject) -> CoreResult<&Node> {
        self.nodes
            .get(object.id)
            .and_then(Option::as_ref)
            .ok_or_else(|| CoreError::NotFound(PathBuf::from(format!("<node {}>", object.id))))
    }

    fn folder_node(&self, folder: &SimObject) -> CoreResult<&Node> {
        let node = self.node(folder)?;
        match node.data {
            NodeData::Folder { .. } => Ok(node),
            NodeData::File { .. } => Err(CoreError::NotADirectory(self.path(folder))),
        }
    }

    fn children(&self, id: usize) -> Option<(&[usize], &[usize])> {
        match &self.nodes.get(id)?.as_ref()?.data {
            NodeData::Folder { folders, files } => Some((folders.as_slice(), files.as_slice())),
            NodeData::File { .. } => None,
        }
    }

    fn child_names(&self, folder: usize, kind: ObjectKind) -> HashSet<String> {
        let Some((folders, files)) = self.children(folder) else {
            return HashSet::new();
        };
        let list = match kind {
            ObjectKind::Folder => folders,
            ObjectKind::File => files,
        };
        list.iter()
            .filter_map(|&id| self.nodes[id].as_ref())
            .map(|n| n.name.clone())
            .collect()
    }

    fn is_ancestor_or_self(&self, ancestor: usize, mut id: usize) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(id).and_then(Option::as_ref).and_then(|n| n.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Adds `node` under `parent` and re-sorts the affected child list.
    fn attach(&mut self, parent: usize, mut node: Node) -> usize {
        let id = self.nodes.len();
        let kind = node.kind();
        node.parent = Some(parent);
        self.nodes.push(Some(node));
        if let Some(Some(Node {
            data: NodeData::Folder { folders, files },
            ..
        })) = self.nodes.get_mut(parent)
        {
            match kind {
                ObjectKind::Folder => folders.push(id),
                ObjectKind::File => files.push(id),
            }
        }
        self.sort_children(parent, kind);
        id
    }

    fn sort_children(&mut self, folder: usize, kind: ObjectKind) {
        let Some(Some(Node {
            data: NodeData::Folder { folders, files },
            ..
        })) = self.nodes.get_mut(folder)
        else {
            return;
        };
        let mut list = match kind {
            ObjectKind::Folder => std::mem::take(folders),
            ObjectKind::File => std::mem::take(files),
        };

        let nodes = &self.nodes;
        list.sort_by(|&a, &b| {
            let name_a = nodes[a].as_ref().map(|n| n.name.as_str());
            let name_b = nodes[b].as_ref().map(|n| n.name.as_str());
            name_a.cmp(&name_b)
        });

        if let Some(Some(Node {
            data: NodeData::Folder { folders, files },
            ..
        })) = self.nodes.get_mut(folder)
        {
            match kind {
                ObjectKind::Folder => *folders = list,
                ObjectKind::File => *files = list,
            }
        }
    }

    fn touch(&mut self, id: usize) {
        if let Some(Some(node)) = self.nodes.get_mut(id) {
            node.modified = SystemTime::now();
        }
    }

    /// Frees `id` and everything below it.
    fn free_subtree(&mut self, id: usize) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current).and_then(Option::take) {
                if let NodeData::Folder { folders, files } = node.data {
                    stack.extend(folders);
                    stack.extend(files);
                }
            }
        }
    }

    fn new_folder(&mut self, parent: usize, name: &str, original: &str) -> usize {
        let taken = self.child_names(parent, ObjectKind::Folder);
        let resolved = resolve_collision(&taken, name, original, ObjectKind::Folder);
        let now = SystemTime::now();
        let id = self.attach(
            parent,
            Node {
                name: resolved,
                created: now,
                modified: now,
                attributes: Attributes::default(),
                parent: None,
                data: NodeData::Folder {
                    folders: Vec::new(),
                    files: Vec::new(),
                },
            },
        );
        self.touch(parent);
        id
    }

    fn paste_node(&mut self, dest: usize, source: usize, name: &str) -> CoreResult<usize> {
        let src = self.nodes[source]
            .clone()
            .ok_or_else(|| CoreError::NotFound(PathBuf::from(format!("<node {source}>"))))?;

        match src.data {
            NodeData::File { size, content } => {
                let taken = self.child_names(dest, ObjectKind::File);
                let resolved = resolve_collision(&taken, name, &src.name, ObjectKind::File);
                let id = self.attach(
                    dest,
                    Node {
                        name: resolved,
                        created: SystemTime::now(),
                        modified: src.modified,
                        attributes: src.attributes,
                        parent: None,
                        data: NodeData::File { size, content },
                    },
                );
                self.touch(dest);
                Ok(id)
            }
            NodeData::Folder { folders, files } => {
                let copy = self.new_folder(dest, name, name);
                for child in folders.into_iter().chain(files) {
                    let child_name = match &self.nodes[child] {
                        Some(n) => n.name.clone(),
                        None => continue,
                    };
                    self.paste_node(copy, child, &child_name)?;
                }
                self.touch(dest);
                Ok(copy)
            }
        }
    }
}

impl FileSystem for SimFs {
    type Object = SimObject;

    fn name(&self, object: &SimObject) -> String {
        self.node(object).map(|n| n.name.clone()).unwrap_or_default()
    }

    fn kind(&self, object: &SimObject) -> ObjectKind {
        object.kind
    }

    fn path(&self, object: &SimObject) -> PathBuf {
        let mut parts = Vec::new();
        let mut current = Some(object.id);
        while let Some(id) = current {
            match self.nodes.get(id).and_then(Option::as_ref) {
                Some(node) => {
                    parts.push(node.name.as_str());
                    current = node.parent;
                }
                None => break,
            }
        }
        parts.reverse();
        PathBuf::from(parts.join("/"))
    }

    fn size_in_bytes(&self, object: &SimObject) -> CoreResult<u64> {
        let node = self.node(object)?;
        match &node.data {
            NodeData::File { size, .. } => Ok(*size),
            NodeData::Folder { folders, files } => {
                let mut total = 0;
                for &id in folders.iter().chain(files) {
                    if let Some(child) = self.handle(id) {
                        total += self.size_in_bytes(&child)?;
                    }
                }
                Ok(total)
            }
        }
    }

    fn creation_time(&self, object: &SimObject) -> CoreResult<SystemTime> {
        Ok(self.node(object)?.created)
    }

    fn last_modified_time(&self, object: &SimObject) -> CoreResult<SystemTime> {
        Ok(self.node(object)?.modified)
    }

    fn attributes(&self, object: &SimObject) -> CoreResult<Attributes> {
        Ok(self.node(object)?.attributes)
    }

    fn parent(&self, object: &SimObject) -> Option<SimObject> {
        let parent = self.node(object).ok()?.parent?;
        self.handle(parent)
    }

    fn exists(&self, object: &SimObject) -> bool {
        let Ok(node) = self.node(object) else {
            return false;
        };
        match node.parent {
            None => true,
            Some(parent) => self.child_names(parent, node.kind()).contains(&node.name),
        }
    }

    fn delete(&mut self, object: &SimObject) -> CoreResult<()> {
        let node = self.node(object)?;
        let Some(parent) = node.parent else {
            return Err(CoreError::Unsupported(format!(
                "delete the simulated root {}",
                node.name
            )));
        };
        let path = self.path(object);

        if let Some(Some(Node {
            data: NodeData::Folder { folders, files },
            ..
        })) = self.nodes.get_mut(parent)
        {
            folders.retain(|&id| id != object.id);
            files.retain(|&id| id != object.id);
        }
        self.free_subtree(object.id);
        self.touch(parent);
        tracing::debug!("deleted simulated {}", path.display());
        Ok(())
    }

    fn content(&self, folder: &SimObject) -> CoreResult<Vec<SimObject>> {
        self.folder_node(folder)?;
        let (folders, files) = self.children(folder.id).unwrap_or_default();
        Ok(folders
            .iter()
            .chain(files)
            .filter_map(|&id| self.handle(id))
            .collect())
    }

    fn make_directory(&mut self, folder: &SimObject, name: &str) -> CoreResult<SimObject> {
        self.folder_node(folder)?;
        if !is_valid_name(name) {
            return Err(CoreError::InvalidName(name.to_string()));
        }
        let id = self.new_folder(folder.id, name, name);
        let created = SimObject {
            id,
            kind: ObjectKind::Folder,
        };
        tracing::debug!("created simulated folder {}", self.path(&created).display());
        Ok(created)
    }

    fn paste(
        &mut self,
        folder: &SimObject,
        object: &SimObject,
        name: &str,
    ) -> CoreResult<SimObject> {
        self.folder_node(folder)?;
        self.node(object)?;
        if !is_valid_name(name) {
            return Err(CoreError::InvalidName(name.to_string()));
        }
        if object.kind == ObjectKind::Folder && self.is_ancestor_or_self(object.id, folder.id) {
            return Err(CoreError::DestinationIsSource);
        }

        let id = self.paste_node(folder.id, object.id, name)?;
        let pasted = SimObject {
            id,
            kind: object.kind,
        };
        tracing::debug!(
            "pasted simulated {} as {}",
            self.path(object).display(),
            self.path(&pasted).display()
        );
        Ok(pasted)
    }

    fn read_content(&self, file: &SimObject) -> CoreResult<Vec<u8>> {
        match &self.node(file)?.data {
            NodeData::File { content, .. } => Ok(content.clone()),
            NodeData::Folder { .. } => Err(CoreError::Unsupported(format!(
                "read content of folder {}",
                self.path(file).display()
            ))),
        }
    }
}
