//! The file-object contract shared by both backends.
//!
//! A backend implements [`FileSystem`] and hands out lightweight object
//! handles ([`FileSystem::Object`]). Every capability of a file object
//! (name, size, timestamps, attributes, parent, existence, delete, copy,
//! move, and for folders listing, creating and pasting) is a method on the
//! backend taking the handle. Handles from different backends have
//! different types, so a live object can never be compared against a
//! simulated one.

use std::fmt;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;

/// The two variants of a file object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    File,
    Folder,
}

/// The attribute flags surfaced for a file object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub read_only: bool,
    pub hidden: bool,
    pub system: bool,
}

impl Attributes {
    /// Returns the names of the flags that are set, in a fixed order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.read_only {
            labels.push("ReadOnly");
        }
        if self.hidden {
            labels.push("Hidden");
        }
        if self.system {
            labels.push("System");
        }
        labels
    }
}

/// A metadata snapshot of one file object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub size: u64,
    pub created: SystemTime,
    pub modified: SystemTime,
    pub attributes: Attributes,
}

impl FileInfo {
    /// The placeholder reported when gathering metadata fails.
    pub fn empty() -> Self {
        Self {
            size: 0,
            created: UNIX_EPOCH,
            modified: UNIX_EPOCH,
            attributes: Attributes::default(),
        }
    }
}

/// A storage backend exposing the file-object capability set.
///
/// Folder-only operations ([`content`](Self::content),
/// [`make_directory`](Self::make_directory), [`paste`](Self::paste)) fail
/// with [`CoreError::NotADirectory`](crate::CoreError::NotADirectory) when
/// handed a file; file-only operations fail with `Unsupported` when handed
/// a folder.
pub trait FileSystem {
    /// Handle to one file or folder in this backend.
    type Object: Clone + PartialEq + fmt::Debug;

    /// Returns the object's name (last path component).
    fn name(&self, object: &Self::Object) -> String;

    /// Returns whether the object is a file or a folder.
    fn kind(&self, object: &Self::Object) -> ObjectKind;

    /// Returns a displayable location of the object inside this backend.
    fn path(&self, object: &Self::Object) -> PathBuf;

    /// Returns the size in bytes. For folders this is the recursive sum of
    /// all descendant file sizes, computed on every call.
    fn size_in_bytes(&self, object: &Self::Object) -> CoreResult<u64>;

    fn creation_time(&self, object: &Self::Object) -> CoreResult<SystemTime>;

    fn last_modified_time(&self, object: &Self::Object) -> CoreResult<SystemTime>;

    fn attributes(&self, object: &Self::Object) -> CoreResult<Attributes>;

    /// Returns the owning folder, or `None` for a root.
    fn parent(&self, object: &Self::Object) -> Option<Self::Object>;

    fn exists(&self, object: &Self::Object) -> bool;

    /// Removes the object; folders are removed recursively.
    fn delete(&mut self, object: &Self::Object) -> CoreResult<()>;

    /// Lists the immediate children of `folder`, folders first.
    fn content(&self, folder: &Self::Object) -> CoreResult<Vec<Self::Object>>;

    /// Creates a subfolder, renaming on collision.
    fn make_directory(&mut self, folder: &Self::Object, name: &str) -> CoreResult<Self::Object>;

    /// Copies `object` into `folder` under `name`, renaming on collision.
    fn paste(
        &mut self,
        folder: &Self::Object,
        object: &Self::Object,
        name: &str,
    ) -> CoreResult<Self::Object>;

    /// Returns the byte content of a file.
    fn read_content(&self, file: &Self::Object) -> CoreResult<Vec<u8>>;

    /// Returns `true` if the object is a file.
    fn is_file(&self, object: &Self::Object) -> bool {
        self.kind(object) == ObjectKind::File
    }

    /// Returns the extension of a file (with its dot), or `""`.
    fn extension(&self, object: &Self::Object) -> String {
        match self.kind(object) {
            ObjectKind::File => {
                let name = self.name(object);
                crate::fs::naming::split_extension(&name).1.to_string()
            }
            ObjectKind::Folder => String::new(),
        }
    }

    /// Gathers size, timestamps and attributes in one call.
    fn info(&self, object: &Self::Object) -> CoreResult<FileInfo> {
        Ok(FileInfo {
            created: self.creation_time(object)?,
            modified: self.last_modified_time(object)?,
            attributes: self.attributes(object)?,
            size: self.size_in_bytes(object)?,
        })
    }

    /// Copies `object` into `destination` as `name`.
    fn copy_to(
        &mut self,
        object: &Self::Object,
        destination: &Self::Object,
        name: &str,
    ) -> CoreResult<Self::Object> {
        self.paste(destination, object, name)
    }

    /// Pastes `object` into `destination`, then deletes the source.
    ///
    /// This is not atomic: if the paste succeeds and the delete fails, both
    /// copies remain and the delete error is returned.
    fn move_to(
        &mut self,
        object: &Self::Object,
        destination: &Self::Object,
        name: &str,
    ) -> CoreResult<Self::Object> {
        let pasted = self.paste(destination, object, name)?;
        self.delete(object)?;
        Ok(pasted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_labels_in_order() {
        let attrs = Attributes {
            read_only: true,
            hidden: true,
            system: true,
        };
        assert_eq!(attrs.labels(), vec!["ReadOnly", "Hidden", "System"]);
        assert!(Attributes::default().labels().is_empty());
    }

    #[test]
    fn empty_info_is_zeroed() {
        let info = FileInfo::empty();
        assert_eq!(info.size, 0);
        assert_eq!(info.created, UNIX_EPOCH);
        assert_eq!(info.modified, UNIX_EPOCH);
        assert_eq!(info.attributes, Attributes::default());
    }
}
