//! The live backend: file objects bound to real paths on disk.
//!
//! A [`LiveObject`] is just a canonical path tagged with its variant, so
//! equality is path equality and nothing is cached. Every listing re-reads
//! the directory, which keeps external changes visible. The parent of a
//! filesystem root is the synthetic drive container ([`LiveObject::Drives`]),
//! which lists the ready storage volumes and rejects every mutation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use unicode_normalization::UnicodeNormalization;

use crate::error::{CoreError, CoreResult};
use crate::fs::naming::{is_valid_name, resolve_collision};
use crate::fs::object::{Attributes, FileSystem, ObjectKind};

/// Display name of the drive container.
pub const DRIVE_CONTAINER_NAME: &str = "Available drives";

/// Handle to an object in the live backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiveObject {
    File(PathBuf),
    Folder(PathBuf),
    /// The folder-of-volumes above every filesystem root.
    Drives,
}

impl LiveObject {
    /// Returns the real path, or `None` for the drive container.
    pub fn real_path(&self) -> Option<&Path> {
        match self {
            LiveObject::File(p) | LiveObject::Folder(p) => Some(p),
            LiveObject::Drives => None,
        }
    }
}

/// The real-filesystem backend. Stateless; every call goes to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveFs;

impl LiveFs {
    pub fn new() -> Self {
        Self
    }

    /// Binds `path` to a live object, canonicalizing it first.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the path does not exist.
    /// - [`CoreError::PermissionDenied`] if it cannot be resolved.
    pub fn open(&self, path: &Path) -> CoreResult<LiveObject> {
        let canonical = path
            .canonicalize()
            .map_err(|e| CoreError::from_io(path, e))?;
        let meta = std::fs::metadata(&canonical).map_err(|e| CoreError::from_io(path, e))?;
        Ok(if meta.is_dir() {
            LiveObject::Folder(canonical)
        } else {
            LiveObject::File(canonical)
        })
    }

    /// Returns the drive container.
    pub fn drives(&self) -> LiveObject {
        LiveObject::Drives
    }

    /// Returns the roots of all ready storage volumes.
    pub fn volumes() -> Vec<PathBuf> {
        #[cfg(windows)]
        {
            (b'A'..=b'Z')
                .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
                .filter(|root| root.is_dir())
                .collect()
        }
        #[cfg(not(windows))]
        {
            vec![PathBuf::from("/")]
        }
    }

    fn folder_path<'a>(&self, folder: &'a LiveObject, operation: &str) -> CoreResult<&'a Path> {
        match folder {
            LiveObject::Folder(p) => Ok(p),
            LiveObject::File(p) => Err(CoreError::NotADirectory(p.clone())),
            LiveObject::Drives => Err(CoreError::Unsupported(format!(
                "{operation} in {DRIVE_CONTAINER_NAME}"
            ))),
        }
    }

    fn taken_names(dir: &Path) -> CoreResult<HashSet<String>> {
        let read_dir = std::fs::read_dir(dir).map_err(|e| CoreError::from_io(dir, e))?;
        Ok(read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().nfc().collect())
            .collect())
    }
}

impl FileSystem for LiveFs {
    type Object = LiveObject;

    fn name(&self, object: &LiveObject) -> String {
        match object {
            LiveObject::File(p) | LiveObject::Folder(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().nfc().collect())
                .unwrap_or_else(|| p.to_string_lossy().into_owned()),
            LiveObject::Drives => DRIVE_CONTAINER_NAME.to_string(),
        }
    }

    fn kind(&self, object: &LiveObject) -> ObjectKind {
        match object {
            LiveObject::File(_) => ObjectKind::File,
            LiveObject::Folder(_) | LiveObject::Drives => ObjectKind::Folder,
        }
    }

    fn path(&self, object: &LiveObject) -> PathBuf {
        match object {
            LiveObject::File(p) | LiveObject::Folder(p) => p.clone(),
            LiveObject::Drives => PathBuf::from(DRIVE_CONTAINER_NAME),
        }
    }

    fn size_in_bytes(&self, object: &LiveObject) -> CoreResult<u64> {
        match object {
            LiveObject::File(p) => std::fs::metadata(p)
                .map(|m| m.len())
                .map_err(|e| CoreError::from_io(p, e)),
            LiveObject::Folder(p) => dir_size(p),
            LiveObject::Drives => Ok(0),
        }
    }

    fn creation_time(&self, object: &LiveObject) -> CoreResult<SystemTime> {
        let Some(path) = object.real_path() else {
            return Ok(UNIX_EPOCH);
        };
        let meta = std::fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
        // Not every platform records a birth time.
        meta.created()
            .or_else(|_| meta.modified())
            .map_err(|e| CoreError::from_io(path, e))
    }

    fn last_modified_time(&self, object: &LiveObject) -> CoreResult<SystemTime> {
        let Some(path) = object.real_path() else {
            return Ok(UNIX_EPOCH);
        };
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| CoreError::from_io(path, e))
    }

    fn attributes(&self, object: &LiveObject) -> CoreResult<Attributes> {
        let Some(path) = object.real_path() else {
            return Ok(Attributes::default());
        };
        let meta = std::fs::metadata(path).map_err(|e| CoreError::from_io(path, e))?;
        Ok(attributes_of(path, &meta))
    }

    fn parent(&self, object: &LiveObject) -> Option<LiveObject> {
        match object {
            LiveObject::File(p) => p.parent().map(|pp| LiveObject::Folder(pp.to_path_buf())),
            LiveObject::Folder(p) => Some(match p.parent() {
                Some(pp) => LiveObject::Folder(pp.to_path_buf()),
                None => LiveObject::Drives,
            }),
            LiveObject::Drives => None,
        }
    }

    fn exists(&self, object: &LiveObject) -> bool {
        match object {
            LiveObject::File(p) => p.is_file(),
            LiveObject::Folder(p) => p.is_dir(),
            LiveObject::Drives => true,
        }
    }

    fn delete(&mut self, object: &LiveObject) -> CoreResult<()> {
        let path = match object {
            LiveObject::File(p) | LiveObject::Folder(p) => p,
            LiveObject::Drives => {
                return Err(CoreError::Unsupported(format!(
                    "delete {DRIVE_CONTAINER_NAME}"
                )))
            }
        };
        // symlink_metadata: a link is removed, never its target
        let meta = std::fs::symlink_metadata(path).map_err(|e| CoreError::from_io(path, e))?;
        let result = if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        result.map_err(|e| CoreError::from_io(path, e))?;
        tracing::debug!("deleted {}", path.display());
        Ok(())
    }

    fn content(&self, folder: &LiveObject) -> CoreResult<Vec<LiveObject>> {
        let path = match folder {
            LiveObject::Folder(p) => p,
            LiveObject::File(p) => return Err(CoreError::NotADirectory(p.clone())),
            LiveObject::Drives => {
                return Ok(Self::volumes()
                    .into_iter()
                    .map(LiveObject::Folder)
                    .collect())
            }
        };
        if !path.exists() {
            return Err(CoreError::NotFound(path.clone()));
        }
        if !path.is_dir() {
            return Err(CoreError::NotADirectory(path.clone()));
        }

        let read_dir = std::fs::read_dir(path).map_err(|e| CoreError::from_io(path, e))?;

        let mut folders = Vec::new();
        let mut files = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let entry_path = dir_entry.path();
            // Follows links, so a dangling one is skipped here.
            let metadata = match std::fs::metadata(&entry_path) {
                Ok(m) => m,
                Err(_) => continue,
            };
            if metadata.is_dir() {
                folders.push(entry_path);
            } else {
                files.push(entry_path);
            }
        }
        folders.sort();
        files.sort();

        Ok(folders
            .into_iter()
            .map(LiveObject::Folder)
            .chain(files.into_iter().map(LiveObject::File))
            .collect())
    }

    fn make_directory(&mut self, folder: &LiveObject, name: &str) -> CoreResult<LiveObject> {
        let parent = self.folder_path(folder, "create folder")?;
        if !is_valid_name(name) {
            return Err(CoreError::InvalidName(name.to_string()));
        }
        let taken = Self::taken_names(parent)?;
        let resolved = resolve_collision(&taken, name, name, ObjectKind::Folder);
        let target = parent.join(&resolved);
        std::fs::create_dir(&target).map_err(|e| CoreError::from_io(&target, e))?;
        tracing::debug!("created folder {}", target.display());
        Ok(LiveObject::Folder(target))
    }

    fn paste(
        &mut self,
        folder: &LiveObject,
        object: &LiveObject,
        name: &str,
    ) -> CoreResult<LiveObject> {
        let dest = self.folder_path(folder, "paste")?.to_path_buf();
        if !is_valid_name(name) {
            return Err(CoreError::InvalidName(name.to_string()));
        }

        match object {
            LiveObject::Drives => Err(CoreError::Unsupported(format!(
                "copy {DRIVE_CONTAINER_NAME}"
            ))),
            LiveObject::File(src) => {
                if !src.is_file() {
                    return Err(CoreError::NotFound(src.clone()));
                }
                let original = self.name(object);
                let taken = Self::taken_names(&dest)?;
                let resolved = resolve_collision(&taken, name, &original, ObjectKind::File);
                let target = target_path(&dest, src, &resolved, &original);
                copy_entry(src, &target)?;
                tracing::debug!("pasted {} as {}", src.display(), target.display());
                Ok(LiveObject::File(target))
            }
            LiveObject::Folder(src) => {
                if !src.is_dir() {
                    return Err(CoreError::NotFound(src.clone()));
                }
                // A listed folder may be a link; compare where both really are.
                let real_src = src.canonicalize().map_err(|e| CoreError::from_io(src, e))?;
                let real_dest = dest.canonicalize().map_err(|e| CoreError::from_io(&dest, e))?;
                if real_dest.starts_with(&real_src) {
                    return Err(CoreError::DestinationIsSource);
                }
                let taken = Self::taken_names(&dest)?;
                let resolved = resolve_collision(&taken, name, name, ObjectKind::Folder);
                let target = target_path(&dest, src, &resolved, &self.name(object));
                std::fs::create_dir(&target).map_err(|e| CoreError::from_io(&target, e))?;
                copy_dir_contents(&real_src, &target)?;
                tracing::debug!("pasted {} as {}", src.display(), target.display());
                Ok(LiveObject::Folder(target))
            }
        }
    }

    fn read_content(&self, file: &LiveObject) -> CoreResult<Vec<u8>> {
        match file {
            LiveObject::File(p) => std::fs::read(p).map_err(|e| CoreError::from_io(p, e)),
            other => Err(CoreError::Unsupported(format!(
                "read content of folder {}",
                self.name(other)
            ))),
        }
    }
}

/// Sums the sizes of all files below `dir`. Links are not followed.
fn dir_size(dir: &Path) -> CoreResult<u64> {
    let mut total = 0;
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let read_dir = std::fs::read_dir(&current).map_err(|e| CoreError::from_io(&current, e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| CoreError::from_io(&current, e))?;
            let ft = entry.file_type().map_err(|e| CoreError::from_io(entry.path(), e))?;
            if ft.is_dir() {
                pending.push(entry.path());
            } else {
                let meta = entry
                    .metadata()
                    .map_err(|e| CoreError::from_io(entry.path(), e))?;
                total += meta.len();
            }
        }
    }
    Ok(total)
}

/// Copies one non-directory entry, keeping symlinks as symlinks.
fn copy_entry(src: &Path, target: &Path) -> CoreResult<()> {
    let meta = std::fs::symlink_metadata(src).map_err(|e| CoreError::from_io(src, e))?;
    if meta.is_symlink() {
        let link_target = std::fs::read_link(src).map_err(|e| CoreError::from_io(src, e))?;
        #[cfg(unix)]
        std::os::unix::fs::symlink(&link_target, target)
            .map_err(|e| CoreError::from_io(target, e))?;
        #[cfg(not(unix))]
        {
            let _ = link_target;
            std::fs::copy(src, target).map_err(|e| CoreError::from_io(target, e))?;
        }
    } else {
        std::fs::copy(src, target).map_err(|e| CoreError::from_io(target, e))?;
    }
    Ok(())
}

/// Where a pasted entry lands. An unrenamed entry keeps the raw bytes of
/// its source name, so non-NFC and non-UTF-8 names survive the copy.
fn target_path(dest: &Path, src: &Path, resolved: &str, display_name: &str) -> PathBuf {
    match src.file_name() {
        Some(raw) if resolved == display_name => dest.join(raw),
        _ => dest.join(resolved),
    }
}

/// Copies everything inside `src` into the existing, empty folder `dest`.
///
/// Walks with an explicit stack, so nesting depth is unbounded. Links are
/// copied as links and never followed. Stops at the first failure; whatever
/// was copied so far stays in place.
fn copy_dir_contents(src: &Path, dest: &Path) -> CoreResult<()> {
    let mut pending = vec![(src.to_path_buf(), dest.to_path_buf())];
    while let Some((from, to)) = pending.pop() {
        let read_dir = std::fs::read_dir(&from).map_err(|e| CoreError::from_io(&from, e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| CoreError::from_io(&from, e))?;
            let entry_path = entry.path();
            let target = to.join(entry.file_name());

            // file_type() does not follow symlinks
            let ft = entry
                .file_type()
                .map_err(|e| CoreError::from_io(&entry_path, e))?;
            if ft.is_dir() {
                std::fs::create_dir(&target).map_err(|e| CoreError::from_io(&target, e))?;
                pending.push((entry_path, target));
            } else {
                copy_entry(&entry_path, &target)?;
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
fn attributes_of(path: &Path, meta: &std::fs::Metadata) -> Attributes {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false);
    Attributes {
        read_only: meta.permissions().readonly(),
        hidden,
        system: false,
    }
}

#[cfg(windows)]
fn attributes_of(_path: &Path, meta: &std::fs::Metadata) -> Attributes {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
    let raw = meta.file_attributes();
    Attributes {
        read_only: meta.permissions().readonly(),
        hidden: raw & FILE_ATTRIBUTE_HIDDEN != 0,
        system: raw & FILE_ATTRIBUTE_SYSTEM != 0,
    }
}

#[cfg(not(any(unix, windows)))]
fn attributes_of(_path: &Path, meta: &std::fs::Metadata) -> Attributes {
    Attributes {
        read_only: meta.permissions().readonly(),
        ..Attributes::default()
    }
}
