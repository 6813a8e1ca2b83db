//! The file manager: current folder, current selection and clipboard.
//!
//! [`FileManager`] never touches storage itself. Every operation is
//! delegated to the backend it owns, and every backend failure is turned
//! into a categorized [`InfoMessage`] pushed onto the caller's out-list.
//! Nothing here panics or propagates an error upward; callers decide
//! whether to retry, abort or ignore.

use crate::error::CoreError;
use crate::event::{Command, Event};
use crate::fs::object::{FileInfo, FileSystem};
use crate::message::{InfoMessage, MessageCode};

/// Whether a clipboard object is copied or moved on paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

/// The single clipboard slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Clipboard<T> {
    Empty,
    Holding { object: T, mode: ClipboardMode },
}

impl<T> Default for Clipboard<T> {
    fn default() -> Self {
        Clipboard::Empty
    }
}

impl<T> Clipboard<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Clipboard::Empty)
    }

    /// Returns the held object, if any.
    pub fn object(&self) -> Option<&T> {
        match self {
            Clipboard::Empty => None,
            Clipboard::Holding { object, .. } => Some(object),
        }
    }

    pub fn mode(&self) -> Option<ClipboardMode> {
        match self {
            Clipboard::Empty => None,
            Clipboard::Holding { mode, .. } => Some(*mode),
        }
    }
}

/// Where the manager stands in its selection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSelection,
    FolderActive,
    ObjectSelected,
}

/// Orchestrates browsing and clipboard operations over one backend.
#[derive(Debug)]
pub struct FileManager<F: FileSystem> {
    fs: F,
    current_folder: Option<F::Object>,
    current_object: Option<F::Object>,
    clipboard: Clipboard<F::Object>,
}

impl<F: FileSystem> FileManager<F> {
    /// Creates a manager with nothing selected and an empty clipboard.
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            current_folder: None,
            current_object: None,
            clipboard: Clipboard::Empty,
        }
    }

    /// Creates a manager whose current folder is `folder`.
    pub fn with_folder(fs: F, folder: F::Object) -> Self {
        let mut manager = Self::new(fs);
        manager.set_current_folder(folder);
        manager
    }

    /// Returns the backend.
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Consumes the manager and returns the backend.
    pub fn into_fs(self) -> F {
        self.fs
    }

    pub fn state(&self) -> SessionState {
        if self.current_object.is_some() {
            SessionState::ObjectSelected
        } else if self.current_folder.is_some() {
            SessionState::FolderActive
        } else {
            SessionState::NoSelection
        }
    }

    pub fn current_folder(&self) -> Option<&F::Object> {
        self.current_folder.as_ref()
    }

    pub fn current_object(&self) -> Option<&F::Object> {
        self.current_object.as_ref()
    }

    pub fn clipboard(&self) -> &Clipboard<F::Object> {
        &self.clipboard
    }

    pub fn has_empty_clipboard(&self) -> bool {
        self.clipboard.is_empty()
    }

    /// Makes `folder` the current folder. The selection is cleared because
    /// it belonged to the previous folder.
    pub fn set_current_folder(&mut self, folder: F::Object) {
        self.current_folder = Some(folder);
        self.current_object = None;
    }

    pub fn set_current_object(&mut self, object: F::Object) {
        self.current_object = Some(object);
    }

    /// Opens the parent of the current folder. Returns `false` at a root.
    pub fn go_up(&mut self) -> bool {
        let parent = self
            .current_folder
            .as_ref()
            .and_then(|folder| self.fs.parent(folder));
        match parent {
            Some(parent) => {
                self.set_current_folder(parent);
                true
            }
            None => false,
        }
    }

    /// Puts `object` on the clipboard, replacing whatever was held.
    pub fn add_to_clipboard(&mut self, object: F::Object, mode: ClipboardMode) {
        tracing::debug!("clipboard: {:?} {}", mode, self.fs.path(&object).display());
        self.clipboard = Clipboard::Holding { object, mode };
    }

    pub fn copy(&mut self, object: F::Object) {
        self.add_to_clipboard(object, ClipboardMode::Copy);
    }

    pub fn cut(&mut self, object: F::Object) {
        self.add_to_clipboard(object, ClipboardMode::Cut);
    }

    /// Lists `folder`. On failure returns an empty list and reports why.
    pub fn list_folder(
        &self,
        folder: &F::Object,
        messages: &mut Vec<InfoMessage>,
    ) -> Vec<F::Object> {
        self.fs.content(folder).unwrap_or_else(|e| {
            report(messages, "list folder", &e);
            Vec::new()
        })
    }

    /// Lists the current folder (empty when there is none).
    pub fn list_content(&self, messages: &mut Vec<InfoMessage>) -> Vec<F::Object> {
        match &self.current_folder {
            Some(folder) => self.list_folder(folder, messages),
            None => Vec::new(),
        }
    }

    /// Gathers metadata of `object`. On failure returns [`FileInfo::empty`].
    pub fn metadata(&self, object: &F::Object, messages: &mut Vec<InfoMessage>) -> FileInfo {
        self.fs.info(object).unwrap_or_else(|e| {
            report(messages, "gather information", &e);
            FileInfo::empty()
        })
    }

    /// Reads a file's content. On failure returns no bytes.
    pub fn file_content(&self, file: &F::Object, messages: &mut Vec<InfoMessage>) -> Vec<u8> {
        self.fs.read_content(file).unwrap_or_else(|e| {
            report(messages, "read content", &e);
            Vec::new()
        })
    }

    /// Pastes the clipboard object into the current folder.
    ///
    /// - Pasting into the clipboard object itself reports
    ///   `DestinationIsSource` and keeps the clipboard.
    /// - A cut object whose parent already is the current folder stays
    ///   where it is: the clipboard is cleared and the object returned.
    /// - Otherwise the backend copies the object. After a successful copy
    ///   a cut source is deleted and the clipboard is cleared, even if that
    ///   delete fails (the failure is still reported).
    /// - A failed copy is reported and leaves the clipboard untouched.
    pub fn paste(&mut self, messages: &mut Vec<InfoMessage>) -> Option<F::Object> {
        let Clipboard::Holding { object, mode } = self.clipboard.clone() else {
            tracing::debug!("paste with empty clipboard");
            return None;
        };
        let Some(destination) = self.current_folder.clone() else {
            tracing::debug!("paste without a current folder");
            return None;
        };

        if object == destination {
            messages.push(InfoMessage::negative(MessageCode::DestinationIsSource));
            return None;
        }

        if mode == ClipboardMode::Cut && self.fs.parent(&object).as_ref() == Some(&destination) {
            self.clipboard = Clipboard::Empty;
            return Some(object);
        }

        let name = self.fs.name(&object);
        match self.fs.paste(&destination, &object, &name) {
            Ok(pasted) => {
                if mode == ClipboardMode::Cut {
                    if let Err(e) = self.fs.delete(&object) {
                        report(messages, "delete cut source", &e);
                    }
                }
                self.clipboard = Clipboard::Empty;
                Some(pasted)
            }
            Err(e) => {
                report(messages, "paste", &e);
                None
            }
        }
    }

    /// Creates a subfolder of the current folder, renaming on collision.
    pub fn make_directory(
        &mut self,
        name: &str,
        messages: &mut Vec<InfoMessage>,
    ) -> Option<F::Object> {
        let folder = self.current_folder.clone()?;
        match self.fs.make_directory(&folder, name) {
            Ok(created) => Some(created),
            Err(e) => {
                report(messages, "create folder", &e);
                None
            }
        }
    }

    /// Deletes the current selection. Returns `true` on success, after
    /// which nothing is selected.
    pub fn delete_current(&mut self, messages: &mut Vec<InfoMessage>) -> bool {
        let Some(object) = self.current_object.clone() else {
            return false;
        };
        match self.fs.delete(&object) {
            Ok(()) => {
                self.current_object = None;
                true
            }
            Err(e) => {
                report(messages, "delete", &e);
                false
            }
        }
    }

    /// Runs one UI command and describes the outcome.
    pub fn execute(&mut self, command: Command<F::Object>) -> Event<F::Object> {
        let mut messages = Vec::new();
        match command {
            Command::List => {
                let Some(folder) = self.current_folder.clone() else {
                    return failed("list", messages);
                };
                let entries = self.list_folder(&folder, &mut messages);
                if messages.is_empty() {
                    Event::ContentListed { folder, entries }
                } else {
                    failed("list", messages)
                }
            }
            Command::Open(object) => {
                if self.fs.is_file(&object) {
                    self.set_current_object(object.clone());
                    Event::Selected(object)
                } else {
                    self.set_current_folder(object.clone());
                    Event::FolderOpened(object)
                }
            }
            Command::Select(object) => {
                self.set_current_object(object.clone());
                Event::Selected(object)
            }
            Command::GoUp => {
                if self.go_up() {
                    match self.current_folder.clone() {
                        Some(folder) => Event::FolderOpened(folder),
                        None => failed("go up", messages),
                    }
                } else {
                    failed("go up", messages)
                }
            }
            Command::Info => {
                let Some(object) = self.current_object.clone() else {
                    return failed("info", messages);
                };
                let info = self.metadata(&object, &mut messages);
                if messages.is_empty() {
                    Event::InfoGathered { object, info }
                } else {
                    failed("info", messages)
                }
            }
            Command::Read => {
                let Some(file) = self.current_object.clone() else {
                    return failed("read", messages);
                };
                let content = self.file_content(&file, &mut messages);
                if messages.is_empty() {
                    Event::ContentRead { file, content }
                } else {
                    failed("read", messages)
                }
            }
            Command::Copy(object) => {
                self.copy(object.clone());
                Event::ClipboardSet {
                    object,
                    mode: ClipboardMode::Copy,
                }
            }
            Command::Cut(object) => {
                self.cut(object.clone());
                Event::ClipboardSet {
                    object,
                    mode: ClipboardMode::Cut,
                }
            }
            Command::Paste => match self.paste(&mut messages) {
                Some(object) => Event::Pasted { object, messages },
                None => failed("paste", messages),
            },
            Command::MakeDirectory(name) => match self.make_directory(&name, &mut messages) {
                Some(folder) => Event::DirectoryCreated(folder),
                None => failed("create folder", messages),
            },
            Command::Delete => {
                if self.delete_current(&mut messages) {
                    Event::Deleted
                } else {
                    failed("delete", messages)
                }
            }
        }
    }
}

fn report(messages: &mut Vec<InfoMessage>, operation: &str, err: &CoreError) {
    tracing::warn!("{operation} failed: {err}");
    messages.push(InfoMessage::from(err));
}

fn failed<T>(operation: &str, messages: Vec<InfoMessage>) -> Event<T> {
    Event::OperationFailed {
        operation: operation.to_string(),
        messages,
    }
}
