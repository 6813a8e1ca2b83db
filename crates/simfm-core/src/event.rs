//! Command and event types for communication between UI and core.
//!
//! The UI translates user input into [`Command`]s, which
//! [`FileManager::execute`](crate::FileManager::execute) processes and
//! answers with an [`Event`]. Both are generic over the backend's object
//! handle, so a frontend drives the live and the simulated backend the same
//! way.

use crate::fs::object::FileInfo;
use crate::manager::ClipboardMode;
use crate::message::InfoMessage;

/// An action the UI requests the core to perform.
///
/// Commands flow **UI → Core**. The core never creates commands itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<T> {
    /// List the content of the current folder.
    List,
    /// Make a folder the current folder, or select a file.
    Open(T),
    /// Select an object without opening it.
    Select(T),
    /// Make the parent of the current folder the current folder.
    GoUp,
    /// Gather size, timestamps and attributes of the selected object.
    Info,
    /// Read the byte content of the selected file.
    Read,
    /// Put an object on the clipboard for copying.
    Copy(T),
    /// Put an object on the clipboard for moving.
    Cut(T),
    /// Paste the clipboard object into the current folder.
    Paste,
    /// Create a subfolder of the current folder.
    MakeDirectory(String),
    /// Delete the selected object.
    Delete,
}

/// A notification the core sends back to the UI.
///
/// Events flow **Core → UI**. The UI uses these to update its display state.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    /// The current folder has been listed.
    ContentListed {
        /// The folder that was listed.
        folder: T,
        /// Its children, folders first.
        entries: Vec<T>,
    },
    /// A folder became the current folder.
    FolderOpened(T),
    /// An object became the current selection.
    Selected(T),
    /// Metadata of the selected object.
    InfoGathered { object: T, info: FileInfo },
    /// Content of the selected file.
    ContentRead { file: T, content: Vec<u8> },
    /// The clipboard now holds `object`.
    ClipboardSet { object: T, mode: ClipboardMode },
    /// The clipboard object was pasted; carries the resulting object.
    ///
    /// `messages` may report a failed source delete after a cut.
    Pasted {
        object: T,
        messages: Vec<InfoMessage>,
    },
    /// A new folder was created.
    DirectoryCreated(T),
    /// The selected object was deleted.
    Deleted,
    /// The command could not be carried out.
    OperationFailed {
        /// Human-readable description of the operation.
        operation: String,
        /// The categorized reasons, if any.
        messages: Vec<InfoMessage>,
    },
}

impl<T> Event<T> {
    /// Returns `true` for [`Event::OperationFailed`].
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::OperationFailed { .. })
    }
}
