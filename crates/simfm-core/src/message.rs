//! Categorized user-facing messages.
//!
//! The orchestrator never lets a backend failure escape as a fault. Each
//! failure is folded into an [`InfoMessage`] and appended to the out-list
//! the caller passed in.

use crate::error::CoreError;

/// Whether a message reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Positive,
    Negative,
}

/// The recoverable failure categories surfaced to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCode {
    /// Permission was denied at some storage boundary.
    RestrictedAccess,
    /// The paste target is the clipboard object itself.
    DestinationIsSource,
    /// The object (e.g. the drive list) does not support the operation.
    UnsupportedOperation,
    /// Any other failure.
    UnknownError,
}

impl MessageCode {
    /// Returns the sentence shown to the user for this code.
    pub fn text(self) -> &'static str {
        match self {
            MessageCode::RestrictedAccess => {
                "The access to this file / folder or its subfolders is restricted!"
            }
            MessageCode::DestinationIsSource => "The destination folder is the source folder!",
            MessageCode::UnsupportedOperation => {
                "This operation is not supported on the selected item."
            }
            MessageCode::UnknownError => {
                "An unknown error occurred while accessing / creating this file / folder."
            }
        }
    }
}

/// A single categorized message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoMessage {
    kind: MessageKind,
    code: MessageCode,
}

impl InfoMessage {
    pub fn new(kind: MessageKind, code: MessageCode) -> Self {
        Self { kind, code }
    }

    /// Builds a negative message for `code`.
    pub fn negative(code: MessageCode) -> Self {
        Self::new(MessageKind::Negative, code)
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn code(&self) -> MessageCode {
        self.code
    }

    pub fn text(&self) -> &'static str {
        self.code.text()
    }
}

impl From<&CoreError> for InfoMessage {
    fn from(err: &CoreError) -> Self {
        InfoMessage::negative(err.message_code())
    }
}
