//! simfm core library: UI-agnostic file manager logic.
//!
//! `simfm-core` lets a frontend browse and manipulate either the real file
//! system or a simulated in-memory copy of it through one interface. The
//! simulated tree can be imported from a real folder and persisted between
//! runs, so destructive operations can be rehearsed safely.
//!
//! # Modules
//!
//! - [`fs`]: the [`FileSystem`] contract, the live and simulated backends,
//!   collision-free naming, snapshots and display helpers.
//! - [`manager`]: the [`FileManager`] orchestrator with its clipboard.
//! - [`session`]: backend selection at startup ([`Session`]).
//! - [`event`]: command and event types for UI ↔ core communication.
//! - [`message`]: categorized user-facing messages ([`InfoMessage`]).
//! - [`config`]: TOML-based settings.
//! - [`error`]: unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod error;
pub mod event;
pub mod fs;
pub mod manager;
pub mod message;
pub mod session;

pub use config::{Config, Mode};
pub use error::{CoreError, CoreResult};
pub use event::{Command, Event};
pub use fs::format::{format_date, format_size, DEFAULT_DATE_FORMAT};
pub use fs::naming::resolve_collision;
pub use fs::sim::{find_snapshot, load_snapshot, save_snapshot, DEFAULT_CONTENT_CAP};
pub use fs::{
    Attributes, FileInfo, FileSystem, LiveFs, LiveObject, ObjectKind, SimFs, SimObject,
    DRIVE_CONTAINER_NAME,
};
pub use manager::{Clipboard, ClipboardMode, FileManager, SessionState};
pub use message::{InfoMessage, MessageCode, MessageKind};
pub use session::Session;
