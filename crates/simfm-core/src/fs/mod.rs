//! File-object abstractions and their two backends.
//!
//! [`object::FileSystem`] is the capability contract. [`live::LiveFs`]
//! implements it over the real filesystem, [`sim::SimFs`] over an in-memory
//! tree that can be saved to and restored from a snapshot. Both create
//! objects through the collision resolver in [`naming`].

pub mod format;
pub mod live;
pub mod naming;
pub mod object;
pub mod sim;

pub use live::{LiveFs, LiveObject, DRIVE_CONTAINER_NAME};
pub use object::{Attributes, FileInfo, FileSystem, ObjectKind};
pub use sim::{SimFs, SimObject};
