//! Core functionality for remounting NTFS volumes
//!
//! Contains drive discovery, property list parsing, the system command
//! abstraction and the remount orchestration.

pub mod drives;
pub mod mounter;
pub mod plist;
pub mod system;

pub use drives::{DriveEnumerator, NtfsDrive, select_volume_names};
pub use mounter::{MountRequest, RemountOutcome, Remounter};
pub use system::{DiskSystem, MacDiskSystem};
