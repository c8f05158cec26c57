//! Utility modules for common functionality
//!
//! Provides reusable utilities for file operations, process execution
//! and privilege checks.

pub mod fs;
pub mod privilege;
pub mod process;

pub use fs::FileSystemUtils;
pub use process::ProcessRunner;
