//! Privilege checks

use nix::unistd::geteuid;

/// Whether the process runs with an effective uid of root
pub fn is_elevated() -> bool {
    geteuid().is_root()
}
