//! # ntfs-remount
//!
//! Remounts NTFS volumes read-write on macOS. Connected NTFS volumes are
//! discovered through `diskutil`, unmounted, and mounted again with the
//! ntfs-3g FUSE driver.
//!
//! ## Features
//!
//! - Property list parsing of `diskutil` output without external XML tools
//! - Volume selection by name, defaulting to every NTFS volume
//! - Unmount-only mode and a configurable mount root
//! - A [`core::DiskSystem`] seam so the orchestration runs without devices
//!
//! ## Example
//!
//! ```no_run
//! use ntfs_remount::{config::Config, core::{DriveEnumerator, MacDiskSystem}};
//!
//! let system = MacDiskSystem::new(Config::default())?;
//! let drives = DriveEnumerator::new()?.list_available(&system)?;
//! for drive in drives {
//!     println!("{} on {}", drive.volume_name, drive.device_identifier);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use crate::error::RemountError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Exit code for an error surfaced by the CLI; unclassified errors map to 1
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<RemountError>()
        .map_or(1, RemountError::exit_code)
}
