//! Configuration management for the remount tool
//!
//! Built once from the command line and passed explicitly to every component.

use crate::{cli::Args, error::RemountError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default root under which mount points are created
pub const DEFAULT_MOUNT_FOLDER: &str = "/Volumes";

/// Default location of the read-write NTFS driver
pub const DEFAULT_DRIVER_PATH: &str = "/usr/local/bin/ntfs-3g";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Only unmount, never mount again
    pub unmount_only: bool,
    /// Root directory for mount points
    pub mount_folder: PathBuf,
    /// Mount driver configuration
    pub driver: DriverConfig,
}

/// Mount driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Path to the driver binary
    pub path: PathBuf,
    /// Options passed as `-o <option>`
    pub options: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            unmount_only: false,
            mount_folder: PathBuf::from(DEFAULT_MOUNT_FOLDER),
            driver: DriverConfig::default(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DRIVER_PATH),
            options: vec![
                "local".to_string(),
                "allow_other".to_string(),
                "auto_xattr".to_string(),
                "auto_cache".to_string(),
            ],
        }
    }
}

impl Config {
    /// Create configuration from command line arguments
    ///
    /// Validation is left to the caller so it can run after the privilege check.
    pub fn from_args(args: &Args) -> Self {
        let mut config = Self {
            debug: args.debug,
            unmount_only: args.unmount,
            mount_folder: args.volumes_folder.clone(),
            ..Self::default()
        };

        if let Some(driver) = &args.driver {
            config.driver.path = driver.clone();
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), RemountError> {
        if !self.mount_folder.is_absolute() {
            return Err(RemountError::config(format!(
                "Volumes folder must be an absolute path: {}",
                self.mount_folder.display()
            )));
        }

        if self.driver.path.as_os_str().is_empty() {
            return Err(RemountError::config("Mount driver path is empty"));
        }

        Ok(())
    }

    /// Mount path for a device under the configured folder
    pub fn mount_path(&self, device_identifier: &str) -> PathBuf {
        self.mount_folder.join(device_identifier)
    }

    /// Get driver command line for mounting a device
    pub fn driver_args(&self, device_identifier: &str, mount_path: &Path) -> Vec<String> {
        let mut args = vec![
            format!("/dev/{device_identifier}"),
            mount_path.to_string_lossy().to_string(),
        ];

        for option in &self.driver.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }

        args
    }
}
