//! Unmount and read-write remount orchestration
//!
//! Volumes are handled one after another; the first failure aborts the run.

use crate::{
    config::Config,
    core::{drives::NtfsDrive, system::DiskSystem},
    error::{RemountError, Result},
};
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// A volume resolved against the current enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRequest {
    /// Volume name as requested
    pub volume_name: String,
    /// Device backing the volume
    pub device_identifier: String,
    /// Where the volume gets mounted
    pub mount_path: PathBuf,
}

impl MountRequest {
    /// Resolve a volume name by exact match against the available drives
    pub fn resolve(volume_name: &str, available: &[NtfsDrive], config: &Config) -> Result<Self> {
        let drive = available
            .iter()
            .find(|d| d.volume_name == volume_name)
            .ok_or_else(|| {
                RemountError::parsing(format!("Device not found for volume '{volume_name}'"))
            })?;

        Ok(Self {
            volume_name: volume_name.to_string(),
            device_identifier: drive.device_identifier.clone(),
            mount_path: config.mount_path(&drive.device_identifier),
        })
    }
}

/// What happened to one volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemountOutcome {
    /// Unmounted and left unmounted
    Unmounted { device_identifier: String },
    /// Mounted read-write
    Mounted {
        device_identifier: String,
        mount_path: PathBuf,
    },
}

/// Drives the unmount / remount sequence for selected volumes
pub struct Remounter<S: DiskSystem> {
    config: Config,
    system: S,
}

impl<S: DiskSystem> Remounter<S> {
    /// Create a new remounter
    pub const fn new(config: Config, system: S) -> Self {
        Self { config, system }
    }

    #[cfg(test)]
    pub(crate) const fn system(&self) -> &S {
        &self.system
    }

    /// Process every selected volume in order
    #[instrument(skip(self, available))]
    pub fn process(
        &self,
        selected: &[String],
        available: &[NtfsDrive],
    ) -> Result<Vec<RemountOutcome>> {
        let mut outcomes = Vec::with_capacity(selected.len());

        for volume_name in selected {
            if volume_name.is_empty() {
                debug!("Skipping empty volume name");
                continue;
            }

            let request = MountRequest::resolve(volume_name, available, &self.config)?;
            outcomes.push(self.process_one(&request)?);
        }

        Ok(outcomes)
    }

    fn process_one(&self, request: &MountRequest) -> Result<RemountOutcome> {
        let device = &request.device_identifier;
        info!("Processing '{}' ({})", request.volume_name, device);

        self.release_existing_mount(device)?;

        if self.config.unmount_only {
            info!("Unmounted '{}' ({})", request.volume_name, device);
            return Ok(RemountOutcome::Unmounted {
                device_identifier: device.clone(),
            });
        }

        self.system
            .create_mount_dir(&request.mount_path)
            .map_err(|e| {
                RemountError::mounting(
                    format!(
                        "Failed to create mount point {}",
                        request.mount_path.display()
                    ),
                    device,
                )
                .with_source(e)
            })?;

        self.system
            .mount(device, &request.mount_path)
            .map_err(|e| {
                RemountError::mounting(format!("Mount driver failed for {device}"), device)
                    .with_source(e)
            })?;

        info!(
            "Mounted '{}' read-write at {}",
            request.volume_name,
            request.mount_path.display()
        );

        Ok(RemountOutcome::Mounted {
            device_identifier: device.clone(),
            mount_path: request.mount_path.clone(),
        })
    }

    /// Unmount the device if mounted and clean up its old mount point
    fn release_existing_mount(&self, device: &str) -> Result<()> {
        let current = self.system.mount_point(device).map_err(|e| {
            if matches!(e, RemountError::Parsing { .. }) {
                e
            } else {
                RemountError::mounting(format!("Failed to query mount point of {device}"), device)
                    .with_source(e)
            }
        })?;

        let Some(old_mount_point) = current else {
            debug!("{} is not mounted", device);
            return Ok(());
        };

        info!("Unmounting {} from {}", device, old_mount_point.display());
        self.system.unmount(device).map_err(|e| {
            RemountError::mounting(format!("Failed to unmount {device}"), device).with_source(e)
        })?;

        let removed = self.system.remove_mount_dir(&old_mount_point).map_err(|e| {
            RemountError::mounting(
                format!(
                    "Failed to remove old mount point {}",
                    old_mount_point.display()
                ),
                device,
            )
            .with_source(e)
        })?;

        if removed {
            debug!("Removed old mount point {}", old_mount_point.display());
        } else if old_mount_point.exists() {
            warn!(
                "Old mount point {} is not empty, leaving it in place",
                old_mount_point.display()
            );
        }

        Ok(())
    }
}
