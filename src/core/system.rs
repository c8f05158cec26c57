//! System command abstraction
//!
//! Every side effect the remounter needs goes through [`DiskSystem`], so the
//! orchestration can be exercised without real devices.

use crate::{
    config::Config,
    core::plist::{PlistParser, PlistValue},
    error::{RemountError, Result},
    utils::{fs::FileSystemUtils, privilege, process::ProcessRunner},
};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Operations against the OS disk subsystem and the mount driver
pub trait DiskSystem {
    /// Whether the process runs with administrator rights
    fn is_elevated(&self) -> bool;

    /// Raw `diskutil list -plist` output
    fn list_disks(&self) -> Result<String>;

    /// Current mount point of a device, `None` when not mounted
    fn mount_point(&self, device: &str) -> Result<Option<PathBuf>>;

    /// Force-unmount a device
    fn unmount(&self, device: &str) -> Result<()>;

    /// Remove a mount-point directory if it exists and is empty.
    /// Returns whether a directory was removed.
    fn remove_mount_dir(&self, path: &Path) -> Result<bool>;

    /// Create a fresh mount-point directory; an existing path is an error
    fn create_mount_dir(&self, path: &Path) -> Result<()>;

    /// Mount a device read-write at the given path
    fn mount(&self, device: &str, mount_path: &Path) -> Result<()>;

    /// Whether the mount driver binary can be found
    fn driver_available(&self) -> bool;
}

impl<S: DiskSystem + ?Sized> DiskSystem for &S {
    fn is_elevated(&self) -> bool {
        (**self).is_elevated()
    }

    fn list_disks(&self) -> Result<String> {
        (**self).list_disks()
    }

    fn mount_point(&self, device: &str) -> Result<Option<PathBuf>> {
        (**self).mount_point(device)
    }

    fn unmount(&self, device: &str) -> Result<()> {
        (**self).unmount(device)
    }

    fn remove_mount_dir(&self, path: &Path) -> Result<bool> {
        (**self).remove_mount_dir(path)
    }

    fn create_mount_dir(&self, path: &Path) -> Result<()> {
        (**self).create_mount_dir(path)
    }

    fn mount(&self, device: &str, mount_path: &Path) -> Result<()> {
        (**self).mount(device, mount_path)
    }

    fn driver_available(&self) -> bool {
        (**self).driver_available()
    }
}

/// `diskutil` and ntfs-3g backed implementation
pub struct MacDiskSystem {
    config: Config,
    process_runner: ProcessRunner,
    fs_utils: FileSystemUtils,
    parser: PlistParser,
}

impl MacDiskSystem {
    /// Create a new system handle with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            process_runner: ProcessRunner::new(config.debug),
            fs_utils: FileSystemUtils::new(),
            parser: PlistParser::new()?,
            config,
        })
    }

    /// Extract the mount point from a `diskutil info -plist` document
    pub fn parse_mount_point(&self, info: &str) -> Result<Option<PathBuf>> {
        let root = self.parser.parse(info)?;
        if !root.is_dict() {
            return Err(RemountError::parsing("diskutil info output is not a dictionary"));
        }

        Ok(root
            .get("MountPoint")
            .and_then(PlistValue::as_str)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from))
    }
}

impl DiskSystem for MacDiskSystem {
    fn is_elevated(&self) -> bool {
        privilege::is_elevated()
    }

    #[instrument(skip(self))]
    fn list_disks(&self) -> Result<String> {
        let output = self
            .process_runner
            .run_command_with_output("diskutil", &["list", "-plist"])?;
        Ok(output.stdout)
    }

    #[instrument(skip(self))]
    fn mount_point(&self, device: &str) -> Result<Option<PathBuf>> {
        let output = self
            .process_runner
            .run_command_with_output("diskutil", &["info", "-plist", device])?;
        let mount_point = self.parse_mount_point(&output.stdout)?;
        debug!("Mount point of {}: {:?}", device, mount_point);
        Ok(mount_point)
    }

    fn unmount(&self, device: &str) -> Result<()> {
        self.process_runner
            .run_command("diskutil", &["unmount", "force", device])
    }

    fn remove_mount_dir(&self, path: &Path) -> Result<bool> {
        self.fs_utils
            .remove_dir_if_empty(path)
            .map_err(|e| RemountError::file_system("remove directory", path, e))
    }

    fn create_mount_dir(&self, path: &Path) -> Result<()> {
        self.fs_utils
            .create_dir(path)
            .map_err(|e| RemountError::file_system("create directory", path, e))
    }

    fn mount(&self, device: &str, mount_path: &Path) -> Result<()> {
        let driver = self.config.driver.path.to_string_lossy();
        let args = self.config.driver_args(device, mount_path);
        let args_str: Vec<&str> = args.iter().map(String::as_str).collect();
        self.process_runner.run_command(&driver, &args_str)
    }

    fn driver_available(&self) -> bool {
        let driver = &self.config.driver.path;
        if driver.components().count() > 1 {
            self.fs_utils.is_file(driver)
        } else {
            self.process_runner
                .command_exists(&driver.to_string_lossy())
        }
    }
}
