//! NTFS drive discovery and volume selection
//!
//! Turns the `diskutil list -plist` output into the list of NTFS volumes
//! the remounter works on.

use crate::{
    core::{
        plist::{PlistParser, PlistValue},
        system::DiskSystem,
    },
    error::{RemountError, Result},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// `Content` marker diskutil reports for NTFS partitions
pub const NTFS_CONTENT: &str = "Windows_NTFS";

/// A connected NTFS volume
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NtfsDrive {
    /// Volume label, empty when the partition has none
    pub volume_name: String,
    /// BSD device identifier such as `disk2s1`
    pub device_identifier: String,
}

impl NtfsDrive {
    pub fn new(volume_name: impl Into<String>, device_identifier: impl Into<String>) -> Self {
        Self {
            volume_name: volume_name.into(),
            device_identifier: device_identifier.into(),
        }
    }
}

/// Discovers NTFS volumes through the disk system
pub struct DriveEnumerator {
    parser: PlistParser,
}

impl DriveEnumerator {
    /// Create a new drive enumerator
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: PlistParser::new()?,
        })
    }

    /// List every connected NTFS volume, in enumeration order
    #[instrument(skip(self, system))]
    pub fn list_available<S: DiskSystem>(&self, system: &S) -> Result<Vec<NtfsDrive>> {
        let listing = system.list_disks().map_err(|e| {
            RemountError::no_drive("Could not list disks with diskutil").with_source(e)
        })?;

        if listing.trim().is_empty() {
            return Err(RemountError::no_drive("diskutil returned no disk information"));
        }

        let drives = self.parse_listing(&listing)?;
        if drives.is_empty() {
            return Err(RemountError::no_drive("No NTFS volume found"));
        }

        info!("Found {} NTFS volume(s)", drives.len());
        Ok(drives)
    }

    /// Extract NTFS volumes from a `diskutil list -plist` document
    pub fn parse_listing(&self, listing: &str) -> Result<Vec<NtfsDrive>> {
        let root = self.parser.parse(listing)?;
        if !root.is_dict() {
            return Err(RemountError::parsing(
                "diskutil listing is not a dictionary",
            ));
        }

        let mut drives = Vec::new();
        collect_ntfs_drives(&root, &mut drives)?;
        Ok(drives)
    }
}

/// Walk the listing depth-first, keeping document order
fn collect_ntfs_drives(value: &PlistValue, drives: &mut Vec<NtfsDrive>) -> Result<()> {
    if value.get("Content").and_then(PlistValue::as_str) == Some(NTFS_CONTENT) {
        let device = value
            .get("DeviceIdentifier")
            .and_then(PlistValue::as_str)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                RemountError::parsing("NTFS partition without a DeviceIdentifier")
            })?;
        let name = value
            .get("VolumeName")
            .and_then(PlistValue::as_str)
            .unwrap_or_default();

        if drives.iter().any(|d| d.device_identifier == device) {
            debug!("Skipping duplicate entry for {}", device);
        } else {
            debug!("Found NTFS volume '{}' on {}", name, device);
            drives.push(NtfsDrive::new(name, device));
        }
    }

    for child in value.children() {
        collect_ntfs_drives(child, drives)?;
    }

    Ok(())
}

/// Decide which volume names to operate on.
///
/// An empty request means every available volume. Requested names are
/// returned untouched; unknown names are rejected later, when the device
/// is looked up.
pub fn select_volume_names(available: &[NtfsDrive], requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        available.iter().map(|d| d.volume_name.clone()).collect()
    } else {
        requested.to_vec()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::system::tests::FakeSystem;

    pub(crate) const LISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>AllDisks</key>
	<array>
		<string>disk0</string>
		<string>disk0s1</string>
		<string>disk2</string>
		<string>disk2s1</string>
		<string>disk3</string>
		<string>disk3s1</string>
	</array>
	<key>AllDisksAndPartitions</key>
	<array>
		<dict>
			<key>Content</key>
			<string>GUID_partition_scheme</string>
			<key>DeviceIdentifier</key>
			<string>disk0</string>
			<key>Partitions</key>
			<array>
				<dict>
					<key>Content</key>
					<string>EFI</string>
					<key>DeviceIdentifier</key>
					<string>disk0s1</string>
					<key>VolumeName</key>
					<string>EFI</string>
				</dict>
			</array>
		</dict>
		<dict>
			<key>Content</key>
			<string>FDisk_partition_scheme</string>
			<key>DeviceIdentifier</key>
			<string>disk2</string>
			<key>Partitions</key>
			<array>
				<dict>
					<key>Content</key>
					<string>Windows_NTFS</string>
					<key>DeviceIdentifier</key>
					<string>disk2s1</string>
					<key>MountPoint</key>
					<string>/Volumes/DATA</string>
					<key>Size</key>
					<integer>1000202273280</integer>
					<key>VolumeName</key>
					<string>DATA</string>
				</dict>
			</array>
		</dict>
		<dict>
			<key>Content</key>
			<string>FDisk_partition_scheme</string>
			<key>DeviceIdentifier</key>
			<string>disk3</string>
			<key>Partitions</key>
			<array>
				<dict>
					<key>Content</key>
					<string>Windows_NTFS</string>
					<key>DeviceIdentifier</key>
					<string>disk3s1</string>
					<key>VolumeName</key>
					<string>BACKUP</string>
				</dict>
			</array>
		</dict>
	</array>
	<key>VolumesFromDisks</key>
	<array>
		<string>DATA</string>
		<string>BACKUP</string>
	</array>
	<key>WholeDisks</key>
	<array>
		<string>disk0</string>
		<string>disk2</string>
		<string>disk3</string>
	</array>
</dict>
</plist>
"#;

    const NO_NTFS_LISTING: &str = r#"<plist version="1.0"><dict>
<key>AllDisksAndPartitions</key><array><dict>
<key>Content</key><string>GUID_partition_scheme</string>
<key>DeviceIdentifier</key><string>disk0</string>
<key>Partitions</key><array><dict>
<key>Content</key><string>Apple_APFS</string>
<key>DeviceIdentifier</key><string>disk0s2</string>
</dict></array>
</dict></array>
</dict></plist>"#;

    pub(crate) fn sample_drives() -> Vec<NtfsDrive> {
        vec![
            NtfsDrive::new("DATA", "disk2s1"),
            NtfsDrive::new("BACKUP", "disk3s1"),
        ]
    }

    #[test]
    fn test_parse_listing_in_enumeration_order() {
        let enumerator = DriveEnumerator::new().unwrap();
        let drives = enumerator.parse_listing(LISTING).unwrap();
        assert_eq!(drives, sample_drives());
    }

    #[test]
    fn test_list_available_uses_system_listing() {
        let system = FakeSystem::with_listing(LISTING);
        let enumerator = DriveEnumerator::new().unwrap();

        let drives = enumerator.list_available(&system).unwrap();
        assert_eq!(drives.len(), 2);
        assert_eq!(drives[1].device_identifier, "disk3s1");
    }

    #[test]
    fn test_no_ntfs_entries_is_no_drive() {
        let system = FakeSystem::with_listing(NO_NTFS_LISTING);
        let enumerator = DriveEnumerator::new().unwrap();

        let err = enumerator.list_available(&system).unwrap_err();
        assert!(matches!(err, RemountError::NoDriveConnected { .. }));
        assert_eq!(err.exit_code(), 20);
    }

    #[test]
    fn test_blank_or_failed_listing_is_no_drive() {
        let enumerator = DriveEnumerator::new().unwrap();

        let blank = FakeSystem::with_listing("  \n");
        let err = enumerator.list_available(&blank).unwrap_err();
        assert!(matches!(err, RemountError::NoDriveConnected { .. }));

        let failing = FakeSystem::with_listing(LISTING).failing_on("list");
        let err = enumerator.list_available(&failing).unwrap_err();
        assert!(matches!(err, RemountError::NoDriveConnected { .. }));
    }

    #[test]
    fn test_garbage_listing_is_parsing_error() {
        let system = FakeSystem::with_listing("diskutil: unrecognized option");
        let enumerator = DriveEnumerator::new().unwrap();

        let err = enumerator.list_available(&system).unwrap_err();
        assert_eq!(err.exit_code(), 30);
    }

    #[test]
    fn test_ntfs_partition_without_device_is_parsing_error() {
        let enumerator = DriveEnumerator::new().unwrap();
        let listing = "<plist><dict><key>AllDisksAndPartitions</key><array><dict>\
            <key>Content</key><string>Windows_NTFS</string>\
            <key>VolumeName</key><string>DATA</string>\
            </dict></array></dict></plist>";

        let err = enumerator.parse_listing(listing).unwrap_err();
        assert!(matches!(err, RemountError::Parsing { .. }));
    }

    #[test]
    fn test_unnamed_volume_keeps_empty_name() {
        let enumerator = DriveEnumerator::new().unwrap();
        let listing = "<plist><dict><key>AllDisksAndPartitions</key><array><dict>\
            <key>Content</key><string>Windows_NTFS</string>\
            <key>DeviceIdentifier</key><string>disk4</string>\
            </dict></array></dict></plist>";

        let drives = enumerator.parse_listing(listing).unwrap();
        assert_eq!(drives, vec![NtfsDrive::new("", "disk4")]);
    }

    #[test]
    fn test_select_all_when_nothing_requested() {
        let selected = select_volume_names(&sample_drives(), &[]);
        assert_eq!(selected, vec!["DATA", "BACKUP"]);
    }

    #[test]
    fn test_select_requested_names_unmodified() {
        let requested = vec!["BACKUP".to_string(), "MISSING".to_string()];
        let selected = select_volume_names(&sample_drives(), &requested);
        assert_eq!(selected, requested);
    }
}
