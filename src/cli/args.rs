//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_MOUNT_FOLDER;

/// Remount NTFS volumes read-write through the ntfs-3g driver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "ntfs-remount")]
pub struct Args {
    /// Only unmount the selected volumes
    #[arg(short = 'u', long = "unmount")]
    pub unmount: bool,

    /// Folder in which mount points are created
    #[arg(short = 'f', long = "volumes-folder", default_value = DEFAULT_MOUNT_FOLDER)]
    pub volumes_folder: PathBuf,

    /// List connected NTFS volumes and exit
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Path to the read-write NTFS driver binary
    #[arg(long)]
    pub driver: Option<PathBuf>,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Volume names to remount (all NTFS volumes when omitted)
    #[arg(value_name = "VOLUME_NAME", allow_hyphen_values = true)]
    pub volumes: Vec<String>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_args() {
        let args = Args::try_parse_from(["ntfs-remount"]).unwrap();
        assert!(!args.unmount);
        assert!(!args.list);
        assert_eq!(args.volumes_folder, PathBuf::from("/Volumes"));
        assert!(args.volumes.is_empty());
    }

    #[test]
    fn test_parse_unmount_with_volumes() {
        let args = Args::try_parse_from(["ntfs-remount", "-u", "DATA", "My Backup"]).unwrap();
        assert!(args.unmount);
        assert_eq!(args.volumes, vec!["DATA", "My Backup"]);
    }

    #[test]
    fn test_parse_long_flags() {
        let args =
            Args::try_parse_from(["ntfs-remount", "--unmount", "--volumes-folder", "/mnt", "X"])
                .unwrap();
        assert!(args.unmount);
        assert_eq!(args.volumes_folder, PathBuf::from("/mnt"));
        assert_eq!(args.volumes, vec!["X"]);
    }

    #[test]
    fn test_unknown_tokens_are_volume_names() {
        let args = Args::try_parse_from(["ntfs-remount", "-x"]).unwrap();
        assert_eq!(args.volumes, vec!["-x"]);

        let args = Args::try_parse_from(["ntfs-remount", "-u", "--bogus", "DATA"]).unwrap();
        assert!(args.unmount);
        assert_eq!(args.volumes, vec!["--bogus", "DATA"]);
    }

    #[test]
    fn test_help_short_circuits() {
        let err = Args::try_parse_from(["ntfs-remount", "-h", "DATA"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
