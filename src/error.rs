//! Error types for the remount tool
//!
//! Each variant maps to the exit code the process terminates with.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the remount tool
#[derive(Error, Debug)]
pub enum RemountError {
    /// Not running with administrator rights
    #[error("Insufficient privilege: {message}")]
    InsufficientPrivilege { message: String },

    /// Enumeration found no NTFS volume
    #[error("No NTFS drive connected: {message}")]
    NoDriveConnected {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Structured OS output could not be parsed, or a lookup failed
    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unmount, mount-point handling or the mount driver failed
    #[error("Mounting error: {message}")]
    Mounting {
        message: String,
        device: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// File system operation errors
    #[error("File system error: {operation} failed on {path}")]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Process execution errors
    #[error("Process error: {command} failed")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl RemountError {
    /// Create a new insufficient privilege error
    pub fn insufficient_privilege(message: impl Into<String>) -> Self {
        Self::InsufficientPrivilege {
            message: message.into(),
        }
    }

    /// Create a new "no drive connected" error
    pub fn no_drive(message: impl Into<String>) -> Self {
        Self::NoDriveConnected {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        Self::Parsing {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new mounting error for a device
    pub fn mounting(message: impl Into<String>, device: impl Into<String>) -> Self {
        Self::Mounting {
            message: message.into(),
            device: Some(device.into()),
            source: None,
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(
        operation: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a new process error
    pub fn process(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Attach an underlying cause to a classified error
    #[must_use]
    pub fn with_source(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        match &mut self {
            Self::NoDriveConnected { source, .. }
            | Self::Parsing { source, .. }
            | Self::Mounting { source, .. } => *source = Some(Box::new(cause)),
            _ => {}
        }
        self
    }

    /// Process exit code associated with this error
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InsufficientPrivilege { .. } => 10,
            Self::NoDriveConnected { .. } => 20,
            Self::Parsing { .. } | Self::Config { .. } => 30,
            Self::Mounting { .. } | Self::FileSystem { .. } | Self::Process { .. } => 40,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RemountError>;
