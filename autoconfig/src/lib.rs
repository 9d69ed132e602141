//! Generate Nagios host and service configuration from EC2 instance tags.
//!
//! Every run discovers the running instances of a single region, derives a monitoring
//! [topology] from their tags, and rewrites the Nagios configuration directory from scratch.
//!
//! # Tags
//!
//! * `Name`: the Nagios host name. Instances without it are ignored (Nagios cannot address them).
//! * `Services`: comma-separated list of services the instance provides. Each entry becomes a
//!   Nagios service checked with `check_<service>` on every host that lists it.
//!
//! Every named host is additionally covered by a fixed bundle of NRPE checks (disk space, disk
//! inodes, CPU load, memory/swap), see [topology::checks].
//!
//! # Output
//!
//! ```txt
//! <config-root>/hosts/<host>.cfg
//! <config-root>/services/<service>.cfg
//! ```
//!
//! Both directories are cleared before they are rewritten. Files are produced by rendering
//! `host.template` and `service.template` (Jinja syntax) found in [TEMPLATES_DIR].

use std::{path::PathBuf, time::Duration};
use thiserror::Error;

pub mod driver;
pub mod ec2;
pub mod emit;
#[cfg(test)]
pub mod mocks;
pub mod topology;

/// Region searched when none is provided
pub const DEFAULT_REGION: &str = "us-east-1";

/// Nagios configuration root written when none is provided
pub const DEFAULT_CONFIG_PATH: &str = "./nagios_config_dir";

/// Directory (relative to the working directory) holding the host and service templates
pub const TEMPLATES_DIR: &str = "nagios_templates_dir";

/// Maximum time to wait for the instance source before giving up
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Boxed cause carried by [Error] variants that wrap a foreign error.
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while generating configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("instance source unavailable in {region}: {source}")]
    InstanceSourceUnavailable { region: String, source: Cause },
    #[error("authorization failed in {region}: {source}")]
    AuthFailure { region: String, source: Cause },
    #[error("template not found: {path}")]
    TemplateNotFound {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("failed to {operation} {path}: {source}")]
    Sink {
        operation: SinkOperation,
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Filesystem operation that failed in [Error::Sink].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkOperation {
    ClearDirectory,
    WriteFile,
}

impl std::fmt::Display for SinkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClearDirectory => write!(f, "clear directory"),
            Self::WriteFile => write!(f, "write file"),
        }
    }
}

impl Error {
    /// Process exit code reported for this error.
    ///
    /// Codes start at 3 so they never collide with clap's usage error (2).
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InstanceSourceUnavailable { .. } => 3,
            Self::AuthFailure { .. } => 4,
            Self::TemplateNotFound { .. } => 5,
            Self::Template(_) => 6,
            Self::Sink { .. } => 7,
        }
    }
}
