//! Running instances and the source that enumerates them.

use crate::Error;
use std::{collections::BTreeMap, future::Future};

#[cfg(feature = "aws")]
mod aws;
#[cfg(feature = "aws")]
pub use aws::Ec2;

/// Tag holding the Nagios host name of an instance
pub const NAME_TAG: &str = "Name";

/// Tag holding the comma-separated services provided by an instance
pub const SERVICES_TAG: &str = "Services";

/// Lifecycle state reported for an instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum State {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    Unknown(String),
}

impl From<&str> for State {
    fn from(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "shutting-down" => Self::ShuttingDown,
            "terminated" => Self::Terminated,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Snapshot of a single instance, as reported by a [Source].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
    pub name: Option<String>,
    pub private_address: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub state: State,
}

impl Instance {
    /// Creates an instance from its tags, deriving `name` from the [NAME_TAG].
    pub fn new<K, V>(
        id: impl Into<String>,
        private_address: Option<String>,
        tags: impl IntoIterator<Item = (K, V)>,
        state: State,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let tags: BTreeMap<String, String> = tags
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        let name = tags.get(NAME_TAG).cloned();
        Self {
            id: id.into(),
            name,
            private_address,
            tags,
            state,
        }
    }

    /// Returns `true` if the instance may take part in the topology.
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Returns the raw value of the [SERVICES_TAG], if present.
    pub fn services(&self) -> Option<&str> {
        self.tags.get(SERVICES_TAG).map(String::as_str)
    }
}

/// Enumerates running instances of a region.
pub trait Source: Send + Sync {
    /// Returns every running instance in `region`.
    ///
    /// Credential or authorization rejections must be reported as [Error::AuthFailure],
    /// anything else as [Error::InstanceSourceUnavailable].
    fn fetch_running(&self, region: &str)
        -> impl Future<Output = Result<Vec<Instance>, Error>> + Send;
}
