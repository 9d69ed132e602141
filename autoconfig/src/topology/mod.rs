//! Derive Nagios hosts and services from tagged instances.
//!
//! Every running instance with a `Name` tag becomes a [Host]. Each entry of its `Services` tag
//! becomes (or extends) a [ServiceKey::Derived] service listing the hosts that provide it.
//! [Topology::with_checks] then adds the fixed [Check] bundle covering every host.
//!
//! Host lists are kept as ordered sequences and only joined when rendered (see
//! [Service::host_list]).

use crate::ec2::Instance;
use std::collections::{btree_map::Entry, BTreeMap, HashMap};
use tracing::{debug, info, warn};

pub mod checks;
pub use checks::Check;

/// Separator between service names in the `Services` tag and between host names in a rendered
/// host list.
pub const SEPARATOR: char = ',';

/// Prefix of the check command assigned to tag-derived services.
pub const CHECK_PREFIX: &str = "check_";

/// A monitored endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub address: Option<String>,
}

/// Identifies a [Service].
///
/// Tag-derived services and NRPE checks never share a key, even when a tag spells a check id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceKey {
    Derived(String),
    Check(Check),
}

impl ServiceKey {
    /// Service id, used as output file stem and service description.
    pub fn id(&self) -> &str {
        match self {
            Self::Derived(id) => id,
            Self::Check(check) => check.id(),
        }
    }
}

/// A Nagios check and the hosts it applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    key: ServiceKey,
    display_name: String,
    host_names: Vec<String>,
    check_command: String,
}

impl Service {
    fn derived(id: &str, host: &str) -> Self {
        Self {
            key: ServiceKey::Derived(id.to_string()),
            display_name: id.to_string(),
            host_names: vec![host.to_string()],
            check_command: format!("{CHECK_PREFIX}{id}"),
        }
    }

    fn check(check: Check, host_names: Vec<String>) -> Self {
        Self {
            key: ServiceKey::Check(check),
            display_name: check.id().to_string(),
            host_names,
            check_command: check.command().to_string(),
        }
    }

    pub fn id(&self) -> &str {
        self.key.id()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Hosts providing the service, in discovery order (a host may appear more than once).
    pub fn host_names(&self) -> &[String] {
        &self.host_names
    }

    pub fn check_command(&self) -> &str {
        &self.check_command
    }

    /// Host names joined with [SEPARATOR], as Nagios expects in `host_name`.
    pub fn host_list(&self) -> String {
        self.host_names.join(&SEPARATOR.to_string())
    }
}

/// Immutable snapshot of the hosts and services derived from a set of instances.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    hosts: Vec<Host>,
    services: BTreeMap<ServiceKey, Service>,
}

impl Topology {
    /// Hosts, in discovery order.
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.iter().find(|host| host.name == name)
    }

    /// Services: derived ones sorted by id, then the checks in [Check::ALL] order.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    pub fn service(&self, key: &ServiceKey) -> Option<&Service> {
        self.services.get(key)
    }

    /// Convenience lookup of a tag-derived service.
    pub fn derived(&self, id: &str) -> Option<&Service> {
        self.service(&ServiceKey::Derived(id.to_string()))
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Returns a topology where every [Check] covers all hosts.
    ///
    /// Checks overwrite any tag-derived service with the same id (both would be written to the
    /// same file). Without hosts, the topology is returned unchanged.
    pub fn with_checks(mut self) -> Self {
        if self.hosts.is_empty() {
            debug!("no hosts, skipping checks");
            return self;
        }
        self.services.retain(|key, service| match key {
            ServiceKey::Derived(id) if Check::from_id(id).is_some() => {
                warn!(
                    service = id.as_str(),
                    hosts = ?service.host_names,
                    "tag-derived service replaced by check"
                );
                false
            }
            _ => true,
        });
        let names: Vec<String> = self.hosts.iter().map(|host| host.name.clone()).collect();
        for check in Check::ALL {
            self.services
                .insert(ServiceKey::Check(check), Service::check(check, names.clone()));
        }
        self
    }
}

/// Accumulates instances into a [Topology].
#[derive(Default)]
pub struct Builder {
    hosts: Vec<Host>,
    positions: HashMap<String, usize>,
    services: BTreeMap<ServiceKey, Service>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instance, returning `true` if it produced a host.
    ///
    /// Instances that are not running or have no name are ignored.
    pub fn add(&mut self, instance: &Instance) -> bool {
        if !instance.is_running() {
            debug!(id = instance.id.as_str(), state = ?instance.state, "skipping instance that is not running");
            return false;
        }
        let Some(name) = instance.name.as_deref() else {
            debug!(id = instance.id.as_str(), "skipping instance without name");
            return false;
        };

        // Instances sharing a name address the same host
        match self.positions.get(name) {
            Some(&position) => {
                warn!(name, id = instance.id.as_str(), "duplicate host name");
                self.hosts[position].address = instance.private_address.clone();
            }
            None => {
                self.positions.insert(name.to_string(), self.hosts.len());
                self.hosts.push(Host {
                    name: name.to_string(),
                    address: instance.private_address.clone(),
                });
            }
        }

        let Some(services) = instance.services() else {
            return true;
        };
        for id in services.split(SEPARATOR) {
            if id.is_empty() {
                warn!(name, services, "empty service name");
            }
            match self.services.entry(ServiceKey::Derived(id.to_string())) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().host_names.push(name.to_string());
                }
                Entry::Vacant(entry) => {
                    info!(service = id, "added service");
                    entry.insert(Service::derived(id, name));
                }
            }
        }
        true
    }

    pub fn build(self) -> Topology {
        Topology {
            hosts: self.hosts,
            services: self.services,
        }
    }
}

/// Builds the topology (without checks) of `instances`, in order.
pub fn build<'a>(instances: impl IntoIterator<Item = &'a Instance>) -> Topology {
    let mut builder = Builder::new();
    for instance in instances {
        builder.add(instance);
    }
    builder.build()
}
