//! Render a [Topology] into Nagios configuration files.
//!
//! Rendering is delegated to a [Renderer] and writing to a [Sink], so the emitter itself only
//! decides which file receives which content. Emission is full-replace: the host and service
//! directories are cleared before they are rewritten.

use crate::{
    topology::{Host, Service, Topology},
    Error,
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::info;

pub mod sink;
pub mod templates;

/// Directory (under the configuration root) holding one file per host
pub const HOSTS_DIR: &str = "hosts";

/// Directory (under the configuration root) holding one file per service
pub const SERVICES_DIR: &str = "services";

/// Extension of every generated file
pub const EXTENSION: &str = "cfg";

/// Check command used to determine whether a host is up
pub const HOST_CHECK_COMMAND: &str = "check-host-alive";

/// Variables made available to a template.
pub type Variables = BTreeMap<&'static str, String>;

/// Templates known to a [Renderer].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Template {
    /// Rendered with `host_name`, `check_command` and `private_ip_address`.
    Host,
    /// Rendered with `host_list`, `service_description` and `check_command`.
    Service,
}

impl Template {
    pub const ALL: [Template; 2] = [Template::Host, Template::Service];

    /// Name of the file the template is loaded from.
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Host => "host.template",
            Self::Service => "service.template",
        }
    }
}

/// Turns a template and its variables into text.
pub trait Renderer {
    fn render(&self, template: Template, variables: &Variables) -> Result<String, Error>;
}

/// Destination of rendered configuration.
pub trait Sink {
    /// Removes everything inside `path`.
    fn clear_directory(&self, path: &Path) -> Result<(), Error>;

    /// Replaces the contents of the file at `path`.
    fn write_file(&self, path: &Path, contents: &str) -> Result<(), Error>;
}

/// Variables of the [Template::Host] template for `host`.
pub fn host_variables(host: &Host) -> Variables {
    Variables::from([
        ("host_name", host.name.clone()),
        ("check_command", HOST_CHECK_COMMAND.to_string()),
        (
            "private_ip_address",
            host.address.clone().unwrap_or_default(),
        ),
    ])
}

/// Variables of the [Template::Service] template for `service`.
pub fn service_variables(service: &Service) -> Variables {
    Variables::from([
        ("host_list", service.host_list()),
        ("service_description", service.display_name().to_string()),
        ("check_command", service.check_command().to_string()),
    ])
}

/// Maps a host name or service id to a file name that stays inside its directory.
///
/// Path separators and NUL are percent-encoded, as is `%` itself, so distinct names always map
/// to distinct files.
pub fn file_name(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '%' => stem.push_str("%25"),
            '/' => stem.push_str("%2F"),
            '\\' => stem.push_str("%5C"),
            '\0' => stem.push_str("%00"),
            c => stem.push(c),
        }
    }
    format!("{stem}.{EXTENSION}")
}

/// Files written by [Emitter::emit].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Emitted {
    pub hosts: usize,
    pub services: usize,
}

/// Writes a [Topology] below a configuration root.
pub struct Emitter<R: Renderer, S: Sink> {
    renderer: R,
    sink: S,
    root: PathBuf,
}

impl<R: Renderer, S: Sink> Emitter<R, S> {
    pub fn new(renderer: R, sink: S, root: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            sink,
            root: root.into(),
        }
    }

    pub fn hosts_dir(&self) -> PathBuf {
        self.root.join(HOSTS_DIR)
    }

    pub fn services_dir(&self) -> PathBuf {
        self.root.join(SERVICES_DIR)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Replaces the host and service configuration with the contents of `topology`.
    ///
    /// Everything is rendered before the first directory is cleared, so a template error leaves
    /// the existing configuration untouched.
    pub fn emit(&self, topology: &Topology) -> Result<Emitted, Error> {
        let hosts_dir = self.hosts_dir();
        let hosts = topology
            .hosts()
            .iter()
            .map(|host| {
                let contents = self.renderer.render(Template::Host, &host_variables(host))?;
                Ok::<_, Error>((hosts_dir.join(file_name(&host.name)), contents))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let services_dir = self.services_dir();
        let services = topology
            .services()
            .map(|service| {
                info!(service = service.id(), "rendering service");
                let contents = self
                    .renderer
                    .render(Template::Service, &service_variables(service))?;
                Ok::<_, Error>((services_dir.join(file_name(service.id())), contents))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.replace(&hosts_dir, &hosts)?;
        info!(path = ?hosts_dir, count = hosts.len(), "wrote host configs");
        self.replace(&services_dir, &services)?;
        info!(path = ?services_dir, count = services.len(), "wrote service configs");
        Ok(Emitted {
            hosts: hosts.len(),
            services: services.len(),
        })
    }

    fn replace(&self, dir: &Path, files: &[(PathBuf, String)]) -> Result<(), Error> {
        self.sink.clear_directory(dir)?;
        for (path, contents) in files {
            self.sink.write_file(path, contents)?;
        }
        Ok(())
    }
}
