//! In-memory collaborators for testing.

use crate::{
    ec2::{self, Instance, State},
    emit::{self, Template, Variables},
    Error, SinkOperation,
};
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Creates a running instance without an address carrying `tags`.
pub fn instance(id: &str, tags: &[(&str, &str)]) -> Instance {
    Instance::new(id, None, tags.iter().copied(), State::Running)
}

/// Outcome of [Source::fetch_running].
pub enum Source {
    Instances(Vec<Instance>),
    AuthFailure,
    Unavailable,
    /// Never resolves.
    Hang,
}

impl ec2::Source for Source {
    async fn fetch_running(&self, region: &str) -> Result<Vec<Instance>, Error> {
        match self {
            Self::Instances(instances) => Ok(instances.clone()),
            Self::AuthFailure => Err(Error::AuthFailure {
                region: region.to_string(),
                source: "AuthFailure".into(),
            }),
            Self::Unavailable => Err(Error::InstanceSourceUnavailable {
                region: region.to_string(),
                source: "connection refused".into(),
            }),
            Self::Hang => std::future::pending().await,
        }
    }
}

/// Renders `<template> key=value ...`, optionally failing for one template.
#[derive(Default)]
pub struct Renderer {
    fail: Option<Template>,
}

impl Renderer {
    pub fn failing(template: Template) -> Self {
        Self {
            fail: Some(template),
        }
    }
}

impl emit::Renderer for Renderer {
    fn render(&self, template: Template, variables: &Variables) -> Result<String, Error> {
        if self.fail == Some(template) {
            return Err(Error::Template(minijinja::Error::new(
                minijinja::ErrorKind::UndefinedError,
                "mock failure",
            )));
        }
        let name = match template {
            Template::Host => "host",
            Template::Service => "service",
        };
        let variables: Vec<String> = variables
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        Ok(format!("{name} {}", variables.join(" ")))
    }
}

/// Operation observed by a [Recorder].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Clear(PathBuf),
    Write(PathBuf, String),
}

/// Records every operation, optionally failing writes to one path.
#[derive(Default)]
pub struct Recorder {
    operations: Mutex<Vec<Operation>>,
    fail: Option<PathBuf>,
}

impl Recorder {
    pub fn failing(path: impl Into<PathBuf>) -> Self {
        Self {
            operations: Mutex::default(),
            fail: Some(path.into()),
        }
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.operations.lock().unwrap().clone()
    }
}

impl emit::Sink for Recorder {
    fn clear_directory(&self, path: &Path) -> Result<(), Error> {
        self.operations
            .lock()
            .unwrap()
            .push(Operation::Clear(path.to_path_buf()));
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), Error> {
        if self.fail.as_deref() == Some(path) {
            return Err(Error::Sink {
                operation: SinkOperation::WriteFile,
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        self.operations
            .lock()
            .unwrap()
            .push(Operation::Write(path.to_path_buf(), contents.to_string()));
        Ok(())
    }
}
