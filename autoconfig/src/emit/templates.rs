//! Jinja templates loaded from a directory.

use super::{Renderer, Template, Variables};
use crate::Error;
use minijinja::Environment;
use std::path::Path;
use tracing::debug;

/// Renders the [Template]s found in a directory.
///
/// Both templates are read and compiled up front: a missing or malformed template fails
/// before anything else happens.
pub struct TemplateDir {
    env: Environment<'static>,
}

impl TemplateDir {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let mut env = Environment::new();
        for template in Template::ALL {
            let path = dir.join(template.file_name());
            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(source) => return Err(Error::TemplateNotFound { path, source }),
            };
            env.add_template_owned(template.file_name(), source)?;
            debug!(?path, "loaded template");
        }
        Ok(Self { env })
    }
}

impl Renderer for TemplateDir {
    fn render(&self, template: Template, variables: &Variables) -> Result<String, Error> {
        let template = self.env.get_template(template.file_name())?;
        Ok(template.render(variables)?)
    }
}
