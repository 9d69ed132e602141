#![allow(dead_code)]

use nagios_autoconfig::{
    ec2::{Instance, Source},
    Error,
};
use std::path::{Path, PathBuf};

/// Templates shipped with the crate.
pub fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(nagios_autoconfig::TEMPLATES_DIR)
}

/// Scratch Nagios configuration root, removed on drop.
pub struct TestFiles {
    pub dir: PathBuf,
}

impl TestFiles {
    pub fn create(test_name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "nagios_autoconfig_test_{}_{}",
            test_name,
            std::process::id()
        ));
        if dir.exists() {
            std::fs::remove_dir_all(&dir).unwrap();
        }
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    /// Writes a file below the root, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.dir.join(relative)).unwrap()
    }

    /// Sorted file names inside `relative`.
    pub fn list(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.join(relative))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for TestFiles {
    fn drop(&mut self) {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }
}

/// Source returning a fixed set of instances, or rejecting credentials.
pub enum FixedSource {
    Instances(Vec<Instance>),
    Unauthorized,
}

impl Source for FixedSource {
    async fn fetch_running(&self, region: &str) -> Result<Vec<Instance>, Error> {
        match self {
            Self::Instances(instances) => Ok(instances.clone()),
            Self::Unauthorized => Err(Error::AuthFailure {
                region: region.to_string(),
                source: "AuthFailure: credentials could not be validated".into(),
            }),
        }
    }
}
