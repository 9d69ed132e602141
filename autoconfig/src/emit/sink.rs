//! Local filesystem implementation of [Sink].

use super::Sink;
use crate::{Error, SinkOperation};
use std::{fs, io, path::Path};
use tracing::debug;

/// Writes configuration to the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct Filesystem;

impl Filesystem {
    fn clear(path: &Path) -> io::Result<usize> {
        fs::create_dir_all(path)?;
        let mut removed = 0;
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
            removed += 1;
        }
        Ok(removed)
    }
}

impl Sink for Filesystem {
    /// Creates `path` if it does not exist yet.
    fn clear_directory(&self, path: &Path) -> Result<(), Error> {
        let removed = Self::clear(path).map_err(|source| Error::Sink {
            operation: SinkOperation::ClearDirectory,
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, removed, "cleared directory");
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), Error> {
        fs::write(path, contents).map_err(|source| Error::Sink {
            operation: SinkOperation::WriteFile,
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "wrote file");
        Ok(())
    }
}
