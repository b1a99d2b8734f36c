//! Artifact output writer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Artifact;
use crate::infrastructure::traits::FileSystem;

/// Writes rendered artifacts below an output folder.
///
/// All checks run before the first write, so a rejected batch leaves the
/// output folder untouched.
pub struct OutputWriter {
    fs: Arc<dyn FileSystem>,
}

impl OutputWriter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Paths occurring more than once, in order of first occurrence.
    pub fn duplicates(artifacts: &[Artifact]) -> Vec<PathBuf> {
        artifacts
            .iter()
            .map(|a| &a.path)
            .duplicates()
            .cloned()
            .collect()
    }

    /// Reject duplicates, optionally wipe `output_folder`, then write every artifact.
    #[instrument(level = "debug", skip(self, artifacts), fields(artifacts = artifacts.len()))]
    pub fn write(
        &self,
        artifacts: &[Artifact],
        output_folder: &Path,
        clear: bool,
    ) -> ApplicationResult<()> {
        let duplicates = Self::duplicates(artifacts);
        if !duplicates.is_empty() {
            return Err(ApplicationError::DuplicateOutputs(duplicates));
        }

        if clear {
            self.clear(output_folder)?;
        }

        for artifact in artifacts {
            self.fs
                .ensure_parent(&artifact.path)
                .with_path_context("create parent directory", &artifact.path)?;
            self.fs
                .write(&artifact.path, &artifact.content)
                .with_path_context("write artifact", &artifact.path)?;
            debug!("wrote {}", artifact.path.display());
        }
        info!("wrote {} files to {}", artifacts.len(), output_folder.display());
        Ok(())
    }

    fn clear(&self, output_folder: &Path) -> ApplicationResult<()> {
        if self.fs.is_dir(output_folder) {
            debug!("clearing {}", output_folder.display());
            self.fs
                .remove_dir_all(output_folder)
                .with_path_context("clear output folder", output_folder)?;
        }
        self.fs
            .create_dir_all(output_folder)
            .with_path_context("create output folder", output_folder)
    }
}
