//! Asset relocation service
//!
//! Turns a [`GraphicsPlan`] into concrete file copies, adds every other
//! non-build file of the source project, and performs the copies all-or-nothing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{AssetRelocator, DocumentTree, GraphicsPlan};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::{normalize_path_separator, PathExt};

/// Extensions never copied by the static scan: sources and build by-products.
pub const EXCLUDED_EXTENSIONS: [&str; 8] = [
    ".tex",
    ".log",
    ".aux",
    ".fls",
    ".fdb_latexmk",
    ".out",
    ".toc",
    ".gz",
];

/// One scheduled file copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Complete move plan: relocated graphics first, then static files.
#[derive(Debug, Clone, Default)]
pub struct AssetPlan {
    pub graphics: GraphicsPlan,
    pub copies: Vec<FileCopy>,
}

impl AssetPlan {
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}

/// Asset relocation service.
pub struct AssetService {
    fs: Arc<dyn FileSystem>,
}

impl AssetService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Compute the relocated tree and the full move plan without copying anything.
    #[instrument(level = "debug", skip(self, tree, relocator))]
    pub fn plan(
        &self,
        tree: &DocumentTree,
        relocator: &AssetRelocator,
        source_root: &Path,
        output_root: &Path,
    ) -> ApplicationResult<(DocumentTree, AssetPlan)> {
        let covered: HashSet<PathBuf> = relocator
            .resources(tree)
            .iter()
            .map(|r| source_root.join(r).lexical_normalize())
            .collect();
        let static_copies = self.static_files(source_root, output_root, &covered)?;

        // Static files keep their place; graphics are named around them.
        let reserved: HashSet<String> = static_copies
            .iter()
            .filter_map(|c| c.destination.relative_to(output_root))
            .map(|p| normalize_path_separator(&p.to_string_lossy()))
            .collect();
        let (relocated, graphics) = relocator.plan_avoiding(tree, &reserved);

        let mut copies: Vec<FileCopy> = graphics
            .moves()
            .iter()
            .map(|m| FileCopy {
                source: source_root.join(&m.source),
                destination: output_root.join(&m.destination),
            })
            .collect();
        copies.extend(static_copies);

        debug!("plan: {} graphics, {} copies", graphics.len(), copies.len());
        Ok((relocated, AssetPlan { graphics, copies }))
    }

    /// Every remaining project file that is neither a source nor a build artifact.
    fn static_files(
        &self,
        source_root: &Path,
        output_root: &Path,
        covered: &HashSet<PathBuf>,
    ) -> ApplicationResult<Vec<FileCopy>> {
        if !self.fs.is_dir(source_root) {
            return Err(ApplicationError::config(format!(
                "input folder is not a directory: {}",
                source_root.display()
            )));
        }

        let files = self
            .fs
            .list_files(source_root)
            .with_path_context("scan input folder", source_root)?;

        let mut copies = Vec::new();
        for file in files {
            if file.is_within(output_root) {
                continue;
            }
            if EXCLUDED_EXTENSIONS.contains(&file.dotted_extension().as_str()) {
                continue;
            }
            if covered.contains(&file.lexical_normalize()) {
                continue;
            }
            let Some(relative) = file.relative_to(source_root) else {
                continue;
            };
            copies.push(FileCopy {
                destination: output_root.join(relative),
                source: file,
            });
        }
        Ok(copies)
    }

    /// First missing source aborts the whole plan.
    pub fn verify(&self, plan: &AssetPlan) -> ApplicationResult<()> {
        match plan.copies.iter().find(|c| !self.fs.is_file(&c.source)) {
            Some(missing) => Err(ApplicationError::MissingAsset(missing.source.clone())),
            None => Ok(()),
        }
    }

    /// Verify every source, then copy, creating parent directories as needed.
    #[instrument(level = "debug", skip_all, fields(copies = plan.len()))]
    pub fn execute(&self, plan: &AssetPlan) -> ApplicationResult<()> {
        self.verify(plan)?;
        for copy in &plan.copies {
            self.fs
                .ensure_parent(&copy.destination)
                .with_path_context("create parent directory", &copy.destination)?;
            self.fs
                .copy(&copy.source, &copy.destination)
                .with_path_context("copy asset", &copy.source)?;
            debug!("copied {} -> {}", copy.source.display(), copy.destination.display());
        }
        info!("copied {} assets", plan.len());
        Ok(())
    }
}
