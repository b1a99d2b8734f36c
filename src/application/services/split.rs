//! Split pipeline service
//!
//! tokens -> tree -> relocated tree + move plan -> artifacts -> files on disk.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::assets::{AssetPlan, AssetService};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt, OutputWriter};
use crate::config::Settings;
use crate::domain::{
    Artifact, AssetRelocator, DocumentTree, RuleEngine, Serializer, Token, TreeBuilder,
};
use crate::infrastructure::traits::FileSystem;

/// Everything a split run produces, before or after it is written.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub artifacts: Vec<Artifact>,
    pub assets: AssetPlan,
}

/// Runs the full restructuring pipeline for one project.
pub struct SplitService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    builder: TreeBuilder,
    assets: AssetService,
    writer: OutputWriter,
}

impl SplitService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self {
            assets: AssetService::new(fs.clone()),
            writer: OutputWriter::new(fs.clone()),
            builder: TreeBuilder::new(),
            fs,
            settings,
        }
    }

    /// Read and decode the token stream named in the settings.
    pub fn load_tokens(&self) -> ApplicationResult<Vec<Token>> {
        let path = self.settings.tokens_path();
        let content = self
            .fs
            .read_to_string(&path)
            .with_path_context("read token stream", &path)?;
        serde_json::from_str(&content).map_err(|e| ApplicationError::Tokens {
            path: path.clone(),
            message: e.to_string(),
        })
    }

    /// Build the section-aware document tree.
    pub fn build(&self) -> ApplicationResult<DocumentTree> {
        let tokens = self.load_tokens()?;
        Ok(self.builder.build(&tokens))
    }

    fn relocator(&self) -> AssetRelocator {
        AssetRelocator::new(self.settings.output.figure_folder.clone())
            .with_macros(self.settings.assets.macros.clone())
    }

    /// Compute artifacts and move plan without touching the output folder.
    #[instrument(level = "debug", skip(self))]
    pub fn prepare(&self) -> ApplicationResult<SplitOutcome> {
        let tree = self.build()?;
        let (mut relocated, assets) = self.assets.plan(
            &tree,
            &self.relocator(),
            &self.settings.input.folder,
            &self.settings.output.folder,
        )?;

        let engine = RuleEngine::new(self.settings.rule_set());
        let root = relocated.root();
        let artifacts = Serializer::new(&engine).render(&mut relocated, root)?;
        debug!(
            "prepare: {} artifacts, {} asset copies",
            artifacts.len(),
            assets.len()
        );
        Ok(SplitOutcome { artifacts, assets })
    }

    /// Prepare, then write artifacts and copy assets.
    ///
    /// Missing assets and duplicate output paths are detected before the
    /// output folder is cleared or written.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&self) -> ApplicationResult<SplitOutcome> {
        let outcome = self.prepare()?;
        self.assets.verify(&outcome.assets)?;

        let output = &self.settings.output;
        self.writer
            .write(&outcome.artifacts, &output.folder, output.clear)?;
        self.assets.execute(&outcome.assets)?;

        info!(
            "split into {} files, relocated {} assets",
            outcome.artifacts.len(),
            outcome.assets.len()
        );
        Ok(outcome)
    }
}
