//! Graphics relocation planning.
//!
//! Pure part of asset relocation: find every resource reference, give each
//! distinct source a unique destination under the figure folder and rewrite
//! the references in a cloned tree. Copying is done by the application layer.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, instrument};

use crate::domain::arena::{Delimiter, DocumentTree, NodeKind};
use crate::util::path::normalize_path_separator;

/// Macros whose last brace argument is an embedded resource path.
pub const DEFAULT_GRAPHICS_MACROS: [&str; 1] = ["includegraphics"];

/// Relocation of one referenced resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMove {
    /// Path as written in the document
    pub source: String,
    /// New path, relative to the output root
    pub destination: String,
}

/// Deduplicated mapping from referenced paths to their new location, in
/// order of first reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphicsPlan {
    moves: Vec<AssetMove>,
    by_source: HashMap<String, usize>,
}

impl GraphicsPlan {
    pub fn destination(&self, source: &str) -> Option<&str> {
        self.by_source
            .get(source)
            .map(|&i| self.moves[i].destination.as_str())
    }

    pub fn moves(&self) -> &[AssetMove] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    fn push(&mut self, source: String, destination: String) {
        self.by_source.insert(source.clone(), self.moves.len());
        self.moves.push(AssetMove {
            source,
            destination,
        });
    }
}

/// Plans graphics moves and rewrites resource references.
#[derive(Debug, Clone)]
pub struct AssetRelocator {
    figure_folder: String,
    macros: Vec<String>,
}

impl AssetRelocator {
    pub fn new(figure_folder: impl Into<String>) -> Self {
        Self {
            figure_folder: figure_folder.into(),
            macros: DEFAULT_GRAPHICS_MACROS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_macros(mut self, macros: Vec<String>) -> Self {
        self.macros = macros;
        self
    }

    /// Distinct resource paths in order of first reference.
    pub fn resources(&self, tree: &DocumentTree) -> Vec<String> {
        let mut seen = HashSet::new();
        tree.iter()
            .filter_map(|(_, node)| self.resource_path(&node.kind))
            .filter(|source| seen.insert(*source))
            .map(str::to_string)
            .collect()
    }

    /// Collect resource paths and assign collision-free destinations.
    pub fn scan(&self, tree: &DocumentTree) -> GraphicsPlan {
        self.scan_avoiding(tree, &HashSet::new())
    }

    /// Like [`scan`](Self::scan), but never hands out a destination in `reserved`.
    ///
    /// `reserved` holds output-relative paths, `/`-separated, already taken by
    /// other copies.
    #[instrument(level = "debug", skip_all, fields(reserved = reserved.len()))]
    pub fn scan_avoiding(&self, tree: &DocumentTree, reserved: &HashSet<String>) -> GraphicsPlan {
        let mut plan = GraphicsPlan::default();
        let mut used = reserved.clone();

        for source in self.resources(tree) {
            let destination = self.free_destination(&source, &used);
            used.insert(destination.clone());
            plan.push(source, destination);
        }

        debug!("scan: {} distinct resources", plan.len());
        plan
    }

    /// Clone `tree` and point every resource reference at its planned destination.
    pub fn relocate(&self, tree: &DocumentTree, plan: &GraphicsPlan) -> DocumentTree {
        let mut relocated = tree.clone();
        let targets: Vec<_> = tree
            .iter()
            .filter(|(_, node)| self.resource_path(&node.kind).is_some())
            .map(|(idx, _)| idx)
            .collect();

        for idx in targets {
            let Some(args) = relocated.get_node_mut(idx).and_then(|n| n.kind.args_mut()) else {
                continue;
            };
            if let Some(arg) = args.iter_mut().rev().find(|a| a.delimiter == Delimiter::Brace) {
                if let Some(destination) = plan.destination(&arg.value) {
                    arg.value = destination.to_string();
                }
            }
        }
        relocated
    }

    /// Scan and relocate in one step.
    pub fn plan(&self, tree: &DocumentTree) -> (DocumentTree, GraphicsPlan) {
        self.plan_avoiding(tree, &HashSet::new())
    }

    /// Scan around `reserved` destinations, then relocate.
    pub fn plan_avoiding(
        &self,
        tree: &DocumentTree,
        reserved: &HashSet<String>,
    ) -> (DocumentTree, GraphicsPlan) {
        let plan = self.scan_avoiding(tree, reserved);
        (self.relocate(tree, &plan), plan)
    }

    fn resource_path<'k>(&self, kind: &'k NodeKind) -> Option<&'k str> {
        match kind {
            NodeKind::Macro { name, args, .. } if self.macros.iter().any(|m| m == name) => args
                .iter()
                .rev()
                .find(|a| a.delimiter == Delimiter::Brace)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    fn free_destination(&self, source: &str, used: &HashSet<String>) -> String {
        let path = Path::new(source);
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string());
        let stem = Path::new(&base)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| base.clone());
        let extension = Path::new(&base)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut candidate = self.in_figure_folder(&base);
        let mut suffix = 1;
        while used.contains(&candidate) {
            candidate = self.in_figure_folder(&format!("{stem}{suffix}{extension}"));
            suffix += 1;
        }
        candidate
    }

    fn in_figure_folder(&self, file_name: &str) -> String {
        let folder = normalize_path_separator(&self.figure_folder);
        let folder = folder.trim_end_matches('/');
        if folder.is_empty() {
            file_name.to_string()
        } else {
            format!("{folder}/{file_name}")
        }
    }
}
