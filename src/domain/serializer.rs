//! Tree to multi-file LaTeX serializer.

use std::path::PathBuf;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::{Argument, DocumentTree, NodeKind};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::rules::RuleEngine;

/// One output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

/// Inclusion directive emitted where a split node used to be.
pub fn include_directive(file_name: &str) -> String {
    format!("\\input{{{file_name}}}\n")
}

/// Renders a document tree into one or more artifacts, consulting the
/// [`RuleEngine`] at every node.
pub struct Serializer<'a> {
    engine: &'a RuleEngine,
}

impl<'a> Serializer<'a> {
    pub fn new(engine: &'a RuleEngine) -> Self {
        Self { engine }
    }

    /// Render the whole tree starting at `root`.
    ///
    /// Split files come first, each after the files split out of it; the
    /// main file is last. Decisions are stored on the nodes, so rendering the
    /// same tree again yields the same artifacts.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn render(&self, tree: &mut DocumentTree, root: Index) -> DomainResult<Vec<Artifact>> {
        let node = tree.get_node(root).ok_or(DomainError::NodeNotFound(root))?;
        if !node.is_root() {
            return Err(DomainError::NotRoot(node.node_type()));
        }

        let mut artifacts = Vec::new();
        let mut main = String::new();
        for child in tree.children(root).to_vec() {
            main.push_str(&self.render_node(tree, child, &mut artifacts)?);
        }

        let rule_set = self.engine.rule_set();
        artifacts.push(Artifact {
            path: rule_set.output_path.join(&rule_set.main_file),
            content: main,
        });
        debug!("render: {} artifacts", artifacts.len());
        Ok(artifacts)
    }

    fn render_node(
        &self,
        tree: &mut DocumentTree,
        idx: Index,
        artifacts: &mut Vec<Artifact>,
    ) -> DomainResult<String> {
        let assigned = match tree.get_node(idx).and_then(|n| n.file_name()) {
            Some(name) => Some(name.to_string()),
            None => {
                let decision = self.engine.decide(tree, idx)?;
                if let Some(name) = &decision {
                    tree.assign_file_name(idx, name);
                }
                decision
            }
        };

        match assigned {
            Some(file_name) => {
                let content = self.render_inline(tree, idx, artifacts)?;
                artifacts.push(Artifact {
                    path: self.engine.rule_set().output_path.join(&file_name),
                    content,
                });
                Ok(include_directive(&file_name))
            }
            None => self.render_inline(tree, idx, artifacts),
        }
    }

    fn render_inline(
        &self,
        tree: &mut DocumentTree,
        idx: Index,
        artifacts: &mut Vec<Artifact>,
    ) -> DomainResult<String> {
        let node = tree.get_node(idx).ok_or(DomainError::NodeNotFound(idx))?;
        let kind = node.kind.clone();
        let children = node.children.clone();

        let mut out = String::new();
        match &kind {
            NodeKind::Environment { name, args } => {
                out.push_str(&format!("\\begin{{{name}}}"));
                push_args(&mut out, args);
                self.render_children(tree, &children, artifacts, &mut out)?;
                out.push_str(&format!("\\end{{{name}}}"));
            }
            NodeKind::Macro {
                name,
                args,
                post_space,
            } => {
                out.push('\\');
                out.push_str(name);
                if args.is_empty() {
                    out.push_str(post_space);
                } else {
                    push_args(&mut out, args);
                }
                self.render_children(tree, &children, artifacts, &mut out)?;
            }
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) => {
                out.push('%');
                out.push_str(text);
            }
            NodeKind::Root => self.render_children(tree, &children, artifacts, &mut out)?,
        }
        Ok(out)
    }

    fn render_children(
        &self,
        tree: &mut DocumentTree,
        children: &[Index],
        artifacts: &mut Vec<Artifact>,
        out: &mut String,
    ) -> DomainResult<()> {
        for &child in children {
            out.push_str(&self.render_node(tree, child, artifacts)?);
        }
        Ok(())
    }
}

fn push_args(out: &mut String, args: &[Argument]) {
    for arg in args {
        out.push_str(&arg.render());
    }
}
