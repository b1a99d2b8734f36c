//! Debug views of a document tree: terminal tree and Graphviz DOT.

use std::fmt::Write as _;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{DocumentTree, NodeKind, NodeType};

const DOCUMENT_ENVIRONMENT: &str = "document";
const TEXT_PREVIEW_CHARS: usize = 30;

pub trait TreeExport {
    /// Node summary: one line per node with its estimated line count.
    fn to_tree_string(&self) -> Tree<String>;

    /// Graphviz rendering. With `hide_before_document` only the subtree of
    /// the first `document` environment is drawn.
    fn to_dot(&self, hide_before_document: bool) -> String;
}

impl TreeExport for DocumentTree {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self) -> Tree<String> {
        fn build(tree: &DocumentTree, idx: Index) -> Tree<String> {
            let leaves: Vec<_> = tree.children(idx).iter().map(|&c| build(tree, c)).collect();
            Tree::new(summary_label(tree, idx)).with_leaves(leaves)
        }
        build(self, self.root())
    }

    fn to_dot(&self, hide_before_document: bool) -> String {
        let mut dot = DotWriter::default();
        dot.line("digraph AST {");
        dot.line("  node [fontname=Helvetica];");

        let start = if hide_before_document {
            self.iter()
                .find(|(_, n)| {
                    n.node_type() == NodeType::Environment && n.name() == DOCUMENT_ENVIRONMENT
                })
                .map(|(idx, _)| idx)
        } else {
            Some(self.root())
        };
        if let Some(start) = start {
            dot.node(self, start);
        }

        dot.line("}");
        dot.out
    }
}

fn summary_label(tree: &DocumentTree, idx: Index) -> String {
    let Some(node) = tree.get_node(idx) else {
        return String::new();
    };
    let lines = tree.length(idx);
    let mut label = match &node.kind {
        NodeKind::Root => "root".to_string(),
        NodeKind::Macro { name, .. } if node.arg(0).is_empty() => format!("\\{name}"),
        NodeKind::Macro { name, .. } => format!("\\{name}{{{}}}", node.arg(0)),
        NodeKind::Environment { name, .. } => format!("{{{name}}}"),
        NodeKind::Text(text) => format!("text \"{}\"", preview(text)),
        NodeKind::Comment(text) => format!("% {}", preview(text)),
    };
    let _ = write!(label, " ({lines} lines)");
    if let Some(file_name) = node.file_name() {
        let _ = write!(label, " -> {file_name}");
    }
    label
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > TEXT_PREVIEW_CHARS {
        let cut: String = flat.chars().take(TEXT_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn fill_color(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Macro => "lightblue",
        NodeType::Environment => "lightgreen",
        NodeType::Text => "lightgray",
        NodeType::Root => "orange",
        NodeType::Comment => "lightyellow",
    }
}

/// Emits nodes with ids assigned in pre-order.
#[derive(Default)]
struct DotWriter {
    out: String,
    next_id: usize,
}

impl DotWriter {
    fn line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn alloc(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn node(&mut self, tree: &DocumentTree, idx: Index) -> usize {
        let id = self.alloc();
        let Some(node) = tree.get_node(idx) else {
            return id;
        };

        let ordinal = tree.sibling_index(idx).unwrap_or(0);
        let label = format!("{}. {}", ordinal, node.name());
        self.line(&format!(
            "  {id} [label=\"{}\", style=filled, fillcolor=\"{}\"];",
            escape(&label),
            fill_color(node.node_type())
        ));

        let args = node.kind.args();
        if !args.is_empty() {
            let args_id = self.alloc();
            let text = args
                .iter()
                .map(|a| escape(&a.to_string()))
                .collect::<Vec<_>>()
                .join("\\n");
            self.line(&format!("  {args_id} [label=\"{text}\", shape=box, style=dashed];"));
            self.line(&format!("  {id} -> {args_id};"));
            self.line(&format!("  {{ rank=same; {id}; {args_id}; }}"));
        }

        for &child in &node.children {
            let child_id = self.node(tree, child);
            self.line(&format!("  {id} -> {child_id};"));
        }
        id
    }
}
