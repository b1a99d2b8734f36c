//! Arena-backed document tree.
//!
//! Nodes own their children through the arena; the `parent` index is only a
//! back-reference used for ancestor and sibling queries.

use std::fmt;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Discriminant of a [`NodeKind`], used by rules and placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Root,
    Macro,
    Environment,
    Text,
    Comment,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Macro => "macro",
            NodeType::Environment => "environment",
            NodeType::Text => "text",
            NodeType::Comment => "comment",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an argument was delimited in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// `{value}`
    Brace,
    /// `[value]`
    Bracket,
    /// Bare macro reference such as the `\foo` in `\newcommand\foo{...}`
    Macro,
}

/// A parsed macro or environment argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub delimiter: Delimiter,
    pub value: String,
}

impl Argument {
    pub fn brace(value: impl Into<String>) -> Self {
        Self {
            delimiter: Delimiter::Brace,
            value: value.into(),
        }
    }

    pub fn bracket(value: impl Into<String>) -> Self {
        Self {
            delimiter: Delimiter::Bracket,
            value: value.into(),
        }
    }

    pub fn macro_ref(spelling: impl Into<String>) -> Self {
        Self {
            delimiter: Delimiter::Macro,
            value: spelling.into(),
        }
    }

    /// Source spelling of the argument including its delimiters.
    pub fn render(&self) -> String {
        match self.delimiter {
            Delimiter::Brace => format!("{{{}}}", self.value),
            Delimiter::Bracket => format!("[{}]", self.value),
            Delimiter::Macro => self.value.clone(),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.delimiter {
            Delimiter::Brace => "brace",
            Delimiter::Bracket => "bracket",
            Delimiter::Macro => "macro",
        };
        write!(f, "{}={}", kind, self.value)
    }
}

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Macro {
        name: String,
        args: Vec<Argument>,
        /// Whitespace that followed the control word, rendered when there are no arguments
        post_space: String,
    },
    Environment {
        name: String,
        args: Vec<Argument>,
    },
    Text(String),
    Comment(String),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Root => NodeType::Root,
            NodeKind::Macro { .. } => NodeType::Macro,
            NodeKind::Environment { .. } => NodeType::Environment,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }

    /// Name used for rule matching. Nodes without a name of their own are
    /// named after their type (`root`, `text`, `comment`).
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Macro { name, .. } | NodeKind::Environment { name, .. } => name,
            other => other.node_type().as_str(),
        }
    }

    pub fn args(&self) -> &[Argument] {
        match self {
            NodeKind::Macro { args, .. } | NodeKind::Environment { args, .. } => args,
            _ => &[],
        }
    }

    pub fn args_mut(&mut self) -> Option<&mut Vec<Argument>> {
        match self {
            NodeKind::Macro { args, .. } | NodeKind::Environment { args, .. } => Some(args),
            _ => None,
        }
    }

    /// Literal content of text and comment nodes, empty otherwise.
    pub fn text(&self) -> &str {
        match self {
            NodeKind::Text(text) | NodeKind::Comment(text) => text,
            _ => "",
        }
    }
}

/// Tree node in the arena-based document hierarchy.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub kind: NodeKind,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in document order
    pub children: Vec<Index>,
    file_name: Option<String>,
}

impl TreeNode {
    fn new(kind: NodeKind, parent: Option<Index>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            file_name: None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    /// Value of the n-th argument, empty when absent.
    pub fn arg(&self, n: usize) -> &str {
        self.kind.args().get(n).map(|a| a.value.as_str()).unwrap_or("")
    }

    /// Output file assigned during serialization, if the node was split off.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn is_split(&self) -> bool {
        self.file_name.is_some()
    }

    fn same_kind(&self, other: &TreeNode) -> bool {
        self.node_type() == other.node_type() && self.name() == other.name()
    }
}

/// Arena-based document tree with a single root node.
///
/// `Clone` produces a structurally independent copy: indices stay valid in
/// both trees, mutations of one never show up in the other.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    arena: Arena<TreeNode>,
    root: Index,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode::new(NodeKind::Root, None));
        Self { arena, root }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    /// Append a new node as the last child of `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, kind: NodeKind, parent: Index) -> Index {
        let node_idx = self.arena.insert(TreeNode::new(kind, Some(parent)));
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }
        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn children(&self, idx: Index) -> &[Index] {
        self.get_node(idx)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.get_node(idx).and_then(|n| n.parent)
    }

    /// Record the output file of a split node. The first assignment wins.
    pub fn assign_file_name(&mut self, idx: Index, file_name: &str) -> Option<&str> {
        let node = self.arena.get_mut(idx)?;
        if node.file_name.is_none() {
            node.file_name = Some(file_name.to_string());
        }
        node.file_name.as_deref()
    }

    /// Pre-order, left-to-right traversal starting at the root.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Strict ancestors of `idx`, nearest first, ending with the root.
    pub fn ancestors(&self, idx: Index) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(idx),
        }
    }

    /// Nearest strictly-enclosing ancestor with the given type and name.
    pub fn find_closest(&self, idx: Index, node_type: NodeType, name: &str) -> Option<Index> {
        self.ancestors(idx).find(|&a| {
            self.get_node(a)
                .is_some_and(|n| n.node_type() == node_type && n.name() == name)
        })
    }

    /// 1-based ordinal of `idx` among its parent's children of the same type and name.
    pub fn sibling_index(&self, idx: Index) -> Option<usize> {
        let node = self.get_node(idx)?;
        let parent = self.get_node(node.parent?)?;
        parent
            .children
            .iter()
            .filter(|&&c| self.get_node(c).is_some_and(|s| s.same_kind(node)))
            .position(|&c| c == idx)
            .map(|p| p + 1)
    }

    /// Ordinal of the nearest node (self included) named `scope`, walking
    /// up to the root. None once the root is reached.
    pub fn scoped_index(&self, idx: Index, scope: &str) -> Option<usize> {
        let mut current = idx;
        loop {
            let node = self.get_node(current)?;
            if node.is_root() {
                return None;
            }
            if node.name() == scope {
                return self.sibling_index(current);
            }
            current = node.parent?;
        }
    }

    /// Number of strict ancestors sharing this node's type and name.
    pub fn nesting_depth(&self, idx: Index) -> usize {
        let Some(node) = self.get_node(idx) else {
            return 0;
        };
        self.ancestors(idx)
            .filter(|&a| self.get_node(a).is_some_and(|n| n.same_kind(node)))
            .count()
    }

    /// Number of non-root ancestors.
    pub fn level(&self, idx: Index) -> usize {
        self.ancestors(idx)
            .filter(|&a| self.get_node(a).is_some_and(|n| !n.is_root()))
            .count()
    }

    /// Estimated rendered line count, ignoring children already split off.
    pub fn length(&self, idx: Index) -> usize {
        let Some(node) = self.get_node(idx) else {
            return 0;
        };
        let base = match node.node_type() {
            NodeType::Environment => 2,
            NodeType::Macro => 1,
            _ => 0,
        };
        let text = node.kind.text();
        let text_lines = if text.is_empty() {
            0
        } else {
            text.matches('\n').count().max(1)
        };
        base + text_lines
            + node
                .children
                .iter()
                .filter(|&&c| self.get_node(c).is_some_and(|n| !n.is_split()))
                .map(|&c| self.length(c))
                .sum::<usize>()
    }

    /// Longest text line in the subtree, ignoring children already split off.
    pub fn width(&self, idx: Index) -> usize {
        let Some(node) = self.get_node(idx) else {
            return 0;
        };
        let own = match &node.kind {
            NodeKind::Text(text) => text.lines().map(|l| l.chars().count()).max().unwrap_or(0),
            _ => 0,
        };
        node.children
            .iter()
            .filter(|&&c| self.get_node(c).is_some_and(|n| !n.is_split()))
            .map(|&c| self.width(c))
            .fold(own, usize::max)
    }
}

pub struct TreeIterator<'a> {
    tree: &'a DocumentTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a DocumentTree, start: Index) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct Ancestors<'a> {
    tree: &'a DocumentTree,
    next: Option<Index>,
}

impl Iterator for Ancestors<'_> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
