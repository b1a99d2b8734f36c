//! Tree builder turning a token stream into a section-aware document tree.

use generational_arena::Index;
use regex::Regex;
use tracing::{debug, instrument};

use crate::domain::arena::{Argument, DocumentTree, NodeKind};
use crate::domain::structure::StructuralMacroTable;
use crate::domain::token::{RawArgument, Token};

/// Constructs a hierarchical [`DocumentTree`] from tokens.
///
/// Heading macros (see [`StructuralMacroTable`]) become the parent of
/// everything that follows them until a heading of the same or a shallower
/// level shows up. Environments nest their own bodies and are never crossed
/// by a heading.
pub struct TreeBuilder {
    structure: StructuralMacroTable,
    paragraph_break: Regex,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::with_structure(StructuralMacroTable::default())
    }

    pub fn with_structure(structure: StructuralMacroTable) -> Self {
        Self {
            structure,
            paragraph_break: Regex::new(r"\n{3,}").expect("valid paragraph break pattern"),
        }
    }

    /// Build a tree from the full token stream. Never fails: unbalanced
    /// headings are nested best-effort.
    #[instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
    pub fn build(&self, tokens: &[Token]) -> DocumentTree {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        self.build_into(&mut tree, root, tokens);
        debug!("build: {} nodes", tree.len());
        tree
    }

    /// Append `tokens` below `container`, which seeds the stack of open ancestors.
    fn build_into(&self, tree: &mut DocumentTree, container: Index, tokens: &[Token]) {
        let mut stack = vec![container];

        for token in tokens {
            let top = stack.last().copied().unwrap_or(container);

            match token {
                Token::Environment { name, args, body } => {
                    let env = tree.insert_node(
                        NodeKind::Environment {
                            name: name.clone(),
                            args: parse_arguments(args),
                        },
                        top,
                    );
                    self.build_into(tree, env, body);
                }
                Token::Macro {
                    name,
                    args,
                    post_space,
                } => {
                    let kind = NodeKind::Macro {
                        name: name.clone(),
                        args: parse_arguments(args),
                        post_space: post_space.clone(),
                    };
                    match self.structure.depth(name) {
                        Some(level) => {
                            while stack.len() > 1 {
                                let open = stack[stack.len() - 1];
                                if !self.closes(tree, open, level) {
                                    break;
                                }
                                stack.pop();
                            }
                            let parent = stack.last().copied().unwrap_or(container);
                            let heading = tree.insert_node(kind, parent);
                            stack.push(heading);
                        }
                        None => {
                            tree.insert_node(kind, top);
                        }
                    }
                }
                Token::Chars { text } => {
                    let text = self.paragraph_break.replace_all(text, "\n\n");
                    if !text.is_empty() {
                        tree.insert_node(NodeKind::Text(text.into_owned()), top);
                    }
                }
                Token::Group { body } => {
                    let text = flatten(body);
                    if !text.is_empty() {
                        tree.insert_node(NodeKind::Text(text), top);
                    }
                }
                Token::Comment { text } => {
                    tree.insert_node(NodeKind::Comment(text.clone()), top);
                }
            }
        }
    }

    /// Whether the open node `open` is closed by a heading at `level`.
    fn closes(&self, tree: &DocumentTree, open: Index, level: i32) -> bool {
        match tree.get_node(open).map(|n| &n.kind) {
            Some(NodeKind::Macro { name, .. }) if self.structure.is_structural(name) => {
                self.structure.closes(name, level)
            }
            Some(NodeKind::Environment { .. }) => false,
            _ => true,
        }
    }
}

/// Parse raw arguments into their stored form.
pub fn parse_arguments(raw: &[RawArgument]) -> Vec<Argument> {
    raw.iter()
        .map(|arg| match arg {
            RawArgument::Group { delimiter, body } => Argument {
                delimiter: (*delimiter).into(),
                value: flatten(body),
            },
            RawArgument::Macro { spelling } => Argument::macro_ref(spelling.clone()),
        })
        .collect()
}

/// Literal text plus the spelling of directly nested macros, trimmed.
/// Any other nested structure is dropped.
fn flatten(body: &[Token]) -> String {
    body.iter()
        .map(|token| match token {
            Token::Chars { text } => text.clone(),
            Token::Macro { .. } => token.verbatim(),
            _ => String::new(),
        })
        .collect::<String>()
        .trim()
        .to_string()
}
