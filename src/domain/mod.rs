//! Domain layer: document tree, split rules and rendering
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod condition;
pub mod error;
pub mod export;
pub mod placeholder;
pub mod relocate;
pub mod rules;
pub mod serializer;
pub mod structure;
pub mod token;

pub use arena::{Argument, Delimiter, DocumentTree, NodeKind, NodeType, TreeNode};
pub use builder::TreeBuilder;
pub use condition::Condition;
pub use error::{DomainError, DomainResult};
pub use export::TreeExport;
pub use placeholder::{normalize_name, NodeAttribute, Placeholders};
pub use relocate::{AssetMove, AssetRelocator, GraphicsPlan};
pub use rules::{Rule, RuleEngine, RuleSet, RuleTarget};
pub use serializer::{Artifact, Serializer};
pub use structure::StructuralMacroTable;
pub use token::{RawArgument, Token};
