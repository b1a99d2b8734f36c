//! Declarative split rules and the engine that applies them.

use std::fmt;
use std::path::PathBuf;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::arena::{DocumentTree, NodeType, TreeNode};
use crate::domain::condition::Condition;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::placeholder::Placeholders;
use crate::domain::structure::StructuralMacroTable;

/// Node kinds a rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    Macro,
    Environment,
    Text,
}

impl RuleTarget {
    pub fn node_type(&self) -> NodeType {
        match self {
            RuleTarget::Macro => NodeType::Macro,
            RuleTarget::Environment => NodeType::Environment,
            RuleTarget::Text => NodeType::Text,
        }
    }
}

impl fmt::Display for RuleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_type().as_str())
    }
}

/// A split rule as declared in the `[[structure]]` configuration tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "type")]
    pub target: RuleTarget,
    pub name: String,
    /// Output file template, may contain placeholders
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Rule {
    pub fn new(target: RuleTarget, name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
            file_name: file_name.into(),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn applies_to(&self, node: &TreeNode) -> bool {
        node.node_type() == self.target.node_type() && node.name() == self.name
    }
}

/// Ordered rules plus the output location they render into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub output_path: PathBuf,
    pub main_file: String,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(output_path: impl Into<PathBuf>, main_file: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            output_path: output_path.into(),
            main_file: main_file.into(),
            rules,
        }
    }
}

/// Decides which nodes are split into their own output file.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rule_set: RuleSet,
    placeholders: Placeholders,
}

impl RuleEngine {
    pub fn new(rule_set: RuleSet) -> Self {
        Self::with_structure(rule_set, StructuralMacroTable::default())
    }

    pub fn with_structure(rule_set: RuleSet, structure: StructuralMacroTable) -> Self {
        Self {
            rule_set,
            placeholders: Placeholders::new(structure),
        }
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// File name for node `idx`, or None to render it inline.
    ///
    /// The first rule matching the node's type and name whose condition holds
    /// (or that has none) wins.
    #[instrument(level = "trace", skip(self, tree))]
    pub fn decide(&self, tree: &DocumentTree, idx: Index) -> DomainResult<Option<String>> {
        let node = tree.get_node(idx).ok_or(DomainError::NodeNotFound(idx))?;

        for rule in self.rule_set.rules.iter().filter(|r| r.applies_to(node)) {
            if let Some(condition) = &rule.condition {
                let condition = self.placeholders.substitute(tree, idx, condition)?;
                if !Condition::parse(&condition)?.evaluate()? {
                    trace!("decide: condition '{}' rejected {}", condition, node.name());
                    continue;
                }
            }
            let file_name = self.placeholders.substitute(tree, idx, &rule.file_name)?;
            trace!("decide: {} {} -> {}", node.node_type(), node.name(), file_name);
            return Ok(Some(file_name));
        }
        Ok(None)
    }

    /// Resolve placeholders in `text` against node `idx`.
    pub fn substitute(&self, tree: &DocumentTree, idx: Index, text: &str) -> DomainResult<String> {
        self.placeholders.substitute(tree, idx, text)
    }
}
