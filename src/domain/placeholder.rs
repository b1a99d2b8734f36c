//! Placeholder substitution for file-name templates and conditions.
//!
//! Two independent syntaxes, resolved in this order:
//!
//! - `[key]`: `[name:<heading>]` yields the normalized title of the nearest
//!   enclosing heading; any other key yields a 1-based sibling ordinal of the
//!   nearest node (self included) named `key`.
//! - `<attr>`: one of the attributes in [`NodeAttribute`].
//!
//! Unresolvable placeholders are left in the text unchanged.

use generational_arena::Index;
use regex::{Captures, Regex};

use crate::domain::arena::{DocumentTree, NodeType};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::structure::StructuralMacroTable;

const NAME_PREFIX: &str = "name:";

/// Node attributes available to `<attr>` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAttribute {
    Name,
    Type,
    /// Number of enclosing ancestors with the same type and name
    Depth,
    /// Number of non-root ancestors
    Level,
    Index,
    Length,
    Width,
    /// Value of the first argument
    Arg,
    Children,
}

impl NodeAttribute {
    pub fn from_name(name: &str) -> Option<Self> {
        let attr = match name {
            "name" => NodeAttribute::Name,
            "type" => NodeAttribute::Type,
            "depth" => NodeAttribute::Depth,
            "level" => NodeAttribute::Level,
            "index" => NodeAttribute::Index,
            "length" => NodeAttribute::Length,
            "width" => NodeAttribute::Width,
            "arg" => NodeAttribute::Arg,
            "children" => NodeAttribute::Children,
            _ => return None,
        };
        Some(attr)
    }

    pub fn resolve(self, tree: &DocumentTree, idx: Index) -> Option<String> {
        let node = tree.get_node(idx)?;
        let value = match self {
            NodeAttribute::Name => node.name().to_string(),
            NodeAttribute::Type => node.node_type().to_string(),
            NodeAttribute::Depth => tree.nesting_depth(idx).to_string(),
            NodeAttribute::Level => tree.level(idx).to_string(),
            NodeAttribute::Index => tree.sibling_index(idx)?.to_string(),
            NodeAttribute::Length => tree.length(idx).to_string(),
            NodeAttribute::Width => tree.width(idx).to_string(),
            NodeAttribute::Arg => node.arg(0).to_string(),
            NodeAttribute::Children => node.children.len().to_string(),
        };
        Some(value)
    }
}

/// Compiled placeholder patterns.
#[derive(Debug, Clone)]
pub struct Placeholders {
    structure: StructuralMacroTable,
    bracket: Regex,
    angle: Regex,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::new(StructuralMacroTable::default())
    }
}

impl Placeholders {
    pub fn new(structure: StructuralMacroTable) -> Self {
        Self {
            structure,
            bracket: Regex::new(r"\[([\w:-]+)\]").expect("valid bracket placeholder pattern"),
            angle: Regex::new(r"<(\w+)>").expect("valid angle placeholder pattern"),
        }
    }

    /// Resolve every placeholder in `text` against node `idx`.
    pub fn substitute(&self, tree: &DocumentTree, idx: Index, text: &str) -> DomainResult<String> {
        let text = replace_all(&self.bracket, text, |caps| {
            self.resolve_bracket(tree, idx, &caps[1])
                .map(|v| v.unwrap_or_else(|| caps[0].to_string()))
        })?;
        replace_all(&self.angle, &text, |caps| {
            Ok(NodeAttribute::from_name(&caps[1])
                .and_then(|attr| attr.resolve(tree, idx))
                .unwrap_or_else(|| caps[0].to_string()))
        })
    }

    fn resolve_bracket(
        &self,
        tree: &DocumentTree,
        idx: Index,
        key: &str,
    ) -> DomainResult<Option<String>> {
        if let Some(heading) = key.strip_prefix(NAME_PREFIX) {
            if !self.structure.is_structural(heading) {
                return Err(DomainError::UnknownStructuralMacro(heading.to_string()));
            }
            return Ok(tree
                .find_closest(idx, NodeType::Macro, heading)
                .and_then(|h| tree.get_node(h))
                .map(|h| normalize_name(h.arg(0))));
        }
        Ok(tree.scoped_index(idx, key).map(|i| i.to_string()))
    }
}

fn replace_all(
    pattern: &Regex,
    text: &str,
    mut replacement: impl FnMut(&Captures<'_>) -> DomainResult<String>,
) -> DomainResult<String> {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        result.push_str(&text[last..whole.start()]);
        result.push_str(&replacement(&caps)?);
        last = whole.end();
    }
    result.push_str(&text[last..]);
    Ok(result)
}

/// Lowercase, replace runs outside `[a-z0-9-_]` by a single underscore and
/// trim underscores from both ends.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_collapses_and_trims() {
        assert_eq!(normalize_name("  Related Work: An Overview! "), "related_work_an_overview");
        assert_eq!(normalize_name("Über__Größe"), "ber_gr_e");
        assert_eq!(normalize_name("state-of_the-art"), "state-of_the-art");
        assert_eq!(normalize_name("!!!"), "");
    }
}
