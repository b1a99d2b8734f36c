//! Sectioning depths of heading-like macros.

use std::collections::HashMap;

/// Heading macros and their nesting depth; lower is shallower.
pub const STRUCTURAL_MACROS: [(&str, i32); 7] = [
    ("part", -1),
    ("chapter", 0),
    ("section", 1),
    ("subsection", 2),
    ("subsubsection", 3),
    ("paragraph", 4),
    ("subparagraph", 5),
];

/// Lookup table for structural macro depths.
///
/// Names missing from the table have no depth: they never open or close a
/// sectioning level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralMacroTable {
    levels: HashMap<String, i32>,
}

impl Default for StructuralMacroTable {
    fn default() -> Self {
        Self {
            levels: STRUCTURAL_MACROS
                .iter()
                .map(|&(name, level)| (name.to_string(), level))
                .collect(),
        }
    }
}

impl StructuralMacroTable {
    pub fn depth(&self, name: &str) -> Option<i32> {
        self.levels.get(name).copied()
    }

    pub fn is_structural(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    /// True when an open heading `open` must be closed by a new heading at `level`.
    pub fn closes(&self, open: &str, level: i32) -> bool {
        self.depth(open).is_some_and(|d| d >= level)
    }
}
