//! Path helpers shared by the asset scan and configuration loading.

use std::path::{Component, Path, PathBuf};

pub trait PathExt {
    /// Resolve `.` and `..` lexically, without touching the filesystem.
    fn lexical_normalize(&self) -> PathBuf;

    /// True when `self` lies at or below `root` after lexical normalization.
    fn is_within(&self, root: &Path) -> bool;

    /// Path of `self` relative to `base`, if one can be expressed.
    fn relative_to(&self, base: &Path) -> Option<PathBuf>;

    /// Lowercase extension including the leading dot, empty when absent.
    fn dotted_extension(&self) -> String;
}

impl PathExt for Path {
    fn lexical_normalize(&self) -> PathBuf {
        let mut out = PathBuf::new();
        for component in self.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                        && out.pop();
                    if !popped {
                        out.push("..");
                    }
                }
                other => out.push(other.as_os_str()),
            }
        }
        out
    }

    fn is_within(&self, root: &Path) -> bool {
        self.lexical_normalize().starts_with(root.lexical_normalize())
    }

    fn relative_to(&self, base: &Path) -> Option<PathBuf> {
        pathdiff::diff_paths(self.lexical_normalize(), base.lexical_normalize())
    }

    fn dotted_extension(&self) -> String {
        self.extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }
}

/// Forward slashes regardless of platform, as LaTeX expects.
pub fn normalize_path_separator(s: &str) -> String {
    s.replace('\\', "/")
}
