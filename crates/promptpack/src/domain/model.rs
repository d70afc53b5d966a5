//! Domain models for scopes, file records, and bundles.

use std::path::{Path, PathBuf};

/// Directory under which files are eligible for the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Root as the user wrote it, used for display.
    pub label: String,
    /// Canonical absolute root used for every containment check.
    pub root: PathBuf,
}

impl Scope {
    /// Display form of a path relative to the scope root, e.g. `src/lib.rs` for scope `src`.
    pub fn display_path(&self, relative: &Path) -> String {
        Path::new(&self.label).join(relative).display().to_string()
    }
}

/// A candidate file produced by enumeration. Existence is only checked when it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub relative: PathBuf,
    pub display_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub display_path: String,
    pub contents: String,
}

/// The finished prompt: a tree view plus the concatenated file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub pretext: String,
    pub tree: String,
    pub entries: Vec<BundleEntry>,
}

impl Bundle {
    /// Render the bundle into the text that is copied and saved.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.pretext);
        out.push_str("\n\nFile Tree:\n");
        out.push_str(&self.tree);
        out.push_str("\n\nConcatenated Files:\n");
        for entry in &self.entries {
            out.push_str("--- File: ");
            out.push_str(&entry.display_path);
            out.push_str(" ---\n");
            out.push_str(&entry.contents);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_path_joins_scope_label() {
        let scope = Scope {
            label: "src".into(),
            root: PathBuf::from("/repo/src"),
        };
        assert_eq!(scope.display_path(Path::new("a.txt")), "src/a.txt");
    }

    #[test]
    fn render_uses_fixed_layout() {
        let bundle = Bundle {
            pretext: "Context follows.".into(),
            tree: ".\n└── a.txt".into(),
            entries: vec![BundleEntry {
                display_path: "./a.txt".into(),
                contents: "alpha".into(),
            }],
        };
        assert_eq!(
            bundle.render(),
            "Context follows.\n\nFile Tree:\n.\n└── a.txt\n\nConcatenated Files:\n--- File: ./a.txt ---\nalpha\n"
        );
    }
}
