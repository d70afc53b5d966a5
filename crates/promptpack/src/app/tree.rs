//! Tree views of the enumerated file list.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::infra::config::TreeRendererKind;
use crate::infra::tree::{TreeCommand, TreeRenderer};

/// In-process renderer producing the same connector style as `tree`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiTree;

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
}

impl Node {
    fn insert(&mut self, path: &std::path::Path) {
        let mut node = self;
        for component in path.components() {
            let name = component.as_os_str().to_string_lossy().into_owned();
            node = node.children.entry(name).or_default();
        }
    }
}

impl TreeRenderer for AsciiTree {
    fn render(&self, label: &str, files: &[PathBuf]) -> Result<String> {
        let mut root = Node::default();
        for file in files {
            root.insert(file);
        }

        let mut lines = vec![label.to_owned()];
        render_children(&root, "", &mut lines);
        Ok(lines.join("\n"))
    }
}

fn render_children(node: &Node, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (index, (name, child)) in node.children.iter().enumerate() {
        let last = index + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{name}"));
        if !child.children.is_empty() {
            let indent = if last { "    " } else { "│   " };
            render_children(child, &format!("{prefix}{indent}"), lines);
        }
    }
}

/// Prefers the external `tree` program and falls back to [`AsciiTree`] when it fails.
#[derive(Debug, Clone)]
pub struct AutoTree {
    external: Option<TreeCommand>,
}

impl AutoTree {
    pub fn new(external: Option<TreeCommand>) -> Self {
        Self { external }
    }
}

impl TreeRenderer for AutoTree {
    fn render(&self, label: &str, files: &[PathBuf]) -> Result<String> {
        if let Some(external) = &self.external {
            match external.render(label, files) {
                Ok(tree) => return Ok(tree),
                Err(err) => {
                    tracing::warn!(
                        program = %external.program().display(),
                        error = %err,
                        "tree program failed; using builtin renderer"
                    );
                }
            }
        }
        AsciiTree.render(label, files)
    }
}

/// Build the renderer selected in configuration.
pub fn renderer_for(kind: TreeRendererKind) -> Result<Box<dyn TreeRenderer>> {
    Ok(match kind {
        TreeRendererKind::Auto => Box::new(AutoTree::new(TreeCommand::locate())),
        TreeRendererKind::Builtin => Box::new(AsciiTree),
        TreeRendererKind::External => Box::new(
            TreeCommand::locate().ok_or_else(|| anyhow!("tree program not found on PATH"))?,
        ),
    })
}
