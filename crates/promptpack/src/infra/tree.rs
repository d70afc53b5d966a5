//! Adapter for the external `tree` program.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

use crate::infra::process;

/// Renders a list of scope-relative file paths as an indented tree view.
pub trait TreeRenderer {
    /// `label` becomes the first line of the tree; `files` are relative to the scope root.
    fn render(&self, label: &str, files: &[PathBuf]) -> Result<String>;
}

/// Runs `tree --fromfile`, feeding the already-filtered file list on stdin.
#[derive(Debug, Clone)]
pub struct TreeCommand {
    program: PathBuf,
}

impl TreeCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `tree` on `PATH`.
    pub fn locate() -> Option<Self> {
        process::find_program("tree").map(Self::new)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl TreeRenderer for TreeCommand {
    fn render(&self, label: &str, files: &[PathBuf]) -> Result<String> {
        let program = self.program.display().to_string();
        let mut child = Command::new(&self.program)
            .args(["--fromfile", ".", "--noreport", "-a", "-n", "--charset", "UTF-8"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn tree command: {program}"))?;

        if let Some(mut stdin) = child.stdin.take() {
            for file in files {
                writeln!(stdin, "{}", slash_path(file))
                    .context("failed to write file list to tree")?;
            }
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("tree command did not exit cleanly: {program}"))?;
        if !output.status.success() {
            return Err(anyhow!(
                "tree command exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(relabel(&String::from_utf8_lossy(&output.stdout), label))
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Swap the `.` header `tree` prints for stdin input with the scope label.
fn relabel(output: &str, label: &str) -> String {
    let mut rendered = label.to_owned();
    for line in output.lines().skip(1) {
        rendered.push('\n');
        rendered.push_str(line);
    }
    rendered.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relabel_replaces_header_line() {
        let output = ".\n├── a.txt\n└── src\n    └── b.rs\n\n";
        assert_eq!(
            relabel(output, "project"),
            "project\n├── a.txt\n└── src\n    └── b.rs"
        );
    }

    #[test]
    fn slash_path_uses_forward_slashes() {
        let path: PathBuf = ["src", "nested", "lib.rs"].iter().collect();
        assert_eq!(slash_path(&path), "src/nested/lib.rs");
    }

    #[test]
    fn missing_program_is_an_error() {
        let tree = TreeCommand::new("/nonexistent/promptpack-tree");
        assert!(tree.render(".", &[PathBuf::from("a.txt")]).is_err());
    }
}
