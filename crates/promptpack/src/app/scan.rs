//! File enumeration for a scope, from the filesystem or from git.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;

use crate::app::patterns::PatternSet;
use crate::domain::errors::ConfigError;
use crate::domain::model::{FileRecord, Scope};
use crate::infra::git::TrackedFileLister;
use crate::infra::tree::TreeRenderer;

/// How candidate files are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Walk the directory tree.
    Filesystem,
    /// Only files tracked by git.
    Git,
}

/// Include/exclude rules applied to scope-relative paths.
///
/// Dot-prefixed entries are kept unless `skip_hidden` is set.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub include: PatternSet,
    pub exclude: PatternSet,
    pub skip_hidden: bool,
}

impl FileFilter {
    /// Whether `relative` (file or directory) is cut out together with everything below it.
    pub fn prunes(&self, relative: &Path) -> bool {
        (self.skip_hidden && is_hidden(relative)) || self.exclude.excluded(relative)
    }

    /// Whether the file at `relative` belongs in the bundle.
    pub fn accepts_file(&self, relative: &Path) -> bool {
        self.include.includes_file(relative) && !self.prunes(relative)
    }
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Result of enumerating a scope.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub scope: Scope,
    pub files: Vec<FileRecord>,
    pub tree: String,
}

/// Resolve the user's scope path against `working_dir` into a canonical directory.
pub fn resolve_scope(path: Option<&Path>, working_dir: &Path) -> Result<Scope, ConfigError> {
    let requested = path.unwrap_or_else(|| Path::new("."));
    let root = working_dir
        .join(requested)
        .canonicalize()
        .map_err(|_| ConfigError::ScopeNotDirectory(requested.to_path_buf()))?;
    if !root.is_dir() {
        return Err(ConfigError::ScopeNotDirectory(requested.to_path_buf()));
    }
    Ok(Scope {
        label: requested.display().to_string(),
        root,
    })
}

/// Enumerates files and renders the tree view through injected collaborators.
pub struct Scanner<'a> {
    tree: &'a dyn TreeRenderer,
    tracked: &'a dyn TrackedFileLister,
}

impl<'a> Scanner<'a> {
    pub fn new(tree: &'a dyn TreeRenderer, tracked: &'a dyn TrackedFileLister) -> Self {
        Self { tree, tracked }
    }

    pub fn scan(&self, scope: &Scope, filter: &FileFilter, mode: ScanMode) -> Result<ScanResult> {
        let relative = match mode {
            ScanMode::Filesystem => walk_files(&scope.root, filter),
            ScanMode::Git => self.tracked_files(&scope.root, filter)?,
        };
        tracing::info!(files = relative.len(), ?mode, root = %scope.root.display(), "enumerated scope");

        let tree = self
            .tree
            .render(&scope.label, &relative)
            .context("failed to render file tree")?;

        let files = relative
            .into_iter()
            .map(|relative| FileRecord {
                display_path: scope.display_path(&relative),
                relative,
            })
            .collect();

        Ok(ScanResult {
            scope: scope.clone(),
            files,
            tree,
        })
    }

    fn tracked_files(&self, root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = self
            .tracked
            .list_tracked(root)
            .context("failed to list tracked files")?
            .into_iter()
            .filter(|relative| filter.accepts_file(relative))
            .collect();
        files.sort();
        files.dedup();
        Ok(files)
    }
}

/// Walk `root`, pruning excluded directories as they are reached.
///
/// Directories are never returned; one that ends up with no accepted files simply does not
/// appear in the rendered tree.
pub fn walk_files(root: &Path, filter: &FileFilter) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    builder.filter_entry({
        let root = root.to_path_buf();
        let filter = filter.clone();
        move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            !filter.prunes(rel)
        }
    });

    let mut files = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                if entry.depth() == 0 || entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    continue;
                }
                let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
                if filter.accepts_file(rel) {
                    files.push(rel.to_path_buf());
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "scanner error");
            }
        }
    }
    files.sort();
    files
}
