//! One run, from parsed request to emitted bundle.

use std::path::PathBuf;

use anyhow::Result;

use crate::app::bundle::build_bundle;
use crate::app::export::{ExportResult, Exporter};
use crate::app::ignore_files::load_exclude_patterns;
use crate::app::patterns::PatternSet;
use crate::app::scan::{FileFilter, ScanMode, Scanner, resolve_scope};
use crate::app::tree::renderer_for;
use crate::domain::errors::ConfigError;
use crate::domain::model::Scope;
use crate::infra::clipboard::{self, ClipboardWriter};
use crate::infra::config::Config;
use crate::infra::git::{GitCli, GitMetadata, TrackedFileLister};
use crate::infra::tree::TreeRenderer;

/// What the user asked for, before validation.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub path: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub include: Vec<String>,
    pub git_only: bool,
    pub case_sensitive: bool,
}

/// Validated, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub scope: Scope,
    pub filter: FileFilter,
    pub mode: ScanMode,
    pub output_path: Option<PathBuf>,
    pub pretext: String,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub scope: Scope,
    pub tree: String,
    pub files_included: usize,
    pub export: ExportResult,
    pub git: Option<GitMetadata>,
}

/// Owns the collaborators of a run. Defaults shell out; tests substitute fakes.
pub struct Pipeline {
    config: Config,
    working_dir: PathBuf,
    tree: Box<dyn TreeRenderer>,
    tracked: Box<dyn TrackedFileLister>,
    exporter: Exporter,
}

impl Pipeline {
    pub fn from_config(config: Config, working_dir: PathBuf) -> Result<Self> {
        let tree = renderer_for(config.tree.renderer())?;
        let clipboard = clipboard::writer_for(&config.clipboard);
        Ok(Self {
            config,
            working_dir,
            tree,
            tracked: Box::new(GitCli),
            exporter: Exporter::new(clipboard),
        })
    }

    pub fn with_tree_renderer(mut self, tree: Box<dyn TreeRenderer>) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_tracked_lister(mut self, tracked: Box<dyn TrackedFileLister>) -> Self {
        self.tracked = tracked;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardWriter>) -> Self {
        self.exporter = Exporter::new(clipboard);
        self
    }

    pub fn run(&mut self, request: RunRequest) -> Result<RunReport> {
        let options = self.prepare(request)?;
        self.execute(&options)
    }

    /// Validate the request. Every configuration error surfaces here, before any file is read.
    pub fn prepare(&self, request: RunRequest) -> Result<RunOptions> {
        let case_sensitive = request.case_sensitive || self.config.defaults.case_sensitive();
        let include = PatternSet::compile(&request.include, case_sensitive, "-M")?;
        let scope = resolve_scope(request.path.as_deref(), &self.working_dir)?;

        let mode = if request.git_only {
            if !self.tracked.is_working_copy(&scope.root) {
                return Err(ConfigError::NotWorkingCopy(scope.root).into());
            }
            ScanMode::Git
        } else {
            ScanMode::Filesystem
        };

        let exclude_patterns =
            load_exclude_patterns(&self.config.ignore.patterns, &self.working_dir)?;
        let exclude = PatternSet::compile(&exclude_patterns, case_sensitive, "exclude patterns")?;
        tracing::debug!(
            include = ?include.sources(),
            exclude = ?exclude.sources(),
            "compiled patterns"
        );

        Ok(RunOptions {
            scope,
            filter: FileFilter {
                include,
                exclude,
                skip_hidden: !self.config.defaults.show_hidden(),
            },
            mode,
            output_path: request.output.map(|path| self.working_dir.join(path)),
            pretext: self.config.defaults.pretext.clone(),
        })
    }

    pub fn execute(&mut self, options: &RunOptions) -> Result<RunReport> {
        let scanner = Scanner::new(self.tree.as_ref(), self.tracked.as_ref());
        let scan = scanner.scan(&options.scope, &options.filter, options.mode)?;
        let bundle = build_bundle(&scan, &options.pretext);
        let files_included = bundle.entries.len();

        let export = self
            .exporter
            .export(&bundle, options.output_path.as_deref())?;

        let git = match options.mode {
            ScanMode::Git => self.tracked.metadata(&scan.scope.root),
            ScanMode::Filesystem => None,
        };

        Ok(RunReport {
            scope: scan.scope,
            tree: scan.tree,
            files_included,
            export,
            git,
        })
    }
}
