//! Emitting a finished bundle to the clipboard and, optionally, a file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::model::Bundle;
use crate::infra::clipboard::ClipboardWriter;

/// Result of an export operation.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub rendered: String,
    pub output_path: Option<PathBuf>,
}

/// Responsible for delivering rendered bundles.
pub struct Exporter {
    clipboard: Box<dyn ClipboardWriter>,
}

impl Exporter {
    pub fn new(clipboard: Box<dyn ClipboardWriter>) -> Self {
        Self { clipboard }
    }

    /// Copy the rendered bundle to the clipboard, then write it to `output_path` if given.
    ///
    /// A failed file write is returned as an error; the clipboard keeps what was copied.
    pub fn export(&mut self, bundle: &Bundle, output_path: Option<&Path>) -> Result<ExportResult> {
        let rendered = bundle.render();

        self.clipboard.write_text(&rendered)?;
        tracing::info!(bytes = rendered.len(), "copied bundle to clipboard");

        if let Some(path) = output_path {
            write_output(path, &rendered)?;
            tracing::info!(path = %path.display(), "wrote bundle to file");
        }

        Ok(ExportResult {
            rendered,
            output_path: output_path.map(Path::to_path_buf),
        })
    }
}

fn write_output(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create output directory: {}", parent.display())
        })?;
    }
    fs::write(path, rendered)
        .with_context(|| format!("failed to write bundle to {}", path.display()))
}
