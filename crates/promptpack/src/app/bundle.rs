//! Assembling the bundle from enumerated files.

use std::fs;

use crate::app::scan::ScanResult;
use crate::domain::model::{Bundle, BundleEntry, FileRecord, Scope};

/// Read every in-scope regular file of `scan`, in enumeration order, into a [`Bundle`].
///
/// Entries that vanished, are not regular files, resolve outside the scope root, or cannot be
/// read are skipped without failing the run.
pub fn build_bundle(scan: &ScanResult, pretext: &str) -> Bundle {
    let entries = scan
        .files
        .iter()
        .filter_map(|record| read_entry(&scan.scope, record))
        .collect();

    Bundle {
        pretext: pretext.to_owned(),
        tree: scan.tree.clone(),
        entries,
    }
}

fn read_entry(scope: &Scope, record: &FileRecord) -> Option<BundleEntry> {
    let candidate = scope.root.join(&record.relative);
    let canonical = match candidate.canonicalize() {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(path = %candidate.display(), error = %err, "skipping missing file");
            return None;
        }
    };

    if !canonical.starts_with(&scope.root) {
        tracing::debug!(path = %canonical.display(), "skipping file outside scope");
        return None;
    }
    if !canonical.is_file() {
        tracing::debug!(path = %canonical.display(), "skipping non-regular file");
        return None;
    }

    match fs::read(&canonical) {
        Ok(bytes) => Some(BundleEntry {
            display_path: record.display_path.clone(),
            contents: String::from_utf8_lossy(&bytes).into_owned(),
        }),
        Err(err) => {
            tracing::debug!(path = %canonical.display(), error = %err, "skipping unreadable file");
            None
        }
    }
}
