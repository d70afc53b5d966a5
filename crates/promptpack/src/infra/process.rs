//! Locating external programs.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Resolve `program` against `PATH` the way a shell would, without running it.
pub fn find_program(program: &str) -> Option<PathBuf> {
    find_program_in(program, env::var_os("PATH"))
}

pub(crate) fn find_program_in(program: &str, search_path: Option<OsString>) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let search_path = search_path?;
    env::split_paths(&search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| executable_names(program).map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

#[cfg(windows)]
fn executable_names(program: &str) -> impl Iterator<Item = String> {
    let with_ext = if Path::new(program).extension().is_some() {
        None
    } else {
        Some(format!("{program}.exe"))
    };
    std::iter::once(program.to_owned()).chain(with_ext)
}

#[cfg(not(windows))]
fn executable_names(program: &str) -> impl Iterator<Item = String> {
    std::iter::once(program.to_owned())
}
