use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::Result;
use promptpack::app::scan::{FileFilter, ScanMode, Scanner, resolve_scope};
use promptpack::app::tree::AsciiTree;
use promptpack::infra::git::{GitCli, TrackedFileLister};

fn git(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .is_ok_and(|output| output.status.success())
}

#[test]
fn lists_tracked_files_under_scope() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let root = temp.path();
    if !git(root, &["init", "-q"]) {
        // git is not installed.
        return Ok(());
    }

    fs::create_dir_all(root.join("src"))?;
    fs::write(root.join("src/a.txt"), "tracked")?;
    fs::write(root.join("src/b.txt"), "untracked")?;
    fs::write(root.join("top.txt"), "tracked, outside scope")?;
    assert!(git(root, &["add", "src/a.txt", "top.txt"]));

    assert!(GitCli.is_working_copy(root));
    assert!(GitCli.is_working_copy(&root.join("src")));

    let scope = resolve_scope(Some(Path::new("src")), root)?;
    let scanner = Scanner::new(&AsciiTree, &GitCli);
    let result = scanner.scan(&scope, &FileFilter::default(), ScanMode::Git)?;

    let files: Vec<_> = result.files.iter().map(|f| f.display_path.clone()).collect();
    assert_eq!(files, vec!["src/a.txt"]);
    assert_eq!(result.tree, "src\n└── a.txt");
    Ok(())
}

#[cfg(unix)]
#[test]
fn non_utf8_tracked_name_is_read() -> Result<()> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    use promptpack::app::bundle::build_bundle;

    let temp = tempfile::tempdir()?;
    let root = temp.path();
    if !git(root, &["init", "-q"]) {
        return Ok(());
    }
    let name = OsStr::from_bytes(b"caf\xe9.txt");
    if fs::write(root.join(name), "latin-1 name").is_err() {
        // The filesystem only accepts UTF-8 names.
        return Ok(());
    }
    assert!(git(root, &["add", "--all"]));

    let scope = resolve_scope(None, root)?;
    let scanner = Scanner::new(&AsciiTree, &GitCli);
    let result = scanner.scan(&scope, &FileFilter::default(), ScanMode::Git)?;
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].relative.as_os_str(), name);

    let bundle = build_bundle(&result, "pretext");
    assert_eq!(bundle.entries.len(), 1);
    assert_eq!(bundle.entries[0].contents, "latin-1 name");
    Ok(())
}
