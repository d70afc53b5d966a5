use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use anyhow::Result;
use insta::assert_snapshot;
use promptpack::app::pipeline::{Pipeline, RunRequest};
use promptpack::app::tree::AsciiTree;
use promptpack::infra::clipboard::ClipboardWriter;
use promptpack::infra::config::Config;

#[derive(Clone, Default)]
struct RecordingClipboard(Rc<RefCell<String>>);

impl ClipboardWriter for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        *self.0.borrow_mut() = text.to_owned();
        Ok(())
    }
}

#[test]
fn bundle_layout() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let root = temp.path();
    fs::create_dir_all(root.join("src"))?;
    fs::create_dir_all(root.join("empty/nested"))?;
    fs::write(root.join("Cargo.toml"), "[package]\nname = \"demo\"\n")?;
    fs::write(root.join("src/main.rs"), "fn main() {}\n")?;
    fs::write(root.join("notes.md"), "scratch\n")?;
    fs::write(root.join(".gitignore"), "notes.md\n")?;

    let mut config = Config::default();
    config.defaults.pretext = "Project context:".into();

    let clipboard = RecordingClipboard::default();
    Pipeline::from_config(config, root.to_path_buf())?
        .with_tree_renderer(Box::new(AsciiTree))
        .with_clipboard(Box::new(clipboard.clone()))
        .run(RunRequest::default())?;

    let rendered = clipboard.0.borrow().clone();
    assert_snapshot!(rendered, @r#"
    Project context:

    File Tree:
    .
    ├── .gitignore
    ├── Cargo.toml
    └── src
        └── main.rs

    Concatenated Files:
    --- File: ./.gitignore ---
    notes.md

    --- File: ./Cargo.toml ---
    [package]
    name = "demo"

    --- File: ./src/main.rs ---
    fn main() {}
    "#);
    Ok(())
}
