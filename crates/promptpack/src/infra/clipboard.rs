//! Clipboard integration utilities.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

use crate::domain::errors::EnvironmentError;
use crate::infra::config::{ClipboardBackend, ClipboardSettings};
use crate::infra::process;

/// Destination for the finished bundle text.
pub trait ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Pipes text into the first clipboard utility found on `PATH`.
///
/// Probing happens on every write, so a missing utility only surfaces once there is something
/// to copy.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    candidates: Vec<Vec<String>>,
}

impl CommandClipboard {
    /// Use the platform's default candidates, in priority order.
    pub fn new() -> Self {
        Self::with_candidates(
            default_commands()
                .into_iter()
                .map(|command| command.iter().map(|part| (*part).to_owned()).collect())
                .collect(),
        )
    }

    pub fn with_candidates(candidates: Vec<Vec<String>>) -> Self {
        Self { candidates }
    }

    /// First candidate whose program resolves on `PATH`, with the program path resolved.
    fn probe(&self) -> Result<Vec<String>, EnvironmentError> {
        for command in &self.candidates {
            let Some((program, args)) = command.split_first() else {
                continue;
            };
            if let Some(resolved) = process::find_program(program) {
                tracing::debug!(program = %resolved.display(), "using clipboard utility");
                let mut resolved_command = vec![resolved.display().to_string()];
                resolved_command.extend(args.iter().cloned());
                return Ok(resolved_command);
            }
        }

        let tried = self
            .candidates
            .iter()
            .filter_map(|command| command.first().cloned())
            .collect::<Vec<_>>()
            .join(", ");
        Err(EnvironmentError::NoClipboardUtility(tried))
    }
}

impl Default for CommandClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardWriter for CommandClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let command = self.probe()?;
        try_command_copy(&command, text)
    }
}

/// Direct access to the system clipboard through `arboard`.
pub struct NativeClipboard {
    inner: Option<arboard::Clipboard>,
}

impl NativeClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }
}

impl Default for NativeClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardWriter for NativeClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new().context("failed to open system clipboard")?;
            self.inner = Some(clipboard);
        }
        let clipboard = self
            .inner
            .as_mut()
            .context("system clipboard unavailable")?;
        clipboard
            .set_text(text.to_owned())
            .context("failed to write to system clipboard")
    }
}

/// Build the clipboard writer selected in configuration.
pub fn writer_for(settings: &ClipboardSettings) -> Box<dyn ClipboardWriter> {
    match settings.backend() {
        ClipboardBackend::Native => Box::new(NativeClipboard::new()),
        ClipboardBackend::Command => match settings.command() {
            Some(command) => Box::new(CommandClipboard::with_candidates(vec![command.to_vec()])),
            None => Box::new(CommandClipboard::new()),
        },
    }
}

fn try_command_copy(command: &[String], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn clipboard command: {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .context("failed to write clipboard contents")?;
    }

    let status = child
        .wait()
        .with_context(|| format!("clipboard command did not exit cleanly: {program}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("clipboard command exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn default_commands() -> Vec<&'static [&'static str]> {
    vec![&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn default_commands() -> Vec<&'static [&'static str]> {
    vec![
        &["wl-copy"],
        &["xclip", "-selection", "clipboard"],
        &["xsel", "--clipboard", "--input"],
    ]
}

#[cfg(target_os = "windows")]
fn default_commands() -> Vec<&'static [&'static str]> {
    vec![
        &["clip.exe"],
        &["powershell.exe", "-NoProfile", "-Command", "Set-Clipboard"],
    ]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn default_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}
