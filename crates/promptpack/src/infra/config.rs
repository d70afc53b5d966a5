//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".promptpack/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub ignore: Ignore,
    #[serde(default)]
    pub clipboard: ClipboardSettings,
    #[serde(default)]
    pub tree: TreeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "Defaults::default_pretext")]
    pub pretext: String,
    #[serde(default)]
    case_sensitive: Option<bool>,
    /// Include dot-prefixed files and directories.
    #[serde(default)]
    show_hidden: Option<bool>,
}

impl Defaults {
    fn default_pretext() -> String {
        "The following is the file tree and concatenated file contents of a project. \
         Use it as context for the request that follows."
            .to_owned()
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive.unwrap_or(false)
    }

    pub fn show_hidden(&self) -> bool {
        self.show_hidden.unwrap_or(true)
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            pretext: Self::default_pretext(),
            case_sensitive: Some(false),
            show_hidden: Some(true),
        }
    }
}

/// Built-in exclude patterns, applied before any ignore file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ignore {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Default for Ignore {
    fn default() -> Self {
        Self {
            patterns: [
                ".git",
                ".promptpack",
                ".promptpackignore",
                "node_modules",
                "__pycache__",
                "*.pyc",
                ".DS_Store",
                ".venv",
                "target",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardBackend {
    /// Pipe into the first clipboard utility found on `PATH`.
    #[default]
    Command,
    /// Talk to the platform clipboard directly.
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClipboardSettings {
    #[serde(default)]
    backend: Option<ClipboardBackend>,
    /// Explicit program and arguments, replacing the probed candidates.
    #[serde(default)]
    command: Option<Vec<String>>,
}

impl ClipboardSettings {
    pub fn backend(&self) -> ClipboardBackend {
        self.backend.unwrap_or_default()
    }

    pub fn command(&self) -> Option<&[String]> {
        self.command.as_deref().filter(|command| !command.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TreeRendererKind {
    /// External `tree` when available, builtin otherwise.
    #[default]
    Auto,
    Builtin,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TreeSettings {
    #[serde(default)]
    renderer: Option<TreeRendererKind>,
}

impl TreeSettings {
    pub fn renderer(&self) -> TreeRendererKind {
        self.renderer.unwrap_or_default()
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pretext: Option<String>,
    clipboard_backend: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            pretext: env::var("PROMPTPACK_PRETEXT").ok(),
            clipboard_backend: env::var("PROMPTPACK_CLIPBOARD").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(pretext: &str, clipboard_backend: &str) -> Self {
        Self {
            pretext: Some(pretext.to_owned()),
            clipboard_backend: Some(clipboard_backend.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load(working_dir: &Path) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path(working_dir);
        Self::load_with_layers(global, Some(workspace), env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        apply_env_overrides(merged, env_overrides)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            ignore: merge_ignore(self.ignore, other.ignore),
            clipboard: merge_clipboard(self.clipboard, other.clipboard),
            tree: TreeSettings {
                renderer: other.tree.renderer.or(self.tree.renderer),
            },
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        pretext: if overlay.pretext != Defaults::default_pretext() {
            overlay.pretext
        } else {
            base.pretext
        },
        case_sensitive: overlay.case_sensitive.or(base.case_sensitive),
        show_hidden: overlay.show_hidden.or(base.show_hidden),
    }
}

fn merge_ignore(base: Ignore, overlay: Ignore) -> Ignore {
    let mut patterns = base.patterns;
    for pattern in overlay.patterns {
        if !patterns.contains(&pattern) {
            patterns.push(pattern);
        }
    }
    Ignore { patterns }
}

fn merge_clipboard(mut base: ClipboardSettings, overlay: ClipboardSettings) -> ClipboardSettings {
    if let Some(value) = overlay.backend {
        base.backend = Some(value);
    }
    if let Some(value) = overlay.command {
        base.command = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("promptpack/config.toml"))
}

fn workspace_config_path(working_dir: &Path) -> PathBuf {
    let root = find_repo_root(working_dir).unwrap_or_else(|| working_dir.to_path_buf());
    root.join(DEFAULT_WORKSPACE_CONFIG_PATH)
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Result<Config> {
    if let Some(pretext) = env.pretext {
        config.defaults.pretext = pretext;
    }
    if let Some(backend) = env.clipboard_backend {
        let backend = toml::Value::String(backend.to_ascii_lowercase())
            .try_into::<ClipboardBackend>()
            .with_context(|| format!("invalid PROMPTPACK_CLIPBOARD value '{backend}'"))?;
        config.clipboard.backend = Some(backend);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.defaults, Defaults::default());
        assert!(config.ignore.patterns.contains(&"node_modules".into()));
        assert_eq!(config.clipboard.backend(), ClipboardBackend::Command);
        assert_eq!(config.tree.renderer(), TreeRendererKind::Auto);
    }

    #[test]
    fn embedded_defaults_match_struct_defaults() -> Result<()> {
        let embedded = Config::from_str(&DEFAULT_CONFIG)?;
        assert_eq!(embedded.defaults, Defaults::default());
        assert_eq!(embedded.ignore, Ignore::default());
        Ok(())
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[defaults]
pretext = "Review this code."
case_sensitive = true
[ignore]
patterns = ["generated", ".git"]
[tree]
renderer = "builtin"
"#,
        )?;

        let workspace_dir = temp.path().join("repo");
        fs::create_dir_all(workspace_dir.join(".promptpack"))?;
        fs::create_dir_all(workspace_dir.join(".git"))?;
        fs::write(
            workspace_dir.join(".promptpack/config.toml"),
            r#"
[defaults]
show_hidden = false
[ignore]
patterns = ["*.cache"]
[clipboard]
command = ["my-copy", "--stdin"]
"#,
        )?;

        let nested = workspace_dir.join("src/deep");
        fs::create_dir_all(&nested)?;
        let workspace_path = workspace_config_path(&nested);
        assert_eq!(workspace_path, workspace_dir.join(".promptpack/config.toml"));

        let config =
            Config::load_with_layers(Some(global), Some(workspace_path), EnvOverrides::default())?;

        assert_eq!(config.defaults.pretext, "Review this code.");
        assert!(!config.defaults.show_hidden());
        assert!(config.defaults.case_sensitive());
        assert_eq!(config.tree.renderer(), TreeRendererKind::Builtin);
        assert_eq!(
            config.clipboard.command(),
            Some(&["my-copy".to_owned(), "--stdin".to_owned()][..])
        );

        let patterns = &config.ignore.patterns;
        assert!(patterns.contains(&"generated".into()));
        assert!(patterns.contains(&"*.cache".into()));
        assert_eq!(patterns.iter().filter(|p| *p == ".git").count(), 1);
        Ok(())
    }

    #[test]
    fn later_layer_can_switch_flags_off() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("global.toml");
        fs::write(&global, "[defaults]\ncase_sensitive = true\nshow_hidden = false\n")?;
        let workspace = temp.path().join("workspace.toml");
        fs::write(&workspace, "[defaults]\ncase_sensitive = false\n")?;

        let config = Config::load_with_layers(
            Some(global.clone()),
            Some(workspace),
            EnvOverrides::default(),
        )?;
        assert!(!config.defaults.case_sensitive());
        assert!(!config.defaults.show_hidden(), "unset keys keep the earlier layer");

        let global_only = Config::load_with_layers(Some(global), None, EnvOverrides::default())?;
        assert!(global_only.defaults.case_sensitive());
        Ok(())
    }

    #[test]
    fn defaults_include_hidden_files_but_exclude_own_files() {
        let config = Config::default();
        assert!(config.defaults.show_hidden());
        assert!(!config.defaults.case_sensitive());
        assert!(config.ignore.patterns.contains(&".promptpack".into()));
        assert!(config.ignore.patterns.contains(&".promptpackignore".into()));
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests("Custom pretext", "Native");
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.defaults.pretext, "Custom pretext");
        assert_eq!(config.clipboard.backend(), ClipboardBackend::Native);
        Ok(())
    }

    #[test]
    fn invalid_env_backend_is_rejected() {
        let overrides = EnvOverrides::for_tests("x", "carrier-pigeon");
        assert!(Config::load_with_layers(None, None, overrides).is_err());
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }
}
