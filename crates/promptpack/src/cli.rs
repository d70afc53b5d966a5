//! Command-line entry point.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::Shell;

use crate::app::patterns::split_pattern_list;
use crate::app::pipeline::{Pipeline, RunReport, RunRequest};
use crate::domain::errors::ConfigError;
use crate::infra::config::Config;

const BIN_NAME: &str = "promptpack";

/// Bundle a project's file tree and file contents into a prompt on the clipboard.
#[derive(Debug, Parser)]
#[command(
    name = BIN_NAME,
    version,
    about,
    after_help = "Run with --manual for the full manual."
)]
pub struct Cli {
    /// Directory to bundle; defaults to the current directory
    #[arg(short = 'P', long = "path", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Also write the bundle to FILE
    #[arg(short = 'F', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Only include files matching these globs, separated by '|' (e.g. "*.rs|*.toml")
    #[arg(short = 'M', long = "match", value_name = "PATTERNS")]
    pub patterns: Option<String>,

    /// Only include files tracked by git
    #[arg(short = 'g', long = "git")]
    pub git: bool,

    /// Match patterns case-sensitively
    #[arg(short = 'c', long = "case-sensitive")]
    pub case_sensitive: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the full manual and exit
    #[arg(long)]
    pub manual: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", value_enum)]
    pub completions: Option<Shell>,
}

impl Cli {
    fn into_request(self) -> RunRequest {
        RunRequest {
            path: self.path,
            output: self.file,
            include: self
                .patterns
                .as_deref()
                .map(split_pattern_list)
                .unwrap_or_default(),
            git_only: self.git,
            case_sensitive: self.case_sensitive,
        }
    }
}

/// Parse `args`, run, and map the outcome to the process exit code.
pub fn main<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    crate::init(cli.verbose);

    if cli.manual {
        print!("{MANUAL}");
        return ExitCode::SUCCESS;
    }

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(report) => {
            print_summary(&report);
            ExitCode::SUCCESS
        }
        Err(err) => report_error(&err),
    }
}

fn run(cli: Cli) -> Result<RunReport> {
    let working_dir = env::current_dir().context("unable to determine working directory")?;
    let config = Config::load(&working_dir)?;
    let mut pipeline = Pipeline::from_config(config, working_dir)?;
    pipeline.run(cli.into_request())
}

fn report_error(err: &anyhow::Error) -> ExitCode {
    eprintln!("error: {err:#}");
    if err.downcast_ref::<ConfigError>().is_some() {
        eprintln!();
        eprintln!("{}", Cli::command().render_usage());
    }
    ExitCode::from(1)
}

fn print_summary(report: &RunReport) {
    println!(
        "Prompt bundle created for {} ({})",
        report.scope.label,
        report.scope.root.display()
    );
    if let Some(git) = &report.git {
        let branch = git.branch.as_deref().unwrap_or("detached");
        match git.short_commit() {
            Some(commit) => println!("Git: {branch} @ {commit}"),
            None => println!("Git: {branch} (no commits)"),
        }
    }
    println!();
    println!("{}", report.tree);
    println!();
    println!(
        "Copied to clipboard: {} files, {} bytes.",
        report.files_included,
        report.export.rendered.len()
    );
    if let Some(path) = &report.export.output_path {
        println!("Saved to {}.", path.display());
    }
}

const MANUAL: &str = r#"PROMPTPACK(1)

NAME
    promptpack - bundle a project's file tree and contents into a prompt

SYNOPSIS
    promptpack [-P PATH] [-F FILE] [-M PATTERNS] [-g] [-c] [-v]...
    promptpack --help | --manual | --version | --completions SHELL

DESCRIPTION
    promptpack renders a tree view of a directory, concatenates the contents
    of every selected file, and copies the result to the system clipboard.
    The bundle has this layout:

        <pretext>

        File Tree:
        <tree view>

        Concatenated Files:
        --- File: <path> ---
        <contents>

OPTIONS
    -P, --path PATH
        Directory to bundle. Defaults to the current directory. The path is
        resolved to its canonical form and must be an existing directory;
        files resolving outside it are never included.

    -F, --file FILE
        Also write the bundle to FILE. The file receives exactly the text
        that was copied to the clipboard. A failed write is reported but the
        clipboard keeps its contents.

    -M, --match PATTERNS
        Only include files whose name matches one of the '|'-separated glob
        patterns, e.g. "*.rs|*.toml". '*' and '?' are supported; character
        classes ("[...]") are rejected.

    -g, --git
        Only include files tracked by git. The directory must be inside a git
        working copy. Untracked files are never listed, even if present.

    -c, --case-sensitive
        Match include and exclude patterns case-sensitively. The default is
        case-insensitive.

    -v, --verbose
        Log more detail to stderr. Repeat for debug and trace output.

EXCLUDES
    Files are excluded when their name, the name of a parent directory, or
    their path relative to the scope matches an exclude pattern. Exclude
    patterns are merged, without duplicates, from:

        1. built-in patterns (.git, .promptpack, .promptpackignore,
           node_modules, __pycache__, *.pyc, .DS_Store, .venv, target),
           extendable in configuration
        2. .gitignore in the current directory
        3. .promptpackignore in the current directory
        4. the pattern "promptpack"

    Ignore files hold one pattern per line. Blank lines and lines starting
    with '#' are skipped and one leading '/' is removed. An exclude match
    always wins over an include match. Hidden files and directories are
    included; set show_hidden = false to skip them.

CLIPBOARD
    The bundle is piped into the first available program of: pbcopy (macOS);
    wl-copy, xclip, xsel (Linux and other Unix); clip.exe, powershell.exe
    (Windows). If none is found the run fails. Set clipboard.command to use
    a specific program, or clipboard.backend = "native" to use the system
    clipboard API directly.

CONFIGURATION
    Settings are layered from built-in defaults, the user config file
    (<config dir>/promptpack/config.toml), and .promptpack/config.toml at the
    root of the enclosing git repository:

        [defaults]
        pretext = "..."          # first paragraph of the bundle
        case_sensitive = false
        show_hidden = true       # false skips dot-prefixed entries

        [ignore]
        patterns = ["dist"]      # added to the built-in excludes

        [clipboard]
        backend = "command"      # or "native"
        command = ["xclip", "-selection", "clipboard"]

        [tree]
        renderer = "auto"        # "builtin" or "external"

    PROMPTPACK_PRETEXT and PROMPTPACK_CLIPBOARD override the pretext and the
    clipboard backend.

EXIT STATUS
    0   success, or help/manual/version/completions shown
    1   invalid arguments or patterns, bad scope path, --git outside a
        working copy, no clipboard utility, or a failed file write
"#;
