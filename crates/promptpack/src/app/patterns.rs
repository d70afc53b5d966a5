//! Glob matching for include and exclude filters.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::domain::errors::ConfigError;

/// Compiled list of glob patterns sharing one case-sensitivity setting.
///
/// Matching short-circuits on the first hit. An empty set matches everything when used as an
/// include filter and nothing when used as an exclude filter.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    sources: Vec<String>,
    matchers: Vec<GlobMatcher>,
}

impl PatternSet {
    /// Validate and compile `patterns`. `origin` names where they came from for error messages.
    pub fn compile<S: AsRef<str>>(
        patterns: &[S],
        case_sensitive: bool,
        origin: &str,
    ) -> Result<Self, ConfigError> {
        let mut sources = Vec::with_capacity(patterns.len());
        let mut matchers = Vec::with_capacity(patterns.len());

        for raw in patterns {
            let raw = raw.as_ref();
            validate(raw, origin)?;
            let pattern = raw.trim_end_matches(['/', '\\']);
            if pattern.is_empty() {
                continue;
            }
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|source| ConfigError::InvalidGlob {
                    pattern: raw.to_owned(),
                    origin: origin.to_owned(),
                    source,
                })?;
            sources.push(raw.to_owned());
            matchers.push(glob.compile_matcher());
        }

        Ok(Self { sources, matchers })
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Patterns as they were supplied, in order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Include-filter semantics: true for an empty set, else true if any pattern matches `name`.
    pub fn matches(&self, name: impl AsRef<Path>) -> bool {
        let name = name.as_ref();
        self.is_empty() || self.any_match(name)
    }

    /// Whether a file's basename passes this set as an include filter.
    pub fn includes_file(&self, relative: &Path) -> bool {
        match relative.file_name() {
            Some(name) => self.matches(name),
            None => self.is_empty(),
        }
    }

    /// Exclude-filter semantics: true if any pattern matches the name of the path or of one of
    /// its ancestors, or one of its root-relative prefixes.
    pub fn excluded(&self, relative: &Path) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut prefix = PathBuf::new();
        for component in relative.components() {
            prefix.push(component);
            let name = component.as_os_str();
            if self.any_match(Path::new(name)) || self.any_match(&prefix) {
                return true;
            }
        }
        false
    }

    fn any_match(&self, candidate: &Path) -> bool {
        self.matchers.iter().any(|matcher| matcher.is_match(candidate))
    }
}

/// Reject pattern syntax the matcher does not support.
pub fn validate(pattern: &str, origin: &str) -> Result<(), ConfigError> {
    if pattern.contains(['[', ']']) {
        return Err(ConfigError::CharacterClass {
            pattern: pattern.to_owned(),
            origin: origin.to_owned(),
        });
    }
    Ok(())
}

/// Split a `|`-delimited include list such as `*.rs|*.toml`.
pub fn split_pattern_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str], case_sensitive: bool) -> PatternSet {
        PatternSet::compile(patterns, case_sensitive, "test").expect("valid patterns")
    }

    #[test]
    fn empty_set_matches_everything() {
        let include = set(&[], false);
        assert!(include.matches("anything.bin"));
        assert!(!include.excluded(Path::new("anything.bin")));
    }

    #[test]
    fn wildcards_match_names() {
        let include = set(&["*.txt", "?.py"], false);
        assert!(include.matches("notes.txt"));
        assert!(include.matches("a.py"));
        assert!(!include.matches("ab.py"));
        assert!(!include.matches("readme.md"));
    }

    #[test]
    fn case_flag_applies_uniformly() {
        let insensitive = set(&["*.TXT"], false);
        assert!(insensitive.matches("x.txt"));
        assert!(insensitive.excluded(Path::new("dir/x.txt")));

        let sensitive = set(&["*.TXT"], true);
        assert!(!sensitive.matches("x.txt"));
        assert!(!sensitive.excluded(Path::new("dir/x.txt")));
    }

    #[test]
    fn character_classes_are_rejected() {
        for pattern in ["[ab].txt", "file].rs", "*.[ch]"] {
            let err = PatternSet::compile(&[pattern], false, "-M").unwrap_err();
            assert!(matches!(err, ConfigError::CharacterClass { .. }), "{pattern}");
        }
    }

    #[test]
    fn rejection_happens_even_after_valid_patterns() {
        let result = PatternSet::compile(&["*.rs", "[x]"], false, "-M");
        assert!(result.is_err());
    }

    #[test]
    fn exclusion_applies_to_ancestor_directories() {
        let exclude = set(&["node_modules", "build/"], false);
        assert!(exclude.excluded(Path::new("node_modules/pkg/index.js")));
        assert!(exclude.excluded(Path::new("web/node_modules/x.js")));
        assert!(exclude.excluded(Path::new("build/out.o")));
        assert!(!exclude.excluded(Path::new("src/builder.rs")));
    }

    #[test]
    fn exclusion_matches_relative_prefixes() {
        let exclude = set(&["docs/*.md"], true);
        assert!(exclude.excluded(Path::new("docs/intro.md")));
        assert!(!exclude.excluded(Path::new("intro.md")));
    }

    #[test]
    fn include_checks_basename_only() {
        let include = set(&["*.rs"], false);
        assert!(include.includes_file(Path::new("src/deep/lib.rs")));
        assert!(!include.includes_file(Path::new("src.rs/readme")));
    }

    #[test]
    fn splits_pipe_delimited_lists() {
        assert_eq!(split_pattern_list("*.txt| *.py ||"), vec!["*.txt", "*.py"]);
        assert!(split_pattern_list("").is_empty());
    }
}
