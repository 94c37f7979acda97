//! Glob-style path matching.
//!
//! Exclusion and inclusion globs are matched against paths relative to the
//! project root, always with `/` separators. `*` never crosses a directory
//! boundary while `**` matches any number of directories, so
//! `lib/**/*` matches both `lib/a.rb` and `lib/deep/b.rb`.

use std::path::{Component, Path};

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled glob pattern for relative file paths.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    compiled: Pattern,
}

impl PathPattern {
    /// Compile a pattern.
    pub fn new(pattern: &str) -> Result<Self, glob::PatternError> {
        let normalized = pattern.strip_prefix("./").unwrap_or(pattern);
        Ok(Self {
            raw: pattern.to_string(),
            compiled: Pattern::new(normalized)?,
        })
    }

    /// Tests whether a path matches this pattern.
    pub fn matches(&self, path: &Path) -> bool {
        self.matches_str(&to_slash(path))
    }

    /// Tests a `/`-separated relative path string.
    pub fn matches_str(&self, path: &str) -> bool {
        if self.compiled.matches_with(path, MATCH_OPTIONS) {
            return true;
        }
        // `dir/**` should cover everything below `dir`.
        if let Some(prefix) = self.compiled.as_str().strip_suffix("/**") {
            let prefix = prefix.trim_end_matches('/');
            return path.len() > prefix.len()
                && path.starts_with(prefix)
                && path.as_bytes()[prefix.len()] == b'/';
        }
        false
    }

    /// The pattern as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// An ordered set of patterns; a path matches the set if any pattern matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<PathPattern>,
}

impl PatternSet {
    /// Compile a list of globs, skipping (and logging) invalid ones.
    ///
    /// Invalid globs are reported as configuration errors before any
    /// pattern set is built, so skipping here only guards against
    /// programmatic callers.
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Self {
        let patterns = globs
            .iter()
            .filter_map(|g| match PathPattern::new(g.as_ref()) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Ignoring invalid glob '{}': {}", g.as_ref(), e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// Whether any pattern matches the path.
    pub fn matches(&self, path: &Path) -> bool {
        let path = to_slash(path);
        self.patterns.iter().any(|p| p.matches_str(&path))
    }

    /// Number of patterns in the set.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Render a path with `/` separators, dropping `.` components.
pub fn to_slash(path: &Path) -> String {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::RootDir => parts.push(String::new()),
            other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
        }
    }
    if parts.len() == 1 && parts[0].is_empty() {
        return "/".to_string();
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, path: &str) -> bool {
        PathPattern::new(pattern).unwrap().matches(Path::new(path))
    }

    #[test]
    fn single_star_stays_in_directory() {
        assert!(matches("lib/*.rb", "lib/foo.rb"));
        assert!(!matches("lib/*.rb", "lib/nested/foo.rb"));
    }

    #[test]
    fn double_star_crosses_directories() {
        assert!(matches("lib/**/*", "lib/foo.rb"));
        assert!(matches("lib/**/*", "lib/a/b/foo.rb"));
        assert!(!matches("lib/**/*", "spec/foo.rb"));
    }

    #[test]
    fn trailing_double_star_covers_subtree() {
        assert!(matches("vendor/**", "vendor/gems/x.rb"));
        assert!(!matches("vendor/**", "vendored/x.rb"));
    }

    #[test]
    fn leading_dot_slash_is_ignored() {
        assert!(matches("./lib/foo.rb", "lib/foo.rb"));
        assert!(matches("lib/foo.rb", "./lib/foo.rb"));
    }

    #[test]
    fn literal_path_matches_exactly() {
        assert!(matches("lib/foo.rb", "lib/foo.rb"));
        assert!(!matches("lib/foo.rb", "lib/foo.rbx"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(PathPattern::new("lib/[").is_err());
    }

    #[test]
    fn pattern_set_matches_any() {
        let set = PatternSet::new(&["spec/**/*", "lib/generated.rb"]);
        assert_eq!(set.len(), 2);
        assert!(set.matches(Path::new("spec/a_spec.rb")));
        assert!(set.matches(Path::new("lib/generated.rb")));
        assert!(!set.matches(Path::new("lib/model.rb")));
    }

    #[test]
    fn pattern_set_skips_invalid_globs() {
        let set = PatternSet::new(&["lib/[", "lib/*.rb"]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_set_matches_nothing() {
        let set = PatternSet::default();
        assert!(set.is_empty());
        assert!(!set.matches(Path::new("lib/a.rb")));
    }

    #[test]
    fn to_slash_normalizes_components() {
        assert_eq!(to_slash(Path::new("./lib/a.rb")), "lib/a.rb");
        assert_eq!(to_slash(Path::new("lib")), "lib");
    }
}
