//! Exclusion rules for build contexts
//!
//! Two tiers are checked for every entry: a glob match against the entry's
//! basename, and substring containment against its full relative path.
//! Manifest patterns that contain a `/` are matched against the whole
//! relative path instead of the basename.

use crate::error::{BuildError, BuildResult};
use glob::{MatchOptions, Pattern};

/// Basename globs shared by every protocol
const COMMON_GLOBS: &[&str] = &[
    ".git",
    "__pycache__",
    "*.pyc",
    "*.pyo",
    "node_modules",
    ".venv",
    "venv",
    ".DS_Store",
    "*.log",
    ".pytest_cache",
    ".apiflow",
];

/// Relative-path substrings shared by every protocol
const COMMON_SUBSTRINGS: &[&str] = &[".egg-info"];

const LEGACY_ENV_GLOBS: &[&str] = &[".env"];

/// Env files are never shipped to the hosted build service.
const HOSTED_ENV_GLOBS: &[&str] = &[".env", ".env.*", "*.env"];

/// `*` does not cross directory boundaries in path patterns
const PATH_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    globs: Vec<Pattern>,
    paths: Vec<Pattern>,
    substrings: Vec<String>,
}

impl ExclusionRules {
    pub fn new(globs: &[&str], substrings: &[&str]) -> BuildResult<Self> {
        let rules = Self::default().with_globs(globs.iter().copied())?;
        Ok(rules.with_substrings(substrings.iter().copied()))
    }

    /// Rules for the legacy storage upload
    pub fn legacy() -> Self {
        Self::from_constants(&[COMMON_GLOBS, LEGACY_ENV_GLOBS])
    }

    /// Rules for the hosted build endpoint (env files always excluded)
    pub fn hosted() -> Self {
        Self::from_constants(&[COMMON_GLOBS, HOSTED_ENV_GLOBS])
    }

    fn from_constants(groups: &[&[&str]]) -> Self {
        let globs = groups
            .iter()
            .flat_map(|group| group.iter())
            .filter_map(|p| Pattern::new(p).ok())
            .collect();
        Self {
            globs,
            paths: Vec::new(),
            substrings: COMMON_SUBSTRINGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Add basename glob patterns
    pub fn with_globs<'a>(
        mut self,
        patterns: impl IntoIterator<Item = &'a str>,
    ) -> BuildResult<Self> {
        for pattern in patterns {
            self.globs.push(compile(pattern)?);
        }
        Ok(self)
    }

    /// Add the manifest's `files.exclude` entries
    ///
    /// `data/raw` and `data/*.csv` match relative paths from the project root,
    /// plain names like `*.csv` match basenames anywhere in the tree.
    pub fn with_manifest_excludes<'a>(
        mut self,
        patterns: impl IntoIterator<Item = &'a str>,
    ) -> BuildResult<Self> {
        for pattern in patterns {
            let trimmed = pattern
                .trim_start_matches("./")
                .trim_start_matches('/')
                .trim_end_matches('/');
            if trimmed.contains('/') {
                self.paths.push(compile(trimmed)?);
            } else {
                self.globs.push(compile(trimmed)?);
            }
        }
        Ok(self)
    }

    /// Add relative-path substrings
    pub fn with_substrings<'a>(mut self, substrings: impl IntoIterator<Item = &'a str>) -> Self {
        self.substrings
            .extend(substrings.into_iter().map(|s| s.to_string()));
        self
    }

    /// Whether an entry must be left out of the archive.
    ///
    /// `relative_path` uses `/` as separator regardless of platform.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        let basename = relative_path.rsplit('/').next().unwrap_or(relative_path);
        self.globs.iter().any(|p| p.matches(basename))
            || self
                .paths
                .iter()
                .any(|p| p.matches_with(relative_path, PATH_MATCH))
            || self
                .substrings
                .iter()
                .any(|s| relative_path.contains(s.as_str()))
    }
}

fn compile(pattern: &str) -> BuildResult<Pattern> {
    Pattern::new(pattern).map_err(|source| BuildError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_glob() {
        let rules = ExclusionRules::new(&["*.pyc", "node_modules"], &[]).unwrap();
        assert!(rules.is_excluded("pkg/mod.pyc"));
        assert!(rules.is_excluded("web/node_modules"));
        assert!(!rules.is_excluded("pkg/mod.py"));
        // globs only look at the basename
        assert!(!rules.is_excluded("node_modules_backup/index.js"));
    }

    #[test]
    fn test_substring_on_relative_path() {
        let rules = ExclusionRules::new(&[], &["build/tmp"]).unwrap();
        assert!(rules.is_excluded("app/build/tmp/cache.bin"));
        assert!(!rules.is_excluded("app/build/out.bin"));
    }

    #[test]
    fn test_hosted_always_excludes_env_files() {
        let rules = ExclusionRules::hosted();
        assert!(rules.is_excluded(".env"));
        assert!(rules.is_excluded("config/.env.production"));
        assert!(rules.is_excluded("secrets/prod.env"));
        assert!(!rules.is_excluded("env.py"));
        assert!(!rules.is_excluded("environment/settings.py"));
    }

    #[test]
    fn test_legacy_excludes_dotenv_only() {
        let rules = ExclusionRules::legacy();
        assert!(rules.is_excluded(".env"));
        assert!(!rules.is_excluded(".env.example"));
        assert!(rules.is_excluded("__pycache__"));
        assert!(rules.is_excluded("lib/foo.egg-info/PKG-INFO"));
    }

    #[test]
    fn test_manifest_path_patterns() {
        let rules = ExclusionRules::hosted()
            .with_manifest_excludes(["data/raw", "./fixtures/*.json", "/tmp/", "*.csv"])
            .unwrap();
        assert!(rules.is_excluded("data/raw"));
        assert!(rules.is_excluded("fixtures/big.json"));
        assert!(rules.is_excluded("tmp"));
        assert!(rules.is_excluded("reports/2024/q1.csv"));
        assert!(!rules.is_excluded("data/raw.txt"));
        assert!(!rules.is_excluded("data/schema.json"));
        // `*` stays within one directory
        assert!(!rules.is_excluded("fixtures/nested/big.json"));
        // path patterns are anchored at the project root
        assert!(!rules.is_excluded("app/data/raw"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = ExclusionRules::default().with_globs(["[unclosed"]);
        assert!(matches!(result, Err(BuildError::InvalidPattern { .. })));
    }
}
