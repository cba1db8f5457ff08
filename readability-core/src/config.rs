//! Configuration file support
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.readabilityrc.json` in the project root
//! 3. `readability.config.json` in the project root
//!
//! All fields are optional. CLI flags take precedence over config values.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default exclude patterns applied when no config is specified
const DEFAULT_EXCLUDES: &[&str] = &[
    "**/test/**",
    "**/tests/**",
    "**/*Test.java",
    "**/*Tests.java",
    "**/target/**",
    "**/build/**",
    "**/out/**",
    "**/generated/**",
];

/// Readability configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadabilityConfig {
    /// Directory holding the scoring model (`RSE.jar`)
    #[serde(default)]
    pub model_dir: Option<PathBuf>,

    /// Glob patterns for files to include (default: all `.java` files)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for files to exclude (default: tests and build output)
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Only report methods scoring at or below this threshold
    #[serde(default)]
    pub max_score: Option<f64>,

    /// Cap on the per-call scoring worker pool
    #[serde(default)]
    pub workers: Option<usize>,
}

impl ReadabilityConfig {
    /// Load configuration from an explicit file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Discover a config file in the project root, if any
    pub fn discover(root: &Path) -> Result<Option<Self>> {
        for name in [".readabilityrc.json", "readability.config.json"] {
            let candidate = root.join(name);
            if candidate.is_file() {
                return Self::load(&candidate).map(Some);
            }
        }
        Ok(None)
    }

    /// Compile glob patterns and produce the resolved form
    pub fn resolve(self) -> Result<ResolvedConfig> {
        let include = if self.include.is_empty() {
            None
        } else {
            Some(build_glob_set(&self.include).context("invalid include pattern")?)
        };
        let exclude_patterns: Vec<String> = if self.exclude.is_empty() {
            DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
        } else {
            self.exclude
        };
        let exclude = build_glob_set(&exclude_patterns).context("invalid exclude pattern")?;

        Ok(ResolvedConfig {
            model_dir: self.model_dir,
            include,
            exclude,
            max_score: self.max_score,
            workers: self.workers,
        })
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("invalid glob: {pattern}"))?);
    }
    builder.build().context("failed to build glob set")
}

/// Configuration with compiled glob sets
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model_dir: Option<PathBuf>,
    include: Option<GlobSet>,
    exclude: GlobSet,
    pub max_score: Option<f64>,
    pub workers: Option<usize>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ReadabilityConfig::default()
            .resolve()
            .unwrap_or_else(|_| ResolvedConfig {
                model_dir: None,
                include: None,
                exclude: GlobSet::empty(),
                max_score: None,
                workers: None,
            })
    }
}

impl ResolvedConfig {
    /// Apply include/exclude filtering to a candidate file path
    pub fn should_include(&self, path: &Path) -> bool {
        if self.exclude.is_match(path) {
            return false;
        }
        match &self.include {
            Some(include) => include.is_match(path),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_exclude_tests_and_build_output() {
        let config = ResolvedConfig::default();
        assert!(config.should_include(Path::new("src/main/java/App.java")));
        assert!(!config.should_include(Path::new("src/test/java/AppTest.java")));
        assert!(!config.should_include(Path::new("target/generated/Foo.java")));
    }

    #[test]
    fn explicit_include_narrows_the_selection() {
        let config = ReadabilityConfig {
            include: vec!["src/main/**/*.java".to_string()],
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert!(config.should_include(Path::new("src/main/java/App.java")));
        assert!(!config.should_include(Path::new("scripts/Tool.java")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<ReadabilityConfig, _> =
            serde_json::from_str(r#"{"model_dirr": "/opt/model"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let parsed: ReadabilityConfig = serde_json::from_str(
            r#"{"model_dir": "/opt/rse", "exclude": ["**/vendored/**"], "max_score": 0.5}"#,
        )
        .unwrap();
        assert_eq!(parsed.model_dir.as_deref(), Some(Path::new("/opt/rse")));
        assert_eq!(parsed.max_score, Some(0.5));
        let resolved = parsed.resolve().unwrap();
        assert!(!resolved.should_include(Path::new("lib/vendored/X.java")));
        assert!(resolved.should_include(Path::new("src/test/java/T.java")));
    }
}
