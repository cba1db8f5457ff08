//! External scoring engine invocation
//!
//! The engine is the Scalabrino 2018 metric-based readability model, shipped
//! as `RSE.jar` and consumed as a child process: write the snippet to a temp
//! file, run the jar with the model directory as working directory, drain
//! stdout/stderr, wait for exit. Call-and-block; no streaming, no
//! cancellation once dispatched.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::{NamedTempFile, TempDir};

use crate::error::ReadabilityError;
use crate::scope::ScopeKind;
use crate::score::{parse_metrics_output, parse_score_output, ScoreResult};

/// Entry point of the metric extractor bundled inside `RSE.jar`
const METRICS_CLASS: &str = "it.unimol.readability.metric.runnable.ExtractMetrics";

/// Seam between the rating pipeline and the external engine.
///
/// `Sync` so one backend can be shared by the per-call worker pool.
pub trait ScoringBackend: Sync {
    /// Score a snippet without metrics. `is_whole_unit` marks text that is
    /// already a complete compilation unit and is sent to the engine bare;
    /// anything else is wrapped first.
    fn score_code(&self, code: &str, is_whole_unit: bool) -> Result<ScoreResult, ReadabilityError>;

    /// Score a snippet and attach its metric vector. The scope-kind hint
    /// drives code wrapping at the engine boundary.
    fn score_with_metrics(
        &self,
        code: &str,
        hint: ScopeKind,
    ) -> Result<ScoreResult, ReadabilityError>;
}

/// Wrap a snippet so the engine always receives compilable Java.
///
/// Whole files go bare; a method is wrapped in a synthetic class; a bare
/// statement block is wrapped in a synthetic method, itself wrapped in the
/// synthetic class. Driven solely by the originating scope's classification.
pub(crate) fn wrap_snippet(code: &str, hint: ScopeKind) -> String {
    match hint {
        ScopeKind::File => code.to_string(),
        ScopeKind::Method => wrap_in_class(code),
        _ => wrap_in_class(&wrap_in_method(code)),
    }
}

fn wrap_in_method(code: &str) -> String {
    format!("    public static void main(String[] args) {{\n{code}\n    }}")
}

fn wrap_in_class(code: &str) -> String {
    format!("public class Snippet {{\n{code}\n}}")
}

/// Child-process client for the RSE readability model
#[derive(Debug)]
pub struct RseEngine {
    model_dir: PathBuf,
    snippet_dir: TempDir,
}

impl RseEngine {
    /// Point the engine at the directory holding `RSE.jar`. A scratch
    /// directory for snippet files is created alongside.
    pub fn new(model_dir: impl Into<PathBuf>) -> Result<Self, ReadabilityError> {
        let model_dir = model_dir.into();
        if !model_dir.join("RSE.jar").is_file() {
            return Err(ReadabilityError::EngineUnavailable(format!(
                "RSE.jar not found in {}",
                model_dir.display()
            )));
        }
        let snippet_dir = tempfile::Builder::new()
            .prefix("readability-snippets-")
            .tempdir()
            .map_err(|e| {
                ReadabilityError::EngineUnavailable(format!(
                    "failed to create snippet directory: {e}"
                ))
            })?;
        Ok(RseEngine {
            model_dir,
            snippet_dir,
        })
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Write a wrapped snippet to a scratch `.java` file. The file is
    /// removed when the returned handle drops.
    fn write_snippet(&self, code: &str) -> Result<NamedTempFile, ReadabilityError> {
        let mut file = tempfile::Builder::new()
            .prefix("snippet")
            .suffix(".java")
            .tempfile_in(self.snippet_dir.path())
            .map_err(|e| ReadabilityError::Scoring {
                snippet: self.snippet_dir.path().to_path_buf(),
                reason: format!("failed to create snippet file: {e}"),
            })?;
        file.write_all(code.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| ReadabilityError::Scoring {
                snippet: file.path().to_path_buf(),
                reason: format!("failed to write snippet: {e}"),
            })?;
        Ok(file)
    }

    fn run_model(&self, args: &[&str], snippet: &Path) -> Result<String, ReadabilityError> {
        let output = Command::new("java")
            .args(args)
            .arg(snippet)
            .current_dir(&self.model_dir)
            .output()
            .map_err(|e| ReadabilityError::Scoring {
                snippet: snippet.to_path_buf(),
                reason: format!("failed to spawn scoring engine: {e}"),
            })?;

        if !output.status.success() {
            return Err(ReadabilityError::Scoring {
                snippet: snippet.to_path_buf(),
                reason: format!(
                    "engine exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn score_snippet_file(&self, snippet: &Path) -> Result<f64, ReadabilityError> {
        let stdout = self.run_model(&["-jar", "RSE.jar"], snippet)?;
        parse_score_output(&stdout, snippet)
    }

    fn extract_metrics(
        &self,
        snippet: &Path,
    ) -> Result<std::collections::BTreeMap<String, f64>, ReadabilityError> {
        let stdout = self
            .run_model(&["-cp", "RSE.jar", METRICS_CLASS], snippet)
            .map_err(|e| match e {
                // spawn/exit problems during extraction are metrics failures,
                // not scoring failures
                ReadabilityError::Scoring { snippet, reason } => {
                    ReadabilityError::Metrics { snippet, reason }
                }
                other => other,
            })?;
        parse_metrics_output(&stdout, snippet)
    }
}

impl ScoringBackend for RseEngine {
    fn score_code(&self, code: &str, is_whole_unit: bool) -> Result<ScoreResult, ReadabilityError> {
        let hint = if is_whole_unit {
            ScopeKind::File
        } else {
            ScopeKind::MethodBody
        };
        let snippet = self.write_snippet(&wrap_snippet(code, hint))?;
        let score = self.score_snippet_file(snippet.path())?;
        Ok(ScoreResult::new(score))
    }

    fn score_with_metrics(
        &self,
        code: &str,
        hint: ScopeKind,
    ) -> Result<ScoreResult, ReadabilityError> {
        let snippet = self.write_snippet(&wrap_snippet(code, hint))?;
        let score = self.score_snippet_file(snippet.path())?;
        let metrics = self.extract_metrics(snippet.path())?;
        Ok(ScoreResult::new(score).with_metrics(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_units_are_sent_bare() {
        let code = "public class A {}";
        assert_eq!(wrap_snippet(code, ScopeKind::File), code);
    }

    #[test]
    fn methods_get_a_synthetic_class() {
        let wrapped = wrap_snippet("int f() { return 1; }", ScopeKind::Method);
        assert!(wrapped.starts_with("public class Snippet {"));
        assert!(wrapped.contains("int f() { return 1; }"));
        assert!(!wrapped.contains("static void main"));
    }

    #[test]
    fn statement_blocks_get_method_and_class() {
        let wrapped = wrap_snippet("int x = 1;", ScopeKind::If);
        assert!(wrapped.starts_with("public class Snippet {"));
        assert!(wrapped.contains("public static void main(String[] args) {"));
        assert!(wrapped.contains("int x = 1;"));
    }

    #[test]
    fn missing_model_jar_is_reported_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let err = RseEngine::new(dir.path()).unwrap_err();
        assert!(matches!(err, ReadabilityError::EngineUnavailable(_)));
    }
}
