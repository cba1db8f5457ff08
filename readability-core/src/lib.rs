//! Readability core library - scope trees and cached readability rating for Java

// Global invariants enforced in this crate:
// - The scope tree is immutable once built and rebuilt wholesale per parse
// - A rating pass is all-or-nothing; no partial results are published
// - Scores are pure functions of exact code text
// - Identical input yields identical output

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod improve;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod scope;
pub mod score;
pub mod span;

pub use cache::ScoreCache;
pub use config::{ReadabilityConfig, ResolvedConfig};
pub use engine::{RseEngine, ScoringBackend};
pub use error::ReadabilityError;
pub use improve::{rank_improvements, Improvement};
pub use parser::{parse_java, NodeKind, ParsedFile};
pub use pipeline::{rate_methods, RatedScope, RatingPipeline};
pub use report::{render_json, render_text, sort_reports, MethodRatingReport, RatingBand};
pub use scope::{ScopeKind, ScopeNode, ScopeTree};
pub use score::ScoreResult;

use anyhow::{Context, Result};

/// Returns true for directory names that should not be traversed
fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.')
        || name == "target"
        || name == "build"
        || name == "out"
        || name == "generated"
        || name == "node_modules"
}

/// Collect all Java source files from a path (file or directory)
pub fn collect_java_files(path: &std::path::Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        if path.extension().and_then(|e| e.to_str()) == Some("java") {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        collect_java_files_recursive(path, &mut files)?;
    }

    // Sort files for deterministic order
    files.sort();

    Ok(files)
}

fn collect_java_files_recursive(
    dir: &std::path::Path,
    files: &mut Vec<std::path::PathBuf>,
) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;

        if metadata.is_symlink() {
            continue;
        }
        if metadata.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if is_skipped_dir(name) {
                    continue;
                }
            }
            collect_java_files_recursive(&path, files)?;
        } else if metadata.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some("java")
        {
            files.push(path);
        }
    }

    Ok(())
}
