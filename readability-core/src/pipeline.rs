//! Per-file rating pass: extract method scopes, consult the cache, score
//! misses concurrently, merge, replace the cache
//!
//! Global invariants enforced:
//! - A pass is all-or-nothing: one scoring failure aborts the whole call
//! - Result-to-method pairing is positional, never arrival order
//! - The cache is a value threaded into and out of each pass

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::cache::ScoreCache;
use crate::engine::ScoringBackend;
use crate::error::ReadabilityError;
use crate::parser::{parse_java, NodeKind};
use crate::scope::{ScopeKind, ScopeNode, ScopeTree};
use crate::score::ScoreResult;

/// One method scope paired with its score result.
///
/// An owned projection of the scope node, created fresh every pass even on
/// cache hits (only the `ScoreResult` payload is reused).
#[derive(Debug, Clone)]
pub struct RatedScope {
    method_name: String,
    file: PathBuf,
    code: String,
    start_line: usize,
    end_line: usize,
    has_doc_comment: bool,
    result: ScoreResult,
}

impl RatedScope {
    fn new(tree: &ScopeTree, scope: &ScopeNode, file: &Path, result: ScoreResult) -> Self {
        RatedScope {
            method_name: scope.identifier().unwrap_or("<anonymous>").to_string(),
            file: file.to_path_buf(),
            code: scope.code().to_string(),
            start_line: scope.start_line(),
            end_line: scope.end_line(),
            has_doc_comment: tree.has_doc_comment(scope),
            result,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Start line, 0- or 1-indexed per the caller's request
    pub fn start_line(&self, zero_indexed: bool) -> usize {
        if zero_indexed {
            self.start_line
        } else {
            self.start_line + 1
        }
    }

    /// End line (inclusive), 0- or 1-indexed per the caller's request
    pub fn end_line(&self, zero_indexed: bool) -> usize {
        if zero_indexed {
            self.end_line
        } else {
            self.end_line + 1
        }
    }

    pub fn has_doc_comment(&self) -> bool {
        self.has_doc_comment
    }

    pub fn score(&self) -> f64 {
        self.result.score()
    }

    pub fn result(&self) -> &ScoreResult {
        &self.result
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

/// Rate all methods of one file, reusing `cache` entries where the exact
/// method text is unchanged. Returns the rated scopes in pre-order discovery
/// order together with the replacement cache covering exactly this pass's
/// methods.
pub fn rate_methods<B: ScoringBackend>(
    path: &Path,
    source: &str,
    backend: &B,
    cache: &ScoreCache,
) -> Result<(Vec<RatedScope>, ScoreCache), ReadabilityError> {
    rate_methods_with_workers(path, source, backend, cache, None)
}

pub(crate) fn rate_methods_with_workers<B: ScoringBackend>(
    path: &Path,
    source: &str,
    backend: &B,
    cache: &ScoreCache,
    workers: Option<usize>,
) -> Result<(Vec<RatedScope>, ScoreCache), ReadabilityError> {
    // Fresh tree every pass; no partial reuse of a prior one.
    let parsed = parse_java(source, path)?;
    let tree = ScopeTree::build(&parsed);
    let methods = tree.search(&[NodeKind::Method]);

    if methods.is_empty() {
        return Ok((Vec::new(), ScoreCache::new()));
    }

    // Cache misses, deduplicated to unique texts in first-seen order:
    // byte-identical methods cost exactly one engine call.
    let mut pending: Vec<(&str, ScopeKind)> = Vec::new();
    let mut queued: HashSet<&str> = HashSet::new();
    for method in &methods {
        let code = method.code();
        if cache.get(code).is_none() && queued.insert(code) {
            pending.push((code, method.scope_kind().unwrap_or(ScopeKind::Method)));
        }
    }

    let mut fresh: HashMap<&str, ScoreResult> = HashMap::with_capacity(pending.len());
    if !pending.is_empty() {
        let threads = workers
            .unwrap_or_else(available_parallelism)
            .min(pending.len())
            .max(1);
        // Pool per call, torn down when it drops at the end of this block.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ReadabilityError::Pool(e.to_string()))?;
        let scored: Vec<Result<ScoreResult, ReadabilityError>> = pool.install(|| {
            pending
                .par_iter()
                .map(|(code, kind)| backend.score_with_metrics(code, *kind))
                .collect()
        });
        // Positional pairing: the i-th result belongs to the i-th request.
        for ((code, _), result) in pending.iter().zip(scored) {
            fresh.insert(code, result?);
        }
    }

    // Merge: the new cache covers exactly this pass's methods, so entries
    // for methods that disappeared are dropped here.
    let mut next_cache = ScoreCache::new();
    let mut rated = Vec::with_capacity(methods.len());
    for method in &methods {
        let code = method.code();
        let result = cache
            .get(code)
            .or_else(|| fresh.get(code))
            .cloned()
            .ok_or_else(|| ReadabilityError::Scoring {
                snippet: path.to_path_buf(),
                reason: format!("no score produced for method `{}`", method.name()),
            })?;
        next_cache.insert(code.to_string(), result.clone());
        rated.push(RatedScope::new(&tree, method, path, result));
    }

    Ok((rated, next_cache))
}

/// Orchestrator owning the backend and one score cache per file path.
///
/// If two passes for the same file overlap externally, both read the same
/// prior cache and either may win the replacement; scores are pure functions
/// of code text, so this is benign staleness at worst.
pub struct RatingPipeline<B> {
    backend: B,
    caches: HashMap<PathBuf, ScoreCache>,
    workers: Option<usize>,
}

impl<B: ScoringBackend> RatingPipeline<B> {
    pub fn new(backend: B) -> Self {
        RatingPipeline {
            backend,
            caches: HashMap::new(),
            workers: None,
        }
    }

    /// Cap the per-call worker pool; the pool is still never larger than the
    /// number of uncached methods.
    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Rate all methods of the file at `path`, reading its current text.
    pub fn rate(&mut self, path: &Path) -> Result<Vec<RatedScope>, ReadabilityError> {
        let source =
            std::fs::read_to_string(path).map_err(|e| ReadabilityError::ParseUnavailable {
                file: path.to_path_buf(),
                reason: format!("failed to read file: {e}"),
            })?;
        self.rate_source(path, &source)
    }

    /// Rate `source` as the current content of `path`, threading the stored
    /// cache through the pass and replacing it atomically on success.
    pub fn rate_source(
        &mut self,
        path: &Path,
        source: &str,
    ) -> Result<Vec<RatedScope>, ReadabilityError> {
        let prior = self.caches.get(path).cloned().unwrap_or_default();
        let (rated, next) =
            rate_methods_with_workers(path, source, &self.backend, &prior, self.workers)?;
        if rated.is_empty() {
            // No methods means no-op: keep whatever cache the file had.
            return Ok(rated);
        }
        self.caches.insert(path.to_path_buf(), next);
        Ok(rated)
    }

    /// One-off rating of an arbitrary snippet; no metrics, no cache.
    pub fn rate_snippet(
        &self,
        code: &str,
        is_whole_unit: bool,
    ) -> Result<ScoreResult, ReadabilityError> {
        self.backend.score_code(code, is_whole_unit)
    }

    pub fn cached_entries(&self, path: &Path) -> usize {
        self.caches.get(path).map(ScoreCache::len).unwrap_or(0)
    }
}
