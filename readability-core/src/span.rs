//! Source spans and the per-file line index
//!
//! Global invariants enforced:
//! - Every in-range byte offset maps to exactly one line number
//! - Line numbers are 0-indexed and inclusive on both ends of a span

/// Contiguous region of source code with precomputed line bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    /// Byte offset of the start of the span (inclusive)
    pub start: usize,
    /// Byte offset of the end of the span (exclusive)
    pub end: usize,
    /// Line number of the start (0-indexed)
    pub start_line: usize,
    /// Line number of the end (0-indexed, inclusive)
    pub end_line: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize, start_line: usize, end_line: usize) -> Self {
        SourceSpan {
            start,
            end,
            start_line,
            end_line,
        }
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Number of lines covered by the span
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Check if this span's byte range contains another span
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if this span's line range fully contains the queried line range
    pub fn contains_lines(&self, start_line: usize, end_line: usize) -> bool {
        self.start_line <= start_line && end_line <= self.end_line
    }
}

/// Memoized table of line-start byte offsets for one file text.
///
/// Replaces a linear scan per lookup with a binary search over a sorted
/// offset table built once per parse.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text_len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        LineIndex {
            line_starts,
            text_len: text.len(),
        }
    }

    /// Map a byte offset to the 0-indexed line containing it.
    ///
    /// Offsets past the end of the text clamp to the last line; the newline
    /// byte itself belongs to the line it terminates.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.text_len);
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    /// Number of lines in the indexed text
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
