use serde::{Deserialize, Serialize};

/// An inclusive 0-based line range inside a [`SourceBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    /// Clamps the region into a buffer of `buffer_len` lines.
    ///
    /// Returns `None` when no valid region survives (empty buffer, or the
    /// region lies entirely past the end).
    pub fn clamp_to(self, buffer_len: usize) -> Option<Region> {
        if buffer_len == 0 || self.start >= buffer_len || self.end < self.start {
            return None;
        }
        Some(Region {
            start: self.start,
            end: self.end.min(buffer_len - 1),
        })
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 1-based for display, matching scanner line numbers
        write!(f, "lines {}-{}", self.start + 1, self.end + 1)
    }
}

/// Scanned source held as an ordered sequence of lines.
///
/// Buffers are never edited in place: the patch core returns a new buffer
/// and leaves the input intact, so a caller can diff or undo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    lines: Vec<String>,
}

impl SourceBuffer {
    pub fn from_source(source: &str) -> Self {
        if source.is_empty() {
            return Self { lines: Vec::new() };
        }
        Self {
            lines: source.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Joins the buffer back into one source string.
    pub fn to_source(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source_splits_lines() {
        let buffer = SourceBuffer::from_source("a\nb\nc");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.line(1), Some("b"));
        assert_eq!(buffer.line(3), None);
    }

    #[test]
    fn test_from_source_keeps_trailing_newline_as_empty_line() {
        let buffer = SourceBuffer::from_source("a\nb\n");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.line(2), Some(""));
    }

    #[test]
    fn test_empty_source_is_empty_buffer() {
        let buffer = SourceBuffer::from_source("");
        assert!(buffer.is_empty());
        assert_eq!(buffer.to_source(), "");
    }

    #[test]
    fn test_roundtrip() {
        let source = "fn main() {\n    println!(\"hi\");\n}";
        assert_eq!(SourceBuffer::from_source(source).to_source(), source);
    }

    #[test]
    fn test_region_len_and_contains() {
        let region = Region::new(2, 5);
        assert_eq!(region.len(), 4);
        assert!(region.contains(2));
        assert!(region.contains(5));
        assert!(!region.contains(6));
    }

    #[test]
    fn test_region_clamp_within_bounds() {
        assert_eq!(Region::new(2, 5).clamp_to(10), Some(Region::new(2, 5)));
    }

    #[test]
    fn test_region_clamp_truncates_end() {
        assert_eq!(Region::new(2, 50).clamp_to(10), Some(Region::new(2, 9)));
    }

    #[test]
    fn test_region_clamp_rejects_invalid() {
        assert_eq!(Region::new(2, 5).clamp_to(0), None);
        assert_eq!(Region::new(12, 15).clamp_to(10), None);
        assert_eq!(Region::new(5, 2).clamp_to(10), None);
    }
}
