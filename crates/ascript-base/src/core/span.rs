use std::fmt;

/// Position in a source file (0-indexed line and column, LSP compatible)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct TextPosition {
    pub line: u32,
    pub character: u32,
}

/// Half-open range in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TextRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

/// Range tied to a file uri
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextLocation {
    pub uri: String,
    pub range: TextRange,
}

impl TextPosition {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl TextRange {
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self { start, end }
    }

    /// Range spanning both inputs
    pub fn merge(self, other: TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// True when `position` lies within the range (end inclusive, so a
    /// cursor sitting just past the last character still matches)
    pub fn contains(&self, position: TextPosition) -> bool {
        self.start <= position && position <= self.end
    }

    /// True when `other` lies entirely within the range
    pub fn encloses(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl TextLocation {
    pub fn new(uri: impl Into<String>, range: TextRange) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_end_inclusive() {
        let range = TextRange::new(TextPosition::new(1, 2), TextPosition::new(1, 6));
        assert!(range.contains(TextPosition::new(1, 2)));
        assert!(range.contains(TextPosition::new(1, 6)));
        assert!(!range.contains(TextPosition::new(1, 7)));
        assert!(!range.contains(TextPosition::new(0, 4)));
    }

    #[test]
    fn test_merge_spans_both_ranges() {
        let a = TextRange::new(TextPosition::new(0, 0), TextPosition::new(0, 3));
        let b = TextRange::new(TextPosition::new(2, 1), TextPosition::new(2, 5));
        let merged = a.merge(b);
        assert_eq!(merged.start, TextPosition::new(0, 0));
        assert_eq!(merged.end, TextPosition::new(2, 5));
    }

    #[test]
    fn test_encloses() {
        let outer = TextRange::new(TextPosition::new(0, 0), TextPosition::new(5, 0));
        let inner = TextRange::new(TextPosition::new(1, 2), TextPosition::new(3, 4));
        assert!(outer.encloses(inner));
        assert!(!inner.encloses(outer));
    }
}
