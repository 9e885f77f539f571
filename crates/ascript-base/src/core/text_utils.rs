use crate::core::span::TextPosition;

/// Precomputed byte offsets of line starts, for converting the byte
/// positions pest reports into line/column positions.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a byte offset to a 0-indexed position.
    pub fn position(&self, offset: usize) -> TextPosition {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        TextPosition {
            line: line as u32,
            character: (offset - self.line_starts[line]) as u32,
        }
    }

    /// Converts a position back to a byte offset, clamping past-the-end
    /// lines to the text length recorded at construction.
    pub fn offset(&self, position: TextPosition, text: &str) -> usize {
        let Some(&line_start) = self.line_starts.get(position.line as usize) else {
            return text.len();
        };
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .copied()
            .unwrap_or(text.len());
        (line_start + position.character as usize).min(line_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at_line_starts_and_middles() {
        let text = "ab\ncd\n\nef";
        let index = LineIndex::new(text);
        assert_eq!(index.position(0), TextPosition::new(0, 0));
        assert_eq!(index.position(1), TextPosition::new(0, 1));
        assert_eq!(index.position(3), TextPosition::new(1, 0));
        assert_eq!(index.position(6), TextPosition::new(2, 0));
        assert_eq!(index.position(8), TextPosition::new(3, 1));
    }

    #[test]
    fn test_offset_round_trip() {
        let text = "line one\nline two\n";
        let index = LineIndex::new(text);
        for offset in [0, 4, 9, 12, text.len() - 1] {
            let position = index.position(offset);
            assert_eq!(index.offset(position, text), offset);
        }
    }
}
