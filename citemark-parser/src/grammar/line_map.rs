use unicode_segmentation::UnicodeSegmentation;

use crate::model::{Location, Position};

/// Pre-calculated line position map for efficient offset-to-position conversion.
///
/// `LineMap` scans the input once to build a sorted list of line start offsets,
/// then provides O(log n) binary search lookups for any byte offset.
///
/// Columns are counted in extended grapheme clusters: Sanskrit in IAST is often
/// written with combining diacritics (`a` + U+0304) and a column must not land
/// between a letter and its mark.
#[derive(Debug, Clone)]
pub(crate) struct LineMap {
    /// Byte offsets where each line starts in the input
    line_starts: Vec<usize>,
}

impl LineMap {
    pub(crate) fn new(input: &str) -> Self {
        let mut line_starts = vec![0];

        for (offset, ch) in input.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }

        Self { line_starts }
    }

    /// Convert byte offset to Position using binary search.
    pub(crate) fn offset_to_position(&self, offset: usize, input: &str) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line_idx) => line_idx + 1,
            Err(line_idx) => line_idx,
        };

        let line_start_byte = self
            .line_starts
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or(0);

        // Round offsets inside a multi-byte character back to its start.
        let adjusted_offset = if offset > input.len() {
            input.len()
        } else if input.is_char_boundary(offset) {
            offset
        } else {
            (0..=offset)
                .rev()
                .find(|&i| input.is_char_boundary(i))
                .unwrap_or(0)
        };

        let graphemes_in_line = input
            .get(line_start_byte..adjusted_offset)
            .map_or(0, |s| s.graphemes(true).count());

        Position {
            line,
            column: graphemes_in_line + 1,
        }
    }

    pub(crate) fn location(&self, start: usize, end: usize, input: &str) -> Location {
        Location::new(
            start,
            end,
            self.offset_to_position(start, input),
            self.offset_to_position(end, input),
        )
    }
}
