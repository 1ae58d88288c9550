use serde::{
    Serialize,
    ser::{SerializeStruct, Serializer},
};

/// A `Location` represents a region of a sample.
///
/// Byte offsets are half-open: `absolute_start` is the first byte of the region and
/// `absolute_end` is one past its last byte, so `&input[start..end]` is the region.
#[derive(Debug, Default, Clone, Hash, Eq, PartialEq)]
#[non_exhaustive]
pub struct Location {
    /// The absolute start offset (inclusive) in bytes.
    pub absolute_start: usize,
    /// The absolute end offset (exclusive) in bytes.
    pub absolute_end: usize,

    /// The start position of the location.
    pub start: Position,
    /// The end position of the location.
    pub end: Position,
}

impl Location {
    #[must_use]
    pub fn new(absolute_start: usize, absolute_end: usize, start: Position, end: Position) -> Self {
        Self {
            absolute_start,
            absolute_end,
            start,
            end,
        }
    }

    /// Check that the location can be used to slice `input`: the range is ordered,
    /// in bounds, and both ends fall on character boundaries.
    ///
    /// # Errors
    /// A description of the first broken condition.
    pub fn validate(&self, input: &str) -> Result<(), String> {
        let (start, end) = (self.absolute_start, self.absolute_end);
        if start > end {
            Err(format!("range {start}..{end} is reversed"))
        } else if end > input.len() {
            Err(format!("range {start}..{end} ends past the input ({} bytes)", input.len()))
        } else if !input.is_char_boundary(start) || !input.is_char_boundary(end) {
            Err(format!("range {start}..{end} splits a character"))
        } else {
            Ok(())
        }
    }

    /// The slice of `input` covered by this location, if it is in bounds.
    #[must_use]
    pub fn slice<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.absolute_start..self.absolute_end)
    }

    /// Number of bytes covered by this location.
    #[must_use]
    pub fn len(&self) -> usize {
        self.absolute_end.saturating_sub(self.absolute_start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shift this location so that it is relative to the start of an enclosing text
    /// instead of the start of the sample.
    ///
    /// `byte_offset` is where the sample begins in the enclosing text and `line` is the
    /// 1-indexed line the sample starts on. Columns are untouched except on the first
    /// line of the sample, which never happens for samples split on whole lines.
    pub fn shift(&mut self, byte_offset: usize, line: usize) {
        self.absolute_start += byte_offset;
        self.absolute_end += byte_offset;
        self.start.line += line.saturating_sub(1);
        self.end.line += line.saturating_sub(1);
    }
}

// Locations serialize as `{"start": {...}, "end": {...}, "offsets": [start, end]}` so
// consumers get both human-readable positions and byte offsets.
impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Location", 3)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end)?;
        state.serialize_field("offsets", &[self.absolute_start, self.absolute_end])?;
        state.end()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "location.start({}), location.end({})",
            self.start, self.end
        )
    }
}

/// A `Position` represents a human-readable position in a sample.
///
/// This is purely for display/error reporting purposes. For byte offsets,
/// use `Location.absolute_start` and `Location.absolute_end`.
#[derive(Debug, Default, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Position {
    /// The line number of the position (1-indexed).
    pub line: usize,
    /// The column number of the position (1-indexed, counted in extended grapheme
    /// clusters so that `ā` written as `a` + combining macron is one column).
    #[serde(rename = "col")]
    pub column: usize,
}

impl Position {
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line: {}, column: {}", self.line, self.column)
    }
}
