use crate::{Finding, Location, Options, grammar::LineMap};

#[derive(Debug)]
pub(crate) struct ParserState<'a> {
    pub(crate) input: &'a str,
    pub(crate) line_map: LineMap,
    pub(crate) options: &'a Options,
    /// Findings in emission order; sorted by position once the document is built.
    pub(crate) findings: Vec<Finding>,
}

impl<'a> ParserState<'a> {
    pub(crate) fn new(input: &'a str, options: &'a Options) -> Self {
        Self {
            input,
            line_map: LineMap::new(input),
            options,
            findings: Vec::new(),
        }
    }

    /// Create a Location from raw byte offsets (end exclusive).
    ///
    /// Offsets are clamped to the input and `end` is never before `start`.
    pub(crate) fn create_location(&self, start: usize, end: usize) -> Location {
        let start = start.min(self.input.len());
        let end = end.clamp(start, self.input.len());
        self.line_map.location(start, end, self.input)
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        self.input.get(start..end).unwrap_or_default()
    }

    pub(crate) fn report(&mut self, finding: Finding) {
        tracing::trace!(code = finding.code, message = %finding.message, "finding");
        self.findings.push(finding);
    }
}
