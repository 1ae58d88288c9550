//! Read-only queries over a parsed [`Document`].

use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Document, Finding, Severity,
    model::{
        Reference, ReferenceEdge, ReferenceSlot, Segment, Span, SpanIndex, SpanKind, SpanType,
        attributes,
    },
};

impl Document {
    /// The span registered under `(kind, id)`.
    #[must_use]
    pub fn lookup(&self, kind: SpanKind, id: &str) -> Option<&Span> {
        self.registry
            .get(kind, id)
            .and_then(|index| self.span(index))
    }

    #[must_use]
    pub fn span(&self, index: SpanIndex) -> Option<&Span> {
        self.spans.get(index.0)
    }

    pub fn spans_of_kind(&self, kind: SpanKind) -> impl Iterator<Item = &Span> {
        self.spans.iter().filter(move |span| span.kind == kind)
    }

    /// Enclosing spans, innermost first.
    pub fn ancestors(&self, index: SpanIndex) -> impl Iterator<Item = &Span> {
        std::iter::successors(
            self.span(index)
                .and_then(|span| span.parent)
                .and_then(|parent| self.span(parent)),
            |span| span.parent.and_then(|parent| self.span(parent)),
        )
    }

    /// Reference edges leaving the quote with this id.
    pub fn outgoing(&self, quote_id: &str) -> impl Iterator<Item = &ReferenceEdge> {
        self.registry
            .get(SpanKind::Quote, quote_id)
            .into_iter()
            .flat_map(|index| self.references.outgoing(index))
    }

    /// Quotes citing the author or title with this id.
    pub fn incoming(&self, kind: SpanKind, id: &str) -> impl Iterator<Item = &Span> {
        self.registry
            .get(kind, id)
            .into_iter()
            .flat_map(|index| self.references.incoming(index))
            .filter_map(|index| self.span(*index))
    }

    /// Quotes flagged `type="possiblyauthorial"`. They stay in the citation graph.
    pub fn possibly_authorial_quotes(&self) -> impl Iterator<Item = &Span> {
        self.spans_of_kind(SpanKind::Quote)
            .filter(|quote| quote.is_possibly_authorial())
    }

    /// Quotes whose primary or secondary author is a `type="speaker"` author.
    pub fn quotes_with_speaker_author(&self) -> impl Iterator<Item = &Span> {
        self.spans_of_kind(SpanKind::Quote).filter(|quote| {
            self.references.outgoing(quote.index).any(|edge| {
                edge.slot.target_kind() == SpanKind::Author
                    && edge
                        .reference
                        .resolved()
                        .and_then(|index| self.span(index))
                        .is_some_and(|author| author.span_type == Some(SpanType::Speaker))
            })
        })
    }

    pub fn dangling_references(&self) -> impl Iterator<Item = &ReferenceEdge> {
        self.references
            .edges()
            .iter()
            .filter(|edge| edge.reference.is_dangling())
    }

    pub fn root_references(&self) -> impl Iterator<Item = &ReferenceEdge> {
        self.references
            .edges()
            .iter()
            .filter(|edge| edge.reference.is_root())
    }

    /// Quotes carrying both `authorid` and `authorid2`, resolved or not.
    pub fn quotes_with_two_authors(&self) -> impl Iterator<Item = &Span> {
        self.spans_of_kind(SpanKind::Quote).filter(|quote| {
            quote.attributes.contains_key(attributes::AUTHOR_ID)
                && quote.attributes.contains_key(attributes::AUTHOR_ID2)
        })
    }

    /// What one slot of a quote points at.
    #[must_use]
    pub fn reference(&self, quote: SpanIndex, slot: ReferenceSlot) -> Option<&Reference> {
        self.references
            .outgoing(quote)
            .find(|edge| edge.slot == slot)
            .map(|edge| &edge.reference)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Warning)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Whether the sample tags at least one quotation (a positive example).
    #[must_use]
    pub fn has_quotes(&self) -> bool {
        self.spans.iter().any(Span::is_quote)
    }

    /// The sample text with every tag stripped. Markup that could not be parsed is
    /// dropped as well.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut text = String::with_capacity(self.source.len());
        let mut pending: Vec<std::slice::Iter<'_, Segment>> = vec![self.content.iter()];
        while let Some(segments) = pending.last_mut() {
            match segments.next() {
                Some(Segment::Text(run)) => text.push_str(&run.content),
                Some(Segment::Span(index)) => {
                    if let Some(span) = self.span(*index) {
                        pending.push(span.content.iter());
                    }
                }
                Some(Segment::Unparsed(_)) => {}
                None => {
                    pending.pop();
                }
            }
        }
        text
    }

    /// Length of the raw sample in characters.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// The first word of the plain text, lowercased.
    #[must_use]
    pub fn first_word(&self) -> Option<String> {
        self.plain_text()
            .unicode_words()
            .next()
            .map(str::to_lowercase)
    }
}
