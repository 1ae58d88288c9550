//! Tagged spans and the content segments they are made of.

use serde::Serialize;

use super::attributes::Attributes;
use super::location::Location;

/// The three tag kinds of the citation vocabulary.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Quote,
    Author,
    Title,
}

impl SpanKind {
    pub const ALL: [SpanKind; 3] = [SpanKind::Quote, SpanKind::Author, SpanKind::Title];

    /// Tag name as written in the markup.
    #[must_use]
    pub fn tag_name(self) -> &'static str {
        match self {
            SpanKind::Quote => "quote",
            SpanKind::Author => "author",
            SpanKind::Title => "title",
        }
    }

    /// Recognise a tag name. Names are case-sensitive.
    #[must_use]
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "quote" => Some(SpanKind::Quote),
            "author" => Some(SpanKind::Author),
            "title" => Some(SpanKind::Title),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// The `type` qualifier of a span.
///
/// Which values are legal depends on the kind, see [`SpanType::allowed_for`].
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanType {
    /// Quote that may be the commentator's own verse rather than a citation.
    PossiblyAuthorial,
    /// Title naming a genre or class of works rather than a single work.
    Generic,
    /// Title naming a chapter of a work.
    Chapter,
    /// Author who speaks within the cited text rather than composing it.
    Speaker,
}

impl SpanType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SpanType::PossiblyAuthorial => "possiblyauthorial",
            SpanType::Generic => "generic",
            SpanType::Chapter => "chapter",
            SpanType::Speaker => "speaker",
        }
    }

    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "possiblyauthorial" => Some(SpanType::PossiblyAuthorial),
            "generic" => Some(SpanType::Generic),
            "chapter" => Some(SpanType::Chapter),
            "speaker" => Some(SpanType::Speaker),
            _ => None,
        }
    }

    #[must_use]
    pub fn allowed_for(self, kind: SpanKind) -> bool {
        matches!(
            (kind, self),
            (SpanKind::Quote, SpanType::PossiblyAuthorial)
                | (SpanKind::Title, SpanType::Generic | SpanType::Chapter)
                | (SpanKind::Author, SpanType::Speaker)
        )
    }
}

impl std::fmt::Display for SpanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a span in its document's span arena (opening order).
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SpanIndex(pub usize);

impl std::fmt::Display for SpanIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a span came to an end.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Closure {
    /// Closed by its own `</kind>` tag.
    Explicit,
    /// Closed by recovery: an outer close tag or the end of the sample.
    Implicit,
}

/// A tagged region of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Span {
    pub index: SpanIndex,
    pub kind: SpanKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub span_type: Option<SpanType>,
    pub attributes: Attributes,
    pub content: Vec<Segment>,
    /// Inner text with all nested tags stripped.
    pub text: String,
    /// The inner source text, nested tags included.
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<SpanIndex>,
    pub closure: Closure,
    /// From the `<` of the open tag to the `>` of the close tag.
    pub location: Location,
    /// Between the open tag and the close tag.
    pub inner_location: Location,
}

impl Span {
    #[must_use]
    pub fn is_quote(&self) -> bool {
        self.kind == SpanKind::Quote
    }

    #[must_use]
    pub fn is_possibly_authorial(&self) -> bool {
        self.span_type == Some(SpanType::PossiblyAuthorial)
    }

    /// Child spans, in order.
    pub fn children(&self) -> impl Iterator<Item = SpanIndex> + '_ {
        self.content.iter().filter_map(|segment| match segment {
            Segment::Span(index) => Some(*index),
            Segment::Text(_) | Segment::Unparsed(_) => None,
        })
    }

    /// Human-readable label used in messages: `quote "q1"` or `quote #3`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("{} \"{id}\"", self.kind),
            None => format!("{} {}", self.kind, self.index),
        }
    }
}

/// One piece of ordered content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "segment", rename_all = "lowercase")]
pub enum Segment {
    Text(TextRun),
    /// A span, stored in the document's arena.
    Span(SpanIndex),
    /// Markup that could not be tokenized or placed, kept verbatim.
    Unparsed(Unparsed),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub content: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unparsed {
    pub raw: String,
    pub location: Location,
}
