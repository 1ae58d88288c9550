use serde::Serialize;

use crate::model::{Location, Position, ReferenceSlot, SpanIndex, SpanKind};

/// How bad a finding is.
///
/// Errors mean the sample needs a manual fix before its data can be trusted; warnings
/// mean the data is usable but should be reviewed.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Lexical problems found while scanning a tag.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("unknown tag <{0}>")]
    UnknownTag(String),

    #[error("attribute '{0}' has no value")]
    MissingAttributeValue(String),

    #[error("value of attribute '{0}' is not quoted")]
    UnquotedAttributeValue(String),

    #[error("value of attribute '{0}' is never closed")]
    UnterminatedAttributeValue(String),

    #[error("unexpected character '{0}' inside tag")]
    UnexpectedCharacter(char),

    #[error("tag is never closed with '>'")]
    UnterminatedTag,

    #[error("self-closing tags are not part of the vocabulary")]
    SelfClosingTag,

    #[error("closing tag cannot carry attributes")]
    AttributesOnClosingTag,
}

/// Every problem the parser, resolver and validator can report.
///
/// The `Display` output is the finding's message.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    #[error("malformed markup: {0}")]
    Token(#[from] TokenError),

    #[error("<{kind}> tag has no id attribute")]
    MissingId { kind: SpanKind },

    #[error("closing tag </{closing}> does not match the innermost open tag <{innermost}>")]
    MismatchedTag {
        closing: SpanKind,
        innermost: SpanKind,
    },

    #[error("closing tag </{kind}> has no matching open tag")]
    UnmatchedClose { kind: SpanKind },

    #[error("{span} is never closed")]
    UnclosedTag { span: String },

    #[error("{span} was closed implicitly by </{by}>")]
    ImplicitClose { span: String, by: SpanKind },

    #[error("duplicate {kind} id \"{id}\": span {second} at {second_position} repeats span {first} at {first_position}")]
    DuplicateId {
        kind: SpanKind,
        id: String,
        first: SpanIndex,
        first_position: Position,
        second: SpanIndex,
        second_position: Position,
    },

    #[error("{quote} refers to {slot}=\"{target}\" but no {target_kind} with that id is declared")]
    DanglingReference {
        quote: String,
        slot: ReferenceSlot,
        target: String,
        target_kind: SpanKind,
    },

    #[error("{inner} is nested inside {outer}")]
    NestedQuote { inner: String, outer: String },

    #[error("unknown attribute '{name}' on <{kind}>")]
    UnknownAttribute { kind: SpanKind, name: String },

    #[error("attribute '{name}' repeated on <{kind}>: keeping \"{kept}\", ignoring \"{ignored}\"")]
    DuplicateAttribute {
        kind: SpanKind,
        name: String,
        kept: String,
        ignored: String,
    },

    #[error("attribute '{name}' is only meaningful on <quote>, not <{kind}>")]
    AttributeNotAllowed { kind: SpanKind, name: String },

    #[error("invalid type \"{value}\" for <{kind}>")]
    InvalidTypeValue { kind: SpanKind, value: String },

    #[error("<{kind}> declares the reserved id \"ROOT\"")]
    ReservedId { kind: SpanKind },

    #[error("{quote} names author \"{author}\" in both authorid and authorid2")]
    IdenticalAuthors { quote: String, author: String },

    #[error("sample has {chars} characters, over the limit of {limit}")]
    OversizedSample { chars: usize, limit: usize },
}

impl FindingKind {
    /// Stable identifier for filtering and machine-readable output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Token(_) => "token-error",
            Self::MissingId { .. } => "missing-id",
            Self::MismatchedTag { .. } => "mismatched-tag",
            Self::UnmatchedClose { .. } => "unmatched-close",
            Self::UnclosedTag { .. } => "unclosed-tag",
            Self::ImplicitClose { .. } => "implicit-close",
            Self::DuplicateId { .. } => "duplicate-id",
            Self::DanglingReference { .. } => "dangling-reference",
            Self::NestedQuote { .. } => "nested-quote",
            Self::UnknownAttribute { .. } => "unknown-attribute",
            Self::DuplicateAttribute { .. } => "duplicate-attribute",
            Self::AttributeNotAllowed { .. } => "attribute-not-allowed",
            Self::InvalidTypeValue { .. } => "invalid-type-value",
            Self::ReservedId { .. } => "reserved-id",
            Self::IdenticalAuthors { .. } => "identical-authors",
            Self::OversizedSample { .. } => "oversized-sample",
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Token(_)
            | Self::MissingId { .. }
            | Self::MismatchedTag { .. }
            | Self::UnmatchedClose { .. }
            | Self::UnclosedTag { .. }
            | Self::DuplicateId { .. } => Severity::Error,
            Self::ImplicitClose { .. }
            | Self::DanglingReference { .. }
            | Self::NestedQuote { .. }
            | Self::UnknownAttribute { .. }
            | Self::DuplicateAttribute { .. }
            | Self::AttributeNotAllowed { .. }
            | Self::InvalidTypeValue { .. }
            | Self::ReservedId { .. }
            | Self::IdenticalAuthors { .. }
            | Self::OversizedSample { .. } => Severity::Warning,
        }
    }

    /// Get advice for this finding if available.
    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Self::MissingId { .. } => {
                Some("Every <quote>, <author> and <title> needs an id, e.g. <quote id=\"q1\">")
            }
            Self::MismatchedTag { .. } | Self::UnclosedTag { .. } => {
                Some("Close inner tags before outer ones, e.g. <author><title></title></author>")
            }
            Self::DuplicateId { .. } => Some(
                "Ids must be unique per tag kind within a sample; an author and a title may share one",
            ),
            Self::DanglingReference { .. } => Some(
                "Declare the referenced <author>/<title> in the same sample, or use ROOT for the root text",
            ),
            Self::NestedQuote { .. } => {
                Some("Quotations inside quotations are left unmarked by convention")
            }
            Self::InvalidTypeValue { .. } => Some(
                "Valid types are: quote possiblyauthorial, title generic|chapter, author speaker",
            ),
            Self::AttributeNotAllowed { .. } => {
                Some("authorid, authorid2, titleid and chapterid belong on <quote> tags")
            }
            Self::Token(_)
            | Self::UnmatchedClose { .. }
            | Self::ImplicitClose { .. }
            | Self::UnknownAttribute { .. }
            | Self::DuplicateAttribute { .. }
            | Self::ReservedId { .. }
            | Self::IdenticalAuthors { .. }
            | Self::OversizedSample { .. } => None,
        }
    }
}

/// A structured diagnostic.
///
/// Findings never interrupt processing: the document is always built and carries its
/// findings alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Finding {
    pub severity: Severity,
    pub code: &'static str,
    /// Index of the sample in the corpus (0 for a sample parsed on its own).
    pub sample: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SpanIndex>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip)]
    pub kind: FindingKind,
}

impl Finding {
    #[must_use]
    pub fn new(kind: FindingKind) -> Self {
        Self {
            severity: kind.severity(),
            code: kind.code(),
            sample: 0,
            span_id: None,
            span: None,
            message: kind.to_string(),
            location: None,
            kind,
        }
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn on_span(mut self, index: SpanIndex, id: Option<&str>) -> Self {
        self.span = Some(index);
        self.span_id = id.map(ToString::to_string);
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        self.kind.advice()
    }

    /// Byte offset used to order findings. Sample-level findings have none and sort
    /// first.
    pub(crate) fn sort_key(&self) -> Option<usize> {
        self.location.as_ref().map(|location| location.absolute_start)
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "{}[{}] sample {}, {}: {}",
                self.severity, self.code, self.sample, location.start, self.message
            ),
            None => write!(
                f,
                "{}[{}] sample {}: {}",
                self.severity, self.code, self.sample, self.message
            ),
        }
    }
}
