//! Cross-references from quotes to authors and titles.

use serde::Serialize;

use super::attributes;
use super::location::Location;
use super::span::{SpanIndex, SpanKind};

/// The reference attributes a quote may carry.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceSlot {
    /// `authorid`
    Author,
    /// `authorid2`, a second named source for the same citation.
    SecondaryAuthor,
    /// `titleid`
    Title,
    /// `chapterid`, a title standing for a chapter of the cited work.
    Chapter,
}

impl ReferenceSlot {
    pub const ALL: [ReferenceSlot; 4] = [
        ReferenceSlot::Author,
        ReferenceSlot::SecondaryAuthor,
        ReferenceSlot::Title,
        ReferenceSlot::Chapter,
    ];

    #[must_use]
    pub fn attribute_name(self) -> &'static str {
        match self {
            ReferenceSlot::Author => attributes::AUTHOR_ID,
            ReferenceSlot::SecondaryAuthor => attributes::AUTHOR_ID2,
            ReferenceSlot::Title => attributes::TITLE_ID,
            ReferenceSlot::Chapter => attributes::CHAPTER_ID,
        }
    }

    #[must_use]
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.attribute_name() == name)
    }

    /// Kind of span the slot points at.
    #[must_use]
    pub fn target_kind(self) -> SpanKind {
        match self {
            ReferenceSlot::Author | ReferenceSlot::SecondaryAuthor => SpanKind::Author,
            ReferenceSlot::Title | ReferenceSlot::Chapter => SpanKind::Title,
        }
    }
}

impl std::fmt::Display for ReferenceSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.attribute_name())
    }
}

/// What a reference attribute points at.
///
/// `Root` is not a failed lookup: it is the commentary's own root text, found by
/// position rather than by id.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize)]
#[serde(tag = "reference", content = "target", rename_all = "lowercase")]
pub enum Reference {
    Resolved(SpanIndex),
    Root,
    Dangling(String),
}

impl Reference {
    #[must_use]
    pub fn is_dangling(&self) -> bool {
        matches!(self, Reference::Dangling(_))
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Reference::Root)
    }

    #[must_use]
    pub fn resolved(&self) -> Option<SpanIndex> {
        match self {
            Reference::Resolved(index) => Some(*index),
            Reference::Root | Reference::Dangling(_) => None,
        }
    }
}

/// A directed edge from a quote to the span (or root text) one of its attributes names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct ReferenceEdge {
    pub source: SpanIndex,
    pub slot: ReferenceSlot,
    /// The id literal as written.
    pub target_id: String,
    pub reference: Reference,
    /// Where the attribute is written.
    pub location: Location,
}

impl ReferenceEdge {
    #[must_use]
    pub fn new(
        source: SpanIndex,
        slot: ReferenceSlot,
        target_id: impl Into<String>,
        reference: Reference,
        location: Location,
    ) -> Self {
        Self {
            source,
            slot,
            target_id: target_id.into(),
            reference,
            location,
        }
    }
}
