//! The document model: spans, their attributes, the cross-references between them and
//! where everything sits in the source.

pub mod attributes;
mod document;
mod location;
mod reference;
mod span;

pub use attributes::{Attribute, AttributeName, Attributes};
pub use document::{Document, ReferenceGraph};
pub use location::{Location, Position};
pub use reference::{Reference, ReferenceEdge, ReferenceSlot};
pub use span::{Closure, Segment, Span, SpanIndex, SpanKind, SpanType, TextRun, Unparsed};
