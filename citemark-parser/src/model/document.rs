use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::{Finding, registry::Registry};

use super::{
    reference::ReferenceEdge,
    span::{Segment, Span, SpanIndex},
};

/// One parsed sample.
///
/// The document owns its spans, its registry and its reference graph. It is built
/// once by [`crate::parse`] and only read afterwards; the query methods live in
/// `query.rs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Document {
    /// Index of the sample in its corpus.
    pub sample: usize,
    #[serde(skip)]
    pub source: String,
    /// Top-level content in source order.
    pub content: Vec<Segment>,
    /// Every span, in the order its open tag appears.
    pub spans: Vec<Span>,
    #[serde(skip)]
    pub registry: Registry,
    pub references: ReferenceGraph,
    /// Ordered by position in the sample, sample-level findings first.
    pub findings: Vec<Finding>,
}

/// The reference edges of a document with both directions indexed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceGraph {
    edges: Vec<ReferenceEdge>,
    #[serde(skip)]
    outgoing: FxHashMap<SpanIndex, Vec<usize>>,
    #[serde(skip)]
    incoming: FxHashMap<SpanIndex, Vec<SpanIndex>>,
}

impl ReferenceGraph {
    pub(crate) fn new(edges: Vec<ReferenceEdge>) -> Self {
        let mut outgoing: FxHashMap<SpanIndex, Vec<usize>> = FxHashMap::default();
        let mut incoming: FxHashMap<SpanIndex, Vec<SpanIndex>> = FxHashMap::default();
        for (position, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.source).or_default().push(position);
            if let Some(target) = edge.reference.resolved() {
                let sources = incoming.entry(target).or_default();
                // a quote naming the same author twice still cites it once
                if sources.last() != Some(&edge.source) {
                    sources.push(edge.source);
                }
            }
        }
        Self {
            edges,
            outgoing,
            incoming,
        }
    }

    /// All edges, grouped by quote in document order.
    #[must_use]
    pub fn edges(&self) -> &[ReferenceEdge] {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges leaving a quote.
    pub fn outgoing(&self, source: SpanIndex) -> impl Iterator<Item = &ReferenceEdge> {
        self.outgoing
            .get(&source)
            .into_iter()
            .flatten()
            .filter_map(|position| self.edges.get(*position))
    }

    /// Quotes whose references resolve to `target`.
    #[must_use]
    pub fn incoming(&self, target: SpanIndex) -> &[SpanIndex] {
        self.incoming.get(&target).map_or(&[], Vec::as_slice)
    }
}
