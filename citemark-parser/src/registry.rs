//! Identifier registry and reference resolution.
//!
//! Ids are scoped per kind and per sample: an author and a title may share an id, two
//! authors may not, and nothing in one sample can see another sample's ids.

use rustc_hash::FxHashMap;

use crate::{
    Finding, FindingKind,
    model::{
        Reference, ReferenceEdge, ReferenceGraph, ReferenceSlot, Span, SpanIndex, SpanKind,
        attributes::ROOT,
    },
};

/// Declared ids of one sample, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: FxHashMap<SpanKind, FxHashMap<String, SpanIndex>>,
}

impl Registry {
    /// Register every span that declares an id.
    ///
    /// The first span to claim a `(kind, id)` pair keeps it; every later claim is a
    /// `duplicate-id` finding naming both spans. Spans declaring `ROOT` are left out.
    pub(crate) fn build(spans: &[Span], findings: &mut Vec<Finding>) -> Self {
        let mut registry = Self::default();
        for span in spans {
            let Some(id) = span.id.as_deref() else {
                continue;
            };
            if id == ROOT {
                findings.push(
                    Finding::new(FindingKind::ReservedId { kind: span.kind })
                        .on_span(span.index, Some(id))
                        .at(span.location.clone()),
                );
                continue;
            }

            let ids = registry.entries.entry(span.kind).or_default();
            if let Some(first) = ids.get(id).and_then(|first| spans.get(first.0)) {
                tracing::debug!(kind = %span.kind, id, first = %first.index, second = %span.index, "duplicate id");
                findings.push(
                    Finding::new(FindingKind::DuplicateId {
                        kind: span.kind,
                        id: id.to_string(),
                        first: first.index,
                        first_position: first.location.start,
                        second: span.index,
                        second_position: span.location.start,
                    })
                    .on_span(span.index, Some(id))
                    .at(span.location.clone()),
                );
                continue;
            }
            ids.insert(id.to_string(), span.index);
        }
        registry
    }

    /// The span registered under `(kind, id)`.
    #[must_use]
    pub fn get(&self, kind: SpanKind, id: &str) -> Option<SpanIndex> {
        self.entries.get(&kind)?.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, kind: SpanKind, id: &str) -> bool {
        self.get(kind, id).is_some()
    }

    /// Number of registered spans across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(FxHashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered ids of one kind, sorted.
    #[must_use]
    pub fn ids(&self, kind: SpanKind) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .get(&kind)
            .into_iter()
            .flat_map(|ids| ids.keys().map(String::as_str))
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Resolve the reference attributes of every quote.
///
/// Each slot resolves on its own: `ROOT` is a root reference without any lookup, a
/// registered id is resolved, anything else dangles and is reported.
pub(crate) fn resolve(
    spans: &[Span],
    registry: &Registry,
    findings: &mut Vec<Finding>,
) -> ReferenceGraph {
    let mut edges = Vec::new();
    for span in spans.iter().filter(|span| span.is_quote()) {
        for slot in ReferenceSlot::ALL {
            let Some(attribute) = span.attributes.get_attribute(slot.attribute_name()) else {
                continue;
            };
            let target = attribute.value.as_str();
            let reference = if target == ROOT {
                Reference::Root
            } else if let Some(index) = registry.get(slot.target_kind(), target) {
                Reference::Resolved(index)
            } else {
                findings.push(
                    Finding::new(FindingKind::DanglingReference {
                        quote: span.label(),
                        slot,
                        target: target.to_string(),
                        target_kind: slot.target_kind(),
                    })
                    .on_span(span.index, span.id.as_deref())
                    .at(attribute.location.clone()),
                );
                Reference::Dangling(target.to_string())
            };
            edges.push(ReferenceEdge::new(
                span.index,
                slot,
                target,
                reference,
                attribute.location.clone(),
            ));
        }
    }
    tracing::trace!(edges = edges.len(), "resolved references");
    ReferenceGraph::new(edges)
}
