//! Parser invariant tests using property-based testing
//!
//! - P0: critical invariants (never panics, locations sliceable)
//! - P1: structural invariants (determinism, round trip)
//! - P2: registry invariants on well-formed input

use proptest::prelude::*;

use crate::{Document, Location, Options, Segment, SpanKind, parse};

use super::generators::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    // ====================================================================
    // P0: CRITICAL INVARIANTS
    // ====================================================================

    /// The pipeline never panics, whatever the input.
    #[test]
    fn parser_never_panics(input in any_sample()) {
        let _ = parse(&input, &Options::default());
    }

    /// Every location in the document can be used to slice the input.
    #[test]
    fn locations_on_char_boundaries(input in canonical_chunks()) {
        let document = parse(&input, &Options::default());
        verify_locations(&document, &input);
    }

    #[test]
    fn locations_on_char_boundaries_any_input(input in any_sample()) {
        let document = parse(&input, &Options::default());
        verify_locations(&document, &input);
    }

    // ====================================================================
    // P1: STRUCTURAL INVARIANTS
    // ====================================================================

    /// Parsing the same sample twice gives the same document and findings.
    #[test]
    fn parsing_is_idempotent(input in canonical_chunks()) {
        let options = Options::default();
        prop_assert_eq!(parse(&input, &options), parse(&input, &options));
    }

    /// Canonical markup comes back byte for byte, broken nesting included.
    #[test]
    fn canonical_markup_round_trips(input in canonical_chunks()) {
        let document = parse(&input, &Options::default());
        prop_assert_eq!(document.to_markup(), input);
    }

    /// Top-level segments never overlap and appear in source order.
    #[test]
    fn content_is_ordered(input in canonical_chunks()) {
        let document = parse(&input, &Options::default());
        let mut last_end = 0;
        for segment in &document.content {
            if let Some(location) = segment_location(&document, segment) {
                prop_assert!(location.absolute_start >= last_end);
                last_end = location.absolute_end;
            }
        }
    }

    // ====================================================================
    // P2: REGISTRY INVARIANTS
    // ====================================================================

    /// On well-formed input every span is registered and every id can be looked up.
    #[test]
    fn registry_is_total(input in well_formed()) {
        let options = Options::builder().without_sample_limit().build();
        let document = parse(&input, &options);
        prop_assert!(document.findings.is_empty(), "{:?}", document.findings);
        prop_assert_eq!(document.registry.len(), document.spans.len());
        for kind in SpanKind::ALL {
            for span in document.spans_of_kind(kind) {
                let found = span.id.as_deref().and_then(|id| document.lookup(kind, id));
                prop_assert_eq!(found.map(|s| s.index), Some(span.index));
            }
        }
    }
}

fn segment_location<'a>(document: &'a Document, segment: &'a Segment) -> Option<&'a Location> {
    match segment {
        Segment::Text(run) => Some(&run.location),
        Segment::Unparsed(unparsed) => Some(&unparsed.location),
        Segment::Span(index) => document.span(*index).map(|span| &span.location),
    }
}

fn verify_locations(document: &Document, input: &str) {
    for span in &document.spans {
        verify_location(&span.location, input, "span");
        verify_location(&span.inner_location, input, "span inner");
        for attribute in span.attributes.iter() {
            verify_location(&attribute.location, input, "attribute");
        }
    }
    for segment in document
        .spans
        .iter()
        .flat_map(|span| &span.content)
        .chain(&document.content)
    {
        let location = segment_location(document, segment);
        assert!(location.is_some(), "segment {segment:?} points outside the arena");
        if let Some(location) = location {
            verify_location(location, input, "segment");
        }
    }
    for finding in &document.findings {
        if let Some(location) = &finding.location {
            verify_location(location, input, finding.code);
        }
    }
}

fn verify_location(location: &Location, input: &str, context: &str) {
    let result = location.validate(input);
    assert!(result.is_ok(), "{context} location is invalid: {result:?}");
}
