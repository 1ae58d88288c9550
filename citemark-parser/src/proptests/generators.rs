//! Input generators for property-based testing.
#![allow(clippy::expect_used)]
use proptest::prelude::*;

use crate::SpanKind;

/// Any string at all.
pub fn any_sample() -> impl Strategy<Value = String> {
    prop::string::string_regex(".*").expect("Failed to create any string strategy")
}

/// Prose the way the corpus writes it: IAST with precomposed and combining
/// diacritics, Devanagari, punctuation and line breaks. Never contains `<` or `"`.
pub fn prose() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("iti"),
            Just(" "),
            Just("\n"),
            Just("ācārya"),
            Just("kṛṣṇa"),
            Just("a\u{304}"),
            Just("i\u{301}"),
            Just("धर्म"),
            Just("।"),
            Just("."),
            Just(">"),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

fn kind() -> impl Strategy<Value = SpanKind> {
    prop_oneof![
        Just(SpanKind::Quote),
        Just(SpanKind::Author),
        Just(SpanKind::Title),
    ]
}

/// Tags written canonically (`name="value"`, one space apart) in arbitrary and
/// often broken order: unclosed, mismatched, stray close tags, unknown tags.
pub fn canonical_chunks() -> impl Strategy<Value = String> {
    let chunk = prop_oneof![
        prose(),
        (kind(), 0..4_usize).prop_map(|(kind, n)| format!(r#"<{kind} id="{kind}{n}">"#)),
        kind().prop_map(|kind| format!("</{kind}>")),
        (0..3_usize, 0..3_usize).prop_map(|(q, a)| {
            format!(r#"<quote id="q{q}" authorid="a{a}" titleid="ROOT">"#)
        }),
        Just(r#"<title id="t0" type="generic">"#.to_string()),
        Just("<verse>".to_string()),
        Just("<quote>".to_string()),
        Just(r#"<author id="x"#.to_string()),
    ];
    prop::collection::vec(chunk, 0..16).prop_map(|chunks| chunks.concat())
}

/// Well-formed samples: every tag closed, ids unique per kind, no references.
pub fn well_formed() -> impl Strategy<Value = String> {
    prop::collection::vec((kind(), prose(), prose()), 0..10).prop_map(|spans| {
        spans
            .into_iter()
            .enumerate()
            .map(|(n, (kind, before, inner))| {
                format!(r#"{before}<{kind} id="{kind}{n}">{inner}</{kind}>"#)
            })
            .collect()
    })
}
