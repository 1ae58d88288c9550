//! Parser, cross-reference resolver and validator for citation markup in Sanskrit
//! commentarial prose.
//!
//! A sample is free-running text annotated with three inline tags:
//!
//! ```text
//! yathoktam <quote id="q1" authorid="a1" titleid="ROOT">dharmakṣetre kurukṣetre</quote>
//! iti <author id="a1">vyāsa</author>
//! ```
//!
//! Parsing never fails. Every sample yields a [`Document`] holding its spans, the
//! registry of declared ids, the resolved reference graph and the list of
//! [`Finding`]s describing whatever was wrong with the markup.
//!
//! ```
//! use citemark_parser::{Options, Reference, ReferenceSlot, parse};
//!
//! let document = parse(
//!     r#"<quote id="q1" authorid="a1" titleid="ROOT">dharmakṣetre</quote>"#,
//!     &Options::default(),
//! );
//!
//! // `a1` is never declared: a warning, not a failure
//! assert_eq!(document.findings.len(), 1);
//! assert_eq!(document.findings[0].code, "dangling-reference");
//!
//! let quote = document.spans[0].index;
//! assert_eq!(document.reference(quote, ReferenceSlot::Title), Some(&Reference::Root));
//! ```
//!
//! Many samples are parsed in parallel with [`parse_corpus`].

mod corpus;
mod error;
mod grammar;
mod markup;
mod model;
mod options;
mod query;
mod registry;
mod validator;

pub use corpus::{Balance, Corpus, CorpusStats, parse_corpus};
pub use error::{Finding, FindingKind, Severity, TokenError};
pub use model::{
    Attribute, AttributeName, Attributes, Closure, Document, Location, Position, Reference,
    ReferenceEdge, ReferenceGraph, ReferenceSlot, Segment, Span, SpanIndex, SpanKind, SpanType,
    TextRun, Unparsed, attributes,
};
pub use options::{DEFAULT_MAX_SAMPLE_CHARS, Options, OptionsBuilder};
pub use registry::Registry;

use grammar::{ParsedSample, ParserState};

/// Parse a single sample.
///
/// Equivalent to [`parse_sample`] with sample number 0.
#[must_use]
pub fn parse(input: &str, options: &Options) -> Document {
    parse_sample(0, input, options)
}

/// Parse one sample of a corpus.
///
/// Runs the whole pipeline: tokenizing and tag parsing, id registration, reference
/// resolution and the validation rules. The findings of all stages are tagged with
/// `sample` and ordered by where they occur.
#[must_use]
#[tracing::instrument(skip(input, options), fields(len = input.len()))]
pub fn parse_sample(sample: usize, input: &str, options: &Options) -> Document {
    let mut state = ParserState::new(input, options);
    let ParsedSample { content, spans } = grammar::parse(&mut state);

    let mut findings = state.findings;
    let registry = Registry::build(&spans, &mut findings);
    let references = registry::resolve(&spans, &registry, &mut findings);

    let mut document = Document {
        sample,
        source: input.to_string(),
        content,
        spans,
        registry,
        references,
        findings,
    };
    let rule_findings = validator::validate(&document, options);
    document.findings.extend(rule_findings);

    for finding in &mut document.findings {
        finding.sample = sample;
    }
    // stable: findings at the same offset stay in emission order
    document.findings.sort_by_key(Finding::sort_key);

    tracing::trace!(
        spans = document.spans.len(),
        findings = document.findings.len(),
        "sample parsed"
    );
    document
}

#[cfg(test)]
mod proptests;
