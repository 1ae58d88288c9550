//! Convention rules checked once per resolved document.
//!
//! The parser and the resolver already report what they can see locally. The rules
//! here look at the document as a whole and only ever add warnings.

use crate::{
    Document, Finding, FindingKind, Options,
    model::{SpanKind, attributes},
};

type Rule = fn(&Document, &Options) -> Vec<Finding>;

const RULES: &[(&str, Rule)] = &[
    ("nested-quote", nested_quote),
    ("identical-authors", identical_authors),
    ("oversized-sample", oversized_sample),
];

#[tracing::instrument(level = "trace", skip_all, fields(sample = document.sample))]
pub(crate) fn validate(document: &Document, options: &Options) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (name, rule) in RULES {
        let found = rule(document, options);
        if !found.is_empty() {
            tracing::debug!(rule = name, count = found.len(), "rule matched");
        }
        findings.extend(found);
    }
    findings
}

/// Quotations inside quotations are left unmarked by convention. Reported against
/// the nearest enclosing quote.
fn nested_quote(document: &Document, _options: &Options) -> Vec<Finding> {
    document
        .spans_of_kind(SpanKind::Quote)
        .filter_map(|inner| {
            let outer = document
                .ancestors(inner.index)
                .find(|ancestor| ancestor.is_quote())?;
            Some(
                Finding::new(FindingKind::NestedQuote {
                    inner: inner.label(),
                    outer: outer.label(),
                })
                .on_span(inner.index, inner.id.as_deref())
                .at(inner.location.clone()),
            )
        })
        .collect()
}

fn identical_authors(document: &Document, _options: &Options) -> Vec<Finding> {
    document
        .spans_of_kind(SpanKind::Quote)
        .filter_map(|quote| {
            let primary = quote.attributes.get(attributes::AUTHOR_ID)?;
            let secondary = quote.attributes.get_attribute(attributes::AUTHOR_ID2)?;
            (primary == secondary.value).then(|| {
                Finding::new(FindingKind::IdenticalAuthors {
                    quote: quote.label(),
                    author: primary.to_string(),
                })
                .on_span(quote.index, quote.id.as_deref())
                .at(secondary.location.clone())
            })
        })
        .collect()
}

fn oversized_sample(document: &Document, options: &Options) -> Vec<Finding> {
    let Some(limit) = options.max_sample_chars else {
        return Vec::new();
    };
    let chars = document.char_count();
    if chars > limit {
        vec![Finding::new(FindingKind::OversizedSample { chars, limit })]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{SpanIndex, parse};

    fn codes(document: &Document) -> Vec<&'static str> {
        document.findings.iter().map(|finding| finding.code).collect()
    }

    #[test]
    fn nested_quote_keeps_both_spans() {
        let document = parse(
            r#"<quote id="q1">a <quote id="q2">b</quote> c</quote>"#,
            &Options::default(),
        );
        assert_eq!(codes(&document), vec!["nested-quote"]);
        assert_eq!(document.spans.len(), 2);
        assert_eq!(
            document.findings.first().and_then(|f| f.span),
            Some(SpanIndex(1))
        );
    }

    #[test]
    fn nested_quote_through_an_author() {
        let document = parse(
            r#"<quote id="q1"><author id="a"><quote id="q2">b</quote></author></quote>"#,
            &Options::default(),
        );
        assert_eq!(codes(&document), vec!["nested-quote"]);
        assert_eq!(
            document.findings.first().map(|f| f.message.as_str()),
            Some(r#"quote "q2" is nested inside quote "q1""#)
        );
    }

    #[rstest]
    #[case::same(r#"authorid="a" authorid2="a""#, vec!["identical-authors"])]
    #[case::distinct(r#"authorid="a" authorid2="b""#, vec![])]
    #[case::secondary_only(r#"authorid2="a""#, vec![])]
    fn identical_authors_cases(#[case] attributes: &str, #[case] expected: Vec<&str>) {
        let input = format!(
            r#"<author id="a">x</author><author id="b">y</author><quote id="q" {attributes}>z</quote>"#
        );
        let document = parse(&input, &Options::default());
        assert_eq!(codes(&document), expected);
    }

    #[rstest]
    #[case::under(Some(10), "abcdefghij", vec![])]
    #[case::over(Some(10), "abcdefghijk", vec!["oversized-sample"])]
    #[case::disabled(None, "abcdefghijk", vec![])]
    fn oversized_sample_cases(
        #[case] limit: Option<usize>,
        #[case] input: &str,
        #[case] expected: Vec<&str>,
    ) {
        let builder = Options::builder();
        let options = match limit {
            Some(limit) => builder.with_max_sample_chars(limit),
            None => builder.without_sample_limit(),
        }
        .build();
        assert_eq!(codes(&parse(input, &options)), expected);
    }

    #[test]
    fn oversized_counts_characters_not_bytes() {
        // 10 characters, 20 bytes
        let options = Options::builder().with_max_sample_chars(10).build();
        let document = parse("āāāāāāāāāā", &options);
        assert!(document.findings.is_empty());
    }
}
