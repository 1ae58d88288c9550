//! Tag parser: consumes tokens and builds the span arena and the ordered content.
//!
//! Syntax only. Whether ids are unique or references resolve is decided later by the
//! registry and the validator; the parser checks the attribute grammar of each tag and
//! recovers from broken nesting.

use crate::{
    Finding, FindingKind,
    model::{
        Attribute, Attributes, Closure, Location, ReferenceSlot, Segment, Span, SpanIndex,
        SpanKind, SpanType, TextRun, Unparsed, attributes,
    },
};

use super::{
    ParserState,
    tokenizer::{RawAttribute, Token, TokenKind, Tokenizer},
};

#[derive(Debug, Default)]
pub(crate) struct ParsedSample {
    pub(crate) content: Vec<Segment>,
    pub(crate) spans: Vec<Span>,
}

/// An open tag waiting for its close tag.
#[derive(Debug)]
struct Frame {
    index: SpanIndex,
    kind: SpanKind,
    content: Vec<Segment>,
    text: String,
    inner_start: usize,
}

struct Builder<'s, 'a> {
    state: &'s mut ParserState<'a>,
    root: Vec<Segment>,
    spans: Vec<Span>,
    stack: Vec<Frame>,
}

#[tracing::instrument(level = "trace", skip_all, fields(len = state.input.len()))]
pub(crate) fn parse(state: &mut ParserState<'_>) -> ParsedSample {
    let input = state.input;
    let mut builder = Builder {
        state,
        root: Vec::new(),
        spans: Vec::new(),
        stack: Vec::new(),
    };

    for token in Tokenizer::new(input) {
        builder.token(token);
    }
    builder.finish()
}

impl Builder<'_, '_> {
    fn current_content(&mut self) -> &mut Vec<Segment> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.content,
            None => &mut self.root,
        }
    }

    fn token(&mut self, token: Token<'_>) {
        let Token {
            kind,
            start,
            end,
            raw,
        } = token;
        match kind {
            TokenKind::Text => self.text(raw, start, end),
            TokenKind::TagOpen { kind, attributes } => self.open(kind, &attributes, start, end),
            TokenKind::TagClose { kind } => self.close(kind, start, end, raw),
            TokenKind::Error { error, at } => {
                let location = self.state.create_location(start, end);
                let at = self.state.create_location(at, end);
                self.state.report(Finding::new(FindingKind::from(error)).at(at));
                self.unparsed(raw, location);
            }
        }
    }

    fn text(&mut self, raw: &str, start: usize, end: usize) {
        for frame in &mut self.stack {
            frame.text.push_str(raw);
        }
        let location = self.state.create_location(start, end);
        self.current_content().push(Segment::Text(TextRun {
            content: raw.to_string(),
            location,
        }));
    }

    fn unparsed(&mut self, raw: &str, location: Location) {
        self.current_content().push(Segment::Unparsed(Unparsed {
            raw: raw.to_string(),
            location,
        }));
    }

    fn open(&mut self, kind: SpanKind, raw_attributes: &[RawAttribute<'_>], start: usize, end: usize) {
        let index = SpanIndex(self.spans.len());
        let tag_location = self.state.create_location(start, end);
        let attributes: Attributes = raw_attributes
            .iter()
            .map(|raw| {
                Attribute::new(
                    raw.name,
                    raw.value,
                    self.state.create_location(raw.start, raw.end),
                )
            })
            .collect();

        let id = attributes
            .get(attributes::ID)
            .filter(|id| !id.trim().is_empty())
            .map(ToString::to_string);
        let span_type = self.check_attributes(kind, index, id.as_deref(), &attributes, &tag_location);

        let span = Span {
            index,
            kind,
            id,
            span_type,
            attributes,
            content: Vec::new(),
            text: String::new(),
            raw: String::new(),
            parent: self.stack.last().map(|frame| frame.index),
            closure: Closure::Implicit,
            location: tag_location.clone(),
            inner_location: self.state.create_location(end, end),
        };
        tracing::trace!(span = %span.label(), "open");
        self.spans.push(span);
        self.current_content().push(Segment::Span(index));
        self.stack.push(Frame {
            index,
            kind,
            content: Vec::new(),
            text: String::new(),
            inner_start: end,
        });
    }

    /// Attribute grammar of one tag. Returns the typed qualifier when the `type`
    /// value is legal for the kind.
    fn check_attributes(
        &mut self,
        kind: SpanKind,
        index: SpanIndex,
        id: Option<&str>,
        attributes: &Attributes,
        tag_location: &Location,
    ) -> Option<SpanType> {
        if id.is_none() {
            self.state.report(
                Finding::new(FindingKind::MissingId { kind })
                    .on_span(index, None)
                    .at(tag_location.clone()),
            );
        }

        for repeat in attributes.repeats() {
            let kept = attributes.get(&repeat.name).unwrap_or_default().to_string();
            self.state.report(
                Finding::new(FindingKind::DuplicateAttribute {
                    kind,
                    name: repeat.name.clone(),
                    kept,
                    ignored: repeat.value.clone(),
                })
                .on_span(index, id)
                .at(repeat.location.clone()),
            );
        }

        for attribute in attributes.iter() {
            let first = attributes
                .get_attribute(&attribute.name)
                .is_some_and(|first| std::ptr::eq(first, attribute));
            if !first {
                continue;
            }
            if !attributes::is_known(&attribute.name)
                && !self.state.options.allows_attribute(&attribute.name)
            {
                self.state.report(
                    Finding::new(FindingKind::UnknownAttribute {
                        kind,
                        name: attribute.name.clone(),
                    })
                    .on_span(index, id)
                    .at(attribute.location.clone()),
                );
            } else if kind != SpanKind::Quote
                && ReferenceSlot::from_attribute_name(&attribute.name).is_some()
            {
                self.state.report(
                    Finding::new(FindingKind::AttributeNotAllowed {
                        kind,
                        name: attribute.name.clone(),
                    })
                    .on_span(index, id)
                    .at(attribute.location.clone()),
                );
            }
        }

        let attribute = attributes.get_attribute(attributes::TYPE)?;
        let span_type = SpanType::from_value(&attribute.value).filter(|t| t.allowed_for(kind));
        if span_type.is_none() {
            self.state.report(
                Finding::new(FindingKind::InvalidTypeValue {
                    kind,
                    value: attribute.value.clone(),
                })
                .on_span(index, id)
                .at(attribute.location.clone()),
            );
        }
        span_type
    }

    fn close(&mut self, kind: SpanKind, start: usize, end: usize, raw: &str) {
        let Some(depth) = self.stack.iter().rposition(|frame| frame.kind == kind) else {
            let location = self.state.create_location(start, end);
            self.state
                .report(Finding::new(FindingKind::UnmatchedClose { kind }).at(location.clone()));
            self.unparsed(raw, location);
            return;
        };

        if depth + 1 != self.stack.len() {
            let innermost = self.stack.last().map_or(kind, |frame| frame.kind);
            tracing::warn!(closing = %kind, %innermost, "mismatched close tag, closing inner tags");
            let location = self.state.create_location(start, end);
            self.state.report(
                Finding::new(FindingKind::MismatchedTag {
                    closing: kind,
                    innermost,
                })
                .at(location),
            );
            while self.stack.len() > depth + 1 {
                let Some(frame) = self.stack.pop() else {
                    break;
                };
                let index = frame.index;
                self.finish_span(frame, Closure::Implicit, start, start);
                if let Some((label, id, location)) = self.describe(index) {
                    self.state.report(
                        Finding::new(FindingKind::ImplicitClose { span: label, by: kind })
                            .on_span(index, id.as_deref())
                            .at(location),
                    );
                }
            }
        }

        if let Some(frame) = self.stack.pop() {
            self.finish_span(frame, Closure::Explicit, start, end);
        }
    }

    fn describe(&self, index: SpanIndex) -> Option<(String, Option<String>, Location)> {
        self.spans
            .get(index.0)
            .map(|span| (span.label(), span.id.clone(), span.location.clone()))
    }

    /// Fill in the placeholder pushed when the tag was opened.
    fn finish_span(
        &mut self,
        frame: Frame,
        closure: Closure,
        inner_end: usize,
        outer_end: usize,
    ) {
        let raw = self.state.slice(frame.inner_start, inner_end).to_string();
        let inner_location = self.state.create_location(frame.inner_start, inner_end);
        if let Some(span) = self.spans.get_mut(frame.index.0) {
            span.location = self
                .state
                .create_location(span.location.absolute_start, outer_end);
            span.inner_location = inner_location;
            span.content = frame.content;
            span.text = frame.text;
            span.raw = raw;
            span.closure = closure;
        }
    }

    fn finish(mut self) -> ParsedSample {
        let end = self.state.input.len();
        while let Some(frame) = self.stack.pop() {
            let index = frame.index;
            // Reported at the open tag, before its location is stretched to the end.
            let described = self.describe(index);
            self.finish_span(frame, Closure::Implicit, end, end);
            if let Some((label, id, open_tag)) = described {
                tracing::warn!(span = %label, "tag left open at end of sample");
                self.state.report(
                    Finding::new(FindingKind::UnclosedTag { span: label })
                        .on_span(index, id.as_deref())
                        .at(open_tag),
                );
            }
        }

        ParsedSample {
            content: self.root,
            spans: self.spans,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Options;

    fn parse_str(input: &str) -> (ParsedSample, Vec<Finding>) {
        let options = Options::default();
        let mut state = ParserState::new(input, &options);
        let parsed = parse(&mut state);
        (parsed, state.findings)
    }

    fn codes(findings: &[Finding]) -> Vec<&'static str> {
        findings.iter().map(|finding| finding.code).collect()
    }

    #[test]
    fn builds_nested_spans() {
        let input = r#"iti <author id="a1">ācārya<title id="t1">kośa</title></author> āha"#;
        let (parsed, findings) = parse_str(input);
        assert!(findings.is_empty(), "{findings:?}");
        assert_eq!(parsed.spans.len(), 2);

        let author = parsed.spans.first().map(|s| (s.kind, s.text.as_str(), s.parent));
        assert_eq!(author, Some((SpanKind::Author, "ācāryakośa", None)));
        let title = parsed.spans.get(1).map(|s| (s.kind, s.raw.as_str(), s.parent));
        assert_eq!(title, Some((SpanKind::Title, "kośa", Some(SpanIndex(0)))));

        assert_eq!(parsed.content.len(), 3);
        assert!(matches!(parsed.content.get(1), Some(Segment::Span(SpanIndex(0)))));
    }

    #[test]
    fn span_locations_cover_the_tags() {
        let input = r#"x <quote id="q">y</quote>"#;
        let (parsed, _) = parse_str(input);
        let quote = parsed.spans.first().map(|s| {
            (
                s.location.slice(input).map(ToString::to_string),
                s.inner_location.slice(input).map(ToString::to_string),
                s.closure,
            )
        });
        assert_eq!(
            quote,
            Some((
                Some(r#"<quote id="q">y</quote>"#.to_string()),
                Some("y".to_string()),
                Closure::Explicit
            ))
        );
    }

    #[test]
    fn missing_id_is_reported() {
        let (parsed, findings) = parse_str("<title>x</title>");
        assert_eq!(codes(&findings), vec!["missing-id"]);
        assert_eq!(parsed.spans.first().and_then(|s| s.id.clone()), None);
    }

    #[test]
    fn repeated_attribute_keeps_the_first_value() {
        let (parsed, findings) =
            parse_str(r#"<quote id="q" authorid="a1" authorid="a2" authorid2="a3">x</quote>"#);
        assert_eq!(codes(&findings), vec!["duplicate-attribute"]);
        assert_eq!(
            parsed
                .spans
                .first()
                .and_then(|s| s.attributes.get("authorid")),
            Some("a1")
        );
    }

    #[test]
    fn attribute_checks() {
        let (parsed, findings) = parse_str(
            r#"<author id="a" titleid="t" confidence="low">x</author><title id="t" type="speaker">y</title>"#,
        );
        assert_eq!(
            codes(&findings),
            vec!["attribute-not-allowed", "unknown-attribute", "invalid-type-value"]
        );
        assert_eq!(parsed.spans.get(1).and_then(|s| s.span_type), None);
    }

    #[test]
    fn extra_attributes_are_accepted() {
        let options = Options::builder().with_extra_attribute("confidence").build();
        let mut state = ParserState::new(r#"<quote id="q" confidence="low">x</quote>"#, &options);
        let _ = parse(&mut state);
        assert!(state.findings.is_empty());
    }

    #[test]
    fn mismatched_close_recovers() {
        let input = r#"<quote id="q"><author id="a">x</quote>y"#;
        let (parsed, findings) = parse_str(input);
        assert_eq!(codes(&findings), vec!["mismatched-tag", "implicit-close"]);

        let closures: Vec<_> = parsed.spans.iter().map(|s| s.closure).collect();
        assert_eq!(closures, vec![Closure::Explicit, Closure::Implicit]);
        assert_eq!(
            parsed.spans.get(1).and_then(|s| s.location.slice(input)),
            Some(r#"<author id="a">x"#)
        );
        // "y" is back at the top level
        assert_eq!(parsed.content.len(), 2);
    }

    #[test]
    fn unmatched_close_is_kept_verbatim() {
        let (parsed, findings) = parse_str("abc</title>def");
        assert_eq!(codes(&findings), vec!["unmatched-close"]);
        assert!(matches!(
            parsed.content.get(1),
            Some(Segment::Unparsed(Unparsed { raw, .. })) if raw == "</title>"
        ));
    }

    #[test]
    fn unclosed_tag_at_end_of_sample() {
        let (parsed, findings) = parse_str(r#"<quote id="q">never closed"#);
        assert_eq!(codes(&findings), vec!["unclosed-tag"]);
        assert_eq!(
            parsed.spans.first().map(|s| (s.closure, s.text.as_str())),
            Some((Closure::Implicit, "never closed"))
        );
    }

    #[test]
    fn token_errors_do_not_lose_the_rest_of_the_sample() {
        let (parsed, findings) = parse_str(r#"<verse>x</verse> <author id="a">y</author>"#);
        assert_eq!(codes(&findings), vec!["token-error", "token-error"]);
        assert_eq!(parsed.spans.len(), 1);
        assert_eq!(parsed.spans.first().map(|s| s.kind), Some(SpanKind::Author));
    }
}
