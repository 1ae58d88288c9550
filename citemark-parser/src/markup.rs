//! Re-serialization of a document back to inline markup.

use std::fmt::Write as _;

use crate::{
    Document,
    model::{Closure, Segment, Span},
};

impl Document {
    /// Write the document back as inline markup.
    ///
    /// Text and tag placement are reproduced exactly. Attributes are written in source
    /// order as `name="value"`, single-quoted when the value contains a double quote.
    /// Spans closed by recovery get no close tag, and markup that could not be parsed
    /// is copied verbatim, so broken input stays broken in the same place.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        self.write_segments(&self.content, &mut out);
        out
    }

    fn write_segments(&self, segments: &[Segment], out: &mut String) {
        for segment in segments {
            match segment {
                Segment::Text(run) => out.push_str(&run.content),
                Segment::Unparsed(unparsed) => out.push_str(&unparsed.raw),
                Segment::Span(index) => {
                    if let Some(span) = self.span(*index) {
                        self.write_span(span, out);
                    }
                }
            }
        }
    }

    fn write_span(&self, span: &Span, out: &mut String) {
        let tag = span.kind.tag_name();
        out.push('<');
        out.push_str(tag);
        for attribute in span.attributes.iter() {
            let quote = if attribute.value.contains('"') { '\'' } else { '"' };
            let _ = write!(out, " {}={quote}{}{quote}", attribute.name, attribute.value);
        }
        out.push('>');
        self.write_segments(&span.content, out);
        if span.closure == Closure::Explicit {
            let _ = write!(out, "</{tag}>");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Options, parse};

    #[rstest]
    #[case::plain("no tags at all")]
    #[case::nested(r#"<author id="a1">ācārya<title id="t1" type="generic">kośa</title></author> āha"#)]
    #[case::quote(r#"yathoktam <quote id="q1" authorid="a1" titleid="ROOT">dharmakṣetre</quote> iti"#)]
    #[case::multiline("<quote id=\"q\">line one\nline two</quote>\n")]
    #[case::unclosed(r#"<quote id="q">never closed"#)]
    #[case::broken(r#"a <verse>b</verse> c</title>"#)]
    fn canonical_markup_round_trips(#[case] input: &str) {
        let document = parse(input, &Options::default());
        assert_eq!(document.to_markup(), input);
    }

    #[test]
    fn attributes_are_normalized() {
        let document = parse(
            "<quote  id='q1'   authorid = \"a1\">x</quote>",
            &Options::default(),
        );
        assert_eq!(
            document.to_markup(),
            r#"<quote id="q1" authorid="a1">x</quote>"#
        );
    }

    #[test]
    fn values_with_double_quotes_use_single_quotes() {
        let document = parse(r#"<title id='say "hi"'>x</title>"#, &Options::default());
        assert_eq!(document.to_markup(), r#"<title id='say "hi"'>x</title>"#);
    }

    #[test]
    fn implicit_close_tags_are_not_invented() {
        let input = r#"<quote id="q"><author id="a">x</quote>"#;
        let document = parse(input, &Options::default());
        assert_eq!(document.to_markup(), input);
    }
}
