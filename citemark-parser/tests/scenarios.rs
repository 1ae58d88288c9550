use citemark_parser::{
    Closure, FindingKind, Options, Reference, ReferenceSlot, SpanIndex, SpanKind, SpanType, parse,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn codes(input: &str) -> Vec<&'static str> {
    parse(input, &Options::default())
        .findings
        .iter()
        .map(|finding| finding.code)
        .collect()
}

#[test]
fn standalone_author_and_title() {
    let document = parse(
        r#"<author id="a1">lūyīpādā</author><title id="t3" type="generic">bhisamaye</title>"#,
        &Options::default(),
    );
    assert!(document.findings.is_empty());
    assert_eq!(document.registry.len(), 2);
    assert_eq!(
        document.lookup(SpanKind::Author, "a1").map(|s| s.text.as_str()),
        Some("lūyīpādā")
    );
    assert_eq!(
        document.lookup(SpanKind::Title, "t3").and_then(|s| s.span_type),
        Some(SpanType::Generic)
    );
}

#[test]
fn dangling_author_and_root_title() {
    let document = parse(
        r#"<quote id="q1" authorid="a1" titleid="ROOT">...</quote>"#,
        &Options::default(),
    );
    let dangling: Vec<_> = document
        .findings
        .iter()
        .filter_map(|finding| {
            if let FindingKind::DanglingReference { target, slot, .. } = &finding.kind {
                Some((*slot, target.as_str()))
            } else {
                None
            }
        })
        .collect();
    assert_eq!(dangling, vec![(ReferenceSlot::Author, "a1")]);
    assert_eq!(document.findings.len(), 1);
    assert_eq!(
        document.reference(SpanIndex(0), ReferenceSlot::Title),
        Some(&Reference::Root)
    );
    assert_eq!(document.root_references().count(), 1);
}

#[test]
fn repeated_authorid_with_secondary_author() {
    let document = parse(
        r#"<quote id="q2" authorid="a1" authorid="a2" authorid2="a3">x</quote><author id="a1">p</author><author id="a3">r</author>"#,
        &Options::default(),
    );
    assert_eq!(
        document.findings.iter().map(|f| f.code).collect::<Vec<_>>(),
        vec!["duplicate-attribute"]
    );
    assert_eq!(
        document.reference(SpanIndex(0), ReferenceSlot::Author),
        Some(&Reference::Resolved(SpanIndex(1)))
    );
    assert_eq!(
        document.reference(SpanIndex(0), ReferenceSlot::SecondaryAuthor),
        Some(&Reference::Resolved(SpanIndex(2)))
    );
    assert_eq!(document.quotes_with_two_authors().count(), 1);
}

#[test]
fn quote_inside_quote() {
    let document = parse(
        r#"<quote id="q1">iti <quote id="q2">antar</quote> bāhya</quote>"#,
        &Options::default(),
    );
    assert_eq!(
        document.findings.iter().map(|f| f.code).collect::<Vec<_>>(),
        vec!["nested-quote"]
    );
    assert_eq!(document.spans.len(), 2);
    assert_eq!(document.registry.len(), 2);
    let outer = document.lookup(SpanKind::Quote, "q1");
    assert_eq!(
        outer.map(|span| span.children().collect::<Vec<_>>()),
        Some(vec![SpanIndex(1)])
    );
    assert_eq!(outer.map(|span| span.text.as_str()), Some("iti antar bāhya"));
}

#[test]
fn root_is_never_dangling() {
    let document = parse(
        r#"<quote id="q" authorid="ROOT" authorid2="ROOT" titleid="ROOT" chapterid="ROOT">x</quote>"#,
        &Options::default(),
    );
    assert_eq!(document.dangling_references().count(), 0);
    assert_eq!(document.root_references().count(), 4);
    // the same id in both author slots is still worth a look
    assert_eq!(
        document.findings.iter().map(|f| f.code).collect::<Vec<_>>(),
        vec!["identical-authors"]
    );
}

#[test]
fn duplicate_ids_reported_once_naming_both() {
    let document = parse(
        r#"<title id="t">a</title> <title id="t">b</title> <author id="t">c</author>"#,
        &Options::default(),
    );
    let duplicates: Vec<_> = document
        .findings
        .iter()
        .filter_map(|finding| {
            if let FindingKind::DuplicateId {
                kind, first, second, ..
            } = &finding.kind
            {
                Some((*kind, *first, *second))
            } else {
                None
            }
        })
        .collect();
    assert_eq!(duplicates, vec![(SpanKind::Title, SpanIndex(0), SpanIndex(1))]);
    assert_eq!(document.findings.len(), 1);
}

#[test]
fn chapter_type_and_chapterid_are_independent() {
    let document = parse(
        r#"<title id="c1" type="chapter">prathamo 'dhyāyaḥ</title><title id="t1">gītā</title><quote id="q" titleid="t1" chapterid="c1">x</quote><quote id="r" chapterid="t1">y</quote>"#,
        &Options::default(),
    );
    assert!(document.findings.is_empty(), "{:?}", document.findings);
    assert_eq!(
        document.reference(SpanIndex(2), ReferenceSlot::Chapter),
        Some(&Reference::Resolved(SpanIndex(0)))
    );
    // chapterid may name a title that is not typed as a chapter
    assert_eq!(
        document.reference(SpanIndex(3), ReferenceSlot::Chapter),
        Some(&Reference::Resolved(SpanIndex(1)))
    );
    assert_eq!(
        document.incoming(SpanKind::Title, "t1").filter_map(|s| s.id.as_deref()).collect::<Vec<_>>(),
        vec!["q", "r"]
    );
}

#[test]
fn unclosed_spans_are_kept() {
    let document = parse(r#"<author id="a">vyāsa <title id="t">bhārata"#, &Options::default());
    let closures: Vec<_> = document.spans.iter().map(|s| s.closure).collect();
    assert_eq!(closures, vec![Closure::Implicit, Closure::Implicit]);
    assert_eq!(
        document.findings.iter().map(|f| f.code).collect::<Vec<_>>(),
        vec!["unclosed-tag", "unclosed-tag"]
    );
    assert_eq!(document.registry.len(), 2);
}

#[rstest]
#[case::unknown_attribute(r#"<quote id="q" certainty="low">x</quote>"#, vec!["unknown-attribute"])]
#[case::reference_on_author(r#"<author id="a" titleid="t">x</author><title id="t">y</title>"#, vec!["attribute-not-allowed"])]
#[case::type_on_wrong_kind(r#"<quote id="q" type="generic">x</quote>"#, vec!["invalid-type-value"])]
#[case::unknown_type(r#"<author id="a" type="poet">x</author>"#, vec!["invalid-type-value"])]
#[case::reserved_id(r#"<author id="ROOT">x</author>"#, vec!["reserved-id"])]
#[case::empty_id(r#"<author id="">x</author>"#, vec!["missing-id"])]
#[case::lone_angle(r#"a < b <quote id="q">x</quote>"#, vec![])]
#[case::unknown_tag(r#"<verse>x</verse>"#, vec!["token-error", "token-error"])]
#[case::stray_close(r#"x</quote>"#, vec!["unmatched-close"])]
fn attribute_and_tag_findings(#[case] input: &str, #[case] expected: Vec<&str>) {
    assert_eq!(codes(input), expected);
}

#[test]
fn possibly_authorial_stays_in_the_graph() {
    let document = parse(
        r#"<author id="a">x</author><quote id="q" type="possiblyauthorial" authorid="a">y</quote>"#,
        &Options::default(),
    );
    assert_eq!(document.possibly_authorial_quotes().count(), 1);
    assert_eq!(document.incoming(SpanKind::Author, "a").count(), 1);
}

#[test]
fn parsing_twice_is_identical() {
    let input = r#"<quote id="q1" authorid="a9"><quote>x</author>"#;
    let options = Options::default();
    assert_eq!(parse(input, &options), parse(input, &options));
}

#[test]
fn documents_serialize_with_tagged_references() -> Result<(), serde_json::Error> {
    let document = parse(
        r#"<author id="a1">x</author><quote id="q1" authorid="a1" titleid="ROOT" chapterid="c9">y</quote>"#,
        &Options::default(),
    );
    let json = serde_json::to_value(&document)?;

    assert_eq!(json.pointer("/source"), None);
    assert_eq!(json.pointer("/registry"), None);
    assert_eq!(
        json.pointer("/references/edges/0/reference"),
        Some(&serde_json::json!({"reference": "resolved", "target": 0}))
    );
    assert_eq!(
        json.pointer("/references/edges/1/reference"),
        Some(&serde_json::json!({"reference": "root"}))
    );
    assert_eq!(
        json.pointer("/references/edges/2/reference"),
        Some(&serde_json::json!({"reference": "dangling", "target": "c9"}))
    );
    assert_eq!(
        json.pointer("/findings/0/code"),
        Some(&serde_json::json!("dangling-reference"))
    );
    assert_eq!(json.pointer("/spans/1/kind"), Some(&serde_json::json!("quote")));
    Ok(())
}

#[rstest]
#[case::arabic_number_sign("\u{600}<quote id=\"q\">x</quote>", SpanKind::Quote, "q")]
#[case::malayalam_dot_reph("\u{D4E}<author id=\"a\">ശ്രീ</author>", SpanKind::Author, "a")]
fn tags_after_prepended_marks_are_registered(
    #[case] input: &str,
    #[case] kind: SpanKind,
    #[case] id: &str,
) {
    let document = parse(input, &Options::default());
    assert!(document.findings.is_empty(), "{:?}", document.findings);
    assert_eq!(document.spans.len(), 1);
    assert_eq!(document.registry.get(kind, id), Some(SpanIndex(0)));
    assert_eq!(document.to_markup(), input);
}
