use super::{EventSink, SaxEvent, Tokenizer, TokenizerConfig, VecEventSink, chunks};
use crate::error::Message;
use crate::position::Point;

fn tokenize_with(input: &str, config: TokenizerConfig) -> Vec<(SaxEvent, Point)> {
    let mut events = Vec::new();
    let mut tokenizer = Tokenizer::new(input, config);
    tokenizer
        .run(&mut VecEventSink(&mut events))
        .expect("buffering sink never rejects events");
    events
}

fn tokenize(input: &str) -> Vec<(SaxEvent, Point)> {
    tokenize_with(input, TokenizerConfig::default())
}

fn last_error(input: &str) -> (String, Point) {
    match tokenize(input).pop() {
        Some((SaxEvent::Error(detail), now)) => (detail, now),
        other => panic!("expected a lexical error for {input:?}, got {other:?}"),
    }
}

fn reason(detail: &str) -> &str {
    detail.lines().next().unwrap_or_default()
}

fn open(name: &str) -> SaxEvent {
    SaxEvent::TagOpen {
        name: name.to_string(),
        attributes: Default::default(),
    }
}

fn close(name: &str) -> SaxEvent {
    SaxEvent::TagClose(name.to_string())
}

#[test]
fn element_with_text_reports_sax_style_cursor() {
    let events = tokenize("<a>x</a>");
    assert_eq!(
        events,
        vec![
            (open("a"), Point::new(1, 4, 3)),
            // One past the `<` that ended the run.
            (SaxEvent::Text("x".to_string()), Point::new(1, 6, 5)),
            (close("a"), Point::new(1, 9, 8)),
        ]
    );
}

#[test]
fn comment_fires_before_its_closing_bracket() {
    let events = tokenize("<a><!--x--></a>");
    assert_eq!(
        events[1],
        (SaxEvent::Comment("x".to_string()), Point::new(1, 11, 10))
    );
    assert_eq!(events[2], (close("a"), Point::new(1, 16, 15)));
}

#[test]
fn self_closing_tag_opens_and_closes_at_the_same_cursor() {
    let events = tokenize("<a/>");
    assert_eq!(
        events,
        vec![
            (open("a"), Point::new(1, 5, 4)),
            (close("a"), Point::new(1, 5, 4)),
        ]
    );
}

#[test]
fn trailing_text_at_eof_uses_the_final_cursor() {
    let events = tokenize("<a/>\n");
    assert_eq!(
        events[2],
        (SaxEvent::Text("\n".to_string()), Point::new(2, 1, 5))
    );
}

#[test]
fn line_breaks_count_crlf_once() {
    let events = tokenize("<a>\r\n\nb</a>");
    assert_eq!(
        events[1],
        (SaxEvent::Text("\r\n\nb".to_string()), Point::new(3, 3, 8))
    );
}

#[test]
fn attributes_are_decoded_and_first_duplicate_wins() {
    let events = tokenize(r#"<a b="1 &amp; 2" b="x" c='&#x41;'/>"#);
    let SaxEvent::TagOpen { name, attributes } = &events[0].0 else {
        panic!("expected an open tag, got {:?}", events[0]);
    };
    assert_eq!(name, "a");
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes.get("b"), Some("1 & 2"));
    assert_eq!(attributes.get("c"), Some("A"));
}

#[test]
fn text_entities_are_resolved() {
    let events = tokenize("<a>&lt;&#60;&gt;</a>");
    assert_eq!(events[1].0, SaxEvent::Text("<<>".to_string()));
}

#[test]
fn cdata_values_are_split_into_chunks() {
    let config = TokenizerConfig { cdata_chunk_len: 2 };
    let events = tokenize_with("<a><![CDATA[abcde]]></a>", config);
    let end = Point::new(1, 21, 20);
    assert_eq!(
        events,
        vec![
            (open("a"), Point::new(1, 4, 3)),
            (SaxEvent::CdataOpen, Point::new(1, 13, 12)),
            (SaxEvent::CdataValue("ab".to_string()), end),
            (SaxEvent::CdataValue("cd".to_string()), end),
            (SaxEvent::CdataValue("e".to_string()), end),
            (SaxEvent::CdataClose, end),
            (close("a"), Point::new(1, 25, 24)),
        ]
    );
}

#[test]
fn chunks_respect_char_boundaries() {
    assert_eq!(chunks("aé b", 2).collect::<Vec<_>>(), ["a", "é", " b"]);
    assert_eq!(chunks("é", 1).collect::<Vec<_>>(), ["é"]);
    assert_eq!(chunks("", 4).count(), 0);
}

#[test]
fn doctype_raw_stops_at_the_unquoted_unbracketed_bracket() {
    let events = tokenize(r#"<!doctype html [ <!ENTITY x "y>"> ]><a/>"#);
    assert_eq!(
        events[0].0,
        SaxEvent::Doctype(r#" html [ <!ENTITY x "y>"> ]"#.to_string())
    );
}

#[test]
fn sgml_declarations_and_instructions_are_reported() {
    let events = tokenize("<!ENTITY>");
    assert_eq!(
        events,
        vec![(
            SaxEvent::SgmlDeclaration("ENTITY".to_string()),
            Point::new(1, 10, 9)
        )]
    );

    let events = tokenize(r#"<?xml version="1.0"?><a/>"#);
    assert_eq!(
        events[0],
        (
            SaxEvent::ProcessingInstruction {
                name: "xml".to_string(),
                body: r#"version="1.0""#.to_string(),
            },
            Point::new(1, 22, 21)
        )
    );
}

#[test]
fn unquoted_attribute_error_points_past_the_offending_char() {
    let (detail, now) = last_error("<root unquoted=attribute>");
    assert_eq!(
        detail,
        "Unquoted attribute value\nLine: 0\nColumn: 16\nChar: a"
    );
    assert_eq!(now, Point::new(1, 17, 16));
}

#[test]
fn mismatched_close_tag_is_an_error() {
    let (detail, now) = last_error("<root><a><b><c/></a></b></root>");
    assert_eq!(reason(&detail), "Unexpected close tag");
    assert_eq!(now, Point::new(1, 21, 20));
}

#[test]
fn structural_errors() {
    let cases = [
        ("<a>", "Unclosed root tag", Point::new(1, 4, 3)),
        ("text", "Text data outside of root node.", Point::new(1, 2, 1)),
        ("</a>", "Unmatched closing tag: a", Point::new(1, 5, 4)),
        ("<root>&foo;</root>", "Invalid character entity", Point::new(1, 12, 11)),
        ("<root>&copy;</root>", "Invalid character entity", Point::new(1, 13, 12)),
        (
            "<a/><!DOCTYPE a>",
            "Inappropriately located doctype declaration",
            Point::new(1, 14, 13),
        ),
        ("<a b>", "Attribute without value", Point::new(1, 6, 5)),
        ("<a><!-- x", "Unexpected end", Point::new(1, 10, 9)),
        ("<a", "Unexpected end", Point::new(1, 3, 2)),
        ("<a><![CDATA[x", "Unexpected end", Point::new(1, 14, 13)),
        ("<![CDATA[x]]>", "Unexpected CDATA section outside of root node", Point::new(1, 10, 9)),
        ("<? x?>", "Processing instruction without target", Point::new(1, 4, 3)),
    ];
    for (input, expected, point) in cases {
        let (detail, now) = last_error(input);
        assert_eq!(reason(&detail), expected, "input: {input:?}");
        assert_eq!(now, point, "input: {input:?}");
    }
}

#[test]
fn lexical_error_stops_the_scan() {
    let events = tokenize("<a b></a><c/>");
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0].0, SaxEvent::Error(_)));
}

#[test]
fn sink_errors_propagate() {
    struct Reject;
    impl EventSink for Reject {
        fn event(&mut self, _event: SaxEvent, now: Point) -> Result<(), Message> {
            Err(Message::internal("rejected", now))
        }
    }

    let mut tokenizer = Tokenizer::new("<a/>", TokenizerConfig::default());
    let err = tokenizer.run(&mut Reject).expect_err("sink rejects");
    assert_eq!(err.reason, "rejected");
    assert_eq!(err.point, Point::new(1, 5, 4));
    assert_eq!(tokenizer.stats().events_emitted, 1);
}

#[test]
fn stats_count_events_and_errors() {
    let mut events = Vec::new();
    let mut tokenizer = Tokenizer::new("<a>x</a>", TokenizerConfig::default());
    tokenizer.run(&mut VecEventSink(&mut events)).expect("run");
    let stats = tokenizer.stats();
    assert_eq!(stats.events_emitted, 3);
    assert_eq!(stats.lexical_errors, 0);
    assert_eq!(tokenizer.now(), Point::new(1, 9, 8));
}
