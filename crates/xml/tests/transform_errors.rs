use xml::{DoctypeErrorCode, Message, Point, RuleId, transform};

fn reject(input: &str) -> Message {
    match transform(input) {
        Ok(root) => panic!("expected {input:?} to be rejected, got {root:?}"),
        Err(message) => message,
    }
}

fn assert_rejects(input: &str, reason: &str, rule_id: RuleId, point: Point) {
    let message = reject(input);
    assert_eq!(message.reason, reason, "reason for {input:?}");
    assert_eq!(message.rule_id, rule_id, "rule for {input:?}");
    assert_eq!(message.point, point, "point for {input:?}");
    assert_eq!(message.source, "xast-util-from-xml");
}

#[test]
fn unquoted_attribute() {
    assert_rejects(
        "<root unquoted=attribute>",
        "Unquoted attribute value",
        RuleId::Lexer,
        Point::new(1, 17, 16),
    );
}

#[test]
fn sgml_declaration() {
    assert_rejects(
        "<!ENTITY>",
        "Unexpected SGML declaration",
        RuleId::UnexpectedSgml,
        Point::new(1, 10, 9),
    );
}

#[test]
fn unknown_entities() {
    assert_rejects(
        "<root>&foo;</root>",
        "Invalid character entity",
        RuleId::Lexer,
        Point::new(1, 12, 11),
    );
    assert_rejects(
        "<root>&copy;</root>",
        "Invalid character entity",
        RuleId::Lexer,
        Point::new(1, 13, 12),
    );
}

#[test]
fn invalid_nesting() {
    assert_rejects(
        "<root><a><b><c/></a></b></root>",
        "Unexpected close tag",
        RuleId::Lexer,
        Point::new(1, 21, 20),
    );
}

#[test]
fn unclosed_and_unmatched_tags() {
    assert_rejects("<a><b></b>", "Unclosed root tag", RuleId::Lexer, Point::new(1, 11, 10));
    assert_rejects(
        "<a/></b>",
        "Unmatched closing tag: b",
        RuleId::Lexer,
        Point::new(1, 9, 8),
    );
    assert_rejects(
        "<a/>x",
        "Text data outside of root node.",
        RuleId::Lexer,
        Point::new(1, 6, 5),
    );
}

#[test]
fn doctype_grammar_errors() {
    use DoctypeErrorCode::*;

    let cases: &[(&str, DoctypeErrorCode, &str, usize)] = &[
        ("<!doctype>", Name, "Expected doctype name", 9),
        ("<!doctype !>", Name, "Expected start of doctype name", 10),
        (
            "<!DOCTYPE name[<!ELEMENT greeting (#PCDATA)>]>",
            InternalSubset,
            "Unexpected internal subset",
            14,
        ),
        (
            "<!DOCTYPE name [<!ELEMENT greeting (#PCDATA)>]>",
            InternalSubset,
            "Unexpected internal subset",
            15,
        ),
        (
            "<!DOCTYPE name!>",
            Name,
            "Expected doctype name character, whitespace, or doctype end",
            14,
        ),
        (
            "<!DOCTYPE name !>",
            ExternalIdentifier,
            "Expected external identifier (`PUBLIC` or `SYSTEM`), whitespace, or doctype end",
            15,
        ),
        (
            "<!DOCTYPE name PUB>",
            ExternalIdentifier,
            "Expected external identifier (`PUBLIC` or `SYSTEM`)",
            18,
        ),
        (
            "<!DOCTYPE name SYSTEm>",
            ExternalIdentifier,
            "Expected external identifier (`PUBLIC` or `SYSTEM`)",
            20,
        ),
        (
            "<!DOCTYPE name PUBLIC>",
            PublicLiteral,
            "Expected whitespace after `PUBLIC`",
            21,
        ),
        (
            "<!DOCTYPE name PUBLIC !>",
            PublicLiteral,
            "Expected quote or apostrophe to start public literal",
            22,
        ),
        (
            "<!DOCTYPE name PUBLIC \"🤔\">",
            PublicLiteral,
            "Expected pubid character in public literal",
            23,
        ),
        (
            "<!DOCTYPE name PUBLIC \"literal\"!>",
            SystemLiteral,
            "Expected whitespace after public literal",
            31,
        ),
        (
            "<!DOCTYPE name SYSTEM>",
            SystemLiteral,
            "Expected whitespace after `SYSTEM`",
            21,
        ),
        (
            "<!DOCTYPE name SYSTEM !>",
            SystemLiteral,
            "Expected quote or apostrophe to start system literal",
            22,
        ),
        (
            "<!DOCTYPE name SYSTEM \"asd\" [<!ELEMENT greeting (#PCDATA)>]>",
            TrailingInternalSubset,
            "Unexpected internal subset",
            28,
        ),
        (
            "<!DOCTYPE name SYSTEM \"asd\" !>",
            TrailingContent,
            "Expected whitespace or end of doctype",
            28,
        ),
    ];

    for &(input, code, reason, offset) in cases {
        assert_rejects(
            input,
            reason,
            RuleId::Doctype(code),
            Point::new(1, offset + 1, offset),
        );
    }
}

#[test]
fn unterminated_system_literal_is_a_lexer_error() {
    assert_rejects(
        "<!DOCTYPE name SYSTEM \"asd>",
        "Unexpected end",
        RuleId::Lexer,
        Point::new(1, 28, 27),
    );
}

#[test]
fn doctype_errors_after_a_prolog_are_positioned_in_the_document() {
    assert_rejects(
        "<?xml version=\"1.0\"?>\n<!DOCTYPE a[]>",
        "Unexpected internal subset",
        RuleId::Doctype(DoctypeErrorCode::InternalSubset),
        Point::new(2, 12, 33),
    );
}

#[test]
fn messages_render_line_and_column() {
    let message = reject("<root unquoted=attribute>");
    assert_eq!(message.to_string(), "1:17: Unquoted attribute value");
    assert_eq!(message.rule_id.as_str(), "lexer");
}

#[test]
fn well_formed_documents_are_accepted() {
    let root = transform("<!DOCTYPE a SYSTEM \"a.dtd\"><a><b x='1'/>t<!--c--><![CDATA[d]]><?e f?></a>")
        .expect("well-formed document");
    assert_eq!(root.children.len(), 2);
    let kinds: Vec<&str> = root.children[1]
        .children()
        .expect("element children")
        .iter()
        .map(|node| node.kind())
        .collect();
    assert_eq!(kinds, ["element", "text", "comment", "cdata", "instruction"]);
}
