//! XML to xast.
//!
//! [`transform`] scans a complete document with the built-in [`Tokenizer`] and
//! feeds its events to a [`TreeBuilder`], which returns a positioned [`Root`]
//! or the first [`Message`] describing why the input was rejected.

pub mod correction;
pub mod doctype;
pub mod error;
pub mod invariants;
pub mod perf_fixtures;
pub mod position;
pub mod tokenizer;
pub mod tree_builder;
pub mod types;

mod chars;

pub use crate::correction::PositionCorrection;
pub use crate::doctype::{DoctypeDecl, DoctypeError, DoctypeErrorCode, parse_doctype};
pub use crate::error::{Message, RuleId};
pub use crate::position::{Point, Position};
pub use crate::tokenizer::{
    EventSink, SaxEvent, Tokenizer, TokenizerConfig, TokenizerStats, VecEventSink,
};
pub use crate::tree_builder::{TreeBuilder, TreeBuilderConfig};
pub use crate::types::{
    Attributes, Cdata, Comment, Doctype, Element, Instruction, Node, Root, Text,
};

/// Configuration for one [`transform_with_config`] call.
#[derive(Clone, Debug, Default)]
pub struct TransformConfig {
    pub tokenizer: TokenizerConfig,
    pub tree_builder: TreeBuilderConfig,
}

/// Transform a serialized XML document into an xast tree.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn transform<I: AsRef<[u8]> + ?Sized>(input: &I) -> Result<Root, Message> {
    transform_with_config(input, &TransformConfig::default())
}

pub fn transform_with_config<I: AsRef<[u8]> + ?Sized>(
    input: &I,
    config: &TransformConfig,
) -> Result<Root, Message> {
    let text = String::from_utf8_lossy(input.as_ref());
    let mut builder = TreeBuilder::new(config.tree_builder);
    let mut tokenizer = Tokenizer::new(&text, config.tokenizer.clone());

    let result = tokenizer.run(&mut builder).and_then(|()| builder.finish());

    #[cfg(any(test, feature = "debug-stats"))]
    {
        let stats = tokenizer.stats();
        log::trace!(
            target: "xml",
            "transform: events={} lexical_errors={}",
            stats.events_emitted,
            stats.lexical_errors
        );
    }

    result.inspect_err(|message| {
        log::debug!(
            target: "xml",
            "transform aborted ({}) at {message}",
            message.rule_id
        );
    })
}

#[cfg(test)]
mod tests {
    use super::{TransformConfig, transform, transform_with_config};
    use crate::position::Point;
    use crate::types::Node;

    #[test]
    fn accepts_text_and_bytes() {
        let from_str = transform("<a>x</a>").expect("str input");
        let from_bytes = transform(b"<a>x</a>".as_slice()).expect("byte input");
        let from_vec = transform(&b"<a>x</a>".to_vec()).expect("vec input");
        assert_eq!(from_str, from_bytes);
        assert_eq!(from_str, from_vec);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let root = transform(b"<a>\xff</a>".as_slice()).expect("lossy decode");
        let Node::Element(element) = &root.children[0] else {
            panic!("expected element");
        };
        let Node::Text(text) = &element.children[0] else {
            panic!("expected text");
        };
        assert_eq!(text.value, "\u{fffd}");
        assert_eq!(text.position.end, Point::new(1, 5, 4));
    }

    #[test]
    fn config_reaches_the_tokenizer() {
        let mut config = TransformConfig::default();
        config.tokenizer.cdata_chunk_len = 1;
        let root = transform_with_config("<a><![CDATA[héllo]]></a>", &config).expect("cdata");
        let Node::Element(element) = &root.children[0] else {
            panic!("expected element");
        };
        let Node::Cdata(cdata) = &element.children[0] else {
            panic!("expected cdata");
        };
        assert_eq!(cdata.value, "héllo");
    }
}
