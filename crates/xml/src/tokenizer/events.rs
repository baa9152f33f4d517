//! Token source event model.

use crate::error::Message;
use crate::position::Point;
use crate::types::Attributes;

/// One lexical event, in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaxEvent {
    /// Raw doctype interior: everything after the `DOCTYPE` keyword up to the
    /// closing `>`.
    Doctype(String),
    /// Any `<!…>` declaration that is not a doctype, comment, or CDATA section.
    SgmlDeclaration(String),
    ProcessingInstruction {
        name: String,
        body: String,
    },
    Text(String),
    Comment(String),
    CdataOpen,
    CdataValue(String),
    CdataClose,
    TagOpen {
        name: String,
        attributes: Attributes,
    },
    TagClose(String),
    /// Lexical error. The first line is the reason; later lines are detail.
    Error(String),
}

/// Receives token source events.
///
/// `now` is the token source's cursor at the moment the event fires. Returning
/// an error stops the token source.
pub trait EventSink {
    fn event(&mut self, event: SaxEvent, now: Point) -> Result<(), Message>;
}

/// Event sink that buffers into a Vec.
pub struct VecEventSink<'a>(pub &'a mut Vec<(SaxEvent, Point)>);

impl EventSink for VecEventSink<'_> {
    fn event(&mut self, event: SaxEvent, now: Point) -> Result<(), Message> {
        self.0.push((event, now));
        Ok(())
    }
}
