//! End-position corrections for token sources whose cursor lags or leads the
//! true end of some constructs.
//!
//! The built-in tokenizer reports:
//! - comments one character before the closing `>` of `-->`;
//! - text after it has already consumed the `<` that ends the run.
//!
//! A token source that reports exact ends uses [`PositionCorrection::None`].
//! The comment adjustment assumes the four-character `-->` terminator.

use crate::position::Point;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PositionCorrection {
    /// Compensate for the built-in tokenizer's cursor.
    #[default]
    TokenSourceQuirks,
    /// Trust the token source's cursor as-is.
    None,
}

impl PositionCorrection {
    /// True end of a comment whose exit was stamped at `reported`.
    pub fn comment_end(self, reported: Point) -> Point {
        match self {
            PositionCorrection::TokenSourceQuirks => Point {
                column: reported.column + 1,
                offset: reported.offset + 1,
                ..reported
            },
            PositionCorrection::None => reported,
        }
    }

    /// True end of a text node starting at `start` with content `value`.
    pub fn text_end(self, start: Point, value: &str, reported: Point) -> Point {
        match self {
            PositionCorrection::TokenSourceQuirks => start.walked(value),
            PositionCorrection::None => reported,
        }
    }

    /// Where the node after a text run starts, given the run's corrected `end`.
    ///
    /// `end` is walked over the decoded value, so a character reference that
    /// decodes to a line break can carry it past the source. The cursor then
    /// never moves beyond `reported`, minus the `<` the tokenizer looked at.
    pub fn text_cursor(self, end: Point, reported: Point) -> Point {
        match self {
            PositionCorrection::TokenSourceQuirks if end.precedes_or_equals(&reported) => end,
            PositionCorrection::TokenSourceQuirks if reported.column > 1 => Point {
                column: reported.column - 1,
                offset: reported.offset - 1,
                ..reported
            },
            PositionCorrection::TokenSourceQuirks | PositionCorrection::None => reported,
        }
    }
}
