//! Positioned diagnostics.

use crate::doctype::DoctypeErrorCode;
use crate::position::Point;
use std::fmt;

/// Source tag attached to every message produced by this crate.
pub const SOURCE: &str = "xast-util-from-xml";

/// What kind of problem a [`Message`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleId {
    /// Malformed XML reported by the token source.
    Lexer,
    /// An SGML declaration other than a doctype.
    UnexpectedSgml,
    /// A doctype declaration that does not follow the XML grammar.
    Doctype(DoctypeErrorCode),
    /// Engine invariant violation (bug), not an input error.
    Internal,
}

impl RuleId {
    pub const fn as_str(self) -> &'static str {
        match self {
            RuleId::Lexer => "lexer",
            RuleId::UnexpectedSgml => "unexpected-sgml",
            RuleId::Doctype(code) => code.as_str(),
            RuleId::Internal => "internal",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal, positioned problem found while transforming XML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub reason: String,
    pub point: Point,
    pub rule_id: RuleId,
    pub source: &'static str,
}

impl Message {
    pub fn new(reason: impl Into<String>, point: Point, rule_id: RuleId) -> Self {
        Self {
            reason: reason.into(),
            point,
            rule_id,
            source: SOURCE,
        }
    }

    /// Wrap an error reported by the token source.
    ///
    /// Token sources may append multi-line detail (line, column, offending
    /// character) to the reason; only the first line is kept.
    pub fn lexer(detail: &str, point: Point) -> Self {
        let reason = detail.split_once('\n').map_or(detail, |(first, _)| first);
        Self::new(reason, point, RuleId::Lexer)
    }

    pub fn internal(reason: impl Into<String>, point: Point) -> Self {
        Self::new(reason, point, RuleId::Internal)
    }

    pub fn is_internal(&self) -> bool {
        self.rule_id == RuleId::Internal
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.point.line, self.point.column, self.reason
        )
    }
}

impl std::error::Error for Message {}
