//! Doctype declaration parser.
//!
//! Parses the raw interior of `<!DOCTYPE …>` (everything after the keyword, up
//! to but excluding the closing `>`) into a name and optional external
//! identifiers. Internal subsets are not supported and are rejected.
//!
//! The parser is one left-to-right scan over the input followed by a virtual
//! end-of-input, driven by an explicit `(state, class)` match. Each character is
//! classified once; name and pubid predicates are only consulted by the states
//! that need them.

use crate::chars::{is_name_char, is_name_start_char, is_pubid_char, is_space};
use std::fmt;
use std::iter;

/// A parsed doctype declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DoctypeDecl {
    pub name: String,
    pub public: Option<String>,
    pub system: Option<String>,
}

/// Which rule a doctype violates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoctypeErrorCode {
    Name,
    InternalSubset,
    ExternalIdentifier,
    PublicLiteral,
    SystemLiteral,
    /// Internal subset after the system literal.
    TrailingInternalSubset,
    /// Anything else after the system literal.
    TrailingContent,
}

impl DoctypeErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "doctype-name",
            Self::InternalSubset => "doctype-internal-subset",
            Self::ExternalIdentifier => "doctype-external-identifier",
            Self::PublicLiteral => "doctype-public-literal",
            Self::SystemLiteral => "doctype-system-literal",
            Self::TrailingInternalSubset => "internal-subset",
            Self::TrailingContent => "system-literal",
        }
    }
}

impl fmt::Display for DoctypeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Doctype parse failure.
///
/// `index` is the byte offset into the raw input of the character that
/// triggered the failure, or the input length when the failure was detected at
/// end-of-input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoctypeError {
    pub code: DoctypeErrorCode,
    pub reason: &'static str,
    pub index: usize,
}

impl fmt::Display for DoctypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {} ({})", self.reason, self.index, self.code)
    }
}

impl std::error::Error for DoctypeError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Keyword {
    Public,
    System,
}

impl Keyword {
    const fn text(self) -> &'static [u8] {
        match self {
            Keyword::Public => b"PUBLIC",
            Keyword::System => b"SYSTEM",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Begin,
    BeforeName,
    InName { start: usize },
    AfterName,
    InKeyword { keyword: Keyword, matched: usize },
    AfterKeyword(Keyword),
    BeforeLiteral(Keyword),
    InLiteral { literal: Keyword, quote: char, start: usize },
    AfterPublicLiteral,
    AfterSystemLiteral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Class {
    Eof,
    Space(char),
    Quote(char),
    LeftBracket,
    Other(char),
}

impl Class {
    fn of(ch: Option<char>) -> Self {
        match ch {
            None => Class::Eof,
            Some(ch) if is_space(ch) => Class::Space(ch),
            Some(ch @ ('"' | '\'')) => Class::Quote(ch),
            Some('[') => Class::LeftBracket,
            Some(ch) => Class::Other(ch),
        }
    }

    fn char(self) -> Option<char> {
        match self {
            Class::Eof => None,
            Class::LeftBracket => Some('['),
            Class::Space(ch) | Class::Quote(ch) | Class::Other(ch) => Some(ch),
        }
    }
}

/// Parse the raw interior of a doctype declaration.
pub fn parse_doctype(raw: &str) -> Result<DoctypeDecl, DoctypeError> {
    let mut decl = DoctypeDecl::default();
    let mut state = State::Begin;

    let chars = raw
        .char_indices()
        .map(|(index, ch)| (index, Some(ch)))
        .chain(iter::once((raw.len(), None)));

    for (index, ch) in chars {
        state = step(state, Class::of(ch), index, raw, &mut decl)?;
    }

    Ok(decl)
}

fn step(
    state: State,
    class: Class,
    index: usize,
    raw: &str,
    decl: &mut DoctypeDecl,
) -> Result<State, DoctypeError> {
    let fail = |code, reason| Err(DoctypeError { code, reason, index });

    match (state, class) {
        (State::Begin, Class::Space(_)) => Ok(State::BeforeName),
        (State::Begin, _) => fail(DoctypeErrorCode::Name, "Expected doctype name"),

        (State::BeforeName, Class::Space(_)) => Ok(state),
        (State::BeforeName, Class::Other(ch)) if is_name_start_char(ch) => {
            Ok(State::InName { start: index })
        }
        (State::BeforeName, _) => fail(DoctypeErrorCode::Name, "Expected start of doctype name"),

        (State::InName { start }, Class::Space(_) | Class::Eof) => {
            decl.name = raw[start..index].to_string();
            Ok(State::AfterName)
        }
        (State::InName { .. }, Class::Other(ch)) if is_name_char(ch) => Ok(state),
        (State::InName { .. }, Class::LeftBracket) => fail(
            DoctypeErrorCode::InternalSubset,
            "Unexpected internal subset",
        ),
        (State::InName { .. }, _) => fail(
            DoctypeErrorCode::Name,
            "Expected doctype name character, whitespace, or doctype end",
        ),

        (State::AfterName, Class::Space(_) | Class::Eof) => Ok(state),
        (State::AfterName, Class::Other('P')) => Ok(State::InKeyword {
            keyword: Keyword::Public,
            matched: 1,
        }),
        (State::AfterName, Class::Other('S')) => Ok(State::InKeyword {
            keyword: Keyword::System,
            matched: 1,
        }),
        (State::AfterName, Class::LeftBracket) => fail(
            DoctypeErrorCode::InternalSubset,
            "Unexpected internal subset",
        ),
        (State::AfterName, _) => fail(
            DoctypeErrorCode::ExternalIdentifier,
            "Expected external identifier (`PUBLIC` or `SYSTEM`), whitespace, or doctype end",
        ),

        (State::InKeyword { keyword, matched }, Class::Other(ch))
            if keyword.text().get(matched).copied() == u8::try_from(ch).ok() =>
        {
            if matched + 1 == keyword.text().len() {
                Ok(State::AfterKeyword(keyword))
            } else {
                Ok(State::InKeyword {
                    keyword,
                    matched: matched + 1,
                })
            }
        }
        (State::InKeyword { .. }, _) => fail(
            DoctypeErrorCode::ExternalIdentifier,
            "Expected external identifier (`PUBLIC` or `SYSTEM`)",
        ),

        (State::AfterKeyword(keyword), Class::Space(_)) => Ok(State::BeforeLiteral(keyword)),
        (State::AfterKeyword(Keyword::Public), _) => fail(
            DoctypeErrorCode::PublicLiteral,
            "Expected whitespace after `PUBLIC`",
        ),
        (State::AfterKeyword(Keyword::System), _) => fail(
            DoctypeErrorCode::SystemLiteral,
            "Expected whitespace after `SYSTEM`",
        ),

        (State::BeforeLiteral(_), Class::Space(_)) => Ok(state),
        (State::BeforeLiteral(literal), Class::Quote(quote)) => Ok(State::InLiteral {
            literal,
            quote,
            start: index + 1,
        }),
        (State::BeforeLiteral(Keyword::Public), _) => fail(
            DoctypeErrorCode::PublicLiteral,
            "Expected quote or apostrophe to start public literal",
        ),
        (State::BeforeLiteral(Keyword::System), _) => fail(
            DoctypeErrorCode::SystemLiteral,
            "Expected quote or apostrophe to start system literal",
        ),

        (
            State::InLiteral {
                literal: Keyword::Public,
                quote,
                start,
            },
            Class::Quote(ch),
        ) if ch == quote => {
            decl.public = Some(raw[start..index].to_string());
            Ok(State::AfterPublicLiteral)
        }
        (
            State::InLiteral {
                literal: Keyword::Public,
                ..
            },
            _,
        ) if class.char().is_some_and(is_pubid_char) => Ok(state),
        (
            State::InLiteral {
                literal: Keyword::Public,
                ..
            },
            _,
        ) => fail(
            DoctypeErrorCode::PublicLiteral,
            "Expected pubid character in public literal",
        ),

        (
            State::InLiteral {
                literal: Keyword::System,
                ..
            },
            Class::Eof,
        ) => fail(
            DoctypeErrorCode::SystemLiteral,
            "Expected quote or apostrophe to end system literal",
        ),
        (
            State::InLiteral {
                literal: Keyword::System,
                quote,
                start,
            },
            Class::Quote(ch),
        ) if ch == quote => {
            decl.system = Some(raw[start..index].to_string());
            Ok(State::AfterSystemLiteral)
        }
        (
            State::InLiteral {
                literal: Keyword::System,
                ..
            },
            _,
        ) => Ok(state),

        (State::AfterPublicLiteral, Class::Space(_)) => {
            Ok(State::BeforeLiteral(Keyword::System))
        }
        (State::AfterPublicLiteral, _) => fail(
            DoctypeErrorCode::SystemLiteral,
            "Expected whitespace after public literal",
        ),

        (State::AfterSystemLiteral, Class::Space(_) | Class::Eof) => Ok(state),
        (State::AfterSystemLiteral, Class::LeftBracket) => fail(
            DoctypeErrorCode::TrailingInternalSubset,
            "Unexpected internal subset",
        ),
        (State::AfterSystemLiteral, _) => fail(
            DoctypeErrorCode::TrailingContent,
            "Expected whitespace or end of doctype",
        ),
    }
}
