//! Built-in XML token source.
//!
//! Scans a complete, decoded input and reports lexical events to an
//! [`EventSink`], together with a live cursor. The tokenizer owns everything
//! the tree builder does not: entity resolution, attribute quoting, tag-nesting
//! validation, and raw character scanning.
//!
//! Cursor contract (what `now` means for each event):
//! - most events fire once the character completing the construct has been
//!   consumed (`>` of a tag, `?>`, `]]>`, doctype or declaration);
//! - comments fire after the `--` of `-->`, before the final `>`;
//! - text fires after the `<` that ends the run has been looked at.
//!
//! The tree builder's [`crate::correction`] module compensates for the last two.
//!
//! The first lexical error is reported as [`SaxEvent::Error`] and stops the scan.

use crate::chars::{is_name_char, is_name_start_char, is_space};
use crate::error::Message;
use crate::position::Point;
use crate::types::Attributes;
use entities::resolve_entity;
use memchr::{memchr, memchr2, memmem};

mod entities;
mod events;

pub use events::{EventSink, SaxEvent, VecEventSink};

const COMMENT_OPEN: &str = "<!--";
const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &[u8] = b"]]>";
const DOCTYPE_OPEN: &[u8] = b"<!DOCTYPE";
const PI_CLOSE: &[u8] = b"?>";

/// Configuration for the tokenizer.
#[derive(Clone, Debug)]
pub struct TokenizerConfig {
    /// Maximum byte length of one `CdataValue` event. Longer sections are split
    /// on character boundaries.
    pub cdata_chunk_len: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            cdata_chunk_len: 64 * 1024,
        }
    }
}

/// Minimal tokenizer instrumentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenizerStats {
    pub events_emitted: u64,
    pub lexical_errors: u64,
}

/// Why a scan stopped early.
enum Halt {
    /// The sink rejected an event.
    Sink(Message),
    /// A lexical error was reported and accepted by the sink.
    Lexical,
}

type Scan<T = ()> = Result<T, Halt>;

/// XML tokenizer over one complete input.
pub struct Tokenizer<'a> {
    config: TokenizerConfig,
    input: &'a str,
    /// Byte index of the next unconsumed character.
    pos: usize,
    /// Cursor at `pos`.
    point: Point,
    after_cr: bool,
    open_tags: Vec<String>,
    saw_root: bool,
    saw_doctype: bool,
    stats: TokenizerStats,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str, config: TokenizerConfig) -> Self {
        Self {
            config,
            input,
            pos: 0,
            point: Point::START,
            after_cr: false,
            open_tags: Vec::new(),
            saw_root: false,
            saw_doctype: false,
            stats: TokenizerStats::default(),
        }
    }

    /// Current cursor: line, column, and offset of the next unconsumed character.
    pub fn now(&self) -> Point {
        self.point
    }

    /// Return a copy of current instrumentation counters.
    pub fn stats(&self) -> TokenizerStats {
        self.stats
    }

    /// Scan the whole input, feeding `sink`.
    ///
    /// Returns the sink's error if it rejected an event. A lexical error the
    /// sink accepted ends the scan with `Ok(())`.
    pub fn run<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), Message> {
        match self.scan(sink) {
            Ok(()) | Err(Halt::Lexical) => Ok(()),
            Err(Halt::Sink(message)) => Err(message),
        }
    }

    fn scan<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        while self.pos < self.input.len() {
            if self.input.as_bytes()[self.pos] == b'<' {
                self.markup(sink)?;
            } else {
                self.text(sink)?;
            }
        }
        if !self.open_tags.is_empty() {
            return self.fail(sink, "Unclosed root tag");
        }
        Ok(())
    }

    fn markup<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        let rest = &self.input[self.pos..];
        if rest.starts_with(COMMENT_OPEN) {
            self.comment(sink)
        } else if rest.starts_with(CDATA_OPEN) {
            self.cdata(sink)
        } else if rest
            .as_bytes()
            .get(..DOCTYPE_OPEN.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(DOCTYPE_OPEN))
        {
            self.doctype(sink)
        } else if rest.starts_with("<!") {
            self.sgml_declaration(sink)
        } else if rest.starts_with("<?") {
            self.processing_instruction(sink)
        } else if rest.starts_with("</") {
            self.close_tag(sink)
        } else {
            self.open_tag(sink)
        }
    }

    fn text<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        let input = self.input;
        let start = self.pos;
        let end = memchr(b'<', &input.as_bytes()[start..]).map_or(input.len(), |rel| start + rel);

        if self.open_tags.is_empty()
            && let Some((rel, ch)) = input[start..end]
                .char_indices()
                .find(|&(_, ch)| !is_space(ch))
        {
            return self.fail_at(
                sink,
                start + rel + ch.len_utf8(),
                "Text data outside of root node.",
            );
        }

        let value = self.decode(sink, start, end)?;
        self.advance_to(end);
        // The run is only known to be over once the `<` after it has been seen.
        let now = if end < input.len() {
            self.point.walked("<")
        } else {
            self.point
        };
        self.emit_at(sink, SaxEvent::Text(value), now)
    }

    fn comment<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        let input = self.input;
        let body_start = self.pos + COMMENT_OPEN.len();
        let Some(rel) = memmem::find(&input.as_bytes()[body_start..], b"--") else {
            return self.unexpected_end(sink);
        };
        let dashes = body_start + rel;
        let after_dashes = dashes + 2;
        match input.as_bytes().get(after_dashes) {
            Some(b'>') => {
                self.advance_to(after_dashes);
                self.emit(sink, SaxEvent::Comment(input[body_start..dashes].to_string()))?;
                self.advance_to(after_dashes + 1);
                Ok(())
            }
            Some(_) => {
                let after = self.char_end(after_dashes);
                self.fail_at(sink, after, "Malformed comment")
            }
            None => self.unexpected_end(sink),
        }
    }

    fn cdata<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        let input = self.input;
        let content_start = self.pos + CDATA_OPEN.len();
        if self.open_tags.is_empty() {
            return self.fail_at(
                sink,
                content_start,
                "Unexpected CDATA section outside of root node",
            );
        }
        self.advance_to(content_start);
        self.emit(sink, SaxEvent::CdataOpen)?;

        let Some(rel) = memmem::find(&input.as_bytes()[content_start..], CDATA_CLOSE) else {
            return self.unexpected_end(sink);
        };
        let content_end = content_start + rel;
        self.advance_to(content_end + CDATA_CLOSE.len());
        for chunk in chunks(&input[content_start..content_end], self.config.cdata_chunk_len) {
            self.emit(sink, SaxEvent::CdataValue(chunk.to_string()))?;
        }
        self.emit(sink, SaxEvent::CdataClose)
    }

    fn doctype<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        let input = self.input;
        let raw_start = self.pos + DOCTYPE_OPEN.len();
        if self.saw_root || self.saw_doctype {
            return self.fail_at(
                sink,
                raw_start,
                "Inappropriately located doctype declaration",
            );
        }
        let Some(close) = find_declaration_end(input.as_bytes(), raw_start, true) else {
            return self.unexpected_end(sink);
        };
        self.saw_doctype = true;
        self.advance_to(close + 1);
        self.emit(sink, SaxEvent::Doctype(input[raw_start..close].to_string()))
    }

    fn sgml_declaration<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        let input = self.input;
        let body_start = self.pos + 2;
        let Some(close) = find_declaration_end(input.as_bytes(), body_start, false) else {
            return self.unexpected_end(sink);
        };
        self.advance_to(close + 1);
        self.emit(
            sink,
            SaxEvent::SgmlDeclaration(input[body_start..close].to_string()),
        )
    }

    fn processing_instruction<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        let input = self.input;
        let inner_start = self.pos + 2;
        let Some(rel) = memmem::find(&input.as_bytes()[inner_start..], PI_CLOSE) else {
            return self.unexpected_end(sink);
        };
        let inner_end = inner_start + rel;
        let inner = &input[inner_start..inner_end];
        let (name, body) = match inner.find(is_space) {
            Some(split) => (&inner[..split], inner[split..].trim_start_matches(is_space)),
            None => (inner, ""),
        };
        if name.is_empty() {
            let after = self.char_end(inner_start);
            return self.fail_at(sink, after, "Processing instruction without target");
        }
        self.advance_to(inner_end + PI_CLOSE.len());
        self.emit(
            sink,
            SaxEvent::ProcessingInstruction {
                name: name.to_string(),
                body: body.to_string(),
            },
        )
    }

    fn close_tag<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        let input = self.input;
        let name_start = self.pos + 2;
        let name_end = scan_name(input, name_start);
        let index = if name_end == name_start {
            name_start
        } else {
            skip_spaces(input, name_end)
        };

        match input[index..].chars().next() {
            None => self.unexpected_end(sink),
            Some('>') if name_end > name_start => {
                let name = &input[name_start..name_end];
                self.advance_to(index + 1);
                match self.open_tags.last().map(|open| open.as_str() == name) {
                    None => self.fail(sink, &format!("Unmatched closing tag: {name}")),
                    Some(false) => self.fail(sink, "Unexpected close tag"),
                    Some(true) => {
                        self.open_tags.pop();
                        self.emit(sink, SaxEvent::TagClose(name.to_string()))
                    }
                }
            }
            Some(ch) => self.fail_at(
                sink,
                index + ch.len_utf8(),
                "Invalid characters in closing tag",
            ),
        }
    }

    fn open_tag<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan {
        let input = self.input;
        let name_start = self.pos + 1;
        let name_end = scan_name(input, name_start);
        if name_end == name_start {
            return match input[name_start..].chars().next() {
                None => self.unexpected_end(sink),
                Some(ch) => self.fail_at(sink, name_start + ch.len_utf8(), "Unencoded <"),
            };
        }
        let name = &input[name_start..name_end];

        let mut attributes = Attributes::new();
        let mut index = name_end;
        let self_closing = loop {
            let after_space = skip_spaces(input, index);
            let had_space = after_space > index;
            index = after_space;
            let Some(ch) = input[index..].chars().next() else {
                return self.unexpected_end(sink);
            };
            match ch {
                '>' => break false,
                '/' => match input[index + 1..].chars().next() {
                    Some('>') => {
                        index += 1;
                        break true;
                    }
                    Some(next) => {
                        return self.fail_at(
                            sink,
                            index + 1 + next.len_utf8(),
                            "Forward-slash in opening tag not followed by >",
                        );
                    }
                    None => return self.unexpected_end(sink),
                },
                ch if is_name_start_char(ch) => {
                    if !had_space {
                        return self.fail_at(
                            sink,
                            index + ch.len_utf8(),
                            "No whitespace between attributes",
                        );
                    }
                    index = self.attribute(sink, index, &mut attributes)?;
                }
                ch => {
                    return self.fail_at(sink, index + ch.len_utf8(), "Invalid character in tag");
                }
            }
        };

        self.advance_to(index + 1);
        self.saw_root = true;
        self.emit(
            sink,
            SaxEvent::TagOpen {
                name: name.to_string(),
                attributes,
            },
        )?;
        if self_closing {
            self.emit(sink, SaxEvent::TagClose(name.to_string()))
        } else {
            self.open_tags.push(name.to_string());
            Ok(())
        }
    }

    /// Parse one `name="value"` pair starting at `start`; returns the index
    /// after the closing quote.
    fn attribute<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
        start: usize,
        attributes: &mut Attributes,
    ) -> Scan<usize> {
        let input = self.input;
        let name_end = scan_name(input, start);
        let name = &input[start..name_end];

        let mut index = skip_spaces(input, name_end);
        match input[index..].chars().next() {
            Some('=') => index += 1,
            Some(ch) => {
                return self.fail_at(sink, index + ch.len_utf8(), "Attribute without value");
            }
            None => return self.unexpected_end(sink),
        }

        index = skip_spaces(input, index);
        let quote = match input[index..].chars().next() {
            Some(quote @ ('"' | '\'')) => quote as u8,
            Some(ch) => {
                return self.fail_at(sink, index + ch.len_utf8(), "Unquoted attribute value");
            }
            None => return self.unexpected_end(sink),
        };

        let value_start = index + 1;
        let Some(rel) = memchr(quote, &input.as_bytes()[value_start..]) else {
            return self.unexpected_end(sink);
        };
        let value_end = value_start + rel;
        if let Some(lt) = memchr(b'<', &input.as_bytes()[value_start..value_end]) {
            return self.fail_at(
                sink,
                value_start + lt + 1,
                "Invalid character in attribute value",
            );
        }

        let value = self.decode(sink, value_start, value_end)?;
        attributes.insert(name, value);
        Ok(value_end + 1)
    }

    /// Copy `input[start..end]`, resolving entity references.
    fn decode<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
        start: usize,
        end: usize,
    ) -> Scan<String> {
        let input = self.input;
        let mut out = String::with_capacity(end - start);
        let mut copied = start;
        while let Some(rel) = memchr(b'&', &input.as_bytes()[copied..end]) {
            let amp = copied + rel;
            out.push_str(&input[copied..amp]);
            let (ch, after) = self.entity(sink, amp, end)?;
            out.push(ch);
            copied = after;
        }
        out.push_str(&input[copied..end]);
        Ok(out)
    }

    /// Resolve the reference at `amp`; returns the character and the index
    /// after its `;`.
    fn entity<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
        amp: usize,
        end: usize,
    ) -> Scan<(char, usize)> {
        let input = self.input;
        let name_start = amp + 1;
        for (rel, ch) in input[name_start..end].char_indices() {
            let index = name_start + rel;
            if ch == ';' {
                return match resolve_entity(&input[name_start..index]) {
                    Some(resolved) => Ok((resolved, index + 1)),
                    None => self.fail_at(sink, index + 1, "Invalid character entity"),
                };
            }
            let valid = if rel == 0 {
                ch == '#' || is_name_start_char(ch)
            } else {
                is_name_char(ch)
            };
            if !valid {
                return self.fail_at(
                    sink,
                    index + ch.len_utf8(),
                    "Invalid character in entity name",
                );
            }
        }
        // The reference ran into the delimiter that ends its text run or value.
        if end < input.len() {
            let after = self.char_end(end);
            self.fail_at(sink, after, "Invalid character in entity name")
        } else {
            self.unexpected_end(sink)
        }
    }

    /// Move the cursor forward to byte index `end`.
    fn advance_to(&mut self, end: usize) {
        debug_assert!(end >= self.pos, "tokenizer cursor only moves forward");
        let consumed = &self.input[self.pos..end];
        if consumed.is_empty() {
            return;
        }
        if memchr2(b'\n', b'\r', consumed.as_bytes()).is_none() {
            let count = consumed.chars().count();
            self.point.column += count;
            self.point.offset += count;
            self.after_cr = false;
        } else {
            for ch in consumed.chars() {
                self.point.advance_char(ch, self.after_cr);
                self.after_cr = ch == '\r';
            }
        }
        self.pos = end;
    }

    /// Byte index just past the character at `index`.
    fn char_end(&self, index: usize) -> usize {
        index
            + self.input[index..]
                .chars()
                .next()
                .map_or(0, char::len_utf8)
    }

    fn emit<S: EventSink + ?Sized>(&mut self, sink: &mut S, event: SaxEvent) -> Scan {
        let now = self.point;
        self.emit_at(sink, event, now)
    }

    fn emit_at<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
        event: SaxEvent,
        now: Point,
    ) -> Scan {
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "xml.tokenizer", "emit {event:?} @{}:{}", now.line, now.column);
        self.stats.events_emitted = self.stats.events_emitted.saturating_add(1);
        sink.event(event, now).map_err(Halt::Sink)
    }

    fn unexpected_end<T, S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Scan<T> {
        self.fail_at(sink, self.input.len(), "Unexpected end")
    }

    /// Consume up to `end` (just past the offending character), then fail.
    fn fail_at<T, S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
        end: usize,
        reason: &str,
    ) -> Scan<T> {
        self.advance_to(end);
        self.fail(sink, reason)
    }

    /// Report a lexical error at the current cursor and stop.
    fn fail<T, S: EventSink + ?Sized>(&mut self, sink: &mut S, reason: &str) -> Scan<T> {
        let last = self.input[..self.pos]
            .chars()
            .next_back()
            .map(|ch| ch.escape_debug().to_string())
            .unwrap_or_default();
        let detail = format!(
            "{reason}\nLine: {}\nColumn: {}\nChar: {last}",
            self.point.line - 1,
            self.point.column - 1
        );
        log::debug!(
            target: "xml.tokenizer",
            "lexical error at {}:{}: {reason}",
            self.point.line,
            self.point.column
        );
        self.stats.lexical_errors = self.stats.lexical_errors.saturating_add(1);
        self.emit(sink, SaxEvent::Error(detail))?;
        Err(Halt::Lexical)
    }
}

/// Index just past the longest XML name starting at `start` (`start` itself
/// when no name starts there).
fn scan_name(input: &str, start: usize) -> usize {
    let mut end = start;
    for (rel, ch) in input[start..].char_indices() {
        let valid = if rel == 0 {
            is_name_start_char(ch)
        } else {
            is_name_char(ch)
        };
        if !valid {
            break;
        }
        end = start + rel + ch.len_utf8();
    }
    end
}

fn skip_spaces(input: &str, start: usize) -> usize {
    let rest = &input[start..];
    start + rest.len() - rest.trim_start_matches(is_space).len()
}

/// Index of the `>` closing a declaration whose body starts at `from`.
///
/// Quoted strings never end a declaration; with `brackets`, neither does a `>`
/// inside `[…]`.
fn find_declaration_end(bytes: &[u8], from: usize, brackets: bool) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    for (rel, &byte) in bytes[from..].iter().enumerate() {
        match (quote, byte) {
            (Some(open), byte) if byte == open => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'[') if brackets => depth += 1,
            (None, b']') if brackets && depth > 0 => depth -= 1,
            (None, b'>') if depth == 0 => return Some(from + rel),
            _ => {}
        }
    }
    None
}

/// Split `text` into pieces of at most `max_len` bytes on char boundaries.
/// A single character longer than `max_len` becomes its own piece.
fn chunks(text: &str, max_len: usize) -> impl Iterator<Item = &str> {
    let max_len = max_len.max(1);
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut split = max_len.min(rest.len());
        while split > 0 && !rest.is_char_boundary(split) {
            split -= 1;
        }
        if split == 0 {
            split = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (chunk, tail) = rest.split_at(split);
        rest = tail;
        Some(chunk)
    })
}

#[cfg(test)]
mod tests;
