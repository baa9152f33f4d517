//! Points and positions attached to xast nodes.

use serde::Serialize;

/// One place in the input.
///
/// `line` and `column` are 1-based, `offset` is 0-based. Columns and offsets
/// count Unicode scalar values, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Point {
    /// The point before the first character of any input.
    pub const START: Point = Point {
        line: 1,
        column: 1,
        offset: 0,
    };

    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Move past one character.
    ///
    /// `after_cr` must be true when the previous character was `\r`, so that
    /// `\r\n` counts as a single line break.
    pub fn advance_char(&mut self, ch: char, after_cr: bool) {
        self.offset += 1;
        match ch {
            '\n' if after_cr => {}
            '\n' | '\r' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
    }

    /// Move past every character of `text`.
    pub fn advance_str(&mut self, text: &str) {
        let mut after_cr = false;
        for ch in text.chars() {
            self.advance_char(ch, after_cr);
            after_cr = ch == '\r';
        }
    }

    /// Return a copy of `self` moved past `text`.
    pub fn walked(mut self, text: &str) -> Self {
        self.advance_str(text);
        self
    }

    /// Lexicographic `(line, column)` comparison.
    pub fn precedes_or_equals(&self, other: &Point) -> bool {
        (self.line, self.column) <= (other.line, other.column)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::START
    }
}

/// Start and end points of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub start: Point,
    pub end: Point,
}

impl Position {
    pub fn new(start: Point, end: Point) -> Self {
        debug_assert!(start.offset <= end.offset, "position start must be <= end");
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::Point;

    #[test]
    fn advance_counts_columns_and_offsets() {
        let point = Point::START.walked("abc");
        assert_eq!(point, Point::new(1, 4, 3));
    }

    #[test]
    fn every_line_break_flavor_counts_once() {
        assert_eq!(Point::START.walked("a\nb"), Point::new(2, 2, 3));
        assert_eq!(Point::START.walked("a\rb"), Point::new(2, 2, 3));
        assert_eq!(Point::START.walked("a\r\nb"), Point::new(2, 2, 4));
        assert_eq!(Point::START.walked("\n\r\n\r"), Point::new(4, 1, 4));
    }

    #[test]
    fn multibyte_characters_count_as_one() {
        assert_eq!(Point::START.walked("é🤔"), Point::new(1, 3, 2));
    }

    #[test]
    fn line_column_ordering_is_lexicographic() {
        let a = Point::new(1, 9, 8);
        let b = Point::new(2, 1, 9);
        assert!(a.precedes_or_equals(&b));
        assert!(!b.precedes_or_equals(&a));
        assert!(a.precedes_or_equals(&a));
    }
}
