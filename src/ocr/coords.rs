// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Minimal parser for nested numeric list literals
//!
//! Accepts only numbers, commas, square brackets and whitespace, e.g.
//! `[[312, 339, 480, 681], [504, 700, 625, 910]]`. Anything else is
//! rejected; there is no general expression evaluation.

use thiserror::Error;

/// Deepest bracket nesting accepted before giving up
const MAX_DEPTH: usize = 32;

/// A parsed literal: a number or a list of literals
#[derive(Debug, Clone, PartialEq)]
pub enum CoordValue {
    Number(f64),
    List(Vec<CoordValue>),
}

impl CoordValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CoordValue::Number(n) => Some(*n),
            CoordValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[CoordValue]> {
        match self {
            CoordValue::List(items) => Some(items),
            CoordValue::Number(_) => None,
        }
    }

    /// First four entries as numbers, if this is a list of at least four numbers
    pub fn leading_quad(&self) -> Option<[f64; 4]> {
        let items = self.as_list()?;
        if items.len() < 4 {
            return None;
        }
        Some([
            items[0].as_number()?,
            items[1].as_number()?,
            items[2].as_number()?,
            items[3].as_number()?,
        ])
    }
}

/// Errors from parsing a coordinate literal
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordParseError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),

    #[error("nesting deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// Parse a complete literal; surrounding whitespace is allowed
pub fn parse_coord_literal(input: &str) -> Result<CoordValue, CoordParseError> {
    let mut parser = Parser { input, pos: 0 };
    let value = parser.value(0)?;
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(CoordParseError::TrailingInput(parser.pos));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn value(&mut self, depth: usize) -> Result<CoordValue, CoordParseError> {
        self.skip_ws();
        match self.peek() {
            None => Err(CoordParseError::UnexpectedEnd),
            Some('[') => self.list(depth + 1),
            Some(ch) if ch == '-' || ch == '+' || ch == '.' || ch.is_ascii_digit() => {
                self.number()
            }
            Some(ch) => Err(CoordParseError::UnexpectedChar {
                ch,
                offset: self.pos,
            }),
        }
    }

    fn list(&mut self, depth: usize) -> Result<CoordValue, CoordParseError> {
        if depth > MAX_DEPTH {
            return Err(CoordParseError::TooDeep);
        }
        // consume '['
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(CoordParseError::UnexpectedEnd),
                Some(']') => {
                    self.pos += 1;
                    return Ok(CoordValue::List(items));
                }
                Some(_) => {}
            }

            items.push(self.value(depth)?);

            self.skip_ws();
            match self.peek() {
                None => return Err(CoordParseError::UnexpectedEnd),
                // A trailing comma before ']' is tolerated
                Some(',') => self.pos += 1,
                Some(']') => {}
                Some(ch) => {
                    return Err(CoordParseError::UnexpectedChar {
                        ch,
                        offset: self.pos,
                    })
                }
            }
        }
    }

    fn number(&mut self) -> Result<CoordValue, CoordParseError> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let mut end = start;

        if matches!(bytes.get(end), Some(b'-') | Some(b'+')) {
            end += 1;
        }
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }
        if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
            end += 1;
            if matches!(bytes.get(end), Some(b'-') | Some(b'+')) {
                end += 1;
            }
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }

        let literal = &self.input[start..end];
        self.pos = end;
        literal
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(CoordValue::Number)
            .ok_or_else(|| CoordParseError::InvalidNumber(literal.to_string()))
    }
}
