//! Decoder for literal-encoded trade histories.
//!
//! Exports store each account's trades as the printed form of a list of
//! dictionaries, e.g.
//!
//! ```text
//! [{'time': 1718899656695, 'symbol': 'SOLUSDT', 'qty': 11.0, 'activeBuy': False}]
//! ```
//!
//! The grammar accepted here is the literal subset of that syntax plus
//! plain JSON:
//! - strings in single or double quotes (with adjacent-literal concatenation)
//! - integers (decimal, `0x`, `0o`, `0b`), floats, exponents, `_` digit
//!   separators and at most one unary sign
//! - `True`/`False`/`None` and `true`/`false`/`null`
//! - lists `[..]`, tuples `(..)`, dicts `{k: v}` and sets `{a, b}`
//!
//! Complex numbers and bytes literals are rejected. Tuples and sets decode to arrays. Non-string dict keys are rendered as
//! text so every mapping becomes a JSON object.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Maximum nesting depth before decoding is rejected.
const MAX_DEPTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

impl LiteralError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

pub type LiteralResult<T> = Result<T, LiteralError>;

/// Decode a complete literal expression. Trailing non-whitespace is an error.
pub fn decode(input: &str) -> LiteralResult<Value> {
    let mut parser = Parser::new(input);
    parser.skip_whitespace();
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if parser.pos < parser.bytes.len() {
        return Err(LiteralError::new(parser.pos, "unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, byte: u8) -> LiteralResult<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", byte as char)))
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError::new(self.pos, message)
    }

    fn parse_value(&mut self, depth: usize) -> LiteralResult<Value> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }

        match self.peek() {
            Some(b'[') => {
                self.pos += 1;
                self.parse_sequence(b']', depth).map(Value::Array)
            }
            Some(b'(') => {
                self.pos += 1;
                self.parse_sequence(b')', depth).map(Value::Array)
            }
            Some(b'{') => {
                self.pos += 1;
                self.parse_braced(depth)
            }
            Some(b'\'') | Some(b'"') => self.parse_strings().map(Value::String),
            Some(b) if b == b'-' || b == b'+' || b == b'.' || b.is_ascii_digit() => {
                self.parse_number()
            }
            Some(b) if b.is_ascii_alphabetic() => self.parse_keyword(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Comma-separated values up to `close`, allowing a trailing comma.
    fn parse_sequence(&mut self, close: u8, depth: usize) -> LiteralResult<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == close => {
                    self.pos += 1;
                    return Ok(items);
                }
                _ => return Err(self.error(format!("expected ',' or '{}'", close as char))),
            }
        }
    }

    /// `{` already consumed. Decides between a dict and a set on the first item.
    fn parse_braced(&mut self, depth: usize) -> LiteralResult<Value> {
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Object(Map::new()));
        }

        let first = self.parse_value(depth + 1)?;
        self.skip_whitespace();
        if self.peek() != Some(b':') {
            // Set literal
            let mut items = vec![first];
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    items.extend(self.parse_sequence(b'}', depth)?);
                }
                _ => self.expect(b'}')?,
            }
            return Ok(Value::Array(items));
        }

        let mut map = Map::new();
        let mut key = first;
        loop {
            self.expect(b':')?;
            self.skip_whitespace();
            let value = self.parse_value(depth + 1)?;
            map.insert(key_text(key), value);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek() == Some(b'}') {
                        self.pos += 1;
                        return Ok(Value::Object(map));
                    }
                    key = self.parse_value(depth + 1)?;
                    self.skip_whitespace();
                }
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn parse_strings(&mut self) -> LiteralResult<String> {
        let mut out = self.parse_string()?;
        loop {
            let save = self.pos;
            self.skip_whitespace();
            match self.peek() {
                Some(b'\'') | Some(b'"') => out.push_str(&self.parse_string()?),
                _ => {
                    self.pos = save;
                    return Ok(out);
                }
            }
        }
    }

    fn parse_string(&mut self) -> LiteralResult<String> {
        let quote = match self.peek() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return Err(self.error("expected string")),
        };
        self.pos += 1;

        let mut out = String::new();
        loop {
            let rest = &self.src[self.pos..];
            let mut chars = rest.chars();
            let c = chars
                .next()
                .ok_or_else(|| self.error("unterminated string"))?;
            self.pos += c.len_utf8();

            match c {
                '\n' => return Err(self.error("newline in string")),
                '\\' => self.parse_escape(&mut out)?,
                c if c as u32 == quote as u32 => return Ok(out),
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> LiteralResult<()> {
        let c = self
            .src[self.pos..]
            .chars()
            .next()
            .ok_or_else(|| self.error("unterminated escape"))?;
        self.pos += c.len_utf8();

        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            '/' => out.push('/'),
            '\n' => {}
            'x' => out.push(self.parse_hex_escape(2)?),
            'u' => out.push(self.parse_hex_escape(4)?),
            'U' => out.push(self.parse_hex_escape(8)?),
            // Unknown escapes keep the backslash.
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn parse_hex_escape(&mut self, digits: usize) -> LiteralResult<char> {
        let end = self.pos + digits;
        let hex = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid hex escape"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }

    fn parse_number(&mut self) -> LiteralResult<Value> {
        let start = self.pos;
        let mut negative = false;
        if let Some(sign @ (b'-' | b'+')) = self.peek() {
            negative = sign == b'-';
            self.pos += 1;
            self.skip_whitespace();
        }

        let digits_start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' {
                self.pos += 1;
            } else if (b == b'-' || b == b'+')
                && matches!(self.bytes.get(self.pos - 1), Some(b'e' | b'E'))
                && !is_radix_prefixed(&self.src[digits_start..self.pos])
            {
                self.pos += 1;
            } else {
                break;
            }
        }

        let text: String = self.src[digits_start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        if text.is_empty() || !text.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return Err(LiteralError::new(start, "invalid number"));
        }

        if is_radix_prefixed(&text) {
            let radix = match text.as_bytes()[1] {
                b'x' | b'X' => 16,
                b'o' | b'O' => 8,
                _ => 2,
            };
            let magnitude = u128::from_str_radix(&text[2..], radix)
                .map_err(|_| LiteralError::new(start, "invalid number"))?;
            return Ok(signed_integer(magnitude, negative));
        }

        let is_float = text.contains(['.', 'e', 'E']);
        if !is_float {
            if text.len() > 1 && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
                return Err(LiteralError::new(start, "leading zeros in integer"));
            }
            if let Ok(magnitude) = text.parse::<u128>() {
                return Ok(signed_integer(magnitude, negative));
            }
        }

        let float: f64 = text
            .parse()
            .map_err(|_| LiteralError::new(start, "invalid number"))?;
        let float = if negative { -float } else { float };
        Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| LiteralError::new(start, "number out of range"))
    }

    fn parse_keyword(&mut self) -> LiteralResult<Value> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }

        match &self.src[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            other => Err(LiteralError::new(
                start,
                format!("unsupported name '{}'", other),
            )),
        }
    }
}

/// `0x`, `0o` and `0b` integer prefixes.
fn is_radix_prefixed(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
}

/// Integers outside the `i64` range widen to floats.
fn signed_integer(magnitude: u128, negative: bool) -> Value {
    let signed = if negative {
        0i128.checked_sub_unsigned(magnitude)
    } else {
        i128::try_from(magnitude).ok()
    };
    match signed.and_then(|v| i64::try_from(v).ok()) {
        Some(int) => Value::Number(Number::from(int)),
        None => {
            let float = magnitude as f64;
            Value::Number(
                Number::from_f64(if negative { -float } else { float })
                    .unwrap_or_else(|| Number::from(0)),
            )
        }
    }
}

/// Dict keys are always stored as text.
fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}
