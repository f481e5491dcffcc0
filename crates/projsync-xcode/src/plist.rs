//! Reader for the NeXTSTEP property list syntax used by `project.pbxproj`.
//!
//! Supported values:
//! - String:     `"contents"` or a bare token such as `PBXGroup` or `main.m`
//! - Array:      `( element, ... )`
//! - Dictionary: `{ key = value; ... }`
//! - Data:       `<0fbd 7781>`
//!
//! `/* ... */` and `// ...` comments may appear wherever whitespace may.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Deepest array or dictionary nesting accepted by [`parse`].
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct PlistError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistValue {
    String(String),
    Array(Vec<PlistValue>),
    Dictionary(BTreeMap<String, PlistValue>),
    Data(Vec<u8>),
}

impl PlistValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PlistValue]> {
        match self {
            PlistValue::Array(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&BTreeMap<String, PlistValue>> {
        match self {
            PlistValue::Dictionary(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlistValue::String(_) => "string",
            PlistValue::Array(_) => "array",
            PlistValue::Dictionary(_) => "dictionary",
            PlistValue::Data(_) => "data",
        }
    }
}

impl fmt::Display for PlistValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlistValue::String(value) => write!(f, "{value:?}"),
            PlistValue::Array(values) => write!(f, "array({})", values.len()),
            PlistValue::Dictionary(entries) => write!(f, "dictionary({})", entries.len()),
            PlistValue::Data(bytes) => write!(f, "data({})", bytes.len()),
        }
    }
}

/// Parse a complete property list document.
pub fn parse(input: &str) -> Result<PlistValue, PlistError> {
    let mut parser = Parser::new(input);
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.peek().is_some() {
        return Err(parser.error("Unexpected content after the root value"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> PlistError {
        let mut line = 1;
        let mut column = 1;
        for ch in &self.chars[..self.pos.min(self.chars.len())] {
            if *ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        PlistError {
            line,
            column,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), PlistError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(ch) if ch == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(ch) => Err(self.error(format!("Expected '{expected}', found '{ch}'"))),
            None => Err(self.error(format!("Expected '{expected}', found end of input"))),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), PlistError> {
        loop {
            match (self.peek(), self.peek_next()) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.pos += 1;
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_next()) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => self.pos += 1,
                            (None, _) => {
                                self.pos = start;
                                return Err(self.error("Unterminated comment"));
                            }
                        }
                    }
                }
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.bump() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<PlistValue, PlistError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.nested(Self::parse_dictionary),
            Some('(') => self.nested(Self::parse_array),
            Some('<') => self.parse_data(),
            Some('"') | Some('\'') => self.parse_quoted().map(PlistValue::String),
            Some(ch) if is_bare_char(ch) => Ok(PlistValue::String(self.parse_bare())),
            Some(ch) => Err(self.error(format!("Unexpected character '{ch}'"))),
            None => Err(self.error("Unexpected end of input")),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<PlistValue, PlistError>,
    ) -> Result<PlistValue, PlistError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("Nesting deeper than {MAX_DEPTH} levels")));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn parse_dictionary(&mut self) -> Result<PlistValue, PlistError> {
        self.expect('{')?;
        let mut entries = BTreeMap::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.pos += 1;
                break;
            }
            let key = match self.parse_value()? {
                PlistValue::String(key) => key,
                other => {
                    return Err(self.error(format!(
                        "Dictionary keys must be strings, found {}",
                        other.kind()
                    )));
                }
            };
            self.expect('=')?;
            let value = self.parse_value()?;
            self.expect(';')?;
            entries.insert(key, value);
        }
        Ok(PlistValue::Dictionary(entries))
    }

    fn parse_array(&mut self) -> Result<PlistValue, PlistError> {
        self.expect('(')?;
        let mut values = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(')') {
                self.pos += 1;
                break;
            }
            values.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => {}
                Some(ch) => return Err(self.error(format!("Expected ',' or ')', found '{ch}'"))),
                None => return Err(self.error("Unterminated array")),
            }
        }
        Ok(PlistValue::Array(values))
    }

    fn parse_data(&mut self) -> Result<PlistValue, PlistError> {
        self.expect('<')?;
        let mut digits = Vec::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some(ch) if ch.is_whitespace() => {}
                Some(ch) => match ch.to_digit(16) {
                    Some(digit) => digits.push(digit as u8),
                    None => {
                        self.pos -= 1;
                        return Err(self.error(format!("Invalid hex digit '{ch}' in data")));
                    }
                },
                None => return Err(self.error("Unterminated data")),
            }
        }
        if digits.len() % 2 != 0 {
            return Err(self.error("Data has an odd number of hex digits"));
        }
        let bytes = digits
            .chunks(2)
            .map(|pair| (pair[0] << 4) | pair[1])
            .collect();
        Ok(PlistValue::Data(bytes))
    }

    fn parse_quoted(&mut self) -> Result<String, PlistError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(self.error("Expected a quoted string"));
        };
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(value),
                Some('\\') => value.push(self.parse_escape()?),
                Some(ch) => value.push(ch),
                None => {
                    self.pos = start;
                    return Err(self.error("Unterminated string"));
                }
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, PlistError> {
        let Some(ch) = self.bump() else {
            return Err(self.error("Unterminated escape sequence"));
        };
        Ok(match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            'U' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .bump()
                        .and_then(|ch| ch.to_digit(16))
                        .ok_or_else(|| self.error("Invalid \\U escape"))?;
                    code = code * 16 + digit;
                }
                char::from_u32(code).ok_or_else(|| self.error("Invalid \\U code point"))?
            }
            '0'..='7' => {
                let mut code = ch.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|next| next.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                char::from_u32(code).ok_or_else(|| self.error("Invalid octal escape"))?
            }
            other => other,
        })
    }

    fn parse_bare(&mut self) -> String {
        let mut value = String::new();
        while let Some(ch) = self.peek() {
            if !is_bare_char(ch) {
                break;
            }
            // A comment may follow a bare token without whitespace.
            if ch == '/' && matches!(self.peek_next(), Some('*') | Some('/')) {
                break;
            }
            value.push(ch);
            self.pos += 1;
        }
        value
    }
}

fn is_bare_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '+' | '/' | ':' | '.' | '-')
}
