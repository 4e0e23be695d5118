use serde_json::{Map, Number, Value};

use super::CodecError;

/// Nesting limit for arrays and objects.
pub(crate) const MAX_DEPTH: usize = 128;

/// Parser for the data subset of JavaScript literal syntax.
///
/// Accepts strings in any quote style, numbers, `true`/`false`/`null`,
/// arrays and objects, with comments and trailing commas. Anything that
/// would need evaluation (identifiers, calls, interpolation, holes) is
/// rejected.
pub(crate) struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> LiteralParser<'a> {
    pub fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos, depth: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn slice(&self, start: usize) -> &'a str {
        &self.src[start..self.pos]
    }

    pub fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, reason: impl Into<String>) -> CodecError {
        CodecError::malformed(reason, self.pos)
    }

    /// Skip whitespace and comments. Returns whether a line break was crossed.
    pub fn skip_trivia(&mut self) -> Result<bool, CodecError> {
        let mut newline = false;
        loop {
            match self.peek() {
                Some(c) if is_line_terminator(c) => {
                    newline = true;
                    self.bump();
                }
                Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                Some('/') if self.peek_nth(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if is_line_terminator(c) {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_nth(1) == Some('*') => {
                    let start = self.pos;
                    self.pos += 2;
                    match self.src[self.pos..].find("*/") {
                        Some(end) => {
                            let body = &self.src[self.pos..self.pos + end];
                            newline |= body.chars().any(is_line_terminator);
                            self.pos += end + 2;
                        }
                        None => return Err(CodecError::malformed("unterminated comment", start)),
                    }
                }
                _ => return Ok(newline),
            }
        }
    }

    pub fn parse_value(&mut self) -> Result<Value, CodecError> {
        self.skip_trivia()?;
        let start = self.pos;
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('[') => self.parse_array(),
            Some('{') => self.parse_object(),
            Some('"') | Some('\'') | Some('`') => self.parse_string().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                self.parse_number()
            }
            Some(c) if is_identifier_start(c) => match self.parse_identifier() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                other => Err(CodecError::malformed(
                    format!("`{}` is not a data literal", other),
                    start,
                )),
            },
            Some(c) => Err(self.error(format!("unexpected character {:?}", c))),
        }
    }

    fn enter(&mut self) -> Result<(), CodecError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        Ok(())
    }

    fn parse_array(&mut self) -> Result<Value, CodecError> {
        self.bump();
        self.enter()?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(',') => return Err(self.error("array holes are not allowed")),
                None => return Err(self.error("unterminated array")),
                _ => {}
            }

            items.push(self.parse_value()?);

            self.skip_trivia()?;
            let at = self.pos;
            match self.bump() {
                Some(',') => continue,
                Some(']') => break,
                _ => return Err(CodecError::malformed("expected `,` or `]`", at)),
            }
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self) -> Result<Value, CodecError> {
        self.bump();
        self.enter()?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            let key = match self.peek() {
                Some('}') => {
                    self.bump();
                    break;
                }
                None => return Err(self.error("unterminated object")),
                Some('"') | Some('\'') => self.parse_string()?,
                Some(c) if c.is_ascii_digit() => self.parse_numeric_key()?,
                Some(c) if is_identifier_start(c) => self.parse_identifier().to_string(),
                Some(c) => return Err(self.error(format!("unexpected {:?} in object key", c))),
            };

            self.skip_trivia()?;
            if !self.eat(':') {
                return Err(self.error(format!("expected `:` after key {:?}", key)));
            }

            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_trivia()?;
            let at = self.pos;
            match self.bump() {
                Some(',') => continue,
                Some('}') => break,
                _ => return Err(CodecError::malformed("expected `,` or `}`", at)),
            }
        }
        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_identifier_part(c) {
                break;
            }
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn parse_numeric_key(&mut self) -> Result<String, CodecError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if matches!(self.peek(), Some(c) if c == '.' || is_identifier_part(c)) {
            return Err(self.error("only integer numeric keys are supported"));
        }
        let digits = &self.src[start..self.pos];
        digits
            .parse::<u64>()
            .map(|n| n.to_string())
            .map_err(|_| CodecError::malformed("numeric key out of range", start))
    }

    /// Parse a quoted string. Handles `"`, `'` and backtick quotes.
    pub fn parse_string(&mut self) -> Result<String, CodecError> {
        let start = self.pos;
        let quote = match self.bump() {
            Some(q) => q,
            None => return Err(self.error("expected string")),
        };
        let template = quote == '`';
        let mut out = String::new();

        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(CodecError::malformed("unterminated string", start)),
            };
            match c {
                c if c == quote => return Ok(out),
                '\\' => self.parse_escape(&mut out)?,
                '$' if template && self.peek() == Some('{') => {
                    return Err(CodecError::malformed(
                        "template interpolation is not allowed",
                        self.pos - 1,
                    ))
                }
                '\r' if template => {
                    self.eat('\n');
                    out.push('\n');
                }
                '\n' | '\r' if !template => {
                    return Err(CodecError::malformed("unterminated string", start))
                }
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), CodecError> {
        let at = self.pos - 1;
        let c = match self.bump() {
            Some(c) => c,
            None => return Err(CodecError::malformed("unterminated escape", at)),
        };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !matches!(self.peek(), Some(d) if d.is_ascii_digit()) => out.push('\0'),
            '0'..='9' => {
                return Err(CodecError::malformed("octal escapes are not allowed", at));
            }
            'x' => {
                let code = self.hex_digits(2, at)?;
                out.push(char::from_u32(code).ok_or_else(|| self.error("invalid escape"))?);
            }
            'u' => {
                let ch = self.parse_unicode_escape(at)?;
                out.push(ch);
            }
            '\r' => {
                self.eat('\n');
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
        Ok(())
    }

    fn parse_unicode_escape(&mut self, at: usize) -> Result<char, CodecError> {
        let code = self.code_unit(at)?;
        if (0xD800..0xDC00).contains(&code) {
            // High surrogate: must be followed by `\u` low surrogate.
            if self.peek() == Some('\\') && self.peek_nth(1) == Some('u') {
                self.pos += 2;
                let low = self.code_unit(at)?;
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined)
                        .ok_or_else(|| CodecError::malformed("invalid surrogate pair", at));
                }
            }
            return Err(CodecError::malformed("unpaired surrogate escape", at));
        }
        char::from_u32(code).ok_or_else(|| CodecError::malformed("unpaired surrogate escape", at))
    }

    fn code_unit(&mut self, at: usize) -> Result<u32, CodecError> {
        if self.eat('{') {
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.bump();
            }
            let digits = &self.src[start..self.pos];
            if digits.is_empty() || !self.eat('}') {
                return Err(CodecError::malformed("invalid \\u{...} escape", at));
            }
            match u32::from_str_radix(digits, 16) {
                Ok(code) if code <= 0x10FFFF => Ok(code),
                _ => Err(CodecError::malformed("code point out of range", at)),
            }
        } else {
            self.hex_digits(4, at)
        }
    }

    fn hex_digits(&mut self, count: usize, at: usize) -> Result<u32, CodecError> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| CodecError::malformed("invalid hex escape", at))?;
            self.bump();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Value, CodecError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };

        if matches!(self.peek(), Some(c) if is_identifier_start(c)) {
            let ident = self.parse_identifier();
            return Err(CodecError::malformed(
                format!("`{}` is not a finite number", ident),
                start,
            ));
        }

        let radix = match (self.peek(), self.peek_nth(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        let value = match radix {
            Some(radix) => {
                self.pos += 2;
                let digits_start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_digit(radix)) {
                    self.bump();
                }
                let digits = &self.src[digits_start..self.pos];
                let magnitude = u64::from_str_radix(digits, radix)
                    .map_err(|_| CodecError::malformed("invalid integer literal", start))?;
                integer(negative, magnitude)
                    .ok_or_else(|| CodecError::malformed("integer literal out of range", start))?
            }
            None => self.parse_decimal(start, negative)?,
        };

        if matches!(self.peek(), Some(c) if is_identifier_part(c)) {
            return Err(self.error("identifier starts immediately after number"));
        }
        Ok(value)
    }

    fn parse_decimal(&mut self, start: usize, negative: bool) -> Result<Value, CodecError> {
        let digits_start = self.pos;
        let int_digits = self.digits();
        if int_digits.len() > 1 && int_digits.starts_with('0') {
            return Err(CodecError::malformed("legacy octal literals are not allowed", start));
        }

        let mut fractional = false;
        if self.peek() == Some('.') {
            self.bump();
            fractional = true;
            let frac = self.digits();
            if int_digits.is_empty() && frac.is_empty() {
                return Err(CodecError::malformed("invalid number", start));
            }
        } else if int_digits.is_empty() {
            return Err(CodecError::malformed("invalid number", start));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            fractional = true;
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.digits().is_empty() {
                return Err(CodecError::malformed("invalid exponent", start));
            }
        }

        let text = &self.src[digits_start..self.pos];
        if !fractional {
            if let Ok(magnitude) = text.parse::<u64>() {
                if let Some(value) = integer(negative, magnitude) {
                    return Ok(value);
                }
            }
        }

        let magnitude: f64 = text
            .parse()
            .map_err(|_| CodecError::malformed("invalid number", start))?;
        let f = if negative { -magnitude } else { magnitude };
        float(f).ok_or_else(|| CodecError::malformed("number is not finite", start))
    }

    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        &self.src[start..self.pos]
    }
}

fn integer(negative: bool, magnitude: u64) -> Option<Value> {
    if !negative {
        return Some(Value::Number(Number::from(magnitude)));
    }
    if magnitude == 0 {
        return Some(Value::Number(Number::from(0u64)));
    }
    i64::try_from(magnitude)
        .ok()
        .map(|m| Value::Number(Number::from(-m)))
        .or_else(|| float(-(magnitude as f64)))
}

/// Literals written with a fraction or exponent stay floats, so `1.0`
/// survives a round trip as `1.0`.
fn float(f: f64) -> Option<Value> {
    Number::from_f64(f).map(Value::Number)
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

pub(crate) fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_alphanumeric()
}

pub(crate) fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
