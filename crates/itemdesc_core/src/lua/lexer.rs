use crate::core_api::CoreError;
use crate::encoding::decode_legacy;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Assign,
    Comma,
    Semicolon,
    Minus,
    Str(String),
    Number(f64),
    Ident(String),
    Other(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Tokenizer for the subset of Lua found in item info files. Anything it does
/// not recognise outside of string literals comes back as `Other`, so it can
/// also walk the statements surrounding the table.
pub(crate) struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    pub fn source(&self) -> &'a str {
        self.src
    }

    pub fn next_token(&mut self) -> Result<Token, CoreError> {
        self.skip_trivia()?;

        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                start,
                end: start,
            });
        };

        let kind = match c {
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => match self.long_bracket_level() {
                Some(level) => TokenKind::Str(self.lex_long_string(level)?),
                None => self.single(TokenKind::LBracket),
            },
            ']' => self.single(TokenKind::RBracket),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '-' => self.single(TokenKind::Minus),
            '=' if self.peek_char_at(1) == Some('=') => {
                self.pos += 2;
                TokenKind::Other('=')
            }
            '=' => self.single(TokenKind::Assign),
            '"' | '\'' => TokenKind::Str(self.lex_string(c)?),
            '0'..='9' => TokenKind::Number(self.lex_number()?),
            '.' if self.peek_char_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                TokenKind::Number(self.lex_number()?)
            }
            c if c == '_' || c.is_ascii_alphabetic() => TokenKind::Ident(self.lex_ident()),
            other => {
                self.pos += other.len_utf8();
                TokenKind::Other(other)
            }
        };

        Ok(Token {
            kind,
            start,
            end: self.pos,
        })
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn skip_trivia(&mut self) -> Result<(), CoreError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if !trimmed.starts_with("--") {
                return Ok(());
            }

            let comment_start = self.pos;
            self.pos += 2;
            if let Some(level) = self.long_bracket_level() {
                let close = format!("]{}]", "=".repeat(level));
                let body_start = self.pos + level + 2;
                match self.src[body_start..].find(&close) {
                    Some(offset) => self.pos = body_start + offset + close.len(),
                    None => {
                        return Err(CoreError::malformed(
                            comment_start,
                            self.src,
                            "unterminated block comment",
                        ));
                    }
                }
            } else {
                match self.rest().find('\n') {
                    Some(offset) => self.pos += offset + 1,
                    None => self.pos = self.src.len(),
                }
            }
        }
    }

    /// Level of a `[[` / `[==[` opener at the cursor, if there is one.
    fn long_bracket_level(&self) -> Option<usize> {
        let rest = self.rest().strip_prefix('[')?;
        let level = rest.chars().take_while(|&c| c == '=').count();
        rest[level..].starts_with('[').then_some(level)
    }

    /// `[[ ... ]]` / `[==[ ... ]==]` literal; a newline right after the
    /// opener is not part of the value.
    fn lex_long_string(&mut self, level: usize) -> Result<String, CoreError> {
        let start = self.pos;
        let close = format!("]{}]", "=".repeat(level));
        let mut body_start = start + level + 2;
        let body = &self.src[body_start..];
        if let Some(skip) = ["\r\n", "\n\r", "\n", "\r"]
            .iter()
            .find(|newline| body.starts_with(**newline))
        {
            body_start += skip.len();
        }

        let Some(offset) = self.src[body_start..].find(&close) else {
            return Err(CoreError::malformed(start, self.src, "unterminated long string"));
        };
        self.pos = body_start + offset + close.len();
        Ok(self.src[body_start..body_start + offset].to_string())
    }

    fn lex_ident(&mut self) -> String {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
            .unwrap_or(rest.len());
        self.pos += len;
        rest[..len].to_string()
    }

    fn lex_number(&mut self) -> Result<f64, CoreError> {
        let start = self.pos;
        let rest = self.rest();

        if let Some(hex) = rest
            .strip_prefix("0x")
            .or_else(|| rest.strip_prefix("0X"))
        {
            let len = hex
                .find(|c: char| !c.is_ascii_hexdigit())
                .unwrap_or(hex.len());
            self.pos += 2 + len;
            return i64::from_str_radix(&hex[..len], 16)
                .map(|v| v as f64)
                .map_err(|e| CoreError::malformed(start, self.src, format!("bad hex number: {e}")));
        }

        let bytes = rest.as_bytes();
        let mut len = 0usize;
        while len < bytes.len() && bytes[len].is_ascii_digit() {
            len += 1;
        }
        if len < bytes.len() && bytes[len] == b'.' {
            len += 1;
            while len < bytes.len() && bytes[len].is_ascii_digit() {
                len += 1;
            }
        }
        if len < bytes.len() && matches!(bytes[len], b'e' | b'E') {
            let mut exp = len + 1;
            if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
                exp += 1;
            }
            if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                while exp < bytes.len() && bytes[exp].is_ascii_digit() {
                    exp += 1;
                }
                len = exp;
            }
        }

        self.pos += len;
        rest[..len]
            .parse::<f64>()
            .map_err(|e| CoreError::malformed(start, self.src, format!("bad number: {e}")))
    }

    fn lex_string(&mut self, quote: char) -> Result<String, CoreError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();

        loop {
            let Some(c) = self.peek_char() else {
                return Err(CoreError::malformed(start, self.src, "unterminated string"));
            };
            self.pos += c.len_utf8();

            match c {
                c if c == quote => return Ok(out),
                '\n' => {
                    return Err(CoreError::malformed(start, self.src, "unterminated string"));
                }
                '\\' => self.lex_escape(start, &mut out)?,
                c => out.push(c),
            }
        }
    }

    fn lex_escape(&mut self, string_start: usize, out: &mut String) -> Result<(), CoreError> {
        let Some(c) = self.peek_char() else {
            return Err(CoreError::malformed(
                string_start,
                self.src,
                "unterminated string",
            ));
        };
        self.pos += c.len_utf8();

        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            '\n' | '\r' => {
                let pair = if c == '\n' { '\r' } else { '\n' };
                if self.peek_char() == Some(pair) {
                    self.pos += 1;
                }
                out.push('\n');
            }
            'x' => {
                let digits = self
                    .rest()
                    .get(..2)
                    .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
                    .ok_or_else(|| CoreError::malformed(self.pos, self.src, "invalid \\x escape"))?;
                let byte = u8::from_str_radix(digits, 16).map_err(|_| {
                    CoreError::malformed(self.pos, self.src, "invalid \\x escape")
                })?;
                self.pos += 2;
                out.push_str(&decode_legacy(&[byte]));
            }
            '0'..='9' => {
                let rest = self.rest();
                let extra = rest
                    .chars()
                    .take(2)
                    .take_while(char::is_ascii_digit)
                    .count();
                let digits = format!("{c}{}", &rest[..extra]);
                self.pos += extra;
                let byte = digits.parse::<u8>().map_err(|_| {
                    CoreError::malformed(self.pos, self.src, "decimal escape out of range")
                })?;
                out.push_str(&decode_legacy(&[byte]));
            }
            other => out.push(other),
        }
        Ok(())
    }
}
