use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::ByteRange;

use super::lexer::{Lexer, Token, TokenKind};
use super::{Entry, Key, Table};

/// A located and parsed `name = { ... }` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Byte span of the table literal, braces included.
    pub table: ByteRange,
    pub root: Table,
}

/// Find the first top-level `name = {` in `source` and parse the literal that
/// follows it.
pub fn parse_declaration(source: &str, name: &str) -> Result<Declaration, CoreError> {
    let mut parser = Parser::new(source);
    let open = parser.find_declaration(name)?;
    let (root, end) = parser.parse_table(&open)?;

    Ok(Declaration {
        table: ByteRange {
            start: open.start,
            end,
        },
        root,
    })
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            peeked: None,
        }
    }

    fn next(&mut self) -> Result<Token, CoreError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn peek(&mut self) -> Result<&Token, CoreError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    fn error(&self, token: &Token, message: impl std::fmt::Display) -> CoreError {
        CoreError::malformed(token.start, self.lexer.source(), message)
    }

    fn find_declaration(&mut self, name: &str) -> Result<Token, CoreError> {
        let mut depth = 0usize;
        let mut before_ident: Option<TokenKind> = None;
        let mut before_assign: Option<TokenKind> = None;
        let mut last: Option<TokenKind> = None;

        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Eof => {
                    return Err(CoreError::new(
                        CoreErrorCode::NotFound,
                        format!("table `{name}` is not declared in the input"),
                    ));
                }
                TokenKind::LBrace => {
                    let declares = depth == 0
                        && matches!(last, Some(TokenKind::Assign))
                        && matches!(&before_assign, Some(TokenKind::Ident(ident)) if ident == name)
                        && !matches!(before_ident, Some(TokenKind::Other('.' | ':')));
                    if declares {
                        return Ok(token);
                    }
                    depth += 1;
                }
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            before_ident = before_assign;
            before_assign = last;
            last = Some(token.kind);
        }
    }

    /// Parse entries up to the brace matching `open`; returns the table and
    /// the byte offset just past the closing brace.
    fn parse_table(&mut self, open: &Token) -> Result<(Table, usize), CoreError> {
        let mut table = Table::new();
        let mut next_slot = 1i64;

        loop {
            let token = self.next()?;
            let is_field = matches!(token.kind, TokenKind::Ident(_))
                && matches!(self.peek()?.kind, TokenKind::Assign);

            match token.kind {
                TokenKind::RBrace => return Ok((table, token.end)),
                TokenKind::Eof => {
                    return Err(self.error(open, "unbalanced braces: table is never closed"));
                }
                TokenKind::LBracket => {
                    let key = self.parse_bracket_key()?;
                    self.expect_assign()?;
                    let value_token = self.next()?;
                    let value = self.parse_value(value_token)?;
                    table.insert(key, value);
                }
                TokenKind::Ident(ref ident) if is_field => {
                    let key = Key::Name(ident.clone());
                    self.next()?;
                    let value_token = self.next()?;
                    let value = self.parse_value(value_token)?;
                    table.insert(key, value);
                }
                _ => {
                    let value = self.parse_value(token)?;
                    table.insert(Key::Index(next_slot), value);
                    next_slot += 1;
                }
            }

            let separator = self.next()?;
            match separator.kind {
                TokenKind::Comma | TokenKind::Semicolon => {}
                TokenKind::RBrace => return Ok((table, separator.end)),
                TokenKind::Eof => {
                    return Err(self.error(open, "unbalanced braces: table is never closed"));
                }
                _ => return Err(self.error(&separator, "expected `,` or `}` after entry")),
            }
        }
    }

    fn parse_bracket_key(&mut self) -> Result<Key, CoreError> {
        let token = self.next()?;
        let key = match token.kind {
            TokenKind::Str(ref name) => Key::Name(name.clone()),
            TokenKind::Number(n) => Key::Index(self.integral(&token, n)?),
            TokenKind::Minus => {
                let number = self.next()?;
                match number.kind {
                    TokenKind::Number(n) => Key::Index(-self.integral(&number, n)?),
                    _ => return Err(self.error(&number, "cannot classify key")),
                }
            }
            _ => return Err(self.error(&token, "cannot classify key")),
        };

        let close = self.next()?;
        if close.kind != TokenKind::RBracket {
            return Err(self.error(&close, "expected `]` after key"));
        }
        Ok(key)
    }

    fn integral(&self, token: &Token, n: f64) -> Result<i64, CoreError> {
        if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
            Ok(n as i64)
        } else {
            Err(self.error(token, format!("non-integer numeric key {n}")))
        }
    }

    fn expect_assign(&mut self) -> Result<(), CoreError> {
        let token = self.next()?;
        if token.kind == TokenKind::Assign {
            Ok(())
        } else {
            Err(self.error(&token, "expected `=` after key"))
        }
    }

    fn parse_value(&mut self, token: Token) -> Result<Entry, CoreError> {
        match token.kind {
            TokenKind::Str(value) => Ok(Entry::String(value)),
            TokenKind::Number(n) => Ok(Entry::Number(n)),
            TokenKind::Minus => {
                let number = self.next()?;
                match number.kind {
                    TokenKind::Number(n) => Ok(Entry::Number(-n)),
                    _ => Err(self.error(&number, "cannot classify value")),
                }
            }
            TokenKind::Ident(ref ident) => match ident.as_str() {
                "true" => Ok(Entry::Bool(true)),
                "false" => Ok(Entry::Bool(false)),
                "nil" => Ok(Entry::Nil),
                other => Err(self.error(&token, format!("cannot classify value `{other}`"))),
            },
            TokenKind::LBrace => {
                let (table, _) = self.parse_table(&token)?;
                Ok(Entry::Table(table))
            }
            TokenKind::Eof => Err(self.error(&token, "unexpected end of input")),
            _ => Err(self.error(&token, "cannot classify value")),
        }
    }
}
