use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    NotFound,
    MalformedTable,
    InvalidSource,
    FetchFailed,
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn malformed(offset: usize, source: &str, message: impl fmt::Display) -> Self {
        let (line, column) = line_and_column(source, offset);
        Self::new(
            CoreErrorCode::MalformedTable,
            format!("{message} at line {line}, column {column}"),
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}

fn line_and_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(pos) => before[pos + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}
