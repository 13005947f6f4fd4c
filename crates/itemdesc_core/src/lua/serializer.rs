use std::fmt::Write as _;

use crate::encoding::to_legacy_repertoire;

use super::{Entry, Key, Table};

const INDENT: &str = "\t";

const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
    "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Render a declared (root) table: one `[id] = value` line per entry.
pub fn render(table: &Table) -> String {
    let mut out = String::new();
    write_table(&mut out, table, 0, true);
    out
}

pub fn render_value(value: &Entry) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_table(out: &mut String, table: &Table, depth: usize, root: bool) {
    out.push_str("{\n");

    let last = table.len().saturating_sub(1);
    let mut next_slot = 1i64;
    for (i, (key, value)) in table.iter().enumerate() {
        push_indent(out, depth + 1);

        match key {
            Key::Index(index) if !root && *index == next_slot => {
                next_slot += 1;
            }
            Key::Index(index) => {
                let _ = write!(out, "[{index}] = ");
            }
            Key::Name(name) if is_identifier(name) => {
                let _ = write!(out, "{name} = ");
            }
            Key::Name(name) => {
                out.push('[');
                write_string(out, name);
                out.push_str("] = ");
            }
        }

        write_value(out, value, depth + 1);
        if i < last {
            out.push(',');
        }
        out.push('\n');
    }

    push_indent(out, depth);
    out.push('}');
}

fn write_value(out: &mut String, value: &Entry, depth: usize) {
    match value {
        Entry::String(s) => write_string(out, s),
        Entry::Number(n) => out.push_str(&format_number(*n)),
        Entry::Bool(true) => out.push_str("true"),
        Entry::Bool(false) => out.push_str("false"),
        Entry::Table(table) => write_table(out, table, depth, false),
        Entry::Nil => out.push_str("nil"),
    }
}

fn write_string(out: &mut String, value: &str) {
    out.push('"');
    for c in to_legacy_repertoire(value).chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "0/0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "1e999" } else { "-1e999" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{n}")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !LUA_KEYWORDS.contains(&name)
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
