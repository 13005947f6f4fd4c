//! In-memory model of the item table literal and its text dialect.

mod lexer;
mod parser;
mod serializer;

use std::fmt;
use std::mem;

use indexmap::IndexMap;

pub use parser::{Declaration, parse_declaration};
pub use serializer::{render, render_value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(i64),
    Name(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for Key {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Entry {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Table(Table),
}

impl Entry {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Table> for Entry {
    fn from(value: Table) -> Self {
        Self::Table(value)
    }
}

/// Insertion-ordered table node. Re-inserting an existing key keeps its slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    entries: IndexMap<Key, Entry>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Entry> {
        self.entries.get_mut(key)
    }

    pub fn field(&self, name: &str) -> Option<&Entry> {
        self.entries.get(&Key::Name(name.to_string()))
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.get_mut(&Key::Name(name.to_string()))
    }

    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Entry>) -> Option<Entry> {
        self.entries.insert(key.into(), value.into())
    }

    /// Swap the entry under `key` for nil and hand back the previous value.
    pub fn take(&mut self, key: &Key) -> Option<Entry> {
        self.entries.get_mut(key).map(mem::take)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Entry)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    /// Length of the `1..=n` run of integer keys.
    pub fn sequence_len(&self) -> usize {
        let mut n = 0usize;
        while self.entries.contains_key(&Key::Index(n as i64 + 1)) {
            n += 1;
        }
        n
    }

    pub fn push(&mut self, value: impl Into<Entry>) {
        let next = self.sequence_len() as i64 + 1;
        self.entries.insert(Key::Index(next), value.into());
    }

    /// Values stored under integer keys, in stored order.
    pub fn positional_values(&self) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(|(key, _)| matches!(key, Key::Index(_)))
            .map(|(_, value)| value)
    }

    /// Put `lines` in front of the existing positional values and renumber
    /// the whole run from 1. Named fields keep their values and follow the run.
    pub fn prepend_values(&mut self, lines: Vec<Entry>) {
        if lines.is_empty() {
            return;
        }

        let old = mem::take(&mut self.entries);
        let mut positional = lines;
        let mut named = Vec::new();
        for (key, value) in old {
            match key {
                Key::Index(_) => positional.push(value),
                Key::Name(_) => named.push((key, value)),
            }
        }

        self.entries.reserve(positional.len() + named.len());
        for (slot, value) in positional.into_iter().enumerate() {
            self.entries.insert(Key::Index(slot as i64 + 1), value);
        }
        self.entries.extend(named);
    }
}

impl FromIterator<(Key, Entry)> for Table {
    fn from_iter<I: IntoIterator<Item = (Key, Entry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
