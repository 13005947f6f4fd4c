use std::fs;
use std::path::Path;

use log::debug;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::encoding::{decode_legacy, encode_legacy};
use crate::layout::{FileLayout, SectionId};
use crate::lua::{self, Entry, Key, Table};

pub const DEFAULT_TABLE_NAME: &str = "tbl";

/// One loaded item info file: the decoded text, the table declared in it and
/// where that table sits in the text.
#[derive(Debug, Clone)]
pub struct TableDocument {
    raw_text: String,
    declared_name: String,
    layout: FileLayout,
    pub root: Table,
}

impl TableDocument {
    pub fn load(path: &Path, declared_name: &str) -> Result<Self, CoreError> {
        let bytes = fs::read(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        let document = Self::parse(&bytes, declared_name)?;
        debug!(
            "loaded `{}` from {} with {} entries",
            declared_name,
            path.display(),
            document.root.len()
        );
        Ok(document)
    }

    pub fn parse(bytes: &[u8], declared_name: &str) -> Result<Self, CoreError> {
        let raw_text = decode_legacy(bytes);
        let declaration = lua::parse_declaration(&raw_text, declared_name)?;

        let layout = FileLayout::from_table_span(raw_text.len(), declaration.table);
        layout
            .validate()
            .map_err(|e| CoreError::new(CoreErrorCode::MalformedTable, e.to_string()))?;

        Ok(Self {
            raw_text,
            declared_name: declared_name.to_string(),
            layout,
            root: declaration.root,
        })
    }

    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    /// Text before the table literal, `name = ` included.
    pub fn prefix(&self) -> &str {
        self.section_text(SectionId::Prefix)
    }

    /// Text after the closing brace of the table literal.
    pub fn suffix(&self) -> &str {
        self.section_text(SectionId::Suffix)
    }

    fn section_text(&self, id: SectionId) -> &str {
        self.layout
            .section(id)
            .map(|range| &self.raw_text[range.start..range.end])
            .unwrap_or_default()
    }

    pub fn to_text(&self) -> String {
        let table = lua::render(&self.root);
        let mut out =
            String::with_capacity(self.prefix().len() + table.len() + self.suffix().len());
        out.push_str(self.prefix());
        out.push_str(&table);
        out.push_str(self.suffix());
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode_legacy(&self.to_text())
    }

    /// Write the document to `path`, replacing any existing file. The parent
    /// directory must already exist.
    pub fn save(self, path: &Path) -> Result<(), CoreError> {
        let bytes = self.to_bytes();
        fs::write(path, &bytes).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to write {}: {e}", path.display()),
            )
        })?;
        debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Integer keys of the root table, in stored order.
    pub fn item_ids(&self) -> Vec<i64> {
        self.root
            .keys()
            .filter_map(|key| match key {
                Key::Index(id) => Some(*id),
                Key::Name(_) => None,
            })
            .collect()
    }

    pub fn item(&self, id: i64) -> Option<&Table> {
        self.root.get(&Key::Index(id)).and_then(Entry::as_table)
    }

    /// Hand the item table for `id` to `mutate` and store what it returns.
    /// Ids that are missing or not tables are skipped; returns whether the
    /// item was visited.
    pub fn with_item<F>(&mut self, id: i64, mutate: F) -> bool
    where
        F: FnOnce(Table) -> Table,
    {
        let key = Key::Index(id);
        if self.item(id).is_none() {
            return false;
        }

        let Some(Entry::Table(item)) = self.root.take(&key) else {
            return false;
        };
        self.root.insert(key, mutate(item));
        true
    }
}
