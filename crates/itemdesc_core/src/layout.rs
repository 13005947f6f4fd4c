use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    /// Everything up to and including `name = `.
    Prefix,
    /// The `{ ... }` literal, braces included.
    Table,
    /// Everything after the closing brace.
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    pub id: SectionId,
    pub range: ByteRange,
}

#[derive(Debug, Clone)]
pub struct FileLayout {
    pub text_len: usize,
    pub sections: Vec<SectionLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutError(String);

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FileLayout {
    pub fn from_table_span(text_len: usize, table: ByteRange) -> Self {
        Self {
            text_len,
            sections: vec![
                SectionLayout {
                    id: SectionId::Prefix,
                    range: ByteRange {
                        start: 0,
                        end: table.start,
                    },
                },
                SectionLayout {
                    id: SectionId::Table,
                    range: table,
                },
                SectionLayout {
                    id: SectionId::Suffix,
                    range: ByteRange {
                        start: table.end,
                        end: text_len,
                    },
                },
            ],
        }
    }

    pub fn section(&self, id: SectionId) -> Option<ByteRange> {
        self.sections
            .iter()
            .find(|section| section.id == id)
            .map(|section| section.range)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let Some(first) = self.sections.first() else {
            return Err(LayoutError(
                "file layout must contain at least one section".to_string(),
            ));
        };

        if first.range.start != 0 {
            return Err(LayoutError("layout does not start at byte 0".to_string()));
        }

        let mut expected = 0usize;
        for section in &self.sections {
            if section.range.start != expected {
                return Err(LayoutError(format!(
                    "layout gap/overlap around section {:?}: expected start {}, got {}",
                    section.id, expected, section.range.start
                )));
            }
            if section.range.end < section.range.start {
                return Err(LayoutError(format!(
                    "invalid section range {:?}: {}..{}",
                    section.id, section.range.start, section.range.end
                )));
            }
            expected = section.range.end;
        }

        if expected != self.text_len {
            return Err(LayoutError(format!(
                "layout does not cover file: ended at {}, text length {}",
                expected, self.text_len
            )));
        }

        match self.section(SectionId::Table) {
            Some(table) if !table.is_empty() => Ok(()),
            _ => Err(LayoutError("layout has no table section".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteRange, FileLayout, SectionId};

    #[test]
    fn table_span_splits_text_into_three_sections() {
        let layout = FileLayout::from_table_span(20, ByteRange { start: 6, end: 15 });
        assert!(layout.validate().is_ok());
        assert_eq!(
            layout.section(SectionId::Suffix),
            Some(ByteRange { start: 15, end: 20 })
        );
    }

    #[test]
    fn empty_table_section_is_rejected() {
        let layout = FileLayout::from_table_span(10, ByteRange { start: 4, end: 4 });
        assert!(layout.validate().is_err());
    }

    #[test]
    fn span_past_end_of_text_is_rejected() {
        let layout = FileLayout::from_table_span(10, ByteRange { start: 2, end: 12 });
        assert!(layout.validate().is_err());
    }
}
