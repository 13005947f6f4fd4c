//! Applies category tags and description lines to every item of a document.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;

use crate::config::{Config, TaggingPolicy};
use crate::core_api::{Category, MaterialTag, TagStyle};
use crate::document::TableDocument;
use crate::lua::{Entry, Table};
use crate::materials::CategoryTags;

pub const DISPLAY_NAME_FIELD: &str = "identifiedDisplayName";
pub const DESCRIPTION_FIELD: &str = "identifiedDescriptionName";

const COLOR_RESET: &str = "^000000";
const ITEM_ID_LABEL: &str = "Item ID:";
const ITEM_ID_MARKER: &str = "Item ID:^";

static LEADING_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\[[^\]]*\])+").expect("leading tag pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub items: usize,
    pub decorated: BTreeMap<Category, usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct MergeEngine<'a> {
    config: &'a Config,
}

impl<'a> MergeEngine<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Decorate every item in `document`. Tagged ids that the document does
    /// not contain are ignored.
    pub fn apply(&self, document: &mut TableDocument, tags: &CategoryTags) -> MergeReport {
        let mut report = MergeReport::default();

        for id in document.item_ids() {
            let memberships: Vec<(Category, &[MaterialTag])> = Category::ALL
                .into_iter()
                .filter_map(|category| {
                    tags.tags_for(category, id)
                        .filter(|found| !found.is_empty())
                        .map(|found| (category, found))
                })
                .collect();

            let visited = document.with_item(id, |item| self.decorate(id, item, &memberships));
            if !visited {
                debug!("item {id} is not a table, skipped");
                continue;
            }

            report.items += 1;
            for (category, _) in &memberships {
                let policy = self.config.policy(*category);
                if policy.tags_enabled || policy.descriptions_enabled {
                    *report.decorated.entry(*category).or_default() += 1;
                }
            }
        }

        for category in Category::ALL {
            info!(
                "Applied {category} tags and descriptions to {} items",
                report.decorated.get(&category).copied().unwrap_or(0)
            );
        }
        report
    }

    fn decorate(
        &self,
        id: i64,
        mut item: Table,
        memberships: &[(Category, &[MaterialTag])],
    ) -> Table {
        if let Some(Entry::String(name)) = item.field_mut(DISPLAY_NAME_FIELD) {
            let mut decorated = name.clone();
            // Prefixes stack outward, so the highest precedence goes on last.
            for (category, found) in memberships.iter().rev() {
                let policy = self.config.policy(*category);
                if policy.tags_enabled {
                    decorated = tag_display_name(&decorated, category.tag_style(), policy, found);
                }
            }
            *name = decorated;
        }

        let mut lines = vec![Entry::String(self.item_id_line(id))];
        for (category, found) in memberships {
            lines.extend(
                description_lines(*category, self.config.policy(*category), found)
                    .into_iter()
                    .map(Entry::String),
            );
        }
        lines.push(Entry::String(String::new()));

        match item.field_mut(DESCRIPTION_FIELD).and_then(Entry::as_table_mut) {
            Some(description) => description.prepend_values(lines),
            None => {
                let mut description = Table::new();
                description.prepend_values(lines);
                item.insert(DESCRIPTION_FIELD, description);
            }
        }
        item
    }

    fn item_id_line(&self, id: i64) -> String {
        format!(
            "^{}{ITEM_ID_LABEL}^{} {id}{COLOR_RESET}",
            self.config.item_id_label_color, self.config.item_id_value_color
        )
    }
}

pub fn tag_display_name(
    name: &str,
    style: TagStyle,
    policy: &TaggingPolicy,
    tags: &[MaterialTag],
) -> String {
    match style {
        TagStyle::BracketPrefix => {
            let name = name.trim();
            let separator = if starts_with_tag(name) { "" } else { " " };
            format!("[{}]{separator}{name}", policy.tag_label)
        }
        TagStyle::GroupSuffix => {
            let groups = tags
                .iter()
                .map(|tag| format!("{} - {}", tag.group, tag.quantity))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} ({groups})", name.trim_end())
        }
    }
}

pub fn description_lines(
    category: Category,
    policy: &TaggingPolicy,
    tags: &[MaterialTag],
) -> Vec<String> {
    if !policy.descriptions_enabled {
        return Vec::new();
    }

    let header = policy.header_label_or(category.default_header_label());
    let mut lines = vec![format!("^{}[{header}]{COLOR_RESET}", policy.header_color)];
    if policy.detailed_descriptions_enabled {
        lines.extend(tags.iter().map(|tag| {
            format!(
                "^{}{} - Qty: {}{COLOR_RESET}",
                policy.row_color, tag.group, tag.quantity
            )
        }));
    }
    lines
}

pub fn starts_with_tag(name: &str) -> bool {
    LEADING_TAGS.is_match(name)
}

/// True when any item already carries an item id line, i.e. the document was
/// produced by an earlier run.
pub fn is_decorated(document: &TableDocument) -> bool {
    document.item_ids().into_iter().any(|id| {
        document
            .item(id)
            .and_then(|item| item.field(DESCRIPTION_FIELD))
            .and_then(Entry::as_table)
            .and_then(|description| description.positional_values().next())
            .and_then(Entry::as_str)
            .is_some_and(|line| line.starts_with('^') && line.contains(ITEM_ID_MARKER))
    })
}
