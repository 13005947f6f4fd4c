use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Material categories in decoration precedence order: earlier variants end
/// up closer to the top of the description and the start of the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Brewing,
    Cooking,
    Quest,
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStyle {
    /// `[Label] Name`
    BracketPrefix,
    /// `Name (group - qty, ...)`
    GroupSuffix,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Brewing,
        Category::Cooking,
        Category::Quest,
        Category::Instance,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Brewing => "Brewing",
            Self::Cooking => "Cooking",
            Self::Quest => "Quest",
            Self::Instance => "Instance",
        }
    }

    pub fn resource_name(&self) -> &'static str {
        match *self {
            Self::Brewing => "brewingMatsTable.json",
            Self::Cooking => "cookingMatsTable.json",
            Self::Quest => "questMatsTable.json",
            Self::Instance => "instanceMatsTable.json",
        }
    }

    pub fn tag_style(&self) -> TagStyle {
        match *self {
            Self::Instance => TagStyle::GroupSuffix,
            Self::Brewing | Self::Cooking | Self::Quest => TagStyle::BracketPrefix,
        }
    }

    pub fn default_header_label(&self) -> &'static str {
        match *self {
            Self::Brewing => "Brewing Material",
            Self::Cooking => "Cooking Material",
            Self::Quest => "Quest Material",
            Self::Instance => "Instance Material",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record of a category document: `{ "matId": 501, "matName": "Red Potion", "qty": 2 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialInfo {
    #[serde(rename = "matId")]
    pub mat_id: i64,
    #[serde(rename = "matName", default)]
    pub mat_name: String,
    pub qty: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTag {
    pub group: String,
    pub quantity: u32,
}

/// Item id to every group that references it, in first-seen order.
pub type TagIndex = IndexMap<i64, Vec<MaterialTag>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub item_count: usize,
    pub decorated: BTreeMap<Category, usize>,
    pub output: PathBuf,
}
