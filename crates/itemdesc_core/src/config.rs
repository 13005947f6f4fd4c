//! Style configuration: colors, labels and per-category switches.
//!
//! The file is JSON with PascalCase keys. Switches are written as `0`/`1`
//! and read from either integers or booleans; camelCase keys are accepted as
//! well. A missing or unreadable file never stops a run: defaults are used
//! and written back for next time.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core_api::{Category, CoreError, CoreErrorCode};

pub const DEFAULT_CONFIG_FILE: &str = "itemdesc-modder.conf";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "ItemIdDescTextColor", alias = "itemIdDescTextColor")]
    pub item_id_label_color: String,
    #[serde(rename = "ItemIdDescValueColor", alias = "itemIdDescValueColor")]
    pub item_id_value_color: String,
    #[serde(rename = "BrewingConfig", alias = "brewingConfig")]
    pub brewing: TaggingPolicy,
    #[serde(rename = "CookingConfig", alias = "cookingConfig")]
    pub cooking: TaggingPolicy,
    #[serde(rename = "QuestConfig", alias = "questConfig")]
    pub quest: TaggingPolicy,
    #[serde(rename = "InstanceConfig", alias = "instanceConfig")]
    pub instance: TaggingPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggingPolicy {
    #[serde(
        rename = "EnableTags",
        alias = "enableTags",
        serialize_with = "write_switch",
        deserialize_with = "read_switch"
    )]
    pub tags_enabled: bool,
    #[serde(
        rename = "EnableDescriptions",
        alias = "enableDescriptions",
        serialize_with = "write_switch",
        deserialize_with = "read_switch"
    )]
    pub descriptions_enabled: bool,
    #[serde(
        rename = "EnableDetailedDescriptions",
        alias = "enableDetailedDescriptions",
        default = "enabled",
        serialize_with = "write_switch",
        deserialize_with = "read_switch"
    )]
    pub detailed_descriptions_enabled: bool,
    #[serde(rename = "TagText", alias = "tagText")]
    pub tag_label: String,
    /// Empty means the category's built-in header label.
    #[serde(rename = "HeaderText", alias = "headerText", default)]
    pub header_label: String,
    #[serde(rename = "DescriptionHeaderColor", alias = "descriptionHeaderColor")]
    pub header_color: String,
    #[serde(rename = "DescriptionRowsColor", alias = "descriptionRowsColor")]
    pub row_color: String,
}

impl TaggingPolicy {
    fn new(tag_label: &str, header_label: &str, header_color: &str, row_color: &str) -> Self {
        Self {
            tags_enabled: true,
            descriptions_enabled: true,
            detailed_descriptions_enabled: true,
            tag_label: tag_label.to_string(),
            header_label: header_label.to_string(),
            header_color: header_color.to_string(),
            row_color: row_color.to_string(),
        }
    }

    pub fn header_label_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.header_label.trim().is_empty() {
            fallback
        } else {
            &self.header_label
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            item_id_label_color: "007ACC".to_string(),
            item_id_value_color: "FFB300".to_string(),
            brewing: TaggingPolicy {
                detailed_descriptions_enabled: false,
                ..TaggingPolicy::new("Brew", "Brewing Material", "00897B", "43A047")
            },
            cooking: TaggingPolicy::new("Cook", "Cooking Material", "EF6C00", "6D4C41"),
            quest: TaggingPolicy::new("Quest", "Quest Material", "5E35B1", "8E24AA"),
            instance: TaggingPolicy::new("Instance", "Instance Material", "C62828", "D84315"),
        }
    }
}

impl Config {
    pub fn policy(&self, category: Category) -> &TaggingPolicy {
        match category {
            Category::Brewing => &self.brewing,
            Category::Cooking => &self.cooking,
            Category::Quest => &self.quest,
            Category::Instance => &self.instance,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::new(CoreErrorCode::Config, format!("invalid config: {e}")))
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            CoreError::new(CoreErrorCode::Config, format!("failed to render config: {e}"))
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), CoreError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to write {}: {e}", path.display()),
            )
        })
    }

    /// Load the config at `path`, falling back to (and persisting) defaults
    /// when it is missing or cannot be parsed.
    pub fn load_or_create(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Config {} not found. Creating default config file.",
                    path.display()
                );
                return Self::persist_defaults(path);
            }
            Err(e) => {
                warn!(
                    "Config {} could not be read ({e}). Using default configuration.",
                    path.display()
                );
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(config) => {
                info!("Loaded config {}", path.display());
                config
            }
            Err(e) => {
                warn!(
                    "Invalid config file {} ({}). Replacing it with default configuration.",
                    path.display(),
                    e.message
                );
                if let Err(e) = fs::remove_file(path) {
                    warn!("Could not remove invalid config {}: {e}", path.display());
                }
                Self::persist_defaults(path)
            }
        }
    }

    fn persist_defaults(path: &Path) -> Self {
        let config = Self::default();
        if let Err(e) = config.write(path) {
            warn!("Could not save default config: {e}");
        }
        config
    }
}

fn enabled() -> bool {
    true
}

fn write_switch<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

fn read_switch<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Switch {
        Flag(bool),
        Number(i64),
    }

    Ok(match Switch::deserialize(deserializer)? {
        Switch::Flag(flag) => flag,
        Switch::Number(n) => n != 0,
    })
}
