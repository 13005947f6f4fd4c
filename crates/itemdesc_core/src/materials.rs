//! Category material tables: retrieval and inversion into per-item tags.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info};

use crate::core_api::{Category, CoreError, CoreErrorCode, MaterialInfo, MaterialTag, TagIndex};

/// Supplies the raw JSON document for a category.
pub trait CategorySource {
    fn fetch(&self, category: Category) -> Result<String, CoreError>;
}

/// Reads `<root>/<category>MatsTable.json` files from disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, category: Category) -> PathBuf {
        self.root.join(category.resource_name())
    }
}

impl CategorySource for DirectorySource {
    fn fetch(&self, category: Category) -> Result<String, CoreError> {
        let path = self.path_for(category);
        fs::read_to_string(&path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::FetchFailed,
                format!("failed to fetch {category} data from {}: {e}", path.display()),
            )
        })
    }
}

/// Aggregated tags for every category of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTags {
    by_category: BTreeMap<Category, TagIndex>,
}

impl CategoryTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, tags: TagIndex) {
        self.by_category.insert(category, tags);
    }

    pub fn get(&self, category: Category) -> Option<&TagIndex> {
        self.by_category.get(&category)
    }

    pub fn tags_for(&self, category: Category, item_id: i64) -> Option<&[MaterialTag]> {
        self.get(category)
            .and_then(|index| index.get(&item_id))
            .map(Vec::as_slice)
    }
}

/// Fetch and aggregate every category. Any failure aborts the whole set so
/// that merging only ever sees complete data.
pub fn fetch_categories(source: &dyn CategorySource) -> Result<CategoryTags, CoreError> {
    let mut tags = CategoryTags::new();
    for category in Category::ALL {
        info!("Fetching {category} material table...");
        let json = source.fetch(category)?;
        let index = aggregate(&json).map_err(|e| {
            CoreError::new(e.code, format!("{category} material table: {}", e.message))
        })?;
        debug!("{category}: {} tagged items", index.len());
        tags.insert(category, index);
    }
    Ok(tags)
}

/// Invert `{ group: [{matId, matName, qty}] }` into item id -> groups.
pub fn aggregate(json: &str) -> Result<TagIndex, CoreError> {
    let groups: IndexMap<String, Vec<MaterialInfo>> = serde_json::from_str(json).map_err(|e| {
        CoreError::new(
            CoreErrorCode::InvalidSource,
            format!("expected an object of material arrays: {e}"),
        )
    })?;

    let mut index = TagIndex::new();
    for (group, materials) in groups {
        for material in materials {
            let quantity = u32::try_from(material.qty)
                .ok()
                .filter(|&qty| qty >= 1)
                .ok_or_else(|| {
                    CoreError::new(
                        CoreErrorCode::InvalidSource,
                        format!(
                            "group `{group}` lists item {} with invalid quantity {}",
                            material.mat_id, material.qty
                        ),
                    )
                })?;

            index.entry(material.mat_id).or_default().push(MaterialTag {
                group: group.clone(),
                quantity,
            });
        }
    }

    Ok(index)
}
