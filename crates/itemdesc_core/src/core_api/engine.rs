use std::path::Path;

use log::info;

use crate::config::Config;
use crate::document::{DEFAULT_TABLE_NAME, TableDocument};
use crate::materials::{CategorySource, fetch_categories};
use crate::merge::MergeEngine;

use super::error::CoreError;
use super::types::RunSummary;

/// Runs one load → fetch → merge → save pass with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
    table_name: String,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn open(&self, input: &Path) -> Result<TableDocument, CoreError> {
        info!("Loading table `{}` from {}", self.table_name, input.display());
        TableDocument::load(input, &self.table_name)
    }

    pub fn process(
        &self,
        input: &Path,
        source: &dyn CategorySource,
        output: &Path,
    ) -> Result<RunSummary, CoreError> {
        let document = self.open(input)?;
        self.run(document, source, output)
    }

    /// Decorate an already loaded document and write it to `output`. All
    /// category data is fetched before anything is modified; on error
    /// nothing is written.
    pub fn run(
        &self,
        mut document: TableDocument,
        source: &dyn CategorySource,
        output: &Path,
    ) -> Result<RunSummary, CoreError> {
        let tags = fetch_categories(source)?;

        let report = MergeEngine::new(&self.config).apply(&mut document, &tags);

        document.save(output)?;
        info!("Wrote {} items to {}", report.items, output.display());

        Ok(RunSummary {
            item_count: report.items,
            decorated: report.decorated,
            output: output.to_path_buf(),
        })
    }
}
