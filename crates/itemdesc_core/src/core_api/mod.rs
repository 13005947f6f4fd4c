mod engine;
mod error;
mod types;

pub use engine::Engine;
pub use error::{CoreError, CoreErrorCode};
pub use types::{Category, MaterialInfo, MaterialTag, RunSummary, TagIndex, TagStyle};
