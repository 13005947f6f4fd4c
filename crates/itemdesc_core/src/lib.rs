pub mod config;
pub mod core_api;
pub mod document;
pub mod encoding;
pub mod layout;
pub mod lua;
pub mod materials;
pub mod merge;
