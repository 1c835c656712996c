//! Editor-side services built on top of the scene

pub mod file_manager;

pub use file_manager::{FileManager, SaveData, SaveMetadata};
