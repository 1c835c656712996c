//! File management for scenes
//!
//! Handles saving, loading, and file state management for `.flow` files.

use crate::constants;
use crate::error::GraphResult;
use crate::nodes::{GraphSnapshot, Scene, SceneEvent};
use log::info;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Save file data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: String,
    pub metadata: SaveMetadata,
    pub graph: GraphSnapshot,
}

/// Metadata for save files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub created: String,  // ISO 8601 timestamp
    pub modified: String, // ISO 8601 timestamp
    pub creator: String,
}

/// Manages file operations for a scene
pub struct FileManager {
    /// Current file path (None if unsaved/new file)
    current_file_path: Option<PathBuf>,
    /// Creation timestamp of the current file, kept across re-saves
    created: Option<String>,
    /// Whether the scene has been modified since last save
    is_modified: Rc<Cell<bool>>,
}

impl FileManager {
    /// Create a new file manager
    pub fn new() -> Self {
        Self {
            current_file_path: None,
            created: None,
            is_modified: Rc::new(Cell::new(false)),
        }
    }

    /// Mark the file as modified whenever the scene reports a change
    pub fn track(&self, scene: &mut Scene) {
        let flag = Rc::clone(&self.is_modified);
        scene.add_observer(move |_: &Scene, event: &SceneEvent| {
            if !matches!(
                event,
                SceneEvent::PortConnectionAdded { .. } | SceneEvent::PortConnectionRemoved { .. }
            ) {
                flag.set(true);
            }
        });
    }

    /// Get the current file path
    pub fn current_file_path(&self) -> Option<&PathBuf> {
        self.current_file_path.as_ref()
    }

    /// Check if there are unsaved changes
    pub fn has_unsaved_changes(&self) -> bool {
        self.is_modified.get()
    }

    /// Mark the file as modified
    pub fn mark_modified(&mut self) {
        self.is_modified.set(true);
    }

    /// Mark the file as saved (no modifications)
    pub fn mark_saved(&mut self) {
        self.is_modified.set(false);
    }

    /// Get display name for the current file
    pub fn get_file_display_name(&self) -> String {
        let name = match &self.current_file_path {
            Some(path) => path.file_name().and_then(|n| n.to_str()).unwrap_or("Unknown"),
            None => "Untitled",
        };
        if self.has_unsaved_changes() {
            format!("{}*", name)
        } else {
            name.to_string()
        }
    }

    /// Create a new file (reset state)
    pub fn new_file(&mut self) {
        self.current_file_path = None;
        self.created = None;
        self.mark_saved();
    }

    /// Path with the `.flow` extension appended when missing
    pub fn with_flow_extension(file_path: &Path) -> PathBuf {
        let has_extension = file_path
            .extension()
            .is_some_and(|ext| ext == constants::file::EXTENSION);
        if has_extension {
            file_path.to_path_buf()
        } else {
            let mut name = file_path.as_os_str().to_owned();
            name.push(".");
            name.push(constants::file::EXTENSION);
            PathBuf::from(name)
        }
    }

    /// Save the scene to a file, returning the path actually written
    pub fn save_to_file(&mut self, file_path: &Path, scene: &Scene) -> GraphResult<PathBuf> {
        let file_path = Self::with_flow_extension(file_path);
        let now = chrono::Utc::now().to_rfc3339();
        let created = match &self.current_file_path {
            Some(current) if *current == file_path => self.created.clone(),
            _ => None,
        };

        let save_data = SaveData {
            version: constants::file::FORMAT_VERSION.to_string(),
            metadata: SaveMetadata {
                created: created.unwrap_or_else(|| now.clone()),
                modified: now,
                creator: constants::file::CREATOR.to_string(),
            },
            graph: scene.save(),
        };

        let json_content = serde_json::to_string_pretty(&save_data)?;
        std::fs::write(&file_path, json_content)?;
        info!("Saved scene to {}", file_path.display());

        // Update file manager state
        self.created = Some(save_data.metadata.created);
        self.current_file_path = Some(file_path.clone());
        self.mark_saved();

        Ok(file_path)
    }

    /// Replace the scene content with a file. The scene is left untouched
    /// when the file cannot be read or does not describe a valid scene.
    pub fn load_from_file(&mut self, file_path: &Path, scene: &mut Scene) -> GraphResult<SaveMetadata> {
        let file_content = std::fs::read_to_string(file_path)?;
        let save_data: SaveData = serde_json::from_str(&file_content)?;

        scene.load(&save_data.graph)?;
        info!("Loaded scene from {}", file_path.display());

        // Update file manager state
        self.created = Some(save_data.metadata.created.clone());
        self.current_file_path = Some(file_path.to_path_buf());
        self.mark_saved();

        Ok(save_data.metadata)
    }

    /// Save to the current path
    pub fn save_file(&mut self, scene: &Scene) -> GraphResult<PathBuf> {
        match self.current_file_path.clone() {
            Some(path) => self.save_to_file(&path, scene),
            None => Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no file path set, use save_to_file").into()),
        }
    }
}

impl Default for FileManager {
    fn default() -> Self {
        Self::new()
    }
}
