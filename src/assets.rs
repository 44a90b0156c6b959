//! Asset Loading
//!
//! Raw bytes for template images and the font program. Decoding happens in
//! the compositor; loaders only fetch.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open template image {path}: {message}")]
    Image { path: String, message: String },

    #[error("failed to load font {path}: {message}")]
    Font { path: String, message: String },
}

pub trait AssetLoader: Send + Sync {
    fn load_template_image(&self, filename: &str) -> Result<Vec<u8>, AssetError>;
    fn load_font(&self) -> Result<Vec<u8>, AssetError>;
}

/// Reads template images from a directory and the font from a fixed path.
#[derive(Debug, Clone)]
pub struct FsAssetLoader {
    template_dir: PathBuf,
    font_file: PathBuf,
}

impl FsAssetLoader {
    pub fn new(template_dir: impl Into<PathBuf>, font_file: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            font_file: font_file.into(),
        }
    }
}

impl AssetLoader for FsAssetLoader {
    fn load_template_image(&self, filename: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.template_dir.join(filename);
        fs::read(&path).map_err(|e| AssetError::Image {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn load_font(&self) -> Result<Vec<u8>, AssetError> {
        fs::read(&self.font_file).map_err(|e| AssetError::Font {
            path: self.font_file.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// In-memory assets, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetLoader {
    images: HashMap<String, Vec<u8>>,
    font: Option<Vec<u8>>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.insert(filename.into(), bytes);
        self
    }

    pub fn with_font(mut self, bytes: Vec<u8>) -> Self {
        self.font = Some(bytes);
        self
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_template_image(&self, filename: &str) -> Result<Vec<u8>, AssetError> {
        self.images.get(filename).cloned().ok_or_else(|| AssetError::Image {
            path: filename.to_string(),
            message: "not found".to_string(),
        })
    }

    fn load_font(&self) -> Result<Vec<u8>, AssetError> {
        self.font.clone().ok_or_else(|| AssetError::Font {
            path: "<memory>".to_string(),
            message: "no font configured".to_string(),
        })
    }
}
