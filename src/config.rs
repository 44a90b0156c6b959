//! Engine Configuration
//!
//! Defaults match the deployed service; every field can be overridden from
//! the environment.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" | "image/jpeg" => Ok(OutputFormat::Jpeg),
            "png" | "image/png" => Ok(OutputFormat::Png),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,
    #[serde(default = "default_font_file")]
    pub font_file: PathBuf,
    /// Encoder quality, 1-100. Ignored for lossless formats.
    #[serde(default = "default_quality", deserialize_with = "clamped_quality")]
    pub image_quality: u8,
    /// Size used when measuring text for wrapping. Drawing uses a size
    /// derived from the image width instead.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Reported at startup only. Caption generation is chosen per generator
    /// with `MemeGenerator::with_captions`.
    #[serde(default)]
    pub enable_ai_caption: bool,
}

fn default_template_dir() -> PathBuf { PathBuf::from("./templates") }
fn default_font_file() -> PathBuf { PathBuf::from("./fonts/impact.ttf") }
fn default_quality() -> u8 { 90 }
fn default_font_size() -> f32 { 36.0 }
fn default_line_spacing() -> f32 { 1.5 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            font_file: default_font_file(),
            image_quality: default_quality(),
            font_size: default_font_size(),
            line_spacing: default_line_spacing(),
            output_format: OutputFormat::default(),
            enable_ai_caption: false,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or empty keys keep their
    /// default; unparsable values log a warning and keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let config = Self {
            template_dir: get("TEMPLATE_DIR").map(PathBuf::from).unwrap_or(defaults.template_dir),
            font_file: get("FONT_FILE").map(PathBuf::from).unwrap_or(defaults.font_file),
            image_quality: clamp_quality(parse_or(
                "IMAGE_QUALITY",
                get("IMAGE_QUALITY"),
                i64::from(defaults.image_quality),
            )),
            font_size: parse_or("FONT_SIZE", get("FONT_SIZE"), defaults.font_size),
            line_spacing: parse_or("LINE_SPACING", get("LINE_SPACING"), defaults.line_spacing),
            output_format: parse_or("OUTPUT_FORMAT", get("OUTPUT_FORMAT"), defaults.output_format),
            enable_ai_caption: parse_or("ENABLE_AI_CAPTION", get("ENABLE_AI_CAPTION"), defaults.enable_ai_caption),
        }
        .normalized();

        tracing::info!(
            template_dir = %config.template_dir.display(),
            font_file = %config.font_file.display(),
            quality = config.image_quality,
            format = config.output_format.mime_type(),
            ai_caption = config.enable_ai_caption,
            "configuration loaded"
        );
        config
    }

    /// Read a JSON config file; missing keys take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config.normalized())
    }

    /// Clamp quality into 1-100; non-finite or non-positive sizes fall back
    /// to their defaults.
    pub fn normalized(mut self) -> Self {
        self.image_quality = self.image_quality.clamp(1, 100);
        self.font_size = positive_or("font_size", self.font_size, default_font_size());
        self.line_spacing = positive_or("line_spacing", self.line_spacing, default_line_spacing());
        self
    }
}

fn clamp_quality(value: i64) -> u8 {
    value.clamp(1, 100) as u8
}

fn clamped_quality<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_quality)
}

fn positive_or(key: &str, value: f32, default: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        tracing::warn!(key, value, default, "value must be finite and positive, using default");
        default
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, default = ?default, "invalid value, using default");
            default
        }),
    }
}
