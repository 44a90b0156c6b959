//! Template System - Immutable Registry
//!
//! Built once at startup, injected into the generator, never mutated by the
//! render path.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub type TemplateId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub text_field_count: u32,
    pub category: String,
    pub filename: String,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        text_field_count: u32,
        category: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            text_field_count,
            category: category.into(),
            filename: filename.into(),
        }
    }

    /// Number of `additional_text` entries this template will draw.
    pub fn additional_capacity(&self) -> usize {
        (self.text_field_count as i64 - 2).max(0) as usize
    }
}

/// Listing view of a template, as handed to transports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub text_field_count: u32,
    pub category: String,
    pub preview_url: String,
}

impl From<&Template> for TemplateSummary {
    fn from(t: &Template) -> Self {
        Self {
            id: t.id.clone(),
            name: t.display_name.clone(),
            text_field_count: t.text_field_count,
            category: t.category.clone(),
            preview_url: format!("/templates/{}", t.filename),
        }
    }
}

#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("Failed to read template directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Template registry - lookup table keyed by template id
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<TemplateId, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self { templates: HashMap::new() }
    }

    /// The built-in template set shipped with the service.
    pub fn builtin() -> Self {
        Self::from_templates([
            Template::new("drake", "Drake Hotline Bling", 2, "classic", "drake.jpg"),
            Template::new("distracted-boyfriend", "Distracted Boyfriend", 3, "classic", "distracted-boyfriend.jpg"),
            Template::new("two-buttons", "Two Buttons", 3, "classic", "two-buttons.jpg"),
            Template::new("change-my-mind", "Change My Mind", 1, "debate", "change-my-mind.jpg"),
        ])
    }

    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let mut registry = Self::new();
        for template in templates {
            registry.register(template);
        }
        registry
    }

    /// Load every `*.json` descriptor in `dir`. Unparsable files are skipped;
    /// a missing directory yields an empty registry.
    pub fn load_from_dir(dir: &Path) -> Result<Self, TemplateLoadError> {
        let mut registry = Self::new();
        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "template directory missing, registry is empty");
            return Ok(registry);
        }

        let io_err = |source| TemplateLoadError::Io {
            path: dir.display().to_string(),
            source,
        };
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().map_or(false, |e| e == "json") {
                let parsed = fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|content| {
                        serde_json::from_str::<Template>(&content).map_err(|e| e.to_string())
                    });
                match parsed {
                    Ok(template) => registry.register(template),
                    Err(e) => {
                        tracing::warn!(file = %path.display(), error = %e, "skipping template descriptor");
                    }
                }
            }
        }
        tracing::info!(count = registry.len(), dir = %dir.display(), "templates loaded");
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    /// Templates in `category`; `None` or `""` means every category.
    /// Order is unspecified.
    pub fn list(&self, category: Option<&str>) -> Vec<&Template> {
        match category {
            None | Some("") => self.templates.values().collect(),
            Some(c) => self.templates.values().filter(|t| t.category == c).collect(),
        }
    }

    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
