//! Generation Pipeline - Single Entry Point
//!
//! Every request goes through `MemeGenerator::generate`. Domain failures come
//! back as a populated `error` on the result, never as a panic.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

use crate::assets::{AssetError, AssetLoader, FsAssetLoader};
use crate::caption::CaptionProvider;
use crate::compositor::{compose, EncodedImage};
use crate::config::EngineConfig;
use crate::glyph::FontFace;
use crate::templates::{Template, TemplateRegistry, TemplateSummary};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Image load failure: {0}")]
    ImageLoad(String),

    #[error("Font load failure: {0}")]
    FontLoad(String),

    #[error("Encoding failure: {0}")]
    Encoding(String),

    #[error("Deadline exceeded before render started")]
    DeadlineExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<AssetError> for RenderError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::Image { .. } => RenderError::ImageLoad(err.to_string()),
            AssetError::Font { .. } => RenderError::FontLoad(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderRequest {
    pub template_id: String,
    #[serde(default)]
    pub top_text: String,
    #[serde(default)]
    pub bottom_text: String,
    #[serde(default)]
    pub additional_text: Vec<String>,
    #[serde(default, alias = "use_ai_caption")]
    pub use_generated_caption: bool,
    /// Accepted for compatibility; caption providers do not consume it yet.
    #[serde(default)]
    pub caption_prompt: Option<String>,
}

/// Outcome of one render. Either `image_data` + `mime_type` or `error` is
/// populated, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    #[serde(with = "base64_bytes")]
    pub image_data: Vec<u8>,
    pub mime_type: String,
    pub generated_captions: Vec<String>,
    pub error: String,
}

impl RenderResult {
    pub fn success(image: EncodedImage, generated_captions: Vec<String>) -> Self {
        Self {
            image_data: image.bytes,
            mime_type: image.mime_type.to_string(),
            generated_captions,
            error: String::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Service boundary shared by transports, handlers and test doubles.
pub trait MemeService: Send + Sync {
    fn generate(&self, request: RenderRequest) -> RenderResult;
    fn list_templates(&self, category: Option<&str>) -> Vec<TemplateSummary>;

    /// Resolved template metadata, when the service can share it.
    fn template(&self, _id: &str) -> Option<Template> {
        None
    }
}

/// The meme generator: registry, assets, caption source and a lazily parsed
/// font shared by every render.
pub struct MemeGenerator {
    registry: TemplateRegistry,
    config: EngineConfig,
    assets: Box<dyn AssetLoader>,
    captions: CaptionProvider,
    font: RwLock<Option<Arc<FontFace>>>,
}

impl MemeGenerator {
    pub fn new(registry: TemplateRegistry, config: EngineConfig, assets: Box<dyn AssetLoader>) -> Self {
        Self {
            registry,
            config,
            assets,
            captions: CaptionProvider::default(),
            font: RwLock::new(None),
        }
    }

    /// Generator reading assets from the configured template dir and font file.
    pub fn from_config(registry: TemplateRegistry, config: EngineConfig) -> Self {
        let assets = FsAssetLoader::new(config.template_dir.clone(), config.font_file.clone());
        Self::new(registry, config, Box::new(assets))
    }

    pub fn with_captions(mut self, captions: CaptionProvider) -> Self {
        self.captions = captions;
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render with an optional deadline; past the deadline nothing is drawn.
    #[tracing::instrument(
        name = "generate",
        skip_all,
        fields(request_id = %Uuid::new_v4(), template_id = %request.template_id)
    )]
    pub fn generate_with_deadline(&self, mut request: RenderRequest, deadline: Option<Instant>) -> RenderResult {
        let template = match self.registry.get(&request.template_id) {
            Some(t) => t,
            None => {
                let err = RenderError::TemplateNotFound(request.template_id.clone());
                tracing::warn!(error = %err, "template lookup failed");
                return RenderResult::failure(err.to_string());
            }
        };

        let generated_captions = if request.use_generated_caption {
            self.captions.captions(&template.display_name)
        } else {
            vec![]
        };
        if request.top_text.is_empty() {
            if let Some(first) = generated_captions.first() {
                request.top_text = first.clone();
            }
        }
        if let Some(prompt) = &request.caption_prompt {
            tracing::debug!(prompt = %prompt, "caption prompt ignored by provider");
        }

        match self.render(template, &request, deadline) {
            Ok(image) => {
                tracing::info!(bytes = image.bytes.len(), mime = image.mime_type, "meme generated");
                RenderResult::success(image, generated_captions)
            }
            Err(err) => {
                tracing::error!(error = %err, "meme generation failed");
                RenderResult::failure(format!("Failed to generate meme: {err}"))
            }
        }
    }

    fn render(
        &self,
        template: &Template,
        request: &RenderRequest,
        deadline: Option<Instant>,
    ) -> Result<EncodedImage, RenderError> {
        if deadline.map_or(false, |d| Instant::now() >= d) {
            return Err(RenderError::DeadlineExceeded);
        }
        let base_image = self.assets.load_template_image(&template.filename)?;
        let font = self.font()?;
        compose(template, request, &base_image, &font, &self.config)
    }

    /// Parsed font, loading it on first use. A failed load is not cached so
    /// a later request can succeed once the asset is fixed.
    fn font(&self) -> Result<Arc<FontFace>, RenderError> {
        if let Some(font) = self.font.read().ok().and_then(|f| f.as_ref().cloned()) {
            return Ok(font);
        }

        let mut slot = self
            .font
            .write()
            .map_err(|_| RenderError::FontLoad("font cache poisoned".into()))?;
        if let Some(font) = slot.as_ref() {
            return Ok(Arc::clone(font));
        }
        let font = Arc::new(FontFace::from_bytes(self.assets.load_font()?)?);
        tracing::info!(?font, "font loaded");
        *slot = Some(Arc::clone(&font));
        Ok(font)
    }
}

impl MemeService for MemeGenerator {
    fn generate(&self, request: RenderRequest) -> RenderResult {
        self.generate_with_deadline(request, None)
    }

    fn list_templates(&self, category: Option<&str>) -> Vec<TemplateSummary> {
        tracing::info!(category = category.unwrap_or(""), "listing templates");
        self.registry
            .list(category)
            .into_iter()
            .map(TemplateSummary::from)
            .collect()
    }

    fn template(&self, id: &str) -> Option<Template> {
        self.registry.get(id).cloned()
    }
}
