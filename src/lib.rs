//! Memegen Core - Meme Composition Engine
//!
//! Composites caller text onto a named background template:
//! 1. Templates are resolved from an injected, immutable registry
//! 2. Text is wrapped greedily under a pixel budget
//! 3. Each line is drawn with a stamped outline
//! 4. Failures are reported on the result, never thrown

pub mod templates;
pub mod layout;
pub mod glyph;
pub mod positioning;
pub mod compositor;
pub mod config;
pub mod assets;
pub mod caption;
pub mod validation;
pub mod handler;
pub mod pipeline;

pub use templates::{Template, TemplateId, TemplateRegistry, TemplateSummary};
pub use layout::{wrap, Line};
pub use glyph::{FontFace, OutlineColors};
pub use positioning::{anchors_for, render_font_size, Field, FieldAnchor};
pub use compositor::{compose, EncodedImage};
pub use config::{ConfigError, EngineConfig, OutputFormat};
pub use assets::{AssetError, AssetLoader, FsAssetLoader, MemoryAssetLoader};
pub use caption::{CaptionBackend, CaptionProvider};
pub use handler::MemeHandler;
pub use pipeline::{MemeGenerator, MemeService, RenderError, RenderRequest, RenderResult};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
