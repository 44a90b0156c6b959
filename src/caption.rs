//! Caption Providers
//!
//! The engine only needs "zero or more strings for this template"; where
//! they come from is pluggable.

use std::sync::Arc;

/// External caption source, e.g. a generation service client.
pub trait CaptionBackend: Send + Sync {
    fn captions(&self, template_name: &str) -> Vec<String>;
}

impl<F> CaptionBackend for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn captions(&self, template_name: &str) -> Vec<String> {
        self(template_name)
    }
}

/// Where generated captions come from. Requests without
/// `use_generated_caption` never consult it.
#[derive(Clone, Default)]
pub enum CaptionProvider {
    None,
    #[default]
    StaticPlaceholder,
    External(Arc<dyn CaptionBackend>),
}

impl std::fmt::Debug for CaptionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptionProvider::None => f.write_str("None"),
            CaptionProvider::StaticPlaceholder => f.write_str("StaticPlaceholder"),
            CaptionProvider::External(_) => f.write_str("External(..)"),
        }
    }
}

impl CaptionProvider {
    pub fn external(backend: impl CaptionBackend + 'static) -> Self {
        CaptionProvider::External(Arc::new(backend))
    }

    pub fn captions(&self, template_name: &str) -> Vec<String> {
        match self {
            CaptionProvider::None => vec![],
            CaptionProvider::StaticPlaceholder => {
                vec![format!("AI generated caption for {template_name} meme")]
            }
            CaptionProvider::External(backend) => backend.captions(template_name),
        }
    }
}
