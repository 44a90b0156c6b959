//! Image Compositor
//!
//! Decodes the base raster, lays out and draws every positioned field, then
//! encodes the canvas. One canvas per call; nothing is shared between calls.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};

use crate::config::{EngineConfig, OutputFormat};
use crate::glyph::{FontFace, OutlineColors};
use crate::layout::wrap;
use crate::pipeline::{RenderError, RenderRequest};
use crate::positioning::{anchors_for, line_baselines, line_height, render_font_size};
use crate::templates::Template;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Decode encoded image bytes into an owned RGBA canvas.
pub fn decode_canvas(bytes: &[u8]) -> Result<RgbaImage, RenderError> {
    let base = image::load_from_memory(bytes)
        .map_err(|e| RenderError::ImageLoad(format!("failed to decode template image: {e}")))?;
    Ok(base.to_rgba8())
}

pub fn encode_canvas(canvas: RgbaImage, format: OutputFormat, quality: u8) -> Result<EncodedImage, RenderError> {
    let mut bytes = Vec::new();
    let result = match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)))
        }
        OutputFormat::Png => canvas.write_with_encoder(PngEncoder::new(&mut bytes)),
    };
    result.map_err(|e| RenderError::Encoding(format!("failed to encode image: {e}")))?;

    Ok(EncodedImage {
        bytes,
        mime_type: format.mime_type(),
    })
}

/// Draw every field of `request` onto `canvas` in place.
///
/// Wrapping is measured at `config.font_size`; drawing, centring and line
/// spacing use the width-derived render size.
pub fn draw_fields(
    canvas: &mut RgbaImage,
    template: &Template,
    request: &RenderRequest,
    font: &FontFace,
    config: &EngineConfig,
) {
    let (width, height) = canvas.dimensions();
    let font_size = render_font_size(width);
    let spacing = line_height(font_size, config.line_spacing);
    let colors = OutlineColors::default();

    for anchor in anchors_for(template, request, width, height, font_size) {
        let lines = wrap(anchor.text, width as f32, |s| font.measure(s, config.font_size));
        let baselines = line_baselines(anchor.y, lines.len(), spacing);
        tracing::debug!(field = ?anchor.field, lines = lines.len(), x = anchor.x, y = anchor.y, "drawing field");

        for (line, y) in lines.iter().zip(baselines) {
            font.draw_outlined_line(canvas, &line.text, anchor.x, y, font_size, colors);
        }
    }
}

/// Full render of one request against an already-resolved template.
pub fn compose(
    template: &Template,
    request: &RenderRequest,
    base_image: &[u8],
    font: &FontFace,
    config: &EngineConfig,
) -> Result<EncodedImage, RenderError> {
    let mut canvas = decode_canvas(base_image)?;
    draw_fields(&mut canvas, template, request, font, config);
    encode_canvas(canvas, config.output_format, config.image_quality)
}
