//! Glyph Rendering - Outlined Text Lines
//!
//! A line is rasterized once into a coverage mask, then stamped onto the
//! canvas at every stroke offset before the un-offset fill pass.

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, GlyphId, Scale};

use crate::pipeline::RenderError;

/// Stroke and fill colour for one line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineColors {
    pub stroke: Rgba<u8>,
    pub fill: Rgba<u8>,
}

impl Default for OutlineColors {
    fn default() -> Self {
        Self {
            stroke: Rgba([0, 0, 0, 255]),
            fill: Rgba([255, 255, 255, 255]),
        }
    }
}

/// Outline thickness in pixels for a given font size.
pub fn stroke_radius(font_size: f32) -> i32 {
    ((font_size / 6.0).floor() as i32).max(1)
}

/// Parsed font program. Immutable once loaded; share it behind an `Arc`.
pub struct FontFace {
    font: Font<'static>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("glyph_count", &self.font.glyph_count())
            .finish()
    }
}

impl FontFace {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RenderError> {
        let font = Font::try_from_vec(data)
            .ok_or_else(|| RenderError::FontLoad("failed to parse font program".into()))?;
        Ok(Self { font })
    }

    /// `font_size` is the em size in pixels; rusttype scales by
    /// ascent-to-descent height, so convert.
    fn scale(&self, font_size: f32) -> Scale {
        let units_per_em = self.font.units_per_em() as f32;
        let vm = self.font.v_metrics_unscaled();
        let extent = vm.ascent - vm.descent;
        if units_per_em <= 0.0 || extent <= 0.0 {
            return Scale::uniform(font_size);
        }
        Scale::uniform(font_size * extent / units_per_em)
    }

    /// Advance width of `text` at `font_size`, rounded up to whole pixels.
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        let scale = self.scale(font_size);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
            .ceil()
    }

    fn rasterize(&self, text: &str, font_size: f32, x: i32, baseline: i32) -> Vec<(i32, i32, f32)> {
        let scale = self.scale(font_size);
        let mut coverage = Vec::new();
        for glyph in self.font.layout(text, scale, point(x as f32, baseline as f32)) {
            // .notdef: codepoint not covered by this font
            if glyph.id() == GlyphId(0) {
                continue;
            }
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, v| {
                if v > 0.0 {
                    coverage.push((bb.min.x + gx as i32, bb.min.y + gy as i32, v));
                }
            });
        }
        coverage
    }

    /// Draw `text` centred on `anchor_x` with its baseline on `anchor_y`,
    /// outlined by `stroke_radius(font_size)` pixels.
    pub fn draw_outlined_line(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        anchor_x: i32,
        anchor_y: i32,
        font_size: f32,
        colors: OutlineColors,
    ) {
        let radius = stroke_radius(font_size);
        let reach = ((font_size * 2.0).ceil() as i32).saturating_add(radius);
        let (_, height) = canvas.dimensions();
        if anchor_y < -reach || anchor_y > (height as i32).saturating_add(reach) {
            return;
        }

        let width = self.measure(text, font_size) as i32;
        let draw_x = anchor_x.saturating_sub(width / 2);
        let mask = self.rasterize(text, font_size, draw_x, anchor_y);
        if mask.is_empty() {
            return;
        }

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                stamp(canvas, &mask, dx, dy, colors.stroke);
            }
        }
        stamp(canvas, &mask, 0, 0, colors.fill);
    }
}

fn stamp(canvas: &mut RgbaImage, mask: &[(i32, i32, f32)], dx: i32, dy: i32, color: Rgba<u8>) {
    let (w, h) = canvas.dimensions();
    for &(x, y, v) in mask {
        let (px, py) = (x + dx, y + dy);
        if px < 0 || py < 0 || px as u32 >= w || py as u32 >= h {
            continue;
        }
        blend(canvas.get_pixel_mut(px as u32, py as u32), color, v);
    }
}

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0) * (src.0[3] as f32 / 255.0);
    let inv = 1.0 - a;
    for c in 0..3 {
        dst.0[c] = (src.0[c] as f32 * a + dst.0[c] as f32 * inv).round() as u8;
    }
    dst.0[3] = 255;
}
