//! Field Positioning
//!
//! Decides where each text field lands on the canvas. Anchors are the
//! horizontal centre and baseline row of a text block.

use serde::Serialize;

use crate::pipeline::RenderRequest;
use crate::templates::Template;

pub const MIN_RENDER_FONT_SIZE: f32 = 16.0;
pub const MAX_RENDER_FONT_SIZE: f32 = 48.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum Field {
    Top,
    Bottom,
    Additional(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldAnchor<'a> {
    pub field: Field,
    pub text: &'a str,
    pub x: i32,
    pub y: i32,
}

/// One size per render, derived from image width.
pub fn render_font_size(image_width: u32) -> f32 {
    (image_width as f32 / 12.0).clamp(MIN_RENDER_FONT_SIZE, MAX_RENDER_FONT_SIZE)
}

/// Anchors for every non-empty field the template can hold, in draw order.
pub fn anchors_for<'a>(
    template: &Template,
    request: &'a RenderRequest,
    image_width: u32,
    image_height: u32,
    font_size: f32,
) -> Vec<FieldAnchor<'a>> {
    let centre_x = (image_width / 2) as i32;
    let height = image_height as i32;
    let edge_offset = (font_size * 1.5).round() as i32;
    let panel_step = (font_size * 2.0).round() as i32;

    let mut anchors = Vec::new();

    if !request.top_text.is_empty() {
        anchors.push(FieldAnchor {
            field: Field::Top,
            text: &request.top_text,
            x: centre_x,
            y: edge_offset,
        });
    }

    if !request.bottom_text.is_empty() {
        anchors.push(FieldAnchor {
            field: Field::Bottom,
            text: &request.bottom_text,
            x: centre_x,
            y: height - edge_offset,
        });
    }

    let capacity = template.additional_capacity();
    for (i, text) in request.additional_text.iter().enumerate().take(capacity) {
        if text.is_empty() {
            continue;
        }
        anchors.push(FieldAnchor {
            field: Field::Additional(i),
            text,
            x: centre_x,
            y: height / 2 + (i as i32 - 1) * panel_step,
        });
    }

    anchors
}

/// Baseline of each line in a block of `line_count` lines centred on `anchor_y`.
/// Saturates instead of overflowing for extreme line heights.
pub fn line_baselines(anchor_y: i32, line_count: usize, line_height: i32) -> Vec<i32> {
    if line_count == 0 {
        return vec![];
    }
    let count = i32::try_from(line_count).unwrap_or(i32::MAX);
    let start_y = anchor_y.saturating_sub(count.saturating_sub(1).saturating_mul(line_height) / 2);
    (0..count)
        .map(|i| start_y.saturating_add(i.saturating_mul(line_height)))
        .collect()
}

pub fn line_height(font_size: f32, line_spacing: f32) -> i32 {
    (font_size * line_spacing).round() as i32
}
