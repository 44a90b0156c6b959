//! Text Layout - Greedy Word Wrap
//!
//! Pure: no drawing, no side effects. Width is supplied by the caller's
//! measure function so layout stays independent of any font backend.

use serde::Serialize;

/// Visual safety gutter subtracted from the available width.
pub const WRAP_MARGIN_PX: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub text: String,
    pub measured_width_px: f32,
}

/// Break `text` into lines that fit `max_width_px - WRAP_MARGIN_PX`.
///
/// Tokens are never split: a token wider than the budget lands alone on its
/// own (overflowing) line.
pub fn wrap<F>(text: &str, max_width_px: f32, measure: F) -> Vec<Line>
where
    F: Fn(&str) -> f32,
{
    let budget = max_width_px - WRAP_MARGIN_PX;
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for token in text.split_whitespace() {
        let candidate = if current.is_empty() {
            token.to_string()
        } else {
            format!("{current} {token}")
        };
        let width = measure(&candidate);

        if width < budget {
            current = candidate;
            current_width = width;
        } else {
            if !current.is_empty() {
                lines.push(Line {
                    text: std::mem::take(&mut current),
                    measured_width_px: current_width,
                });
            }
            current_width = measure(token);
            current = token.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(Line {
            text: current,
            measured_width_px: current_width,
        });
    }

    lines
}
