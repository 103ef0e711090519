//! Text measurement through the browser's Canvas2D `measureText`.

use tag_core::autofit::{FontSpec, HeuristicMeasurer, TextMeasurer};
use web_sys::CanvasRenderingContext2d;

const DEFAULT_FAMILY: &str = "sans-serif";

/// CSS `font` shorthand for a measurement.
pub fn css_font(font: &FontSpec<'_>) -> String {
    format!(
        "{} {}px {}",
        font.weight.0,
        font.size,
        font.family.unwrap_or(DEFAULT_FAMILY)
    )
}

/// Measures with the canvas the label is painted on, so fitted sizes match
/// what the user sees.
pub struct CanvasMeasurer<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasMeasurer<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasurer for CanvasMeasurer<'_> {
    fn line_width(&self, text: &str, font: &FontSpec<'_>) -> f32 {
        self.ctx.set_font(&css_font(font));
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width() as f32,
            Err(e) => {
                log::warn!("measureText failed ({e:?}); estimating");
                HeuristicMeasurer.line_width(text, font)
            }
        }
    }
}
