//! Shrink-to-fit font sizing.
//!
//! Text is wrapped greedily on whitespace inside the box width (long words
//! break between characters, like CSS `word-break: break-word`). Starting at
//! the maximum size, the engine shrinks until the wrapped block fits both
//! box dimensions or the minimum size is reached.
//!
//! The result is a pure function of the text, box size, font family, font
//! weight, and limits, so [`FitCache`] memoizes on exactly those.

use crate::model::{FontWeight, Layer, LayerKind};
use std::collections::HashMap;

/// Line height multiplier used while fitting.
pub const FIT_LINE_HEIGHT: f32 = 1.1;

/// Size step while the block is more than twice the box height.
const COARSE_STEP: f32 = 5.0;
const FINE_STEP: f32 = 1.0;
/// Largest size the search starts from, whatever the layer asks for.
pub const MAX_FIT_SIZE: f32 = 1000.0;

/// Font parameters for a measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec<'a> {
    pub family: Option<&'a str>,
    pub weight: FontWeight,
    pub size: f32,
}

/// Measures the advance width of a single unwrapped run of text.
///
/// Implementations must be deterministic: equal inputs give equal widths.
pub trait TextMeasurer {
    fn line_width(&self, text: &str, font: &FontSpec<'_>) -> f32;
}

/// Average-glyph estimate: 0.6em per character.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn line_width(&self, text: &str, font: &FontSpec<'_>) -> f32 {
        0.6 * font.size * text.chars().count() as f32
    }
}

/// Size bounds for fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoFitLimits {
    pub max: f32,
    pub min: f32,
}

impl Default for AutoFitLimits {
    fn default() -> Self {
        Self {
            max: 100.0,
            min: 10.0,
        }
    }
}

impl AutoFitLimits {
    /// Limits for a layer: its own font size, when set, is the maximum.
    pub fn for_layer(layer: &Layer, base: AutoFitLimits) -> Self {
        Self {
            max: layer.style.font_size.unwrap_or(base.max),
            min: base.min,
        }
    }
}

/// Rendered extent of a wrapped block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

/// Everything a fit depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRequest<'a> {
    pub text: &'a str,
    pub width: f32,
    pub height: f32,
    pub limits: AutoFitLimits,
    pub family: Option<&'a str>,
    pub weight: FontWeight,
}

impl<'a> FitRequest<'a> {
    pub fn new(text: &'a str, width: f32, height: f32, limits: AutoFitLimits) -> Self {
        Self {
            text,
            width,
            height,
            limits,
            family: None,
            weight: FontWeight::NORMAL,
        }
    }

    /// Request for a text layer with a box (explicit or max dimensions).
    pub fn for_layer(layer: &'a Layer, base: AutoFitLimits) -> Option<Self> {
        if layer.kind != LayerKind::Text {
            return None;
        }
        let style = &layer.style;
        Some(Self {
            text: layer.content_str(),
            width: style.width.or(style.max_width)?,
            height: style.height.or(style.max_height)?,
            limits: AutoFitLimits::for_layer(layer, base),
            family: style.font_family.as_deref(),
            weight: style.font_weight.unwrap_or_default(),
        })
    }
}

/// Wrap `text` into lines no wider than `max_width` (a single character
/// may still exceed it) and return the block extent.
pub fn wrapped_extent(
    text: &str,
    font: &FontSpec<'_>,
    max_width: f32,
    measurer: &dyn TextMeasurer,
) -> Extent {
    let lines = wrap(text, font, max_width, measurer);
    let width = lines
        .iter()
        .map(|l| measurer.line_width(l, font))
        .fold(0.0_f32, f32::max);
    Extent {
        width,
        height: lines.len() as f32 * font.size * FIT_LINE_HEIGHT,
    }
}

fn wrap(text: &str, font: &FontSpec<'_>, max_width: f32, measurer: &dyn TextMeasurer) -> Vec<String> {
    let fits = |s: &str| measurer.line_width(s, font) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if fits(word) {
                line = word.to_string();
                continue;
            }
            // Break the word between characters.
            for ch in word.chars() {
                let mut next = line.clone();
                next.push(ch);
                if line.is_empty() || fits(&next) {
                    line = next;
                } else {
                    lines.push(std::mem::replace(&mut line, ch.to_string()));
                }
            }
        }
        lines.push(line);
    }
    lines
}

/// Largest size in `[min, max]` (found by monotonic shrinking) at which the
/// text fits the box, or exactly `min` if it never does.
pub fn fit(req: &FitRequest<'_>, measurer: &dyn TextMeasurer) -> f32 {
    let AutoFitLimits { max, min } = req.limits;
    let max = if max > MAX_FIT_SIZE { MAX_FIT_SIZE } else { max };
    if req.text.trim().is_empty() {
        return max.max(min);
    }
    if !max.is_finite() || max <= min {
        return min;
    }

    let mut size = max;
    while size > min {
        let font = FontSpec {
            family: req.family,
            weight: req.weight,
            size,
        };
        let extent = wrapped_extent(req.text, &font, req.width, measurer);
        if extent.width <= req.width && extent.height <= req.height {
            break;
        }
        size -= if extent.height > req.height * 2.0 {
            COARSE_STEP
        } else {
            FINE_STEP
        };
    }
    size.max(min)
}

// ─── Cache ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FitKey {
    text: String,
    width: u32,
    height: u32,
    family: Option<String>,
    weight: FontWeight,
    max: u32,
    min: u32,
}

impl FitKey {
    fn new(req: &FitRequest<'_>) -> Self {
        Self {
            text: req.text.to_string(),
            width: req.width.to_bits(),
            height: req.height.to_bits(),
            family: req.family.map(str::to_string),
            weight: req.weight,
            max: req.limits.max.to_bits(),
            min: req.limits.min.to_bits(),
        }
    }
}

/// Memoized fits. Valid for a single measurer; clear it if fonts change.
#[derive(Debug, Default)]
pub struct FitCache {
    entries: HashMap<FitKey, f32>,
}

impl FitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, req: &FitRequest<'_>, measurer: &dyn TextMeasurer) -> f32 {
        *self
            .entries
            .entry(FitKey::new(req))
            .or_insert_with(|| fit(req, measurer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Style;
    use pretty_assertions::assert_eq;

    fn limits(max: f32, min: f32) -> AutoFitLimits {
        AutoFitLimits { max, min }
    }

    #[test]
    fn short_text_keeps_max() {
        // "Hi" at 20px: 24 wide, 22 tall.
        let req = FitRequest::new("Hi", 100.0, 50.0, limits(20.0, 10.0));
        assert_eq!(fit(&req, &HeuristicMeasurer), 20.0);
    }

    #[test]
    fn empty_text_fits_at_max() {
        let req = FitRequest::new("", 0.0, 0.0, limits(48.0, 10.0));
        assert_eq!(fit(&req, &HeuristicMeasurer), 48.0);
    }

    #[test]
    fn zero_box_shrinks_to_min() {
        let req = FitRequest::new("STOLICHNAYA", 0.0, 0.0, limits(100.0, 10.0));
        assert_eq!(fit(&req, &HeuristicMeasurer), 10.0);
    }

    #[test]
    fn long_text_shrinks_until_it_fits() {
        let req = FitRequest::new("WELLER SPECIAL RESERVE", 300.0, 60.0, limits(100.0, 10.0));
        let size = fit(&req, &HeuristicMeasurer);
        assert!(size < 100.0 && size >= 10.0);
        let font = FontSpec {
            family: None,
            weight: FontWeight::NORMAL,
            size,
        };
        let extent = wrapped_extent(req.text, &font, 300.0, &HeuristicMeasurer);
        assert!(extent.width <= 300.0 && extent.height <= 60.0);
    }

    #[test]
    fn oversized_font_is_capped_before_shrinking() {
        // A stored fontSize this large would never shrink in f32 steps of 5.
        let huge = FitRequest::new("WELLER SPECIAL RESERVE", 300.0, 60.0, limits(1e10, 10.0));
        let capped = FitRequest::new("WELLER SPECIAL RESERVE", 300.0, 60.0, limits(MAX_FIT_SIZE, 10.0));
        assert_eq!(fit(&huge, &HeuristicMeasurer), fit(&capped, &HeuristicMeasurer));

        let blank = FitRequest::new("  ", 300.0, 60.0, limits(f32::INFINITY, 10.0));
        assert_eq!(fit(&blank, &HeuristicMeasurer), MAX_FIT_SIZE);
    }

    #[test]
    fn inverted_limits_return_min() {
        let req = FitRequest::new("text", 10.0, 10.0, limits(8.0, 12.0));
        assert_eq!(fit(&req, &HeuristicMeasurer), 12.0);
    }

    #[test]
    fn wrapping_breaks_long_words() {
        let font = FontSpec {
            family: None,
            weight: FontWeight::NORMAL,
            size: 10.0,
        };
        // 6px per char; 30px box holds 5 chars.
        let lines = wrap("abcdefghij kl", &font, 30.0, &HeuristicMeasurer);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn layer_font_size_caps_max() {
        let layer = Layer::text("product-name-1", "Name", "VODKA").with_style(Style {
            width: Some(300.0),
            max_height: Some(60.0),
            font_size: Some(36.0),
            ..Default::default()
        });
        let req = FitRequest::for_layer(&layer, AutoFitLimits::default()).unwrap();
        assert_eq!(req.limits, limits(36.0, 10.0));
        assert_eq!(req.height, 60.0);
        assert_eq!(fit(&req, &HeuristicMeasurer), 36.0);

        let shape = Layer::shape("ribbon-bg", "Ribbon");
        assert!(FitRequest::for_layer(&shape, AutoFitLimits::default()).is_none());
    }

    #[test]
    fn cache_memoizes_on_inputs() {
        let mut cache = FitCache::new();
        let a = FitRequest::new("Tasting notes here", 100.0, 40.0, limits(40.0, 10.0));
        let first = cache.fit(&a, &HeuristicMeasurer);
        assert_eq!(cache.fit(&a, &HeuristicMeasurer), first);
        assert_eq!(cache.len(), 1);

        let bold = FitRequest {
            weight: FontWeight::BOLD,
            ..a
        };
        cache.fit(&bold, &HeuristicMeasurer);
        assert_eq!(cache.len(), 2);
    }
}
