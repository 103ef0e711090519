//! Hit testing: point → handle, layer, or divider.
//!
//! Walks the layer set front-to-back (reverse paint order). Handles of the
//! selected layer win over everything; the band divider only catches points
//! no layer claims.

use crate::geometry::{Handle, ViewMode};
use tag_core::autofit::FIT_LINE_HEIGHT;
use tag_core::id::LayerId;
use tag_core::model::{CanvasConfig, Layer, LayerRole, Rect};
use tag_core::store::LayerSet;

/// Half the side of a square resize handle.
pub const HANDLE_RADIUS: f32 = 6.0;

/// Vertical slack either side of the split line.
pub const DIVIDER_SLACK: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    Handle(LayerId, Handle),
    Body(LayerId),
    SplitDivider,
    /// Empty canvas.
    Canvas,
}

/// On-canvas rectangle of a layer.
///
/// Missing dimensions fall back to max width/height; a text layer without a
/// height gets one line at its font size. No width means no rectangle.
pub fn layer_rect(layer: &Layer) -> Option<Rect> {
    let style = &layer.style;
    let width = style.width.or(style.max_width)?;
    let height = style
        .height
        .or(style.max_height)
        .or(style.font_size.map(|s| s * FIT_LINE_HEIGHT))?;
    Some(Rect {
        x: layer.x,
        y: layer.y,
        width,
        height,
    })
}

fn handle_at(rect: &Rect, px: f32, py: f32) -> Option<Handle> {
    Handle::ALL.into_iter().find(|h| {
        let (hx, hy) = h.anchor(rect);
        (px - hx).abs() <= HANDLE_RADIUS && (py - hy).abs() <= HANDLE_RADIUS
    })
}

/// Resolve what sits under (px, py).
pub fn hit_test(
    layers: &LayerSet,
    canvas: &CanvasConfig,
    selected: Option<LayerId>,
    mode: ViewMode,
    px: f32,
    py: f32,
) -> HitTarget {
    if let Some(layer) = selected.and_then(|id| layers.get(id))
        && mode.can_resize(layer)
        && let Some(rect) = layer_rect(layer)
        && let Some(handle) = handle_at(&rect, px, py)
    {
        return HitTarget::Handle(layer.id, handle);
    }

    let body = layers
        .paint_order()
        .into_iter()
        .rev()
        .filter(|l| !l.is_hidden() && l.role != LayerRole::Border)
        .find(|l| layer_rect(l).is_some_and(|r| r.contains(px, py)));
    if let Some(layer) = body {
        return HitTarget::Body(layer.id);
    }

    if (py - canvas.split_y()).abs() <= DIVIDER_SLACK && px >= 0.0 && px <= canvas.width {
        return HitTarget::SplitDivider;
    }
    HitTarget::Canvas
}
