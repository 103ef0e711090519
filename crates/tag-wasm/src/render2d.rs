//! Canvas2D preview renderer.
//!
//! Paints the two background bands, then every visible layer in paint
//! order. Images and custom group artwork are drawn by the page on top;
//! here they get a placeholder frame so selection stays visible.

use crate::measure::css_font;
use std::collections::HashMap;
use tag_core::autofit::FontSpec;
use tag_core::id::LayerId;
use tag_core::model::{CanvasConfig, FontWeight, Layer, LayerKind, LayerRole, TextAlign};
use tag_core::store::LayerSet;
use tag_editor::geometry::Handle;
use tag_editor::hit::{HANDLE_RADIUS, layer_rect};
use web_sys::CanvasRenderingContext2d;

const SELECTION: &str = "#2F80ED";
const SNAP_GUIDE: &str = "#EB5757";
const PLACEHOLDER: &str = "rgba(0, 0, 0, 0.25)";

pub struct Frame<'a> {
    pub layers: &'a LayerSet,
    pub config: &'a CanvasConfig,
    pub sizes: &'a HashMap<LayerId, f32>,
    pub selected: Option<LayerId>,
    pub snapped: bool,
}

pub fn render_label(ctx: &CanvasRenderingContext2d, frame: &Frame<'_>) {
    let config = frame.config;
    let (w, h) = (config.width as f64, config.height as f64);
    let split = config.split_y() as f64;
    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.set_fill_style_str(&config.background_top.to_hex());
    ctx.fill_rect(0.0, 0.0, w, split);
    ctx.set_fill_style_str(&config.background_bottom.to_hex());
    ctx.fill_rect(0.0, split, w, h - split);

    for layer in frame.layers.paint_order() {
        if layer.is_hidden() {
            continue;
        }
        ctx.save();
        ctx.set_global_alpha(layer.style.opacity.unwrap_or(1.0) as f64);
        match layer.kind {
            LayerKind::Text => draw_text(ctx, layer, frame.sizes.get(&layer.id).copied()),
            LayerKind::Shape => draw_shape(ctx, layer),
            LayerKind::Image | LayerKind::Group => draw_placeholder(ctx, layer),
        }
        ctx.restore();
    }

    if let Some(layer) = frame.selected.and_then(|id| frame.layers.get(id)) {
        draw_selection(ctx, layer);
    }
    if frame.snapped {
        let cx = config.center_x() as f64;
        ctx.set_stroke_style_str(SNAP_GUIDE);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(cx, 0.0);
        ctx.line_to(cx, h);
        ctx.stroke();
    }
}

fn draw_shape(ctx: &CanvasRenderingContext2d, layer: &Layer) {
    let Some(rect) = layer_rect(layer) else {
        return;
    };
    if let Some(fill) = layer.style.background_color {
        ctx.set_fill_style_str(&fill.to_hex());
        ctx.fill_rect(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64);
    }
    // The decorative border is a frame, not a fill.
    if layer.role == LayerRole::Border {
        let stroke = layer.style.color.map_or_else(|| "#D4AF37".to_string(), |c| c.to_hex());
        ctx.set_stroke_style_str(&stroke);
        ctx.set_line_width(2.0);
        ctx.stroke_rect(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64);
    }
}

fn draw_placeholder(ctx: &CanvasRenderingContext2d, layer: &Layer) {
    let Some(rect) = layer_rect(layer) else {
        return;
    };
    ctx.set_stroke_style_str(PLACEHOLDER);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64);
}

fn draw_text(ctx: &CanvasRenderingContext2d, layer: &Layer, fitted: Option<f32>) {
    let style = &layer.style;
    let size = fitted.or(style.font_size).unwrap_or(16.0);
    let font = FontSpec {
        family: style.font_family.as_deref(),
        weight: style.font_weight.unwrap_or(FontWeight::NORMAL),
        size,
    };
    ctx.set_font(&css_font(&font));
    let fill = style.color.map_or_else(|| "#000000".to_string(), |c| c.to_hex());
    ctx.set_fill_style_str(&fill);
    ctx.set_text_baseline("top");

    let width = style.width.or(style.max_width).unwrap_or(0.0);
    let (align, x) = match style.text_align.unwrap_or(TextAlign::Left) {
        TextAlign::Center => ("center", layer.x + width / 2.0),
        TextAlign::Right => ("right", layer.x + width),
        TextAlign::Left => ("left", layer.x),
    };
    ctx.set_text_align(align);

    let line_height = size * style.line_height.unwrap_or(tag_core::autofit::FIT_LINE_HEIGHT);
    for (i, line) in layer.content_str().lines().enumerate() {
        let y = layer.y + i as f32 * line_height;
        if let Err(e) = ctx.fill_text(line, x as f64, y as f64) {
            log::debug!("fillText failed for {}: {e:?}", layer.id);
        }
    }
}

fn draw_selection(ctx: &CanvasRenderingContext2d, layer: &Layer) {
    let Some(rect) = layer_rect(layer) else {
        return;
    };
    ctx.set_stroke_style_str(SELECTION);
    ctx.set_line_width(1.0);
    ctx.stroke_rect(rect.x as f64, rect.y as f64, rect.width as f64, rect.height as f64);
    ctx.set_fill_style_str("#FFFFFF");
    let side = (HANDLE_RADIUS * 2.0) as f64;
    for handle in Handle::ALL {
        let (hx, hy) = handle.anchor(&rect);
        let (x, y) = ((hx - HANDLE_RADIUS) as f64, (hy - HANDLE_RADIUS) as f64);
        ctx.fill_rect(x, y, side, side);
        ctx.stroke_rect(x, y, side, side);
    }
}
