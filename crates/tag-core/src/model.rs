//! Core data model for label designs.
//!
//! A design is an ordered set of positioned [`Layer`]s on a fixed-size
//! canvas. Sequence order is insertion order; stacking comes from
//! `style.z_index` (see [`crate::store::LayerSet::paint_order`]). Styles are
//! sparse: an absent attribute means "renderer default".

use crate::id::LayerId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], serialized as a hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn from_rgb(hex: u32) -> Self {
        Self::rgba(
            ((hex >> 16) & 0xFF) as f32 / 255.0,
            ((hex >> 8) & 0xFF) as f32 / 255.0,
            (hex & 0xFF) as f32 / 255.0,
            1.0,
        )
    }

    /// Parse a CSS color: `#RGB`, `#RRGGBB`, `#RRGGBBAA`, or one of
    /// `transparent`, `white`, `black`.
    pub fn parse(css: &str) -> Option<Self> {
        match css.trim().to_ascii_lowercase().as_str() {
            "transparent" => return Some(Self::TRANSPARENT),
            "white" => return Some(Self::rgba(1.0, 1.0, 1.0, 1.0)),
            "black" => return Some(Self::rgba(0.0, 0.0, 0.0, 1.0)),
            _ => {}
        }
        let hex = css.trim().strip_prefix('#')?;
        let bytes = hex.as_bytes();
        let channel = |hi: u8, lo: u8| -> Option<f32> {
            Some((hex_val(hi)? << 4 | hex_val(lo)?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                1.0,
            )),
            8 => Some(Self::rgba(
                channel(bytes[0], bytes[1])?,
                channel(bytes[2], bytes[3])?,
                channel(bytes[4], bytes[5])?,
                channel(bytes[6], bytes[7])?,
            )),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    }
}

// ─── Styling ─────────────────────────────────────────────────────────────

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    None,
    LineThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    None,
    Capitalize,
    Uppercase,
    Lowercase,
}

/// Layer visibility. `Hidden` serializes as CSS `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    Block,
    Flex,
    #[serde(rename = "none")]
    Hidden,
}

/// Numeric font weight (100..900). Accepts CSS keywords when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u16),
            Keyword(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(FontWeight(n)),
            Raw::Keyword(k) => match k.as_str() {
                "normal" => Ok(FontWeight::NORMAL),
                "bold" => Ok(FontWeight::BOLD),
                "bolder" => Ok(FontWeight(800)),
                "lighter" => Ok(FontWeight(300)),
                other => other
                    .parse::<u16>()
                    .map(FontWeight)
                    .map_err(|_| serde::de::Error::custom(format!("invalid font weight `{k}`"))),
            },
        }
    }
}

/// Sparse visual attributes of a layer. `None` means renderer default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<TextTransform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    /// Decorative clip path (CSS `polygon(...)`), e.g. the ribbon notch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer_events: Option<String>,
}

/// Merge `src` into `dst` key by key, overwriting only present attributes.
pub fn merge_style(dst: &mut Style, src: &Style) {
    macro_rules! take {
        ($($field:ident),* $(,)?) => {
            $(
                if src.$field.is_some() {
                    dst.$field = src.$field.clone();
                }
            )*
        };
    }
    take!(
        color,
        background_color,
        font_size,
        font_weight,
        font_family,
        font_style,
        text_align,
        text_decoration,
        text_transform,
        border_radius,
        border,
        width,
        height,
        max_width,
        max_height,
        opacity,
        padding,
        display,
        letter_spacing,
        line_height,
        clip_path,
        z_index,
        box_shadow,
        pointer_events,
    );
}

// ─── Layers ──────────────────────────────────────────────────────────────

/// Default stacking value when `style.z_index` is absent.
pub const DEFAULT_Z_INDEX: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Text,
    Shape,
    Image,
    Group,
}

/// Rendering/behavior variant, fixed when the layer is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerRole {
    #[default]
    Standard,
    /// Optional, toggleable overlay element.
    Badge,
    /// Header with decorative rules either side of the text.
    Header,
    /// Circular score badge (a `Badge` with custom rendering).
    ScoreBadge,
    /// Decorative frame drawn by the canvas itself; never hit or dragged.
    Border,
}

impl LayerRole {
    /// Derive a role from a legacy identifier.
    ///
    /// Only used when a layer is created or a stored layer without a role is
    /// loaded; never consulted at render time.
    pub fn infer(id: &str) -> Self {
        match id {
            "badge-points-group" => LayerRole::ScoreBadge,
            "header-combined" => LayerRole::Header,
            "inner-border" => LayerRole::Border,
            _ if id.starts_with(crate::id::BADGE_PREFIX) => LayerRole::Badge,
            _ => LayerRole::Standard,
        }
    }

    pub fn is_badge(self) -> bool {
        matches!(self, LayerRole::Badge | LayerRole::ScoreBadge)
    }
}

/// A positioned visual element on the label canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredLayer")]
pub struct Layer {
    pub id: LayerId,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub role: LayerRole,
    /// Human-readable label for layer lists.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub x: f32,
    pub y: f32,
    pub style: Style,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

/// On-disk shape of a layer; older snapshots carry no `role`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLayer {
    id: LayerId,
    #[serde(rename = "type")]
    kind: LayerKind,
    #[serde(default)]
    role: Option<LayerRole>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    style: Style,
    #[serde(default)]
    locked: bool,
}

impl From<StoredLayer> for Layer {
    fn from(s: StoredLayer) -> Self {
        Self {
            role: s.role.unwrap_or_else(|| LayerRole::infer(s.id.as_str())),
            id: s.id,
            kind: s.kind,
            name: s.name,
            content: s.content,
            x: s.x,
            y: s.y,
            style: s.style,
            locked: s.locked,
        }
    }
}

impl Layer {
    /// Create a layer at the origin. The role is inferred from `id`.
    pub fn new(id: &str, kind: LayerKind, name: &str) -> Self {
        Self {
            id: LayerId::intern(id),
            kind,
            role: LayerRole::infer(id),
            name: name.to_string(),
            content: None,
            x: 0.0,
            y: 0.0,
            style: Style::default(),
            locked: false,
        }
    }

    pub fn text(id: &str, name: &str, content: &str) -> Self {
        Self::new(id, LayerKind::Text, name).with_content(content)
    }

    pub fn shape(id: &str, name: &str) -> Self {
        Self::new(id, LayerKind::Shape, name)
    }

    #[must_use]
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }

    #[must_use]
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: LayerRole) -> Self {
        self.role = role;
        self
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn is_hidden(&self) -> bool {
        self.style.display == Some(Display::Hidden)
    }

    pub fn z_index(&self) -> i32 {
        self.style.z_index.unwrap_or(DEFAULT_Z_INDEX)
    }

    /// Width used for centering estimates: explicit width, then max width.
    pub fn estimated_width(&self) -> f32 {
        self.style.width.or(self.style.max_width).unwrap_or(0.0)
    }

    /// Apply a partial update: style merges key by key, every other
    /// present field replaces the old value.
    pub fn apply(&mut self, patch: &LayerPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(content) = &patch.content {
            self.content = Some(content.clone());
        }
        if let Some((x, y)) = patch.position {
            self.x = x;
            self.y = y;
        }
        if let Some(style) = &patch.style {
            merge_style(&mut self.style, style);
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
    }
}

/// A partial layer update. The `id` is never patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<LayerKind>,
    pub content: Option<String>,
    pub position: Option<(f32, f32)>,
    pub style: Option<Style>,
    pub locked: Option<bool>,
}

impl LayerPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn position(x: f32, y: f32) -> Self {
        Self {
            position: Some((x, y)),
            ..Default::default()
        }
    }

    pub fn style(style: Style) -> Self {
        Self {
            style: Some(style),
            ..Default::default()
        }
    }

    pub fn display(display: Display) -> Self {
        Self::style(Style {
            display: Some(display),
            ..Default::default()
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────

/// Physical label dimensions and the two background bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    pub background_top: Color,
    pub background_bottom: Color,
    /// Fraction of the height covered by the top band.
    pub split_ratio: f32,
}

impl CanvasConfig {
    pub const SPLIT_MIN: f32 = 0.1;
    pub const SPLIT_MAX: f32 = 0.9;

    /// Set the split ratio from an interactive gesture; clamped so neither
    /// band collapses.
    pub fn set_split_ratio_clamped(&mut self, ratio: f32) {
        self.split_ratio = clamp_split(ratio);
    }

    /// Y coordinate of the boundary between the two bands.
    pub fn split_y(&self) -> f32 {
        self.height * self.split_ratio
    }

    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }

    pub fn apply(&mut self, patch: &CanvasPatch) {
        if let Some(w) = patch.width {
            self.width = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        if let Some(c) = patch.background_top {
            self.background_top = c;
        }
        if let Some(c) = patch.background_bottom {
            self.background_bottom = c;
        }
        if let Some(r) = patch.split_ratio {
            self.set_split_ratio_clamped(r);
        }
    }
}

/// Clamp a split ratio into the interactive range. NaN maps to the minimum.
pub fn clamp_split(ratio: f32) -> f32 {
    if ratio.is_nan() {
        return CanvasConfig::SPLIT_MIN;
    }
    ratio.clamp(CanvasConfig::SPLIT_MIN, CanvasConfig::SPLIT_MAX)
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,
            background_top: Color::from_rgb(0xF5F0E1),
            background_bottom: Color::from_rgb(0x7B1E36),
            split_ratio: 0.6,
        }
    }
}

/// Partial canvas update from the design panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasPatch {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub background_top: Option<Color>,
    pub background_bottom: Option<Color>,
    pub split_ratio: Option<f32>,
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}
