//! Built-in label layouts.
//!
//! Both presets use the canonical layer ids, so the canonical binding map
//! and the savings ribbon work on them without configuration.

use crate::derive::{RIBBON_BG, RIBBON_TEXT};
use crate::model::{
    CanvasConfig, Color, Display, FontWeight, Layer, LayerKind, Style, TextAlign, TextDecoration,
    TextTransform,
};
use crate::store::LayerSet;
use serde::{Deserialize, Serialize};

const GOLD: u32 = 0xD4AF37;
const RED: u32 = 0xD32F2F;
const WHITE: u32 = 0xFFFFFF;

const CINZEL: &str = "Cinzel, serif";
const MONTSERRAT: &str = "Montserrat, sans-serif";
const OSWALD: &str = "Oswald, sans-serif";

const RIBBON_CLIP: &str = "polygon(0% 0%, 100% 0%, 95% 50%, 100% 100%, 0% 100%, 5% 50%)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Default,
    StaffPick,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Default, Preset::StaffPick];

    pub fn key(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::StaffPick => "staff-pick",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::Default => "Default Template",
            Preset::StaffPick => "Staff Pick Special",
        }
    }

    /// `reset` is accepted as an alias of the default layout.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "default" | "reset" => Some(Preset::Default),
            "staff-pick" => Some(Preset::StaffPick),
            _ => None,
        }
    }

    pub fn layers(self) -> LayerSet {
        match self {
            Preset::Default => default_layers().into_iter().collect(),
            Preset::StaffPick => staff_pick_layers().into_iter().collect(),
        }
    }

    pub fn config(self) -> CanvasConfig {
        CanvasConfig::default()
    }
}

fn typeset(width: f32, height: f32, color: u32, size: f32, weight: u16, family: &str) -> Style {
    Style {
        width: Some(width),
        height: Some(height),
        color: Some(Color::from_rgb(color)),
        font_size: Some(size),
        font_weight: Some(FontWeight(weight)),
        font_family: Some(family.to_string()),
        text_align: Some(TextAlign::Center),
        ..Default::default()
    }
}

fn text(id: &str, name: &str, content: &str, x: f32, y: f32, style: Style) -> Layer {
    Layer::text(id, name, content).at(x, y).with_style(style)
}

fn default_layers() -> Vec<Layer> {
    vec![
        Layer::shape("inner-border", "Inner Gold Border")
            .at(15.0, 15.0)
            .with_style(Style {
                width: Some(370.0),
                height: Some(570.0),
                background_color: Some(Color::TRANSPARENT),
                border: Some("2px solid #D4AF37".to_string()),
                z_index: Some(50),
                pointer_events: Some("none".to_string()),
                ..Default::default()
            }),
        Layer::new("header-combined", LayerKind::Group, "Smart Header")
            .with_content("STAFF PICK")
            .at(0.0, 35.0)
            .with_style(Style {
                letter_spacing: Some("2px".to_string()),
                display: Some(Display::Flex),
                ..typeset(400.0, 30.0, GOLD, 28.0, 700, CINZEL)
            }),
        text(
            "category-label",
            "Category",
            "SINGLE MALT SCOTCH",
            20.0,
            70.0,
            Style {
                letter_spacing: Some("1px".to_string()),
                text_transform: Some(TextTransform::Uppercase),
                ..typeset(360.0, 20.0, 0x666666, 12.0, 700, MONTSERRAT)
            },
        ),
        text(
            "product-name-1",
            "Brand Name",
            "W.L. WELLER",
            20.0,
            95.0,
            Style {
                line_height: Some(1.1),
                ..typeset(360.0, 60.0, 0x222222, 55.0, 700, CINZEL)
            },
        ),
        text(
            "product-name-2",
            "Varietal Name",
            "RESERVE",
            20.0,
            155.0,
            Style {
                line_height: Some(1.0),
                ..typeset(360.0, 40.0, 0x333333, 32.0, 600, CINZEL)
            },
        ),
        text(
            "size-label",
            "Size Label",
            "750ml",
            300.0,
            195.0,
            Style {
                text_align: Some(TextAlign::Right),
                ..typeset(80.0, 20.0, 0x555555, 14.0, 600, MONTSERRAT)
            },
        ),
        text(
            "was-price",
            "Was Price",
            "WAS $169.99",
            0.0,
            215.0,
            Style {
                text_decoration: Some(TextDecoration::LineThrough),
                ..typeset(400.0, 25.0, GOLD, 20.0, 600, MONTSERRAT)
            },
        ),
        text(
            "active-price",
            "Active Price",
            "$129.99",
            0.0,
            240.0,
            Style {
                letter_spacing: Some("-1px".to_string()),
                ..typeset(400.0, 90.0, 0x1A1A1A, 90.0, 700, OSWALD)
            },
        ),
        Layer::shape(RIBBON_BG, "Ribbon Background")
            .at(50.0, 338.0)
            .with_style(Style {
                width: Some(300.0),
                height: Some(45.0),
                background_color: Some(Color::from_rgb(GOLD)),
                display: Some(Display::Flex),
                clip_path: Some(RIBBON_CLIP.to_string()),
                z_index: Some(10),
                ..Default::default()
            }),
        text(
            RIBBON_TEXT,
            "Ribbon Text",
            "SAVE $40.00",
            50.0,
            345.0,
            Style {
                z_index: Some(11),
                display: Some(Display::Block),
                ..typeset(300.0, 30.0, 0x222222, 28.0, 700, OSWALD)
            },
        ),
        text(
            "tasting-notes",
            "Tasting Notes",
            "Rich Caramel • Toasted Oak\n• Vanilla Bean",
            135.0,
            425.0,
            Style {
                max_width: Some(250.0),
                line_height: Some(1.4),
                ..typeset(250.0, 60.0, WHITE, 16.0, 500, MONTSERRAT)
            },
        ),
        text(
            "footer-logo",
            "Footer Logo",
            "CORKED sale",
            0.0,
            540.0,
            typeset(400.0, 30.0, GOLD, 24.0, 700, CINZEL),
        ),
    ]
}

/// The default layout recolored red, with its own copy and a footer box.
fn staff_pick_layers() -> Vec<Layer> {
    let mut layers = default_layers();
    for layer in &mut layers {
        let content = match layer.id.as_str() {
            "category-label" => "OFFICIAL SELECTION",
            "product-name-1" => "STOLICHNAYA",
            "product-name-2" => "RUSSIAN VODKA",
            "was-price" => "WAS $29.99",
            "active-price" => "$18.99",
            RIBBON_TEXT => "SAVE $11.00",
            "tasting-notes" => "Tremendously smooth, great for mixing or serving on the rocks.",
            "footer-logo" => "CORKED SALE",
            _ => continue,
        };
        layer.content = Some(content.to_string());

        match layer.id.as_str() {
            "was-price" => layer.style.color = Some(Color::from_rgb(0x888888)),
            RIBBON_TEXT => layer.style.color = Some(Color::from_rgb(WHITE)),
            "tasting-notes" => {
                layer.x = 40.0;
                layer.style.width = Some(320.0);
                layer.style.max_width = Some(320.0);
                layer.style.font_size = Some(14.0);
            }
            "footer-logo" => {
                layer.name = "Footer Text".to_string();
                layer.x = 40.0;
                layer.y = 542.0;
                layer.style.width = Some(320.0);
                layer.style.color = Some(Color::from_rgb(WHITE));
                layer.style.z_index = Some(6);
            }
            _ => {}
        }
    }
    if let Some(ribbon) = layers.iter_mut().find(|l| l.id.as_str() == RIBBON_BG) {
        ribbon.style.background_color = Some(Color::from_rgb(RED));
    }

    let footer_bg = Layer::shape("footer-bg", "Footer Background")
        .at(40.0, 535.0)
        .with_style(Style {
            width: Some(320.0),
            height: Some(40.0),
            background_color: Some(Color::from_rgb(RED)),
            z_index: Some(5),
            ..Default::default()
        });
    let footer_at = layers.len().saturating_sub(1);
    layers.insert(footer_at, footer_bg);
    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::Recalculator;
    use crate::fields::{BindingMap, SystemField};
    use crate::id::LayerId;
    use crate::model::LayerRole;
    use pretty_assertions::assert_eq;

    fn ids(set: &LayerSet) -> Vec<&'static str> {
        set.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn default_layout_has_canonical_ids() {
        let set = Preset::Default.layers();
        assert_eq!(
            ids(&set),
            vec![
                "inner-border",
                "header-combined",
                "category-label",
                "product-name-1",
                "product-name-2",
                "size-label",
                "was-price",
                "active-price",
                "ribbon-bg",
                "ribbon-text",
                "tasting-notes",
                "footer-logo",
            ]
        );
        for field in SystemField::STANDARD {
            assert!(set.contains(field.default_layer()), "{field:?}");
        }
        let border = set.get(LayerId::intern("inner-border")).unwrap();
        assert_eq!(border.role, LayerRole::Border);
        let header = set.get(LayerId::intern("header-combined")).unwrap();
        assert_eq!(header.role, LayerRole::Header);
    }

    #[test]
    fn staff_pick_adds_footer_box_before_footer_text() {
        let set = Preset::StaffPick.layers();
        let names = ids(&set);
        assert_eq!(&names[names.len() - 2..], &["footer-bg", "footer-logo"]);
        let name = set.get(LayerId::intern("product-name-1")).unwrap();
        assert_eq!(name.content_str(), "STOLICHNAYA");
        let footer = set.get(LayerId::intern("footer-logo")).unwrap();
        assert_eq!((footer.x, footer.y, footer.z_index()), (40.0, 542.0, 6));
    }

    #[test]
    fn preset_ribbon_text_is_consistent_with_prices() {
        for preset in Preset::ALL {
            let set = preset.layers();
            let out = Recalculator::default().recalculate(&set, &BindingMap::canonical());
            assert_eq!(out, set, "{preset:?}");
        }
    }

    #[test]
    fn keys_roundtrip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_key(preset.key()), Some(preset));
        }
        assert_eq!(Preset::from_key("reset"), Some(Preset::Default));
        assert_eq!(Preset::from_key("custom"), None);
    }
}
