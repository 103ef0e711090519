//! Optional overlay badges: built-in toggles and uploaded images.

use crate::id::LayerId;
use crate::model::{Layer, LayerKind, LayerRole, Style};
use crate::store::LayerSet;
use serde::{Deserialize, Serialize};

/// Stacking value for badges; above every preset layer.
pub const BADGE_Z_INDEX: i32 = 100;

const CUSTOM_BADGE_PREFIX: &str = "custom-badge";
const CUSTOM_BADGE_SIZE: f32 = 80.0;

/// Built-in badges that can be switched on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Badge {
    GlutenFree,
    Organic,
    SugarFree,
    StaffPick,
    Points,
}

impl Badge {
    pub const ALL: [Badge; 5] = [
        Badge::GlutenFree,
        Badge::Organic,
        Badge::SugarFree,
        Badge::StaffPick,
        Badge::Points,
    ];

    pub fn id(self) -> LayerId {
        LayerId::intern(match self {
            Badge::GlutenFree => "badge-gluten-free",
            Badge::Organic => "badge-organic",
            Badge::SugarFree => "badge-sugar-free",
            Badge::StaffPick => "badge-staff-pick",
            Badge::Points => "badge-points-group",
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Badge::GlutenFree => "Gluten Free",
            Badge::Organic => "Organic",
            Badge::SugarFree => "Sugar Free",
            Badge::StaffPick => "Staff Pick",
            Badge::Points => "Points Score",
        }
    }

    pub fn from_id(id: LayerId) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.id() == id)
    }

    /// Fresh layer for this badge, stacked down the right edge.
    pub fn layer(self) -> Layer {
        let slot = Self::ALL.iter().position(|b| *b == self).unwrap_or(0) as f32;
        let (kind, content) = match self {
            Badge::Points => (LayerKind::Group, Some("94")),
            _ => (LayerKind::Shape, None),
        };
        let mut layer = Layer::new(self.id().as_str(), kind, self.label())
            .at(310.0, 90.0 + slot * 80.0)
            .with_style(Style {
                width: Some(70.0),
                height: Some(70.0),
                z_index: Some(BADGE_Z_INDEX),
                ..Default::default()
            });
        if let Some(text) = content {
            layer = layer.with_content(text);
        }
        layer
    }

    pub fn is_active(self, layers: &LayerSet) -> bool {
        layers.contains(self.id())
    }
}

/// Add the badge if absent, remove it if present.
pub fn toggle_badge(layers: &LayerSet, badge: Badge) -> LayerSet {
    let mut next = layers.clone();
    if next.remove(badge.id()).is_none() {
        // Absent, so the insert cannot collide.
        let _ = next.insert(badge.layer());
        log::debug!("badge {} on", badge.id());
    } else {
        log::debug!("badge {} off", badge.id());
    }
    next
}

/// An image layer for an uploaded badge, with a generated unique id.
pub fn custom_badge_layer(image: &str) -> Layer {
    let id = LayerId::with_prefix(CUSTOM_BADGE_PREFIX);
    Layer::new(id.as_str(), LayerKind::Image, "Custom Badge")
        .with_role(LayerRole::Badge)
        .with_content(image)
        .at(50.0, 50.0)
        .with_style(Style {
            width: Some(CUSTOM_BADGE_SIZE),
            height: Some(CUSTOM_BADGE_SIZE),
            z_index: Some(BADGE_Z_INDEX),
            ..Default::default()
        })
}

/// Uploaded badge images (encoded payloads), in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadgeLibrary {
    images: Vec<String>,
}

impl BadgeLibrary {
    pub fn upload(&mut self, image: impl Into<String>) -> usize {
        self.images.push(image.into());
        self.images.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.images.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
