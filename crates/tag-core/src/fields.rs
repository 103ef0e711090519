//! System fields and the two mappings that route imported data into layers.
//!
//! ```text
//! record[ columns[ bindings[layer.id] ?? layer.id ] ] ──► layer.content
//! ```
//!
//! The [`BindingMap`] associates layers with logical [`SystemField`]s; the
//! [`ColumnMapping`] associates field keys with column headers of the
//! imported table.

use crate::id::LayerId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Fixed vocabulary of logical data slots a layer can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SystemField {
    #[serde(rename = "product-name-1")]
    ProductName,
    #[serde(rename = "product-name-2")]
    Subtitle,
    #[serde(rename = "active-price")]
    ActivePrice,
    #[serde(rename = "was-price")]
    WasPrice,
    #[serde(rename = "size-label")]
    Size,
    #[serde(rename = "category-label")]
    Category,
    #[serde(rename = "tasting-notes")]
    TastingNotes,
    #[serde(rename = "badge-points-group")]
    Score,
}

impl SystemField {
    pub const ALL: [SystemField; 8] = [
        SystemField::ProductName,
        SystemField::Subtitle,
        SystemField::ActivePrice,
        SystemField::WasPrice,
        SystemField::Size,
        SystemField::Category,
        SystemField::TastingNotes,
        SystemField::Score,
    ];

    /// Fields bound by the canonical default map (the score badge is opt-in).
    pub const STANDARD: [SystemField; 7] = [
        SystemField::ProductName,
        SystemField::Subtitle,
        SystemField::ActivePrice,
        SystemField::Category,
        SystemField::WasPrice,
        SystemField::Size,
        SystemField::TastingNotes,
    ];

    /// The key string; doubles as the id of the layer that carries this
    /// field in the built-in templates.
    pub fn key(self) -> &'static str {
        match self {
            SystemField::ProductName => "product-name-1",
            SystemField::Subtitle => "product-name-2",
            SystemField::ActivePrice => "active-price",
            SystemField::WasPrice => "was-price",
            SystemField::Size => "size-label",
            SystemField::Category => "category-label",
            SystemField::TastingNotes => "tasting-notes",
            SystemField::Score => "badge-points-group",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SystemField::ProductName => "Product Name",
            SystemField::Subtitle => "Brand / Subtitle",
            SystemField::ActivePrice => "Price (Active)",
            SystemField::WasPrice => "Was Price",
            SystemField::Size => "Size / Format",
            SystemField::Category => "Category / Header",
            SystemField::TastingNotes => "Description / Notes",
            SystemField::Score => "Points Score",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// The layer id this field falls back to when nothing is bound.
    pub fn default_layer(self) -> LayerId {
        LayerId::intern(self.key())
    }
}

// ─── Binding map ─────────────────────────────────────────────────────────

/// Layer → system field. A layer without an entry is static/manual.
///
/// Entries may outlive their layers; an orphaned binding is ignored by
/// every resolution function.
///
/// Stored maps may carry `""` for a cleared binding, or keys this build
/// does not know; both read back as "no binding".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BindingMap(BTreeMap<LayerId, SystemField>);

impl<'de> Deserialize<'de> for BindingMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<LayerId, Option<String>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(layer, key)| {
                let key = key.unwrap_or_default();
                let field = SystemField::from_key(&key);
                if field.is_none() && !key.is_empty() {
                    log::debug!("dropping unknown binding `{key}` on {layer}");
                }
                Some((layer, field?))
            })
            .collect())
    }
}

impl BindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical map binding each standard field to the layer of the same id.
    pub fn canonical() -> Self {
        Self(
            SystemField::STANDARD
                .into_iter()
                .map(|f| (f.default_layer(), f))
                .collect(),
        )
    }

    /// Set (`Some`) or clear (`None`) the binding of `layer`.
    pub fn bind(&mut self, layer: LayerId, field: Option<SystemField>) {
        match field {
            Some(f) => {
                self.0.insert(layer, f);
            }
            None => {
                self.0.remove(&layer);
            }
        }
    }

    pub fn get(&self, layer: LayerId) -> Option<SystemField> {
        self.0.get(&layer).copied()
    }

    /// Key used to look up a column for `layer`: its binding, else its id.
    pub fn effective_key(&self, layer: LayerId) -> &str {
        match self.get(layer) {
            Some(f) => f.key(),
            None => layer.as_str(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, SystemField)> + '_ {
        self.0.iter().map(|(id, f)| (*id, *f))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(LayerId, SystemField)> for BindingMap {
    fn from_iter<I: IntoIterator<Item = (LayerId, SystemField)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ─── Column mapping ──────────────────────────────────────────────────────

/// Field key → column header of the imported table.
///
/// Keyed by string rather than [`SystemField`] because a layer without a
/// binding is looked up by its own id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<String, String>);

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `key` to `header`; an empty header removes the entry.
    pub fn set(&mut self, key: &str, header: &str) {
        if header.is_empty() {
            self.0.remove(key);
        } else {
            self.0.insert(key.to_string(), header.to_string());
        }
    }

    pub fn set_field(&mut self, field: SystemField, header: &str) {
        self.set(field.key(), header);
    }

    pub fn header_for(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
