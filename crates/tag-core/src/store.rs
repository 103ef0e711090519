//! The layer store: an ordered, id-unique collection of layers.
//!
//! Sequence order is insertion order and drives the layer list (shown
//! reversed). Stacking is separate: paint order sorts by effective z-index,
//! ties broken by sequence position. Z-order operations only touch
//! `style.z_index`; [`LayerSet::move_to`] is the one operation that changes
//! sequence position.

use crate::error::LayerError;
use crate::id::LayerId;
use crate::model::{Layer, LayerPatch, Style};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Layer>", into = "Vec<Layer>")]
pub struct LayerSet {
    layers: Vec<Layer>,
    /// Index from LayerId → position in `layers`.
    index: HashMap<LayerId, usize>,
}

impl PartialEq for LayerSet {
    fn eq(&self, other: &Self) -> bool {
        self.layers == other.layers
    }
}

impl TryFrom<Vec<Layer>> for LayerSet {
    type Error = LayerError;

    fn try_from(layers: Vec<Layer>) -> Result<Self, Self::Error> {
        Self::from_layers(layers)
    }
}

impl From<LayerSet> for Vec<Layer> {
    fn from(set: LayerSet) -> Self {
        set.layers
    }
}

impl LayerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from layers in sequence order, rejecting duplicate ids.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self, LayerError> {
        let mut set = Self::new();
        for layer in layers {
            set.insert(layer)?;
        }
        Ok(set)
    }

    /// Append a layer. Fails if the id is already present.
    pub fn insert(&mut self, layer: Layer) -> Result<(), LayerError> {
        if self.index.contains_key(&layer.id) {
            return Err(LayerError::DuplicateId(layer.id));
        }
        self.index.insert(layer.id, self.layers.len());
        self.layers.push(layer);
        Ok(())
    }

    /// Merge `patch` into the layer `id` (style key by key, other fields
    /// replaced). Other layers are never touched.
    pub fn update(&mut self, id: LayerId, patch: &LayerPatch) -> Result<(), LayerError> {
        let layer = self.get_mut(id).ok_or(LayerError::NotFound(id))?;
        layer.apply(patch);
        Ok(())
    }

    /// Remove a layer. Bindings pointing at it are left to go stale.
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let pos = self.index.remove(&id)?;
        let removed = self.layers.remove(pos);
        self.rebuild_index();
        Some(removed)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.index.get(&id).map(|&i| &self.layers[i])
    }

    pub(crate) fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.index.get(&id).copied().map(|i| &mut self.layers[i])
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Sequence position of a layer.
    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Layers in sequence (insertion) order.
    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.layers.iter()
    }

    /// Layers in layer-list order: most recently created first.
    pub fn display_order(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().rev()
    }

    /// Layers back-to-front: by z-index, ties by sequence position.
    pub fn paint_order(&self) -> Vec<&Layer> {
        let mut order: Vec<&Layer> = self.layers.iter().collect();
        // Stable sort keeps sequence order within equal z.
        order.sort_by_key(|l| l.z_index());
        order
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    // ─── Stacking ────────────────────────────────────────────────────────

    pub fn set_z_index(&mut self, id: LayerId, z: i32) -> Result<(), LayerError> {
        self.update(
            id,
            &LayerPatch::style(Style {
                z_index: Some(z),
                ..Default::default()
            }),
        )
    }

    /// Raise a layer above everything else. Returns true if stacking changed.
    pub fn bring_to_front(&mut self, id: LayerId) -> bool {
        let order = self.paint_order();
        match order.last() {
            Some(top) if top.id == id => false,
            Some(top) => {
                let z = top.z_index() + 1;
                self.set_z_index(id, z).is_ok()
            }
            None => false,
        }
    }

    /// Lower a layer beneath everything else. Returns true if stacking changed.
    pub fn send_to_back(&mut self, id: LayerId) -> bool {
        let order = self.paint_order();
        match order.first() {
            Some(bottom) if bottom.id == id => false,
            Some(bottom) => {
                let z = bottom.z_index() - 1;
                self.set_z_index(id, z).is_ok()
            }
            None => false,
        }
    }

    /// Move one step up in paint order. Returns true if stacking changed.
    pub fn bring_forward(&mut self, id: LayerId) -> bool {
        self.step(id, true)
    }

    /// Move one step down in paint order. Returns true if stacking changed.
    pub fn send_backward(&mut self, id: LayerId) -> bool {
        self.step(id, false)
    }

    fn step(&mut self, id: LayerId, forward: bool) -> bool {
        let order: Vec<(LayerId, i32)> = self
            .paint_order()
            .into_iter()
            .map(|l| (l.id, l.z_index()))
            .collect();
        let Some(pos) = order.iter().position(|(lid, _)| *lid == id) else {
            return false;
        };
        let neighbor = if forward {
            order.get(pos + 1)
        } else {
            pos.checked_sub(1).and_then(|p| order.get(p))
        };
        let Some(&(other, other_z)) = neighbor else {
            return false;
        };
        let own_z = order[pos].1;
        if own_z == other_z {
            // Tied: the sequence tiebreak put them in this order, so nudge past.
            let z = if forward { other_z + 1 } else { other_z - 1 };
            return self.set_z_index(id, z).is_ok();
        }
        self.set_z_index(id, other_z).is_ok() && self.set_z_index(other, own_z).is_ok()
    }

    /// Explicitly move a layer to sequence position `to` (clamped).
    /// Returns true if the sequence changed.
    pub fn move_to(&mut self, id: LayerId, to: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let to = to.min(self.layers.len().saturating_sub(1));
        if from == to {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        self.rebuild_index();
        true
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, layer) in self.layers.iter().enumerate() {
            self.index.insert(layer.id, i);
        }
    }
}

/// Collects layers in order, keeping the first of any duplicate ids.
impl FromIterator<Layer> for LayerSet {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        let mut set = Self::new();
        for layer in iter {
            if let Err(e) = set.insert(layer) {
                log::warn!("{e}; later copy dropped");
            }
        }
        set
    }
}

impl<'a> IntoIterator for &'a LayerSet {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LayerKind;
    use pretty_assertions::assert_eq;

    fn sized(id: &str, x: f32, y: f32, w: f32, h: f32) -> Layer {
        Layer::new(id, LayerKind::Shape, id).at(x, y).with_style(Style {
            width: Some(w),
            height: Some(h),
            ..Default::default()
        })
    }

    fn ids(layers: Vec<&Layer>) -> Vec<&'static str> {
        layers.into_iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut set = LayerSet::new();
        set.insert(sized("a", 0.0, 0.0, 10.0, 10.0)).unwrap();
        let err = set.insert(sized("a", 5.0, 5.0, 10.0, 10.0)).unwrap_err();
        assert_eq!(err, LayerError::DuplicateId(LayerId::intern("a")));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(LayerId::intern("a")).unwrap().x, 0.0);
    }

    #[test]
    fn update_missing_layer_leaves_others_alone() {
        let mut set = LayerSet::from_layers(vec![sized("a", 1.0, 2.0, 3.0, 4.0)]).unwrap();
        let before = set.clone();
        let err = set
            .update(LayerId::intern("ghost"), &LayerPatch::content("x"))
            .unwrap_err();
        assert_eq!(err, LayerError::NotFound(LayerId::intern("ghost")));
        assert_eq!(set, before);
    }

    #[test]
    fn remove_reindexes() {
        let mut set = LayerSet::from_layers(vec![
            sized("a", 0.0, 0.0, 1.0, 1.0),
            sized("b", 0.0, 0.0, 1.0, 1.0),
            sized("c", 0.0, 0.0, 1.0, 1.0),
        ])
        .unwrap();
        assert!(set.remove(LayerId::intern("a")).is_some());
        assert_eq!(set.position(LayerId::intern("c")), Some(1));
        assert!(set.remove(LayerId::intern("a")).is_none());
    }

    #[test]
    fn display_order_is_reverse_of_creation() {
        let set = LayerSet::from_layers(vec![
            sized("first", 0.0, 0.0, 1.0, 1.0),
            sized("second", 0.0, 0.0, 1.0, 1.0),
        ])
        .unwrap();
        let listed: Vec<_> = set.display_order().map(|l| l.id.as_str()).collect();
        assert_eq!(listed, vec!["second", "first"]);
    }

    #[test]
    fn z_order_changes_stacking_not_sequence() {
        let mut set = LayerSet::from_layers(vec![
            sized("a", 0.0, 0.0, 1.0, 1.0),
            sized("b", 0.0, 0.0, 1.0, 1.0),
            sized("c", 0.0, 0.0, 1.0, 1.0),
        ])
        .unwrap();

        assert!(set.bring_to_front(LayerId::intern("a")));
        assert_eq!(ids(set.paint_order()), vec!["b", "c", "a"]);
        assert_eq!(set.position(LayerId::intern("a")), Some(0));

        assert!(set.send_backward(LayerId::intern("a")));
        assert_eq!(ids(set.paint_order()), vec!["b", "a", "c"]);

        assert!(set.send_to_back(LayerId::intern("c")));
        assert_eq!(ids(set.paint_order()), vec!["c", "b", "a"]);
        assert!(!set.send_to_back(LayerId::intern("c")));
    }

    #[test]
    fn move_to_changes_sequence() {
        let mut set = LayerSet::from_layers(vec![
            sized("a", 0.0, 0.0, 1.0, 1.0),
            sized("b", 0.0, 0.0, 1.0, 1.0),
            sized("c", 0.0, 0.0, 1.0, 1.0),
        ])
        .unwrap();
        assert!(set.move_to(LayerId::intern("c"), 0));
        let seq: Vec<_> = set.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(seq, vec!["c", "a", "b"]);
        assert_eq!(set.get(LayerId::intern("b")).unwrap().id.as_str(), "b");
    }

    #[test]
    fn deserializing_duplicates_fails() {
        let json = r#"[
            {"id":"dup","type":"text","name":"A","x":0,"y":0,"style":{}},
            {"id":"dup","type":"text","name":"B","x":0,"y":0,"style":{}}
        ]"#;
        assert!(serde_json::from_str::<LayerSet>(json).is_err());
    }
}
