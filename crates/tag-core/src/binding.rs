//! Routing values between system fields and layer content.
//!
//! All functions here are pure: they take the current layer set by
//! reference and return a new one. Unresolvable lookups are no-ops.

use crate::derive::Recalculator;
use crate::fields::{BindingMap, ColumnMapping, SystemField};
use crate::id::LayerId;
use crate::model::{Layer, LayerPatch};
use crate::records::Record;
use crate::store::LayerSet;

/// Layers carrying `field`, in sequence order: every existing layer bound to
/// it, or failing that the layer whose id is the field key.
pub fn layers_for_field(
    field: SystemField,
    layers: &LayerSet,
    bindings: &BindingMap,
) -> Vec<LayerId> {
    let bound: Vec<LayerId> = layers
        .iter()
        .filter(|l| bindings.get(l.id) == Some(field))
        .map(|l| l.id)
        .collect();
    if !bound.is_empty() {
        return bound;
    }
    let fallback = field.default_layer();
    if layers.contains(fallback) {
        vec![fallback]
    } else {
        Vec::new()
    }
}

/// Current content of `field`: the first bound layer that still exists,
/// else the layer whose id equals the field key, else empty.
pub fn resolve_content(field: SystemField, layers: &LayerSet, bindings: &BindingMap) -> String {
    layers_for_field(field, layers, bindings)
        .first()
        .and_then(|id| layers.get(*id))
        .map(|l| l.content_str().to_string())
        .unwrap_or_default()
}

/// Column header that feeds `layer`, if any.
fn header_for<'a>(layer: &Layer, columns: &'a ColumnMapping, bindings: &BindingMap) -> Option<&'a str> {
    columns.header_for(bindings.effective_key(layer.id))
}

/// Fill every mapped layer from `record`, then recalculate derived layers.
///
/// A layer is filled when its effective key (binding, else id) maps to a
/// header that the record actually has; everything else is left alone.
pub fn apply_record(
    record: &Record,
    layers: &LayerSet,
    columns: &ColumnMapping,
    bindings: &BindingMap,
    rules: &Recalculator,
) -> LayerSet {
    let mut next = layers.clone();
    let updates: Vec<(LayerId, String)> = layers
        .iter()
        .filter_map(|layer| {
            let header = header_for(layer, columns, bindings)?;
            let value = record.get(header)?;
            Some((layer.id, value.to_string()))
        })
        .collect();

    log::debug!("record fills {} layer(s)", updates.len());
    for (id, value) in updates {
        // Ids come from `layers`, so the update cannot miss.
        let _ = next.update(id, &LayerPatch::content(value));
    }
    rules.recalculate(&next, bindings)
}

/// Write `value` into every layer carrying `field` (fan-out), then
/// recalculate. No carrier means no change.
pub fn update_content_for_field(
    field: SystemField,
    value: &str,
    layers: &LayerSet,
    bindings: &BindingMap,
    rules: &Recalculator,
) -> LayerSet {
    let targets = layers_for_field(field, layers, bindings);
    if targets.is_empty() {
        log::debug!("no layer carries field `{}`", field.key());
        return layers.clone();
    }
    let mut next = layers.clone();
    for id in targets {
        let _ = next.update(id, &LayerPatch::content(value));
    }
    rules.recalculate(&next, bindings)
}

/// Shorten `text` to its first three words followed by `...`.
/// Text of three words or fewer is returned unchanged.
pub fn summarize(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= 3 {
        return text.to_string();
    }
    format!("{}...", words[..3].join(" "))
}

/// Replace the tasting notes with their three-word summary.
pub fn summarize_notes(layers: &LayerSet, bindings: &BindingMap, rules: &Recalculator) -> LayerSet {
    let notes = resolve_content(SystemField::TastingNotes, layers, bindings);
    let short = summarize(&notes);
    if short == notes {
        return layers.clone();
    }
    update_content_for_field(SystemField::TastingNotes, &short, layers, bindings, rules)
}
