//! Derived-field recalculation.
//!
//! Some layers are a function of other layers rather than user input. Each
//! such relationship is a [`DerivationRule`]: a pure function from the
//! current layer set to a handful of patches. The [`Recalculator`] runs every
//! registered rule once against the same input and applies the collected
//! patches to a copy.
//!
//! Rules are not iterated to a fixed point. A rule that reads another rule's
//! output layers sees the pre-pass values.

use crate::fields::{BindingMap, SystemField};
use crate::id::LayerId;
use crate::model::{Display, Layer, LayerPatch, Style};
use crate::store::LayerSet;
use smallvec::SmallVec;

/// Patches produced by one rule. Most rules touch one or two layers.
pub type Patches = SmallVec<[(LayerId, LayerPatch); 2]>;

/// A cross-layer invariant. Must be pure and idempotent: applying its
/// patches and running it again yields the same patches.
pub trait DerivationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn derive(&self, layers: &LayerSet, bindings: &BindingMap) -> Patches;
}

/// Registry of derivation rules, applied once per mutation.
pub struct Recalculator {
    rules: Vec<Box<dyn DerivationRule>>,
}

impl Default for Recalculator {
    fn default() -> Self {
        Self {
            rules: vec![Box::new(SavingsRibbon)],
        }
    }
}

impl std::fmt::Debug for Recalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.name()))
            .finish()
    }
}

impl Recalculator {
    /// A registry with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl DerivationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    /// Return a new layer set with every rule's patches applied. The input
    /// is never modified.
    pub fn recalculate(&self, layers: &LayerSet, bindings: &BindingMap) -> LayerSet {
        let patches: Vec<(LayerId, LayerPatch)> = self
            .rules
            .iter()
            .flat_map(|rule| {
                let out = rule.derive(layers, bindings);
                if !out.is_empty() {
                    log::trace!("rule `{}` produced {} patch(es)", rule.name(), out.len());
                }
                out
            })
            .collect();

        let mut next = layers.clone();
        for (id, patch) in &patches {
            if next.update(*id, patch).is_err() {
                log::debug!("derived patch for missing layer {id} dropped");
            }
        }
        next
    }
}

// ─── Price parsing ───────────────────────────────────────────────────────

/// Parse a display price such as `"WAS $169.99"`.
///
/// Every character other than an ASCII digit or `.` is discarded, then the
/// longest leading `digits[.digits]` prefix is read. Anything unparsable
/// yields 0.
pub fn parse_price(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in cleaned.char_indices() {
        match c {
            '.' if !seen_dot => seen_dot = true,
            '.' => break,
            _ => {}
        }
        end = i + 1;
    }
    cleaned[..end].parse::<f64>().unwrap_or(0.0)
}

/// Find the layer carrying `field`: the layer whose id is the field key, or
/// failing that the first layer (in sequence order) bound to the field.
pub fn price_layer<'a>(
    layers: &'a LayerSet,
    bindings: &BindingMap,
    field: SystemField,
) -> Option<&'a Layer> {
    layers.get(field.default_layer()).or_else(|| {
        layers
            .iter()
            .find(|l| bindings.get(l.id) == Some(field))
    })
}

fn price_of(layers: &LayerSet, bindings: &BindingMap, field: SystemField) -> f64 {
    price_layer(layers, bindings, field)
        .map(|l| parse_price(l.content_str()))
        .unwrap_or(0.0)
}

// ─── Savings ribbon ──────────────────────────────────────────────────────

pub const RIBBON_BG: &str = "ribbon-bg";
pub const RIBBON_TEXT: &str = "ribbon-text";

/// Smallest difference that counts as a discount.
const MIN_SAVINGS: f64 = 0.01;

/// Shows the "SAVE $x.xx" ribbon when the was-price exceeds the active
/// price, hides it otherwise. Inapplicable unless both ribbon layers exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct SavingsRibbon;

impl DerivationRule for SavingsRibbon {
    fn name(&self) -> &'static str {
        "savings-ribbon"
    }

    fn derive(&self, layers: &LayerSet, bindings: &BindingMap) -> Patches {
        let bg = LayerId::intern(RIBBON_BG);
        let text = LayerId::intern(RIBBON_TEXT);
        if !layers.contains(bg) || !layers.contains(text) {
            return Patches::new();
        }

        let active = price_of(layers, bindings, SystemField::ActivePrice);
        let was = price_of(layers, bindings, SystemField::WasPrice);
        let savings = was - active;

        let mut out = Patches::new();
        if was > active && savings > MIN_SAVINGS {
            out.push((bg, LayerPatch::display(Display::Flex)));
            out.push((
                text,
                LayerPatch {
                    content: Some(format!("SAVE ${savings:.2}")),
                    style: Some(Style {
                        display: Some(Display::Block),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            ));
        } else {
            out.push((bg, LayerPatch::display(Display::Hidden)));
            out.push((text, LayerPatch::display(Display::Hidden)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn priced(active: &str, was: &str) -> LayerSet {
        LayerSet::from_layers(vec![
            Layer::text("was-price", "Was", was),
            Layer::text("active-price", "Price", active),
            Layer::shape(RIBBON_BG, "Ribbon"),
            Layer::text(RIBBON_TEXT, "Ribbon Text", "SAVE $0.00"),
        ])
        .unwrap()
    }

    fn ribbon(set: &LayerSet) -> (Option<Display>, Option<Display>, String) {
        let bg = set.get(LayerId::intern(RIBBON_BG)).unwrap();
        let text = set.get(LayerId::intern(RIBBON_TEXT)).unwrap();
        (
            bg.style.display,
            text.style.display,
            text.content_str().to_string(),
        )
    }

    #[test]
    fn parse_price_strips_decoration() {
        assert_eq!(parse_price("WAS $169.99"), 169.99);
        assert_eq!(parse_price("$1,299.50"), 1299.5);
        assert_eq!(parse_price("1.2.3"), 1.2);
        assert_eq!(parse_price(".5"), 0.5);
        assert_eq!(parse_price("n/a"), 0.0);
        assert_eq!(parse_price("."), 0.0);
        assert_eq!(parse_price(""), 0.0);
    }

    #[test]
    fn discount_shows_ribbon() {
        let out = Recalculator::default().recalculate(&priced("$129.99", "WAS $169.99"), &BindingMap::new());
        assert_eq!(
            ribbon(&out),
            (Some(Display::Flex), Some(Display::Block), "SAVE $40.00".to_string())
        );
    }

    #[test]
    fn equal_prices_hide_ribbon() {
        let out = Recalculator::default().recalculate(&priced("$50.00", "$50.00"), &BindingMap::new());
        let (bg, text, _) = ribbon(&out);
        assert_eq!((bg, text), (Some(Display::Hidden), Some(Display::Hidden)));
    }

    #[test]
    fn one_cent_is_not_a_discount() {
        let out = Recalculator::default().recalculate(&priced("$10.00", "$10.01"), &BindingMap::new());
        assert_eq!(ribbon(&out).0, Some(Display::Hidden));
    }

    #[test]
    fn missing_ribbon_layer_leaves_input_unchanged() {
        let set = LayerSet::from_layers(vec![
            Layer::text("was-price", "Was", "$20"),
            Layer::text("active-price", "Price", "$10"),
            Layer::shape(RIBBON_BG, "Ribbon"),
        ])
        .unwrap();
        assert_eq!(Recalculator::default().recalculate(&set, &BindingMap::new()), set);
    }

    #[test]
    fn bound_price_layers_are_found() {
        let set = LayerSet::from_layers(vec![
            Layer::text("old", "Old", "$30.00"),
            Layer::text("big-price", "Price", "$25.50"),
            Layer::shape(RIBBON_BG, "Ribbon"),
            Layer::text(RIBBON_TEXT, "Ribbon Text", ""),
        ])
        .unwrap();
        let bindings: BindingMap = [
            (LayerId::intern("big-price"), SystemField::ActivePrice),
            (LayerId::intern("old"), SystemField::WasPrice),
        ]
        .into_iter()
        .collect();
        let out = Recalculator::default().recalculate(&set, &bindings);
        assert_eq!(ribbon(&out).2, "SAVE $4.50");
    }

    #[test]
    fn input_is_not_mutated() {
        let set = priced("$1", "$9");
        let before = set.clone();
        let _ = Recalculator::default().recalculate(&set, &BindingMap::new());
        assert_eq!(set, before);
    }

    #[test]
    fn empty_registry_is_identity() {
        let set = priced("$1", "$9");
        let rules = Recalculator::empty();
        assert_eq!(rules.recalculate(&set, &BindingMap::new()), set);
        assert_eq!(Recalculator::default().rule_names().collect::<Vec<_>>(), vec!["savings-ribbon"]);
    }
}
