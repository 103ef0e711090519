use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for layer IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Reserved prefix for optional overlay layers (badges).
pub const BADGE_PREFIX: &str = "badge-";

/// Stable identifier of a layer within a layer set.
///
/// Interned: 4 bytes, `Copy`, O(1) equality and hashing. Ordering compares
/// the underlying text so maps keyed by `LayerId` serialize deterministically.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(Spur);

impl LayerId {
    /// Intern a string as a LayerId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        LayerId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh ID with a prefix (e.g. `custom-badge-3`).
    ///
    /// Skips numbers already interned so a generated ID never collides with
    /// one loaded from a saved template.
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{prefix}-{n}");
            if INTERNER.get(&candidate).is_none() {
                return Self::intern(&candidate);
            }
        }
    }

    pub fn has_badge_prefix(&self) -> bool {
        self.as_str().starts_with(BADGE_PREFIX)
    }
}

impl PartialOrd for LayerId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LayerId {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(LayerId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = LayerId::intern("active-price");
        let b = LayerId::intern("active-price");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "active-price");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = LayerId::with_prefix("custom-badge");
        let b = LayerId::with_prefix("custom-badge");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("custom-badge-"));
    }

    #[test]
    fn prefixed_ids_skip_existing_names() {
        LayerId::intern("probe-0");
        LayerId::intern("probe-1");
        let fresh = LayerId::with_prefix("probe");
        assert_ne!(fresh.as_str(), "probe-0");
        assert_ne!(fresh.as_str(), "probe-1");
    }

    #[test]
    fn ordering_follows_text() {
        let a = LayerId::intern("zz-last");
        let b = LayerId::intern("aa-first");
        assert!(b < a);
    }
}
