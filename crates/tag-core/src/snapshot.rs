//! Saved templates: named, timestamped deep copies of a design.

use crate::binding::apply_record;
use crate::derive::Recalculator;
use crate::error::VaultError;
use crate::fields::{BindingMap, ColumnMapping};
use crate::model::CanvasConfig;
use crate::records::Record;
use crate::store::LayerSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Reverse;
use uuid::Uuid;

/// The live design triple: layers, bindings, and canvas configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Design {
    pub layers: LayerSet,
    pub bindings: BindingMap,
    pub config: CanvasConfig,
}

/// A data row currently driving the design, with the mapping that routes it.
#[derive(Debug, Clone, Copy)]
pub struct LiveData<'a> {
    pub record: &'a Record,
    pub columns: &'a ColumnMapping,
}

/// One vault entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub template_name: String,
    /// Free-form label shown alongside the name; searchable.
    #[serde(default)]
    pub product_name: String,
    pub layers: LayerSet,
    /// Absent on records saved before bindings existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_mapping: Option<BindingMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<CanvasConfig>,
}

impl TemplateRecord {
    fn capture(id: String, name: &str, design: &Design, now: DateTime<Utc>) -> Self {
        Self {
            id,
            timestamp: now,
            template_name: name.to_string(),
            product_name: "Template".to_string(),
            layers: design.layers.clone(),
            layer_mapping: Some(design.bindings.clone()),
            config: Some(design.config),
        }
    }

    /// Copy the snapshot out as a live design.
    ///
    /// A record without bindings gets the canonical map; one without a
    /// config keeps `current_config`. With `live` data, the record is
    /// re-applied through the restored bindings.
    pub fn restore(
        &self,
        current_config: &CanvasConfig,
        live: Option<LiveData<'_>>,
        rules: &Recalculator,
    ) -> Design {
        let bindings = self
            .layer_mapping
            .clone()
            .unwrap_or_else(BindingMap::canonical);
        let layers = match live {
            Some(data) => apply_record(data.record, &self.layers, data.columns, &bindings, rules),
            None => self.layers.clone(),
        };
        Design {
            layers,
            bindings,
            config: self.config.unwrap_or(*current_config),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.template_name.to_lowercase().contains(needle)
            || self.product_name.to_lowercase().contains(needle)
    }
}

/// Every saved template, in save order.
///
/// Reading is per record: an entry that no longer parses is skipped with a
/// warning and the rest of the vault survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TemplateVault {
    records: Vec<TemplateRecord>,
}

impl<'de> Deserialize<'de> for TemplateVault {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let records = raw
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match TemplateRecord::deserialize(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("skipping unreadable template #{i}: {e}");
                    None
                }
            })
            .collect();
        Ok(Self { records })
    }
}

impl TemplateVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new record with a fresh id. Always creates; never overwrites.
    pub fn save(&mut self, name: &str, design: &Design) -> &TemplateRecord {
        self.save_at(name, design, Utc::now())
    }

    pub fn save_at(&mut self, name: &str, design: &Design, now: DateTime<Utc>) -> &TemplateRecord {
        let record = TemplateRecord::capture(Uuid::new_v4().to_string(), name, design, now);
        log::info!("saved template `{name}` as {}", record.id);
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Overwrite the snapshot and timestamp of an existing record, keeping
    /// its id and names. Unknown ids are an error.
    pub fn update(&mut self, id: &str, design: &Design) -> Result<&TemplateRecord, VaultError> {
        self.update_at(id, design, Utc::now())
    }

    pub fn update_at(
        &mut self,
        id: &str,
        design: &Design,
        now: DateTime<Utc>,
    ) -> Result<&TemplateRecord, VaultError> {
        let record = self.get_mut(id)?;
        record.timestamp = now;
        record.layers = design.layers.clone();
        record.layer_mapping = Some(design.bindings.clone());
        record.config = Some(design.config);
        log::info!("updated template {id}");
        Ok(&*record)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), VaultError> {
        self.get_mut(id)?.template_name = name.to_string();
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&TemplateRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut TemplateRecord, VaultError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| VaultError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Newest first; among equal timestamps, the later save first.
    pub fn list(&self) -> Vec<&TemplateRecord> {
        let mut out: Vec<&TemplateRecord> = self.records.iter().rev().collect();
        out.sort_by_key(|r| Reverse(r.timestamp));
        out
    }

    /// [`Self::list`] restricted to names containing `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<&TemplateRecord> {
        let needle = query.to_lowercase();
        self.list()
            .into_iter()
            .filter(|r| r.matches(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::SystemField;
    use crate::id::LayerId;
    use crate::model::Layer;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn design(name: &str) -> Design {
        Design {
            layers: LayerSet::from_layers(vec![Layer::text("product-name-1", "Name", name)]).unwrap(),
            bindings: BindingMap::canonical(),
            config: CanvasConfig::default(),
        }
    }

    #[test]
    fn save_always_creates() {
        let mut vault = TemplateVault::new();
        let a = vault.save("Weekly", &design("A")).id.clone();
        let b = vault.save("Weekly", &design("A")).id.clone();
        assert_ne!(a, b);
        assert_eq!(vault.len(), 2);
    }

    #[test]
    fn update_keeps_id_and_refreshes() {
        let mut vault = TemplateVault::new();
        let id = vault.save_at("Weekly", &design("A"), at(100)).id.clone();
        vault.update_at(&id, &design("B"), at(200)).unwrap();

        let rec = vault.get(&id).unwrap();
        assert_eq!(rec.timestamp, at(200));
        assert_eq!(rec.template_name, "Weekly");
        let name = rec.layers.get(LayerId::intern("product-name-1")).unwrap();
        assert_eq!(name.content_str(), "B");
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn update_unknown_id_fails() {
        let mut vault = TemplateVault::new();
        let err = vault.update("nope", &design("A")).unwrap_err();
        assert_eq!(err, VaultError::NotFound("nope".into()));
        assert!(vault.is_empty());
    }

    #[test]
    fn snapshot_is_a_deep_copy() {
        let mut vault = TemplateVault::new();
        let mut live = design("A");
        let id = vault.save("Copy", &live).id.clone();
        live.layers
            .update(LayerId::intern("product-name-1"), &crate::model::LayerPatch::content("changed"))
            .unwrap();
        let stored = vault.get(&id).unwrap();
        assert_eq!(
            stored.layers.get(LayerId::intern("product-name-1")).unwrap().content_str(),
            "A"
        );
    }

    #[test]
    fn list_is_newest_first_and_filterable() {
        let mut vault = TemplateVault::new();
        vault.save_at("Bourbon Week", &design("A"), at(100));
        vault.save_at("Vodka Special", &design("B"), at(300));
        vault.save_at("bourbon clearance", &design("C"), at(200));

        let names: Vec<_> = vault.list().iter().map(|r| r.template_name.as_str()).collect();
        assert_eq!(names, vec!["Vodka Special", "bourbon clearance", "Bourbon Week"]);

        let names: Vec<_> = vault
            .filter("BOURBON")
            .iter()
            .map(|r| r.template_name.as_str())
            .collect();
        assert_eq!(names, vec!["bourbon clearance", "Bourbon Week"]);
    }

    #[test]
    fn legacy_record_restores_with_canonical_bindings() {
        let json = r#"{
            "id": "1712345678901",
            "timestamp": 1712345678901,
            "templateName": "Old",
            "productName": "Template",
            "layers": [{"id":"active-price","type":"text","name":"Price","content":"$10","x":0,"y":0,"style":{}}]
        }"#;
        let rec: TemplateRecord = serde_json::from_str(json).unwrap();
        let mut current = CanvasConfig::default();
        current.width = 500.0;
        let restored = rec.restore(&current, None, &Recalculator::default());
        assert_eq!(restored.bindings, BindingMap::canonical());
        assert_eq!(restored.config.width, 500.0);
    }

    #[test]
    fn restore_reapplies_live_record() {
        let mut vault = TemplateVault::new();
        let id = vault.save("Live", &design("Captured")).id.clone();
        let record: Record = [("Name", "Weller")].into_iter().collect();
        let columns: ColumnMapping = [(SystemField::ProductName.key(), "Name")].into_iter().collect();
        let restored = vault.get(&id).unwrap().restore(
            &CanvasConfig::default(),
            Some(LiveData {
                record: &record,
                columns: &columns,
            }),
            &Recalculator::default(),
        );
        assert_eq!(
            restored.layers.get(LayerId::intern("product-name-1")).unwrap().content_str(),
            "Weller"
        );
    }

    #[test]
    fn unreadable_record_is_skipped() {
        let json = r#"[
            {"id":"a","timestamp":100,"templateName":"Kept","layers":[]},
            {"id":"b","timestamp":200,"templateName":"Broken","layers":"not a list"}
        ]"#;
        let vault: TemplateVault = serde_json::from_str(json).unwrap();
        assert_eq!(vault.len(), 1);
        assert!(vault.contains("a"));
    }

    #[test]
    fn rename() {
        let mut vault = TemplateVault::new();
        let id = vault.save("Draft", &design("A")).id.clone();
        vault.rename(&id, "Final").unwrap();
        assert_eq!(vault.get(&id).unwrap().template_name, "Final");
        assert!(vault.rename("ghost", "x").is_err());
    }
}
