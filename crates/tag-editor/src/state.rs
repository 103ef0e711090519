//! Editor state container.
//!
//! Everything the designer shows lives in [`EditorState`]. It changes only
//! through [`EditorState::apply`] (one [`Action`] per user action), the
//! pointer handler, and the two-phase [`EditorState::request`] /
//! [`EditorState::confirm`] pair for destructive changes.
//!
//! Lookup misses (unknown layer, record index, template id) are logged and
//! leave the state untouched; no transition returns an error.

use crate::geometry::{GeometryController, GeometryMutation, Surface, ViewMode};
use crate::hit::{HitTarget, hit_test};
use crate::input::InputEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tag_core::autofit::{AutoFitLimits, FitCache, FitRequest, TextMeasurer};
use tag_core::badges::{Badge, BadgeLibrary, custom_badge_layer, toggle_badge};
use tag_core::binding::{apply_record, summarize_notes, update_content_for_field};
use tag_core::derive::Recalculator;
use tag_core::fields::{BindingMap, ColumnMapping, SystemField};
use tag_core::id::LayerId;
use tag_core::import::{CsvImporter, TabularImporter};
use tag_core::model::{CanvasConfig, CanvasPatch, Layer, LayerPatch, Style};
use tag_core::persist::{self, KeyValueStore, StorageKeys};
use tag_core::presets::Preset;
use tag_core::print::{PrintQueue, SheetLayout, SheetPage, layout_sheet};
use tag_core::records::RecordSet;
use tag_core::snapshot::{Design, LiveData, TemplateVault};
use tag_core::store::LayerSet;

/// Name used when overwriting falls back to saving a new template.
pub const UNTITLED: &str = "Untitled";

// ─── Actions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StackOp {
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
}

/// One user action. Each variant is one state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    // Layers
    SelectLayer { id: Option<LayerId> },
    UpdateLayer { id: LayerId, patch: LayerPatch },
    /// Write a value into every layer carrying `field`.
    UpdateField { field: SystemField, value: String },
    AddLayer { layer: Layer },
    RemoveLayer { id: LayerId },
    Stack { id: LayerId, op: StackOp },
    MoveLayer { id: LayerId, to: usize },
    UpdateCanvas { patch: CanvasPatch },
    SetMode { mode: ViewMode },

    // Data
    Bind { layer: LayerId, field: Option<SystemField> },
    MapColumn { key: String, header: String },
    Import { text: String },
    SelectRecord { index: Option<usize> },
    Search { query: String },
    CheckRecord { index: usize, checked: bool },
    SummarizeNotes,

    // Badges
    ToggleBadge { badge: Badge },
    UploadBadge { image: String },
    PlaceBadge { index: usize },

    // Print
    EnqueueCurrent,
    EnqueueChecked,
    RemoveQueued { index: usize },
    MoveQueued { from: usize, to: usize },
    ClearQueue,
    SetSheetLayout { layout: SheetLayout },

    // Vault
    SaveTemplate { name: String },
    RenameTemplate { id: String, name: String },
}

/// A destructive change that waits for confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Change {
    LoadPreset { preset: Preset },
    LoadTemplate { id: String },
    /// Discard edits: reload the active template, or the default preset.
    ResetLayout,
    /// Write the design over the active template; saves a new one under
    /// `name` if there is no active template.
    OverwriteTemplate { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub token: u64,
    pub change: Change,
}

// ─── State ───────────────────────────────────────────────────────────────

pub struct EditorState {
    design: Design,
    rules: Recalculator,
    importer: Box<dyn TabularImporter>,
    store: Box<dyn KeyValueStore>,
    keys: StorageKeys,

    columns: ColumnMapping,
    records: RecordSet,
    selected_record: Option<usize>,
    search: String,
    checked: BTreeSet<usize>,

    queue: PrintQueue,
    sheet: SheetLayout,
    vault: TemplateVault,
    badges: BadgeLibrary,
    active_template: Option<String>,

    selected_layer: Option<LayerId>,
    mode: ViewMode,
    geometry: GeometryController,
    fit_cache: FitCache,

    pending: Option<PendingChange>,
    next_token: u64,
}

impl EditorState {
    /// Start on the default preset, restoring the column mapping, vault, and
    /// bindings from `store`.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_keys(store, StorageKeys::default())
    }

    pub fn with_keys(store: Box<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        let columns: ColumnMapping = persist::load_or_default(store.as_ref(), &keys.column_mapping);
        let vault: TemplateVault = persist::load_or_default(store.as_ref(), &keys.vault);
        let bindings = persist::load::<BindingMap>(store.as_ref(), &keys.bindings)
            .unwrap_or_else(BindingMap::canonical);
        log::info!(
            "editor ready: {} template(s), {} column mapping(s)",
            vault.len(),
            columns.iter().count()
        );

        let rules = Recalculator::default();
        let layers = rules.recalculate(&Preset::Default.layers(), &bindings);
        Self {
            design: Design {
                layers,
                bindings,
                config: Preset::Default.config(),
            },
            rules,
            importer: Box::new(CsvImporter::default()),
            store,
            keys,
            columns,
            records: RecordSet::default(),
            selected_record: None,
            search: String::new(),
            checked: BTreeSet::new(),
            queue: PrintQueue::new(),
            sheet: SheetLayout::default(),
            vault,
            badges: BadgeLibrary::default(),
            active_template: None,
            selected_layer: None,
            mode: ViewMode::default(),
            geometry: GeometryController::default(),
            fit_cache: FitCache::new(),
            pending: None,
            next_token: 1,
        }
    }

    #[must_use]
    pub fn with_importer(mut self, importer: impl TabularImporter + 'static) -> Self {
        self.importer = Box::new(importer);
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: Recalculator) -> Self {
        self.rules = rules;
        self.recalculate();
        self
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: GeometryController) -> Self {
        self.geometry = geometry;
        self
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn design(&self) -> &Design {
        &self.design
    }

    pub fn layers(&self) -> &LayerSet {
        &self.design.layers
    }

    pub fn bindings(&self) -> &BindingMap {
        &self.design.bindings
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.design.config
    }

    pub fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn selected_record(&self) -> Option<usize> {
        self.selected_record
    }

    /// Indices of records matching the current search, in file order.
    pub fn visible_records(&self) -> Vec<usize> {
        self.records.search(&self.search)
    }

    pub fn checked(&self) -> impl Iterator<Item = usize> + '_ {
        self.checked.iter().copied()
    }

    pub fn queue(&self) -> &PrintQueue {
        &self.queue
    }

    pub fn sheet(&self) -> &SheetLayout {
        &self.sheet
    }

    pub fn pages(&self) -> Vec<SheetPage> {
        layout_sheet(&self.queue, &self.design.config, &self.sheet)
    }

    pub fn vault(&self) -> &TemplateVault {
        &self.vault
    }

    pub fn badges(&self) -> &BadgeLibrary {
        &self.badges
    }

    pub fn active_template(&self) -> Option<&str> {
        self.active_template.as_deref()
    }

    pub fn selected_layer(&self) -> Option<LayerId> {
        self.selected_layer
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn snapped(&self) -> bool {
        self.geometry.snapped()
    }

    pub fn geometry(&self) -> &GeometryController {
        &self.geometry
    }

    pub fn pending(&self) -> Option<&PendingChange> {
        self.pending.as_ref()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Serializable projection for a UI layer.
    pub fn view(&self) -> View<'_> {
        View {
            layers: &self.design.layers,
            bindings: &self.design.bindings,
            config: &self.design.config,
            columns: &self.columns,
            headers: &self.records.headers,
            mode: self.mode,
            selected_layer: self.selected_layer,
            snapped: self.geometry.snapped(),
            selected_record: self.selected_record,
            visible_records: self.visible_records(),
            checked: self.checked.iter().copied().collect(),
            queue_len: self.queue.len(),
            active_template: self.active_template.as_deref(),
            pending: self.pending.as_ref(),
        }
    }

    /// Auto-fitted font size of every text layer, memoized across calls.
    pub fn fitted_sizes(&mut self, measurer: &dyn TextMeasurer) -> Vec<(LayerId, f32)> {
        let mut out = Vec::new();
        for layer in self.design.layers.iter() {
            if let Some(req) = FitRequest::for_layer(layer, AutoFitLimits::default()) {
                out.push((layer.id, self.fit_cache.fit(&req, measurer)));
            }
        }
        out
    }

    // ─── Transitions ─────────────────────────────────────────────────────

    /// Apply one action. Returns true if anything changed.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::SelectLayer { id } => {
                let id = id.filter(|id| self.design.layers.contains(*id));
                let changed = self.selected_layer != id;
                self.selected_layer = id;
                changed
            }
            Action::UpdateLayer { id, patch } => {
                if let Err(e) = self.design.layers.update(id, &patch) {
                    log::debug!("update skipped: {e}");
                    return false;
                }
                self.recalculate();
                true
            }
            Action::UpdateField { field, value } => {
                let next = update_content_for_field(
                    field,
                    &value,
                    &self.design.layers,
                    &self.design.bindings,
                    &self.rules,
                );
                let changed = next != self.design.layers;
                self.design.layers = next;
                changed
            }
            Action::AddLayer { layer } => {
                let id = layer.id;
                if let Err(e) = self.design.layers.insert(layer) {
                    log::debug!("add skipped: {e}");
                    return false;
                }
                self.selected_layer = Some(id);
                self.recalculate();
                true
            }
            Action::RemoveLayer { id } => {
                if self.design.layers.remove(id).is_none() {
                    log::debug!("remove skipped: no layer {id}");
                    return false;
                }
                if self.selected_layer == Some(id) {
                    self.selected_layer = None;
                }
                if self.geometry.active_layer() == Some(id) {
                    self.geometry.reset();
                }
                self.recalculate();
                true
            }
            Action::Stack { id, op } => {
                let layers = &mut self.design.layers;
                match op {
                    StackOp::BringToFront => layers.bring_to_front(id),
                    StackOp::SendToBack => layers.send_to_back(id),
                    StackOp::BringForward => layers.bring_forward(id),
                    StackOp::SendBackward => layers.send_backward(id),
                }
            }
            Action::MoveLayer { id, to } => self.design.layers.move_to(id, to),
            Action::UpdateCanvas { patch } => {
                let before = self.design.config;
                self.design.config.apply(&patch);
                before != self.design.config
            }
            Action::SetMode { mode } => {
                if self.mode == mode {
                    return false;
                }
                self.geometry.reset();
                self.mode = mode;
                true
            }
            Action::Bind { layer, field } => self.bind(layer, field),
            Action::MapColumn { key, header } => {
                self.columns.set(&key, &header);
                self.write_columns();
                self.reapply_record();
                true
            }
            Action::Import { text } => self.import(&text),
            Action::SelectRecord { index } => self.select_record(index),
            Action::Search { query } => {
                let changed = self.search != query;
                self.search = query;
                changed
            }
            Action::CheckRecord { index, checked } => {
                if index >= self.records.len() {
                    log::debug!("check skipped: no record {index}");
                    return false;
                }
                if checked {
                    self.checked.insert(index)
                } else {
                    self.checked.remove(&index)
                }
            }
            Action::SummarizeNotes => {
                let next = summarize_notes(&self.design.layers, &self.design.bindings, &self.rules);
                let changed = next != self.design.layers;
                self.design.layers = next;
                changed
            }
            Action::ToggleBadge { badge } => {
                let next = toggle_badge(&self.design.layers, badge);
                if next == self.design.layers {
                    return false;
                }
                self.design.layers = next;
                if !badge.is_active(&self.design.layers) && self.selected_layer == Some(badge.id()) {
                    self.selected_layer = None;
                }
                true
            }
            Action::UploadBadge { image } => {
                let index = self.badges.upload(image);
                log::info!("badge image {index} uploaded");
                true
            }
            Action::PlaceBadge { index } => {
                let Some(image) = self.badges.get(index) else {
                    log::debug!("place skipped: no badge image {index}");
                    return false;
                };
                let layer = custom_badge_layer(image);
                let id = layer.id;
                match self.design.layers.insert(layer) {
                    Ok(()) => {
                        self.selected_layer = Some(id);
                        true
                    }
                    Err(e) => {
                        log::debug!("place skipped: {e}");
                        false
                    }
                }
            }
            Action::EnqueueCurrent => {
                self.queue.push(self.design.layers.clone());
                log::info!("queued current label ({} in queue)", self.queue.len());
                true
            }
            Action::EnqueueChecked => self.enqueue_checked(),
            Action::RemoveQueued { index } => self.queue.remove(index).is_some(),
            Action::MoveQueued { from, to } => self.queue.move_entry(from, to),
            Action::ClearQueue => {
                let changed = !self.queue.is_empty();
                self.queue.clear();
                changed
            }
            Action::SetSheetLayout { layout } => {
                let before = self.sheet;
                self.sheet = layout;
                self.sheet.set_scale(layout.scale);
                before != self.sheet
            }
            Action::SaveTemplate { name } => {
                self.save_template(&name);
                true
            }
            Action::RenameTemplate { id, name } => match self.vault.rename(&id, &name) {
                Ok(()) => {
                    self.write_vault();
                    true
                }
                Err(e) => {
                    log::debug!("rename skipped: {e}");
                    false
                }
            },
        }
    }

    /// Stage a destructive change. Replaces any change already pending.
    pub fn request(&mut self, change: Change) -> PendingChange {
        let pending = PendingChange {
            token: self.next_token,
            change,
        };
        self.next_token += 1;
        self.pending = Some(pending.clone());
        pending
    }

    /// Apply the pending change if `token` matches it. Stale tokens are a
    /// no-op and leave the pending change in place.
    pub fn confirm(&mut self, token: u64) -> bool {
        match self.pending.take() {
            Some(pending) if pending.token == token => {
                self.execute(pending.change);
                true
            }
            other => {
                log::debug!("confirm skipped: token {token} is not pending");
                self.pending = other;
                false
            }
        }
    }

    /// Drop the pending change, if any.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Feed a canvas-space pointer event through hit testing and the
    /// geometry controller. Returns true if anything changed.
    pub fn pointer(&mut self, event: InputEvent) -> bool {
        let hit = match event {
            InputEvent::PointerDown { x, y } => hit_test(
                &self.design.layers,
                &self.design.config,
                self.selected_layer,
                self.mode,
                x,
                y,
            ),
            _ => HitTarget::Canvas,
        };
        let surface = Surface {
            layers: &self.design.layers,
            canvas: &self.design.config,
            mode: self.mode,
        };
        let mutations = self.geometry.handle(&event, hit, &surface);

        let mut changed = false;
        for mutation in mutations {
            changed |= self.apply_geometry(mutation);
        }
        changed
    }

    fn apply_geometry(&mut self, mutation: GeometryMutation) -> bool {
        match mutation {
            GeometryMutation::Select(id) => {
                let changed = self.selected_layer != id;
                self.selected_layer = id;
                changed
            }
            GeometryMutation::Move { id, x, y } => self.patch_quiet(id, &LayerPatch::position(x, y)),
            GeometryMutation::Resize { id, rect } => {
                let patch = LayerPatch {
                    position: Some((rect.x, rect.y)),
                    style: Some(Style {
                        width: Some(rect.width),
                        height: Some(rect.height),
                        ..Default::default()
                    }),
                    ..Default::default()
                };
                self.patch_quiet(id, &patch)
            }
            GeometryMutation::SplitRatio(ratio) => {
                let before = self.design.config.split_ratio;
                self.design.config.set_split_ratio_clamped(ratio);
                before != self.design.config.split_ratio
            }
        }
    }

    /// Geometry-only update; derived layers do not depend on position.
    fn patch_quiet(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        match self.design.layers.update(id, patch) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("pointer update skipped: {e}");
                false
            }
        }
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    fn recalculate(&mut self) {
        self.design.layers = self.rules.recalculate(&self.design.layers, &self.design.bindings);
    }

    fn bind(&mut self, layer: LayerId, field: Option<SystemField>) -> bool {
        if self.design.bindings.get(layer) == field {
            return false;
        }
        self.design.bindings.bind(layer, field);
        self.write_bindings();

        // Show the selected record's value, or a `{Field Label}` placeholder
        // until a record supplies one.
        if let Some(field) = field {
            let value = self
                .record_value(field)
                .unwrap_or_else(|| format!("{{{}}}", field.label()));
            let _ = self.design.layers.update(layer, &LayerPatch::content(value));
        }
        self.recalculate();
        true
    }

    fn record_value(&self, field: SystemField) -> Option<String> {
        let record = self.records.get(self.selected_record?)?;
        let header = self.columns.header_for(field.key())?;
        record.get(header).filter(|v| !v.is_empty()).map(str::to_string)
    }

    fn import(&mut self, text: &str) -> bool {
        match self.importer.import(text) {
            Ok(records) => {
                log::info!(
                    "imported {} record(s) with {} column(s)",
                    records.len(),
                    records.headers.len()
                );
                self.records = records;
                self.selected_record = None;
                self.checked.clear();
                self.search.clear();
                true
            }
            Err(e) => {
                log::warn!("import rejected: {e}");
                false
            }
        }
    }

    fn select_record(&mut self, index: Option<usize>) -> bool {
        match index {
            None => {
                let changed = self.selected_record.is_some();
                self.selected_record = None;
                changed
            }
            Some(i) if i < self.records.len() => {
                self.selected_record = Some(i);
                self.reapply_record();
                true
            }
            Some(i) => {
                log::debug!("select skipped: no record {i}");
                false
            }
        }
    }

    /// Re-run the selected record (if any) through the current mapping.
    fn reapply_record(&mut self) {
        if let Some(record) = self.selected_record.and_then(|i| self.records.get(i)) {
            self.design.layers = apply_record(
                record,
                &self.design.layers,
                &self.columns,
                &self.design.bindings,
                &self.rules,
            );
        }
    }

    fn live_data(&self) -> Option<LiveData<'_>> {
        let record = self.records.get(self.selected_record?)?;
        Some(LiveData {
            record,
            columns: &self.columns,
        })
    }

    fn enqueue_checked(&mut self) -> bool {
        if self.checked.is_empty() {
            return false;
        }
        let mut queued = 0;
        for &index in &self.checked {
            let Some(record) = self.records.get(index) else {
                continue;
            };
            let layers = apply_record(
                record,
                &self.design.layers,
                &self.columns,
                &self.design.bindings,
                &self.rules,
            );
            self.queue.push(layers);
            queued += 1;
        }
        self.checked.clear();
        log::info!("queued {queued} record(s) ({} in queue)", self.queue.len());
        true
    }

    fn save_template(&mut self, name: &str) {
        let id = self.vault.save(name, &self.design).id.clone();
        self.active_template = Some(id);
        self.write_vault();
    }

    fn execute(&mut self, change: Change) {
        match change {
            Change::LoadPreset { preset } => self.load_preset(preset),
            Change::LoadTemplate { id } => self.load_template(&id),
            Change::ResetLayout => match self.active_template.clone() {
                Some(id) if self.vault.contains(&id) => self.load_template(&id),
                _ => self.load_preset(Preset::Default),
            },
            Change::OverwriteTemplate { name } => {
                let updated = match self.active_template.as_deref() {
                    Some(id) => self.vault.update(id, &self.design).is_ok(),
                    None => false,
                };
                if updated {
                    self.write_vault();
                } else {
                    log::info!("no active template to overwrite; saving as new");
                    let name = if name.trim().is_empty() { UNTITLED } else { name.as_str() };
                    self.save_template(name);
                }
            }
        }
    }

    fn load_preset(&mut self, preset: Preset) {
        self.design = Design {
            layers: preset.layers(),
            bindings: BindingMap::canonical(),
            config: preset.config(),
        };
        self.write_bindings();
        self.active_template = None;
        self.selected_layer = None;
        self.geometry.reset();
        self.recalculate();
        self.reapply_record();
        log::info!("loaded preset `{}`", preset.key());
    }

    fn load_template(&mut self, id: &str) {
        let Some(record) = self.vault.get(id) else {
            log::debug!("load skipped: no template {id}");
            return;
        };
        let design = record.restore(&self.design.config, self.live_data(), &self.rules);
        log::info!("loaded template `{}`", record.template_name);
        self.design = design;
        self.write_bindings();
        self.active_template = Some(id.to_string());
        self.selected_layer = None;
        self.geometry.reset();
        self.mode = ViewMode::Data;
    }

    fn write_bindings(&mut self) {
        write(self.store.as_mut(), &self.keys.bindings, &self.design.bindings);
    }

    fn write_columns(&mut self) {
        write(self.store.as_mut(), &self.keys.column_mapping, &self.columns);
    }

    fn write_vault(&mut self) {
        write(self.store.as_mut(), &self.keys.vault, &self.vault);
    }
}

/// Persist `value`; a failed write is logged, never surfaced.
fn write<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = persist::save(store, key, value) {
        log::warn!("could not persist `{key}`: {e}");
    }
}

/// Borrowed snapshot of what the UI renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View<'a> {
    pub layers: &'a LayerSet,
    pub bindings: &'a BindingMap,
    pub config: &'a CanvasConfig,
    pub columns: &'a ColumnMapping,
    pub headers: &'a [String],
    pub mode: ViewMode,
    pub selected_layer: Option<LayerId>,
    pub snapped: bool,
    pub selected_record: Option<usize>,
    pub visible_records: Vec<usize>,
    pub checked: Vec<usize>,
    pub queue_len: usize,
    pub active_template: Option<&'a str>,
    pub pending: Option<&'a PendingChange>,
}
