//! WASM bridge for Tag Studio: exposes the editor state to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Actions, pending changes,
//! and views cross the boundary as JSON.

mod measure;
mod render2d;
mod storage;

use std::collections::HashMap;
use tag_core::persist::{KeyValueStore, MemoryStore};
use tag_editor::{Action, Change, EditorState, InputEvent};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

pub use measure::CanvasMeasurer;
pub use storage::LocalStorage;

/// The JS-facing designer. All interaction from the page goes through here.
#[wasm_bindgen]
pub struct TagStudio {
    state: EditorState,
    /// On-screen scale of the label canvas.
    zoom: f32,
}

#[wasm_bindgen]
impl TagStudio {
    /// Open the designer over `localStorage`, or an in-memory store when
    /// the page has none.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        init_logger();

        let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
            Some(local) => Box::new(local),
            None => {
                log::warn!("localStorage unavailable; nothing will persist");
                Box::new(MemoryStore::new())
            }
        };
        Self {
            state: EditorState::new(store),
            zoom: 1.0,
        }
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom > 0.0 && zoom.is_finite() {
            self.zoom = zoom;
        }
    }

    /// Apply one JSON-encoded action. Returns true if anything changed.
    pub fn dispatch(&mut self, action: &str) -> Result<bool, JsValue> {
        let action: Action = serde_json::from_str(action).map_err(bad_json)?;
        Ok(self.state.apply(action))
    }

    /// Stage a JSON-encoded destructive change; returns the pending change
    /// (with its token) as JSON.
    pub fn request(&mut self, change: &str) -> Result<String, JsValue> {
        let change: Change = serde_json::from_str(change).map_err(bad_json)?;
        let pending = self.state.request(change);
        serde_json::to_string(&pending).map_err(bad_json)
    }

    pub fn confirm(&mut self, token: u64) -> bool {
        self.state.confirm(token)
    }

    pub fn cancel(&mut self) -> bool {
        self.state.cancel()
    }

    // ─── Views ───────────────────────────────────────────────────────────

    pub fn view(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.view()).map_err(bad_json)
    }

    pub fn records(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.state.records()).map_err(bad_json)
    }

    /// Saved templates, newest first, filtered by name.
    pub fn templates(&self, query: &str) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.vault().filter(query)).map_err(bad_json)
    }

    pub fn queue(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.state.queue()).map_err(bad_json)
    }

    /// The queue placed on physical pages.
    pub fn pages(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.pages()).map_err(bad_json)
    }

    /// Auto-fitted font size per text layer, measured on `ctx`.
    pub fn fitted_sizes(&mut self, ctx: &CanvasRenderingContext2d) -> Result<String, JsValue> {
        let sizes: HashMap<String, f32> = self
            .state
            .fitted_sizes(&CanvasMeasurer::new(ctx))
            .into_iter()
            .map(|(id, size)| (id.as_str().to_string(), size))
            .collect();
        serde_json::to_string(&sizes).map_err(bad_json)
    }

    /// Paint the label preview.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        let sizes: HashMap<_, _> = self
            .state
            .fitted_sizes(&CanvasMeasurer::new(ctx))
            .into_iter()
            .collect();
        let frame = render2d::Frame {
            layers: self.state.layers(),
            config: self.state.config(),
            sizes: &sizes,
            selected: self.state.selected_layer(),
            snapped: self.state.snapped(),
        };
        render2d::render_label(ctx, &frame);
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Pointer coordinates are in screen pixels relative to the canvas.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.pointer(InputEvent::down(x, y))
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.pointer(InputEvent::moved(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.pointer(InputEvent::up(x, y))
    }

    pub fn get_selected_id(&self) -> String {
        self.state
            .selected_layer()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }
}

impl Default for TagStudio {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Private helpers ─────────────────────────────────────────────────────

impl TagStudio {
    fn pointer(&mut self, event: InputEvent) -> bool {
        self.state.pointer(event.unzoomed(self.zoom))
    }
}

fn bad_json(e: serde_json::Error) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

// ─── Logging ─────────────────────────────────────────────────────────────

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg: JsValue = format!("[{}] {}", record.target(), record.args()).into();
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn init_logger() {
    // A second designer on the page keeps the first logger.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Tag Studio WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no designer needed) ───────────────────────────

/// Check a tabular file without importing it. Returns JSON:
/// `{"ok":true,"headers":[...],"records":N}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn preview_import(text: &str) -> String {
    use tag_core::import::{CsvImporter, TabularImporter};
    let result = match CsvImporter::default().import(text) {
        Ok(set) => serde_json::json!({
            "ok": true,
            "headers": set.headers,
            "records": set.len(),
        }),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }),
    };
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn preview_reports_headers_and_errors() {
        let ok: serde_json::Value = serde_json::from_str(&preview_import("A,B\n1,2\n")).unwrap();
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["records"], 1);
        assert_eq!(ok["headers"][1], "B");

        let err: serde_json::Value = serde_json::from_str(&preview_import("")).unwrap();
        assert_eq!(err["ok"], false);
        assert!(err["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
}
