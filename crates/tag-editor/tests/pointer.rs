//! Integration tests: pointer gestures through the editor state.
//!
//! Drives `EditorState::pointer` end to end: hit testing, permissions,
//! drag with centre snap, resize floor, and the band divider.

use pretty_assertions::assert_eq;
use tag_core::model::{Layer, LayerKind, Style};
use tag_core::persist::MemoryStore;
use tag_core::{LayerId, Rect};
use tag_editor::{Action, EditorState, InputEvent, ViewMode};

const PROBE: &str = "probe";

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A 100×100 box at (0, 400), stacked above the preset.
fn probe(kind: LayerKind) -> Layer {
    Layer::new(PROBE, kind, "Probe").at(0.0, 400.0).with_style(Style {
        width: Some(100.0),
        height: Some(100.0),
        z_index: Some(500),
        ..Default::default()
    })
}

fn editor(mode: ViewMode, kind: LayerKind) -> EditorState {
    init_logs();
    let mut state = EditorState::new(Box::new(MemoryStore::new()));
    assert!(state.apply(Action::AddLayer { layer: probe(kind) }));
    state.apply(Action::SetMode { mode });
    state
}

fn rect(state: &EditorState) -> Rect {
    let layer = state.layers().get(LayerId::intern(PROBE)).unwrap();
    Rect {
        x: layer.x,
        y: layer.y,
        width: layer.style.width.unwrap_or(0.0),
        height: layer.style.height.unwrap_or(0.0),
    }
}

fn drag(state: &mut EditorState, from: (f32, f32), to: (f32, f32)) {
    state.pointer(InputEvent::down(from.0, from.1));
    state.pointer(InputEvent::moved(to.0, to.1));
}

// ─── Drag and snap ───────────────────────────────────────────────────────

#[test]
fn snap_is_inclusive_at_threshold() {
    // Centre ends 15px left of the canvas centre (200).
    let mut state = editor(ViewMode::Design, LayerKind::Shape);
    drag(&mut state, (50.0, 450.0), (185.0, 450.0));
    assert!(state.snapped());
    assert_eq!(rect(&state).x, 150.0);

    state.pointer(InputEvent::up(185.0, 450.0));
    assert!(!state.snapped());
}

#[test]
fn no_snap_one_pixel_further() {
    let mut state = editor(ViewMode::Design, LayerKind::Shape);
    drag(&mut state, (50.0, 450.0), (184.0, 450.0));
    assert!(!state.snapped());
    assert_eq!(rect(&state).x, 134.0);
}

#[test]
fn snap_releases_when_dragged_away() {
    let mut state = editor(ViewMode::Design, LayerKind::Shape);
    drag(&mut state, (50.0, 450.0), (200.0, 470.0));
    assert!(state.snapped());
    assert_eq!((rect(&state).x, rect(&state).y), (150.0, 420.0));

    state.pointer(InputEvent::moved(20.0, 470.0));
    assert!(!state.snapped());
    assert_eq!(rect(&state).x, -30.0);
}

#[test]
fn pointer_down_selects_even_without_drag_permission() {
    let mut state = editor(ViewMode::Data, LayerKind::Text);
    state.apply(Action::SelectLayer { id: None });
    drag(&mut state, (50.0, 450.0), (120.0, 480.0));
    assert_eq!(state.selected_layer(), Some(LayerId::intern(PROBE)));
    assert_eq!(rect(&state).x, 0.0);
}

#[test]
fn data_mode_drags_images() {
    let mut state = editor(ViewMode::Data, LayerKind::Image);
    drag(&mut state, (50.0, 450.0), (60.0, 500.0));
    assert_eq!((rect(&state).x, rect(&state).y), (10.0, 450.0));
}

#[test]
fn print_mode_is_read_only() {
    let mut state = editor(ViewMode::Print, LayerKind::Image);
    drag(&mut state, (50.0, 450.0), (60.0, 500.0));
    assert_eq!(rect(&state).x, 0.0);
    // South-east handle of the (selected) probe.
    drag(&mut state, (100.0, 500.0), (160.0, 560.0));
    assert_eq!(rect(&state).width, 100.0);
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[test]
fn resize_floor_is_exactly_twenty() {
    let mut state = editor(ViewMode::Design, LayerKind::Shape);
    drag(&mut state, (100.0, 500.0), (-50.0, 300.0));
    let r = rect(&state);
    assert_eq!((r.x, r.y, r.width, r.height), (0.0, 400.0, 20.0, 20.0));
}

#[test]
fn north_west_resize_pins_the_far_corner() {
    let mut state = editor(ViewMode::Design, LayerKind::Shape);
    drag(&mut state, (0.0, 400.0), (500.0, 900.0));
    let r = rect(&state);
    assert_eq!((r.width, r.height), (20.0, 20.0));
    assert_eq!((r.right(), r.bottom()), (100.0, 500.0));

    state.pointer(InputEvent::moved(-20.0, 390.0));
    let r = rect(&state);
    assert_eq!((r.x, r.y, r.width, r.height), (-20.0, 390.0, 120.0, 110.0));
}

#[test]
fn data_mode_resizes_images_only() {
    let mut image = editor(ViewMode::Data, LayerKind::Image);
    drag(&mut image, (100.0, 500.0), (130.0, 520.0));
    assert_eq!((rect(&image).width, rect(&image).height), (130.0, 120.0));

    let mut shape = editor(ViewMode::Data, LayerKind::Shape);
    drag(&mut shape, (100.0, 500.0), (130.0, 520.0));
    assert_eq!(rect(&shape).width, 100.0);
}

// ─── Split divider ───────────────────────────────────────────────────────

#[test]
fn divider_drag_clamps_ratio() {
    let mut state = EditorState::new(Box::new(MemoryStore::new()));
    state.apply(Action::SetMode {
        mode: ViewMode::Design,
    });
    let y = state.config().split_y();

    // Left edge: the band boundary is outside every preset layer there.
    state.pointer(InputEvent::down(2.0, y));
    state.pointer(InputEvent::moved(2.0, 5.0));
    assert_eq!(state.config().split_ratio, 0.1);
    state.pointer(InputEvent::moved(2.0, 1000.0));
    assert_eq!(state.config().split_ratio, 0.9);
    state.pointer(InputEvent::up(2.0, 1000.0));
}
