//! Interactive geometry: drag, resize, centre snap, and the split divider.
//!
//! The controller turns pointer events into `GeometryMutation`s. It never
//! touches the layer set itself; the state container applies what it emits.

use crate::hit::HitTarget;
use crate::input::InputEvent;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tag_core::id::LayerId;
use tag_core::model::{CanvasConfig, Layer, LayerKind, Rect, clamp_split};
use tag_core::store::LayerSet;

/// Size assumed for a layer without explicit dimensions when a resize
/// starts.
pub const RESIZE_FALLBACK: (f32, f32) = (100.0, 50.0);

// ─── Modes and permissions ───────────────────────────────────────────────

/// Which screen the designer is on. Decides what the pointer may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Record browsing; only overlays and images move.
    #[default]
    Data,
    /// Full layout editing.
    Design,
    Vault,
    Print,
}

impl ViewMode {
    pub fn can_drag(self, layer: &Layer) -> bool {
        match self {
            ViewMode::Design => true,
            ViewMode::Data => {
                layer.role.is_badge() || matches!(layer.kind, LayerKind::Group | LayerKind::Image)
            }
            ViewMode::Vault | ViewMode::Print => false,
        }
    }

    pub fn can_resize(self, layer: &Layer) -> bool {
        match self {
            ViewMode::Design => true,
            ViewMode::Data => layer.kind == LayerKind::Image,
            ViewMode::Vault | ViewMode::Print => false,
        }
    }

    /// Whether the band divider can be dragged.
    pub fn can_split(self) -> bool {
        self == ViewMode::Design
    }
}

// ─── Handles ─────────────────────────────────────────────────────────────

/// A resize handle, named by the edges it moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NW,
        Handle::N,
        Handle::NE,
        Handle::E,
        Handle::SE,
        Handle::S,
        Handle::SW,
        Handle::W,
    ];

    pub fn north(self) -> bool {
        matches!(self, Handle::N | Handle::NE | Handle::NW)
    }

    pub fn south(self) -> bool {
        matches!(self, Handle::S | Handle::SE | Handle::SW)
    }

    pub fn east(self) -> bool {
        matches!(self, Handle::E | Handle::NE | Handle::SE)
    }

    pub fn west(self) -> bool {
        matches!(self, Handle::W | Handle::NW | Handle::SW)
    }

    /// Where the handle sits on `rect`.
    pub fn anchor(self, rect: &Rect) -> (f32, f32) {
        let x = if self.west() {
            rect.x
        } else if self.east() {
            rect.right()
        } else {
            rect.x + rect.width / 2.0
        };
        let y = if self.north() {
            rect.y
        } else if self.south() {
            rect.bottom()
        } else {
            rect.y + rect.height / 2.0
        };
        (x, y)
    }
}

/// Resize `start` by a pointer delta through `handle`.
///
/// Each dimension is floored at `min_size`; north and west handles move the
/// origin so the opposite edge stays put.
pub fn resize_rect(start: &Rect, handle: Handle, dx: f32, dy: f32, min_size: f32) -> Rect {
    let mut rect = *start;
    if handle.east() {
        rect.width = (start.width + dx).max(min_size);
    }
    if handle.west() {
        rect.width = (start.width - dx).max(min_size);
        rect.x = start.right() - rect.width;
    }
    if handle.south() {
        rect.height = (start.height + dy).max(min_size);
    }
    if handle.north() {
        rect.height = (start.height - dy).max(min_size);
        rect.y = start.bottom() - rect.height;
    }
    rect
}

// ─── Controller ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryConfig {
    /// Floor for width and height while resizing.
    pub min_size: f32,
    /// Max distance between layer and canvas centres that still snaps.
    pub snap_threshold: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            min_size: 20.0,
            snap_threshold: 15.0,
        }
    }
}

/// A change requested by a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryMutation {
    Select(Option<LayerId>),
    Move { id: LayerId, x: f32, y: f32 },
    Resize { id: LayerId, rect: Rect },
    SplitRatio(f32),
}

pub type Mutations = SmallVec<[GeometryMutation; 2]>;

/// What the controller reads while handling an event.
#[derive(Debug, Clone, Copy)]
pub struct Surface<'a> {
    pub layers: &'a LayerSet,
    pub canvas: &'a CanvasConfig,
    pub mode: ViewMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Dragging {
        id: LayerId,
        origin: (f32, f32),
        pointer: (f32, f32),
        /// Width used for the centre estimate.
        width: f32,
    },
    Resizing {
        id: LayerId,
        handle: Handle,
        start: Rect,
        pointer: (f32, f32),
    },
    Splitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Idle,
    Dragging,
    Resizing(Handle),
    Splitting,
}

#[derive(Debug, Clone)]
pub struct GeometryController {
    pub config: GeometryConfig,
    gesture: Gesture,
    snapped: bool,
}

impl Default for GeometryController {
    fn default() -> Self {
        Self::new(GeometryConfig::default())
    }
}

impl GeometryController {
    pub fn new(config: GeometryConfig) -> Self {
        Self {
            config,
            gesture: Gesture::Idle,
            snapped: false,
        }
    }

    /// True while a drag holds the layer on the canvas centre line.
    pub fn snapped(&self) -> bool {
        self.snapped
    }

    pub fn gesture(&self) -> GestureKind {
        match self.gesture {
            Gesture::Idle => GestureKind::Idle,
            Gesture::Dragging { .. } => GestureKind::Dragging,
            Gesture::Resizing { handle, .. } => GestureKind::Resizing(handle),
            Gesture::Splitting => GestureKind::Splitting,
        }
    }

    /// Layer currently being dragged or resized.
    pub fn active_layer(&self) -> Option<LayerId> {
        match self.gesture {
            Gesture::Dragging { id, .. } | Gesture::Resizing { id, .. } => Some(id),
            Gesture::Idle | Gesture::Splitting => None,
        }
    }

    /// Handle one pointer event. `hit` is only consulted on pointer-down.
    pub fn handle(&mut self, event: &InputEvent, hit: HitTarget, surface: &Surface<'_>) -> Mutations {
        match *event {
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y, hit, surface),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y, surface),
            InputEvent::PointerUp { .. } => {
                self.gesture = Gesture::Idle;
                self.snapped = false;
                Mutations::new()
            }
        }
    }

    /// Abandon any gesture in progress.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.snapped = false;
    }

    fn pointer_down(&mut self, x: f32, y: f32, hit: HitTarget, surface: &Surface<'_>) -> Mutations {
        let mut out = Mutations::new();
        self.gesture = Gesture::Idle;
        self.snapped = false;

        match hit {
            HitTarget::Body(id) => {
                out.push(GeometryMutation::Select(Some(id)));
                let Some(layer) = surface.layers.get(id) else {
                    return out;
                };
                if !layer.locked && surface.mode.can_drag(layer) {
                    self.gesture = Gesture::Dragging {
                        id,
                        origin: (layer.x, layer.y),
                        pointer: (x, y),
                        width: layer.estimated_width(),
                    };
                }
            }
            HitTarget::Handle(id, handle) => {
                out.push(GeometryMutation::Select(Some(id)));
                let Some(layer) = surface.layers.get(id) else {
                    return out;
                };
                if !layer.locked && surface.mode.can_resize(layer) {
                    let start = Rect {
                        x: layer.x,
                        y: layer.y,
                        width: layer.style.width.unwrap_or(RESIZE_FALLBACK.0),
                        height: layer.style.height.unwrap_or(RESIZE_FALLBACK.1),
                    };
                    self.gesture = Gesture::Resizing {
                        id,
                        handle,
                        start,
                        pointer: (x, y),
                    };
                }
            }
            HitTarget::SplitDivider if surface.mode.can_split() => {
                self.gesture = Gesture::Splitting;
            }
            HitTarget::SplitDivider | HitTarget::Canvas => {
                out.push(GeometryMutation::Select(None));
            }
        }
        log::trace!("pointer down at ({x}, {y}) → {:?}", self.gesture());
        out
    }

    fn pointer_move(&mut self, x: f32, y: f32, surface: &Surface<'_>) -> Mutations {
        let mut out = Mutations::new();
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging {
                id,
                origin,
                pointer,
                width,
            } => {
                let mut nx = origin.0 + (x - pointer.0);
                let ny = origin.1 + (y - pointer.1);
                let canvas_center = surface.canvas.center_x();
                if ((nx + width / 2.0) - canvas_center).abs() <= self.config.snap_threshold {
                    nx = canvas_center - width / 2.0;
                    self.snapped = true;
                } else {
                    self.snapped = false;
                }
                log::trace!("drag {id} to ({nx}, {ny}) snapped={}", self.snapped);
                out.push(GeometryMutation::Move { id, x: nx, y: ny });
            }
            Gesture::Resizing {
                id,
                handle,
                start,
                pointer,
            } => {
                let rect = resize_rect(&start, handle, x - pointer.0, y - pointer.1, self.config.min_size);
                log::trace!("resize {id} to {rect:?}");
                out.push(GeometryMutation::Resize { id, rect });
            }
            Gesture::Splitting => {
                out.push(GeometryMutation::SplitRatio(clamp_split(y / surface.canvas.height)));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tag_core::model::{LayerRole, Style};

    fn boxed(id: &str, kind: LayerKind, x: f32, y: f32, w: f32, h: f32) -> Layer {
        Layer::new(id, kind, id).at(x, y).with_style(Style {
            width: Some(w),
            height: Some(h),
            ..Default::default()
        })
    }

    fn set(layers: Vec<Layer>) -> LayerSet {
        LayerSet::from_layers(layers).unwrap()
    }

    #[test]
    fn data_mode_permissions() {
        let text = Layer::text("product-name-1", "Name", "x");
        let badge = Layer::shape("badge-organic", "Organic");
        let image = Layer::new("logo", LayerKind::Image, "Logo");
        let group = Layer::new("badge-points-group", LayerKind::Group, "Points");
        assert_eq!(badge.role, LayerRole::Badge);

        let mode = ViewMode::Data;
        assert!(!mode.can_drag(&text));
        assert!(mode.can_drag(&badge) && mode.can_drag(&image) && mode.can_drag(&group));
        assert!(!mode.can_resize(&badge));
        assert!(mode.can_resize(&image));

        for layer in [&text, &badge, &image] {
            assert!(ViewMode::Design.can_drag(layer) && ViewMode::Design.can_resize(layer));
            assert!(!ViewMode::Print.can_drag(layer) && !ViewMode::Print.can_resize(layer));
        }
    }

    #[test]
    fn handle_edges() {
        assert!(Handle::NW.north() && Handle::NW.west());
        assert!(!Handle::N.east() && !Handle::N.west());
        let rect = Rect {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 40.0,
        };
        assert_eq!(Handle::SE.anchor(&rect), (110.0, 60.0));
        assert_eq!(Handle::N.anchor(&rect), (60.0, 20.0));
    }

    #[test]
    fn west_and_north_keep_opposite_edge() {
        let start = Rect {
            x: 50.0,
            y: 50.0,
            width: 100.0,
            height: 80.0,
        };
        let r = resize_rect(&start, Handle::NW, 30.0, 10.0, 20.0);
        assert_eq!((r.x, r.y, r.width, r.height), (80.0, 60.0, 70.0, 70.0));
        assert_eq!(r.right(), start.right());
        assert_eq!(r.bottom(), start.bottom());

        let floored = resize_rect(&start, Handle::W, 500.0, 0.0, 20.0);
        assert_eq!(floored.width, 20.0);
        assert_eq!(floored.right(), start.right());
    }

    #[test]
    fn drag_follows_pointer() {
        let layers = set(vec![boxed("a", LayerKind::Shape, 10.0, 10.0, 40.0, 40.0)]);
        let canvas = CanvasConfig::default();
        let surface = Surface {
            layers: &layers,
            canvas: &canvas,
            mode: ViewMode::Design,
        };
        let id = LayerId::intern("a");
        let mut ctl = GeometryController::default();

        let down = ctl.handle(&InputEvent::down(20.0, 20.0), HitTarget::Body(id), &surface);
        assert_eq!(down.as_slice(), &[GeometryMutation::Select(Some(id))]);
        assert_eq!(ctl.gesture(), GestureKind::Dragging);

        let moved = ctl.handle(&InputEvent::moved(25.0, 50.0), HitTarget::Canvas, &surface);
        assert_eq!(moved.as_slice(), &[GeometryMutation::Move { id, x: 15.0, y: 40.0 }]);
        assert!(!ctl.snapped());

        ctl.handle(&InputEvent::up(25.0, 50.0), HitTarget::Canvas, &surface);
        assert_eq!(ctl.gesture(), GestureKind::Idle);
        assert!(ctl.handle(&InputEvent::moved(90.0, 90.0), HitTarget::Canvas, &surface).is_empty());
    }

    #[test]
    fn locked_or_forbidden_layers_only_select() {
        let mut locked = boxed("a", LayerKind::Shape, 0.0, 0.0, 40.0, 40.0);
        locked.locked = true;
        let layers = set(vec![locked, Layer::text("b", "B", "text")]);
        let canvas = CanvasConfig::default();
        let mut ctl = GeometryController::default();

        let design = Surface {
            layers: &layers,
            canvas: &canvas,
            mode: ViewMode::Design,
        };
        let out = ctl.handle(&InputEvent::down(5.0, 5.0), HitTarget::Body(LayerId::intern("a")), &design);
        assert_eq!(out.len(), 1);
        assert_eq!(ctl.gesture(), GestureKind::Idle);

        let data = Surface {
            mode: ViewMode::Data,
            ..design
        };
        let b = LayerId::intern("b");
        ctl.handle(&InputEvent::down(5.0, 5.0), HitTarget::Body(b), &data);
        assert_eq!(ctl.gesture(), GestureKind::Idle);
        ctl.handle(&InputEvent::down(5.0, 5.0), HitTarget::Handle(b, Handle::SE), &data);
        assert_eq!(ctl.gesture(), GestureKind::Idle);
    }

    #[test]
    fn resize_defaults_missing_dimensions() {
        let layers = set(vec![Layer::shape("a", "A").at(10.0, 10.0)]);
        let canvas = CanvasConfig::default();
        let surface = Surface {
            layers: &layers,
            canvas: &canvas,
            mode: ViewMode::Design,
        };
        let id = LayerId::intern("a");
        let mut ctl = GeometryController::default();
        ctl.handle(&InputEvent::down(110.0, 60.0), HitTarget::Handle(id, Handle::SE), &surface);
        let out = ctl.handle(&InputEvent::moved(120.0, 65.0), HitTarget::Canvas, &surface);
        let expected = Rect {
            x: 10.0,
            y: 10.0,
            width: 110.0,
            height: 55.0,
        };
        assert_eq!(out.as_slice(), &[GeometryMutation::Resize { id, rect: expected }]);
    }

    #[test]
    fn split_drag_is_clamped_and_design_only() {
        let layers = LayerSet::new();
        let canvas = CanvasConfig::default();
        let design = Surface {
            layers: &layers,
            canvas: &canvas,
            mode: ViewMode::Design,
        };
        let mut ctl = GeometryController::default();
        assert!(ctl.handle(&InputEvent::down(0.0, 360.0), HitTarget::SplitDivider, &design).is_empty());
        let out = ctl.handle(&InputEvent::moved(0.0, 300.0), HitTarget::Canvas, &design);
        assert_eq!(out.as_slice(), &[GeometryMutation::SplitRatio(0.5)]);
        let out = ctl.handle(&InputEvent::moved(0.0, 599.0), HitTarget::Canvas, &design);
        assert_eq!(out.as_slice(), &[GeometryMutation::SplitRatio(0.9)]);
        let out = ctl.handle(&InputEvent::moved(0.0, -40.0), HitTarget::Canvas, &design);
        assert_eq!(out.as_slice(), &[GeometryMutation::SplitRatio(0.1)]);

        let data = Surface {
            mode: ViewMode::Data,
            ..design
        };
        let out = ctl.handle(&InputEvent::down(0.0, 360.0), HitTarget::SplitDivider, &data);
        assert_eq!(out.as_slice(), &[GeometryMutation::Select(None)]);
        assert_eq!(ctl.gesture(), GestureKind::Idle);
    }
}
