//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and pen pointer events into a single
//! `InputEvent` enum consumed by the geometry controller. Coordinates are
//! canvas pixels (already divided by the on-screen zoom).

/// A normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown { x: f32, y: f32 },

    /// Pointer moved while tracked.
    PointerMove { x: f32, y: f32 },

    /// Pointer released or cancelled.
    PointerUp { x: f32, y: f32 },
}

impl InputEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn position(&self) -> (f32, f32) {
        match *self {
            Self::PointerDown { x, y } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => (x, y),
        }
    }

    /// Map a screen-space point onto the canvas at `zoom` (1.0 = actual size).
    #[must_use]
    pub fn unzoomed(self, zoom: f32) -> Self {
        if zoom <= 0.0 || !zoom.is_finite() {
            return self;
        }
        match self {
            Self::PointerDown { x, y } => Self::down(x / zoom, y / zoom),
            Self::PointerMove { x, y } => Self::moved(x / zoom, y / zoom),
            Self::PointerUp { x, y } => Self::up(x / zoom, y / zoom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unzoom_divides_coordinates() {
        let ev = InputEvent::moved(100.0, 50.0).unzoomed(2.0);
        assert_eq!(ev, InputEvent::moved(50.0, 25.0));
        assert_eq!(InputEvent::up(3.0, 4.0).unzoomed(0.0).position(), (3.0, 4.0));
    }
}
