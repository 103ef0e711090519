pub mod geometry;
pub mod hit;
pub mod input;
pub mod state;

pub use geometry::{GeometryConfig, GeometryController, GeometryMutation, Handle, ViewMode};
pub use hit::HitTarget;
pub use input::InputEvent;
pub use state::{Action, Change, EditorState, PendingChange, StackOp};
