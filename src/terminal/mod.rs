//! The terminal view: simulated shell, live session bridge and the grid they
//! both draw on.

pub mod bridge;
pub mod fit;
pub mod interpreter;
pub mod line_editor;
pub mod session;
pub mod surface;

pub use bridge::{BridgeEvent, Effect, SessionMode, SessionState};
pub use fit::{ContainerSize, FontMetrics, ResizeDebouncer};
pub use interpreter::{interpret, Outcome};
pub use line_editor::{EditorAction, LineEditor};
pub use session::TerminalSession;
pub use surface::{Dimensions, SurfaceView, TerminalSurface};
