pub mod engine;
pub mod workspace;

pub use engine::{dispatch, DispatchOutcome, EngineEvent, KeyCode, Modifiers, Prompt, Redraw};
pub use workspace::{Workspace, WorkspaceError};
