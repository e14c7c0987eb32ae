pub mod document;
pub mod errors;
pub mod gap_buffer;
pub mod undo;

pub use document::{Document, Viewport};
pub use errors::DocumentError;
pub use gap_buffer::{GapBuffer, GapBufferError, Position};
pub use undo::{UndoLog, UndoRecord};
