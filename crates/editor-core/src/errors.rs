//! Error types for the `editor-core` crate.
//!
//! Spec §7 names `PathResolutionError` and `UserCancel` as error "kinds",
//! but describes both as silent, non-reported control flow (fall back to
//! the literal path; abort the operation with no side effect) rather than
//! anything surfaced to the user — so, like `SearchMiss`/`InvalidKey`, they
//! have no `Err` variant here. Path-canonicalization fallback lives in
//! `editor_state::Workspace::find_by_path`; prompt cancellation is the
//! `None` case of `term::prompt::read_line`/`read_confirm`.

pub use crate::gap_buffer::GapBufferError;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("out of memory growing the buffer")]
    OutOfMemory,
}

impl From<GapBufferError> for DocumentError {
    fn from(err: GapBufferError) -> Self {
        match err {
            GapBufferError::OutOfMemory => Self::OutOfMemory,
            GapBufferError::OutOfBounds(pos) => {
                // The Document layer is responsible for keeping positions in
                // range; reaching this means a caller passed a bad offset,
                // which we surface as an I/O-shaped error rather than panic.
                Self::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("position {pos} out of bounds"),
                ))
            }
        }
    }
}
