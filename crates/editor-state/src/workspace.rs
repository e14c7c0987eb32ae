//! Multi-document session state: the set of open documents, the shared
//! clipboard, the last search needle, and the untitled-name counter.
//!
//! Documents are stored in a `Vec` with a `current: Option<usize>` index
//! rather than a circular doubly-linked list — an idiomatic substitute the
//! design explicitly allows, since next/prev rotation and "delete current"
//! are just as cheap expressed as index arithmetic over a `Vec`.

use std::path::Path;

use editor_core::{Document, DocumentError, Viewport};

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("no current document")]
    NoCurrentDocument,
}

type Result<T> = std::result::Result<T, WorkspaceError>;

#[derive(Debug, Default)]
pub struct Workspace {
    documents: Vec<Document>,
    current: Option<usize>,
    clipboard: Vec<u8>,
    search: Option<Vec<u8>>,
    untitled_n: u32,
    /// Transient message for the status bar; set on recoverable errors and
    /// search misses, read and cleared by the renderer.
    status: Option<String>,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Document> {
        self.current.map(|i| &self.documents[i])
    }

    #[must_use]
    pub fn current_mut(&mut self) -> Option<&mut Document> {
        self.current.map(move |i| &mut self.documents[i])
    }

    fn current_index(&self) -> Result<usize> {
        self.current.ok_or(WorkspaceError::NoCurrentDocument)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    fn next_untitled_name(&mut self) -> String {
        self.untitled_n += 1;
        format!("Untitled-{}", self.untitled_n)
    }

    /// Inserts `doc` after `current` (or at the end if there is no
    /// current document) and makes it current.
    fn insert_after_current(&mut self, doc: Document) {
        let at = self.current.map_or(self.documents.len(), |i| i + 1);
        self.documents.insert(at, doc);
        self.current = Some(at);
    }

    /// Creates a new empty, untitled document and focuses it.
    pub fn create_document(&mut self) {
        let name = self.next_untitled_name();
        self.insert_after_current(Document::new(name));
    }

    /// Canonicalizes `name` (falling back to the literal path if that
    /// fails) and scans for a document already bound to it.
    #[must_use]
    pub fn find_by_path(&self, name: &str) -> Option<usize> {
        let canonical = std::fs::canonicalize(name)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| name.to_string());
        self.documents.iter().position(|d| d.filename() == canonical || d.filename() == name)
    }

    /// Focuses an already-open document bound to `path`, or loads it.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Document` if the file exists but cannot be
    /// read.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        if let Some(idx) = self.find_by_path(&path_str) {
            self.current = Some(idx);
            return Ok(());
        }

        let doc = Document::open(path)?;
        self.insert_after_current(doc);
        Ok(())
    }

    /// Ingests standard input as a new document named `"<stdin>"`.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Document` if reading stdin fails.
    pub fn open_from_stdin(&mut self) -> Result<()> {
        let doc = Document::from_stdin()?;
        self.insert_after_current(doc);
        Ok(())
    }

    /// `true` if the current document has unsaved changes and closing (or
    /// quitting) should prompt for confirmation first.
    #[must_use]
    pub fn save_confirm_needed(&self) -> bool {
        self.current().is_some_and(Document::is_dirty)
    }

    /// Closes the document at `idx`. If the ring becomes empty, a fresh
    /// untitled document is created so `current` is always defined while
    /// the editor runs.
    pub fn close(&mut self, idx: usize) {
        if idx >= self.documents.len() {
            return;
        }
        self.documents.remove(idx);

        if self.documents.is_empty() {
            self.current = None;
            self.create_document();
            return;
        }

        self.current = Some(idx.min(self.documents.len() - 1));
    }

    /// Closes the current document (see `close`).
    pub fn close_current(&mut self) {
        if let Some(idx) = self.current {
            self.close(idx);
        }
    }

    pub fn next_file(&mut self) {
        if let Some(idx) = self.current {
            self.current = Some((idx + 1) % self.documents.len());
        }
    }

    pub fn prev_file(&mut self) {
        if let Some(idx) = self.current {
            self.current = Some((idx + self.documents.len() - 1) % self.documents.len());
        }
    }

    // -- Clipboard (spec §4.4) -------------------------------------------

    /// # Errors
    ///
    /// Returns `WorkspaceError::NoCurrentDocument` if no document is open.
    pub fn copy(&mut self) -> Result<()> {
        let doc = self.current().ok_or(WorkspaceError::NoCurrentDocument)?;
        if let Some((start, end)) = doc.selection_range() {
            self.clipboard = doc.bytes_in_range(start, end);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `WorkspaceError::Document` on buffer growth failure, or
    /// `NoCurrentDocument` if no document is open.
    pub fn cut(&mut self, viewport: &Viewport) -> Result<()> {
        let idx = self.current_index()?;
        let doc = &mut self.documents[idx];
        if let Some((start, end)) = doc.selection_range() {
            self.clipboard = doc.bytes_in_range(start, end);
            doc.erase_selection(viewport)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `WorkspaceError::Document` on buffer growth failure, or
    /// `NoCurrentDocument` if no document is open.
    pub fn paste(&mut self, viewport: &Viewport) -> Result<()> {
        let idx = self.current_index()?;
        if self.clipboard.is_empty() {
            return Ok(());
        }
        self.documents[idx].insert_bytes(&self.clipboard, viewport)?;
        Ok(())
    }

    // -- Search (spec §4.3) -----------------------------------------------

    /// `next == false` stores a freshly supplied `needle` for reuse by
    /// later `next == true` calls. Returns `true` on a hit.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Document` on close-gap growth failure, or
    /// `NoCurrentDocument` if no document is open.
    pub fn find_text(&mut self, needle: Option<&[u8]>, viewport: &Viewport) -> Result<bool> {
        if let Some(n) = needle {
            self.search = Some(n.to_vec());
        }
        let Some(needle) = self.search.clone() else {
            return Ok(false);
        };
        let idx = self.current_index()?;
        let found = self.documents[idx].find_text(&needle, viewport)?;
        if !found {
            log::debug!("search for {:?} missed", String::from_utf8_lossy(&needle));
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp() -> Viewport {
        Viewport { cols: 80, lines: 24 }
    }

    #[test]
    fn create_document_focuses_untitled() {
        let mut ws = Workspace::new();
        ws.create_document();
        assert_eq!(ws.current().unwrap().filename(), "Untitled-1");
        ws.create_document();
        assert_eq!(ws.current().unwrap().filename(), "Untitled-2");
        assert_eq!(ws.len(), 2);
    }

    #[test]
    fn ring_navigation_matches_spec_scenario() {
        let mut ws = Workspace::new();
        ws.create_document(); // A
        ws.create_document(); // B
        ws.create_document(); // C
        assert_eq!(ws.current().unwrap().filename(), "Untitled-3"); // C

        // Spec scenario (spec.md §8): A, B, C opened in that order, C
        // current; Shift-Tab -> A; Shift-Tab -> B; Ctrl-Tab -> A. Shift-Tab
        // is wired to `next_file`, Ctrl-Tab to `prev_file` (see `engine.rs`).
        ws.next_file();
        assert_eq!(ws.current().unwrap().filename(), "Untitled-1"); // A
        ws.next_file();
        assert_eq!(ws.current().unwrap().filename(), "Untitled-2"); // B
        ws.prev_file();
        assert_eq!(ws.current().unwrap().filename(), "Untitled-1"); // A
    }

    #[test]
    fn closing_last_document_creates_fresh_untitled() {
        let mut ws = Workspace::new();
        ws.create_document();
        ws.close_current();
        assert_eq!(ws.len(), 1);
        assert!(ws.current().is_some());
    }

    #[test]
    fn cut_then_paste_round_trips_through_clipboard() {
        let mut ws = Workspace::new();
        let v = vp();
        ws.create_document();
        ws.current_mut().unwrap().insert_bytes(b"hello world", &v).unwrap();
        ws.current_mut().unwrap().home(false, &v);
        for _ in 0..5 {
            ws.current_mut().unwrap().right(true, &v);
        }
        ws.cut(&v).unwrap();
        assert_eq!(ws.current().unwrap().contents(), b" world");

        ws.current_mut().unwrap().home(false, &v);
        ws.paste(&v).unwrap();
        assert_eq!(ws.current().unwrap().contents(), b"hello world");
    }

    #[test]
    fn find_text_reuses_stored_needle() {
        let mut ws = Workspace::new();
        let v = vp();
        ws.create_document();
        ws.current_mut().unwrap().insert_bytes(b"hello hello\n", &v).unwrap();
        ws.current_mut().unwrap().moveto(0, false, &v);

        assert!(ws.find_text(Some(b"hello"), &v).unwrap());
        assert!(ws.find_text(None, &v).unwrap());
        assert!(!ws.find_text(None, &v).unwrap());
    }

    #[test]
    fn save_confirm_needed_tracks_dirty_flag() {
        let mut ws = Workspace::new();
        let v = vp();
        ws.create_document();
        assert!(!ws.save_confirm_needed());
        ws.current_mut().unwrap().insert_char(b'x', &v).unwrap();
        assert!(ws.save_confirm_needed());
    }
}
