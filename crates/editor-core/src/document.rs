//! A single open buffer: gap-buffer storage plus cursor, scroll, selection
//! and undo state, and the editing/navigation operations that keep them
//! consistent.

use std::path::Path;

use crate::errors::DocumentError;
use crate::gap_buffer::{GapBuffer, Position};
use crate::undo::UndoLog;

/// Tabs expand to the next multiple of this many visual columns.
pub const TAB_SIZE: usize = 8;

/// Horizontal scroll granularity, in visual columns.
pub const SCROLL_STEP: usize = 4;

/// The visible screen area, as known to the caller (cached by the
/// workspace from the terminal's last-queried window size). `Document`
/// never queries this itself; it is threaded through every operation that
/// needs to decide whether to scroll.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub cols: usize,
    pub lines: usize,
}

#[derive(Debug)]
pub struct Document {
    buf: GapBuffer,
    log: UndoLog,

    line_pos: Position,
    col: usize,
    line: usize,
    last_col: usize,

    top_pos: Position,
    top_line: usize,
    margin: usize,

    anchor: Option<Position>,
    dirty: bool,
    new_file: bool,
    filename: String,
    path_is_synthetic: bool,

    /// Suppresses undo recording while an undo/redo record is being replayed.
    replaying: bool,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

impl Document {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            buf: GapBuffer::new(),
            log: UndoLog::new(),
            line_pos: 0,
            col: 0,
            line: 0,
            last_col: 0,
            top_pos: 0,
            top_line: 0,
            margin: 0,
            anchor: None,
            dirty: false,
            new_file: true,
            filename: name.into(),
            path_is_synthetic: true,
            replaying: false,
        }
    }

    /// Loads a file from disk. A missing file is not an error: it yields a
    /// fresh, unsaved document bound to that literal path (spec §6).
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Io` if the file exists but cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();

        match io::MmapFile::open(path) {
            Ok(mapped) => {
                let filename = canonical_display(path);
                Ok(Self {
                    buf: GapBuffer::from_bytes(mapped.as_slice()),
                    filename,
                    path_is_synthetic: false,
                    new_file: false,
                    ..Self::new(String::new())
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("{} does not exist yet, opening as new file", path.display());
                Ok(Self {
                    filename: path.display().to_string(),
                    path_is_synthetic: false,
                    ..Self::new(String::new())
                })
            }
            Err(e) => Err(DocumentError::Io(e)),
        }
    }

    /// Ingests all of standard input into an unsaved, clean document named
    /// `"<stdin>"`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Io` if reading stdin fails.
    pub fn from_stdin() -> Result<Self, DocumentError> {
        use std::io::Read;

        let mut data = Vec::new();
        std::io::stdin().read_to_end(&mut data)?;

        Ok(Self {
            buf: GapBuffer::from_bytes(&data),
            dirty: false,
            ..Self::new("<stdin>")
        })
    }

    /// Writes the buffer's full contents atomically to `self.filename`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Io` if the write fails.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        io::write_atomic(Path::new(&self.filename), std::iter::once(self.buf.to_vec()))?;
        self.dirty = false;
        self.log.clear();
        self.new_file = false;
        Ok(())
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
        self.path_is_synthetic = false;
    }

    #[must_use]
    pub fn is_path_synthetic(&self) -> bool {
        self.path_is_synthetic
    }

    #[must_use]
    pub fn is_new_file(&self) -> bool {
        self.new_file
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.line_pos + self.col
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.buf.length()
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }

    #[must_use]
    pub fn line_pos(&self) -> Position {
        self.line_pos
    }

    #[must_use]
    pub fn top_line(&self) -> usize {
        self.top_line
    }

    #[must_use]
    pub fn top_pos(&self) -> Position {
        self.top_pos
    }

    #[must_use]
    pub fn margin(&self) -> usize {
        self.margin
    }

    #[must_use]
    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.buf.to_vec()
    }

    fn byte_at(&self, pos: Position) -> u8 {
        self.buf.get(pos).unwrap_or(0)
    }

    fn read_range(&self, pos: Position, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        let got = self.buf.copy_out(&mut out, pos, n);
        out.truncate(got);
        out
    }

    /// Bytes of the line starting at `line_pos`, excluding any terminator.
    /// Intended for the renderer.
    #[must_use]
    pub fn line_bytes(&self, line_pos: Position) -> Vec<u8> {
        self.read_range(line_pos, self.line_length(line_pos))
    }

    /// Bytes in `[start, end)`. Intended for clipboard copy/cut.
    #[must_use]
    pub fn bytes_in_range(&self, start: Position, end: Position) -> Vec<u8> {
        self.read_range(start, end.saturating_sub(start))
    }

    /// Inserts `bytes` at the current position as a single undoable edit,
    /// erasing any active selection first. Used for clipboard paste.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::OutOfMemory` if the buffer cannot grow.
    pub fn insert_bytes(&mut self, bytes: &[u8], viewport: &Viewport) -> Result<(), DocumentError> {
        self.erase_selection(viewport)?;
        let pos = self.position();
        self.apply_edit(pos, 0, bytes)?;
        self.moveto(pos + bytes.len(), false, viewport);
        self.last_col = self.col;
        Ok(())
    }

    // -- Positional helpers (spec §4.3) --------------------------------

    #[must_use]
    pub fn line_length(&self, line_pos: Position) -> usize {
        let len = self.length();
        let mut i = line_pos;
        while i < len {
            let b = self.byte_at(i);
            if b == b'\n' || b == b'\r' {
                break;
            }
            i += 1;
        }
        i - line_pos
    }

    #[must_use]
    pub fn line_start(&self, pos: Position) -> Position {
        let mut p = pos;
        while p > 0 && self.byte_at(p - 1) != b'\n' {
            p -= 1;
        }
        p
    }

    #[must_use]
    pub fn next_line(&self, pos: Position) -> Option<Position> {
        let len = self.length();
        let mut i = pos;
        while i < len {
            if self.byte_at(i) == b'\n' {
                return Some(i + 1);
            }
            i += 1;
        }
        None
    }

    #[must_use]
    pub fn prev_line(&self, pos: Position) -> Option<Position> {
        if pos == 0 {
            return None;
        }
        let start = self.line_start(pos);
        if start == 0 {
            return None;
        }
        Some(self.line_start(start - 1))
    }

    #[must_use]
    pub fn visual_column(&self, line_pos: Position, col: usize) -> usize {
        let mut vcol = 0;
        for i in 0..col {
            if self.byte_at(line_pos + i) == b'\t' {
                vcol = (vcol / TAB_SIZE + 1) * TAB_SIZE;
            } else {
                vcol += 1;
            }
        }
        vcol
    }

    fn line_pos_offset_by(&self, pos: Position, mut delta: i64) -> Position {
        let mut p = pos;
        while delta > 0 {
            match self.next_line(p) {
                Some(n) => {
                    p = n;
                    delta -= 1;
                }
                None => break,
            }
        }
        while delta < 0 {
            match self.prev_line(p) {
                Some(prev) => {
                    p = prev;
                    delta += 1;
                }
                None => break,
            }
        }
        p
    }

    /// The general cursor reconciler: walks `(line_pos, line, col)` to
    /// `target`, scrolling the viewport (and recentering, if `center` and
    /// any scrolling occurred) as needed.
    pub fn moveto(&mut self, target: Position, center: bool, viewport: &Viewport) {
        let target = target.min(self.length());
        let mut scrolled = false;

        while target < self.line_pos {
            match self.prev_line(self.line_pos) {
                Some(p) => {
                    self.line_pos = p;
                    self.line -= 1;
                }
                None => {
                    self.line_pos = 0;
                    self.line = 0;
                    break;
                }
            }
        }
        while target > self.line_pos + self.line_length(self.line_pos) {
            match self.next_line(self.line_pos) {
                Some(n) => {
                    self.line_pos = n;
                    self.line += 1;
                }
                None => break,
            }
        }
        self.col = target - self.line_pos;

        if self.line < self.top_line {
            self.top_line = self.line;
            self.top_pos = self.line_pos;
            scrolled = true;
        } else if viewport.lines > 0 && self.line >= self.top_line + viewport.lines {
            let back = viewport.lines - 1;
            self.top_pos = self.line_pos_offset_by(self.line_pos, -(back as i64));
            self.top_line = self.line - back;
            scrolled = true;
        }

        if center && scrolled {
            self.recenter(viewport);
        }
    }

    fn recenter(&mut self, viewport: &Viewport) {
        let half = viewport.lines / 2;
        let back = self.line.min(half);
        self.top_pos = self.line_pos_offset_by(self.line_pos, -(back as i64));
        self.top_line = self.line - back;
    }

    /// Clamps `col` to the current line's length using `last_col` as the
    /// remembered goal column, then scrolls the horizontal margin in steps
    /// of `SCROLL_STEP` so the visual cursor stays in view.
    pub fn adjust(&mut self, viewport: &Viewport) {
        self.col = self.last_col.min(self.line_length(self.line_pos));
        let vcol = self.visual_column(self.line_pos, self.col);

        while self.margin > 0 && vcol < self.margin {
            self.margin = self.margin.saturating_sub(SCROLL_STEP);
        }
        if viewport.cols > 0 {
            while vcol >= self.margin + viewport.cols {
                self.margin += SCROLL_STEP;
            }
        }
    }

    // -- Selection (spec §4.3) -----------------------------------------

    pub fn update_selection(&mut self, select: bool) {
        if select {
            if self.anchor.is_none() {
                self.anchor = Some(self.position());
            }
        } else {
            self.anchor = None;
        }
    }

    #[must_use]
    pub fn selection_range(&self) -> Option<(Position, Position)> {
        let anchor = self.anchor?;
        let pos = self.position();
        if anchor == pos {
            return None;
        }
        Some(if anchor < pos { (anchor, pos) } else { (pos, anchor) })
    }

    pub fn select_all(&mut self, viewport: &Viewport) {
        self.anchor = Some(0);
        self.moveto(self.length(), false, viewport);
        self.last_col = self.col;
    }

    /// If a selection exists, erases it and clears the anchor, returning
    /// `true`. Otherwise returns `false` with no side effect.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::OutOfMemory` if the underlying erase fails.
    pub fn erase_selection(&mut self, viewport: &Viewport) -> Result<bool, DocumentError> {
        let Some((start, end)) = self.selection_range() else {
            return Ok(false);
        };
        self.moveto(start, false, viewport);
        self.apply_edit(start, end - start, &[])?;
        self.anchor = None;
        self.moveto(start, false, viewport);
        Ok(true)
    }

    // -- Editing primitives (spec §4.3) ---------------------------------

    fn apply_edit(&mut self, pos: Position, erase_n: usize, insert: &[u8]) -> Result<(), DocumentError> {
        let erased = self.read_range(pos, erase_n);
        self.buf.replace(pos, erase_n, insert)?;
        if !self.replaying {
            self.log.record(pos, &erased, insert);
        }
        self.dirty = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DocumentError::OutOfMemory` if the buffer cannot grow.
    pub fn insert_char(&mut self, byte: u8, viewport: &Viewport) -> Result<(), DocumentError> {
        self.erase_selection(viewport)?;
        let pos = self.position();
        self.apply_edit(pos, 0, &[byte])?;
        self.col += 1;
        self.last_col = self.col;
        self.adjust(viewport);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DocumentError::OutOfMemory` if the buffer cannot grow.
    pub fn newline(&mut self, viewport: &Viewport) -> Result<(), DocumentError> {
        self.erase_selection(viewport)?;
        let pos = self.position();
        self.apply_edit(pos, 0, b"\n")?;
        self.moveto(pos + 1, false, viewport);
        self.last_col = self.col;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DocumentError::OutOfMemory` if the buffer cannot grow.
    pub fn backspace(&mut self, viewport: &Viewport) -> Result<(), DocumentError> {
        if self.erase_selection(viewport)? {
            return Ok(());
        }

        if self.col == 0 {
            if self.line_pos == 0 {
                return Ok(());
            }
            let nl_pos = self.line_pos - 1;
            let has_cr = nl_pos > 0 && self.byte_at(nl_pos - 1) == b'\r';
            let erase_from = if has_cr { nl_pos - 1 } else { nl_pos };
            let erase_n = nl_pos - erase_from + 1;
            self.apply_edit(erase_from, erase_n, &[])?;
            self.moveto(erase_from, false, viewport);
        } else {
            let at = self.line_pos + self.col - 1;
            self.apply_edit(at, 1, &[])?;
            self.moveto(at, false, viewport);
        }
        self.last_col = self.col;
        self.adjust(viewport);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DocumentError::OutOfMemory` if the buffer cannot grow.
    pub fn del(&mut self, viewport: &Viewport) -> Result<(), DocumentError> {
        if self.erase_selection(viewport)? {
            return Ok(());
        }

        let pos = self.position();
        if pos >= self.length() {
            return Ok(());
        }
        let erase_n = if self.byte_at(pos) == b'\r' && self.byte_at(pos + 1) == b'\n' {
            2
        } else {
            1
        };
        self.apply_edit(pos, erase_n, &[])?;
        self.moveto(pos, false, viewport);
        self.adjust(viewport);
        Ok(())
    }

    // -- Navigation (spec §4.3) ------------------------------------------

    pub fn up(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        if let Some(p) = self.prev_line(self.line_pos) {
            self.moveto(p, false, viewport);
        }
        self.adjust(viewport);
    }

    pub fn down(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        if let Some(n) = self.next_line(self.line_pos) {
            self.moveto(n, false, viewport);
        }
        self.adjust(viewport);
    }

    pub fn left(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        let pos = self.position();
        if pos == 0 {
            return;
        }
        self.moveto(pos - 1, false, viewport);
        self.last_col = self.col;
        self.adjust(viewport);
    }

    pub fn right(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        let pos = self.position();
        if pos >= self.length() {
            return;
        }
        self.moveto(pos + 1, false, viewport);
        self.last_col = self.col;
        self.adjust(viewport);
    }

    pub fn home(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        self.moveto(self.line_pos, false, viewport);
        self.last_col = 0;
        self.adjust(viewport);
    }

    pub fn end(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        let target = self.line_pos + self.line_length(self.line_pos);
        self.moveto(target, false, viewport);
        self.last_col = self.col;
        self.adjust(viewport);
    }

    pub fn goto_document_start(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        self.moveto(0, false, viewport);
        self.last_col = 0;
        self.adjust(viewport);
    }

    pub fn goto_document_end(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        self.moveto(self.length(), false, viewport);
        self.last_col = self.col;
        self.adjust(viewport);
    }

    fn word_left_target(&self) -> Position {
        let mut pos = self.position();
        while pos > 0 && !is_word_byte(self.byte_at(pos - 1)) {
            pos -= 1;
        }
        while pos > 0 && is_word_byte(self.byte_at(pos - 1)) {
            pos -= 1;
        }
        pos
    }

    fn word_right_target(&self) -> Position {
        let len = self.length();
        let mut pos = self.position();
        while pos < len && !is_word_byte(self.byte_at(pos)) {
            pos += 1;
        }
        while pos < len && is_word_byte(self.byte_at(pos)) {
            pos += 1;
        }
        pos
    }

    pub fn word_left(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        let target = self.word_left_target();
        self.moveto(target, false, viewport);
        self.last_col = self.col;
        self.adjust(viewport);
    }

    pub fn word_right(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        let target = self.word_right_target();
        self.moveto(target, false, viewport);
        self.last_col = self.col;
        self.adjust(viewport);
    }

    pub fn page_up(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        let step = viewport.lines.max(1) as i64;
        let target = self.line_pos_offset_by(self.line_pos, -step);
        self.moveto(target, false, viewport);
        self.adjust(viewport);
    }

    /// Moves to the start of zero-based `target_line`, clamping to the
    /// last line if the document is shorter.
    pub fn goto_line(&mut self, target_line: usize, viewport: &Viewport) {
        let target_pos = if target_line >= self.line {
            self.line_pos_offset_by(self.line_pos, (target_line - self.line) as i64)
        } else {
            self.line_pos_offset_by(self.line_pos, -((self.line - target_line) as i64))
        };
        self.moveto(target_pos, true, viewport);
        self.last_col = 0;
        self.adjust(viewport);
    }

    pub fn page_down(&mut self, select: bool, viewport: &Viewport) {
        self.update_selection(select);
        let step = viewport.lines.max(1) as i64;
        let target = self.line_pos_offset_by(self.line_pos, step);
        self.moveto(target, false, viewport);
        self.adjust(viewport);
    }

    // -- Undo / redo (spec §4.2, §4.3) -----------------------------------

    /// # Errors
    ///
    /// Returns `DocumentError::OutOfMemory` if replaying the inverse edit
    /// fails to grow the buffer (should not normally occur, since the
    /// inverse of a recorded edit never needs more room than was freed).
    pub fn undo(&mut self, viewport: &Viewport) -> Result<bool, DocumentError> {
        let Some(record) = self.log.undo() else {
            return Ok(false);
        };
        self.replaying = true;
        let result = self.buf.replace(record.pos, record.inserted_bytes(), &record.undo_payload);
        self.replaying = false;
        result?;

        self.anchor = None;
        self.moveto(record.pos, false, viewport);
        self.dirty = !self.log.at_baseline();
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `DocumentError::OutOfMemory` if replaying the forward edit
    /// fails to grow the buffer.
    pub fn redo(&mut self, viewport: &Viewport) -> Result<bool, DocumentError> {
        let Some(record) = self.log.redo() else {
            return Ok(false);
        };
        self.replaying = true;
        let result = self.buf.replace(record.pos, record.erased_bytes(), &record.redo_payload);
        self.replaying = false;
        result?;

        self.anchor = None;
        self.moveto(record.pos, false, viewport);
        self.dirty = true;
        Ok(true)
    }

    // -- Search (spec §4.3) ----------------------------------------------

    /// Byte-exact forward substring search from the current position.
    /// On a hit, sets the anchor to the match start, moves the cursor to
    /// the match end, and centers the viewport; returns `true`. On a miss,
    /// leaves state unchanged and returns `false` (the caller emits BEL).
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::OutOfMemory` if closing the gap fails.
    pub fn find_text(&mut self, needle: &[u8], viewport: &Viewport) -> Result<bool, DocumentError> {
        if needle.is_empty() {
            return Ok(false);
        }
        self.buf.close_gap()?;
        let hay = self.buf.contiguous_prefix();
        let start = self.position().min(hay.len());

        match memchr::memmem::find(&hay[start..], needle) {
            Some(rel) => {
                let match_start = start + rel;
                let match_end = match_start + needle.len();
                self.anchor = Some(match_start);
                self.moveto(match_end, true, viewport);
                self.last_col = self.col;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // -- Jump to file under cursor (spec §4.3) ---------------------------

    /// Extracts a filename (and optional `:LINE` suffix) from the current
    /// selection, or, with no selection, from the bytes surrounding the
    /// cursor up to the first stop character.
    #[must_use]
    pub fn filename_under_cursor(&self) -> (String, Option<u64>) {
        if let Some((start, end)) = self.selection_range() {
            let bytes = self.read_range(start, end - start);
            return (String::from_utf8_lossy(&bytes).into_owned(), None);
        }

        let is_stop = |b: u8| b.is_ascii_whitespace() || br#"!@"'#%&()[]{}*?+:;"#.contains(&b);

        let len = self.length();
        let mut start = self.position();
        while start > 0 && !is_stop(self.byte_at(start - 1)) {
            start -= 1;
        }
        let mut end = self.position();
        while end < len && !is_stop(self.byte_at(end)) {
            end += 1;
        }

        let name = String::from_utf8_lossy(&self.read_range(start, end - start)).into_owned();

        let mut line_no = None;
        if end < len && self.byte_at(end) == b':' {
            let mut digit_end = end + 1;
            while digit_end < len && self.byte_at(digit_end).is_ascii_digit() {
                digit_end += 1;
            }
            if digit_end > end + 1 {
                let digits = self.read_range(end + 1, digit_end - end - 1);
                if let Ok(text) = std::str::from_utf8(&digits) {
                    line_no = text.parse::<u64>().ok();
                }
            }
        }

        (name, line_no)
    }

    // -- Pipe-through-shell (spec §1/§4.5/§6, supplemented) --------------

    /// Pipes the current selection (or, with none, the whole document)
    /// through `sh -c <shell_cmd>` and replaces the input range with the
    /// captured stdout, as a single undoable edit.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Io` if the shell cannot be spawned, I/O to
    /// the child fails, or the child exits with a non-zero status. The
    /// buffer is left unchanged in that case.
    pub fn pipe_command(&mut self, shell_cmd: &str, viewport: &Viewport) -> Result<(), DocumentError> {
        use std::io::Write as _;
        use std::process::{Command, Stdio};

        let (start, end, input) = match self.selection_range() {
            Some((s, e)) => (s, e, self.read_range(s, e - s)),
            None => (0, self.length(), self.contents()),
        };

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(shell_cmd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;

        child
            .stdin
            .take()
            .expect("child spawned with piped stdin")
            .write_all(&input)?;

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(DocumentError::Io(std::io::Error::other(format!(
                "command exited with status {}",
                output.status
            ))));
        }

        self.anchor = None;
        self.apply_edit(start, end - start, &output.stdout)?;
        self.moveto(start + output.stdout.len(), false, viewport);
        Ok(())
    }
}

fn canonical_display(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp() -> Viewport {
        Viewport { cols: 80, lines: 24 }
    }

    #[test]
    fn type_abc_then_backspace_twice() {
        let mut doc = Document::new("Untitled-1");
        let v = vp();
        doc.insert_char(b'a', &v).unwrap();
        doc.insert_char(b'b', &v).unwrap();
        doc.insert_char(b'c', &v).unwrap();
        doc.backspace(&v).unwrap();
        doc.backspace(&v).unwrap();

        assert_eq!(doc.contents(), b"a");
        assert_eq!(doc.col(), 1);

        // Two coalesced records: the insertion, then the erase.
        assert!(doc.undo(&v).unwrap());
        assert_eq!(doc.contents(), b"");
        assert!(doc.redo(&v).unwrap());
        assert_eq!(doc.contents(), b"a");
        assert!(doc.undo(&v).unwrap());
        assert!(doc.undo(&v).unwrap());
        assert_eq!(doc.contents(), b"abc");
        assert!(!doc.undo(&v).unwrap());
    }

    #[test]
    fn backspace_at_line_start_merges_lines() {
        let mut doc = Document { buf: GapBuffer::from_bytes(b"foo\nbar\n"), ..Document::new("t") };
        let v = vp();
        let start_of_line1 = doc.next_line(0).unwrap();
        doc.moveto(start_of_line1, false, &v);
        doc.backspace(&v).unwrap();

        assert_eq!(doc.contents(), b"foobar\n");
        assert_eq!(doc.line(), 0);
        assert_eq!(doc.col(), 3);
    }

    #[test]
    fn delete_erases_crlf_atomically() {
        let mut doc = Document { buf: GapBuffer::from_bytes(b"x\r\ny\n"), ..Document::new("t") };
        let v = vp();
        doc.moveto(1, false, &v);
        doc.del(&v).unwrap();

        assert_eq!(doc.contents(), b"xy\n");
    }

    #[test]
    fn find_text_walks_successive_matches_then_misses() {
        let mut doc = Document { buf: GapBuffer::from_bytes(b"hello hello\n"), ..Document::new("t") };
        let v = vp();

        assert!(doc.find_text(b"hello", &v).unwrap());
        assert_eq!(doc.anchor(), Some(0));
        assert_eq!(doc.position(), 5);

        assert!(doc.find_text(b"hello", &v).unwrap());
        assert_eq!(doc.anchor(), Some(6));
        assert_eq!(doc.position(), 11);

        assert!(!doc.find_text(b"hello", &v).unwrap());
        assert_eq!(doc.position(), 11);
    }

    #[test]
    fn tab_expands_to_next_multiple_of_eight() {
        let doc = Document { buf: GapBuffer::from_bytes(b"\tX"), ..Document::new("t") };
        assert_eq!(doc.visual_column(0, 2), 9);
    }

    #[test]
    fn backspace_at_position_zero_is_noop() {
        let mut doc = Document::new("t");
        let v = vp();
        doc.backspace(&v).unwrap();
        assert_eq!(doc.contents(), b"");
        assert_eq!(doc.position(), 0);
    }

    #[test]
    fn delete_at_end_of_file_is_noop() {
        let mut doc = Document { buf: GapBuffer::from_bytes(b"abc"), ..Document::new("t") };
        let v = vp();
        doc.moveto(3, false, &v);
        doc.del(&v).unwrap();
        assert_eq!(doc.contents(), b"abc");
    }

    #[test]
    fn up_at_top_and_down_past_bottom_are_noops() {
        let mut doc = Document { buf: GapBuffer::from_bytes(b"abc"), ..Document::new("t") };
        let v = vp();
        doc.up(false, &v);
        assert_eq!(doc.position(), 0);
        doc.down(false, &v);
        assert_eq!(doc.position(), 0);
    }

    #[test]
    fn selection_erase_then_insert() {
        let mut doc = Document { buf: GapBuffer::from_bytes(b"hello world"), ..Document::new("t") };
        let v = vp();
        doc.moveto(0, false, &v);
        doc.right(true, &v);
        doc.right(true, &v);
        doc.right(true, &v);
        doc.right(true, &v);
        doc.right(true, &v);
        assert_eq!(doc.selection_range(), Some((0, 5)));
        doc.insert_char(b'X', &v).unwrap();
        assert_eq!(doc.contents(), b"X world");
    }

    #[test]
    fn word_motion_skips_punctuation_and_words() {
        let mut doc = Document { buf: GapBuffer::from_bytes(b"foo, bar"), ..Document::new("t") };
        let v = vp();
        doc.moveto(0, false, &v);
        doc.word_right(false, &v);
        assert_eq!(doc.position(), 3);
        doc.word_right(false, &v);
        assert_eq!(doc.position(), 8);
        doc.word_left(false, &v);
        assert_eq!(doc.position(), 5);
    }

    #[test]
    fn filename_under_cursor_parses_line_suffix() {
        let doc = Document { buf: GapBuffer::from_bytes(b"see src/main.rs:42 for detail"), ..Document::new("t") };
        let (name, line) = doc.filename_under_cursor();
        assert_eq!(name, "see");
        assert_eq!(line, None);
    }

    #[test]
    fn pipe_command_replaces_whole_document() {
        let mut doc = Document { buf: GapBuffer::from_bytes(b"hello\n"), ..Document::new("t") };
        let v = vp();
        doc.pipe_command("tr a-z A-Z", &v).unwrap();
        assert_eq!(doc.contents(), b"HELLO\n");
        assert!(doc.is_dirty());
    }

    #[test]
    fn save_clears_dirty_and_undo_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut doc = Document::new(path.display().to_string());
        let v = vp();
        doc.insert_char(b'a', &v).unwrap();
        doc.save().unwrap();

        assert!(!doc.is_dirty());
        assert!(!doc.undo(&v).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), b"a");
    }

    #[test]
    fn open_missing_file_yields_unsaved_document_bound_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.txt");
        let doc = Document::open(&path).unwrap();

        assert_eq!(doc.filename(), path.display().to_string());
        assert!(doc.is_new_file());
        assert_eq!(doc.length(), 0);
    }

    #[test]
    fn open_existing_file_loads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("existing.txt");
        std::fs::write(&path, b"preloaded").unwrap();

        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.contents(), b"preloaded");
        assert!(!doc.is_new_file());
        assert!(!doc.is_path_synthetic());
    }
}
