use similar::{ChangeTag, TextDiff};

/// Line-based text buffer behind the file editor.
///
/// The text loaded from the backend is kept alongside the edited lines so the
/// commit prompt can report how much changed. Cursor columns count chars,
/// not bytes.
#[derive(Debug, Clone)]
pub struct EditorBuffer {
    original: String,
    lines: Vec<String>,
    row: usize,
    col: usize,
    scroll: usize,
    /// Topmost row changed since the last [`EditorBuffer::take_changed_from`].
    changed_from: Option<usize>,
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl EditorBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            original: text.to_string(),
            lines: split_lines(text),
            row: 0,
            col: 0,
            scroll: 0,
            changed_from: Some(0),
        }
    }

    /// Replace the whole buffer and forget earlier edits.
    pub fn set_text(&mut self, text: &str) {
        *self = Self::new(text);
    }

    /// Treat `text` as the new baseline for change tracking, keeping the
    /// edited lines and cursor.
    pub fn rebase(&mut self, text: &str) {
        self.original = text.to_string();
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Topmost row whose text changed since the previous call, if any. A
    /// freshly loaded buffer reports row 0.
    pub fn take_changed_from(&mut self) -> Option<usize> {
        self.changed_from.take()
    }

    pub fn is_modified(&self) -> bool {
        self.text() != self.original
    }

    /// Lines added and removed relative to the loaded text.
    pub fn line_changes(&self) -> (usize, usize) {
        let current = self.text();
        let diff = TextDiff::from_lines(self.original.as_str(), current.as_str());
        diff.iter_all_changes()
            .fold((0, 0), |(added, removed), change| match change.tag() {
                ChangeTag::Insert => (added + 1, removed),
                ChangeTag::Delete => (added, removed + 1),
                ChangeTag::Equal => (added, removed),
            })
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.newline();
            return;
        }
        let at = self.byte_col();
        self.mark_changed(self.row);
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    /// Insert pasted text; CRLF line endings are normalised.
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\r') {
            self.insert_char(c);
        }
    }

    pub fn newline(&mut self) {
        self.mark_changed(self.row);
        let at = self.byte_col();
        let rest = self.lines[self.row].split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            self.mark_changed(self.row);
            self.col -= 1;
            let at = self.byte_col();
            self.lines[self.row].remove(at);
        } else if self.row > 0 {
            self.mark_changed(self.row - 1);
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.lines[self.row].chars().count();
            self.lines[self.row].push_str(&line);
        }
    }

    pub fn delete(&mut self) {
        if self.col < self.line_len() || self.row + 1 < self.lines.len() {
            self.mark_changed(self.row);
        }
        if self.col < self.line_len() {
            let at = self.byte_col();
            self.lines[self.row].remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len();
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len() {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self, count: usize) {
        self.row = self.row.saturating_sub(count);
        self.clamp_col();
    }

    pub fn move_down(&mut self, count: usize) {
        self.row = (self.row + count).min(self.lines.len() - 1);
        self.clamp_col();
    }

    pub fn line_start(&mut self) {
        self.col = 0;
    }

    pub fn line_end(&mut self) {
        self.col = self.line_len();
    }

    pub fn buffer_start(&mut self) {
        self.row = 0;
        self.col = 0;
    }

    pub fn buffer_end(&mut self) {
        self.row = self.lines.len() - 1;
        self.col = self.line_len();
    }

    /// Keep the cursor row inside a viewport of `height` lines.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + height {
            self.scroll = self.row + 1 - height;
        }
    }

    fn mark_changed(&mut self, row: usize) {
        self.changed_from = Some(self.changed_from.map_or(row, |from| from.min(row)));
    }

    fn line_len(&self) -> usize {
        self.lines[self.row].chars().count()
    }

    fn clamp_col(&mut self) {
        self.col = self.col.min(self.line_len());
    }

    fn byte_col(&self) -> usize {
        let line = &self.lines[self.row];
        line.char_indices()
            .nth(self.col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }
}

// Always at least one line so the cursor has somewhere to be
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}
