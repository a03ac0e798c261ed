use crate::error::Result;
use crate::row::Row;
use std::cmp;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::slice;

// Contain both actual path sequence and display string
pub struct FilePath {
    pub path: PathBuf,
    pub display: String,
}

impl FilePath {
    fn from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        FilePath {
            path: PathBuf::from(path),
            display: path.to_string_lossy().to_string(),
        }
    }

    fn from_string<S: Into<String>>(s: S) -> Self {
        let display = s.into();
        FilePath {
            path: PathBuf::from(&display),
            display,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CursorDir {
    Left,
    Right,
    Up,
    Down,
}

pub struct Lines<'a>(slice::Iter<'a, Row>);

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|r| r.buffer())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.as_slice().len();
        (len, Some(len))
    }
}

// Splits file content into lines. "\n", "\r\n" and "\r" all terminate a line and the
// terminator at the end of content does not make an extra empty line.
pub fn split_lines(content: &[u8]) -> Vec<Row> {
    let mut rows = vec![];
    let mut start = 0;
    let mut i = 0;
    while i < content.len() {
        match content[i] {
            b'\n' => {
                rows.push(Row::new(&content[start..i]));
                start = i + 1;
            }
            b'\r' => {
                rows.push(Row::new(&content[start..i]));
                if content.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < content.len() {
        rows.push(Row::new(&content[start..]));
    }
    rows
}

pub struct TextBuffer {
    // (x, y) coordinate in internal text buffer of rows. x is a byte offset in the row and
    // y == row.len() means the virtual line after the last line
    cx: usize,
    cy: usize,
    // File editor is opening
    file: Option<FilePath>,
    // Lines of text buffer
    row: Vec<Row>,
    // Incremented on every modification. Non-zero means there are unsaved changes
    dirty: usize,
}

impl TextBuffer {
    pub fn empty() -> Self {
        Self {
            cx: 0,
            cy: 0,
            file: None,
            row: vec![],
            dirty: 0,
        }
    }

    pub fn with_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        Self {
            row: lines.into_iter().map(Row::new).collect(),
            ..Self::empty()
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let row = split_lines(&fs::read(path)?);
        log::debug!("Opened {:?} ({} lines)", path, row.len());
        Ok(Self {
            file: Some(FilePath::from(path)),
            row,
            ..Self::empty()
        })
    }

    pub fn insert_row<B: Into<Vec<u8>>>(&mut self, at: usize, line: B) {
        if at > self.row.len() {
            return;
        }
        self.row.insert(at, Row::new(line));
        self.dirty += 1;
    }

    pub fn delete_row(&mut self, at: usize) {
        if at >= self.row.len() {
            return;
        }
        self.row.remove(at);
        self.dirty += 1;
    }

    pub fn row_insert_char(&mut self, y: usize, x: usize, b: u8) {
        if let Some(row) = self.row.get_mut(y) {
            row.insert_char(x, b);
            self.dirty += 1;
        }
    }

    pub fn row_delete_char(&mut self, y: usize, x: usize) {
        if let Some(row) = self.row.get_mut(y) {
            if row.delete_char(x) {
                self.dirty += 1;
            }
        }
    }

    pub fn row_append(&mut self, y: usize, s: &[u8]) {
        if let Some(row) = self.row.get_mut(y) {
            row.append(s);
            self.dirty += 1;
        }
    }

    // Breaks line y at x. At head of line it only inserts an empty line above
    pub fn split_row(&mut self, y: usize, x: usize) {
        if x == 0 {
            self.insert_row(y, "");
        } else if let Some(row) = self.row.get_mut(y) {
            let suffix = row.split_off(x);
            self.insert_row(y + 1, suffix);
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let cap = self.row.iter().fold(0, |acc, row| acc + row.len() + 1);
        let mut buf = Vec::with_capacity(cap);
        for row in self.row.iter() {
            buf.extend_from_slice(row.buffer());
            buf.push(b'\n');
        }
        buf
    }

    pub fn insert_char(&mut self, b: u8) {
        if self.cy == self.row.len() {
            self.insert_row(self.cy, "");
        }
        self.row_insert_char(self.cy, self.cx, b);
        self.cx += 1;
    }

    pub fn insert_line(&mut self) {
        self.split_row(self.cy, self.cx);
        self.cy += 1;
        self.cx = 0;
    }

    pub fn delete_char(&mut self) {
        if self.cy == self.row.len() || self.cx == 0 && self.cy == 0 {
            return;
        }
        if self.cx > 0 {
            self.row_delete_char(self.cy, self.cx - 1);
            self.cx -= 1;
        } else {
            // At top of line, backspace concats current line to previous line
            let prev_len = self.row[self.cy - 1].len();
            let removed = self.row.remove(self.cy);
            self.dirty += 1;
            self.cy -= 1;
            self.cx = prev_len;
            self.row_append(self.cy, removed.buffer());
        }
    }

    pub fn delete_right_char(&mut self) {
        if self.cy == self.row.len() {
            return;
        }
        // Nothing follows the end of the last line
        if self.cy + 1 == self.row.len() && self.cx == self.row[self.cy].len() {
            return;
        }
        self.move_cursor_one(CursorDir::Right);
        self.delete_char();
    }

    pub fn move_cursor_one(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Up => self.cy = self.cy.saturating_sub(1),
            CursorDir::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    // When moving to left at top of line, move cursor to end of previous line
                    self.cy -= 1;
                    self.cx = self.row[self.cy].len();
                }
            }
            CursorDir::Down => {
                // Allow to move cursor until next line to the last line of file to enable to add a
                // new line at the end.
                if self.cy < self.row.len() {
                    self.cy += 1;
                }
            }
            CursorDir::Right => {
                if self.cy < self.row.len() {
                    let len = self.row[self.cy].len();
                    if self.cx < len {
                        // Allow to move cursor until next col to the last col of line to enable to
                        // add a new character at the end of line.
                        self.cx += 1;
                    } else {
                        // When moving to right at the end of line, move cursor to top of next line.
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
        };

        // Snap cursor to end of line when moving up/down from longer line
        let len = self.row.get(self.cy).map(Row::len).unwrap_or(0);
        if self.cx > len {
            self.cx = len;
        }
    }

    pub fn move_cursor_page(&mut self, dir: CursorDir, rowoff: usize, num_rows: usize) {
        self.cy = match dir {
            CursorDir::Up => rowoff, // Top of screen
            CursorDir::Down => {
                cmp::min(rowoff + num_rows.saturating_sub(1), self.row.len()) // Bottom of screen
            }
            CursorDir::Left | CursorDir::Right => return,
        };
        for _ in 0..num_rows {
            self.move_cursor_one(dir);
        }
    }

    pub fn move_cursor_to_line_edge(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Left => self.cx = 0,
            CursorDir::Right => {
                if self.cy < self.row.len() {
                    self.cx = self.row[self.cy].len();
                }
            }
            CursorDir::Up | CursorDir::Down => {}
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.row
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn filename(&self) -> &str {
        self.file
            .as_ref()
            .map(|f| f.display.as_str())
            .unwrap_or("[No Name]")
    }

    pub fn modified(&self) -> bool {
        self.dirty > 0
    }

    pub fn dirty(&self) -> usize {
        self.dirty
    }

    pub fn cx(&self) -> usize {
        self.cx
    }

    pub fn cy(&self) -> usize {
        self.cy
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cy = cmp::min(y, self.row.len());
        let len = self.row.get(self.cy).map(Row::len).unwrap_or(0);
        self.cx = cmp::min(x, len);
    }

    pub fn lines(&self) -> Lines<'_> {
        Lines(self.row.iter())
    }

    pub fn set_file<S: Into<String>>(&mut self, file_path: S) {
        self.file = Some(FilePath::from_string(file_path));
    }

    pub fn set_unnamed(&mut self) {
        self.file = None;
    }

    // Truncates the file and writes whole buffer. Returns message to show on success or failure
    pub fn save(&mut self) -> std::result::Result<String, String> {
        let file = if let Some(file) = &self.file {
            file
        } else {
            return Err("Save aborted".to_string());
        };

        let bytes = self.serialize();
        let written = File::create(&file.path).and_then(|mut f| {
            f.write_all(&bytes)?;
            f.flush()
        });

        match written {
            Ok(()) => {
                log::info!("{} bytes written to {:?}", bytes.len(), file.path);
                self.dirty = 0;
                Ok(format!("{} bytes written to {}", bytes.len(), &file.display))
            }
            Err(err) => {
                log::warn!("Could not save {:?}: {}", file.path, err);
                Err(format!("Can't save! I/O error: {}", err))
            }
        }
    }
}
