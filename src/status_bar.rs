use crate::text_buffer::TextBuffer;

#[derive(Default, Debug)]
pub struct StatusBar {
    pub modified: bool,
    pub filename: String,
    pub num_lines: usize,
    pub line: usize,
}

impl StatusBar {
    pub fn from_buffer(buf: &TextBuffer) -> Self {
        let mut sb = Self::default();
        sb.update_from_buf(buf);
        sb
    }

    pub fn left(&self) -> String {
        format!(
            "{:.20} - {} lines{}",
            self.filename,
            self.num_lines,
            if self.modified { " (modified)" } else { "" }
        )
    }

    pub fn right(&self) -> String {
        format!("{}/{}", self.line, self.num_lines)
    }

    pub fn update_from_buf(&mut self, buf: &TextBuffer) {
        self.modified = buf.modified();
        self.filename.clear();
        self.filename.push_str(buf.filename());
        self.num_lines = buf.rows().len();
        self.line = buf.cy() + 1;
    }
}
