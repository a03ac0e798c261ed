use crate::error::Result;
use crate::input::{InputSeq, KeySeq};
use crate::prompt::{Prompt, PromptResult};
use crate::screen::Screen;
use crate::status_bar::StatusBar;
use crate::text_buffer::{CursorDir, Lines, TextBuffer};
use std::io::Write;
use std::path::Path;

// Number of Ctrl-Q presses in a row to quit without saving
const QUIT_TIMES: usize = 3;

pub struct Editor<I: Iterator<Item = Result<InputSeq>>, W: Write> {
    input: I, // Escape sequences stream represented as Iterator
    quit_times: usize,
    screen: Screen<W>,
    buf: TextBuffer,
    status_bar: StatusBar,
}

impl<I, W> Editor<I, W>
where
    I: Iterator<Item = Result<InputSeq>>,
    W: Write,
{
    fn with_buf(
        buf: TextBuffer,
        input: I,
        output: W,
        window_size: (usize, usize),
    ) -> Result<Editor<I, W>> {
        let screen = Screen::new(window_size, output)?;
        let status_bar = StatusBar::from_buffer(&buf);
        Ok(Editor {
            input,
            quit_times: QUIT_TIMES,
            screen,
            buf,
            status_bar,
        })
    }

    pub fn new(input: I, output: W, window_size: (usize, usize)) -> Result<Editor<I, W>> {
        Self::with_buf(TextBuffer::empty(), input, output, window_size)
    }

    pub fn with_lines<L, S>(
        lines: L,
        input: I,
        output: W,
        window_size: (usize, usize),
    ) -> Result<Editor<I, W>>
    where
        L: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        Self::with_buf(TextBuffer::with_lines(lines), input, output, window_size)
    }

    pub fn open<P: AsRef<Path>>(
        input: I,
        output: W,
        window_size: (usize, usize),
        path: P,
    ) -> Result<Editor<I, W>> {
        Self::with_buf(TextBuffer::open(path)?, input, output, window_size)
    }

    pub fn buf(&self) -> &TextBuffer {
        &self.buf
    }

    fn render_screen(&mut self) -> Result<()> {
        self.status_bar.update_from_buf(&self.buf);
        self.screen.render(&self.buf, &self.status_bar)
    }

    fn prompt<S: AsRef<str>>(&mut self, prompt: S) -> Result<PromptResult> {
        Prompt::new(&mut self.screen, &self.buf, &mut self.status_bar).run(prompt, &mut self.input)
    }

    fn save(&mut self) -> Result<()> {
        let mut create = false;
        if !self.buf.has_file() {
            match self.prompt("Save as: {} (ESC to cancel)")? {
                PromptResult::Input(input) => {
                    self.buf.set_file(input);
                    create = true;
                }
                PromptResult::Canceled => {
                    self.screen.set_info_message("Save aborted");
                    return Ok(());
                }
            }
        }

        match self.buf.save() {
            Ok(msg) => self.screen.set_info_message(msg),
            Err(msg) => {
                self.screen.set_error_message(msg);
                if create {
                    self.buf.set_unnamed();
                }
            }
        }

        Ok(())
    }

    fn handle_quit(&mut self) -> bool {
        if self.buf.modified() {
            self.quit_times = self.quit_times.saturating_sub(1);
            if self.quit_times > 0 {
                self.screen.set_error_message(format!(
                    "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                    self.quit_times
                ));
                return false;
            }
        }
        true
    }

    fn handle_not_mapped(&mut self, seq: InputSeq) {
        self.screen
            .set_info_message(format!("Key '{}' not mapped", seq));
    }

    // Returns true when the editor should quit
    fn process_keypress(&mut self, s: InputSeq) -> Result<bool> {
        use KeySeq::*;

        let rowoff = self.screen.rowoff;
        let rows = self.screen.rows();

        match (s.key, s.ctrl) {
            (Key(b'q'), true) => return Ok(self.handle_quit()),
            (Key(b's'), true) => self.save()?,
            (Key(b'm'), true) | (Key(b'\r'), false) => self.buf.insert_line(),
            (Key(b'h'), true) | (Key(0x08), false) | (Key(0x7f), false) => self.buf.delete_char(),
            (Key(b'd'), true) | (DeleteKey, _) => self.buf.delete_right_char(),
            (Key(b'i'), true) | (Key(b'\t'), false) => self.buf.insert_char(b'\t'),
            (Key(b'p'), true) | (UpKey, _) => self.buf.move_cursor_one(CursorDir::Up),
            (Key(b'n'), true) | (DownKey, _) => self.buf.move_cursor_one(CursorDir::Down),
            (Key(b'b'), true) | (LeftKey, _) => self.buf.move_cursor_one(CursorDir::Left),
            (Key(b'f'), true) | (RightKey, _) => self.buf.move_cursor_one(CursorDir::Right),
            (PageUpKey, _) => self.buf.move_cursor_page(CursorDir::Up, rowoff, rows),
            (Key(b'v'), true) | (PageDownKey, _) => {
                self.buf.move_cursor_page(CursorDir::Down, rowoff, rows)
            }
            (Key(b'a'), true) | (HomeKey, _) => self.buf.move_cursor_to_line_edge(CursorDir::Left),
            (Key(b'e'), true) | (EndKey, _) => self.buf.move_cursor_to_line_edge(CursorDir::Right),
            // Screen is refreshed after any key
            (Key(b'l'), true) | (Key(0x1b), false) => {}
            (Key(b), false) if !b.is_ascii_control() => self.buf.insert_char(b),
            (Key(_), _) => self.handle_not_mapped(s),
        }

        self.quit_times = QUIT_TIMES;
        Ok(false)
    }

    pub fn edit(&mut self) -> Result<()> {
        self.render_screen()?; // First paint

        while let Some(seq) = self.input.next() {
            if self.process_keypress(seq?)? {
                self.screen.clear()?;
                break;
            }
            self.render_screen()?;
        }

        Ok(())
    }

    pub fn lines(&self) -> Lines<'_> {
        self.buf.lines()
    }

    pub fn screen(&self) -> &'_ Screen<W> {
        &self.screen
    }
}
