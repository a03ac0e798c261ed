use crate::ansi_color::{AnsiColor, ColorSupport};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::status_bar::StatusBar;
use crate::text_buffer::TextBuffer;
use std::cmp;
use std::io::Write;
use std::time::{Duration, SystemTime};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit";
const MESSAGE_EXPIRY: Duration = Duration::from_secs(5);

#[derive(PartialEq, Debug, Clone, Copy)]
enum StatusMessageKind {
    Info,
    Error,
}

struct StatusMessage {
    text: String,
    timestamp: SystemTime,
    kind: StatusMessageKind,
}

impl StatusMessage {
    fn new<S: Into<String>>(message: S, kind: StatusMessageKind) -> StatusMessage {
        StatusMessage {
            text: message.into(),
            timestamp: SystemTime::now(),
            kind,
        }
    }

    fn expired(&self) -> bool {
        match SystemTime::now().duration_since(self.timestamp) {
            Ok(elapsed) => elapsed >= MESSAGE_EXPIRY,
            Err(_) => false, // Clock went backwards
        }
    }
}

pub struct Screen<W: Write> {
    output: W,
    // X coordinate in `render` text of rows
    rx: usize,
    // Screen size. num_rows excludes status bar and message bar
    num_cols: usize,
    num_rows: usize,
    message: Option<StatusMessage>,
    // Scroll position (row/col offset)
    pub rowoff: usize,
    pub coloff: usize,
    color_support: ColorSupport,
}

impl<W: Write> Screen<W> {
    pub fn new(window_size: (usize, usize), output: W) -> Result<Self> {
        let (w, h) = window_size;
        if w < 1 || h < 3 {
            return Err(Error::TooSmallWindow(w, h));
        }

        Ok(Self {
            output,
            rx: 0,
            num_cols: w,
            // Screen height is 2 lines less than window height due to status bar and message bar
            num_rows: h - 2,
            message: Some(StatusMessage::new(HELP_MESSAGE, StatusMessageKind::Info)),
            rowoff: 0,
            coloff: 0,
            color_support: ColorSupport::from_env(),
        })
    }

    fn draw_welcome_message(&self, buf: &mut Vec<u8>) {
        let msg = format!("Nucleus editor -- version {}", VERSION);
        let welcome = &msg.as_bytes()[..cmp::min(msg.len(), self.num_cols)];
        let padding = (self.num_cols - welcome.len()) / 2;
        if padding > 0 {
            buf.push(b'~');
            buf.resize(buf.len() + padding - 1, b' ');
        }
        buf.extend_from_slice(welcome);
    }

    fn draw_rows(&self, buf: &mut Vec<u8>, rows: &[Row]) {
        for y in 0..self.num_rows {
            let file_row = y + self.rowoff;

            if file_row >= rows.len() {
                if rows.is_empty() && y == self.num_rows / 3 {
                    self.draw_welcome_message(buf);
                } else {
                    buf.push(b'~');
                }
            } else {
                let render = rows[file_row].render_text();
                let start = cmp::min(self.coloff, render.len());
                let end = cmp::min(self.coloff + self.num_cols, render.len());
                buf.extend_from_slice(&render[start..end]);
            }

            // Erases the part of the line to the right of the cursor. http://vt100.net/docs/vt100-ug/chapter3.html#EL
            buf.extend_from_slice(b"\x1b[K");
            buf.extend_from_slice(b"\r\n");
        }
    }

    fn draw_status_bar(&self, buf: &mut Vec<u8>, status_bar: &StatusBar) {
        buf.extend_from_slice(AnsiColor::Invert.sequence(self.color_support));

        let left = status_bar.left();
        let left = &left.as_bytes()[..cmp::min(left.len(), self.num_cols)];
        buf.extend_from_slice(left); // Left of status bar

        let rest_len = self.num_cols - left.len();
        let right = status_bar.right();
        if right.len() > rest_len {
            buf.resize(buf.len() + rest_len, b' ');
        } else {
            // Add spaces at center of status bar
            buf.resize(buf.len() + rest_len - right.len(), b' ');
            buf.extend_from_slice(right.as_bytes());
        }

        buf.extend_from_slice(AnsiColor::Reset.sequence(self.color_support));
        buf.extend_from_slice(b"\r\n");
    }

    fn draw_message_bar(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"\x1b[K");
        let message = match &self.message {
            Some(m) if !m.expired() => m,
            _ => return,
        };
        let msg = &message.text.as_bytes()[..cmp::min(message.text.len(), self.num_cols)];
        if message.kind == StatusMessageKind::Error {
            buf.extend_from_slice(AnsiColor::RedBG.sequence(self.color_support));
            buf.extend_from_slice(msg);
            buf.extend_from_slice(AnsiColor::Reset.sequence(self.color_support));
        } else {
            buf.extend_from_slice(msg);
        }
    }

    // Builds whole screen in one buffer and writes it at once to avoid flickering.
    // `cursor` is 1-based (row, col) on terminal.
    fn redraw_screen(
        &mut self,
        rows: &[Row],
        status_bar: &StatusBar,
        cursor: (usize, usize),
    ) -> Result<()> {
        let mut buf = Vec::with_capacity((self.num_rows + 2) * (self.num_cols + 4));

        // \x1b[: Escape sequence header
        // Hide cursor while updating screen. 'l' is command to set mode http://vt100.net/docs/vt100-ug/chapter3.html#SM
        buf.extend_from_slice(b"\x1b[?25l");
        // H: Command to move cursor. Here \x1b[H is the same as \x1b[1;1H
        buf.extend_from_slice(b"\x1b[H");

        self.draw_rows(&mut buf, rows);
        self.draw_status_bar(&mut buf, status_bar);
        self.draw_message_bar(&mut buf);

        write!(buf, "\x1b[{};{}H", cursor.0, cursor.1)?;

        // Reveal cursor again. 'h' is command to reset mode https://vt100.net/docs/vt100-ug/chapter3.html#RM
        buf.extend_from_slice(b"\x1b[?25h");

        self.output.write_all(&buf)?;
        self.output.flush()?;
        Ok(())
    }

    pub fn do_scroll(&mut self, rows: &[Row], cx: usize, cy: usize) {
        // Calculate X coordinate to render considering tab stop
        self.rx = rows.get(cy).map(|r| r.rx_from_cx(cx)).unwrap_or(0);

        // Adjust scroll position when cursor is outside screen
        if cy < self.rowoff {
            // Scroll up when cursor is above the top of window
            self.rowoff = cy;
        }
        if cy >= self.rowoff + self.num_rows {
            // Scroll down when cursor is below the bottom of screen
            self.rowoff = cy - self.num_rows + 1;
        }
        if self.rx < self.coloff {
            self.coloff = self.rx;
        }
        if self.rx >= self.coloff + self.num_cols {
            self.coloff = self.rx - self.num_cols + 1;
        }
    }

    pub fn render(&mut self, buf: &TextBuffer, status_bar: &StatusBar) -> Result<()> {
        let (cx, cy) = buf.cursor();
        self.do_scroll(buf.rows(), cx, cy);
        let cursor_row = cy - self.rowoff + 1;
        let cursor_col = self.rx - self.coloff + 1;
        self.redraw_screen(buf.rows(), status_bar, (cursor_row, cursor_col))
    }

    // Renders screen while a prompt is active. Cursor is put at 'col' (0-based) in message bar
    pub fn render_prompt(
        &mut self,
        buf: &TextBuffer,
        status_bar: &StatusBar,
        col: usize,
    ) -> Result<()> {
        let (cx, cy) = buf.cursor();
        self.do_scroll(buf.rows(), cx, cy);
        let col = cmp::min(col, self.num_cols - 1);
        self.redraw_screen(buf.rows(), status_bar, (self.num_rows + 2, col + 1))
    }

    pub fn clear(&mut self) -> Result<()> {
        // 2: Argument of 'J' command to reset entire screen
        // J: Command to erase screen http://vt100.net/docs/vt100-ug/chapter3.html#ED
        self.output.write_all(b"\x1b[2J")?;
        // Set cursor position to left-top corner
        self.output.write_all(b"\x1b[H")?;
        self.output.flush()?;
        Ok(())
    }

    pub fn set_info_message<S: Into<String>>(&mut self, message: S) {
        self.message = Some(StatusMessage::new(message, StatusMessageKind::Info));
    }

    pub fn set_error_message<S: Into<String>>(&mut self, message: S) {
        self.message = Some(StatusMessage::new(message, StatusMessageKind::Error));
    }

    pub fn unset_message(&mut self) {
        self.message = None;
    }

    pub fn message_text(&self) -> &'_ str {
        self.message.as_ref().map(|m| m.text.as_str()).unwrap_or("")
    }

    pub fn rows(&self) -> usize {
        self.num_rows
    }

    pub fn cols(&self) -> usize {
        self.num_cols
    }

    pub fn rx(&self) -> usize {
        self.rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn screen_of(out: &mut Vec<u8>, size: (usize, usize)) -> Screen<&mut Vec<u8>> {
        let mut screen = Screen::new(size, out).unwrap();
        screen.color_support = ColorSupport::Only16;
        screen
    }

    fn render(buf: &TextBuffer, size: (usize, usize)) -> String {
        let mut out = vec![];
        {
            let mut screen = screen_of(&mut out, size);
            screen.render(buf, &StatusBar::from_buffer(buf)).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn too_small_window() {
        assert!(matches!(
            Screen::new((80, 2), io::sink()),
            Err(Error::TooSmallWindow(80, 2))
        ));
        assert!(matches!(
            Screen::new((0, 24), io::sink()),
            Err(Error::TooSmallWindow(0, 24))
        ));
        assert!(Screen::new((1, 3), io::sink()).is_ok());
    }

    #[test]
    fn whole_frame() {
        let buf = TextBuffer::with_lines(vec!["hello"]);
        let frame = render(&buf, (40, 5));
        let expected = [
            "\x1b[?25l\x1b[H",
            "hello\x1b[K\r\n",
            "~\x1b[K\r\n",
            "~\x1b[K\r\n",
            "\x1b[7m[No Name] - 1 lines                  1/1\x1b[m\r\n",
            "\x1b[KHELP: Ctrl-S = save | Ctrl-Q = quit",
            "\x1b[1;1H\x1b[?25h",
        ]
        .concat();
        assert_eq!(frame, expected);
    }

    #[test]
    fn welcome_message_only_for_empty_buffer() {
        let frame = render(&TextBuffer::empty(), (80, 11));
        let welcome = format!("Nucleus editor -- version {}", VERSION);
        let lines: Vec<_> = frame.split("\r\n").collect();
        // 9 text rows, welcome is at 9 / 3 = 3rd row
        assert!(lines[3].starts_with("~ "), "{:?}", lines[3]);
        assert!(lines[3].contains(&welcome), "{:?}", lines[3]);
        assert_eq!(lines[2], "~\x1b[K");

        let frame = render(&TextBuffer::with_lines(vec![""]), (80, 11));
        assert!(!frame.contains(&welcome));
    }

    #[test]
    fn welcome_message_is_clipped() {
        let frame = render(&TextBuffer::empty(), (10, 5));
        let lines: Vec<_> = frame.split("\r\n").collect();
        assert_eq!(lines[1], "Nucleus ed\x1b[K");
    }

    #[test]
    fn status_bar_is_clipped() {
        let buf = TextBuffer::with_lines(vec!["a"]);
        let frame = render(&buf, (12, 4));
        assert!(frame.contains("\x1b[7m[No Name] - \x1b[m\r\n"), "{:?}", frame);

        // Right part does not fit in rest of status bar
        let frame = render(&buf, (21, 4));
        assert!(frame.contains("\x1b[7m[No Name] - 1 lines  \x1b[m"), "{:?}", frame);
    }

    #[test]
    fn scroll_vertically() {
        let lines: Vec<_> = (0..100).map(|i| i.to_string()).collect();
        let buf = TextBuffer::with_lines(lines);
        let mut screen = Screen::new((80, 24), io::sink()).unwrap();

        screen.do_scroll(buf.rows(), 0, 50);
        assert_eq!(screen.rowoff, 29);
        screen.do_scroll(buf.rows(), 0, 40);
        assert_eq!(screen.rowoff, 29);
        screen.do_scroll(buf.rows(), 0, 10);
        assert_eq!(screen.rowoff, 10);
        // Virtual line after the last line
        screen.do_scroll(buf.rows(), 0, 100);
        assert_eq!(screen.rowoff, 79);
        assert_eq!(screen.rx(), 0);
    }

    #[test]
    fn scroll_horizontally_by_render_column() {
        let buf = TextBuffer::with_lines(vec!["a".repeat(200), "\t\tb".to_string()]);
        let mut screen = Screen::new((80, 24), io::sink()).unwrap();

        screen.do_scroll(buf.rows(), 100, 0);
        assert_eq!(screen.coloff, 21);
        assert_eq!(screen.rx(), 100);
        screen.do_scroll(buf.rows(), 2, 1);
        assert_eq!(screen.rx(), 16);
        assert_eq!(screen.coloff, 16);
        screen.do_scroll(buf.rows(), 0, 1);
        assert_eq!(screen.coloff, 0);
    }

    #[test]
    fn draw_rows_from_column_offset() {
        let mut buf = TextBuffer::with_lines(vec!["0123456789abcdef", "xy"]);
        buf.set_cursor(12, 0);
        let frame = render(&buf, (10, 5));
        let lines: Vec<_> = frame.split("\r\n").collect();
        assert_eq!(lines[0], "\x1b[?25l\x1b[H3456789abc\x1b[K");
        assert_eq!(lines[1], "\x1b[K");
        assert!(frame.ends_with("\x1b[1;10H\x1b[?25h"), "{:?}", frame);
    }

    #[test]
    fn tabs_are_rendered_as_spaces() {
        let mut buf = TextBuffer::with_lines(vec!["\tx"]);
        buf.set_cursor(1, 0);
        let frame = render(&buf, (40, 5));
        assert!(frame.contains("        x\x1b[K"), "{:?}", frame);
        assert!(frame.ends_with("\x1b[1;9H\x1b[?25h"), "{:?}", frame);
    }

    #[test]
    fn error_message_and_expiry() {
        let buf = TextBuffer::with_lines(vec!["a"]);
        let sb = StatusBar::from_buffer(&buf);
        let mut out = vec![];
        {
            let mut screen = screen_of(&mut out, (40, 4));
            screen.set_error_message("Oops");
            screen.render(&buf, &sb).unwrap();
        }
        let frame = String::from_utf8(out).unwrap();
        assert!(frame.contains("\x1b[K\x1b[41mOops\x1b[m"), "{:?}", frame);

        let mut out = vec![];
        {
            let mut screen = screen_of(&mut out, (40, 4));
            screen.set_info_message("Old news");
            if let Some(m) = screen.message.as_mut() {
                m.timestamp -= Duration::from_secs(6);
            }
            screen.render(&buf, &sb).unwrap();
            assert_eq!(screen.message_text(), "Old news");
        }
        let frame = String::from_utf8(out).unwrap();
        assert!(!frame.contains("Old news"), "{:?}", frame);
    }

    #[test]
    fn prompt_cursor_in_message_bar() {
        let buf = TextBuffer::with_lines(vec!["a"]);
        let sb = StatusBar::from_buffer(&buf);
        let mut out = vec![];
        {
            let mut screen = screen_of(&mut out, (40, 6));
            screen.set_info_message("Save as: foo");
            screen.render_prompt(&buf, &sb, 12).unwrap();
        }
        let frame = String::from_utf8(out).unwrap();
        assert!(frame.ends_with("\x1b[6;13H\x1b[?25h"), "{:?}", frame);
    }

    #[test]
    fn frame_is_written_at_once() {
        struct CountWrites(usize);

        impl Write for CountWrites {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0 += 1;
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let buf = TextBuffer::with_lines(vec!["a", "b", "c"]);
        let mut screen = Screen::new((80, 24), CountWrites(0)).unwrap();
        screen.render(&buf, &StatusBar::from_buffer(&buf)).unwrap();
        assert_eq!(screen.output.0, 1);
    }
}
