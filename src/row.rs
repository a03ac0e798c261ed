pub const TAB_STOP: usize = 8;

// One line of text. `buf` is the content as-is and `render` is how it looks on screen.
// One byte takes one column, except a tab which is expanded to the next tab stop.
#[derive(Default, Debug, Clone)]
pub struct Row {
    buf: Vec<u8>,
    render: Vec<u8>,
}

impl Row {
    pub fn new<B: Into<Vec<u8>>>(line: B) -> Row {
        let mut row = Row {
            buf: line.into(),
            render: vec![],
        };
        row.update_render();
        row
    }

    pub fn empty() -> Row {
        Row::default()
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    pub fn render_text(&self) -> &[u8] {
        &self.render
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn update_render(&mut self) {
        self.render = render_of(&self.buf);
    }

    pub fn rx_from_cx(&self, cx: usize) -> usize {
        self.buf.iter().take(cx).fold(0, |rx, b| {
            if *b == b'\t' {
                // Proceed TAB_STOP spaces then subtract spaces by mod TAB_STOP
                rx + TAB_STOP - (rx % TAB_STOP)
            } else {
                rx + 1
            }
        })
    }

    // Note: 'at' is an index of buffer, not render text
    pub fn insert_char(&mut self, at: usize, b: u8) {
        if self.buf.len() <= at {
            self.buf.push(b);
        } else {
            self.buf.insert(at, b);
        }
        self.update_render();
    }

    pub fn delete_char(&mut self, at: usize) -> bool {
        if at >= self.buf.len() {
            return false;
        }
        self.buf.remove(at);
        self.update_render();
        true
    }

    pub fn append(&mut self, s: &[u8]) {
        if s.is_empty() {
            return;
        }
        self.buf.extend_from_slice(s);
        self.update_render();
    }

    // Cuts the row at 'at' and returns the cut off suffix
    pub fn split_off(&mut self, at: usize) -> Vec<u8> {
        if at >= self.buf.len() {
            return vec![];
        }
        let suffix = self.buf.split_off(at);
        self.update_render();
        suffix
    }
}

pub fn render_of(buf: &[u8]) -> Vec<u8> {
    let tabs = buf.iter().filter(|b| **b == b'\t').count();
    let mut render = Vec::with_capacity(buf.len() + tabs * (TAB_STOP - 1));
    for b in buf.iter() {
        if *b == b'\t' {
            loop {
                render.push(b' ');
                if render.len() % TAB_STOP == 0 {
                    break;
                }
            }
        } else {
            render.push(*b);
        }
    }
    render
}
