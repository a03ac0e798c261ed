#![no_main]
use libfuzzer_sys::fuzz_target;

use nucleus::{Editor, InputSeq, KeySeq, Result};
use std::io::{self, Write};

struct AllOperations(Vec<InputSeq>);

impl AllOperations {
    fn new() -> Self {
        let mut ops = vec![
            // Insert and move cursor
            InputSeq::new(KeySeq::LeftKey),
            InputSeq::new(KeySeq::RightKey),
            InputSeq::new(KeySeq::UpKey),
            InputSeq::new(KeySeq::DownKey),
            InputSeq::ctrl(KeySeq::Key(b'm')),
            InputSeq::new(KeySeq::Key(b'a')),
            InputSeq::new(KeySeq::Key(b'b')),
            InputSeq::new(KeySeq::Key(0xe3)),
            InputSeq::ctrl(KeySeq::Key(b'i')),
            InputSeq::new(KeySeq::Key(b'c')),
            InputSeq::new(KeySeq::EndKey),
            InputSeq::new(KeySeq::HomeKey),
            InputSeq::ctrl(KeySeq::Key(b'a')),
            InputSeq::ctrl(KeySeq::Key(b'e')),
            InputSeq::ctrl(KeySeq::Key(b'l')),
            // Delete
            InputSeq::ctrl(KeySeq::Key(b'h')),
            InputSeq::new(KeySeq::Key(0x7f)),
            InputSeq::ctrl(KeySeq::Key(b'd')),
            InputSeq::new(KeySeq::DeleteKey),
            // Scroll
            InputSeq::ctrl(KeySeq::Key(b'v')),
            InputSeq::new(KeySeq::PageDownKey),
            InputSeq::new(KeySeq::DeleteKey),
            InputSeq::new(KeySeq::Key(0x7f)),
            InputSeq::new(KeySeq::PageUpKey),
            // Not mapped
            InputSeq::ctrl(KeySeq::Key(b'z')),
        ];
        ops.reverse();
        Self(ops)
    }
}

impl Iterator for AllOperations {
    type Item = Result<InputSeq>;

    fn next(&mut self) -> Option<Self::Item> {
        let seq = self.0.pop().unwrap_or(InputSeq::ctrl(KeySeq::Key(b'q')));
        Some(Ok(seq))
    }
}

struct Discard;

impl Write for Discard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let lines = data.split(|b| *b == b'\n');
    let mut editor = Editor::with_lines(lines, AllOperations::new(), Discard, (80, 24)).unwrap();
    editor.edit().unwrap(); // Editor must quit successfully
});
