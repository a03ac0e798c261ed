#![no_main]
use libfuzzer_sys::fuzz_target;

use nucleus::{Editor, InputSequences};
use std::io::{self, Read, Write};

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
    // Ctrl-S is removed so that no file is written. Endless Ctrl-Q follows the data to quit
    let bytes: Vec<u8> = data.iter().copied().filter(|b| *b != 0x13).collect();
    let input = InputSequences::new(io::Cursor::new(bytes).chain(io::repeat(0x11)));
    let mut editor = Editor::new(input, Discard, (80, 24)).unwrap();
    editor.edit().unwrap();
});
