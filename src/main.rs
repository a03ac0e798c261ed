use nucleus::{init_logger, Editor, Result, StdinRawMode};
use std::env;
use std::io::{self, Write};
use std::process::exit;

fn run() -> Result<()> {
    init_logger()?;

    let mut input = StdinRawMode::new()?.input_keys();
    let window_size = match term_size::dimensions_stdout() {
        Some(size) => size,
        None => input.query_window_size(io::stdout())?,
    };
    log::debug!("Window size: {:?}", window_size);

    let output = io::stdout();
    if let Some(path) = env::args().nth(1) {
        Editor::open(input, output, window_size, path)?.edit()
    } else {
        Editor::new(input, output, window_size)?.edit()
    }
    // Raw mode is restored when input is dropped
}

fn main() {
    if let Err(err) = run() {
        log::error!("Exit with error: {}", err);
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x1b[2J\x1b[H");
        let _ = stdout.flush();
        eprintln!("Error: {}", err);
        exit(1);
    }
}
