// Refs:
//   Build Your Own Text Editor: https://viewsourcecode.org/snaptoken/kilo/index.html
//   VT100 User Guide: https://vt100.net/docs/vt100-ug/chapter3.html

mod ansi_color;
mod editor;
mod error;
mod input;
mod logger;
mod prompt;
mod row;
mod screen;
mod status_bar;
mod text_buffer;


pub use editor::Editor;
pub use error::{Error, Result};
pub use input::{InputSeq, InputSequences, KeySeq, StdinRawMode};
pub use logger::init as init_logger;
pub use row::Row;
pub use screen::{Screen, HELP_MESSAGE, VERSION};
pub use text_buffer::{CursorDir, TextBuffer};
