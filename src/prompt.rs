use crate::error::Result;
use crate::input::{InputSeq, KeySeq};
use crate::screen::Screen;
use crate::status_bar::StatusBar;
use crate::text_buffer::TextBuffer;
use std::io::Write;

#[derive(PartialEq, Debug)]
pub enum PromptResult {
    Canceled,
    Input(String),
}

struct PromptTemplate<'a> {
    prefix: &'a str,
    suffix: &'a str,
}

impl<'a> PromptTemplate<'a> {
    fn new(prompt: &'a str) -> Self {
        let mut it = prompt.splitn(2, "{}");
        let prefix = it.next().unwrap_or("");
        let suffix = it.next().unwrap_or("");
        PromptTemplate { prefix, suffix }
    }

    fn build(&self, input: &str) -> String {
        let cap = self.prefix.len() + self.suffix.len() + input.len();
        let mut buf = String::with_capacity(cap);
        buf.push_str(self.prefix);
        buf.push_str(input);
        buf.push_str(self.suffix);
        buf
    }

    fn cursor_col(&self, input: &str) -> usize {
        self.prefix.len() + input.len() // Just after the input
    }
}

// Reads one line of text in message bar. Text buffer is shown as-is while prompting
pub struct Prompt<'a, W: Write> {
    screen: &'a mut Screen<W>,
    buf: &'a TextBuffer,
    sb: &'a mut StatusBar,
}

impl<'a, W: Write> Prompt<'a, W> {
    pub fn new(screen: &'a mut Screen<W>, buf: &'a TextBuffer, sb: &'a mut StatusBar) -> Self {
        Self { screen, buf, sb }
    }

    fn render_screen(&mut self, input: &str, template: &PromptTemplate<'_>) -> Result<()> {
        self.screen.set_info_message(template.build(input));
        self.sb.update_from_buf(self.buf);
        let col = template.cursor_col(input);
        self.screen.render_prompt(self.buf, self.sb, col)
    }

    // `prompt` is a template where "{}" is replaced with user input
    pub fn run<S, I>(&mut self, prompt: S, input: I) -> Result<PromptResult>
    where
        S: AsRef<str>,
        I: Iterator<Item = Result<InputSeq>>,
    {
        let template = PromptTemplate::new(prompt.as_ref());
        let mut buf = String::new();
        let mut canceled = true;

        self.render_screen("", &template)?;

        for seq in input {
            use KeySeq::*;

            let seq = seq?;
            match (seq.key, seq.ctrl) {
                (Key(b'h'), true) | (Key(0x7f), false) | (Key(0x08), false) | (DeleteKey, _) => {
                    buf.pop();
                }
                (Key(b'g'), true) | (Key(b'q'), true) | (Key(0x1b), false) => break,
                (Key(b'\r'), false) | (Key(b'm'), true) if !buf.is_empty() => {
                    canceled = false;
                    break;
                }
                (Key(b'u'), true) => buf.clear(),
                (Key(b), false) if (0x20..0x7f).contains(&b) => buf.push(b as char),
                _ => {}
            }

            self.render_screen(&buf, &template)?;
        }

        self.screen.unset_message();
        Ok(if canceled {
            PromptResult::Canceled
        } else {
            PromptResult::Input(buf)
        })
    }
}
