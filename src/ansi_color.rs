use std::env;
use term::terminfo::TermInfo;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ColorSupport {
    TrueColor,
    Extended256,
    Only16,
}

impl ColorSupport {
    pub fn from_env() -> ColorSupport {
        env::var("COLORTERM")
            .ok()
            .and_then(|v| {
                if v == "truecolor" {
                    Some(ColorSupport::TrueColor)
                } else {
                    None
                }
            })
            .or_else(|| {
                TermInfo::from_env().ok().and_then(|info| {
                    info.numbers.get("colors").map(|colors| {
                        if *colors == 256 {
                            ColorSupport::Extended256
                        } else {
                            ColorSupport::Only16
                        }
                    })
                })
            })
            .unwrap_or(ColorSupport::Only16)
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum AnsiColor {
    Reset,
    RedBG,
    Invert,
}

impl AnsiColor {
    pub fn sequence(self, support: ColorSupport) -> &'static [u8] {
        // 'm' sets attributes to text printed after: https://vt100.net/docs/vt100-ug/chapter3.html#SGR
        // Color table: https://en.wikipedia.org/wiki/ANSI_escape_code#Colors
        //
        // 256 colors sequences are '\x1b[38;5;<n>m' (for fg) or '\x1b[48;5;<n>m (for bg)
        // 24bit colors sequences are '\x1b[38;2;<r>;<g>;<b>m' (for fg) or '\x1b[48;2;<r>;<g>;<b>m' (for bg)
        use AnsiColor::*;
        match (self, support) {
            // Default argument of 'm' command is 0 so it resets attributes
            (Reset, _) => b"\x1b[m",
            (Invert, _) => b"\x1b[7m",
            (RedBG, ColorSupport::TrueColor) => b"\x1b[48;2;204;36;29m",
            (RedBG, ColorSupport::Extended256) => b"\x1b[48;5;124m",
            (RedBG, ColorSupport::Only16) => b"\x1b[41m",
        }
    }
}
