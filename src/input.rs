use crate::error::{Error, Result};
use std::fmt;
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::str;

pub struct StdinRawMode {
    stdin: io::Stdin,
    orig: termios::Termios,
}

impl StdinRawMode {
    pub fn new() -> Result<StdinRawMode> {
        use termios::*;

        let stdin = io::stdin();
        let fd = stdin.as_raw_fd();
        let mut termios = Termios::from_fd(fd)?;
        let orig = termios;

        // Set terminal raw mode. Disable echo back, canonical mode, signals (SIGINT, SIGTSTP) and Ctrl+V.
        termios.c_lflag &= !(ECHO | ICANON | ISIG | IEXTEN);
        // Disable control flow mode (Ctrl+Q/Ctrl+S) and CR-to-NL translation
        termios.c_iflag &= !(IXON | ICRNL | BRKINT | INPCK | ISTRIP);
        // Disable output processing such as \n to \r\n translation
        termios.c_oflag &= !OPOST;
        // Ensure character size is 8bits
        termios.c_cflag |= CS8;
        // Do not wait for next byte with blocking since reading 0 byte is permitted
        termios.c_cc[VMIN] = 0;
        // Set read timeout to 1/10 second it enables 100ms timeout on read()
        termios.c_cc[VTIME] = 1;
        // Apply terminal configurations
        tcsetattr(fd, TCSAFLUSH, &termios)?;

        Ok(StdinRawMode { stdin, orig })
    }

    pub fn input_keys(self) -> InputSequences<Self> {
        InputSequences::new(self)
    }
}

impl Drop for StdinRawMode {
    fn drop(&mut self) {
        // Restore original terminal mode
        if let Err(err) = termios::tcsetattr(self.stdin.as_raw_fd(), termios::TCSAFLUSH, &self.orig)
        {
            log::error!("Could not restore terminal mode: {}", err);
        }
    }
}

impl Read for StdinRawMode {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdin.read(buf)
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum KeySeq {
    Key(u8), // Raw byte. Bare ESC is Key(0x1b)
    LeftKey,
    RightKey,
    UpKey,
    DownKey,
    PageUpKey,
    PageDownKey,
    HomeKey,
    EndKey,
    DeleteKey,
}

impl fmt::Display for KeySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use KeySeq::*;
        match self {
            Key(b' ') => write!(f, "SPACE"),
            Key(0x1b) => write!(f, "ESC"),
            Key(b) if b.is_ascii_control() || !b.is_ascii() => write!(f, "\\x{:x}", b),
            Key(b) => write!(f, "{}", *b as char),
            LeftKey => write!(f, "LEFT"),
            RightKey => write!(f, "RIGHT"),
            UpKey => write!(f, "UP"),
            DownKey => write!(f, "DOWN"),
            PageUpKey => write!(f, "PAGEUP"),
            PageDownKey => write!(f, "PAGEDOWN"),
            HomeKey => write!(f, "HOME"),
            EndKey => write!(f, "END"),
            DeleteKey => write!(f, "DELETE"),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct InputSeq {
    pub key: KeySeq,
    pub ctrl: bool,
}

impl InputSeq {
    pub fn new(key: KeySeq) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: KeySeq) -> Self {
        Self { key, ctrl: true }
    }
}

impl fmt::Display for InputSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "C-")?;
        }
        write!(f, "{}", self.key)
    }
}

// Decodes a byte stream into key sequences. The source is expected to time out (returning 0
// bytes) when no input arrives within a tick, as stdin in raw mode does.
pub struct InputSequences<R: Read> {
    source: R,
}

impl<R: Read> InputSequences<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut one_byte: [u8; 1] = [0];
        match self.source.read(&mut one_byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(one_byte[0])),
            Err(err) => match err.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut => {
                    Ok(None)
                }
                _ => Err(err.into()),
            },
        }
    }

    fn decode_escape_sequence(&mut self) -> Result<KeySeq> {
        use KeySeq::*;

        // If the next two bytes do not arrive within the tick, ESC was pressed alone. Both
        // bytes are consumed before either is looked at.
        let first = match self.read_byte()? {
            Some(b) => b,
            None => return Ok(Key(0x1b)),
        };
        let second = match self.read_byte()? {
            Some(b) => b,
            None => return Ok(Key(0x1b)),
        };

        let key = match (first, second) {
            // e.g. <UP> => \x1b[A
            (b'[', b'A') => UpKey,
            (b'[', b'B') => DownKey,
            (b'[', b'C') => RightKey,
            (b'[', b'D') => LeftKey,
            // xterm sends \x1b[H and \x1b[F, application cursor mode sends \x1bOH and \x1bOF
            (b'[', b'H') | (b'O', b'H') => HomeKey,
            (b'[', b'F') | (b'O', b'F') => EndKey,
            // e.g. <PAGEUP> => \x1b[5~
            (b'[', digit) if digit.is_ascii_digit() => match self.read_byte()? {
                Some(b'~') => match digit {
                    b'1' | b'7' => HomeKey,
                    b'3' => DeleteKey,
                    b'4' | b'8' => EndKey,
                    b'5' => PageUpKey,
                    b'6' => PageDownKey,
                    _ => Key(0x1b),
                },
                _ => Key(0x1b),
            },
            _ => {
                log::warn!("Unknown escape sequence \\x1b\\x{:x}\\x{:x}", first, second);
                Key(0x1b)
            }
        };

        Ok(key)
    }

    fn decode(&mut self, b: u8) -> Result<InputSeq> {
        use KeySeq::*;
        match b {
            // (Maybe) Escape sequence. Ctrl-[ is not available due to this
            0x1b => Ok(InputSeq::new(self.decode_escape_sequence()?)),
            // Ctrl-SPACE and Ctrl-?
            0x00 | 0x1f => Ok(InputSeq::ctrl(Key(b | 0b0010_0000))),
            // Ctrl-\ and Ctrl-]
            0x1c | 0x1d => Ok(InputSeq::ctrl(Key(b | 0b0100_0000))),
            // 0x01~0x1f keys are ascii keys with ctrl. Ctrl mod masks key with 0b11111.
            // Here unmask it with 0b1100000. It only works with 0x61~0x7f.
            0x01..=0x1f => Ok(InputSeq::ctrl(Key(b | 0b0110_0000))),
            // Printable bytes and backspace (0x7f). Bytes over 0x7f are passed through one by one
            _ => Ok(InputSeq::new(Key(b))),
        }
    }

    // Blocks until a key arrives. Timeouts of the underlying source are retried.
    pub fn read_seq(&mut self) -> Result<InputSeq> {
        loop {
            if let Some(b) = self.read_byte()? {
                let seq = self.decode(b)?;
                log::trace!("Key: {}", seq);
                return Ok(seq);
            }
        }
    }

    // By moving cursor at the bottom-right corner by 'B' and 'C' commands, get the size of
    // current screen. \x1b[9999;9999H is not available since it does not guarantee cursor
    // stops on the corner. Finally command 'n' queries cursor position and the terminal
    // answers with \x1b[<rows>;<cols>R. Returns (width, height).
    pub fn query_window_size<W: Write>(&mut self, mut output: W) -> Result<(usize, usize)> {
        output.write_all(b"\x1b[999C\x1b[999B\x1b[6n")?;
        output.flush()?;

        let mut buf = Vec::with_capacity(32);
        while buf.len() < 32 {
            match self.read_byte()? {
                Some(b'R') => break,
                Some(b) => buf.push(b),
                None => break,
            }
        }

        // https://vt100.net/docs/vt100-ug/chapter3.html#CPR e.g. \x1b[24;80R
        let body = match buf.strip_prefix(b"\x1b[") {
            Some(body) => body,
            None => return Err(Error::UnknownWindowSize),
        };
        let mut nums = body
            .split(|b| *b == b';')
            .map(|b| str::from_utf8(b).ok().and_then(|s| s.parse::<usize>().ok()));
        match (nums.next(), nums.next()) {
            (Some(Some(rows)), Some(Some(cols))) => Ok((cols, rows)),
            _ => Err(Error::UnknownWindowSize),
        }
    }
}

impl<R: Read> Iterator for InputSequences<R> {
    type Item = Result<InputSeq>;

    // This method never returns None so for loop never ends
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.read_seq())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use KeySeq::*;

    fn decode_all(bytes: &[u8]) -> Vec<InputSeq> {
        let mut seqs = InputSequences::new(bytes);
        let mut decoded = vec![];
        let mut rest = bytes.len();
        while rest > 0 {
            decoded.push(seqs.read_seq().unwrap());
            rest = seqs.source.len();
        }
        decoded
    }

    fn one(bytes: &[u8]) -> KeySeq {
        let seqs = decode_all(bytes);
        assert_eq!(seqs.len(), 1, "{:?}", seqs);
        assert!(!seqs[0].ctrl);
        seqs[0].key
    }

    #[test]
    fn arrow_keys() {
        assert_eq!(one(b"\x1b[A"), UpKey);
        assert_eq!(one(b"\x1b[B"), DownKey);
        assert_eq!(one(b"\x1b[C"), RightKey);
        assert_eq!(one(b"\x1b[D"), LeftKey);
    }

    #[test]
    fn home_and_end_keys() {
        assert_eq!(one(b"\x1b[H"), HomeKey);
        assert_eq!(one(b"\x1bOH"), HomeKey);
        assert_eq!(one(b"\x1b[F"), EndKey);
        assert_eq!(one(b"\x1bOF"), EndKey);
        assert_eq!(one(b"\x1b[1~"), HomeKey);
        assert_eq!(one(b"\x1b[7~"), HomeKey);
        assert_eq!(one(b"\x1b[4~"), EndKey);
        assert_eq!(one(b"\x1b[8~"), EndKey);
    }

    #[test]
    fn tilde_sequences() {
        assert_eq!(one(b"\x1b[3~"), DeleteKey);
        assert_eq!(one(b"\x1b[5~"), PageUpKey);
        assert_eq!(one(b"\x1b[6~"), PageDownKey);
        assert_eq!(one(b"\x1b[2~"), Key(0x1b));
        assert_eq!(one(b"\x1b[9~"), Key(0x1b));
    }

    #[test]
    fn bare_escape() {
        assert_eq!(one(b"\x1b"), Key(0x1b));
        assert_eq!(one(b"\x1b["), Key(0x1b));
        assert_eq!(one(b"\x1b[5"), Key(0x1b));
        // Digit not followed by '~'
        assert_eq!(one(b"\x1b[5x"), Key(0x1b));
        // Unknown tails are swallowed
        assert_eq!(one(b"\x1b[Z"), Key(0x1b));
        assert_eq!(one(b"\x1bOA"), Key(0x1b));
        assert_eq!(one(b"\x1bab"), Key(0x1b));
    }

    #[test]
    fn plain_and_ctrl_keys() {
        let seqs = decode_all(b"a\x11\x13\r\x7f\t\x08 \xe3");
        assert_eq!(
            seqs,
            vec![
                InputSeq::new(Key(b'a')),
                InputSeq::ctrl(Key(b'q')),
                InputSeq::ctrl(Key(b's')),
                InputSeq::ctrl(Key(b'm')),
                InputSeq::new(Key(0x7f)),
                InputSeq::ctrl(Key(b'i')),
                InputSeq::ctrl(Key(b'h')),
                InputSeq::new(Key(b' ')),
                InputSeq::new(Key(0xe3)),
            ]
        );
    }

    #[test]
    fn special_ctrl_keys() {
        let seqs = decode_all(b"\x00\x1f\x1c\x1d");
        assert_eq!(
            seqs,
            vec![
                InputSeq::ctrl(Key(b' ')),
                InputSeq::ctrl(Key(b'?')),
                InputSeq::ctrl(Key(b'\\')),
                InputSeq::ctrl(Key(b']')),
            ]
        );
    }

    #[test]
    fn sequence_followed_by_keys() {
        let seqs = decode_all(b"\x1b[Cx\x1b[5~y");
        assert_eq!(
            seqs,
            vec![
                InputSeq::new(RightKey),
                InputSeq::new(Key(b'x')),
                InputSeq::new(PageUpKey),
                InputSeq::new(Key(b'y')),
            ]
        );
    }

    struct Flaky {
        timeouts: usize,
        bytes: Vec<u8>,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.timeouts > 0 {
                self.timeouts -= 1;
                return Err(io::Error::from(io::ErrorKind::WouldBlock));
            }
            if self.bytes.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes.remove(0);
            Ok(1)
        }
    }

    #[test]
    fn retry_on_timeout() {
        let mut seqs = InputSequences::new(Flaky {
            timeouts: 3,
            bytes: b"z".to_vec(),
        });
        assert_eq!(seqs.read_seq().unwrap(), InputSeq::new(Key(b'z')));
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "broken"))
        }
    }

    #[test]
    fn read_error_is_fatal() {
        let mut seqs = InputSequences::new(Broken);
        match seqs.next() {
            Some(Err(Error::IoError(err))) => assert_eq!(err.to_string(), "broken"),
            r => panic!("unexpected result: {:?}", r.map(|r| r.is_ok())),
        }
    }

    #[test]
    fn window_size_from_cursor_position_report() {
        let mut seqs = InputSequences::new(&b"\x1b[24;80R"[..]);
        let mut out = vec![];
        let size = seqs.query_window_size(&mut out).unwrap();
        assert_eq!(size, (80, 24));
        assert_eq!(out, b"\x1b[999C\x1b[999B\x1b[6n");
    }

    #[test]
    fn window_size_broken_report() {
        let mut seqs = InputSequences::new(&b"24;80R"[..]);
        assert!(matches!(
            seqs.query_window_size(io::sink()),
            Err(Error::UnknownWindowSize)
        ));
        let mut seqs = InputSequences::new(&b"\x1b[24R"[..]);
        assert!(matches!(
            seqs.query_window_size(io::sink()),
            Err(Error::UnknownWindowSize)
        ));
    }

    #[test]
    fn display_keys() {
        assert_eq!(InputSeq::ctrl(Key(b'x')).to_string(), "C-x");
        assert_eq!(InputSeq::new(Key(b' ')).to_string(), "SPACE");
        assert_eq!(InputSeq::new(PageDownKey).to_string(), "PAGEDOWN");
        assert_eq!(InputSeq::new(Key(0x1b)).to_string(), "ESC");
    }
}
