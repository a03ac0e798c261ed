use crate::error::Result;
use log::{Level, Log, Metadata, Record};
use std::env;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const LOG_PATH_ENV: &str = "NUCLEUS_LOG";
const LOG_LEVEL_ENV: &str = "NUCLEUS_LOG_LEVEL";

// Screen is owned by the editor while running so logs never go to stdout/stderr
struct FileLogger {
    level: Level,
    file: Mutex<File>,
}

impl FileLogger {
    fn open<P: AsRef<Path>>(path: P, level: Level) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            level,
            file: Mutex::new(file),
        })
    }
}

fn format_line(record: &Record<'_>) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!(
        "{} {:<5} [{}] {}",
        secs,
        record.level(),
        record.target(),
        record.args()
    )
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", format_line(record));
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn parse_level(s: &str) -> Level {
    s.parse().unwrap_or(Level::Debug)
}

// Enables logging to the file at $NUCLEUS_LOG. Nothing is logged when it is not set.
pub fn init() -> Result<()> {
    let path = match env::var_os(LOG_PATH_ENV) {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(()),
    };
    let level = env::var(LOG_LEVEL_ENV)
        .map(|s| parse_level(&s))
        .unwrap_or(Level::Debug);

    let logger = FileLogger::open(path, level)?;
    // Only the first call installs the logger
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
    log::info!("Nucleus editor {} started", env!("CARGO_PKG_VERSION"));
    Ok(())
}
