//! Batch progress reporting.
//!
//! A [`Reporter`] is created once per run and handed down by reference, not
//! installed as global state. It owns two sinks: an interactive console that
//! receives every level, and an optional durable log file that receives INFO
//! and above. Writes are serialized internally so a parallel runner would
//! only need to share the reporter.

use crate::error::Result;

use std::fs::{File, OpenOptions};
use std::io::{stderr, Write};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARNING",
            Level::Error => "ERROR",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Level::Debug => termion::color::LightBlack.fg_str(),
            Level::Info => termion::color::LightBlue.fg_str(),
            Level::Warn => termion::color::LightYellow.fg_str(),
            Level::Error => termion::color::LightRed.fg_str(),
        }
    }
}

struct Sinks {
    console: Box<dyn Write + Send>,
    file: Option<File>,
}

pub struct Reporter {
    sinks: Mutex<Sinks>,
}

impl Reporter {
    /// Console on stderr plus an optional durable log file, opened in append
    /// mode so successive batch runs share one history.
    pub fn new(log_path: Option<&Path>) -> Result<Self> {
        let file = match log_path {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };
        Ok(Self::with_console(Box::new(stderr()), file))
    }

    pub fn with_console(console: Box<dyn Write + Send>, file: Option<File>) -> Self {
        Self {
            sinks: Mutex::new(Sinks { console, file }),
        }
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        self.log(Level::Debug, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.log(Level::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.log(Level::Warn, msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.log(Level::Error, msg.as_ref());
    }

    fn log(&self, level: Level, msg: &str) {
        let line = format_line(level, msg);
        let Ok(mut sinks) = self.sinks.lock() else {
            return;
        };
        let color = level.color();
        let reset = termion::style::Reset;
        let _ = writeln!(sinks.console, "{color}{line}{reset}");
        let _ = sinks.console.flush();
        if level >= Level::Info {
            if let Some(file) = sinks.file.as_mut() {
                let _ = writeln!(file, "{line}");
            }
        }
    }
}

/// `<timestamp> <LEVEL right-aligned to 8> <message>`, millisecond
/// timestamps with a comma separator.
fn format_line(level: Level, msg: &str) -> String {
    let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
    format!("{ts} {:>8} {msg}", level.label())
}
