//! Output surfaces: standard output, the terminal title and the alert.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use dstat_common::{Error, Result};
use tracing::warn;

use crate::battery::AlertDisplay;
use crate::compose::MetricSnapshot;
use crate::config::OutputFormat;

/// Controlling terminal of the process.
const TTY_PATH: &str = "/dev/tty";

/// Surface mirroring the status line, such as a window title.
pub trait TitleSurface {
    fn set_title(&mut self, line: &str) -> Result<()>;
}

/// Window title of the controlling terminal, set with xterm OSC 2.
pub struct TerminalTitle {
    tty: File,
}

impl TerminalTitle {
    pub fn open() -> Result<Self> {
        Self::open_path(TTY_PATH)
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let tty = OpenOptions::new()
            .write(true)
            .open(path.as_ref())
            .map_err(|e| Error::Display(format!("{}: {}", path.as_ref().display(), e)))?;
        Ok(Self { tty })
    }
}

impl TitleSurface for TerminalTitle {
    fn set_title(&mut self, line: &str) -> Result<()> {
        self.tty.write_all(title_sequence(line).as_bytes())?;
        self.tty.flush()?;
        Ok(())
    }
}

/// OSC 2 sequence setting the window title to `line`.
///
/// Control characters are stripped so the line cannot end the sequence early.
pub fn title_sequence(line: &str) -> String {
    let title: String = line.chars().filter(|c| !c.is_control()).collect();
    format!("\x1b]2;{}\x07", title)
}

/// Modal alert on the controlling terminal, dismissed with Enter.
pub struct TtyAlert {
    tty: File,
}

impl TtyAlert {
    pub fn open() -> Result<Self> {
        let tty = OpenOptions::new()
            .read(true)
            .write(true)
            .open(TTY_PATH)
            .map_err(|e| Error::Display(format!("{}: {}", TTY_PATH, e)))?;
        Ok(Self { tty })
    }
}

impl AlertDisplay for TtyAlert {
    fn show_alert(&mut self, message: &str) -> Result<()> {
        write!(self.tty, "\x07\ndstat: {} [press Enter]\n", message)?;
        self.tty.flush()?;

        let mut reader = BufReader::new(&self.tty);
        let mut answer = String::new();
        reader.read_line(&mut answer)?;
        Ok(())
    }
}

/// Alert that only leaves a warning in the log.
#[derive(Debug, Default)]
pub struct LogAlert;

impl AlertDisplay for LogAlert {
    fn show_alert(&mut self, message: &str) -> Result<()> {
        warn!(alert = message, "Battery alert");
        Ok(())
    }
}

/// Writes each tick to standard output and the optional title surface.
pub struct LineOutput<W: Write> {
    out: W,
    format: OutputFormat,
    title: Option<Box<dyn TitleSurface>>,
}

impl<W: Write> LineOutput<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            title: None,
        }
    }

    pub fn with_title(mut self, title: Box<dyn TitleSurface>) -> Self {
        self.title = Some(title);
        self
    }

    /// Emit one tick.
    ///
    /// Failing to write the output stream is an error, a title failure is
    /// only logged.
    pub fn emit(&mut self, snapshot: &MetricSnapshot, line: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", line)?,
            OutputFormat::Json => writeln!(self.out, "{}", snapshot.to_record(line).to_json()?)?,
        }
        self.out.flush()?;

        if let Some(title) = self.title.as_mut() {
            if let Err(e) = title.set_title(line) {
                warn!(error = %e, "Failed to update title");
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
