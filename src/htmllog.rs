//! Append-only HTML run log written by the `StartLog` family of commands.
//!
//! Each log gets a fresh file named `<base>_<YYYYmmdd_HHMMSS>.html` inside the
//! configured log directory. Every entry is flushed as soon as it is written,
//! so an aborted run still leaves a readable (unterminated) document.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, Result};

/// Severity of a log entry; selects the CSS class of the paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Normal,
    Warning,
    Error,
    Header,
}

impl LogLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            LogLevel::Normal => "normal",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Header => "header",
        }
    }
}

/// Emit a script log message as a tracing event at the matching level.
pub fn mirror(level: LogLevel, message: &str) {
    match level {
        LogLevel::Warning => warn!(target: "uiscript::htmllog", "{message}"),
        LogLevel::Error => error!(target: "uiscript::htmllog", "{message}"),
        LogLevel::Normal | LogLevel::Header => info!(target: "uiscript::htmllog", "{message}"),
    }
}

/// An open HTML log stream.
#[derive(Debug)]
pub struct HtmlLog {
    file: File,
    path: PathBuf,
}

impl HtmlLog {
    /// Open a new log stamped with the current local time.
    pub fn start(dir: &Path, base_name: &str) -> Result<Self> {
        Self::start_at(dir, base_name, Local::now())
    }

    /// Open a new log stamped with `now`. Fails with `LogFileExists` rather
    /// than overwriting an existing file.
    pub fn start_at(dir: &Path, base_name: &str, now: DateTime<Local>) -> Result<Self> {
        let stamp = now.format("%Y%m%d_%H%M%S").to_string();
        let path = dir.join(format!("{base_name}_{stamp}.html"));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => EngineError::LogFileExists(path.clone()),
                _ => EngineError::LogIo {
                    path: path.clone(),
                    source: e,
                },
            })?;

        let mut log = Self { file, path };
        let header = format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <title>Automation Log - {stamp}</title>\n\
             <style>\n\
             .normal {{ color: black; }}\n\
             .warning {{ color: orange; }}\n\
             .error {{ color: red; }}\n\
             .header {{ font-size: 1.5em; font-weight: bold; }}\n\
             </style>\n\
             </head>\n\
             <body>\n\
             <h1>Automation Log - Started at {stamp}</h1>\n"
        );
        log.append(&header)?;
        debug!(target: "uiscript::htmllog", path = %log.path.display(), "Log started");
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped entry and mirror it to diagnostics.
    pub fn write(&mut self, level: LogLevel, message: &str) -> Result<()> {
        self.write_at(level, message, Local::now())
    }

    fn write_at(&mut self, level: LogLevel, message: &str, now: DateTime<Local>) -> Result<()> {
        mirror(level, message);
        let line = format!(
            "<p class=\"{}\">[{}] {}</p>\n",
            level.css_class(),
            now.format("%H:%M:%S"),
            escape(message)
        );
        self.append(&line)
    }

    /// Write the footer and close the file. Returns the log's path.
    pub fn end(mut self) -> Result<PathBuf> {
        let footer = format!(
            "<hr>\n<p>Log ended at: {}</p>\n</body>\n</html>\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        self.append(&footer)?;
        debug!(target: "uiscript::htmllog", path = %self.path.display(), "Log closed");
        Ok(self.path)
    }

    fn append(&mut self, text: &str) -> Result<()> {
        self.file
            .write_all(text.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|source| EngineError::LogIo {
                path: self.path.clone(),
                source,
            })
    }
}

/// Escape the characters HTML treats specially in text content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn file_name_carries_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let log = HtmlLog::start_at(dir.path(), "run", fixed_time()).unwrap();
        assert_eq!(
            log.path().file_name().unwrap().to_str().unwrap(),
            "run_20240309_140507.html"
        );
    }

    #[test]
    fn refuses_to_overwrite_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let _first = HtmlLog::start_at(dir.path(), "run", fixed_time()).unwrap();
        let err = HtmlLog::start_at(dir.path(), "run", fixed_time()).unwrap_err();
        assert!(matches!(err, EngineError::LogFileExists(_)));
    }

    #[test]
    fn entries_are_flushed_and_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = HtmlLog::start_at(dir.path(), "run", fixed_time()).unwrap();
        log.write_at(LogLevel::Warning, "a < b & \"c\"", fixed_time())
            .unwrap();

        let partial = std::fs::read_to_string(log.path()).unwrap();
        assert!(partial.contains("<h1>Automation Log - Started at 20240309_140507</h1>"));
        assert!(partial.contains(
            "<p class=\"warning\">[14:05:07] a &lt; b &amp; &quot;c&quot;</p>"
        ));
        assert!(!partial.contains("</html>"));

        let path = log.end().unwrap();
        let full = std::fs::read_to_string(path).unwrap();
        assert!(full.contains("<hr>"));
        assert!(full.trim_end().ends_with("</html>"));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HtmlLog::start_at(&dir.path().join("nope"), "run", fixed_time()).unwrap_err();
        assert!(matches!(err, EngineError::LogIo { .. }));
    }
}
