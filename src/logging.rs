//! Timestamped log sink for the `log` facade

use crate::{Error, Result};
use chrono::{Local, Utc};
use log::{LevelFilter, Metadata, Record};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Writes log lines prefixed with the elapsed seconds and the time since the
/// previous line, to a file, to stderr, or both.
///
/// Register it as the process logger with [`LogFile::install`]; a clone can
/// be kept to write directly with [`LogFile::write_line`].
#[derive(Clone)]
pub struct LogFile {
    inner: Arc<LogFileInner>,
    level: LevelFilter,
}

struct LogFileInner {
    state: Mutex<LogState>,
    start: Instant,
    echo_to_stderr: bool,
}

struct LogState {
    writer: Option<BufWriter<File>>,
    last_seconds: f32,
}

impl LogFile {
    /// Open a log file at `path` (if any), echoing to stderr when asked.
    pub fn new(path: Option<&Path>, echo_to_stderr: bool) -> Result<Self> {
        let writer = match path {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    Error::Logger(format!("Unable to create file {}: {}", path.display(), e))
                })?;
                Some(BufWriter::new(file))
            }
            None => None,
        };

        let log = Self::with_writer(writer, echo_to_stderr);
        if let Some(path) = path {
            log.write_line(format!("Opened {}", path.display()))?;
        }
        log.write_line("\n----------------------------------------\n")?;
        log.log_time()?;
        log.write_line(format!("Operating System      {}", env::consts::OS))?;
        log.write_line(format!("Architecture:         {}", env::consts::ARCH))?;
        log.write_line("\n----------------------------------------\n")?;
        Ok(log)
    }

    /// Stderr only, without a header.
    pub fn console() -> Self {
        Self::with_writer(None, true)
    }

    fn with_writer(writer: Option<BufWriter<File>>, echo_to_stderr: bool) -> Self {
        Self {
            inner: Arc::new(LogFileInner {
                state: Mutex::new(LogState {
                    writer,
                    last_seconds: 0.0,
                }),
                start: Instant::now(),
                echo_to_stderr,
            }),
            level: LevelFilter::Info,
        }
    }

    /// Most verbose level forwarded by the `log` macros (default `Info`).
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Register as the global logger.
    ///
    /// Fails if a logger is already installed in this process.
    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self)).map_err(|e| Error::Logger(e.to_string()))?;
        log::set_max_level(level);
        Ok(())
    }

    pub fn write_line(&self, message: impl AsRef<str>) -> Result<()> {
        self.inner.log_lines(message.as_ref())
    }

    pub fn log_time(&self) -> Result<()> {
        self.write_line(format!(
            "Current time (UTC): {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S (UTC)")
        ))?;
        self.write_line(format!(
            "Current local time: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S (%z)")
        ))
    }
}

impl log::Log for LogFile {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = self.inner.log_lines(&format!(
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {
        let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(writer) = state.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

impl LogFileInner {
    fn log_lines(&self, message: &str) -> Result<()> {
        let seconds = self.start.elapsed().as_secs_f32();

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let diff = seconds - state.last_seconds;
        let prefix = format!("{:7.0}s {:6.1}+ ", seconds, diff);

        for line in message.split('\n') {
            if self.echo_to_stderr {
                eprintln!("{}{}", prefix, line);
            }
            if let Some(writer) = state.writer.as_mut() {
                writer.write_all(prefix.as_bytes())?;
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
            state.last_seconds = seconds;
        }

        Ok(())
    }
}

impl Drop for LogFileInner {
    fn drop(&mut self) {
        let has_file = self
            .state
            .get_mut()
            .map(|s| s.writer.is_some())
            .unwrap_or(false);
        if !has_file {
            return;
        }
        let _ = self.log_lines("\n----------------------------------------\n");
        let _ = self.log_lines("Closing log file.");
        let _ = self.log_lines(&format!(
            "Current time (UTC): {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S (UTC)")
        ));
        let _ = self.log_lines("Done.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use std::fs;

    fn temp_log(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("sierpinski_fill_{}_{}.log", name, std::process::id()))
    }

    #[test]
    fn test_file_header_and_footer() {
        let path = temp_log("header");
        {
            let log = LogFile::new(Some(&path), false).unwrap();
            log.write_line("first\nsecond").unwrap();
        }
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Opened"));
        assert!(text.contains("Current time (UTC)"));
        assert!(text.contains("first"));
        assert!(text.contains("second"));
        assert!(text.trim_end().ends_with("Done."));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_records_filtered_by_level() {
        let path = temp_log("level");
        {
            let sink = LogFile::new(Some(&path), false)
                .unwrap()
                .with_level(LevelFilter::Warn);
            assert_eq!(sink.level(), LevelFilter::Warn);
            sink.log(
                &Record::builder()
                    .level(log::Level::Error)
                    .target("fill")
                    .args(format_args!("kept"))
                    .build(),
            );
            sink.log(
                &Record::builder()
                    .level(log::Level::Debug)
                    .target("fill")
                    .args(format_args!("dropped"))
                    .build(),
            );
            sink.flush();
        }
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[ERROR] fill: kept"));
        assert!(!text.contains("dropped"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unwritable_path() {
        let path = env::temp_dir().join("no_such_dir_sierpinski").join("x.log");
        assert!(matches!(
            LogFile::new(Some(&path), false),
            Err(Error::Logger(_))
        ));
    }
}
