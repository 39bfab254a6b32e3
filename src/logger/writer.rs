//! Log writer module
//!
//! Thread-safe log output to files or stdout/stderr. File targets can be
//! reopened in place after external log rotation.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

enum LogTarget {
    Stdout,
    Stderr,
    File { path: String, file: File },
}

impl LogTarget {
    fn open(path: Option<&str>, fallback: fn() -> Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File {
                path: p.to_string(),
                file: open_log_file(p)?,
            }),
            None => Ok(fallback()),
        }
    }

    fn write_line(&mut self, message: &str) {
        match self {
            Self::Stdout => write_line_to(&mut io::stdout().lock(), message),
            Self::Stderr => write_line_to(&mut io::stderr().lock(), message),
            Self::File { file, .. } => write_line_to(file, message),
        }
    }

    fn reopen(&mut self) -> io::Result<()> {
        if let Self::File { path, file } = self {
            *file = open_log_file(path)?;
        }
        Ok(())
    }
}

/// Access/info and error log targets
pub struct LogWriter {
    access: Mutex<LogTarget>,
    error: Mutex<LogTarget>,
}

impl LogWriter {
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            access: Mutex::new(LogTarget::open(access_log_file, || LogTarget::Stdout)?),
            error: Mutex::new(LogTarget::open(error_log_file, || LogTarget::Stderr)?),
        })
    }

    /// Write to access log (also used for info messages)
    pub fn write_access(&self, message: &str) {
        lock(&self.access).write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        lock(&self.error).write_line(message);
    }

    /// Reopen file targets, e.g. after logrotate moved them away
    pub fn reopen(&self) -> io::Result<()> {
        lock(&self.access).reopen()?;
        lock(&self.error).reopen()
    }
}

fn lock(target: &Mutex<LogTarget>) -> MutexGuard<'_, LogTarget> {
    target.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Write one line, dropping the error. A closed stdout or a full disk must
/// never affect request handling.
pub fn write_line_to(out: &mut impl Write, message: &str) {
    let _ = writeln!(out, "{message}");
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer. Fails if a log file cannot be opened
/// or the writer was already initialized.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// The global writer, if `init()` has been called
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Behaves like a pipe whose reader went away
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_failed_write_is_dropped() {
        let mut out = BrokenPipe;
        write_line_to(&mut out, "[Summary] month=2025-11, type=weekly");
        write_line_to(&mut out, "second line still does not panic");
    }

    #[test]
    fn test_file_targets_append_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let access = dir.path().join("logs/access.log");
        let error = dir.path().join("logs/error.log");
        let writer =
            LogWriter::new(access.to_str(), error.to_str()).expect("log files should open");

        writer.write_access("first");
        std::fs::rename(&access, dir.path().join("logs/access.log.1")).unwrap();
        writer.reopen().unwrap();
        writer.write_access("second");
        writer.write_error("oops");

        assert_eq!(std::fs::read_to_string(&access).unwrap(), "second\n");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("logs/access.log.1")).unwrap(),
            "first\n"
        );
        assert_eq!(std::fs::read_to_string(&error).unwrap(), "oops\n");
    }
}
