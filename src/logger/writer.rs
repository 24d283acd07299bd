//! Buffered file writer for the logger

use crate::logger::config::FileConfig;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Append-only log file writer shared across tracing layers
#[derive(Clone)]
pub struct LogFileWriter {
    state: Arc<Mutex<BufWriter<File>>>,
}

impl LogFileWriter {
    pub fn new(config: &FileConfig) -> anyhow::Result<Self> {
        // Create directory if it doesn't exist
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path)?;

        Ok(Self {
            state: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    /// Flush any buffered log lines to disk
    pub fn flush(&self) -> io::Result<()> {
        match self.state.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Err(io::Error::other("log writer mutex poisoned")),
        }
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = WriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        WriterGuard {
            state: Arc::clone(&self.state),
        }
    }
}

/// Write handle produced for each log event
pub struct WriterGuard {
    state: Arc<Mutex<BufWriter<File>>>,
}

impl Write for WriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.state.lock() {
            Ok(mut file) => file.write(buf),
            Err(_) => Err(io::Error::other("log writer mutex poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.state.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Err(io::Error::other("log writer mutex poisoned")),
        }
    }
}
