//! Capture tracing output for assertions

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// Shared buffer that a `fmt` subscriber writes into
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Install a capturing subscriber as the thread default.
    ///
    /// Keep the guard alive for as long as output should be captured.
    /// Works with `#[tokio::test]`, which runs on the current thread.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buf.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Lines logged at ERROR level
    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.trim_start().starts_with("ERROR"))
            .collect()
    }

    /// ERROR lines containing `needle`
    pub fn errors_containing(&self, needle: &str) -> Vec<String> {
        self.errors()
            .into_iter()
            .filter(|l| l.contains(needle))
            .collect()
    }
}

pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buf: self.buf.clone(),
        }
    }
}
