//! Shared output sink
//!
//! Every worker writes its results here. Each `write_line` call holds the
//! lock for the whole line, so lines from different workers never
//! interleave. Line order across workers is unspecified.

use crate::error::InputError;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Output buffer size
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Line-oriented output shared by all workers
pub struct OutputSink {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    description: String,
    lines: AtomicU64,
}

impl OutputSink {
    /// Write to standard output
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout(), "<stdout>")
    }

    /// Create (or truncate) an output file
    pub fn create(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| InputError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_writer(file, path.display().to_string()))
    }

    /// Wrap any writer
    pub fn from_writer(
        writer: impl Write + Send + 'static,
        description: impl Into<String>,
    ) -> Self {
        let writer: Box<dyn Write + Send> = Box::new(writer);
        Self {
            writer: Mutex::new(BufWriter::with_capacity(WRITE_BUFFER_SIZE, writer)),
            description: description.into(),
            lines: AtomicU64::new(0),
        }
    }

    /// Append one line; a newline is added
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        self.lines.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Flush buffered output to the underlying writer
    pub fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }

    /// Where output goes, for display
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Lines written so far
    pub fn lines_written(&self) -> u64 {
        self.lines.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink")
            .field("description", &self.description)
            .field("lines", &self.lines_written())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    /// Writer that appends into a shared buffer
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_and_flush() {
        let buf = SharedBuf::default();
        let sink = OutputSink::from_writer(buf.clone(), "memory");

        sink.write_line("U\tr1\t0").unwrap();
        sink.write_line("U\tr2\t0").unwrap();
        sink.flush().unwrap();

        assert_eq!(String::from_utf8(buf.0.lock().clone()).unwrap(), "U\tr1\t0\nU\tr2\t0\n");
        assert_eq!(sink.lines_written(), 2);
        assert_eq!(sink.description(), "memory");
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let buf = SharedBuf::default();
        let sink = Arc::new(OutputSink::from_writer(buf.clone(), "memory"));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..200 {
                        sink.write_line(&format!("thread{t}-line{i}-{}", "A".repeat(100))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        sink.flush().unwrap();

        let text = String::from_utf8(buf.0.lock().clone()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 1600);
        assert!(lines.iter().all(|l| l.starts_with("thread") && l.ends_with(&"A".repeat(100))));
    }

    #[test]
    fn test_create_in_missing_dir_fails() {
        let err = OutputSink::create("/nonexistent/dir/out.tsv").unwrap_err();
        assert!(matches!(err, InputError::Create { .. }));
    }
}
