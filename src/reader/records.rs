//! Streaming FASTA/FASTQ record reader
//!
//! `RecordReader` is a forward-only iterator over `WorkItem`s. Memory use is
//! bounded by the longest record; nothing is read ahead beyond the reader's
//! own buffer.
//!
//! Parsing is lenient:
//! - FASTQ records are exactly four lines; the separator and quality lines
//!   are skipped without validation.
//! - FASTA sequences run until the next line starting with `>`.
//! - A record cut short by end-of-stream is yielded with whatever was read.

use crate::error::{InputError, InputResult, Result};
use crate::reader::format::SeqFormat;
use crate::reader::item::{strip_non_alpha, WorkItem};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

/// Read buffer size for input files
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Initial line buffer capacity
const LINE_CAPACITY: usize = 2048;

/// Lazy reader producing one `WorkItem` per record
pub struct RecordReader<R: BufRead> {
    reader: R,
    format: SeqFormat,
    path: PathBuf,

    /// Current line, terminator removed
    line: Vec<u8>,

    /// 1-based number of the last line read
    line_number: u64,

    /// Records yielded so far
    records: u64,

    /// Set after end-of-stream or a read error
    finished: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a file and detect its format
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| InputError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(BufReader::with_capacity(READ_BUFFER_SIZE, file), path)
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap a buffered reader, detecting the format from its first byte
    pub fn new(mut reader: R, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = SeqFormat::detect(&mut reader, &path)?;
        Ok(Self::with_format(reader, format, path))
    }

    /// Wrap a buffered reader with a known format
    pub fn with_format(reader: R, format: SeqFormat, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            format,
            path: path.into(),
            line: Vec::with_capacity(LINE_CAPACITY),
            line_number: 0,
            records: 0,
            finished: false,
        }
    }

    /// Detected format
    pub fn format(&self) -> SeqFormat {
        self.format
    }

    /// Path used in diagnostics
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records yielded so far
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Read the next line into `self.line`. Returns false at end-of-stream.
    fn read_line(&mut self) -> InputResult<bool> {
        self.line.clear();
        let n = loop {
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => return Err(self.read_error(source)),
            }
        };
        if n == 0 {
            return Ok(false);
        }

        self.line_number += 1;
        if self.line.last() == Some(&b'\n') {
            self.line.pop();
        }
        if self.line.last() == Some(&b'\r') {
            self.line.pop();
        }
        Ok(true)
    }

    /// Look at the next byte without consuming it
    fn peek_byte(&mut self) -> InputResult<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => return Err(self.read_error(source)),
            }
        }
    }

    fn read_error(&self, source: std::io::Error) -> InputError {
        InputError::Read {
            path: self.path.clone(),
            line: self.line_number + 1,
            source,
        }
    }

    /// Advance to the next non-blank line. Returns false at end-of-stream.
    fn next_header(&mut self) -> InputResult<bool> {
        while self.read_line()? {
            if !self.line.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Record name from the current header line
    fn header_name(&self) -> InputResult<String> {
        let marker = self.format.marker();
        let text = match self.line.first() {
            Some(&b) if b == marker => &self.line[1..],
            _ => &self.line[..],
        };
        String::from_utf8(text.to_vec()).map_err(|_| InputError::InvalidHeader {
            path: self.path.clone(),
            line: self.line_number,
        })
    }

    fn next_fasta(&mut self) -> InputResult<Option<WorkItem>> {
        if !self.next_header()? {
            return Ok(None);
        }
        let name = self.header_name()?;

        let mut raw = Vec::with_capacity(LINE_CAPACITY);
        while let Some(byte) = self.peek_byte()? {
            if byte == b'>' {
                break;
            }
            self.read_line()?;
            raw.extend_from_slice(&self.line);
        }

        Ok(Some(WorkItem::new(name, strip_non_alpha(&raw))))
    }

    fn next_fastq(&mut self) -> InputResult<Option<WorkItem>> {
        if !self.next_header()? {
            return Ok(None);
        }
        let name = self.header_name()?;

        let sequence = if self.read_line()? {
            strip_non_alpha(&self.line)
        } else {
            String::new()
        };

        // '+' separator and quality line, both ignored
        self.read_line()?;
        self.read_line()?;

        Ok(Some(WorkItem::new(name, sequence)))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = InputResult<WorkItem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = match self.format {
            SeqFormat::Fasta => self.next_fasta(),
            SeqFormat::Fastq => self.next_fastq(),
        };

        match result {
            Ok(Some(item)) => {
                self.records += 1;
                Some(Ok(item))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FormatError, PipelineError};
    use std::io::{self, Cursor, Read};

    fn read_all(data: &str) -> Vec<WorkItem> {
        RecordReader::new(Cursor::new(data.as_bytes().to_vec()), "test")
            .unwrap()
            .collect::<InputResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_fasta_basic() {
        let items = read_all(">r1\nAAAA\n>r2\nCCCC\n");
        assert_eq!(items, vec![WorkItem::new("r1", "AAAA"), WorkItem::new("r2", "CCCC")]);
    }

    #[test]
    fn test_fasta_multiline_and_strip() {
        let items = read_all(">prot1 some description\nMKV-LA\nGG*\n  \n>prot2\nAC GT 12\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "prot1 some description");
        assert_eq!(items[0].sequence, "MKVLAGG");
        assert_eq!(items[1].sequence, "ACGT");
    }

    #[test]
    fn test_fasta_header_only_at_eof() {
        let items = read_all(">r1\nAC\n>r2");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], WorkItem::new("r2", ""));
    }

    #[test]
    fn test_fasta_crlf() {
        let items = read_all(">r1\r\nAC\r\nGT\r\n");
        assert_eq!(items, vec![WorkItem::new("r1", "ACGT")]);
    }

    #[test]
    fn test_fastq_basic() {
        let items = read_all("@read1\nACGT\n+\nIIII\n@read2\nTTGCA\n+read2\nIIIII\n");
        assert_eq!(items, vec![WorkItem::new("read1", "ACGT"), WorkItem::new("read2", "TTGCA")]);
    }

    #[test]
    fn test_fastq_quality_not_validated() {
        // Quality lines that start with '@' or have the wrong length are skipped as-is
        let items = read_all("@r1\nACGT\n+\n@@\n@r2\nGG\n+\nIIIIIIII\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], WorkItem::new("r1", "ACGT"));
        assert_eq!(items[1], WorkItem::new("r2", "GG"));
    }

    #[test]
    fn test_fastq_sequence_stripped() {
        let items = read_all("@r1\nAC.GT-N\n+\nIIIIIII\n");
        assert_eq!(items[0].sequence, "ACGTN");
    }

    #[test]
    fn test_fastq_truncated_record() {
        let items = read_all("@r1\nACGT\n+\nIIII\n@r2\nGG\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], WorkItem::new("r2", "GG"));

        let items = read_all("@r1\nACGT\n+\nIIII\n@r2");
        assert_eq!(items[1], WorkItem::new("r2", ""));
    }

    #[test]
    fn test_fastq_trailing_blank_lines() {
        let items = read_all("@r1\nACGT\n+\nIIII\n\n\n");
        assert_eq!(items, vec![WorkItem::new("r1", "ACGT")]);
    }

    #[test]
    fn test_records_read_counter() {
        let data = b">a\nA\n>b\nC\n>c\nG\n".to_vec();
        let mut reader = RecordReader::new(Cursor::new(data), "t").unwrap();
        assert_eq!(reader.format(), SeqFormat::Fasta);
        while reader.next().is_some() {}
        assert_eq!(reader.records_read(), 3);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_unrecognized_format() {
        let result = RecordReader::new(Cursor::new(b"Xr1\nAAAA\n".to_vec()), "bad.txt");
        assert!(matches!(
            result,
            Err(PipelineError::Format(FormatError::Unrecognized { found: 'X', .. }))
        ));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = RecordReader::from_path("/nonexistent/reads.fq");
        assert!(matches!(result, Err(PipelineError::Input(InputError::Open { .. }))));
    }

    /// Reader that fails after delivering its prefix
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_stops_iteration() {
        let inner = FailingReader {
            data: Cursor::new(b">r1\nAC\n".to_vec()),
        };
        let mut reader = RecordReader::new(BufReader::with_capacity(4, inner), "flaky.fa").unwrap();

        let first = reader.next().unwrap();
        assert!(matches!(first, Err(InputError::Read { .. })));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_invalid_utf8_header_is_rejected() {
        let data = b">ok\nAC\n>r\xff1 desc\nACGT\n".to_vec();
        let mut reader = RecordReader::new(Cursor::new(data), "latin1.fa").unwrap();

        assert_eq!(reader.next().unwrap().unwrap(), WorkItem::new("ok", "AC"));
        match reader.next().unwrap() {
            Err(InputError::InvalidHeader { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_utf8_header_kept_verbatim() {
        let items = read_all("@r\u{e9}ad/1 sample=\u{3b1}\nAC\n+\nII\n");
        assert_eq!(items[0].name, "r\u{e9}ad/1 sample=\u{3b1}");
    }
}
