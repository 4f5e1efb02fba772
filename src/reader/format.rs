//! Input format auto-detection
//!
//! The format is decided by the first byte of a stream. Detection only peeks
//! at the reader's buffer, so the first record is still there afterwards.

use crate::error::{FormatError, InputError, PipelineError, Result};
use std::fmt;
use std::io::{BufRead, ErrorKind};
use std::path::Path;

/// Sequence file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqFormat {
    /// `>` header followed by any number of sequence lines
    Fasta,
    /// Four-line records starting with `@`
    Fastq,
}

impl SeqFormat {
    /// Map a leading byte to a format
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(SeqFormat::Fasta),
            b'@' => Some(SeqFormat::Fastq),
            _ => None,
        }
    }

    /// Header marker byte for this format
    pub fn marker(self) -> u8 {
        match self {
            SeqFormat::Fasta => b'>',
            SeqFormat::Fastq => b'@',
        }
    }

    /// Detect the format of a buffered stream without consuming any bytes
    ///
    /// `path` is only used for diagnostics.
    pub fn detect<R: BufRead>(reader: &mut R, path: &Path) -> Result<Self> {
        let first = loop {
            match reader.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(PipelineError::Input(InputError::Read {
                        path: path.to_path_buf(),
                        line: 1,
                        source,
                    }))
                }
            }
        };

        let byte = first.ok_or_else(|| FormatError::EmptyInput {
            path: path.to_path_buf(),
        })?;

        SeqFormat::from_marker(byte).ok_or_else(|| {
            FormatError::Unrecognized {
                path: path.to_path_buf(),
                found: byte as char,
            }
            .into()
        })
    }
}

impl fmt::Display for SeqFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeqFormat::Fasta => write!(f, "FASTA"),
            SeqFormat::Fastq => write!(f, "FASTQ"),
        }
    }
}
