//! Sequence record input
//!
//! Turns FASTA or FASTQ streams into `WorkItem`s. The format is detected from
//! the first byte of each stream.

pub mod format;
pub mod item;
pub mod records;

pub use format::SeqFormat;
pub use item::{strip_non_alpha, WorkItem};
pub use records::RecordReader;
