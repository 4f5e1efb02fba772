//! Work items handed from the producer to the worker pool

/// One sequence record queued for classification
///
/// Items move by value: parser -> queue -> worker. A worker drops the item
/// once the classifier returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Header text with the record marker removed
    pub name: String,

    /// Sequence with everything but ASCII letters removed
    pub sequence: String,

    /// Mate sequence, only set when paired inputs are zipped
    pub mate: Option<String>,
}

impl WorkItem {
    /// Create a single-end work item
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            mate: None,
        }
    }

    /// Attach a mate sequence
    pub fn with_mate(mut self, mate: impl Into<String>) -> Self {
        self.mate = Some(mate.into());
        self
    }

    /// Returns true if this item carries a mate
    pub fn is_paired(&self) -> bool {
        self.mate.is_some()
    }

    /// Total residues across the read and its mate
    pub fn total_len(&self) -> usize {
        self.sequence.len() + self.mate.as_ref().map_or(0, String::len)
    }
}

/// Keep only ASCII letters from a raw sequence line
pub fn strip_non_alpha(raw: &[u8]) -> String {
    raw.iter()
        .filter(|b| b.is_ascii_alphabetic())
        .map(|&b| b as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_non_alpha() {
        assert_eq!(strip_non_alpha(b"AC GT\t12*-ac"), "ACGTac");
        assert_eq!(strip_non_alpha(b"  \r"), "");
        assert_eq!(strip_non_alpha(b"MKV*"), "MKV");
    }

    #[test]
    fn test_with_mate() {
        let item = WorkItem::new("r1/1", "ACGT");
        assert!(!item.is_paired());
        assert_eq!(item.total_len(), 4);

        let item = item.with_mate("GG");
        assert!(item.is_paired());
        assert_eq!(item.total_len(), 6);
    }
}
