use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::DocId;

/// One occurrence record of a term in a document.
///
/// Postings are identified by their document id alone: within one term's
/// posting list there is at most one posting per document, and two postings
/// compare equal whenever they point at the same document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub document_id: DocId,
    /// Number of occurrences of the term in the document, always >= 1.
    pub term_frequency: u32,
    /// Cached `idf * (1 + log10(tf))`, valid after a recalculation pass.
    pub tf_idf: f64,
}

impl Posting {
    pub fn new(document_id: impl Into<DocId>) -> Self {
        Self { document_id: document_id.into(), term_frequency: 1, tf_idf: 0.0 }
    }

    pub fn increment(&mut self) {
        self.term_frequency += 1;
    }

    /// Log-weighted term frequency; 0 for an absent term.
    pub fn log_tf(&self) -> f64 {
        log_tf(self.term_frequency)
    }

    pub fn recalculate_tf_idf(&mut self, idf: f64) {
        self.tf_idf = idf * self.log_tf();
    }
}

/// `1 + log10(tf)` for `tf > 0`, otherwise 0.
pub fn log_tf(tf: u32) -> f64 {
    if tf > 0 { 1.0 + (tf as f64).log10() } else { 0.0 }
}

impl PartialEq for Posting {
    fn eq(&self, other: &Self) -> bool {
        self.document_id == other.document_id
    }
}

impl Eq for Posting {}

impl PartialOrd for Posting {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Posting lists are merged in document id order.
impl Ord for Posting {
    fn cmp(&self, other: &Self) -> Ordering {
        self.document_id.cmp(&other.document_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_frequency() {
        let mut a = Posting::new("d1");
        a.increment();
        let b = Posting::new("d1");
        assert_eq!(a, b);
        assert_ne!(a, Posting::new("d2"));
    }

    #[test]
    fn tf_idf_uses_log_weighted_tf() {
        let mut p = Posting::new("d1");
        p.increment();
        p.recalculate_tf_idf(0.5);
        assert!((p.tf_idf - 0.5 * (1.0 + 2f64.log10())).abs() < 1e-12);
    }

    #[test]
    fn zero_frequency_has_zero_weight() {
        assert_eq!(log_tf(0), 0.0);
        assert_eq!(log_tf(1), 1.0);
    }
}
