use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::DocId;

/// One ranked hit. Ranks start at 1 for the best score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: DocId,
    pub score: f64,
    pub rank: usize,
}

impl SearchResult {
    /// Line in TREC run format: `topic Q0 doc rank score run`.
    pub fn to_trec_line(&self, topic_id: &str, run_id: &str) -> String {
        format!("{topic_id} Q0 {} {} {} {run_id}", self.document_id, self.rank, self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    score: OrderedFloat<f64>,
    document_id: DocId,
}

impl Ord for Candidate {
    // higher score ranks first; equal scores rank by ascending document id
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.document_id.cmp(&self.document_id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Scored documents awaiting ranking.
///
/// With a limit, only the best `limit` candidates are kept: the heap is a
/// min-heap and the worst entry is evicted on overflow.
#[derive(Debug, Default)]
pub struct TopK {
    limit: Option<usize>,
    heap: BinaryHeap<Reverse<Candidate>>,
}

impl TopK {
    pub fn new() -> Self { Self::default() }

    /// Keeps at most `limit` candidates (`None` keeps all).
    pub fn with_limit(limit: Option<usize>) -> Self {
        let capacity = limit.map_or(0, |k| k.min(1024) + 1);
        Self { limit, heap: BinaryHeap::with_capacity(capacity) }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn push(&mut self, document_id: impl Into<DocId>, score: f64) {
        self.heap.push(Reverse(Candidate { score: OrderedFloat(score), document_id: document_id.into() }));
        if self.limit.is_some_and(|k| self.heap.len() > k) {
            self.heap.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drains up to `k` best candidates (all kept ones for `None`) and
    /// assigns ranks 1..=k in descending score order.
    pub fn take_top(self, k: Option<usize>) -> Vec<SearchResult> {
        // ascending Reverse order is descending candidate order
        let sorted = self.heap.into_sorted_vec();
        let max = k.map_or(sorted.len(), |k| k.min(sorted.len()));
        sorted
            .into_iter()
            .take(max)
            .enumerate()
            .map(|(i, Reverse(c))| SearchResult { document_id: c.document_id, score: c.score.into_inner(), rank: i + 1 })
            .collect()
    }
}
