//! Retrieval split into single units of work.
//!
//! An [`IncrementalRetrieval`] is created for exactly one query. Each call to
//! [`one_step`](IncrementalRetrieval::one_step) scores one posting or document
//! and pushes it into the result heap, so a caller (a UI loop, a CLI progress
//! bar) can drive boolean and ranked retrieval the same way and report
//! progress in between. Cancelling is simply not calling `one_step` again.

use crate::config::{DEFAULT_MAX_PROGRESS, DEFAULT_MIN_SCORE};
use crate::results::{SearchResult, TopK};
use crate::similarity::SimilarityCalculator;
use crate::{DocId, Posting};

/// Fixed sequence of work a retrieval walks through.
#[derive(Debug, Clone)]
pub enum WorkUnits {
    /// Postings of an evaluated boolean query.
    Postings(Vec<Posting>),
    /// Plain document ids, e.g. the whole corpus for a ranked scan.
    Documents(Vec<DocId>),
}

impl WorkUnits {
    fn into_document_ids(self) -> Vec<DocId> {
        match self {
            WorkUnits::Postings(p) => p.into_iter().map(|p| p.document_id).collect(),
            WorkUnits::Documents(d) => d,
        }
    }
}

/// How a unit of work is scored.
pub enum Scoring<'a> {
    /// Every unit matches with score 1.
    Boolean,
    /// Cosine similarity against the query.
    Ranked(SimilarityCalculator<'a>),
}

pub struct IncrementalRetrieval<'a> {
    units: std::vec::IntoIter<DocId>,
    total: usize,
    processed: usize,
    max_progress: u32,
    min_score: f64,
    scoring: Scoring<'a>,
    results: TopK,
}

impl<'a> IncrementalRetrieval<'a> {
    pub fn new(units: WorkUnits, scoring: Scoring<'a>) -> Self {
        let ids = units.into_document_ids();
        let total = ids.len();
        Self {
            units: ids.into_iter(),
            total,
            processed: 0,
            max_progress: DEFAULT_MAX_PROGRESS,
            min_score: DEFAULT_MIN_SCORE,
            scoring,
            results: TopK::new(),
        }
    }

    /// Boolean retrieval over the postings a query evaluated to.
    pub fn boolean(postings: Vec<Posting>) -> Self {
        Self::new(WorkUnits::Postings(postings), Scoring::Boolean)
    }

    /// Ranked retrieval scoring each unit with `calculator`.
    pub fn ranked(units: WorkUnits, calculator: SimilarityCalculator<'a>) -> Self {
        Self::new(units, Scoring::Ranked(calculator))
    }

    pub fn with_max_progress(mut self, max_progress: u32) -> Self {
        self.max_progress = max_progress;
        self
    }

    /// Keeps only the best `limit` hits while stepping (`None` keeps all).
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.results = TopK::with_limit(limit);
        self
    }

    /// Ranked hits scoring at or below `min_score` are skipped.
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    /// Processes one unit of work. Does nothing once done.
    pub fn one_step(&mut self) {
        let Some(document_id) = self.units.next() else { return };
        match &self.scoring {
            Scoring::Boolean => self.results.push(document_id, 1.0),
            Scoring::Ranked(calculator) => {
                let score = calculator.calculate_score(&document_id);
                if score > self.min_score {
                    self.results.push(document_id, score);
                }
            }
        }
        self.processed += 1;
    }

    /// True once every unit has been processed.
    pub fn done(&self) -> bool {
        self.processed >= self.total
    }

    /// Integer progress in `[0, max_progress]`; equals `max_progress` exactly
    /// when done (and stays 0 for an empty retrieval).
    pub fn progress(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.processed as u64 * self.max_progress as u64 / self.total as u64) as u32
    }

    pub fn max_progress(&self) -> u32 {
        self.max_progress
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self.scoring, Scoring::Ranked(_))
    }

    /// Steps until done.
    pub fn run_to_end(&mut self) {
        while !self.done() {
            self.one_step();
        }
    }

    /// Results collected so far, not yet ranked.
    pub fn results(&self) -> &TopK {
        &self.results
    }

    /// Consumes the retrieval and ranks the best `k` results (`None` for all).
    pub fn into_results(self, k: Option<usize>) -> Vec<SearchResult> {
        self.results.take_top(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InvertedIndex;

    fn corpus() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.index_document(&["car", "insurance", "auto", "insurance"], "d1").unwrap();
        index.index_document(&["worst", "car", "auto", "insurance"], "d2").unwrap();
        index.index_document(&["completely", "irrelevant"], "d3").unwrap();
        index.finalize();
        index
    }

    #[test]
    fn empty_retrieval_is_done_immediately() {
        let r = IncrementalRetrieval::boolean(Vec::new());
        assert!(r.done());
        assert_eq!(r.progress(), 0);
        assert!(r.into_results(None).is_empty());
    }

    #[test]
    fn progress_is_monotonic_and_hits_max_when_done() {
        let ids: Vec<DocId> = (0..7).map(|i| format!("d{i}")).collect();
        let mut r = IncrementalRetrieval::new(WorkUnits::Documents(ids), Scoring::Boolean);
        let mut last = r.progress();
        while !r.done() {
            assert!(last < 100);
            r.one_step();
            assert!(r.progress() >= last);
            last = r.progress();
        }
        assert_eq!(r.progress(), 100);
        assert_eq!(r.processed(), 7);
    }

    #[test]
    fn custom_max_progress() {
        let postings = vec![Posting::new("a"), Posting::new("b"), Posting::new("c")];
        let mut r = IncrementalRetrieval::boolean(postings).with_max_progress(1000);
        r.one_step();
        assert_eq!(r.progress(), 333);
        r.run_to_end();
        assert_eq!(r.progress(), 1000);
    }

    #[test]
    fn step_after_done_is_noop() {
        let mut r = IncrementalRetrieval::boolean(vec![Posting::new("a")]);
        r.one_step();
        r.one_step();
        assert_eq!(r.processed(), 1);
        assert_eq!(r.results().len(), 1);
    }

    #[test]
    fn limit_bounds_collected_results() {
        let postings: Vec<Posting> = ["e", "c", "a", "d", "b"].into_iter().map(Posting::new).collect();
        let mut r = IncrementalRetrieval::boolean(postings).with_limit(Some(2));
        while !r.done() {
            r.one_step();
            assert!(r.results().len() <= 2);
        }
        assert_eq!(r.processed(), 5);
        assert_eq!(r.progress(), 100);
        let ids: Vec<String> = r.into_results(None).into_iter().map(|res| res.document_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn boolean_scores_are_constant() {
        let mut r = IncrementalRetrieval::boolean(vec![Posting::new("b"), Posting::new("a")]);
        r.run_to_end();
        let results = r.into_results(None);
        assert!(results.iter().all(|res| res.score == 1.0));
        assert_eq!(results[0].document_id, "a");
    }

    #[test]
    fn ranked_skips_non_matching_documents() {
        let index = corpus();
        let calc = SimilarityCalculator::new(&index, &["car", "insurance"]);
        let units = WorkUnits::Documents(index.indexed_documents().iter().cloned().collect());
        let mut r = IncrementalRetrieval::ranked(units, calc);
        assert!(r.is_ranked());
        r.run_to_end();
        assert_eq!(r.progress(), 100);
        let results = r.into_results(Some(10));
        let ids: Vec<&str> = results.iter().map(|r| r.document_id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2"]);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn ranked_over_boolean_postings() {
        let index = corpus();
        let postings = index.postings_for_term("worst");
        let calc = SimilarityCalculator::new(&index, &["car"]);
        let mut r = IncrementalRetrieval::ranked(WorkUnits::Postings(postings), calc);
        r.run_to_end();
        let results = r.into_results(None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, "d2");
    }
}
