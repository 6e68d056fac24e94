use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::algebra::{and_intersect, and_not, or_intersect};
use crate::error::{Result, SearchError};
use crate::query::{OperatorNode, QueryNode};
use crate::{DocId, Posting};

/// Freshness of the cached IDF / TF-IDF statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexState {
    /// Documents were added since the last recalculation; caches are stale.
    #[default]
    Building,
    /// Term IDFs are current, posting TF-IDFs and document norms are not.
    IdfReady,
    /// All cached statistics match the indexed documents.
    Finalized,
}

/// Term → document → posting index with cached TF-IDF statistics.
///
/// Indexing and finalizing are two explicit phases: [`index_document`] only
/// counts frequencies, and the cached statistics are refreshed by
/// [`recalculate_term_idfs`] followed by [`recalculate_document_tf_idfs`]
/// (or [`finalize`]).
///
/// [`index_document`]: InvertedIndex::index_document
/// [`recalculate_term_idfs`]: InvertedIndex::recalculate_term_idfs
/// [`recalculate_document_tf_idfs`]: InvertedIndex::recalculate_document_tf_idfs
/// [`finalize`]: InvertedIndex::finalize
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    /// postings per term, keyed (and therefore sorted) by document id
    postings: HashMap<String, BTreeMap<DocId, Posting>>,
    indexed_documents: BTreeSet<DocId>,
    term_idf: HashMap<String, f64>,
    document_tf_idf_norm: HashMap<DocId, f64>,
    state: IndexState,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Adds one document given as preprocessed tokens.
    ///
    /// Fails without touching the index when `document_id` is already present.
    pub fn index_document<S: AsRef<str>>(&mut self, tokens: &[S], document_id: &str) -> Result<()> {
        if self.indexed_documents.contains(document_id) {
            return Err(SearchError::DuplicateDocument(document_id.to_string()));
        }
        self.indexed_documents.insert(document_id.to_string());
        for token in tokens {
            self.postings
                .entry(token.as_ref().to_string())
                .or_default()
                .entry(document_id.to_string())
                .and_modify(Posting::increment)
                .or_insert_with(|| Posting::new(document_id));
        }
        self.state = IndexState::Building;
        Ok(())
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.state == IndexState::Finalized
    }

    pub fn document_count(&self) -> usize {
        self.indexed_documents.len()
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Indexed document ids in ascending order.
    pub fn indexed_documents(&self) -> &BTreeSet<DocId> {
        &self.indexed_documents
    }

    pub fn contains_document(&self, document_id: &str) -> bool {
        self.indexed_documents.contains(document_id)
    }

    /// Every indexed term, in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Terms occurring in a document. Scans the whole dictionary.
    pub fn terms_in_document(&self, document_id: &str) -> Vec<&str> {
        self.postings
            .iter()
            .filter(|(_, docs)| docs.contains_key(document_id))
            .map(|(term, _)| term.as_str())
            .collect()
    }

    /// Number of distinct documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, BTreeMap::len)
    }

    pub fn term_frequency(&self, term: &str, document_id: &str) -> u32 {
        self.postings
            .get(term)
            .and_then(|docs| docs.get(document_id))
            .map_or(0, |p| p.term_frequency)
    }

    /// Recomputes `idf = log10(N / df)` for every term.
    pub fn recalculate_term_idfs(&mut self) {
        let n = self.document_count() as f64;
        self.term_idf = self
            .postings
            .iter()
            .map(|(term, docs)| (term.clone(), (n / docs.len() as f64).log10()))
            .collect();
        self.state = IndexState::IdfReady;
        tracing::debug!(terms = self.term_idf.len(), "recalculated term idfs");
    }

    /// Cached IDF of a term; 0 for unknown terms or before the first recalculation.
    pub fn idf(&self, term: &str) -> f64 {
        self.term_idf.get(term).copied().unwrap_or(0.0)
    }

    /// Recomputes every posting's TF-IDF and every document's TF-IDF vector
    /// norm from the cached IDFs.
    ///
    /// The index only becomes `Finalized` when the IDFs are current; a pass
    /// run while still `Building` leaves the state there.
    pub fn recalculate_document_tf_idfs(&mut self) {
        let stale = self.state == IndexState::Building;
        if stale {
            tracing::warn!("recalculating tf-idf with stale term idfs");
        }
        let mut sums: HashMap<DocId, f64> =
            self.indexed_documents.iter().map(|d| (d.clone(), 0.0)).collect();
        for (term, docs) in self.postings.iter_mut() {
            let idf = self.term_idf.get(term).copied().unwrap_or(0.0);
            for posting in docs.values_mut() {
                posting.recalculate_tf_idf(idf);
                *sums.entry(posting.document_id.clone()).or_insert(0.0) += posting.tf_idf * posting.tf_idf;
            }
        }
        self.document_tf_idf_norm = sums.into_iter().map(|(d, s)| (d, s.sqrt())).collect();
        if !stale {
            self.state = IndexState::Finalized;
        }
        tracing::debug!(documents = self.document_tf_idf_norm.len(), "recalculated document tf-idf");
    }

    /// Both recalculation passes, in order.
    pub fn finalize(&mut self) {
        self.recalculate_term_idfs();
        self.recalculate_document_tf_idfs();
    }

    pub fn tf_idf(&self, term: &str, document_id: &str) -> f64 {
        self.postings
            .get(term)
            .and_then(|docs| docs.get(document_id))
            .map_or(0.0, |p| p.tf_idf)
    }

    pub fn tf_idf_norm(&self, document_id: &str) -> f64 {
        self.document_tf_idf_norm.get(document_id).copied().unwrap_or(0.0)
    }

    /// Postings of a term sorted by document id; empty for unknown terms.
    pub fn postings_for_term(&self, term: &str) -> Vec<Posting> {
        self.postings
            .get(term)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// One posting for every document holding at least one term except
    /// `excluded`, sorted by document id.
    fn postings_excluding(&self, excluded: Option<&str>) -> Vec<Posting> {
        let mut universe: BTreeMap<&str, &Posting> = BTreeMap::new();
        let mut terms: Vec<&String> = self.postings.keys().collect();
        terms.sort();
        for term in terms {
            if Some(term.as_str()) == excluded { continue; }
            for (doc, posting) in &self.postings[term] {
                universe.entry(doc.as_str()).or_insert(posting);
            }
        }
        let all: Vec<Posting> = universe.into_values().cloned().collect();
        match excluded {
            Some(term) => and_not(&all, &self.postings_for_term(term)),
            None => all,
        }
    }

    /// Evaluates a boolean query tree into a sorted posting list.
    pub fn postings_for_query(&self, node: &QueryNode) -> Vec<Posting> {
        self.evaluate(node, false)
    }

    fn evaluate(&self, node: &QueryNode, negated: bool) -> Vec<Posting> {
        match node {
            QueryNode::Term(term) if negated => self.postings_excluding(Some(term)),
            QueryNode::Term(term) => self.postings_for_term(term),
            QueryNode::Operator(op) => {
                let matched = self.evaluate_operator(op);
                if negated {
                    and_not(&self.postings_excluding(None), &matched)
                } else {
                    matched
                }
            }
        }
    }

    fn evaluate_operator(&self, op: &OperatorNode) -> Vec<Posting> {
        // None means "no constraint yet": the first child seeds the accumulator.
        let fold = |children: &[QueryNode], merge: fn(&[Posting], &[Posting]) -> Vec<Posting>| {
            children.iter().fold(None, |acc: Option<Vec<Posting>>, child| {
                let list = self.evaluate(child, false);
                Some(match acc {
                    Some(acc) => merge(&acc, &list),
                    None => list,
                })
            })
        };
        let must = fold(&op.must, and_intersect);
        let should = fold(&op.should, or_intersect);
        // SHOULD clauses only restrict the result when there is no MUST clause
        let mut acc = must.or(should);
        for child in &op.must_not {
            let allowed = self.evaluate(child, true);
            acc = Some(match acc {
                Some(acc) => and_intersect(&acc, &allowed),
                None => allowed,
            });
        }
        acc.unwrap_or_default()
    }

    /// Encodes the whole index, statistics included.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| SearchError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| SearchError::Serialization(e.to_string()))
    }
}
