//! The search engine facade: one preprocessor, one index, one configuration.

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::document::Document;
use crate::error::Result;
use crate::query::{QueryNode, QueryParser};
use crate::results::SearchResult;
use crate::retrieval::{IncrementalRetrieval, WorkUnits};
use crate::similarity::SimilarityCalculator;
use crate::tokenizer::{Preprocessor, TextPreprocessor};
use crate::InvertedIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Operator query, every matching document scores 1.
    Boolean,
    /// Free text query ranked by cosine similarity.
    Ranked,
}

pub struct SearchEngine<P = TextPreprocessor> {
    preprocessor: P,
    config: SearchConfig,
    index: InvertedIndex,
}

impl Default for SearchEngine<TextPreprocessor> {
    fn default() -> Self {
        Self::new(TextPreprocessor::default(), SearchConfig::default())
    }
}

impl<P: Preprocessor> SearchEngine<P> {
    pub fn new(preprocessor: P, config: SearchConfig) -> Self {
        Self { preprocessor, config, index: InvertedIndex::new() }
    }

    /// Replaces the (empty) index with one built or loaded elsewhere. It must
    /// have been built with an equivalent preprocessor.
    pub fn with_index(mut self, index: InvertedIndex) -> Self {
        self.index = index;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    pub fn preprocessor(&self) -> &P {
        &self.preprocessor
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn into_index(self) -> InvertedIndex {
        self.index
    }

    pub fn document_count(&self) -> usize {
        self.index.document_count()
    }

    /// Indexes a single document without recalculating statistics; call
    /// [`recalculate`](Self::recalculate) before searching.
    pub fn index_document(&mut self, document: &Document) -> Result<()> {
        let tokens = self.preprocessor.process_text(&document.text);
        self.index.index_document(&tokens, &document.id)
    }

    /// Indexes a batch and recalculates. Stops at the first duplicate id; the
    /// documents before it stay indexed and the index is left unfinalized.
    pub fn index_documents(&mut self, documents: &[Document]) -> Result<()> {
        let total = documents.len();
        let step = (total / 10).max(1);
        for (i, document) in documents.iter().enumerate() {
            self.index_document(document)?;
            let indexed = i + 1;
            if indexed % step == 0 {
                tracing::debug!(indexed, total, percent = indexed * 100 / total, "indexing documents");
            }
        }
        self.recalculate();
        tracing::info!(
            documents = self.index.document_count(),
            terms = self.index.term_count(),
            "index ready"
        );
        Ok(())
    }

    pub fn recalculate(&mut self) {
        self.index.finalize();
    }

    /// Turns query text into a processed query tree.
    pub fn parse_query(&self, text: &str, mode: SearchMode, parser: &dyn QueryParser) -> Result<QueryNode> {
        match mode {
            SearchMode::Ranked => Ok(QueryNode::ranked(self.preprocessor.process_text(text))),
            SearchMode::Boolean => {
                let parsed = parser.parse(text)?;
                QueryNode::from_parsed(&parsed, &self.preprocessor)
            }
        }
    }

    /// Prepares a retrieval the caller drives step by step.
    ///
    /// Boolean retrieval walks the postings the query evaluates to. Ranked
    /// retrieval scores every indexed document against the query's terms.
    pub fn search_with_progress(&self, query: &QueryNode, mode: SearchMode) -> IncrementalRetrieval<'_> {
        let retrieval = match mode {
            SearchMode::Boolean => IncrementalRetrieval::boolean(self.index.postings_for_query(query)),
            SearchMode::Ranked => {
                let calculator =
                    SimilarityCalculator::with_weighting(&self.index, &query.terms(), self.config.weighting);
                let documents = self.index.indexed_documents().iter().cloned().collect();
                IncrementalRetrieval::ranked(WorkUnits::Documents(documents), calculator)
            }
        };
        tracing::debug!(?mode, units = retrieval.total(), "retrieval prepared");
        retrieval
            .with_max_progress(self.config.max_progress)
            .with_min_score(self.config.min_score)
            .with_limit(self.config.top_k)
    }

    /// Runs a retrieval to the end and returns the best `top_k` results.
    pub fn search(&self, query: &QueryNode, mode: SearchMode) -> Vec<SearchResult> {
        let mut retrieval = self.search_with_progress(query, mode);
        retrieval.run_to_end();
        retrieval.into_results(self.config.top_k)
    }

    pub fn search_text(&self, text: &str, mode: SearchMode, parser: &dyn QueryParser) -> Result<Vec<SearchResult>> {
        let query = self.parse_query(text, mode, parser)?;
        Ok(self.search(&query, mode))
    }
}
