//! In-memory TF-IDF search: an inverted index with boolean evaluation of
//! operator trees and cosine-ranked retrieval, both runnable step by step.

pub mod algebra;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod persist;
pub mod posting;
pub mod query;
pub mod results;
pub mod retrieval;
pub mod similarity;
pub mod tokenizer;

/// Documents are identified by their external string id.
pub type DocId = String;

pub use config::SearchConfig;
pub use document::Document;
pub use engine::{SearchEngine, SearchMode};
pub use error::{Result, SearchError};
pub use index::{IndexState, InvertedIndex};
pub use posting::Posting;
pub use query::{Occur, OperatorNode, ParsedQuery, QueryNode, QueryParser};
pub use results::{SearchResult, TopK};
pub use retrieval::{IncrementalRetrieval, Scoring, WorkUnits};
pub use similarity::{QueryWeighting, SimilarityCalculator};
pub use tokenizer::{Preprocessor, PreprocessorConfig, TextPreprocessor};
