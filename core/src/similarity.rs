//! Cosine similarity between a processed query and indexed documents.
//!
//! Document vectors are the `ltc` weights cached in the [`InvertedIndex`]. The
//! query side is weighted according to a SMART triple, `ltc` by default, which
//! gives the plain cosine of two log-TF × IDF vectors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;
use crate::posting::log_tf;
use crate::InvertedIndex;

/// Term frequency component of a SMART triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TfWeight {
    /// `tf`
    Natural,
    /// `1 + log10(tf)`
    Logarithmic,
    /// `0.5 + 0.5 * tf / max_tf`
    Augmented,
    /// 1 when the term occurs
    Boolean,
}

/// Document frequency component of a SMART triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DfWeight {
    None,
    /// `log10(N / df)`
    Idf,
    /// `max(0, log10((N - df) / df))`
    ProbIdf,
}

/// Normalization component of a SMART triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    None,
    Cosine,
}

/// Query-side weighting scheme in SMART notation, e.g. `ltc` or `lnn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueryWeighting {
    pub tf: TfWeight,
    pub df: DfWeight,
    pub norm: Normalization,
}

impl Default for QueryWeighting {
    fn default() -> Self {
        Self { tf: TfWeight::Logarithmic, df: DfWeight::Idf, norm: Normalization::Cosine }
    }
}

impl FromStr for QueryWeighting {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SearchError::InvalidWeighting(s.to_string());
        let chars: Vec<char> = s.chars().collect();
        let [tf, df, norm] = chars.as_slice() else { return Err(invalid()) };
        let tf = match *tf {
            'n' => TfWeight::Natural,
            'l' => TfWeight::Logarithmic,
            'a' => TfWeight::Augmented,
            'b' => TfWeight::Boolean,
            _ => return Err(invalid()),
        };
        let df = match *df {
            'n' => DfWeight::None,
            't' => DfWeight::Idf,
            'p' => DfWeight::ProbIdf,
            _ => return Err(invalid()),
        };
        let norm = match *norm {
            'n' => Normalization::None,
            'c' => Normalization::Cosine,
            _ => return Err(invalid()),
        };
        Ok(Self { tf, df, norm })
    }
}

impl TryFrom<String> for QueryWeighting {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QueryWeighting> for String {
    fn from(value: QueryWeighting) -> Self {
        value.to_string()
    }
}

impl fmt::Display for QueryWeighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tf = match self.tf {
            TfWeight::Natural => 'n',
            TfWeight::Logarithmic => 'l',
            TfWeight::Augmented => 'a',
            TfWeight::Boolean => 'b',
        };
        let df = match self.df {
            DfWeight::None => 'n',
            DfWeight::Idf => 't',
            DfWeight::ProbIdf => 'p',
        };
        let norm = match self.norm {
            Normalization::None => 'n',
            Normalization::Cosine => 'c',
        };
        write!(f, "{tf}{df}{norm}")
    }
}

/// Scores documents against one query. Build a new calculator per query.
pub struct SimilarityCalculator<'a> {
    index: &'a InvertedIndex,
    query_weights: HashMap<String, f64>,
}

impl<'a> SimilarityCalculator<'a> {
    /// Calculator with the default `ltc` query weighting.
    pub fn new<S: AsRef<str>>(index: &'a InvertedIndex, query: &[S]) -> Self {
        Self::with_weighting(index, query, QueryWeighting::default())
    }

    pub fn with_weighting<S: AsRef<str>>(index: &'a InvertedIndex, query: &[S], weighting: QueryWeighting) -> Self {
        if !index.is_finalized() {
            tracing::warn!(state = ?index.state(), "scoring against an index with stale statistics");
        }
        let mut raw_tf: HashMap<&str, u32> = HashMap::new();
        for token in query {
            *raw_tf.entry(token.as_ref()).or_insert(0) += 1;
        }
        let max_tf = raw_tf.values().copied().max().unwrap_or(0);
        let n = index.document_count() as f64;

        let mut query_weights = HashMap::with_capacity(raw_tf.len());
        for (term, tf) in raw_tf {
            let idf = index.idf(term);
            // a term with zero idf cannot tell documents apart
            if idf == 0.0 { continue; }
            let tf_w = match weighting.tf {
                TfWeight::Natural => tf as f64,
                TfWeight::Logarithmic => log_tf(tf),
                TfWeight::Augmented => 0.5 + 0.5 * tf as f64 / max_tf as f64,
                TfWeight::Boolean => 1.0,
            };
            let df_w = match weighting.df {
                DfWeight::None => 1.0,
                DfWeight::Idf => idf,
                DfWeight::ProbIdf => {
                    let df = index.document_frequency(term) as f64;
                    if df == 0.0 || df == n { 0.0 } else { ((n - df) / df).log10().max(0.0) }
                }
            };
            query_weights.insert(term.to_string(), tf_w * df_w);
        }

        if weighting.norm == Normalization::Cosine {
            let norm = query_weights.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for w in query_weights.values_mut() {
                    *w /= norm;
                }
            }
        }
        tracing::trace!(terms = query_weights.len(), %weighting, "prepared query vector");
        Self { index, query_weights }
    }

    /// Weight of a term in the query vector; 0 for dropped or absent terms.
    pub fn query_weight(&self, term: &str) -> f64 {
        self.query_weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.query_weights.is_empty()
    }

    /// Similarity of the query to one document; 0 for documents with a zero
    /// TF-IDF norm.
    pub fn calculate_score(&self, document_id: &str) -> f64 {
        let norm = self.index.tf_idf_norm(document_id);
        if norm == 0.0 {
            return 0.0;
        }
        let dot: f64 = self
            .query_weights
            .iter()
            .map(|(term, w)| w * self.index.tf_idf(term, document_id))
            .sum();
        dot / norm
    }
}
