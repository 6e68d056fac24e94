use serde::{Deserialize, Serialize};

use crate::similarity::QueryWeighting;

pub const DEFAULT_TOP_K: usize = 50;
pub const DEFAULT_MAX_PROGRESS: u32 = 100;
/// Ranked hits at or below this score are not reported.
pub const DEFAULT_MIN_SCORE: f64 = 0.001;

/// Search-time settings of a [`SearchEngine`](crate::SearchEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of results returned by a search; `None` returns all.
    pub top_k: Option<usize>,
    /// Value `progress()` reaches when a retrieval is done.
    pub max_progress: u32,
    pub min_score: f64,
    pub weighting: QueryWeighting,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: Some(DEFAULT_TOP_K),
            max_progress: DEFAULT_MAX_PROGRESS,
            min_score: DEFAULT_MIN_SCORE,
            weighting: QueryWeighting::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: SearchConfig = serde_json::from_str(r#"{"top_k": null, "weighting": "lnn"}"#).unwrap();
        assert_eq!(cfg.top_k, None);
        assert_eq!(cfg.max_progress, DEFAULT_MAX_PROGRESS);
        assert_eq!(cfg.weighting.to_string(), "lnn");
    }

    #[test]
    fn invalid_weighting_is_rejected() {
        assert!(serde_json::from_str::<SearchConfig>(r#"{"weighting": "zzz"}"#).is_err());
    }
}
