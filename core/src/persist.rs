use crate::tokenizer::{PreprocessorConfig, TextPreprocessor};
use crate::InvertedIndex;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

/// Summary written next to the serialized index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub num_docs: u32,
    pub num_terms: u32,
    /// RFC 3339 timestamp of the build.
    pub created_at: String,
    pub version: u32,
    /// Settings the documents were processed with; queries must use the same.
    #[serde(default)]
    pub preprocessor: PreprocessorConfig,
    /// Custom stop-word list replacing the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopwords: Option<Vec<String>>,
}

impl IndexMeta {
    /// Fails when a count does not fit the `u32` fields of the file format.
    pub fn for_index(index: &InvertedIndex, created_at: impl Into<String>) -> Result<Self> {
        Ok(Self {
            num_docs: meta_count(index.document_count(), "documents")?,
            num_terms: meta_count(index.term_count(), "terms")?,
            created_at: created_at.into(),
            version: FORMAT_VERSION,
            preprocessor: PreprocessorConfig::default(),
            stopwords: None,
        })
    }

    pub fn with_preprocessor(mut self, config: PreprocessorConfig, stopwords: Option<Vec<String>>) -> Self {
        self.preprocessor = config;
        self.stopwords = stopwords;
        self
    }

    /// Rebuilds the preprocessor the index was built with.
    pub fn preprocessor(&self) -> TextPreprocessor {
        let p = TextPreprocessor::new(self.preprocessor);
        match &self.stopwords {
            Some(words) => p.with_stopwords(words),
            None => p,
        }
    }
}

fn meta_count(n: usize, what: &str) -> Result<u32> {
    u32::try_from(n).with_context(|| format!("{n} {what} do not fit in meta.json"))
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    let bytes = index.to_bytes()?;
    f.write_all(&bytes)?;
    tracing::debug!(path = %paths.index().display(), bytes = bytes.len(), "index saved");
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let path = paths.index();
    let mut f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index = InvertedIndex::from_bytes(&buf)?;
    if !index.is_finalized() {
        tracing::warn!(state = ?index.state(), "loaded index was saved before recalculation");
    }
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &IndexMeta) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<IndexMeta> {
    let path = paths.meta();
    let mut f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: IndexMeta = serde_json::from_str(&buf)?;
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Preprocessor;

    #[test]
    fn meta_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("idx"));
        let mut index = InvertedIndex::new();
        index.index_document(&["a", "b", "a"], "d1").unwrap();
        let meta = IndexMeta::for_index(&index, "2024-01-01T00:00:00Z").unwrap();
        assert_eq!(meta.num_terms, 2);
        save_meta(&paths, &meta).unwrap();
        assert_eq!(load_meta(&paths).unwrap(), meta);
    }

    #[test]
    fn older_meta_without_preprocessor_loads_defaults() {
        let meta: IndexMeta = serde_json::from_str(
            r#"{"num_docs": 1, "num_terms": 2, "created_at": "", "version": 1}"#,
        )
        .unwrap();
        assert_eq!(meta.preprocessor, PreprocessorConfig::default());
        assert!(meta.stopwords.is_none());
    }

    #[test]
    fn preprocessor_is_rebuilt_from_meta() {
        let index = InvertedIndex::new();
        let config = PreprocessorConfig { stemming: false, stopwords: true };
        let meta = IndexMeta::for_index(&index, "").unwrap().with_preprocessor(config, Some(vec!["cars".into()]));
        let p = meta.preprocessor();
        assert_eq!(p.process_text("the cars"), vec!["the"]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_counts_are_rejected() {
        assert_eq!(meta_count(u32::MAX as usize, "terms").unwrap(), u32::MAX);
        let err = meta_count(u32::MAX as usize + 1, "terms").unwrap_err();
        assert!(err.to_string().contains("terms do not fit"));
    }

    #[test]
    fn missing_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_index(&IndexPaths::new(dir.path())).unwrap_err();
        assert!(err.to_string().contains("index.bin"));
    }
}
