//! Reading documents and topics from JSON / JSONL files.

use anyhow::{Context, Result};
use quarry_core::Document;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A TREC-style information need.
#[derive(Debug, Clone, Deserialize)]
pub struct Topic {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub narrative: String,
}

/// All `.json` / `.jsonl` files under `input`, or `input` itself when it is a file.
pub fn input_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

pub fn read_documents(input: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for file in input_files(input) {
        let before = documents.len();
        read_file(&file, &mut documents).with_context(|| format!("reading {}", file.display()))?;
        tracing::debug!(file = %file.display(), documents = documents.len() - before, "read input file");
    }
    Ok(documents)
}

pub fn read_topics(path: &Path) -> Result<Vec<Topic>> {
    let mut topics = Vec::new();
    read_file(path, &mut topics).with_context(|| format!("reading {}", path.display()))?;
    Ok(topics)
}

/// JSONL: one record per non-empty line. JSON: an array of records or a single one.
fn read_file<T: DeserializeOwned>(file: &Path, out: &mut Vec<T>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let record = serde_json::from_str::<T>(&line).with_context(|| format!("line {}", n + 1))?;
            out.push(record);
        }
        return Ok(());
    }
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => out.push(serde_json::from_value(json)?),
        other => anyhow::bail!("expected an object or an array, found {other}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_json_and_jsonl_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"[{"id": "d1", "text": "car insurance"}, {"id": "d2", "title": "T", "body": "worst car"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("nested/b.jsonl"), "{\"id\": \"d3\", \"text\": \"x\"}\n\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = read_documents(dir.path()).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);
        assert_eq!(docs[1].text, "worst car");
        assert_eq!(docs[1].title.as_deref(), Some("T"));
    }

    #[test]
    fn bad_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("docs.jsonl");
        fs::write(&file, "{\"id\": \"d1\", \"text\": \"x\"}\nnot json\n").unwrap();
        let err = read_documents(&file).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn topics() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("topics.jsonl");
        fs::write(&file, "{\"id\": \"10\", \"title\": \"cars\", \"description\": \"car insurance\"}\n").unwrap();
        let topics = read_topics(&file).unwrap();
        assert_eq!(topics[0].id, "10");
        assert!(topics[0].narrative.is_empty());
    }
}
