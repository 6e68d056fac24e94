use quarry_core::{Preprocessor, PreprocessorConfig, TextPreprocessor};

#[test]
fn it_normalizes_and_stems() {
    let words = TextPreprocessor::default().process_text("Running Runners RUN! The café's menu.");
    assert!(words.contains(&"run".to_string()));
    // diacritics stripped before stemming
    assert!(words.iter().any(|w| w.starts_with("caf") && w.is_ascii()));
}

#[test]
fn it_filters_stopwords() {
    let words = TextPreprocessor::default().process_text("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"fox".to_string()));
}

#[test]
fn keeps_links_and_numbers_whole() {
    let p = TextPreprocessor::new(PreprocessorConfig { stemming: false, stopwords: false });
    let words = p.process_text("see https://example.com/a?b=1 for 3.14 and 4x4");
    assert!(words.contains(&"https://example.com/a?b=1".to_string()));
    assert!(words.contains(&"3.14".to_string()));
    assert!(words.contains(&"4x4".to_string()));
}

#[test]
fn query_terms_match_document_terms() {
    let p = TextPreprocessor::default();
    let doc = p.process_text("Worst insurance for cars");
    assert!(doc.contains(&p.process_term("CAR").unwrap()));
    assert!(doc.contains(&p.process_term("insurances").unwrap()));
}
