use criterion::{criterion_group, criterion_main, Criterion};
use quarry_core::{Document, Preprocessor, QueryNode, SearchEngine, SearchMode, TextPreprocessor};

const WORDS: &[&str] = &[
    "insurance", "car", "vehicle", "policy", "claim", "driver", "accident", "premium", "coverage", "road",
    "engine", "repair", "garage", "license", "traffic", "weather", "winter", "tyre", "brake", "fuel",
];

fn corpus(n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| {
            let text: Vec<&str> = (0..40).map(|j| WORDS[(i * 7 + j * 13 + j / 3) % WORDS.len()]).collect();
            Document::new(format!("doc{i:05}"), text.join(" "))
        })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let p = TextPreprocessor::default();
    let text = corpus(1).remove(0).text;
    c.bench_function("process_text", |b| b.iter(|| p.process_text(&text)));
}

fn bench_search(c: &mut Criterion) {
    let mut engine = SearchEngine::default();
    engine.index_documents(&corpus(2_000)).unwrap_or_else(|e| panic!("{e}"));
    let ranked = QueryNode::ranked(engine.preprocessor().process_text("car insurance claim"));
    c.bench_function("ranked_2000", |b| b.iter(|| engine.search(&ranked, SearchMode::Ranked)));
    c.bench_function("boolean_2000", |b| b.iter(|| engine.search(&ranked, SearchMode::Boolean)));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);
