use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use parking_lot::Mutex;
use quarry_core::persist::{load_index, load_meta, save_index, save_meta, IndexMeta, IndexPaths};
use quarry_core::{
    PreprocessorConfig, QueryWeighting, SearchConfig, SearchEngine, SearchMode, SearchResult, TextPreprocessor,
};
use tracing_subscriber::{fmt, EnvFilter};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod ingest;
mod query_syntax;

use ingest::{read_documents, read_topics, Topic};
use query_syntax::BooleanSyntax;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Build and search a TF-IDF inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = false)]
        no_stemming: bool,
        #[arg(long, default_value_t = false, conflicts_with = "stopwords")]
        no_stopwords: bool,
        /// File with one stop-word per line, replacing the built-in list
        #[arg(long)]
        stopwords: Option<PathBuf>,
    },
    /// Run one query and print the results as JSON
    Search {
        #[arg(long)]
        index: PathBuf,
        #[arg(long)]
        query: String,
        #[arg(long, value_enum, default_value_t = Mode::Ranked)]
        mode: Mode,
        /// Results to print; all when omitted
        #[arg(long)]
        top_k: Option<usize>,
        /// SMART query weighting, e.g. ltc or lnn
        #[arg(long)]
        weighting: Option<QueryWeighting>,
        /// Log retrieval progress while searching
        #[arg(long, default_value_t = false)]
        progress: bool,
    },
    /// Answer every topic and write a TREC run file
    Eval {
        #[arg(long)]
        index: PathBuf,
        /// Topics as JSON/JSONL with id, title, description, narrative
        #[arg(long)]
        topics: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value = "runindex1")]
        run_id: String,
        /// Topic fields joined into the query text
        #[arg(long, value_enum, value_delimiter = ',', default_values_t = [TopicField::Description, TopicField::Narrative])]
        fields: Vec<TopicField>,
        #[arg(long, value_enum, default_value_t = Mode::Ranked)]
        mode: Mode,
        /// Results per topic; all when omitted
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        weighting: Option<QueryWeighting>,
    },
    /// Print index metadata and counts
    Stats {
        #[arg(long)]
        index: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Ranked,
    Boolean,
}

impl From<Mode> for SearchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Ranked => SearchMode::Ranked,
            Mode::Boolean => SearchMode::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TopicField {
    Title,
    Description,
    Narrative,
}

impl TopicField {
    fn of(self, topic: &Topic) -> &str {
        match self {
            TopicField::Title => &topic.title,
            TopicField::Description => &topic.description,
            TopicField::Narrative => &topic.narrative,
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, no_stemming, no_stopwords, stopwords } => {
            let config = PreprocessorConfig { stemming: !no_stemming, stopwords: !no_stopwords };
            build_index(&input, &output, config, stopwords.as_deref())
        }
        Commands::Search { index, query, mode, top_k, weighting, progress } => {
            let engine = open_engine(&index, top_k, weighting)?;
            let results = if progress {
                search_with_progress(&engine, &query, mode.into())?
            } else {
                engine.search_text(&query, mode.into(), &BooleanSyntax)?
            };
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Commands::Eval { index, topics, output, run_id, fields, mode, top_k, weighting } => {
            let engine = open_engine(&index, top_k, weighting)?;
            let topics = read_topics(&topics)?;
            evaluate(&engine, &topics, &fields, mode.into(), &output, &run_id)
        }
        Commands::Stats { index } => {
            let paths = IndexPaths::new(&index);
            let meta = load_meta(&paths)?;
            let index = load_index(&paths)?;
            let stats = serde_json::json!({
                "meta": meta,
                "documents": index.document_count(),
                "terms": index.term_count(),
                "state": format!("{:?}", index.state()),
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

fn build_index(input: &Path, output: &Path, config: PreprocessorConfig, stopwords: Option<&Path>) -> Result<()> {
    let stopwords = match stopwords {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Some(text.lines().map(str::to_string).collect::<Vec<_>>())
        }
        None => None,
    };
    let mut preprocessor = TextPreprocessor::new(config);
    if let Some(words) = &stopwords {
        preprocessor = preprocessor.with_stopwords(words);
    }

    let documents = read_documents(input)?;
    tracing::info!(documents = documents.len(), "ingested documents");

    let mut engine = SearchEngine::new(preprocessor, SearchConfig::default());
    engine.index_documents(&documents)?;

    let paths = IndexPaths::new(output);
    save_index(&paths, engine.index())?;
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let meta = IndexMeta::for_index(engine.index(), created_at)?.with_preprocessor(config, stopwords);
    save_meta(&paths, &meta)?;

    tracing::info!(output = %output.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "index build complete");
    Ok(())
}

fn open_engine(dir: &Path, top_k: Option<usize>, weighting: Option<QueryWeighting>) -> Result<SearchEngine> {
    let paths = IndexPaths::new(dir);
    let meta = load_meta(&paths)?;
    let index = load_index(&paths)?;
    tracing::debug!(num_docs = meta.num_docs, created_at = %meta.created_at, "index loaded");

    let mut config = SearchConfig { top_k, ..SearchConfig::default() };
    if let Some(weighting) = weighting {
        config.weighting = weighting;
    }
    Ok(SearchEngine::new(meta.preprocessor(), config).with_index(index))
}

/// Steps the retrieval on a worker thread while this thread reports progress.
fn search_with_progress(engine: &SearchEngine, text: &str, mode: SearchMode) -> Result<Vec<SearchResult>> {
    let query = engine.parse_query(text, mode, &BooleanSyntax)?;
    let retrieval = Mutex::new(engine.search_with_progress(&query, mode));

    std::thread::scope(|s| {
        s.spawn(|| loop {
            let mut r = retrieval.lock();
            if r.done() { break; }
            r.one_step();
        });

        let mut reported = None;
        loop {
            let (progress, max, done) = {
                let r = retrieval.lock();
                (r.progress(), r.max_progress(), r.done())
            };
            if reported != Some(progress) {
                tracing::info!(progress, max, "searching");
                reported = Some(progress);
            }
            if done { break; }
            std::thread::sleep(Duration::from_millis(20));
        }
    });

    Ok(retrieval.into_inner().into_results(engine.config().top_k))
}

fn evaluate(
    engine: &SearchEngine,
    topics: &[Topic],
    fields: &[TopicField],
    mode: SearchMode,
    output: &Path,
    run_id: &str,
) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(output)?);
    for (n, topic) in topics.iter().enumerate() {
        tracing::debug!(topic = %topic.id, "{}/{}", n + 1, topics.len());
        let text = fields.iter().map(|f| f.of(topic)).collect::<Vec<_>>().join(" ");
        let results = engine.search_text(&text, mode, &BooleanSyntax)?;
        for line in trec_lines(&topic.id, &results, run_id) {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;
    tracing::info!(topics = topics.len(), output = %output.display(), "run file written");
    Ok(())
}

/// Run file lines for one topic. A topic without hits still gets a
/// placeholder line so evaluation tools count it.
fn trec_lines(topic_id: &str, results: &[SearchResult], run_id: &str) -> Vec<String> {
    if results.is_empty() {
        return vec![format!("{topic_id} Q0 abc 99 0 {run_id}")];
    }
    results.iter().map(|r| r.to_trec_line(topic_id, run_id)).collect()
}
