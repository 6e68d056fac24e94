use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

/// Text → token transform shared by indexing and querying.
///
/// Documents and queries must go through the same implementation, otherwise
/// query terms will not line up with indexed terms.
pub trait Preprocessor {
    /// Processes a whole text into an ordered token list.
    fn process_text(&self, text: &str) -> Vec<String>;

    /// Processes a single query term. `None` when the term is discarded
    /// (stop-word, punctuation).
    fn process_term(&self, term: &str) -> Option<String> {
        self.process_text(term).into_iter().next()
    }
}

lazy_static! {
    // link | word starting with a letter | number
    static ref RE: Regex = Regex::new(
        r"(?u)https?://[\p{L}\p{N}:/.?=&+*_\-]+|\p{L}[\p{L}\p{N}_']*|\p{N}[\p{N}.x*]*"
    ).expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Switches for the optional stages of [`TextPreprocessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    pub stemming: bool,
    pub stopwords: bool,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self { stemming: true, stopwords: true }
    }
}

/// Lowercasing, diacritics removal, regex tokenization, stop-word filtering
/// and English Snowball stemming.
pub struct TextPreprocessor {
    stemmer: Option<Stemmer>,
    stopwords: Option<HashSet<String>>,
}

impl TextPreprocessor {
    pub fn new(config: PreprocessorConfig) -> Self {
        Self {
            stemmer: config.stemming.then(|| Stemmer::create(Algorithm::English)),
            stopwords: config
                .stopwords
                .then(|| STOPWORDS.iter().map(|w| w.to_string()).collect()),
        }
    }

    /// Replaces the built-in stop-word list. Words are normalized the same way
    /// as document text before being stored.
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords = Some(
            words
                .into_iter()
                .map(|w| normalize(w.as_ref().trim()))
                .filter(|w| !w.is_empty())
                .collect(),
        );
        self
    }

    fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.as_ref().is_some_and(|s| s.contains(token))
    }
}

impl Default for TextPreprocessor {
    fn default() -> Self {
        Self::new(PreprocessorConfig::default())
    }
}

impl Preprocessor for TextPreprocessor {
    fn process_text(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let mut tokens = Vec::new();
        for mat in RE.find_iter(&normalized) {
            let token = mat.as_str();
            if self.is_stopword(token) { continue; }
            let token = match &self.stemmer {
                Some(stemmer) => stemmer.stem(token).to_string(),
                None => token.to_string(),
            };
            tokens.push(token);
        }
        tokens
    }
}

/// Lowercase and strip combining diacritical marks (`café` → `cafe`).
fn normalize(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = TextPreprocessor::default().process_text("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn stages_can_be_disabled() {
        let p = TextPreprocessor::new(PreprocessorConfig { stemming: false, stopwords: false });
        assert_eq!(p.process_text("The Cars"), vec!["the", "cars"]);
    }

    #[test]
    fn custom_stopwords_replace_builtin_list() {
        let p = TextPreprocessor::new(PreprocessorConfig { stemming: false, stopwords: true })
            .with_stopwords(["Na", "", "uplne"]);
        assert_eq!(p.process_text("pojisteni na auta the"), vec!["pojisteni", "auta", "the"]);
    }

    #[test]
    fn process_term_drops_stopwords() {
        let p = TextPreprocessor::default();
        assert_eq!(p.process_term("the"), None);
        assert_eq!(p.process_term("Insurance").as_deref(), Some("insur"));
    }
}
