//! Candidate phrase generation for keyphrase ranking
//!
//! Tokens are runs of two or more word characters in the lowercased text.
//! Stop words are dropped before n-grams are formed, so a phrase may join
//! words that were separated by a stop word in the source.

use super::stop_words::is_stop_word;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("Invalid token regex"))
}

/// Lowercased content tokens in document order
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// Unique n-gram candidates for `min..=max` words, in lexicographic order
pub fn candidate_phrases(text: &str, ngram_min: usize, ngram_max: usize) -> Vec<String> {
    let tokens = tokenize(text);
    let mut phrases = BTreeSet::new();

    for n in ngram_min.max(1)..=ngram_max {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            phrases.insert(window.join(" "));
        }
    }

    phrases.into_iter().collect()
}
