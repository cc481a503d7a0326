//! Text normalisation applied before embedding

use regex::Regex;
use std::sync::OnceLock;

/// Any character that is neither a word character nor whitespace
fn punctuation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("Invalid punctuation regex"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex"))
}

/// Normalise raw input text.
///
/// Lowercasing always runs before punctuation stripping. Stripping replaces
/// every non-word, non-whitespace character with a space, then collapses
/// whitespace runs and trims. Without stripping, whitespace is left untouched.
pub fn preprocess(text: &str, lowercase: bool, strip_punctuation: bool) -> String {
    let mut out = if lowercase {
        text.to_lowercase()
    } else {
        text.to_string()
    };

    if strip_punctuation {
        let spaced = punctuation_regex().replace_all(&out, " ");
        out = whitespace_regex()
            .replace_all(&spaced, " ")
            .trim()
            .to_string();
    }

    out
}
