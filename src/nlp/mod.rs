//! Local language heuristics for incoming chat text
//!
//! This module contains the cheap, fully local gate that runs before any
//! reply is chosen:
//!
//! - `lexicon`: static keyword sets and the tagger's word table
//! - `tagger`: part-of-speech tagging used for the structural check
//! - `validator`: gibberish / too-short / empty detection
//! - `intent`: keyword-phrase intent routing

pub mod intent;
pub mod lexicon;
pub mod tagger;
pub mod validator;

pub use intent::{Intent, IntentClassifier};
pub use tagger::{PartOfSpeech, TaggedToken, Tagger};
pub use validator::{LexicalValidator, Validation, ValidationError};

/// Split text into lowercased word tokens
///
/// Words are runs of alphanumerics, apostrophes, hyphens, and slashes (so
/// "what's", "check-up", and "01/02/2001" stay whole). Everything else
/// separates words and is dropped.
///
/// # Examples
///
/// ```
/// use shipsmart::nlp::tokenize;
///
/// assert_eq!(tokenize("Hi, what's my co-pay?"), vec!["hi", "what's", "my", "co-pay"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '\'' | '-' | '/')))
        .map(|word| word.trim_matches(|c: char| matches!(c, '\'' | '-' | '/')))
        .filter(|word| !word.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_edge_punctuation() {
        assert_eq!(tokenize("'quoted' -dash- /x/"), vec!["quoted", "dash", "x"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("  ?! ").is_empty());
    }
}
