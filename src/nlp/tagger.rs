//! Lexicon-driven part-of-speech tagger
//!
//! Closed-class words and frequent verbs are looked up in a static table.
//! Anything else is guessed from its suffix and falls back to a noun, which
//! keeps the tagger permissive: it exists to catch strings of filler words,
//! not to parse English.

use std::fmt;

use super::lexicon;
use super::tokenize;

/// Coarse lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Preposition,
    Conjunction,
    Interjection,
    Numeral,
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Pronoun => "pronoun",
            Self::Determiner => "determiner",
            Self::Preposition => "preposition",
            Self::Conjunction => "conjunction",
            Self::Interjection => "interjection",
            Self::Numeral => "numeral",
        };
        write!(f, "{}", name)
    }
}

/// A token together with its assigned tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    /// Lowercased token text
    pub text: String,
    /// Assigned part of speech
    pub tag: PartOfSpeech,
}

/// Part-of-speech tagger over the built-in lexicon
#[derive(Debug, Default, Clone, Copy)]
pub struct Tagger;

impl Tagger {
    /// Create a new tagger
    pub fn new() -> Self {
        Self
    }

    /// Tag every word token of `text`
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::nlp::tagger::{PartOfSpeech, Tagger};
    ///
    /// let tokens = Tagger::new().tag("Can I book a visit?");
    /// assert_eq!(tokens.len(), 5);
    /// assert_eq!(tokens[2].tag, PartOfSpeech::Verb);
    /// ```
    pub fn tag(&self, text: &str) -> Vec<TaggedToken> {
        tokenize(text)
            .into_iter()
            .map(|word| {
                let tag = Self::tag_word(&word);
                TaggedToken { text: word, tag }
            })
            .collect()
    }

    fn tag_word(word: &str) -> PartOfSpeech {
        if word.chars().any(|c| c.is_ascii_digit()) {
            // Letter-digit mixes are identifiers such as member IDs
            return if word.chars().any(char::is_alphabetic) {
                PartOfSpeech::Noun
            } else {
                PartOfSpeech::Numeral
            };
        }
        if let Some(tag) = lexicon::tag_of(word) {
            return tag;
        }

        // Suffix guesses need a stem in front of them
        let long_enough = |suffix: &str| word.len() > suffix.len() + 2;
        if ["ing", "ed"].iter().any(|s| word.ends_with(s) && long_enough(s)) {
            PartOfSpeech::Verb
        } else if word.ends_with("ly") && long_enough("ly") {
            PartOfSpeech::Adverb
        } else if ["ous", "ful", "ive", "able", "ible", "al"]
            .iter()
            .any(|s| word.ends_with(s) && long_enough(s))
        {
            PartOfSpeech::Adjective
        } else {
            PartOfSpeech::Noun
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(text: &str) -> Vec<PartOfSpeech> {
        Tagger::new().tag(text).into_iter().map(|t| t.tag).collect()
    }

    #[test]
    fn test_lexicon_words() {
        assert_eq!(
            tags("the plan and"),
            vec![
                PartOfSpeech::Determiner,
                PartOfSpeech::Noun,
                PartOfSpeech::Conjunction
            ]
        );
    }

    #[test]
    fn test_suffix_guesses() {
        assert_eq!(tags("walking"), vec![PartOfSpeech::Verb]);
        assert_eq!(tags("quickly"), vec![PartOfSpeech::Adverb]);
        assert_eq!(tags("affordable"), vec![PartOfSpeech::Adjective]);
        assert_eq!(tags("clinic"), vec![PartOfSpeech::Noun]);
    }

    #[test]
    fn test_short_words_are_not_suffix_tagged() {
        // "red" and "fly" are too short to carry a suffix
        assert_eq!(tags("red fly"), vec![PartOfSpeech::Noun, PartOfSpeech::Noun]);
    }

    #[test]
    fn test_numerals() {
        assert_eq!(
            tags("dob 01/02/2001"),
            vec![PartOfSpeech::Noun, PartOfSpeech::Numeral]
        );
        assert_eq!(
            tags("918859330 xyz12345678"),
            vec![PartOfSpeech::Numeral, PartOfSpeech::Noun]
        );
    }

    #[test]
    fn test_punctuation_is_dropped() {
        let tokens = Tagger::new().tag("hi, there!");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "hi");
        assert_eq!(tokens[1].text, "there");
    }

    #[test]
    fn test_display() {
        assert_eq!(PartOfSpeech::Interjection.to_string(), "interjection");
    }
}
