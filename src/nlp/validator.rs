//! Lexical validation of raw user input
//!
//! The validator is a local gate that keeps junk input from reaching the
//! conversation flow or the remote completion service. It deliberately
//! tolerates false accepts; anything it rejects is reported back to the user
//! with a request to rephrase.

use regex::Regex;
use thiserror::Error;

use super::lexicon;
use super::tagger::{PartOfSpeech, Tagger};

/// Reasons user text is rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing but whitespace
    #[error("message is empty")]
    EmptyInput,

    /// Repeated characters, consonant runs, or no recognizable words
    #[error("message could not be understood")]
    Unintelligible,

    /// Fewer than two characters after trimming
    #[error("message is too short")]
    TooShort,

    /// More than two words without a noun or verb
    #[error("message has no sentence structure")]
    NoSentenceStructure,
}

impl ValidationError {
    /// Assistant text asking the user to rephrase
    pub fn rephrase_prompt(&self) -> &'static str {
        match self {
            Self::EmptyInput => "It looks like your message was empty. What can I help you with?",
            Self::Unintelligible => {
                "Sorry, I couldn't understand that. Could you rephrase your question?"
            }
            Self::TooShort => {
                "Could you tell me a little more? Your message was too short for me to help with."
            }
            Self::NoSentenceStructure => {
                "I'm not sure what you're asking. Could you try asking in a full sentence?"
            }
        }
    }
}

/// Outcome of [`LexicalValidator::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    /// True when the text may proceed to intent classification
    pub valid: bool,
    /// Why the text was rejected, when it was
    pub reason: Option<ValidationError>,
}

impl Validation {
    fn accepted() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn rejected(reason: ValidationError) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }
}

/// Minimum run length of one repeated character that marks gibberish
const MAX_REPEAT: usize = 3;

/// Heuristic validator for chat input
#[derive(Debug, Clone)]
pub struct LexicalValidator {
    consonant_run: Regex,
    tagger: Tagger,
}

impl Default for LexicalValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalValidator {
    /// Create a validator with the built-in word lists
    pub fn new() -> Self {
        Self {
            consonant_run: Regex::new(r"(?i)[bcdfghjklmnpqrstvwxz]{5,}")
                .expect("Invalid consonant run pattern"),
            tagger: Tagger::new(),
        }
    }

    /// Validate raw user text
    ///
    /// Checks run in a fixed order and stop at the first failure: empty
    /// input, the gibberish screen, the greeting/short-reply exemption, the
    /// minimum length, and finally the structural (noun or verb) check.
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::nlp::{LexicalValidator, ValidationError};
    ///
    /// let validator = LexicalValidator::new();
    /// assert!(validator.validate("What does my plan cover?").valid);
    /// assert_eq!(
    ///     validator.validate("asdfgh").reason,
    ///     Some(ValidationError::Unintelligible)
    /// );
    /// ```
    pub fn validate(&self, text: &str) -> Validation {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Validation::rejected(ValidationError::EmptyInput);
        }

        let lowered = trimmed.to_lowercase();
        if self.looks_like_gibberish(&lowered) {
            tracing::debug!("Rejected as unintelligible: {:?}", trimmed);
            return Validation::rejected(ValidationError::Unintelligible);
        }

        if lexicon::is_exempt_phrase(&lowered) {
            return Validation::accepted();
        }

        if trimmed.chars().count() < 2 {
            return Validation::rejected(ValidationError::TooShort);
        }

        let tokens = self.tagger.tag(trimmed);
        let has_content_word = tokens
            .iter()
            .any(|t| matches!(t.tag, PartOfSpeech::Noun | PartOfSpeech::Verb));
        if tokens.len() > 2 && !has_content_word {
            tracing::debug!("Rejected for missing noun/verb: {:?}", trimmed);
            return Validation::rejected(ValidationError::NoSentenceStructure);
        }

        Validation::accepted()
    }

    /// Validate and convert the outcome into a `Result`
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] describing why the text was rejected
    pub fn check(&self, text: &str) -> std::result::Result<(), ValidationError> {
        match self.validate(text).reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    fn looks_like_gibberish(&self, lowered: &str) -> bool {
        if has_repeated_char(lowered) || self.consonant_run.is_match(lowered) {
            return true;
        }

        let any_known = lowered
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .any(lexicon::is_known_word);

        !any_known && lowered.chars().count() > 3
    }
}

/// True if a non-digit, non-space character occurs `MAX_REPEAT` times in a row
fn has_repeated_char(text: &str) -> bool {
    let mut previous: Option<char> = None;
    let mut run = 0;
    for c in text.chars() {
        if Some(c) == previous {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if run >= MAX_REPEAT && !c.is_ascii_digit() && !c.is_whitespace() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(text: &str) -> Option<ValidationError> {
        LexicalValidator::new().validate(text).reason
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(reason(""), Some(ValidationError::EmptyInput));
        assert_eq!(reason("   \n\t"), Some(ValidationError::EmptyInput));
    }

    #[test]
    fn test_repeated_characters() {
        assert_eq!(reason("heyyy there"), Some(ValidationError::Unintelligible));
        assert_eq!(reason("what?!!!"), Some(ValidationError::Unintelligible));
    }

    #[test]
    fn test_repeated_digits_are_allowed() {
        assert_eq!(reason("my dob is 01/01/2000"), None);
    }

    #[test]
    fn test_consonant_run() {
        assert_eq!(reason("my plan xkcdq"), Some(ValidationError::Unintelligible));
    }

    #[test]
    fn test_unknown_tokens_longer_than_three() {
        for text in ["blorp", "zebu quokka", "florp wibble"] {
            assert_eq!(
                reason(text),
                Some(ValidationError::Unintelligible),
                "{} should be unintelligible",
                text
            );
        }
    }

    #[test]
    fn test_digit_junk_is_unintelligible() {
        for text in ["12345 67890", "9999", "1234"] {
            assert_eq!(
                reason(text),
                Some(ValidationError::Unintelligible),
                "{} should be rejected",
                text
            );
        }
        assert_eq!(reason("918859330"), None);
        assert_eq!(reason("XYZ12345678"), None);
    }

    #[test]
    fn test_unknown_tokens_up_to_three_chars_pass_screen() {
        assert_eq!(reason("zap"), None);
    }

    #[test]
    fn test_greetings_and_short_replies_are_exempt() {
        for text in ["hi", "Hello", "GOOD MORNING", "ok", "yes", "Thanks", "thank you"] {
            assert_eq!(reason(text), None, "{} should be accepted", text);
        }
    }

    #[test]
    fn test_too_short() {
        assert_eq!(reason("a"), Some(ValidationError::TooShort));
        assert_eq!(reason(" ? "), Some(ValidationError::TooShort));
    }

    #[test]
    fn test_no_sentence_structure() {
        assert_eq!(reason("hi there you"), Some(ValidationError::NoSentenceStructure));
        assert_eq!(reason("yes yes yes"), Some(ValidationError::NoSentenceStructure));
    }

    #[test]
    fn test_two_filler_words_are_tolerated() {
        assert_eq!(reason("hi there"), None);
    }

    #[test]
    fn test_real_questions() {
        assert_eq!(reason("hi, can I book an appointment"), None);
        assert_eq!(reason("What does my plan cover?"), None);
        assert_eq!(reason("My student ID is 918859330"), None);
        assert_eq!(reason("918859330"), None);
    }

    #[test]
    fn test_check_maps_to_result() {
        let validator = LexicalValidator::new();
        assert!(validator.check("how much is my copay").is_ok());
        assert_eq!(validator.check(""), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn test_rephrase_prompts_are_distinct() {
        let prompts = [
            ValidationError::EmptyInput.rephrase_prompt(),
            ValidationError::Unintelligible.rephrase_prompt(),
            ValidationError::TooShort.rephrase_prompt(),
            ValidationError::NoSentenceStructure.rephrase_prompt(),
        ];
        for (i, a) in prompts.iter().enumerate() {
            for b in prompts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
