//! Keyword-based intent classification
//!
//! Keyword phrases are matched on word boundaries of the normalized text,
//! which lets multi-word phrases ("see a doctor", "good morning") match
//! while short greetings such as "hi" do not fire inside "ship" or "this".

use serde::{Deserialize, Serialize};
use std::fmt;

use super::lexicon::{APPOINTMENT_KEYWORDS, GREETINGS, INSURANCE_KEYWORDS};
use super::tokenize;

/// Coarse category of a user utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Greeting,
    Appointment,
    Insurance,
    Other,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greeting => write!(f, "greeting"),
            Self::Appointment => write!(f, "appointment"),
            Self::Insurance => write!(f, "insurance"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Routes text to an [`Intent`] by keyword-phrase containment
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    /// Keyword sets in precedence order; the first set with a match wins
    rules: Vec<(Intent, &'static [&'static str])>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Create a classifier with the built-in keyword sets
    ///
    /// Appointment keywords are tested before greetings so that
    /// "hi, can I book an appointment" routes to scheduling.
    pub fn new() -> Self {
        Self {
            rules: vec![
                (Intent::Appointment, APPOINTMENT_KEYWORDS),
                (Intent::Greeting, GREETINGS),
                (Intent::Insurance, INSURANCE_KEYWORDS),
            ],
        }
    }

    /// Classify text into an intent
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::nlp::{Intent, IntentClassifier};
    ///
    /// let classifier = IntentClassifier::new();
    /// assert_eq!(classifier.classify("hi, can I book an appointment"), Intent::Appointment);
    /// assert_eq!(classifier.classify("what does my plan cover"), Intent::Insurance);
    /// assert_eq!(classifier.classify("where is the library"), Intent::Other);
    /// ```
    pub fn classify(&self, text: &str) -> Intent {
        let padded = format!(" {} ", tokenize(text).join(" "));

        let intent = self
            .rules
            .iter()
            .find(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|phrase| padded.contains(&format!(" {} ", phrase)))
            })
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::Other);

        tracing::debug!("Classified {:?} as {}", text, intent);
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Intent {
        IntentClassifier::new().classify(text)
    }

    #[test]
    fn test_appointment_beats_greeting() {
        assert_eq!(classify("hi, can I book an appointment"), Intent::Appointment);
        assert_eq!(classify("Hello! I need to see a doctor"), Intent::Appointment);
    }

    #[test]
    fn test_greeting_beats_insurance() {
        assert_eq!(classify("hi, question about my plan"), Intent::Greeting);
    }

    #[test]
    fn test_insurance() {
        assert_eq!(classify("what does my plan cover"), Intent::Insurance);
        assert_eq!(classify("How much is the DEDUCTIBLE?"), Intent::Insurance);
        assert_eq!(classify("is my out-of-pocket max met"), Intent::Insurance);
    }

    #[test]
    fn test_multi_word_greeting() {
        assert_eq!(classify("Good morning!"), Intent::Greeting);
    }

    #[test]
    fn test_keywords_respect_word_boundaries() {
        // "ship" contains "hi"; "this" contains "hi" too
        assert_eq!(classify("does ship pay for this"), Intent::Insurance);
        assert_eq!(classify("facebook"), Intent::Other);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify("My student ID is 918859330"), Intent::Other);
        assert_eq!(classify("yes"), Intent::Other);
        assert_eq!(classify(""), Intent::Other);
    }

    #[test]
    fn test_intent_display_and_serde() {
        assert_eq!(Intent::Appointment.to_string(), "appointment");
        let json = serde_json::to_string(&Intent::Insurance).unwrap();
        assert_eq!(json, "\"insurance\"");
    }
}
