//! Static word lists shared by the validator, tagger, and intent classifier
//!
//! Keyword sets may contain multi-word phrases ("good morning",
//! "see a doctor"). Phrase matching is done by the intent classifier; the
//! validator only needs the individual words, which [`is_known_word`]
//! derives from every set.

use std::collections::HashSet;
use std::sync::OnceLock;

use super::tagger::PartOfSpeech;

/// Greeting phrases
pub static GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hiya",
    "howdy",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "what's up",
];

/// Insurance and benefits vocabulary
pub static INSURANCE_KEYWORDS: &[&str] = &[
    "insurance",
    "insured",
    "coverage",
    "cover",
    "covers",
    "covered",
    "plan",
    "benefit",
    "benefits",
    "copay",
    "copays",
    "co-pay",
    "coinsurance",
    "deductible",
    "premium",
    "claim",
    "claims",
    "ship",
    "uc ship",
    "policy",
    "out-of-pocket",
    "out of pocket",
    "in-network",
    "network",
    "anthem",
    "ppo",
    "prescription",
    "pharmacy",
    "dental",
    "vision",
    "cost",
    "costs",
    "price",
    "waiver",
];

/// Scheduling vocabulary
pub static APPOINTMENT_KEYWORDS: &[&str] = &[
    "appointment",
    "appointments",
    "schedule",
    "scheduling",
    "reschedule",
    "book",
    "booking",
    "see a doctor",
    "see the doctor",
    "doctor",
    "doctors",
    "physician",
    "checkup",
    "check-up",
    "available times",
    "availability",
];

/// Short replies that are valid on their own
pub static SHORT_REPLIES: &[&str] = &[
    "yes",
    "no",
    "ok",
    "okay",
    "sure",
    "yeah",
    "yep",
    "nope",
    "nah",
    "thanks",
    "thank you",
    "no thanks",
    "correct",
    "confirm",
    "cancel",
    "bye",
    "goodbye",
    "great",
    "cool",
    "got it",
    "help",
];

/// Common English function words
pub static FUNCTION_WORDS: &[&str] = &[
    "i", "me", "my", "mine", "you", "your", "we", "our", "us", "it", "its", "they", "them",
    "their", "he", "she", "his", "her", "a", "an", "the", "this", "that", "these", "those",
    "is", "are", "am", "was", "were", "be", "been", "do", "does", "did", "can", "could",
    "would", "will", "should", "may", "might", "have", "has", "had", "what", "when", "where",
    "who", "why", "how", "which", "to", "for", "of", "in", "on", "at", "with", "about",
    "from", "by", "and", "or", "but", "if", "so", "not", "any", "some", "there", "here",
    "need", "want", "get", "know", "please", "just", "also", "now", "today", "tomorrow",
    "id", "student", "date", "birth", "dob", "medical", "number",
];

/// Replies that accept a yes/no affordance
pub static AFFIRMATIVE_REPLIES: &[&str] = &[
    "yes", "yeah", "yep", "sure", "ok", "okay", "correct", "confirm", "yes please",
];

/// Replies that decline a yes/no affordance
pub static NEGATIVE_REPLIES: &[&str] = &["no", "nope", "nah", "cancel", "no thanks"];

/// Closed-class words and common verbs with a fixed part of speech
static TAGGED_WORDS: &[(&str, PartOfSpeech)] = &[
    // Pronouns
    ("i", PartOfSpeech::Pronoun),
    ("me", PartOfSpeech::Pronoun),
    ("my", PartOfSpeech::Pronoun),
    ("mine", PartOfSpeech::Pronoun),
    ("you", PartOfSpeech::Pronoun),
    ("your", PartOfSpeech::Pronoun),
    ("we", PartOfSpeech::Pronoun),
    ("our", PartOfSpeech::Pronoun),
    ("us", PartOfSpeech::Pronoun),
    ("it", PartOfSpeech::Pronoun),
    ("its", PartOfSpeech::Pronoun),
    ("they", PartOfSpeech::Pronoun),
    ("them", PartOfSpeech::Pronoun),
    ("their", PartOfSpeech::Pronoun),
    ("he", PartOfSpeech::Pronoun),
    ("she", PartOfSpeech::Pronoun),
    ("his", PartOfSpeech::Pronoun),
    ("her", PartOfSpeech::Pronoun),
    ("what", PartOfSpeech::Pronoun),
    ("which", PartOfSpeech::Pronoun),
    ("who", PartOfSpeech::Pronoun),
    // Determiners
    ("a", PartOfSpeech::Determiner),
    ("an", PartOfSpeech::Determiner),
    ("the", PartOfSpeech::Determiner),
    ("this", PartOfSpeech::Determiner),
    ("that", PartOfSpeech::Determiner),
    ("these", PartOfSpeech::Determiner),
    ("those", PartOfSpeech::Determiner),
    ("any", PartOfSpeech::Determiner),
    ("some", PartOfSpeech::Determiner),
    ("every", PartOfSpeech::Determiner),
    ("each", PartOfSpeech::Determiner),
    // Prepositions
    ("to", PartOfSpeech::Preposition),
    ("for", PartOfSpeech::Preposition),
    ("of", PartOfSpeech::Preposition),
    ("in", PartOfSpeech::Preposition),
    ("on", PartOfSpeech::Preposition),
    ("at", PartOfSpeech::Preposition),
    ("with", PartOfSpeech::Preposition),
    ("about", PartOfSpeech::Preposition),
    ("from", PartOfSpeech::Preposition),
    ("by", PartOfSpeech::Preposition),
    ("into", PartOfSpeech::Preposition),
    ("after", PartOfSpeech::Preposition),
    ("before", PartOfSpeech::Preposition),
    // Conjunctions
    ("and", PartOfSpeech::Conjunction),
    ("or", PartOfSpeech::Conjunction),
    ("but", PartOfSpeech::Conjunction),
    ("if", PartOfSpeech::Conjunction),
    ("so", PartOfSpeech::Conjunction),
    ("because", PartOfSpeech::Conjunction),
    // Adverbs
    ("not", PartOfSpeech::Adverb),
    ("there", PartOfSpeech::Adverb),
    ("here", PartOfSpeech::Adverb),
    ("very", PartOfSpeech::Adverb),
    ("also", PartOfSpeech::Adverb),
    ("just", PartOfSpeech::Adverb),
    ("now", PartOfSpeech::Adverb),
    ("today", PartOfSpeech::Adverb),
    ("tomorrow", PartOfSpeech::Adverb),
    ("when", PartOfSpeech::Adverb),
    ("where", PartOfSpeech::Adverb),
    ("why", PartOfSpeech::Adverb),
    ("how", PartOfSpeech::Adverb),
    ("please", PartOfSpeech::Adverb),
    // Interjections
    ("hi", PartOfSpeech::Interjection),
    ("hello", PartOfSpeech::Interjection),
    ("hey", PartOfSpeech::Interjection),
    ("hiya", PartOfSpeech::Interjection),
    ("howdy", PartOfSpeech::Interjection),
    ("yes", PartOfSpeech::Interjection),
    ("yeah", PartOfSpeech::Interjection),
    ("yep", PartOfSpeech::Interjection),
    ("no", PartOfSpeech::Interjection),
    ("nope", PartOfSpeech::Interjection),
    ("nah", PartOfSpeech::Interjection),
    ("ok", PartOfSpeech::Interjection),
    ("okay", PartOfSpeech::Interjection),
    ("thanks", PartOfSpeech::Interjection),
    ("bye", PartOfSpeech::Interjection),
    ("goodbye", PartOfSpeech::Interjection),
    ("oh", PartOfSpeech::Interjection),
    ("wow", PartOfSpeech::Interjection),
    ("hmm", PartOfSpeech::Interjection),
    // Verbs
    ("is", PartOfSpeech::Verb),
    ("are", PartOfSpeech::Verb),
    ("am", PartOfSpeech::Verb),
    ("was", PartOfSpeech::Verb),
    ("were", PartOfSpeech::Verb),
    ("be", PartOfSpeech::Verb),
    ("been", PartOfSpeech::Verb),
    ("do", PartOfSpeech::Verb),
    ("does", PartOfSpeech::Verb),
    ("did", PartOfSpeech::Verb),
    ("can", PartOfSpeech::Verb),
    ("could", PartOfSpeech::Verb),
    ("would", PartOfSpeech::Verb),
    ("will", PartOfSpeech::Verb),
    ("should", PartOfSpeech::Verb),
    ("may", PartOfSpeech::Verb),
    ("might", PartOfSpeech::Verb),
    ("have", PartOfSpeech::Verb),
    ("has", PartOfSpeech::Verb),
    ("had", PartOfSpeech::Verb),
    ("need", PartOfSpeech::Verb),
    ("want", PartOfSpeech::Verb),
    ("get", PartOfSpeech::Verb),
    ("know", PartOfSpeech::Verb),
    ("book", PartOfSpeech::Verb),
    ("schedule", PartOfSpeech::Verb),
    ("reschedule", PartOfSpeech::Verb),
    ("see", PartOfSpeech::Verb),
    ("cover", PartOfSpeech::Verb),
    ("covers", PartOfSpeech::Verb),
    ("pay", PartOfSpeech::Verb),
    ("help", PartOfSpeech::Verb),
    ("find", PartOfSpeech::Verb),
    ("tell", PartOfSpeech::Verb),
    ("show", PartOfSpeech::Verb),
    ("explain", PartOfSpeech::Verb),
    ("cancel", PartOfSpeech::Verb),
    ("visit", PartOfSpeech::Verb),
    ("call", PartOfSpeech::Verb),
    ("thank", PartOfSpeech::Verb),
    ("go", PartOfSpeech::Verb),
    ("make", PartOfSpeech::Verb),
    ("confirm", PartOfSpeech::Verb),
    // Adjectives
    ("good", PartOfSpeech::Adjective),
    ("great", PartOfSpeech::Adjective),
    ("cool", PartOfSpeech::Adjective),
    ("new", PartOfSpeech::Adjective),
    ("next", PartOfSpeech::Adjective),
    ("sick", PartOfSpeech::Adjective),
    ("fine", PartOfSpeech::Adjective),
    ("sure", PartOfSpeech::Adjective),
    ("correct", PartOfSpeech::Adjective),
    ("urgent", PartOfSpeech::Adjective),
];

/// Look up the fixed part of speech of a lowercased word
pub fn tag_of(word: &str) -> Option<PartOfSpeech> {
    TAGGED_WORDS
        .iter()
        .find(|(entry, _)| *entry == word)
        .map(|(_, tag)| *tag)
}

fn known_words() -> &'static HashSet<&'static str> {
    static KNOWN: OnceLock<HashSet<&'static str>> = OnceLock::new();
    KNOWN.get_or_init(|| {
        [
            GREETINGS,
            INSURANCE_KEYWORDS,
            APPOINTMENT_KEYWORDS,
            SHORT_REPLIES,
            FUNCTION_WORDS,
        ]
        .iter()
        .flat_map(|set| set.iter())
        .flat_map(|phrase| phrase.split_whitespace())
        .collect()
    })
}

/// Returns true if the lowercased word belongs to any known-word set
///
/// Student IDs, dates, and medical IDs also count as known; other digit
/// strings do not.
///
/// # Examples
///
/// ```
/// use shipsmart::nlp::lexicon::is_known_word;
///
/// assert!(is_known_word("morning"));
/// assert!(is_known_word("918859330"));
/// assert!(!is_known_word("12345"));
/// assert!(!is_known_word("qwzx"));
/// ```
pub fn is_known_word(word: &str) -> bool {
    known_words().contains(word) || crate::chat::details::is_identifier_token(word)
}

/// Returns true if the normalized text is exactly a greeting or short reply
pub fn is_exempt_phrase(normalized: &str) -> bool {
    GREETINGS.contains(&normalized) || SHORT_REPLIES.contains(&normalized)
}
