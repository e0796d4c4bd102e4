//! Identity fields collected while the assistant looks up a member's plan

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Student ID, date of birth, and medical ID gathered from chat text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDetails {
    /// Nine-digit UC student identifier
    pub student_id: Option<String>,
    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// Insurance card member ID (letter prefix followed by digits)
    pub medical_id: Option<String>,
}

fn student_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\d{9}\b").expect("Invalid student id pattern"))
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b")
            .expect("Invalid date pattern")
    })
}

fn medical_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b[A-Za-z]{1,4}\d{5,12}\b").expect("Invalid medical id pattern")
    })
}

/// True if the whole of `token` has the shape of a student ID, date, or
/// medical ID
pub(crate) fn is_identifier_token(token: &str) -> bool {
    [student_id_pattern(), date_pattern(), medical_id_pattern()]
        .iter()
        .any(|pattern| {
            pattern
                .find(token)
                .map_or(false, |m| m.start() == 0 && m.end() == token.len())
        })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%m/%d/%y", "%m-%d-%y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

impl IdentityDetails {
    /// Pull whatever identity fields appear in `text`
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::chat::IdentityDetails;
    ///
    /// let details = IdentityDetails::extract("ID 918859330, born 02/03/2001, card XYZ12345678");
    /// assert!(details.is_complete());
    /// assert_eq!(details.medical_id.as_deref(), Some("XYZ12345678"));
    /// ```
    pub fn extract(text: &str) -> Self {
        let date_of_birth = date_pattern()
            .find_iter(text)
            .find_map(|m| parse_date(m.as_str()));

        Self {
            student_id: student_id_pattern()
                .find(text)
                .map(|m| m.as_str().to_string()),
            date_of_birth,
            medical_id: medical_id_pattern()
                .find(text)
                .map(|m| m.as_str().to_uppercase()),
        }
    }

    /// Fill missing fields from `other`; fields already known are kept
    pub fn merge(&mut self, other: IdentityDetails) {
        if self.student_id.is_none() {
            self.student_id = other.student_id;
        }
        if self.date_of_birth.is_none() {
            self.date_of_birth = other.date_of_birth;
        }
        if self.medical_id.is_none() {
            self.medical_id = other.medical_id;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.student_id.is_none() && self.date_of_birth.is_none() && self.medical_id.is_none()
    }

    /// Human-readable names of the fields still missing
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.student_id.is_none() {
            missing.push("student ID");
        }
        if self.date_of_birth.is_none() {
            missing.push("date of birth");
        }
        if self.medical_id.is_none() {
            missing.push("medical ID");
        }
        missing
    }
}
