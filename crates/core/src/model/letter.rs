use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LetterError {
    #[error("option letter cannot be empty")]
    Empty,

    #[error("invalid option letter: {0:?}")]
    Invalid(String),
}

/// A multiple-choice option label (`A`..=`Z`).
///
/// Parsing trims whitespace and normalizes to uppercase, so `"b"` and `"B"`
/// compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionLetter(char);

impl OptionLetter {
    /// Letters offered for every question.
    pub const STANDARD: [OptionLetter; 4] = [
        OptionLetter('A'),
        OptionLetter('B'),
        OptionLetter('C'),
        OptionLetter('D'),
    ];

    /// Builds a letter from a single character.
    ///
    /// # Errors
    ///
    /// Returns `LetterError::Invalid` if `ch` is not an ASCII letter.
    pub fn new(ch: char) -> Result<Self, LetterError> {
        if ch.is_ascii_alphabetic() {
            Ok(Self(ch.to_ascii_uppercase()))
        } else {
            Err(LetterError::Invalid(ch.to_string()))
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        self.0
    }
}

impl FromStr for OptionLetter {
    type Err = LetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(LetterError::Empty),
            (Some(ch), None) => Self::new(ch),
            _ => Err(LetterError::Invalid(trimmed.to_owned())),
        }
    }
}

impl fmt::Debug for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionLetter({})", self.0)
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for OptionLetter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OptionLetter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
