use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Question.
///
/// Question assets may carry ids as JSON numbers or strings. Both are kept in
/// their textual form, which is also the key used by every persisted mapping.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Returns the underlying textual value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for QuestionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Borrow<str> for QuestionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Unsigned(u64),
            Signed(i64),
            Float(f64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Unsigned(n) => Ok(Self(n.to_string())),
            RawId::Signed(n) => Ok(Self(n.to_string())),
            RawId::Float(f) => integral_id(f)
                .ok_or_else(|| serde::de::Error::custom(format!("question id {f} is not an integer"))),
            // Same normalization as `FromStr`, so persisted keys parse back to the asset id.
            RawId::Text(s) => s
                .parse()
                .map_err(|_| serde::de::Error::custom("question id cannot be empty")),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral_id(f: f64) -> Option<QuestionId> {
    if !f.is_finite() || f.fract() != 0.0 || f.abs() > i64::MAX as f64 {
        return None;
    }
    Some(QuestionId((f as i64).to_string()))
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── FromStr ───────────────────────────────────────────────────────────────────

/// Error type for parsing an id from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "QuestionId".to_string(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_ids_share_a_key() {
        let from_num: QuestionId = serde_json::from_str("12").unwrap();
        let from_text: QuestionId = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(from_num, from_text);
        assert_eq!(from_num.as_str(), "12");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = QuestionId::from(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn padded_text_id_matches_its_parsed_key() {
        let from_asset: QuestionId = serde_json::from_str("\" 7 \"").unwrap();
        let from_key: QuestionId = from_asset.to_string().parse().unwrap();
        assert_eq!(from_asset, from_key);
        assert_eq!(from_asset.as_str(), "7");
    }

    #[test]
    fn wide_and_integral_float_ids_are_accepted() {
        let max: QuestionId = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(max.as_str(), "18446744073709551615");
        let negative: QuestionId = serde_json::from_str("-4").unwrap();
        assert_eq!(negative.as_str(), "-4");
        let float: QuestionId = serde_json::from_str("3.0").unwrap();
        assert_eq!(float, QuestionId::from(3));
        assert!(serde_json::from_str::<QuestionId>("3.5").is_err());
    }

    #[test]
    fn empty_text_id_is_rejected() {
        assert!(serde_json::from_str::<QuestionId>("\"  \"").is_err());
        assert!("".parse::<QuestionId>().is_err());
    }

    #[test]
    fn display_and_from_str() {
        let id: QuestionId = " q-3 ".parse().unwrap();
        assert_eq!(id.to_string(), "q-3");
    }
}
