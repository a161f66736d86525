//! Language codes used for preferences, detection results and translation targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language assumed whenever a client or a detector gives us nothing usable.
pub const DEFAULT_LANGUAGE: &str = "en";

/// An ISO-639-1-style language code such as `en`, `fr` or `zh-cn`.
///
/// Codes are trimmed and lowercased on construction. An empty input yields
/// [`DEFAULT_LANGUAGE`], so a `LanguageCode` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        let code = code.as_ref().trim();
        if code.is_empty() {
            Self::default()
        } else {
            Self(code.to_lowercase())
        }
    }

    /// Build from an optional client-supplied value, falling back to the default.
    pub fn or_default(code: Option<&str>) -> Self {
        code.map(Self::new).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_LANGUAGE
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_string())
    }
}

impl From<String> for LanguageCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for LanguageCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("fr", "fr" ; "plain code")]
    #[test_case("  DE ", "de" ; "trimmed and lowercased")]
    #[test_case("zh-CN", "zh-cn" ; "region subtag")]
    #[test_case("", "en" ; "empty falls back")]
    #[test_case("   ", "en" ; "blank falls back")]
    fn test_normalization(input: &str, expected: &str) {
        assert_eq!(LanguageCode::new(input).as_str(), expected);
    }

    #[test]
    fn test_or_default() {
        assert_eq!(LanguageCode::or_default(None), LanguageCode::default());
        assert_eq!(LanguageCode::or_default(Some("es")).as_str(), "es");
    }

    #[test]
    fn test_serde_round_trip_normalizes() {
        let code: LanguageCode = serde_json::from_str("\"\"").unwrap();
        assert!(code.is_default());
        assert_eq!(serde_json::to_string(&LanguageCode::new("FR")).unwrap(), "\"fr\"");
    }
}
