//! Core types for gencache

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content category served by the cache
///
/// Each category owns one independent learned model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movie,
    Music,
    Voice,
    Analysis,
}

impl Category {
    /// Every known category, in stable order
    pub const ALL: [Category; 4] = [
        Category::Movie,
        Category::Music,
        Category::Voice,
        Category::Analysis,
    ];

    /// Lowercase name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Music => "music",
            Self::Voice => "voice",
            Self::Analysis => "analysis",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "music" => Ok(Self::Music),
            "voice" => Ok(Self::Voice),
            "analysis" => Ok(Self::Analysis),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}

/// Fixed-shape feature summary of an input text
///
/// Derived for every query and frozen into each stored pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Lowercased words longer than 3 characters, in order of appearance
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Character count of the input
    pub length: usize,

    /// Lexicon sentiment in [-1, 1]
    pub sentiment: f64,

    /// Input contains at least one digit
    #[serde(default)]
    pub has_numbers: bool,

    /// Input contains at least one punctuation mark from the fixed set
    #[serde(default)]
    pub has_special_chars: bool,
}

impl Context {
    /// Context of the empty string
    pub fn empty() -> Self {
        Self {
            keywords: Vec::new(),
            length: 0,
            sentiment: 0.0,
            has_numbers: false,
            has_special_chars: false,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!(" Movie ".parse::<Category>().unwrap(), Category::Movie);
        assert!("podcast".parse::<Category>().is_err());
    }

    #[test]
    fn test_legacy_context_without_special_chars() {
        let ctx: Context = serde_json::from_value(serde_json::json!({
            "keywords": ["sunset", "over"],
            "length": 22,
            "hasNumbers": false,
            "sentiment": 0.2
        }))
        .unwrap();

        assert_eq!(ctx.keywords, vec!["sunset", "over"]);
        assert!(!ctx.has_special_chars);
    }
}
