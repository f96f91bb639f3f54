use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// TMDb numeric movie identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cleaned catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Missing when the source row had no usable id
    pub id: Option<MovieId>,
    pub title: String,
    /// Lowercase genre tags in source order
    pub genres: Vec<String>,
    pub original_language: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub status: String,
}

impl Movie {
    /// Returns true if the movie carries the given (lowercase) genre tag
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// Language subset a catalog snapshot is restricted to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    All,
    English,
    Filipino,
    Korean,
    Japanese,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::All,
        Language::English,
        Language::Filipino,
        Language::Korean,
        Language::Japanese,
    ];

    /// ISO 639-1 code as used in TMDb's `original_language` column
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Language::All => None,
            Language::English => Some("en"),
            Language::Filipino => Some("tl"),
            Language::Korean => Some("ko"),
            Language::Japanese => Some("ja"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::All => "all",
            Language::English => "english",
            Language::Filipino => "filipino",
            Language::Korean => "korean",
            Language::Japanese => "japanese",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Language::All),
            "english" | "en" => Ok(Language::English),
            "filipino" | "tl" => Ok(Language::Filipino),
            "korean" | "ko" => Ok(Language::Korean),
            "japanese" | "ja" => Ok(Language::Japanese),
            other => Err(AppError::InvalidInput(format!(
                "Unknown language '{}', expected one of all, english, filipino, korean, japanese",
                other
            ))),
        }
    }
}
