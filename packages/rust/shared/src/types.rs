//! Core domain types for extracted clip records.

use serde::{Deserialize, Serialize};

/// Stable export column names, in output order.
pub const RECORD_FIELDS: [&str; 7] = [
    "ID",
    "Source",
    "Title",
    "Description",
    "Video URL",
    "Thumbnail URL",
    "Language",
];

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Coarse language guess for a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pt,
}

impl Language {
    /// Two-letter code used in exports.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pt => "pt",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// VideoRecord
// ---------------------------------------------------------------------------

/// One extracted clip. Serialized field names are the stable export names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Never empty; synthesized when nothing on the page identifies the clip.
    #[serde(rename = "ID")]
    pub id: String,
    /// Provenance tag for the origin site.
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    /// Absolute detail-page URL, or empty.
    #[serde(rename = "Video URL")]
    pub video_url: String,
    /// Always populated: discovered or synthesized.
    #[serde(rename = "Thumbnail URL")]
    pub thumbnail_url: String,
    #[serde(rename = "Language")]
    pub language: Language,
}

impl VideoRecord {
    /// Values in [`RECORD_FIELDS`] order, for flat row exports.
    pub fn row(&self) -> [&str; 7] {
        [
            &self.id,
            &self.source,
            &self.title,
            &self.description,
            &self.video_url,
            &self.thumbnail_url,
            self.language.code(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Candidate locator strategies, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    StructuredData,
    UrlPattern,
    SelectorCascade,
    GenericFallback,
}

impl Strategy {
    /// All strategies in the order the locator tries them.
    pub const ALL: [Strategy; 4] = [
        Strategy::StructuredData,
        Strategy::UrlPattern,
        Strategy::SelectorCascade,
        Strategy::GenericFallback,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::StructuredData => "structured-data",
            Self::UrlPattern => "url-pattern",
            Self::SelectorCascade => "selector-cascade",
            Self::GenericFallback => "generic-fallback",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
