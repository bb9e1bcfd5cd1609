//! Versioned pattern and selector tables driving every strategy and resolver.
//!
//! Entries are plain data so they can be reordered or extended without
//! touching strategy code; each table has its own unit test below. Bump
//! [`PATTERN_VERSION`] whenever an entry changes meaning.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

/// Revision of the tables in this module.
pub const PATTERN_VERSION: u32 = 3;

// ---------------------------------------------------------------------------
// Structured data
// ---------------------------------------------------------------------------

/// Where an embedded JSON payload begins in raw page content.
#[derive(Debug, Clone, Copy)]
pub struct PayloadPattern {
    pub name: &'static str,
    /// Regex whose match *end* is the first byte of the JSON value.
    pub start: &'static str,
}

pub const PAYLOAD_PATTERNS: &[PayloadPattern] = &[
    PayloadPattern {
        name: "next-data",
        start: r#"(?is)<script[^>]*\bid\s*=\s*["']__NEXT_DATA__["'][^>]*>\s*"#,
    },
    PayloadPattern {
        name: "json-script",
        start: r#"(?is)<script[^>]*\btype\s*=\s*["']application/json["'][^>]*>\s*"#,
    },
    PayloadPattern {
        name: "json-ld",
        start: r#"(?is)<script[^>]*\btype\s*=\s*["']application/ld\+json["'][^>]*>\s*"#,
    },
    PayloadPattern {
        name: "window-state",
        start: r#"window\.__[A-Za-z0-9_]+__\s*=\s*"#,
    },
    PayloadPattern {
        name: "media-array",
        start: r#""(?:videos|clips)"\s*:\s*"#,
    },
];

/// Keys whose array values are treated as clip lists.
pub const LIST_KEYS: &[&str] = &[
    "videos",
    "clips",
    "items",
    "results",
    "data",
    "edges",
    "nodes",
    "hits",
    "itemListElement",
];

/// Wrapper keys unwrapped from list elements (`{ "node": {...} }`).
pub const WRAPPER_KEYS: &[&str] = &["node", "item"];

pub const JSON_ID_KEYS: &[&str] = &["id", "videoId", "clipId", "video_id", "clip_id", "assetId"];
pub const JSON_TITLE_KEYS: &[&str] = &["title", "name", "clipName", "displayName", "headline"];
pub const JSON_DESCRIPTION_KEYS: &[&str] = &["description", "summary", "caption"];
pub const JSON_URL_KEYS: &[&str] = &["url", "videoUrl", "link", "href", "permalink", "path"];
pub const JSON_THUMB_KEYS: &[&str] = &[
    "thumbnail",
    "thumbnailUrl",
    "thumbnail_url",
    "poster",
    "image",
    "imageUrl",
    "cover",
    "previewImage",
];
/// Keys holding the URL inside an image object (`{ "url": "..." }`).
pub const JSON_IMAGE_URL_KEYS: &[&str] = &["url", "src", "href", "contentUrl"];

// ---------------------------------------------------------------------------
// URL mining
// ---------------------------------------------------------------------------

/// Detail-page URL shapes, most specific first.
pub const DETAIL_URL_PATTERNS: &[(&str, &str)] = &[
    (
        "stock-footage-clip",
        r"^(?:https?://[^/\s]+)?/stock-footage/clip/[\w-]+/\d+/?(?:[?#]\S*)?$",
    ),
    (
        "media-slug",
        r"^(?:https?://[^/\s]+)?(?:/[a-z]{2}(?:-[a-z]{2})?)?/(?:clip|clips|video|videos|footage)/[\w-]+(?:/\d+)?/?(?:[?#]\S*)?$",
    ),
];

/// Quoted, URL-ish strings in raw content.
pub static QUOTED_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']((?:https?://|/)[^"'\s<>]{2,400})["']"#).expect("valid regex")
});

/// Key names next to which numeric IDs are mined.
pub const ID_KEYS: &[&str] = &[
    "data-video-id",
    "data-clip-id",
    "data-id",
    "videoId",
    "clipId",
    "video_id",
    "clip_id",
    "id",
];

pub static ID_MINING_RE: LazyLock<Regex> = LazyLock::new(|| {
    let keys = ID_KEYS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r#"(?i)["']?\b(?:{keys})["']?\s*[:=]\s*["']?(\d{{4,}})"#))
        .expect("valid regex")
});

pub static DETAIL_URL_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DETAIL_URL_PATTERNS
        .iter()
        .map(|(name, re)| (*name, Regex::new(re).expect("valid regex")))
        .collect()
});

/// Name of the first detail pattern a URL matches.
pub fn detail_pattern(url: &str) -> Option<&'static str> {
    DETAIL_URL_RES
        .iter()
        .find(|(_, re)| re.is_match(url))
        .map(|(name, _)| *name)
}

/// Path segments that name site sections rather than clips.
pub const SECTION_SEGMENTS: &[&str] = &[
    "stock-footage",
    "stock-video",
    "royalty-free",
    "search",
    "browse",
    "collections",
];

/// Minimum length of a hyphenated path segment used as a title.
pub const MIN_SLUG_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Selector cascade
// ---------------------------------------------------------------------------

/// One rung of the selector cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEntry {
    Css(String),
    /// Any container holding both a link and an image.
    LinkAndImage,
}

impl SelectorEntry {
    pub fn label(&self) -> &str {
        match self {
            Self::Css(css) => css,
            Self::LinkAndImage => "container(link+image)",
        }
    }
}

pub const CARD_SELECTORS: &[&str] = &[
    r#"[data-testid*="clip"]"#,
    r#"[data-testid*="video"]"#,
    r#"[class*="ClipCard"]"#,
    r#"[class*="VideoCard"]"#,
    r#"[class*="MediaCard"]"#,
    r#"article[class*="clip"]"#,
    r#"div[class*="clip"]"#,
    ".video-item",
    ".clip-item",
    r#"[class*="video"]"#,
    r#"[class*="clip"]"#,
    r#"[class*="card"]"#,
    "article",
    ".grid-item",
];

/// The default cascade: CSS entries followed by the link+image rung.
pub fn default_cascade() -> Vec<SelectorEntry> {
    CARD_SELECTORS
        .iter()
        .map(|css| SelectorEntry::Css((*css).to_string()))
        .chain(std::iter::once(SelectorEntry::LinkAndImage))
        .collect()
}

/// Elements considered containers by the link+image rung and the generic fallback.
pub const CONTAINER_SELECTOR: &str = "div, article, section, li, figure";

/// Minimum text length for a generic container to count as non-trivial.
pub const MIN_GENERIC_TEXT: usize = 20;

// ---------------------------------------------------------------------------
// Field resolvers
// ---------------------------------------------------------------------------

pub const TITLE_SELECTORS: &[&str] = &[
    "h1, h2, h3, h4, h5, h6",
    ".title",
    r#"[class*="title"]"#,
    r#"[class*="Title"]"#,
    ".name",
    r#"[class*="name"]"#,
    r#"[class*="Name"]"#,
    ".label",
    r#"[class*="label"]"#,
    r#"span[class*="text"]"#,
    r#"div[class*="text"]"#,
    "p",
    "span",
];

/// Title candidates must be longer than the first and shorter than the second.
pub const TITLE_LEN_WINDOW: (usize, usize) = (3, 200);

pub const DESCRIPTION_SELECTORS: &[&str] = &[
    ".description",
    r#"[class*="description"]"#,
    ".summary",
    r#"[class*="summary"]"#,
    ".excerpt",
    r#"[class*="excerpt"]"#,
    "p",
    ".text",
    r#"[class*="text"]"#,
];

/// Descriptions must be longer than this many characters.
pub const MIN_DESCRIPTION_LEN: usize = 10;

pub const ID_ATTRS: &[&str] = &["data-id", "data-video-id", "data-clip-id", "data-testid", "id"];
pub const LINK_DATA_ATTRS: &[&str] = &["data-url", "data-link", "data-href"];
pub const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-original", "data-lazy-src"];
pub const IMAGE_DATA_ATTRS: &[&str] = &[
    "data-thumbnail",
    "data-thumb",
    "data-poster",
    "data-image",
    "data-bg",
];

pub static BACKGROUND_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background(?:-image)?\s*:[^;]*?url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#)
        .expect("valid regex")
});

/// Runs of four or more digits.
pub static LONG_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4,}").expect("valid regex"));

pub static ANY_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Words that promote a record's language to Portuguese.
pub const PT_KEYWORDS: &[&str] = &[
    "português",
    "brasil",
    "pt-br",
    "brasileiro",
    "lusitano",
    "música",
    "vídeo",
    "imagem",
    "som",
    "áudio",
];

pub static PT_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    let words = PT_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    // Plural endings count: "vídeos", "músicas".
    Regex::new(&format!(r"(?i)\b(?:{words})(?:e?s)?\b")).expect("valid regex")
});

/// Compile a selector table, dropping entries that fail to parse.
pub(crate) fn compile(table: &[&str]) -> Vec<Selector> {
    table.iter().filter_map(|css| Selector::parse(css).ok()).collect()
}

pub(crate) static TITLE_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(TITLE_SELECTORS));
pub(crate) static DESCRIPTION_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| compile(DESCRIPTION_SELECTORS));
pub(crate) static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(CONTAINER_SELECTOR).expect("valid selector"));
pub(crate) static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
