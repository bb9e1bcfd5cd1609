//! Field resolvers.
//!
//! Each field has an ordered chain of named sub-resolvers; the first one to
//! produce a non-empty value wins and its name goes into the trace. The URL
//! is resolved first because the ID and title chains read it.

mod json;
mod node;

use percent_encoding::percent_decode_str;
use url::Url;

use clipscout_shared::{Confidence, DiagnosticTrace, ExtractOptions, Field, Language};

use crate::candidate::Candidate;
use crate::page::Page;
use crate::patterns::{
    DESCRIPTION_SELS, ID_ATTRS, JSON_DESCRIPTION_KEYS, JSON_TITLE_KEYS, JSON_URL_KEYS,
    LONG_DIGITS_RE, MIN_DESCRIPTION_LEN, MIN_SLUG_LEN, PT_KEYWORD_RE, SECTION_SEGMENTS,
    TITLE_LEN_WINDOW, TITLE_SELS,
};

/// A candidate's resolved fields before thumbnail synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// Position of the source candidate.
    pub index: usize,
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    /// Thumbnail found on the page, if any.
    pub thumbnail: Option<String>,
    pub language: Language,
}

impl Draft {
    /// Whether the draft carries anything worth keeping.
    pub fn has_content(&self) -> bool {
        !self.title.is_empty() || !self.video_url.is_empty() || self.thumbnail.is_some()
    }
}

/// Values resolved so far, visible to later chains.
struct Ctx<'p> {
    page: &'p Page,
    video_url: String,
    title: String,
}

type Resolver = fn(&Candidate<'_>, &Ctx<'_>) -> Option<String>;
type Chain = &'static [(&'static str, Resolver)];

const URL_CHAIN: Chain = &[
    ("json-key", url_json),
    ("mined-url", url_mined),
    ("detail-link", url_detail_link),
    ("first-link", url_first_link),
    ("link-data-attr", url_data_attr),
];

const ID_CHAIN: Chain = &[
    ("json-key", id_json),
    ("mined-id", id_mined),
    ("url-digits", id_url_digits),
    ("mined-positional", id_positional),
    ("id-attr", id_attr),
    ("numeric-run", id_numeric_run),
];

const TITLE_CHAIN: Chain = &[
    ("json-key", title_json),
    ("url-slug", title_slug),
    ("heading", title_heading),
    ("img-alt", title_alt),
];

const DESCRIPTION_CHAIN: Chain = &[("json-key", description_json), ("text", description_text)];

const THUMBNAIL_CHAIN: Chain = &[
    ("json-key", thumbnail_json),
    ("img", thumbnail_img),
    ("video-poster", thumbnail_poster),
    ("background-image", thumbnail_background),
    ("image-data-attr", thumbnail_data_attr),
];

/// Resolves every field of a candidate against one page.
pub struct FieldResolver<'p> {
    page: &'p Page,
    opts: &'p ExtractOptions,
    /// Unix time used for synthesized IDs.
    timestamp: i64,
}

impl<'p> FieldResolver<'p> {
    pub fn new(page: &'p Page, opts: &'p ExtractOptions, timestamp: i64) -> Self {
        Self {
            page,
            opts,
            timestamp,
        }
    }

    /// Resolve all fields of the candidate at `index`. `None` means the
    /// candidate is malformed and yields nothing.
    pub fn resolve(
        &self,
        candidate: &Candidate<'_>,
        index: usize,
        trace: &mut DiagnosticTrace,
    ) -> Option<Draft> {
        if let Candidate::Json(value) = candidate {
            if !value.as_object().is_some_and(json::is_recognizable) {
                return None;
            }
        }

        let mut ctx = Ctx {
            page: self.page,
            video_url: String::new(),
            title: String::new(),
        };
        let mut run = |chain: Chain, field: Field, ctx: &Ctx<'_>| {
            let (source, value) = first_of(chain, candidate, ctx)?;
            trace.field(index, field, source);
            Some(value)
        };

        ctx.video_url = run(URL_CHAIN, Field::VideoUrl, &ctx).unwrap_or_default();
        let id = run(ID_CHAIN, Field::Id, &ctx);
        ctx.title = run(TITLE_CHAIN, Field::Title, &ctx).unwrap_or_default();
        let description = run(DESCRIPTION_CHAIN, Field::Description, &ctx)
            .map(|d| truncate_chars(&d, self.opts.description_max))
            .unwrap_or_default();
        let thumbnail = run(THUMBNAIL_CHAIN, Field::Thumbnail, &ctx);

        let id = id.unwrap_or_else(|| {
            trace.field(index, Field::Id, "synthesized");
            format!("video_{index}_{}", self.timestamp)
        });

        let language = detect_language(&ctx.title, &description);
        let language_source = match language {
            Language::Pt => "keyword",
            Language::En => "default",
        };
        trace.field(index, Field::Language, language_source);

        Some(Draft {
            index,
            id,
            title: ctx.title,
            description,
            video_url: ctx.video_url,
            thumbnail,
            language,
        })
    }
}

fn first_of(
    chain: Chain,
    candidate: &Candidate<'_>,
    ctx: &Ctx<'_>,
) -> Option<(&'static str, String)> {
    chain.iter().find_map(|(name, resolver)| {
        resolver(candidate, ctx)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| (*name, v))
    })
}

/// `pt` when title or description contains a Portuguese keyword as a word.
pub fn detect_language(title: &str, description: &str) -> Language {
    if PT_KEYWORD_RE.is_match(title) || PT_KEYWORD_RE.is_match(description) {
        Language::Pt
    } else {
        Language::En
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ---------------------------------------------------------------------------
// Source URL
// ---------------------------------------------------------------------------

fn url_json(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    let Candidate::Json(value) = c else {
        return None;
    };
    let raw = json::string_at(value.as_object()?, JSON_URL_KEYS)?;
    ctx.page.resolve(&raw)
}

fn url_mined(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    match c {
        Candidate::Url { url, .. } => Some(url.clone()),
        _ => None,
    }
}

fn url_detail_link(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    node::detail_link(c.element()?, ctx.page)
}

fn url_first_link(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    node::first_link(c.element()?, ctx.page)
}

fn url_data_attr(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    node::link_data_attr(c.element()?, ctx.page)
}

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

fn id_json(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    match c {
        Candidate::Json(value) => json::id_at(value.as_object()?),
        _ => None,
    }
}

/// A mined ID the candidate is known to own.
fn id_mined(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    match c {
        Candidate::Id { id, .. } => Some(id.clone()),
        Candidate::Url {
            mined_id: Some(m), ..
        } if m.confidence == Confidence::Contained => Some(m.value.clone()),
        _ => None,
    }
}

fn id_url_digits(_c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    LONG_DIGITS_RE
        .find_iter(&ctx.video_url)
        .last()
        .map(|m| m.as_str().to_string())
}

fn id_positional(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    match c {
        Candidate::Url {
            mined_id: Some(m), ..
        } if m.confidence == Confidence::Positional => Some(m.value.clone()),
        _ => None,
    }
}

fn id_attr(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    node::id_attr(c.element()?, ID_ATTRS)
}

fn id_numeric_run(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    match c {
        Candidate::Json(value) => node::digit_run(&value.to_string()),
        _ => node::numeric_run(c.element()?),
    }
}

// ---------------------------------------------------------------------------
// Title
// ---------------------------------------------------------------------------

fn title_json(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    match c {
        Candidate::Json(value) => json::string_at(value.as_object()?, JSON_TITLE_KEYS),
        _ => None,
    }
}

fn title_slug(_c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    slug_title(&ctx.video_url)
}

fn title_heading(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    let (min, max) = TITLE_LEN_WINDOW;
    node::first_text(c.element()?, &TITLE_SELS, |t| {
        let n = t.chars().count();
        n > min && n < max
    })
}

fn title_alt(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    node::image_alt(c.element()?)
}

/// Title-cased last hyphenated path segment that is not a site section.
pub fn slug_title(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let slug = parsed
        .path_segments()?
        .rev()
        .map(|seg| percent_decode_str(seg).decode_utf8_lossy())
        .find(|seg| {
            seg.contains('-')
                && seg.chars().count() >= MIN_SLUG_LEN
                && !SECTION_SEGMENTS.contains(&&**seg)
        })?;
    Some(
        slug.split(['-', '_'])
            .filter(|w| !w.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

fn description_json(c: &Candidate<'_>, _ctx: &Ctx<'_>) -> Option<String> {
    match c {
        Candidate::Json(value) => json::string_at(value.as_object()?, JSON_DESCRIPTION_KEYS),
        _ => None,
    }
}

fn description_text(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    node::first_text(c.element()?, &DESCRIPTION_SELS, |t| {
        t.chars().count() > MIN_DESCRIPTION_LEN && t != ctx.title
    })
}

// ---------------------------------------------------------------------------
// Thumbnail
// ---------------------------------------------------------------------------

fn thumbnail_json(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    let Candidate::Json(value) = c else {
        return None;
    };
    let raw = json::image_at(value.as_object()?)?;
    ctx.page.resolve(&raw)
}

fn thumbnail_img(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    node::img_source(c.element()?, ctx.page)
}

fn thumbnail_poster(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    node::video_poster(c.element()?, ctx.page)
}

fn thumbnail_background(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    node::background_image(c.element()?, ctx.page)
}

fn thumbnail_data_attr(c: &Candidate<'_>, ctx: &Ctx<'_>) -> Option<String> {
    node::image_data_attr(c.element()?, ctx.page)
}
