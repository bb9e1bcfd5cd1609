//! Thumbnail synthesis for records with no discovered image.
//!
//! Given a title (plus the record's URL and ID for stable keying), the
//! synthesizer walks a fixed provider chain:
//!
//! 1. keyword-search provider built from title keywords and a category hint
//! 2. seeded provider keyed by a stable hash of the record
//! 3. static per-category placeholder
//!
//! Every step that needs the network goes through an injected [`ImageProbe`],
//! so the chain is total and bounded by the probe timeout.

mod keywords;
mod probe;

use sha2::{Digest, Sha256};
use tracing::{debug, instrument};
use url::form_urlencoded;

use clipscout_shared::{ThumbnailOptions, ThumbnailSource};

pub use keywords::{Category, DEFAULT_KEYWORD, classify, extract_keywords};
pub use probe::{HttpProbe, ImageProbe, OfflineProbe};

/// Maximum number of title keywords used in a provider query.
const MAX_KEYWORDS: usize = 3;

/// Prefix of identifiers the pipeline fabricates; these are not stable keys.
const SYNTHETIC_ID_PREFIX: &str = "video_";

/// A synthesized thumbnail reference and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    pub url: String,
    pub source: ThumbnailSource,
    pub category: Category,
}

/// Resolves a plausible image URL for a record through the provider chain.
#[derive(Debug, Clone)]
pub struct ThumbnailSynthesizer<P> {
    probe: P,
    opts: ThumbnailOptions,
}

impl<P: ImageProbe> ThumbnailSynthesizer<P> {
    pub fn new(probe: P, opts: ThumbnailOptions) -> Self {
        Self { probe, opts }
    }

    pub fn options(&self) -> &ThumbnailOptions {
        &self.opts
    }

    /// Produce a thumbnail for a record. Never fails and never returns an
    /// empty URL.
    #[instrument(skip(self), level = "debug")]
    pub async fn synthesize(&self, title: &str, video_url: &str, id: &str) -> Synthesized {
        let category = classify(title);

        if title.trim().is_empty() || !self.opts.probe {
            return self.placeholder(category);
        }

        let keywords = extract_keywords(title, MAX_KEYWORDS);
        let primary = self.primary_url(&keywords, category);
        if self.probe.is_alive(&primary).await {
            return Synthesized {
                url: primary,
                source: ThumbnailSource::Primary,
                category,
            };
        }

        let fallback = self.fallback_url(stable_key(title, video_url, id));
        if self.probe.is_alive(&fallback).await {
            return Synthesized {
                url: fallback,
                source: ThumbnailSource::Fallback,
                category,
            };
        }

        debug!(%category, "providers unreachable, using placeholder");
        self.placeholder(category)
    }

    /// Static placeholder for a category. Requires no network.
    pub fn placeholder(&self, category: Category) -> Synthesized {
        Synthesized {
            url: self.placeholder_url(category),
            source: ThumbnailSource::Placeholder,
            category,
        }
    }

    /// Keyword-search provider URL: `{base}/{w}x{h}/?kw1,kw2,hint`.
    pub fn primary_url(&self, keywords: &[String], category: Category) -> String {
        let query = keywords
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(category.hint()))
            .map(|k| form_urlencoded::byte_serialize(k.as_bytes()).collect::<String>())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/{}x{}/?{query}",
            self.opts.primary_base, self.opts.width, self.opts.height
        )
    }

    /// Seeded provider URL; the same key always maps to the same image.
    pub fn fallback_url(&self, key: &str) -> String {
        format!(
            "{}/seed/{}/{}/{}",
            self.opts.fallback_base,
            stable_hash(key),
            self.opts.width,
            self.opts.height
        )
    }

    /// Non-seeded random image from the fallback provider.
    pub fn random_url(&self, nonce: usize) -> String {
        format!(
            "{}/{}/{}?random={nonce}",
            self.opts.fallback_base, self.opts.width, self.opts.height
        )
    }

    pub fn placeholder_url(&self, category: Category) -> String {
        let label = capitalize(category.name());
        format!(
            "{}/{}x{}/{}/ffffff?text={label}",
            self.opts.placeholder_base,
            self.opts.width,
            self.opts.height,
            category.color()
        )
    }
}

/// Pick the most stable identifying string for seeding the fallback provider.
fn stable_key<'a>(title: &'a str, video_url: &'a str, id: &'a str) -> &'a str {
    if !id.is_empty() && !id.starts_with(SYNTHETIC_ID_PREFIX) {
        id
    } else if !video_url.is_empty() {
        video_url
    } else {
        title
    }
}

/// First 16 hex chars of the SHA-256 of `key`.
pub fn stable_hash(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    digest
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Probe that reports URLs alive by prefix and remembers what it was asked.
    struct StubProbe {
        alive_prefixes: Vec<String>,
        seen: Mutex<Vec<String>>,
    }

    impl StubProbe {
        fn new(alive: &[&str]) -> Self {
            Self {
                alive_prefixes: alive.iter().map(|s| s.to_string()).collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ImageProbe for StubProbe {
        async fn is_alive(&self, url: &str) -> bool {
            self.seen.lock().unwrap().push(url.to_string());
            self.alive_prefixes.iter().any(|p| url.starts_with(p.as_str()))
        }
    }

    fn synth(alive: &[&str]) -> ThumbnailSynthesizer<StubProbe> {
        ThumbnailSynthesizer::new(StubProbe::new(alive), ThumbnailOptions::default())
    }

    #[tokio::test]
    async fn primary_provider_when_alive() {
        let s = synth(&["https://source.unsplash.com"]);
        let out = s.synthesize("Desert Dunes", "", "998877").await;
        assert_eq!(out.source, ThumbnailSource::Primary);
        assert_eq!(out.category, Category::Nature);
        assert_eq!(out.url, "https://source.unsplash.com/640x360/?desert,dunes,landscape");
    }

    #[tokio::test]
    async fn fallback_is_stable_across_calls() {
        let s = synth(&["https://picsum.photos"]);
        let a = s.synthesize("City Traffic At Night", "", "234567").await;
        let b = s.synthesize("City Traffic At Night", "", "234567").await;
        assert_eq!(a.source, ThumbnailSource::Fallback);
        assert_eq!(a.url, b.url);
        assert_eq!(a.url, format!("https://picsum.photos/seed/{}/640/360", stable_hash("234567")));
    }

    #[tokio::test]
    async fn synthetic_ids_do_not_seed_fallback() {
        let s = synth(&["https://picsum.photos"]);
        let a = s.synthesize("Ocean Waves", "", "video_0_1700000000").await;
        let b = s.synthesize("Ocean Waves", "", "video_0_1700000999").await;
        assert_eq!(a.url, b.url);
    }

    #[tokio::test]
    async fn placeholder_when_everything_is_down() {
        let s = synth(&[]);
        let out = s.synthesize("Desert Dunes", "", "1").await;
        assert_eq!(out.source, ThumbnailSource::Placeholder);
        assert_eq!(out.url, "https://placehold.co/640x360/2e7d32/ffffff?text=Nature");
        assert_eq!(s.probe.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_title_skips_probing() {
        let s = synth(&["https://"]);
        let out = s.synthesize("   ", "https://artlist.io/x", "123").await;
        assert_eq!(out.source, ThumbnailSource::Placeholder);
        assert_eq!(out.category, Category::Abstract);
        assert!(s.probe.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn probing_disabled_goes_to_placeholder() {
        let opts = ThumbnailOptions {
            probe: false,
            ..ThumbnailOptions::default()
        };
        let s = ThumbnailSynthesizer::new(StubProbe::new(&["https://"]), opts);
        let out = s.synthesize("Forest river", "", "42").await;
        assert_eq!(out.source, ThumbnailSource::Placeholder);
        assert!(out.url.contains("text=Nature"));
    }

    #[tokio::test]
    async fn offline_probe_is_deterministic() {
        let s = ThumbnailSynthesizer::new(OfflineProbe, ThumbnailOptions::default());
        let a = s.synthesize("Neon city", "", "555555").await;
        let b = s.synthesize("Neon city", "", "555555").await;
        assert_eq!(a, b);
        assert!(!a.url.is_empty());
    }

    #[test]
    fn primary_url_encodes_keywords() {
        let s = synth(&[]);
        let url = s.primary_url(&["música".to_string()], Category::Abstract);
        assert_eq!(url, "https://source.unsplash.com/640x360/?m%C3%BAsica,texture");
    }

    #[test]
    fn stable_key_preference() {
        assert_eq!(stable_key("t", "u", "123"), "123");
        assert_eq!(stable_key("t", "u", "video_1_2"), "u");
        assert_eq!(stable_key("t", "", ""), "t");
    }

    #[test]
    fn stable_hash_is_short_hex() {
        let h = stable_hash("123456");
        assert_eq!(h.len(), 16);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(h, stable_hash("123456"));
        assert_ne!(h, stable_hash("123457"));
    }
}
