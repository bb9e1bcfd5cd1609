//! Explicit thumbnail post-pass over finished records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use clipscout_shared::{ClipScoutError, DiagnosticTrace, ThumbnailSource, VideoRecord};
use clipscout_thumbnails::{ImageProbe, ThumbnailSynthesizer, classify};

/// What to do with every record's thumbnail after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailPolicy {
    /// Leave thumbnails as extracted.
    #[default]
    Keep,
    /// Static per-category placeholder for every record.
    Placeholder,
    /// A random image from the seeded provider, different per record.
    Random,
    /// Run the full provider chain for every record.
    Provider,
}

impl ThumbnailPolicy {
    pub const ALL: [ThumbnailPolicy; 4] =
        [Self::Keep, Self::Placeholder, Self::Random, Self::Provider];

    pub fn name(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Placeholder => "placeholder",
            Self::Random => "random",
            Self::Provider => "provider",
        }
    }
}

impl fmt::Display for ThumbnailPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThumbnailPolicy {
    type Err = ClipScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ClipScoutError::validation(format!(
                    "unknown thumbnail policy `{s}` (expected keep, placeholder, random or provider)"
                ))
            })
    }
}

/// Apply `policy` to every record and return the new list. Each replaced
/// thumbnail is added to the trace.
#[instrument(skip_all, fields(policy = %policy, records = records.len()))]
pub async fn backfill<P: ImageProbe>(
    records: &[VideoRecord],
    policy: ThumbnailPolicy,
    synthesizer: &ThumbnailSynthesizer<P>,
    trace: &mut DiagnosticTrace,
) -> Vec<VideoRecord> {
    let mut out = Vec::with_capacity(records.len());
    let mut replaced = 0usize;
    for (i, record) in records.iter().enumerate() {
        let (url, source, category) = match policy {
            ThumbnailPolicy::Keep => {
                out.push(record.clone());
                continue;
            }
            ThumbnailPolicy::Placeholder => {
                let synth = synthesizer.placeholder(classify(&record.title));
                (synth.url, synth.source, Some(synth.category.to_string()))
            }
            ThumbnailPolicy::Random => (synthesizer.random_url(i), ThumbnailSource::Random, None),
            ThumbnailPolicy::Provider => {
                let synth = synthesizer
                    .synthesize(&record.title, &record.video_url, &record.id)
                    .await;
                (synth.url, synth.source, Some(synth.category.to_string()))
            }
        };
        trace.thumbnail(record.id.as_str(), source, category);
        replaced += 1;
        out.push(VideoRecord {
            thumbnail_url: url,
            ..record.clone()
        });
    }

    info!(replaced, "thumbnails back-filled");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipscout_shared::{Language, ThumbnailOptions};
    use clipscout_thumbnails::OfflineProbe;

    fn record(id: &str, title: &str) -> VideoRecord {
        VideoRecord {
            id: id.into(),
            source: "artlist.io".into(),
            title: title.into(),
            description: String::new(),
            video_url: format!("https://artlist.io/clip/{id}"),
            thumbnail_url: "https://cdn.example.com/orig.jpg".into(),
            language: Language::En,
        }
    }

    fn synth() -> ThumbnailSynthesizer<OfflineProbe> {
        ThumbnailSynthesizer::new(OfflineProbe, ThumbnailOptions::default())
    }

    #[tokio::test]
    async fn keep_is_a_no_op() {
        let records = vec![record("1", "Forest")];
        let mut trace = DiagnosticTrace::new();
        let out = backfill(&records, ThumbnailPolicy::Keep, &synth(), &mut trace).await;
        assert_eq!(out, records);
        assert!(trace.thumbnails.is_empty());
    }

    #[tokio::test]
    async fn placeholder_replaces_every_thumbnail() {
        let records = vec![record("1", "Forest trail"), record("2", "Neon city")];
        let mut trace = DiagnosticTrace::new();
        let out = backfill(&records, ThumbnailPolicy::Placeholder, &synth(), &mut trace).await;

        assert!(out[0].thumbnail_url.contains("text=Nature"));
        assert!(out[1].thumbnail_url.contains("text=City"));
        assert_eq!(trace.thumbnails.len(), 2);
        assert_eq!(records[0].thumbnail_url, "https://cdn.example.com/orig.jpg");
    }

    #[tokio::test]
    async fn random_urls_differ_per_record() {
        let records = vec![record("1", "A"), record("2", "B")];
        let mut trace = DiagnosticTrace::new();
        let out = backfill(&records, ThumbnailPolicy::Random, &synth(), &mut trace).await;

        assert_ne!(out[0].thumbnail_url, out[1].thumbnail_url);
        assert!(out[0].thumbnail_url.starts_with("https://picsum.photos/640/360?random="));
        assert_eq!(trace.thumbnails[0].source, ThumbnailSource::Random);
    }

    #[tokio::test]
    async fn provider_runs_synthesis_for_all() {
        let records = vec![record("1", "Desert Dunes")];
        let mut trace = DiagnosticTrace::new();
        let out = backfill(&records, ThumbnailPolicy::Provider, &synth(), &mut trace).await;
        assert_eq!(
            out[0].thumbnail_url,
            "https://placehold.co/640x360/2e7d32/ffffff?text=Nature"
        );
        assert_eq!(trace.thumbnails[0].source, ThumbnailSource::Placeholder);
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("Random".parse::<ThumbnailPolicy>().unwrap(), ThumbnailPolicy::Random);
        assert!("sometimes".parse::<ThumbnailPolicy>().is_err());
        assert_eq!(ThumbnailPolicy::default(), ThumbnailPolicy::Keep);
    }
}
