//! Record assembly: candidates to drafts, drafts to records.
//!
//! The first half runs synchronously while the DOM is alive and produces
//! owned [`Draft`]s. The second half fills missing thumbnails through the
//! synthesizer, one record at a time, preserving order.

use std::collections::HashSet;

use tracing::debug;

use clipscout_shared::{DiagnosticTrace, SkipReason, ThumbnailSource, VideoRecord};
use clipscout_thumbnails::{ImageProbe, ThumbnailSynthesizer};

use crate::candidate::Located;
use crate::resolve::{Draft, FieldResolver};

/// Resolve candidates in order until `count` drafts are kept.
///
/// Malformed candidates, candidates with no title, URL or discovered
/// thumbnail, and (with `dedup`) repeated video URLs are skipped and traced.
pub fn assemble_drafts(
    located: &Located<'_>,
    resolver: &FieldResolver<'_>,
    count: usize,
    dedup: bool,
    trace: &mut DiagnosticTrace,
) -> Vec<Draft> {
    let mut drafts = Vec::with_capacity(count.min(located.len()));
    let mut seen_urls = HashSet::new();

    for (index, candidate) in located.candidates.iter().enumerate() {
        if drafts.len() >= count {
            break;
        }
        let Some(draft) = resolver.resolve(candidate, index, trace) else {
            debug!(index, "malformed candidate skipped");
            trace.skip(index, SkipReason::Malformed);
            continue;
        };
        if !draft.has_content() {
            trace.skip(index, SkipReason::Empty);
            continue;
        }
        if dedup && !draft.video_url.is_empty() && !seen_urls.insert(draft.video_url.clone()) {
            trace.skip(index, SkipReason::Duplicate);
            continue;
        }
        drafts.push(draft);
    }
    drafts
}

/// Turn drafts into records, synthesizing thumbnails where none was found.
pub async fn finish<P: ImageProbe>(
    drafts: Vec<Draft>,
    source_tag: &str,
    synthesizer: &ThumbnailSynthesizer<P>,
    trace: &mut DiagnosticTrace,
) -> Vec<VideoRecord> {
    let mut records = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let thumbnail_url = match draft.thumbnail {
            Some(url) => {
                trace.thumbnail(draft.id.as_str(), ThumbnailSource::Discovered, None);
                url
            }
            None => {
                let synth = synthesizer
                    .synthesize(&draft.title, &draft.video_url, &draft.id)
                    .await;
                trace.thumbnail(
                    draft.id.as_str(),
                    synth.source,
                    Some(synth.category.to_string()),
                );
                synth.url
            }
        };
        records.push(VideoRecord {
            id: draft.id,
            source: source_tag.to_string(),
            title: draft.title,
            description: draft.description,
            video_url: draft.video_url,
            thumbnail_url,
            language: draft.language,
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use crate::page::Page;
    use clipscout_shared::{ExtractOptions, Language, Strategy, ThumbnailOptions};
    use clipscout_thumbnails::OfflineProbe;
    use serde_json::json;
    use url::Url;

    fn page() -> Page {
        Page::parse("<html></html>", &Url::parse("https://artlist.io").unwrap())
    }

    fn located(values: Vec<serde_json::Value>) -> Located<'static> {
        Located {
            strategy: Strategy::StructuredData,
            candidates: values.into_iter().map(Candidate::Json).collect(),
        }
    }

    #[test]
    fn skips_and_dedups_in_order() {
        let p = page();
        let opts = ExtractOptions::default();
        let resolver = FieldResolver::new(&p, &opts, 1);
        let loc = located(vec![
            json!({"color": "red"}),
            json!({"id": 1111, "url": "/clip/a-clip/1111", "title": "A"}),
            json!({"id": 2222, "description": "no title, url or image"}),
            json!({"id": 3333, "url": "/clip/a-clip/1111", "title": "A again"}),
            json!({"id": 4444, "url": "/clip/b-clip/4444"}),
        ]);
        let mut trace = DiagnosticTrace::new();
        let drafts = assemble_drafts(&loc, &resolver, 10, true, &mut trace);

        let ids: Vec<_> = drafts.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1111", "4444"]);
        assert_eq!(trace.skipped_for(SkipReason::Malformed), 1);
        assert_eq!(trace.skipped_for(SkipReason::Empty), 1);
        assert_eq!(trace.skipped_for(SkipReason::Duplicate), 1);
    }

    #[test]
    fn dedup_can_be_disabled() {
        let p = page();
        let opts = ExtractOptions::default();
        let resolver = FieldResolver::new(&p, &opts, 1);
        let loc = located(vec![
            json!({"url": "/clip/same-clip/1"}),
            json!({"url": "/clip/same-clip/1"}),
        ]);
        let mut trace = DiagnosticTrace::new();
        assert_eq!(assemble_drafts(&loc, &resolver, 10, false, &mut trace).len(), 2);
        assert_eq!(assemble_drafts(&loc, &resolver, 10, true, &mut trace).len(), 1);
    }

    #[test]
    fn stops_at_count() {
        let p = page();
        let opts = ExtractOptions::default();
        let resolver = FieldResolver::new(&p, &opts, 1);
        let loc = located((0..10).map(|i| json!({"id": i, "title": format!("Clip {i}")})).collect());
        let mut trace = DiagnosticTrace::new();
        assert_eq!(assemble_drafts(&loc, &resolver, 3, true, &mut trace).len(), 3);
        assert!(trace.fields.iter().all(|f| f.candidate < 3));
    }

    #[tokio::test]
    async fn finish_fills_missing_thumbnails() {
        let drafts = vec![
            Draft {
                index: 0,
                id: "1".into(),
                title: "Desert Dunes".into(),
                description: String::new(),
                video_url: String::new(),
                thumbnail: None,
                language: Language::En,
            },
            Draft {
                index: 1,
                id: "2".into(),
                title: "Harbor".into(),
                description: String::new(),
                video_url: "https://artlist.io/clip/harbor".into(),
                thumbnail: Some("https://cdn.example.com/h.jpg".into()),
                language: Language::En,
            },
        ];
        let synth = ThumbnailSynthesizer::new(OfflineProbe, ThumbnailOptions::default());
        let mut trace = DiagnosticTrace::new();
        let records = finish(drafts, "artlist.io", &synth, &mut trace).await;

        assert_eq!(records.len(), 2);
        assert!(records[0].thumbnail_url.contains("text=Nature"));
        assert_eq!(records[1].thumbnail_url, "https://cdn.example.com/h.jpg");
        assert!(records.iter().all(|r| r.source == "artlist.io"));
        assert_eq!(trace.thumbnails[0].source, ThumbnailSource::Placeholder);
        assert_eq!(trace.thumbnails[0].category.as_deref(), Some("nature"));
        assert_eq!(trace.thumbnails[1].source, ThumbnailSource::Discovered);
    }
}
