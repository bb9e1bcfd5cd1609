//! URL-pattern mining: detail-page links and numeric IDs found anywhere in
//! the raw content, including script bodies the DOM never renders.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use clipscout_shared::{Confidence, CorrelationReport, Result, Strategy};

use super::{Found, LocatorStrategy};
use crate::candidate::{Candidate, MinedId};
use crate::page::Page;
use crate::patterns::{ID_MINING_RE, LINK_SEL, QUOTED_URL_RE, detail_pattern};

static ID_CARRIER_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[data-id], [data-video-id], [data-clip-id]").expect("valid selector")
});

const ID_CARRIER_ATTRS: &[&str] = &["data-id", "data-video-id", "data-clip-id"];

pub struct UrlMining;

impl LocatorStrategy for UrlMining {
    fn kind(&self) -> Strategy {
        Strategy::UrlPattern
    }

    fn locate<'a>(&self, page: &'a Page, limit: usize) -> Result<Found<'a>> {
        let raw = unescape(page.raw());
        let (urls, patterns) = mine_urls(page, &raw);
        let ids = mine_ids(&raw);

        if urls.is_empty() {
            if ids.is_empty() {
                return Ok(Found::default());
            }
            let carriers = id_carriers(page);
            let candidates = ids
                .into_iter()
                .take(limit)
                .map(|id| {
                    let element = carriers.get(id.as_str()).copied();
                    Candidate::Id { id, element }
                })
                .collect();
            return Ok(Found::new(candidates).with_detail("mined-ids"));
        }

        let anchors = anchors_by_url(page);
        let mut report = CorrelationReport {
            urls: urls.len(),
            ids: ids.len(),
            ..CorrelationReport::default()
        };

        let candidates = urls
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, url)| {
                let mined_id = correlate(&url, i, &ids);
                match mined_id.as_ref().map(|m| m.confidence) {
                    Some(Confidence::Contained) => report.contained += 1,
                    Some(Confidence::Positional) => report.positional += 1,
                    None => {}
                }
                let anchor = anchors.get(url.as_str()).copied();
                Candidate::Url {
                    url,
                    mined_id,
                    anchor,
                }
            })
            .collect();

        let mut found = Found::new(candidates).with_detail(patterns.join("+"));
        found.correlation = Some(report);
        Ok(found)
    }
}

/// Undo the escaping JSON and HTML apply to URLs in script bodies.
fn unescape(raw: &str) -> String {
    raw.replace("\\/", "/")
        .replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("&amp;", "&")
}

/// Quoted detail-page URLs, resolved and deduplicated in first-seen order,
/// plus the names of the patterns that matched.
fn mine_urls(page: &Page, raw: &str) -> (Vec<String>, Vec<&'static str>) {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut patterns = Vec::new();

    for caps in QUOTED_URL_RE.captures_iter(raw) {
        let candidate = caps[1].trim();
        let Some(pattern) = detail_pattern(candidate) else {
            continue;
        };
        let Some(url) = page.resolve(candidate) else {
            continue;
        };
        if seen.insert(url.clone()) {
            urls.push(url);
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }
    }
    (urls, patterns)
}

/// Numeric IDs next to known keys, deduplicated in first-seen order.
fn mine_ids(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ID_MINING_RE
        .captures_iter(raw)
        .map(|caps| caps[1].to_string())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Pair a URL with a mined ID: an ID the URL contains, else the ID at the
/// same position (or the last one when there are fewer IDs than URLs).
fn correlate(url: &str, index: usize, ids: &[String]) -> Option<MinedId> {
    if let Some(id) = ids.iter().find(|id| url.contains(id.as_str())) {
        return Some(MinedId {
            value: id.clone(),
            confidence: Confidence::Contained,
        });
    }
    let last = ids.len().checked_sub(1)?;
    Some(MinedId {
        value: ids[index.min(last)].clone(),
        confidence: Confidence::Positional,
    })
}

/// First anchor in document order for each resolved href.
fn anchors_by_url(page: &Page) -> HashMap<String, ElementRef<'_>> {
    let mut map = HashMap::new();
    for a in page.doc().select(&LINK_SEL) {
        if let Some(url) = a.value().attr("href").and_then(|h| page.resolve(h)) {
            map.entry(url).or_insert(a);
        }
    }
    map
}

/// First element carrying each ID in a `data-*-id` attribute.
fn id_carriers(page: &Page) -> HashMap<String, ElementRef<'_>> {
    let mut map = HashMap::new();
    for el in page.doc().select(&ID_CARRIER_SEL) {
        for attr in ID_CARRIER_ATTRS {
            if let Some(id) = el.value().attr(attr) {
                map.entry(id.trim().to_string()).or_insert(el);
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(html: &str) -> Page {
        Page::parse(html, &Url::parse("https://artlist.io").unwrap())
    }

    fn urls(found: &Found<'_>) -> Vec<String> {
        found
            .candidates
            .iter()
            .filter_map(|c| match c {
                Candidate::Url { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn mines_detail_links_and_ignores_others() {
        let p = page(
            r#"<a href="/stock-footage/clip/sunset-over-the-ocean/123456">a</a>
               <a href="/stock-footage/clip/city-traffic-at-night/234567">b</a>
               <a href="/artist/jane-doe">c</a>
               <a href="/stock-footage/clip/sunset-over-the-ocean/123456">dup</a>"#,
        );
        let found = UrlMining.locate(&p, 10).unwrap();
        assert_eq!(
            urls(&found),
            vec![
                "https://artlist.io/stock-footage/clip/sunset-over-the-ocean/123456",
                "https://artlist.io/stock-footage/clip/city-traffic-at-night/234567",
            ]
        );
        assert_eq!(found.detail.as_deref(), Some("stock-footage-clip"));
        assert!(found.candidates.iter().all(|c| c.element().is_some()));
    }

    #[test]
    fn escaped_urls_in_scripts() {
        let p = page(r#"<script>var s = {"href":"\/clip\/ocean-waves\/445566"};</script>"#);
        let found = UrlMining.locate(&p, 10).unwrap();
        assert_eq!(urls(&found), vec!["https://artlist.io/clip/ocean-waves/445566"]);
        assert!(found.candidates[0].element().is_none());
    }

    #[test]
    fn containment_beats_position() {
        let p = page(
            r#"<script>{"clipId": 777777}, {"clipId": 445566}</script>
               <a href="/clip/ocean-waves/445566">x</a>"#,
        );
        let found = UrlMining.locate(&p, 10).unwrap();
        match &found.candidates[0] {
            Candidate::Url { mined_id: Some(m), .. } => {
                assert_eq!(m.value, "445566");
                assert_eq!(m.confidence, Confidence::Contained);
            }
            other => panic!("unexpected {other:?}"),
        }
        let report = found.correlation.unwrap();
        assert_eq!((report.urls, report.ids, report.contained), (1, 2, 1));
    }

    #[test]
    fn positional_pairing_uses_closest_index() {
        let ids = vec!["1111".to_string(), "2222".to_string()];
        assert_eq!(correlate("/clip/a", 0, &ids).unwrap().value, "1111");
        let m = correlate("/clip/c", 5, &ids).unwrap();
        assert_eq!(m.value, "2222");
        assert_eq!(m.confidence, Confidence::Positional);
        assert!(correlate("/clip/a", 0, &[]).is_none());
    }

    #[test]
    fn ids_alone_become_candidates() {
        let p = page(
            r#"<div data-video-id="123456"><img alt="Waves"></div>
               <script>{"videoId":"654321"}</script>"#,
        );
        let found = UrlMining.locate(&p, 10).unwrap();
        assert_eq!(found.candidates.len(), 2);
        assert_eq!(found.detail.as_deref(), Some("mined-ids"));
        match &found.candidates[0] {
            Candidate::Id { id, element } => {
                assert_eq!(id, "123456");
                assert!(element.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(found.candidates[1].element().is_none());
        assert!(found.correlation.is_none());
    }

    #[test]
    fn nothing_to_mine() {
        let p = page("<p>No links here, id = 12</p>");
        let found = UrlMining.locate(&p, 10).unwrap();
        assert!(found.candidates.is_empty());
    }
}
