//! Selector cascade: structural card selectors tried in order.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use tracing::debug;

use clipscout_shared::{ClipScoutError, Result, Strategy};

use super::{Found, LocatorStrategy};
use crate::candidate::Candidate;
use crate::page::{Page, select_within};
use crate::patterns::{CONTAINER_SEL, LINK_SEL, SelectorEntry, default_cascade};

static IMG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid selector"));

pub struct SelectorCascade {
    entries: Vec<SelectorEntry>,
}

impl SelectorCascade {
    pub fn new(entries: Vec<SelectorEntry>) -> Self {
        Self { entries }
    }
}

impl Default for SelectorCascade {
    fn default() -> Self {
        Self::new(default_cascade())
    }
}

impl LocatorStrategy for SelectorCascade {
    fn kind(&self) -> Strategy {
        Strategy::SelectorCascade
    }

    fn locate<'a>(&self, page: &'a Page, limit: usize) -> Result<Found<'a>> {
        for entry in &self.entries {
            let matches = match entry {
                SelectorEntry::Css(css) => {
                    let sel = Selector::parse(css).map_err(|e| {
                        ClipScoutError::parse(format!("invalid selector `{css}`: {e}"))
                    })?;
                    let matched: Vec<_> = page.doc().select(&sel).take(limit).collect();
                    matched
                }
                SelectorEntry::LinkAndImage => link_and_image(page, limit),
            };

            if !matches.is_empty() {
                debug!(entry = entry.label(), count = matches.len(), "selector matched");
                let candidates = matches.into_iter().map(Candidate::Node).collect();
                return Ok(Found::new(candidates).with_detail(entry.label()));
            }
        }
        Ok(Found::default())
    }
}

/// Innermost containers holding both a link and an image.
fn link_and_image(page: &Page, limit: usize) -> Vec<ElementRef<'_>> {
    let qualifying: Vec<ElementRef<'_>> = page
        .doc()
        .select(&CONTAINER_SEL)
        .filter(|el| {
            select_within(*el, &LINK_SEL).next().is_some()
                && select_within(*el, &IMG_SEL).next().is_some()
        })
        .collect();
    let ids: HashSet<_> = qualifying.iter().map(|el| el.id()).collect();

    qualifying
        .into_iter()
        .filter(|el| {
            !el.descendants()
                .skip(1)
                .any(|node| ids.contains(&node.id()))
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(html: &str) -> Page {
        Page::parse(html, &Url::parse("https://artlist.io").unwrap())
    }

    #[test]
    fn first_matching_entry_wins() {
        let p = page(
            r#"<div class="clip-item">one</div>
               <div class="clip-item">two</div>
               <article>not used</article>"#,
        );
        let found = SelectorCascade::default().locate(&p, 10).unwrap();
        assert_eq!(found.candidates.len(), 2);
        assert_eq!(found.detail.as_deref(), Some(r#"div[class*="clip"]"#));
    }

    #[test]
    fn testid_cards_take_priority() {
        let p = page(
            r#"<div data-testid="clip-card-1" class="card">a</div>
               <div class="card">b</div>"#,
        );
        let found = SelectorCascade::default().locate(&p, 10).unwrap();
        assert_eq!(found.candidates.len(), 1);
        assert_eq!(found.detail.as_deref(), Some(r#"[data-testid*="clip"]"#));
    }

    #[test]
    fn link_and_image_prefers_innermost() {
        let p = page(
            r#"<section>
                 <div><a href="/x/1">x</a><img src="/1.jpg"></div>
                 <div><a href="/x/2">y</a><img src="/2.jpg"></div>
               </section>"#,
        );
        let found = SelectorCascade::new(vec![SelectorEntry::LinkAndImage])
            .locate(&p, 10)
            .unwrap();
        assert_eq!(found.candidates.len(), 2);
        assert!(
            found
                .candidates
                .iter()
                .all(|c| c.element().unwrap().value().name() == "div")
        );
    }

    #[test]
    fn invalid_entry_errors() {
        let cascade = SelectorCascade::new(vec![SelectorEntry::Css("div[".into())]);
        let err = cascade.locate(&page("<div></div>"), 10).unwrap_err();
        assert!(err.to_string().contains("div["));
    }

    #[test]
    fn no_match_is_empty() {
        let doc = page("<p>plain</p>");
        let found = SelectorCascade::default()
            .locate(&doc, 10)
            .unwrap();
        assert!(found.candidates.is_empty());
        assert!(found.detail.is_none());
    }
}
