//! Generic fallback: any container with media, a link, or enough text.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use clipscout_shared::{Result, Strategy};

use super::{Found, LocatorStrategy};
use crate::candidate::Candidate;
use crate::page::{Page, select_within, text_of};
use crate::patterns::{CONTAINER_SEL, MIN_GENERIC_TEXT};

static MEDIA_OR_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img, video, a[href]").expect("valid selector"));

pub struct GenericFallback;

impl LocatorStrategy for GenericFallback {
    fn kind(&self) -> Strategy {
        Strategy::GenericFallback
    }

    fn locate<'a>(&self, page: &'a Page, limit: usize) -> Result<Found<'a>> {
        let candidates = page
            .doc()
            .select(&CONTAINER_SEL)
            .filter(|el| is_substantive(*el))
            .take(limit)
            .map(Candidate::Node)
            .collect();
        Ok(Found::new(candidates).with_detail("containers"))
    }
}

fn is_substantive(el: ElementRef<'_>) -> bool {
    select_within(el, &MEDIA_OR_LINK_SEL).next().is_some()
        || text_of(el).chars().count() >= MIN_GENERIC_TEXT
}
