//! Parsed page: raw content, DOM, and canonical origin.

use scraper::{ElementRef, Html};
use url::Url;

/// One page being extracted. Owns the DOM that node candidates borrow from.
pub struct Page {
    raw: String,
    doc: Html,
    origin: Url,
}

impl Page {
    pub fn parse(raw: &str, origin: &Url) -> Self {
        Self {
            raw: raw.to_string(),
            doc: Html::parse_document(raw),
            origin: origin.clone(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn doc(&self) -> &Html {
        &self.doc
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Resolve a link target against the canonical origin.
    ///
    /// Absolute `http(s)` URLs pass through unchanged; relative and
    /// protocol-relative ones are joined. Fragments, `javascript:`,
    /// `mailto:`, `tel:` and `data:` targets are not navigable.
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || !is_navigable(href) {
            return None;
        }
        if href.starts_with("http://") || href.starts_with("https://") {
            return Some(href.to_string());
        }
        self.origin
            .join(href)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .map(String::from)
    }
}

fn is_navigable(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    !(lower.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:"))
}

/// The element and all of its descendant elements, in document order.
pub(crate) fn self_and_descendants<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.descendants().filter_map(ElementRef::wrap)
}

/// Descendant elements matching `sel`, excluding the element itself.
pub(crate) fn select_within<'a, 'b>(
    el: ElementRef<'a>,
    sel: &'b scraper::Selector,
) -> impl Iterator<Item = ElementRef<'a>> + use<'a, 'b> {
    let own = el.id();
    el.select(sel).filter(move |m| m.id() != own)
}

/// Whitespace-normalized text content of an element.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
