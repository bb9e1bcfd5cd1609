//! Lookups over markup elements.

use scraper::{ElementRef, Selector};

use crate::page::{Page, self_and_descendants, select_within, text_of};
use crate::patterns::{
    ANY_DIGITS_RE, BACKGROUND_IMAGE_RE, IMAGE_ATTRS, IMAGE_DATA_ATTRS, LINK_DATA_ATTRS,
    LONG_DIGITS_RE, detail_pattern,
};

/// Resolved `href` of every navigable link, self included, in document order.
pub(crate) fn links<'a>(
    el: ElementRef<'a>,
    page: &'a Page,
) -> impl Iterator<Item = (&'a str, String)> + 'a {
    self_and_descendants(el)
        .filter(|e| e.value().name() == "a")
        .filter_map(|a| a.value().attr("href"))
        .filter_map(move |href| page.resolve(href).map(|url| (href.trim(), url)))
}

pub(crate) fn detail_link(el: ElementRef<'_>, page: &Page) -> Option<String> {
    links(el, page)
        .find(|(href, url)| detail_pattern(href).is_some() || detail_pattern(url).is_some())
        .map(|(_, url)| url)
}

pub(crate) fn first_link(el: ElementRef<'_>, page: &Page) -> Option<String> {
    links(el, page).next().map(|(_, url)| url)
}

pub(crate) fn link_data_attr(el: ElementRef<'_>, page: &Page) -> Option<String> {
    self_and_descendants(el).find_map(|e| {
        LINK_DATA_ATTRS
            .iter()
            .filter_map(|attr| e.value().attr(attr))
            .find_map(|v| page.resolve(v))
    })
}

/// First value of an identifying attribute on the element itself.
pub(crate) fn id_attr(el: ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(String::from)
}

/// A digit run from the element's link, media and data attributes or its
/// text. Runs of four or more digits are preferred.
pub(crate) fn numeric_run(el: ElementRef<'_>) -> Option<String> {
    let mut haystack = String::new();
    for e in self_and_descendants(el) {
        for (name, value) in e.value().attrs() {
            if matches!(name, "href" | "src" | "poster") || name.starts_with("data-") {
                haystack.push_str(value);
                haystack.push(' ');
            }
        }
    }
    haystack.push_str(&text_of(el));
    digit_run(&haystack)
}

pub(crate) fn digit_run(haystack: &str) -> Option<String> {
    LONG_DIGITS_RE
        .find(haystack)
        .or_else(|| ANY_DIGITS_RE.find(haystack))
        .map(|m| m.as_str().to_string())
}

/// First text from `selectors` (tried in order) that passes `accept`.
pub(crate) fn first_text(
    el: ElementRef<'_>,
    selectors: &[Selector],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    selectors
        .iter()
        .flat_map(|sel| select_within(el, sel))
        .map(text_of)
        .find(|t| accept(t))
}

pub(crate) fn image_alt(el: ElementRef<'_>) -> Option<String> {
    images(el)
        .filter_map(|img| img.value().attr("alt"))
        .map(str::trim)
        .find(|alt| !alt.is_empty())
        .map(String::from)
}

/// First `<img>` source attribute or `srcset` head. Inline `data:` URIs
/// never count.
pub(crate) fn img_source(el: ElementRef<'_>, page: &Page) -> Option<String> {
    images(el).find_map(|img| {
        IMAGE_ATTRS
            .iter()
            .filter_map(|attr| img.value().attr(attr))
            .chain(img.value().attr("srcset").and_then(srcset_head))
            .find_map(|v| page.resolve(v))
    })
}

pub(crate) fn video_poster(el: ElementRef<'_>, page: &Page) -> Option<String> {
    self_and_descendants(el)
        .filter(|e| e.value().name() == "video")
        .filter_map(|v| v.value().attr("poster"))
        .find_map(|v| page.resolve(v))
}

/// `background(-image): url(...)` in an inline style.
pub(crate) fn background_image(el: ElementRef<'_>, page: &Page) -> Option<String> {
    self_and_descendants(el)
        .filter_map(|e| e.value().attr("style"))
        .filter_map(|style| BACKGROUND_IMAGE_RE.captures(style))
        .find_map(|caps| page.resolve(&caps[1]))
}

pub(crate) fn image_data_attr(el: ElementRef<'_>, page: &Page) -> Option<String> {
    self_and_descendants(el).find_map(|e| {
        IMAGE_DATA_ATTRS
            .iter()
            .filter_map(|attr| e.value().attr(attr))
            .find_map(|v| page.resolve(v))
    })
}

fn images(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    self_and_descendants(el).filter(|e| e.value().name() == "img")
}

/// URL of the first `srcset` entry.
fn srcset_head(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()
        .and_then(|entry| entry.split_whitespace().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::TITLE_SELS;
    use url::Url;

    fn page(html: &str) -> Page {
        Page::parse(html, &Url::parse("https://artlist.io").unwrap())
    }

    fn root(p: &Page) -> ElementRef<'_> {
        let sel = Selector::parse(".card").unwrap();
        p.doc().select(&sel).next().unwrap()
    }

    #[test]
    fn detail_link_preferred_over_first_link() {
        let p = page(
            r##"<div class="card">
                 <a href="#">skip</a>
                 <a href="/artist/jane">artist</a>
                 <a href="/clip/ocean-waves/4455">clip</a>
               </div>"##,
        );
        let el = root(&p);
        assert_eq!(
            detail_link(el, &p).as_deref(),
            Some("https://artlist.io/clip/ocean-waves/4455")
        );
        assert_eq!(
            first_link(el, &p).as_deref(),
            Some("https://artlist.io/artist/jane")
        );
    }

    #[test]
    fn anchor_itself_counts_as_link() {
        let p = page(r#"<a class="card" href="/video/rain-drops">Rain</a>"#);
        assert_eq!(
            detail_link(root(&p), &p).as_deref(),
            Some("https://artlist.io/video/rain-drops")
        );
    }

    #[test]
    fn link_from_data_attribute() {
        let p = page(r#"<div class="card" data-href="/clip/x-y">x</div>"#);
        assert_eq!(
            link_data_attr(root(&p), &p).as_deref(),
            Some("https://artlist.io/clip/x-y")
        );
    }

    #[test]
    fn image_sources() {
        let p = page(
            r#"<div class="card">
                 <img src="data:image/gif;base64,R0l" data-src="/lazy.jpg">
               </div>"#,
        );
        assert_eq!(
            img_source(root(&p), &p).as_deref(),
            Some("https://artlist.io/lazy.jpg")
        );

        let p = page(r#"<div class="card"><img srcset="/s1.jpg 1x, /s2.jpg 2x"></div>"#);
        assert_eq!(
            img_source(root(&p), &p).as_deref(),
            Some("https://artlist.io/s1.jpg")
        );

        let p = page(r#"<div class="card"><img alt="no source"></div>"#);
        assert_eq!(img_source(root(&p), &p), None);
    }

    #[test]
    fn poster_background_and_data_attrs() {
        let p = page(r#"<div class="card"><video poster="https://cdn/p.jpg"></video></div>"#);
        assert_eq!(video_poster(root(&p), &p).as_deref(), Some("https://cdn/p.jpg"));

        let p = page(r#"<div class="card" style="background-image:url('/bg.png')"></div>"#);
        assert_eq!(
            background_image(root(&p), &p).as_deref(),
            Some("https://artlist.io/bg.png")
        );

        let p = page(r#"<div class="card"><span data-thumb="/t.webp"></span></div>"#);
        assert_eq!(
            image_data_attr(root(&p), &p).as_deref(),
            Some("https://artlist.io/t.webp")
        );
    }

    #[test]
    fn titles_respect_length_window() {
        let p = page(r#"<div class="card"><h3>Hi</h3><span class="name">Golden Hour Beach</span></div>"#);
        let title = first_text(root(&p), &TITLE_SELS, |t| {
            let n = t.chars().count();
            n > 3 && n < 200
        });
        assert_eq!(title.as_deref(), Some("Golden Hour Beach"));
    }

    #[test]
    fn numeric_runs_prefer_long() {
        assert_eq!(digit_run("page 2 of clip 998877").as_deref(), Some("998877"));
        assert_eq!(digit_run("item 42").as_deref(), Some("42"));
        assert_eq!(digit_run("none"), None);

        let p = page(r#"<div class="card"><img src="/thumbs/556677.jpg"></div>"#);
        assert_eq!(numeric_run(root(&p)).as_deref(), Some("556677"));
    }

    #[test]
    fn id_attr_on_element_only() {
        let p = page(r#"<div class="card" data-clip-id="9999"><span data-id="1"></span></div>"#);
        assert_eq!(
            id_attr(root(&p), &["data-id", "data-clip-id"]).as_deref(),
            Some("9999")
        );
    }
}
