//! Structured data: clip lists inside embedded JSON payloads.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use clipscout_shared::{Result, Strategy};

use super::{Found, LocatorStrategy};
use crate::candidate::Candidate;
use crate::page::Page;
use crate::patterns::{
    JSON_ID_KEYS, JSON_THUMB_KEYS, JSON_TITLE_KEYS, JSON_URL_KEYS, LIST_KEYS, PAYLOAD_PATTERNS,
    WRAPPER_KEYS, detail_pattern,
};

const MAX_DEPTH: usize = 16;

/// Name of the pattern whose payload is itself the clip array.
const MEDIA_ARRAY: &str = "media-array";

static PAYLOAD_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    PAYLOAD_PATTERNS
        .iter()
        .map(|p| (p.name, Regex::new(p.start).expect("valid regex")))
        .collect()
});

pub struct StructuredData;

impl LocatorStrategy for StructuredData {
    fn kind(&self) -> Strategy {
        Strategy::StructuredData
    }

    fn locate<'a>(&self, page: &'a Page, limit: usize) -> Result<Found<'a>> {
        let raw = page.raw();
        let mut decoded: Vec<Range<usize>> = Vec::new();
        let mut items: Vec<Value> = Vec::new();
        let mut sources: Vec<&'static str> = Vec::new();

        for (name, re) in PAYLOAD_RES.iter() {
            for m in re.find_iter(raw) {
                let start = m.end();
                if decoded.iter().any(|span| span.contains(&start)) {
                    continue;
                }
                let Some((value, len)) = decode_at(raw, start, name) else {
                    continue;
                };
                decoded.push(start..start + len);

                let before = items.len();
                if *name == MEDIA_ARRAY {
                    if let Value::Array(list) = value {
                        items.extend(media_items(list));
                    }
                } else {
                    if is_video_object(&value) {
                        items.push(value.clone());
                    }
                    collect_lists(&value, 0, &mut items);
                }

                let added = items.len() - before;
                if added > 0 {
                    debug!(pattern = name, added, "payload yielded clip objects");
                    if !sources.contains(name) {
                        sources.push(*name);
                    }
                }
            }
        }

        items.truncate(limit);
        let found = Found::new(items.into_iter().map(Candidate::Json).collect());
        Ok(if sources.is_empty() {
            found
        } else {
            found.with_detail(sources.join("+"))
        })
    }
}

/// Decode one JSON value starting at `start`. Returns the value and the
/// number of bytes it spans; whatever follows is ignored.
fn decode_at(raw: &str, start: usize, pattern: &str) -> Option<(Value, usize)> {
    let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();
    match stream.next()? {
        Ok(value) => Some((value, stream.byte_offset())),
        Err(e) => {
            warn!(pattern, error = %e, "payload did not decode");
            None
        }
    }
}

/// Depth-first search for arrays of clip-like objects under list keys.
fn collect_lists(value: &Value, depth: usize, out: &mut Vec<Value>) {
    if depth > MAX_DEPTH {
        return;
    }
    match value {
        Value::Object(map) if json_ld_type(value) == Some("BreadcrumbList") => {
            debug!(entries = map.len(), "skipping breadcrumb list");
        }
        Value::Object(map) => {
            for (key, child) in map {
                if LIST_KEYS.contains(&key.as_str()) {
                    if let Value::Array(list) = child {
                        let media = media_items(list.clone());
                        if !media.is_empty() {
                            out.extend(media);
                            continue;
                        }
                    }
                }
                collect_lists(child, depth + 1, out);
            }
        }
        Value::Array(list) => {
            for child in list {
                collect_lists(child, depth + 1, out);
            }
        }
        _ => {}
    }
}

/// Unwrap list elements and keep the clip-like objects, or nothing when the
/// list holds no clip-like object at all.
fn media_items(list: Vec<Value>) -> Vec<Value> {
    let objects: Vec<Value> = list.into_iter().filter_map(unwrap_wrapper).collect();
    if objects.iter().any(looks_like_media) {
        objects
    } else {
        Vec::new()
    }
}

fn unwrap_wrapper(value: Value) -> Option<Value> {
    let Value::Object(mut map) = value else {
        return None;
    };
    // A JSON-LD list entry only counts when it wraps a video.
    if map.get("@type").and_then(Value::as_str) == Some("ListItem") {
        return map.remove("item").filter(is_video_object);
    }
    for key in WRAPPER_KEYS {
        if matches!(map.get(*key), Some(Value::Object(_))) {
            return map.remove(*key);
        }
    }
    Some(Value::Object(map))
}

/// A clip needs a media signal: a video type, a thumbnail, a detail-page
/// URL, or an ID together with a title. A bare name or link is navigation.
fn looks_like_media(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    is_video_object(value)
        || has_any(map, JSON_THUMB_KEYS)
        || (has_any(map, JSON_ID_KEYS) && has_any(map, JSON_TITLE_KEYS))
        || JSON_URL_KEYS
            .iter()
            .filter_map(|k| map.get(*k).and_then(Value::as_str))
            .any(|url| detail_pattern(url).is_some())
}

fn has_any(map: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|k| map.contains_key(*k))
}

/// A bare JSON-LD `VideoObject` describes a single clip.
fn is_video_object(value: &Value) -> bool {
    json_ld_type(value) == Some("VideoObject")
}

fn json_ld_type(value: &Value) -> Option<&str> {
    value.get("@type").and_then(Value::as_str)
}
