//! Lookups over decoded JSON candidates.

use serde_json::{Map, Value};

use crate::patterns::{
    JSON_DESCRIPTION_KEYS, JSON_ID_KEYS, JSON_IMAGE_URL_KEYS, JSON_THUMB_KEYS, JSON_TITLE_KEYS,
    JSON_URL_KEYS,
};

/// Nested image objects are followed at most this deep.
const MAX_IMAGE_DEPTH: usize = 4;

/// Whether an object carries at least one key any resolver understands.
pub(crate) fn is_recognizable(map: &Map<String, Value>) -> bool {
    [
        JSON_ID_KEYS,
        JSON_TITLE_KEYS,
        JSON_DESCRIPTION_KEYS,
        JSON_URL_KEYS,
        JSON_THUMB_KEYS,
    ]
    .iter()
    .any(|keys| keys.iter().any(|k| map.contains_key(*k)))
}

/// First non-empty string value under `keys`.
pub(crate) fn string_at(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// First identifier under the ID keys; numbers are accepted as well as strings.
pub(crate) fn id_at(map: &Map<String, Value>) -> Option<String> {
    JSON_ID_KEYS.iter().filter_map(|k| map.get(*k)).find_map(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First image reference under the thumbnail keys. Values may be strings,
/// objects with a URL-ish key, or arrays of either.
pub(crate) fn image_at(map: &Map<String, Value>) -> Option<String> {
    JSON_THUMB_KEYS
        .iter()
        .filter_map(|k| map.get(*k))
        .find_map(|v| image_value(v, 0))
}

fn image_value(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_IMAGE_DEPTH {
        return None;
    }
    match value {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(String::from),
        Value::Object(obj) => JSON_IMAGE_URL_KEYS
            .iter()
            .filter_map(|k| obj.get(*k))
            .find_map(|v| image_value(v, depth + 1)),
        Value::Array(list) => list.iter().find_map(|v| image_value(v, depth + 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn ids_from_numbers_and_strings() {
        assert_eq!(id_at(&obj(json!({"id": 123456}))).as_deref(), Some("123456"));
        assert_eq!(id_at(&obj(json!({"clipId": " 77 "}))).as_deref(), Some("77"));
        assert_eq!(id_at(&obj(json!({"id": "", "videoId": 5}))).as_deref(), Some("5"));
        assert_eq!(id_at(&obj(json!({"id": null}))), None);
    }

    #[test]
    fn first_non_empty_string_wins() {
        let map = obj(json!({"title": "  ", "name": "Ocean"}));
        assert_eq!(string_at(&map, JSON_TITLE_KEYS).as_deref(), Some("Ocean"));
    }

    #[test]
    fn images_in_every_shape() {
        assert_eq!(
            image_at(&obj(json!({"thumbnail": "/t.jpg"}))).as_deref(),
            Some("/t.jpg")
        );
        assert_eq!(
            image_at(&obj(json!({"image": {"url": "https://cdn/x.jpg"}}))).as_deref(),
            Some("https://cdn/x.jpg")
        );
        assert_eq!(
            image_at(&obj(json!({"poster": [{"src": "a.jpg"}, "b.jpg"]}))).as_deref(),
            Some("a.jpg")
        );
        assert_eq!(image_at(&obj(json!({"cover": 3}))), None);
    }

    #[test]
    fn recognizable_objects() {
        assert!(is_recognizable(&obj(json!({"summary": "x"}))));
        assert!(!is_recognizable(&obj(json!({"color": "red"}))));
    }
}
