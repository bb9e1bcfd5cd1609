//! Title keyword extraction and topical classification.

/// Keyword used when a title has nothing left after stop-word removal.
pub const DEFAULT_KEYWORD: &str = "cinematic";

/// Words that carry no topical signal in clip titles.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "at", "in", "on", "over", "under", "and", "or", "with", "for", "to",
    "by", "from", "into", "is", "are", "this", "that", "its", "video", "clip", "footage", "stock",
    "shot", "hd", "4k", "slow", "motion",
];

/// Topical category of a clip, used to steer provider queries and placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Nature,
    City,
    People,
    Technology,
    Food,
    Animals,
    Sports,
    Abstract,
}

impl Category {
    /// Classification order; the first category with a matching keyword wins.
    pub const ORDER: [Category; 7] = [
        Category::Nature,
        Category::City,
        Category::People,
        Category::Technology,
        Category::Food,
        Category::Animals,
        Category::Sports,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Nature => "nature",
            Self::City => "city",
            Self::People => "people",
            Self::Technology => "technology",
            Self::Food => "food",
            Self::Animals => "animals",
            Self::Sports => "sports",
            Self::Abstract => "abstract",
        }
    }

    /// Extra query term appended to provider searches.
    pub fn hint(self) -> &'static str {
        match self {
            Self::Nature => "landscape",
            Self::City => "cityscape",
            Self::People => "lifestyle",
            Self::Technology => "digital",
            Self::Food => "cooking",
            Self::Animals => "wildlife",
            Self::Sports => "action",
            Self::Abstract => "texture",
        }
    }

    /// Placeholder background colour (hex, no `#`).
    pub fn color(self) -> &'static str {
        match self {
            Self::Nature => "2e7d32",
            Self::City => "37474f",
            Self::People => "ad1457",
            Self::Technology => "1565c0",
            Self::Food => "ef6c00",
            Self::Animals => "6d4c41",
            Self::Sports => "c62828",
            Self::Abstract => "4527a0",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Nature => &[
                "nature", "desert", "dune", "dunes", "forest", "ocean", "sea", "beach", "wave",
                "waves", "mountain", "mountains", "sunset", "sunrise", "river", "lake", "tree",
                "trees", "flower", "flowers", "sky", "clouds", "waterfall", "snow", "landscape",
                "field", "rain", "aerial",
            ],
            Self::City => &[
                "city", "urban", "traffic", "street", "streets", "building", "buildings",
                "skyline", "downtown", "night", "highway", "bridge", "subway", "architecture",
            ],
            Self::People => &[
                "people", "person", "man", "woman", "men", "women", "family", "crowd", "friends",
                "couple", "business", "portrait", "child", "children", "dancing",
            ],
            Self::Technology => &[
                "technology", "tech", "computer", "laptop", "digital", "code", "coding", "data",
                "phone", "smartphone", "robot", "screen", "network", "server",
            ],
            Self::Food => &[
                "food", "cooking", "kitchen", "coffee", "restaurant", "meal", "fruit", "baking",
                "dinner", "breakfast", "wine",
            ],
            Self::Animals => &[
                "animal", "animals", "dog", "dogs", "cat", "cats", "bird", "birds", "horse",
                "fish", "wildlife", "lion", "elephant",
            ],
            Self::Sports => &[
                "sport", "sports", "football", "soccer", "basketball", "running", "runner",
                "fitness", "gym", "surfing", "skateboard", "cycling", "yoga",
            ],
            Self::Abstract => &[],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercased word tokens with punctuation stripped.
fn tokens(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Up to `max` distinct topical keywords from a title, in title order.
///
/// Never returns an empty list: falls back to [`DEFAULT_KEYWORD`].
pub fn extract_keywords(title: &str, max: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokens(title) {
        if out.len() >= max {
            break;
        }
        if token.chars().count() < 2
            || token.chars().all(|c| c.is_ascii_digit())
            || STOP_WORDS.contains(&token.as_str())
            || out.contains(&token)
        {
            continue;
        }
        out.push(token);
    }

    if out.is_empty() {
        out.push(DEFAULT_KEYWORD.to_string());
    }
    out
}

/// Classify a title into the first category whose keyword set it touches.
pub fn classify(title: &str) -> Category {
    let words: Vec<String> = tokens(title).collect();
    Category::ORDER
        .into_iter()
        .find(|cat| words.iter().any(|w| cat.keywords().contains(&w.as_str())))
        .unwrap_or(Category::Abstract)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_skip_stop_words_and_punctuation() {
        let kw = extract_keywords("Sunset over the Ocean!", 3);
        assert_eq!(kw, vec!["sunset", "ocean"]);
    }

    #[test]
    fn keywords_are_capped_and_distinct() {
        let kw = extract_keywords("Rain, rain, city lights and neon signs at night", 3);
        assert_eq!(kw, vec!["rain", "city", "lights"]);
    }

    #[test]
    fn keywords_default_when_empty() {
        assert_eq!(extract_keywords("", 3), vec![DEFAULT_KEYWORD]);
        assert_eq!(extract_keywords("The 4K clip", 3), vec![DEFAULT_KEYWORD]);
    }

    #[test]
    fn classify_first_match_wins() {
        assert_eq!(classify("Desert Dunes"), Category::Nature);
        assert_eq!(classify("City Traffic At Night"), Category::City);
        // Nature is checked before animals.
        assert_eq!(classify("Dog running on the beach"), Category::Nature);
        assert_eq!(classify("Barista pours coffee"), Category::Food);
    }

    #[test]
    fn classify_defaults_to_abstract() {
        assert_eq!(classify("Swirling ink particles"), Category::Abstract);
        assert_eq!(classify(""), Category::Abstract);
    }
}
