//! Strategy-specific candidates handed from the locator to the resolvers.

use scraper::ElementRef;
use serde_json::Value;

use clipscout_shared::{Confidence, Strategy};

/// A numeric ID mined from raw content and paired with a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedId {
    pub value: String,
    pub confidence: Confidence,
}

/// A raw unit that may yield one record after field resolution.
#[derive(Debug, Clone)]
pub enum Candidate<'a> {
    /// A markup element matched by a selector.
    Node(ElementRef<'a>),
    /// An object decoded from an embedded JSON payload.
    Json(Value),
    /// A detail-page URL mined from raw content.
    Url {
        url: String,
        mined_id: Option<MinedId>,
        /// First anchor in the document pointing at `url`.
        anchor: Option<ElementRef<'a>>,
    },
    /// A numeric ID mined from raw content with no URL available.
    Id {
        id: String,
        /// Element carrying the ID in a `data-*-id` attribute.
        element: Option<ElementRef<'a>>,
    },
}

impl<'a> Candidate<'a> {
    /// The markup element backing this candidate, if any.
    pub fn element(&self) -> Option<ElementRef<'a>> {
        match self {
            Self::Node(el) => Some(*el),
            Self::Url { anchor, .. } => *anchor,
            Self::Id { element, .. } => *element,
            Self::Json(_) => None,
        }
    }
}

/// The winning strategy's candidates, in document order.
#[derive(Debug, Clone)]
pub struct Located<'a> {
    pub strategy: Strategy,
    pub candidates: Vec<Candidate<'a>>,
}

impl Located<'_> {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
