//! Multi-strategy clip extraction.
//!
//! Raw page content goes through four stages:
//!
//! 1. [`Locator`]: ordered strategies find candidate items; the first viable
//!    strategy wins
//! 2. [`FieldResolver`]: per-field fallback chains turn each candidate into
//!    an owned [`Draft`]
//! 3. assembly: empty, malformed and duplicate drafts are dropped and the
//!    list is truncated to the requested count
//! 4. missing thumbnails are synthesized
//!
//! [`Extractor`] sequences the stages and returns the records together with
//! a [`DiagnosticTrace`](clipscout_shared::DiagnosticTrace).

pub mod assembler;
pub mod backfill;
pub mod candidate;
pub mod locator;
pub mod page;
pub mod patterns;
pub mod pipeline;
mod resolve;

pub use backfill::{ThumbnailPolicy, backfill};
pub use candidate::{Candidate, Located, MinedId};
pub use locator::{
    Found, GenericFallback, Locator, LocatorStrategy, SelectorCascade, StructuredData, UrlMining,
};
pub use page::Page;
pub use patterns::PATTERN_VERSION;
pub use pipeline::{Extraction, Extractor};
pub use resolve::{Draft, FieldResolver, detect_language, slug_title};
