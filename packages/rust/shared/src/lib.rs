//! Shared types, error model, and configuration for ClipScout.
//!
//! This crate is the foundation depended on by all other ClipScout crates.
//! It provides:
//! - [`ClipScoutError`], the unified error type
//! - Domain types ([`VideoRecord`], [`Language`], [`Strategy`])
//! - The per-call [`DiagnosticTrace`]
//! - Configuration ([`AppConfig`], runtime option structs, config loading)

pub mod config;
pub mod error;
pub mod trace;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_ORIGIN, ExtractOptions, ExtractionConfig, FetchConfig, FetchOptions,
    MAX_RECORD_COUNT, ThumbnailConfig, ThumbnailOptions, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_count,
};
pub use error::{ClipScoutError, Result};
pub use trace::{
    Confidence, CorrelationReport, DiagnosticTrace, Field, FieldTrace, SkipReason,
    SkippedCandidate, StrategyAttempt, ThumbnailSource, ThumbnailTrace,
};
pub use types::{Language, RECORD_FIELDS, Strategy, VideoRecord};
