//! End-to-end orchestration for ClipScout.
//!
//! This crate ties together page loading, extraction and the thumbnail
//! back-fill pass into one workflow ([`harvest`]).

pub mod pipeline;

pub use pipeline::{
    HarvestConfig, HarvestResult, HarvestStats, PageInput, ProgressReporter, SilentProgress,
    harvest,
};
