//! End-to-end `harvest` pipeline: page → extract → thumbnail back-fill.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};
use url::Url;

use clipscout_extract::{Extractor, ThumbnailPolicy, backfill};
use clipscout_fetch::PageSource;
use clipscout_shared::{
    ClipScoutError, DiagnosticTrace, Result, Strategy, ThumbnailSource, VideoRecord,
    validate_count,
};
use clipscout_thumbnails::ImageProbe;

/// Where the page content comes from.
#[derive(Debug, Clone)]
pub enum PageInput {
    /// Fetch over HTTP.
    Url(Url),
    /// A saved page or rendered DOM snapshot on disk.
    File(PathBuf),
}

impl std::fmt::Display for PageInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Configuration for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub input: PageInput,
    /// Requested record count, 1 to `MAX_RECORD_COUNT`.
    pub count: usize,
    /// Thumbnail post-pass applied after extraction.
    pub policy: ThumbnailPolicy,
}

/// Headline numbers for a harvest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestStats {
    pub total: usize,
    pub with_title: usize,
    /// Records whose thumbnail was found on the page rather than synthesized.
    pub with_discovered_thumbnail: usize,
}

impl HarvestStats {
    fn from_extraction(records: &[VideoRecord], trace: &DiagnosticTrace) -> Self {
        Self {
            total: records.len(),
            with_title: records.iter().filter(|r| !r.title.is_empty()).count(),
            with_discovered_thumbnail: trace
                .thumbnails
                .iter()
                .filter(|t| t.source == ThumbnailSource::Discovered)
                .count(),
        }
    }
}

/// Result of a harvest run.
#[derive(Debug)]
pub struct HarvestResult {
    pub records: Vec<VideoRecord>,
    pub trace: DiagnosticTrace,
    pub strategy: Option<Strategy>,
    /// Measured before the back-fill pass.
    pub stats: HarvestStats,
    pub bytes: usize,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &HarvestResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &HarvestResult) {}
}

/// Run the full harvest.
///
/// 1. Load the page (HTTP fetch or local file)
/// 2. Extract records
/// 3. Apply the thumbnail back-fill policy
///
/// Only a failure to load the page is an error. A page with nothing
/// extractable gives an empty record list.
#[instrument(skip_all, fields(input = %config.input, count = config.count))]
pub async fn harvest<S: PageSource, P: ImageProbe>(
    config: &HarvestConfig,
    source: &S,
    extractor: &Extractor<P>,
    progress: &dyn ProgressReporter,
) -> Result<HarvestResult> {
    let start = Instant::now();
    let count = validate_count(config.count)?;

    // --- Phase 1: Load ---
    let raw = match &config.input {
        PageInput::Url(url) => {
            progress.phase("Fetching page");
            source.fetch(url).await?
        }
        PageInput::File(path) => {
            progress.phase("Reading page snapshot");
            std::fs::read_to_string(path).map_err(|e| ClipScoutError::io(path, e))?
        }
    };
    info!(bytes = raw.len(), "page loaded");

    // --- Phase 2: Extract ---
    progress.phase("Extracting clips");
    let extraction = extractor.extract(&raw, count).await;
    let stats = HarvestStats::from_extraction(&extraction.records, &extraction.trace);
    let mut trace = extraction.trace;

    // --- Phase 3: Back-fill ---
    let records = if config.policy == ThumbnailPolicy::Keep || extraction.records.is_empty() {
        extraction.records
    } else {
        progress.phase("Back-filling thumbnails");
        backfill(
            &extraction.records,
            config.policy,
            extractor.synthesizer(),
            &mut trace,
        )
        .await
    };

    let result = HarvestResult {
        records,
        trace,
        strategy: extraction.strategy,
        stats,
        bytes: raw.len(),
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        records = result.records.len(),
        strategy = result.strategy.map(Strategy::name).unwrap_or("none"),
        elapsed_ms = result.elapsed.as_millis(),
        "harvest complete"
    );

    Ok(result)
}
