//! Extraction orchestrator: locate, resolve, assemble, synthesize.

use chrono::Utc;
use tracing::{info, instrument};

use clipscout_shared::{DiagnosticTrace, ExtractOptions, Strategy, VideoRecord};
use clipscout_thumbnails::{ImageProbe, ThumbnailSynthesizer};

use crate::assembler::{assemble_drafts, finish};
use crate::locator::Locator;
use crate::page::Page;
use crate::resolve::{Draft, FieldResolver};

/// Output of one extraction call.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub records: Vec<VideoRecord>,
    pub trace: DiagnosticTrace,
    /// Strategy whose candidates were used; `None` when nothing was found.
    pub strategy: Option<Strategy>,
}

/// Runs the whole pipeline over raw page content.
pub struct Extractor<P> {
    opts: ExtractOptions,
    locator: Locator,
    synthesizer: ThumbnailSynthesizer<P>,
}

impl<P: ImageProbe> Extractor<P> {
    pub fn new(opts: ExtractOptions, synthesizer: ThumbnailSynthesizer<P>) -> Self {
        let locator = Locator::new(&opts);
        Self::with_locator(opts, locator, synthesizer)
    }

    pub fn with_locator(
        opts: ExtractOptions,
        locator: Locator,
        synthesizer: ThumbnailSynthesizer<P>,
    ) -> Self {
        Self {
            opts,
            locator,
            synthesizer,
        }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.opts
    }

    pub fn synthesizer(&self) -> &ThumbnailSynthesizer<P> {
        &self.synthesizer
    }

    /// Synchronous half: parse, locate and resolve into owned drafts. The
    /// parsed document is dropped before this returns.
    pub fn draft(
        &self,
        raw: &str,
        count: usize,
        trace: &mut DiagnosticTrace,
    ) -> (Vec<Draft>, Option<Strategy>) {
        let page = Page::parse(raw, &self.opts.origin);
        let Some(located) = self.locator.locate(&page, count, trace) else {
            return (Vec::new(), None);
        };
        let resolver = FieldResolver::new(&page, &self.opts, Utc::now().timestamp());
        let drafts = assemble_drafts(&located, &resolver, count, self.opts.dedup, trace);
        (drafts, Some(located.strategy))
    }

    /// Extract at most `count` records. Never fails: an unusable page gives
    /// an empty record list and a trace explaining why.
    #[instrument(skip_all, fields(count = count, bytes = raw.len()))]
    pub async fn extract(&self, raw: &str, count: usize) -> Extraction {
        let mut trace = DiagnosticTrace::new();
        if count == 0 {
            return Extraction {
                records: Vec::new(),
                trace,
                strategy: None,
            };
        }

        let (drafts, strategy) = self.draft(raw, count, &mut trace);
        let records = finish(drafts, &self.opts.source_tag, &self.synthesizer, &mut trace).await;

        info!(
            records = records.len(),
            strategy = strategy.map(Strategy::name).unwrap_or("none"),
            skipped = trace.skipped.len(),
            "extraction finished"
        );
        Extraction {
            records,
            trace,
            strategy,
        }
    }
}
