//! Candidate locator: strategy trait and the priority-ordered registry.
//!
//! Strategies are tried in priority order. The first one whose result set
//! reaches the viability threshold wins and is used alone; results are never
//! merged across strategies.

mod generic;
mod selectors;
mod structured;
mod url_mining;

use tracing::{debug, info, warn};

use clipscout_shared::{
    CorrelationReport, DiagnosticTrace, ExtractOptions, Result, Strategy, StrategyAttempt,
};

use crate::candidate::{Candidate, Located};
use crate::page::Page;

pub use generic::GenericFallback;
pub use selectors::SelectorCascade;
pub use structured::StructuredData;
pub use url_mining::UrlMining;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// What a strategy found on a page.
#[derive(Debug, Default)]
pub struct Found<'a> {
    pub candidates: Vec<Candidate<'a>>,
    /// Pattern or selector entry responsible, for the trace.
    pub detail: Option<String>,
    pub correlation: Option<CorrelationReport>,
}

impl<'a> Found<'a> {
    pub fn new(candidates: Vec<Candidate<'a>>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// One heuristic for finding clip candidates in a page.
///
/// Returning `Err` is a strategy failure: it is recorded and the next
/// strategy runs.
pub trait LocatorStrategy: Send + Sync {
    fn kind(&self) -> Strategy;

    /// Find at most `limit` candidates.
    fn locate<'a>(&self, page: &'a Page, limit: usize) -> Result<Found<'a>>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds strategies in priority order.
pub struct Locator {
    strategies: Vec<Box<dyn LocatorStrategy>>,
    min_candidates: usize,
    headroom: usize,
    generic_overfetch: usize,
}

impl Locator {
    /// Built-in strategies: structured data, URL mining, selector cascade,
    /// generic fallback.
    pub fn new(opts: &ExtractOptions) -> Self {
        Self::with_strategies(
            vec![
                Box::new(StructuredData),
                Box::new(UrlMining),
                Box::new(SelectorCascade::default()),
                Box::new(GenericFallback),
            ],
            opts,
        )
    }

    pub fn with_strategies(strategies: Vec<Box<dyn LocatorStrategy>>, opts: &ExtractOptions) -> Self {
        Self {
            strategies,
            min_candidates: opts.min_candidates.max(1),
            headroom: opts.headroom.max(1),
            generic_overfetch: opts.generic_overfetch.max(1),
        }
    }

    /// Run strategies until one is viable. `None` means every strategy came
    /// up short; the trace then lists each attempt.
    pub fn locate<'a>(
        &self,
        page: &'a Page,
        max_candidates: usize,
        trace: &mut DiagnosticTrace,
    ) -> Option<Located<'a>> {
        for strategy in &self.strategies {
            let kind = strategy.kind();
            let factor = match kind {
                Strategy::GenericFallback => self.generic_overfetch,
                _ => self.headroom,
            };
            let limit = max_candidates.saturating_mul(factor);

            match strategy.locate(page, limit) {
                Ok(found) => {
                    let count = found.candidates.len();
                    debug!(strategy = %kind, count, detail = ?found.detail, "strategy finished");
                    if found.correlation.is_some() {
                        trace.correlation = found.correlation.clone();
                    }
                    trace.attempt(StrategyAttempt {
                        strategy: kind,
                        candidates: count,
                        detail: found.detail,
                        error: None,
                    });

                    if count >= self.min_candidates {
                        info!(strategy = %kind, candidates = count, "strategy selected");
                        trace.selected = Some(kind);
                        return Some(Located {
                            strategy: kind,
                            candidates: found.candidates,
                        });
                    }
                }
                Err(e) => {
                    warn!(strategy = %kind, error = %e, "strategy failed, trying next");
                    trace.attempt(StrategyAttempt {
                        strategy: kind,
                        candidates: 0,
                        detail: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!("no strategy produced candidates");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::SelectorEntry;
    use clipscout_shared::ClipScoutError;
    use url::Url;

    fn page(html: &str) -> Page {
        Page::parse(html, &Url::parse("https://artlist.io").unwrap())
    }

    struct Failing;

    impl LocatorStrategy for Failing {
        fn kind(&self) -> Strategy {
            Strategy::StructuredData
        }

        fn locate<'a>(&self, _page: &'a Page, _limit: usize) -> Result<Found<'a>> {
            Err(ClipScoutError::parse("payload exploded"))
        }
    }

    #[test]
    fn failing_strategy_falls_through() {
        let p = page(r#"<div class="clip-item"><img alt="Desert Dunes"></div>"#);
        let locator = Locator::with_strategies(
            vec![Box::new(Failing), Box::new(SelectorCascade::default())],
            &ExtractOptions::default(),
        );
        let mut trace = DiagnosticTrace::new();
        let located = locator.locate(&p, 5, &mut trace).unwrap();

        assert_eq!(located.strategy, Strategy::SelectorCascade);
        assert_eq!(trace.attempts.len(), 2);
        assert!(trace.attempts[0].error.as_deref().unwrap().contains("exploded"));
    }

    #[test]
    fn invalid_selector_entry_is_a_strategy_failure() {
        let p = page(r#"<div><a href="/x">link</a><img src="/a.jpg"></div>"#);
        let cascade = SelectorCascade::new(vec![SelectorEntry::Css("[[[".into())]);
        let locator = Locator::with_strategies(
            vec![Box::new(cascade), Box::new(GenericFallback)],
            &ExtractOptions::default(),
        );
        let mut trace = DiagnosticTrace::new();
        let located = locator.locate(&p, 5, &mut trace).unwrap();

        assert_eq!(located.strategy, Strategy::GenericFallback);
        assert!(trace.attempts[0].error.is_some());
    }

    #[test]
    fn min_candidates_threshold_skips_thin_strategies() {
        let p = page(
            r#"<article class="card"><a href="/collections/a">A</a></article>
               <div><img src="/1.jpg"><a href="/x">x</a></div>
               <div><img src="/2.jpg"><a href="/y">y</a></div>"#,
        );
        let opts = ExtractOptions {
            min_candidates: 3,
            ..ExtractOptions::default()
        };
        let locator = Locator::with_strategies(
            vec![
                Box::new(SelectorCascade::new(vec![SelectorEntry::Css("article".into())])),
                Box::new(GenericFallback),
            ],
            &opts,
        );
        let mut trace = DiagnosticTrace::new();
        let located = locator.locate(&p, 5, &mut trace).unwrap();

        assert_eq!(trace.attempts[0].candidates, 1);
        assert_eq!(located.strategy, Strategy::GenericFallback);
    }

    #[test]
    fn nothing_found_attempts_every_strategy() {
        let p = page("<html><body><p>Hi</p></body></html>");
        let locator = Locator::new(&ExtractOptions::default());
        let mut trace = DiagnosticTrace::new();

        assert!(locator.locate(&p, 5, &mut trace).is_none());
        assert_eq!(trace.attempted().collect::<Vec<_>>(), Strategy::ALL.to_vec());
        assert!(trace.attempts.iter().all(|a| a.candidates == 0));
        assert!(trace.selected.is_none());
    }
}
