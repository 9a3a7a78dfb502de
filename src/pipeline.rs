//! The analysis flow: extract, normalize, validate, consult the cache, score,
//! aggregate, render. Only one analysis runs per [`Analyzer`] at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{aggregate, Aggregate};
use crate::cache::ResultCache;
use crate::client::ScoreSource;
use crate::config::Config;
use crate::error::{EcoError, Result};
use crate::normalize::{normalize, validate};
use crate::page::Tab;
use crate::product::ProductRecord;
use crate::render::{render_with_theme, DisplayModel, Theme};
use crate::score::ScoreReport;

/// How often a pending relay call checks for cancellation
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Shared flag telling an in-flight analysis that its host went away
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Result of one analysis, ready to paint
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub page_url: String,
    /// Absent when the result came straight from the cache at open time
    pub record: Option<ProductRecord>,
    pub report: ScoreReport,
    pub aggregate: Aggregate,
    pub display: DisplayModel,
    /// When the reused result was stored; `None` for a fresh analysis
    pub cached_at: Option<DateTime<Utc>>,
}

impl Analysis {
    pub fn from_cache(&self) -> bool {
        self.cached_at.is_some()
    }
}

/// Clears the in-flight flag when an analysis ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| InFlight(flag))
            .map_err(|_| EcoError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Analyzer {
    source: Arc<dyn ScoreSource + Send + Sync>,
    cache: ResultCache,
    config: Config,
    theme: Theme,
    in_flight: AtomicBool,
    cancel: CancelToken,
}

impl Analyzer {
    pub fn new(source: Arc<dyn ScoreSource + Send + Sync>, cache: ResultCache, config: &Config) -> Self {
        Self {
            source,
            cache,
            config: config.clone(),
            theme: config.theme,
            in_flight: AtomicBool::new(false),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Token the host triggers when it is torn down
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn check_supported(&self, page_url: &str) -> Result<()> {
        if self.config.is_supported(page_url) {
            Ok(())
        } else {
            Err(EcoError::UnsupportedPage(page_url.to_string()))
        }
    }

    /// What the dashboard shows on open: a cached result for exactly this page, if any.
    ///
    /// Cache failures are logged and treated as a miss.
    pub fn open(&self, page_url: &str) -> Option<Analysis> {
        let entry = match self.cache.get_entry(page_url) {
            Ok(entry) => entry?,
            Err(e) => {
                tracing::warn!(error = %e, "cache read failed");
                return None;
            }
        };
        let aggregate = aggregate(&entry.report).ok()?;
        tracing::info!(page_url, "showing cached result");
        Some(self.finish(page_url, None, entry.report, aggregate, Some(entry.stored_at)))
    }

    /// Run the full pipeline for the page open in `tab`.
    ///
    /// With `force`, a cached result for the page is ignored and replaced.
    pub fn analyze(&self, tab: &dyn Tab, force: bool) -> Result<Analysis> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        self.cancel.reset();

        let page_url = tab.url()?;
        self.check_supported(&page_url)?;

        let raw = tab.run_extraction()?;
        let record = normalize(raw);
        tracing::debug!(?record, "normalized product record");
        validate(&record)?;
        self.bail_if_cancelled()?;

        if !force {
            if let Some(cached) = self.open(&page_url) {
                return Ok(Analysis { record: Some(record), ..cached });
            }
        }

        let report = self.request_scores(record.clone())?;
        let aggregate = aggregate(&report)?;
        self.bail_if_cancelled()?;

        if let Err(e) = self.cache.put(&page_url, &report) {
            tracing::warn!(error = %e, "cache write failed");
        }
        tracing::info!(page_url = %page_url, overall = aggregate.overall, tier = %aggregate.tier, "analysis complete");
        Ok(self.finish(&page_url, Some(record), report, aggregate, None))
    }

    /// Hand the record to the score source on a worker thread so a cancel can
    /// abandon the call. Once cancelled, whatever the call yields, success or
    /// failure, is dropped unseen.
    fn request_scores(&self, record: ProductRecord) -> Result<ScoreReport> {
        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        thread::spawn(move || {
            let _ = tx.send(source.request_scores(&record));
        });

        loop {
            match rx.recv_timeout(CANCEL_POLL) {
                Ok(result) => {
                    self.bail_if_cancelled()?;
                    return result;
                }
                Err(RecvTimeoutError::Timeout) => self.bail_if_cancelled()?,
                Err(RecvTimeoutError::Disconnected) => {
                    self.bail_if_cancelled()?;
                    return Err(EcoError::Network("score request ended without a response".into()));
                }
            }
        }
    }

    fn bail_if_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            tracing::info!("analysis cancelled, discarding result");
            return Err(EcoError::Cancelled);
        }
        Ok(())
    }

    fn finish(
        &self,
        page_url: &str,
        record: Option<ProductRecord>,
        report: ScoreReport,
        aggregate: Aggregate,
        cached_at: Option<DateTime<Utc>>,
    ) -> Analysis {
        let display = render_with_theme(&report, aggregate.overall, aggregate.tier, self.theme);
        Analysis {
            page_url: page_url.to_string(),
            record,
            report,
            aggregate,
            display,
            cached_at,
        }
    }
}
