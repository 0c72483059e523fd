//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Picking the next URL from the frontier
//! - Gating revisits and fetching with retries
//! - Change detection and store updates
//! - Link discovery
//! - Cooperative shutdown

use crate::config::Config;
use crate::crawler::change::{changed, fingerprint};
use crate::crawler::fetcher::{HttpClient, ReqwestClient};
use crate::crawler::frontier::{Frontier, FrontierEntry, RevisitPolicy};
use crate::crawler::parser::{extract_title, parse_html, ParsedPage};
use crate::crawler::retry::{FetchOutcome, FetchRetrier, FetchedPage};
use crate::state::{CrawlState, FetchStatus, StopReason};
use crate::storage::{
    open_storage, CrawlRecord, SqliteStorage, Storage, StorageResult, UNTITLED,
};
use crate::url::{canonicalize, ScopeFilter};
use crate::CrawlError;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Shortest pause after an iteration that ended in an error
const MIN_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// What happened to one URL taken from the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// First successful fetch of a URL; its content was stored
    New,
    /// Re-fetched and the content differs; the record was replaced
    Changed,
    /// Re-fetched with identical content; only the times moved
    Unchanged,
    /// Stored recently enough that no fetch was made
    Skipped,
    /// Rejected by the scope filter
    OutOfScope,
    /// The response was not HTML
    NotHtml,
    /// Every fetch attempt failed
    Failed,
}

/// Counters for one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub processed: u64,
    pub new: u64,
    pub changed: u64,
    pub unchanged: u64,
    pub skipped: u64,
    pub out_of_scope: u64,
    pub failed: u64,
    pub not_html: u64,
    /// Links added to the pending queue
    pub enqueued: u64,
    /// Iterations aborted by an unexpected error
    pub errors: u64,
}

impl RunStats {
    fn record(&mut self, outcome: VisitOutcome) {
        self.processed += 1;
        match outcome {
            VisitOutcome::New => self.new += 1,
            VisitOutcome::Changed => self.changed += 1,
            VisitOutcome::Unchanged => self.unchanged += 1,
            VisitOutcome::Skipped => self.skipped += 1,
            VisitOutcome::OutOfScope => self.out_of_scope += 1,
            VisitOutcome::NotHtml => self.not_html += 1,
            VisitOutcome::Failed => self.failed += 1,
        }
    }
}

/// Result of a finished crawl run
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub stats: RunStats,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator<S, C> {
    storage: S,
    frontier: Frontier,
    retrier: FetchRetrier<C>,
    scope: ScopeFilter,
    policy: RevisitPolicy,
    delay: Duration,
    max_pages: u64,
    cancel: CancellationToken,
    state: CrawlState,
    stats: RunStats,
}

impl Coordinator<SqliteStorage, ReqwestClient> {
    /// Opens the configured store and builds the HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - The store could not be opened or the client built
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self, CrawlError> {
        let storage = open_storage(&config.db.path)?;
        let client = ReqwestClient::from_config(&config.logic)?;
        Ok(Self::new(config, storage, client, cancel))
    }
}

impl<S: Storage, C: HttpClient> Coordinator<S, C> {
    /// Creates a coordinator over an existing store and HTTP client
    ///
    /// The pending queue starts with the canonicalized seeds.
    pub fn new(config: &Config, storage: S, client: C, cancel: CancellationToken) -> Self {
        Self {
            storage,
            frontier: Frontier::with_seeds(&config.seeds),
            retrier: FetchRetrier::new(client, config.logic.max_retries),
            scope: ScopeFilter::from_config(&config.restrictions),
            policy: RevisitPolicy::from_config(&config.logic),
            delay: config.logic.delay(),
            max_pages: config.logic.max_pages,
            cancel,
            state: CrawlState::Running,
            stats: RunStats::default(),
        }
    }

    /// Replaces the base unit of the retry backoff (one second by default)
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.retrier = self.retrier.with_backoff_unit(unit);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the crawl loop until the frontier is empty, the page cap is hit,
    /// or the cancellation token fires
    pub async fn run(&mut self) -> Result<RunReport, CrawlError> {
        tracing::info!(
            "Starting crawl: {} seed URL(s) pending, page cap {}",
            self.frontier.pending().len(),
            self.max_pages
        );

        let start_time = Instant::now();

        while self.state.is_running() {
            if self.cancel.is_cancelled() {
                self.state.request_stop(StopReason::Cancelled);
                break;
            }

            match self.step().await {
                Ok(Some(outcome)) => {
                    self.stats.record(outcome);
                    tracing::debug!(
                        "Processed {}/{} ({:?})",
                        self.stats.processed,
                        self.max_pages,
                        outcome
                    );
                }
                Ok(None) => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
                Err(e) => {
                    self.stats.errors += 1;
                    tracing::error!("Crawl iteration failed: {}", e);
                    tokio::time::sleep((self.delay * 2).max(MIN_ERROR_PAUSE)).await;
                    continue;
                }
            }

            if self.stats.processed >= self.max_pages {
                tracing::info!("Page cap of {} reached", self.max_pages);
                self.state.request_stop(StopReason::PageCap);
            } else if self.cancel.is_cancelled() {
                self.state.request_stop(StopReason::Cancelled);
            }

            if self.state.is_running() && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        let stop_reason = self.state.finish(StopReason::FrontierExhausted);
        let elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl stopped ({}): {} URLs processed in {:?}",
            stop_reason,
            self.stats.processed,
            elapsed
        );

        Ok(RunReport {
            stats: self.stats,
            stop_reason,
            elapsed,
        })
    }

    /// Runs one iteration at the current time
    ///
    /// Returns `Ok(None)` when the frontier has nothing left.
    pub async fn step(&mut self) -> Result<Option<VisitOutcome>, CrawlError> {
        self.step_at(now_epoch()).await
    }

    /// Runs one iteration as if the clock read `now`
    pub async fn step_at(&mut self, now: i64) -> Result<Option<VisitOutcome>, CrawlError> {
        let Some(entry) = self.frontier.next(&self.storage, now)? else {
            return Ok(None);
        };
        let outcome = self.process_entry(entry, now).await?;
        Ok(Some(outcome))
    }

    /// Processes a single frontier entry
    ///
    /// This method:
    /// 1. Re-checks scope
    /// 2. Skips records that are still fresh
    /// 3. Fetches with retries
    /// 4. Stores new or changed content, or only moves the times
    /// 5. Queues discovered links
    async fn process_entry(
        &mut self,
        entry: FrontierEntry,
        now: i64,
    ) -> Result<VisitOutcome, CrawlError> {
        let url = entry.url().to_string();

        let existing = match entry {
            FrontierEntry::Due(record) => Some(record),
            FrontierEntry::Pending(url) => self.storage.find(&url)?,
        };

        if !self.scope.is_in_scope(&url) {
            tracing::debug!("Skipping {}: outside crawl scope", url);
            self.park_if_due(existing.as_ref(), now)?;
            return Ok(VisitOutcome::OutOfScope);
        }

        if let Some(record) = existing.as_ref() {
            if !self.policy.needs_revisit(Some(record), now) {
                tracing::debug!("Skipping {}: fetched {}s ago", url, now - record.fetch_time);
                self.park_if_due(Some(record), now)?;
                return Ok(VisitOutcome::Skipped);
            }
        }

        tracing::info!("Processing: {}", url);

        let page = match self.retrier.fetch(&url).await {
            FetchOutcome::Page(page) => page,
            FetchOutcome::NotHtml { content_type } => {
                tracing::debug!("Skipping {}: content type {}", url, content_type);
                self.record_failure(&url, existing.as_ref(), FetchStatus::NonHtml, now)?;
                return Ok(VisitOutcome::NotHtml);
            }
            FetchOutcome::Failed { attempts, error } => {
                tracing::warn!("Giving up on {} after {} attempts: {}", url, attempts, error);
                self.record_failure(&url, existing.as_ref(), FetchStatus::FailedFetch, now)?;
                return Ok(VisitOutcome::Failed);
            }
        };

        let parsed = self.parse_page(&url, &page);
        let outcome = self.store_page(&url, &page, parsed.title, existing, now)?;
        let enqueued = self.discover_links(parsed.links, now)?;

        tracing::info!("Stored {} ({:?}), {} new link(s) queued", url, outcome, enqueued);

        Ok(outcome)
    }

    /// Parses a fetched page once, resolving links against its post-redirect URL
    fn parse_page(&self, url: &str, page: &FetchedPage) -> ParsedPage {
        match Url::parse(&page.final_url).or_else(|_| Url::parse(url)) {
            Ok(base) => parse_html(&page.body, &base),
            Err(e) => {
                tracing::debug!("Cannot resolve links of {}: {}", url, e);
                ParsedPage {
                    title: extract_title(&page.body),
                    links: Vec::new(),
                }
            }
        }
    }

    /// Applies change detection and writes the record
    fn store_page(
        &mut self,
        url: &str,
        page: &FetchedPage,
        title: String,
        existing: Option<CrawlRecord>,
        now: i64,
    ) -> StorageResult<VisitOutcome> {
        let content_fingerprint = fingerprint(&page.body);
        let next_fetch = self.policy.next_fetch_after_success(now);

        match existing {
            Some(record) if !changed(&record.content_fingerprint, &content_fingerprint) => {
                if record.status.is_success() {
                    self.storage.touch(url, now, next_fetch)?;
                } else {
                    // content matches, but the last attempt had failed
                    self.storage.upsert(&CrawlRecord {
                        fetch_time: now,
                        next_fetch,
                        status: FetchStatus::Success,
                        ..record
                    })?;
                }
                Ok(VisitOutcome::Unchanged)
            }
            existing => {
                self.storage.upsert(&CrawlRecord {
                    url: url.to_string(),
                    raw_content: page.body.clone(),
                    title,
                    fetch_time: now,
                    content_fingerprint,
                    next_fetch,
                    status: FetchStatus::Success,
                })?;
                // a record without a fingerprint has never held content
                Ok(match existing {
                    Some(record) if !record.content_fingerprint.is_empty() => {
                        VisitOutcome::Changed
                    }
                    _ => VisitOutcome::New,
                })
            }
        }
    }

    /// Queues in-scope links that have no record or a stale one
    fn discover_links(&mut self, links: Vec<String>, now: i64) -> StorageResult<u64> {
        let mut enqueued = 0;
        for link in links {
            let canonical = canonicalize(&link);

            if !self.scope.is_in_scope(&canonical) || self.frontier.pending().contains(&canonical)
            {
                continue;
            }

            let record = self.storage.find(&canonical)?;
            if self.policy.needs_revisit(record.as_ref(), now) && self.frontier.enqueue(canonical)
            {
                enqueued += 1;
            }
        }

        self.stats.enqueued += enqueued;
        Ok(enqueued)
    }

    /// Backs off a URL whose fetch failed
    ///
    /// A stored record keeps its content and only gets a new status and
    /// `next_fetch`. An unknown URL is stored without content, so links to it
    /// found later in the run are not queued again.
    fn record_failure(
        &mut self,
        url: &str,
        existing: Option<&CrawlRecord>,
        status: FetchStatus,
        now: i64,
    ) -> StorageResult<()> {
        let next_fetch = self.policy.next_fetch_after_failure(now);
        match existing {
            Some(record) => self.storage.reschedule(&record.url, next_fetch, Some(status)),
            None => self.storage.upsert(&CrawlRecord {
                url: url.to_string(),
                raw_content: String::new(),
                title: UNTITLED.to_string(),
                fetch_time: now,
                content_fingerprint: String::new(),
                next_fetch,
                status,
            }),
        }
    }

    /// Moves a due record that was not fetched out of the due set
    fn park_if_due(&mut self, record: Option<&CrawlRecord>, now: i64) -> StorageResult<()> {
        if let Some(record) = record.filter(|r| r.is_due(now)) {
            let next_fetch = self.policy.next_fetch_after_skip(record, now);
            self.storage.reschedule(&record.url, next_fetch, None)?;
        }
        Ok(())
    }
}

/// Current time in epoch seconds
pub fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the document store
/// 2. Build the HTTP client
/// 3. Run the crawl loop until it stops
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Token that requests a graceful stop
///
/// # Returns
///
/// * `Ok((RunReport, SqliteStorage))` - The run's report and the store, for reporting
/// * `Err(CrawlError)` - The store could not be opened or the client built
pub async fn run_crawl(
    config: &Config,
    cancel: CancellationToken,
) -> Result<(RunReport, SqliteStorage), CrawlError> {
    let mut coordinator = Coordinator::from_config(config, cancel)?;
    let report = coordinator.run().await?;
    Ok((report, coordinator.storage))
}
