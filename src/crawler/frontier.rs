//! Frontier: decides which URL the crawl loop visits next
//!
//! Stored records whose revisit time has passed always come first, ordered by
//! `next_fetch`. Newly discovered URLs wait in an in-memory FIFO queue that
//! is drained only when nothing is due.

use crate::config::LogicConfig;
use crate::storage::{CrawlRecord, Storage, StorageResult};
use crate::url::canonicalize;
use std::collections::{HashSet, VecDeque};

/// FIFO queue of discovered URLs that holds each URL at most once
#[derive(Debug, Default)]
pub struct PendingQueue {
    queue: VecDeque<String>,
    members: HashSet<String>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL; returns false if it is already queued
    pub fn enqueue(&mut self, url: String) -> bool {
        if !self.members.insert(url.clone()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    pub fn pop(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.members.remove(&url);
        Some(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.members.contains(url)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued URLs in the order they will be popped
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}

/// When stored records become eligible for another fetch
#[derive(Debug, Clone, Copy)]
pub struct RevisitPolicy {
    revisit_interval: i64,
    failure_backoff: i64,
}

impl RevisitPolicy {
    pub fn new(revisit_interval: i64, failure_backoff: i64) -> Self {
        Self {
            revisit_interval,
            failure_backoff,
        }
    }

    pub fn from_config(config: &LogicConfig) -> Self {
        Self::new(config.revisit_interval, config.failure_backoff)
    }

    /// Returns true if a URL should be fetched at `now`
    ///
    /// A URL with no record always needs a visit. A stored URL needs one once
    /// strictly more than the revisit interval has passed since its last fetch.
    pub fn needs_revisit(&self, record: Option<&CrawlRecord>, now: i64) -> bool {
        match record {
            None => true,
            Some(record) => now - record.fetch_time > self.revisit_interval,
        }
    }

    /// `next_fetch` for a page fetched at `now`
    pub fn next_fetch_after_success(&self, now: i64) -> i64 {
        now + self.revisit_interval
    }

    /// `next_fetch` for a stored page whose re-fetch failed at `now`
    pub fn next_fetch_after_failure(&self, now: i64) -> i64 {
        now + self.failure_backoff
    }

    /// `next_fetch` for a due record that was not fetched at `now`
    ///
    /// Always lies after `now`, so the record cannot be returned as due again
    /// within the same second.
    pub fn next_fetch_after_skip(&self, record: &CrawlRecord, now: i64) -> i64 {
        let scheduled = record.fetch_time + self.revisit_interval;
        if scheduled > now {
            scheduled
        } else {
            now + self.revisit_interval
        }
    }
}

/// The next URL to process and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontierEntry {
    /// A stored record whose `next_fetch` has passed
    Due(CrawlRecord),

    /// A URL popped from the pending queue
    Pending(String),
}

impl FrontierEntry {
    pub fn url(&self) -> &str {
        match self {
            Self::Due(record) => &record.url,
            Self::Pending(url) => url,
        }
    }
}

/// Due-record lookup plus the pending queue
#[derive(Debug, Default)]
pub struct Frontier {
    pending: PendingQueue,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier whose pending queue holds the canonicalized seeds
    pub fn with_seeds<'a>(seeds: impl IntoIterator<Item = &'a String>) -> Self {
        let mut frontier = Self::new();
        for seed in seeds {
            frontier.enqueue(canonicalize(seed));
        }
        frontier
    }

    /// Picks the next URL: the most overdue stored record, else the oldest pending URL
    pub fn next<S: Storage + ?Sized>(
        &mut self,
        storage: &S,
        now: i64,
    ) -> StorageResult<Option<FrontierEntry>> {
        if let Some(record) = storage.find_due(now)? {
            return Ok(Some(FrontierEntry::Due(record)));
        }
        Ok(self.pending.pop().map(FrontierEntry::Pending))
    }

    /// Queues a canonical URL; returns false if it was already queued
    pub fn enqueue(&mut self, url: String) -> bool {
        self.pending.enqueue(url)
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FetchStatus;
    use crate::storage::SqliteStorage;

    fn record(url: &str, fetch_time: i64, next_fetch: i64) -> CrawlRecord {
        CrawlRecord {
            url: url.to_string(),
            raw_content: "<html></html>".to_string(),
            title: "T".to_string(),
            fetch_time,
            content_fingerprint: "fp".to_string(),
            next_fetch,
            status: FetchStatus::Success,
        }
    }

    #[test]
    fn test_pending_queue_is_fifo_and_deduplicated() {
        let mut queue = PendingQueue::new();
        assert!(queue.enqueue("a".to_string()));
        assert!(queue.enqueue("b".to_string()));
        assert!(!queue.enqueue("a".to_string()));
        assert_eq!(queue.len(), 2);
        assert!(queue.contains("a"));

        assert_eq!(queue.pop().as_deref(), Some("a"));
        assert!(!queue.contains("a"));
        assert_eq!(queue.pop().as_deref(), Some("b"));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_popped_url_can_be_queued_again() {
        let mut queue = PendingQueue::new();
        queue.enqueue("a".to_string());
        queue.pop();
        assert!(queue.enqueue("a".to_string()));
    }

    #[test]
    fn test_unknown_url_needs_visit() {
        let policy = RevisitPolicy::new(604_800, 3600);
        assert!(policy.needs_revisit(None, 0));
    }

    #[test]
    fn test_revisit_boundary_is_strict() {
        let policy = RevisitPolicy::new(604_800, 3600);
        let stored = record("http://ex.com/", 1_000, 1_000 + 604_800);
        assert!(!policy.needs_revisit(Some(&stored), 1_000 + 604_800));
        assert!(policy.needs_revisit(Some(&stored), 1_000 + 604_801));
    }

    #[test]
    fn test_next_fetch_is_in_the_future() {
        let policy = RevisitPolicy::new(100, 30);
        assert_eq!(policy.next_fetch_after_success(1_000), 1_100);
        assert_eq!(policy.next_fetch_after_failure(1_000), 1_030);
    }

    #[test]
    fn test_skip_reschedule() {
        let policy = RevisitPolicy::new(100, 30);

        let recent = record("http://ex.com/", 950, 900);
        assert_eq!(policy.next_fetch_after_skip(&recent, 1_000), 1_050);

        let on_boundary = record("http://ex.com/", 900, 900);
        assert_eq!(policy.next_fetch_after_skip(&on_boundary, 1_000), 1_100);
    }

    #[test]
    fn test_seeds_are_canonicalized() {
        let seeds = vec![
            "http://Ex.com/a#top".to_string(),
            "http://ex.com/a".to_string(),
        ];
        let frontier = Frontier::with_seeds(&seeds);
        assert_eq!(frontier.pending().iter().collect::<Vec<_>>(), vec!["http://ex.com/a"]);
    }

    #[test]
    fn test_due_records_take_priority_over_pending() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.upsert(&record("http://ex.com/old", 0, 10)).unwrap();

        let mut frontier = Frontier::new();
        frontier.enqueue("http://ex.com/new".to_string());

        let first = frontier.next(&storage, 100).unwrap().unwrap();
        assert!(matches!(first, FrontierEntry::Due(ref r) if r.url == "http://ex.com/old"));
        assert_eq!(frontier.pending().len(), 1);

        storage.reschedule("http://ex.com/old", 1_000, None).unwrap();
        let second = frontier.next(&storage, 100).unwrap().unwrap();
        assert_eq!(second, FrontierEntry::Pending("http://ex.com/new".to_string()));

        assert!(frontier.next(&storage, 100).unwrap().is_none());
    }

    #[test]
    fn test_most_overdue_record_first() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.upsert(&record("http://ex.com/b", 0, 50)).unwrap();
        storage.upsert(&record("http://ex.com/a", 0, 20)).unwrap();

        let mut frontier = Frontier::new();
        let entry = frontier.next(&storage, 100).unwrap().unwrap();
        assert_eq!(entry.url(), "http://ex.com/a");
    }
}
