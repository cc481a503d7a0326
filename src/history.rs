//! Session history - bounded, most-recent-first log of comparisons
//!
//! Insert always prepends; once the store is over capacity the oldest records
//! fall off the tail. There is no update, delete or search, only ordered
//! iteration. Vectors are pooled from here for the history map.

use crate::comparison::ComparisonRecord;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug)]
pub struct HistoryStore {
    records: VecDeque<ComparisonRecord>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl HistoryStore {
    /// Empty store holding at most `capacity` records (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Prepend a record, evicting from the tail when over capacity.
    /// Returns the stored record.
    pub fn insert(&mut self, record: ComparisonRecord) -> &ComparisonRecord {
        self.records.push_front(record);
        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_back() {
                debug!(time = %evicted.time_label(), "evicted oldest history record");
            }
        }
        &self.records[0]
    }

    /// Up to `n` records, newest first
    pub fn recent(&self, n: usize) -> Vec<&ComparisonRecord> {
        self.records.iter().take(n).collect()
    }

    pub fn latest(&self) -> Option<&ComparisonRecord> {
        self.records.front()
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &ComparisonRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Labelled vectors from up to `limit` recent records, newest first.
    ///
    /// Only records produced by the newest record's model are pooled, since
    /// vectors of different models cannot share one projection. Each record
    /// contributes its full-sentence pair, then its keyword pair if present.
    pub fn pooled_points(&self, limit: usize) -> Vec<PooledVector<'_>> {
        let Some(latest) = self.latest() else {
            return Vec::new();
        };

        let mut points = Vec::new();
        for (age, record) in self.records.iter().take(limit).enumerate() {
            if record.model != latest.model {
                continue;
            }

            let mut push = |role, vector| {
                points.push(PooledVector {
                    role,
                    age,
                    timestamp: record.timestamp,
                    vector,
                })
            };

            push(PointRole::ScrapedFull, record.scraped_vector.as_slice());
            push(PointRole::QueryFull, record.query_vector.as_slice());
            if let Some(kw) = &record.keywords {
                push(PointRole::ScrapedKeyword, kw.scraped_vector.as_slice());
                push(PointRole::QueryKeyword, kw.query_vector.as_slice());
            }
        }
        points
    }
}

/// Which vector of a record a pooled point came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointRole {
    ScrapedFull,
    QueryFull,
    ScrapedKeyword,
    QueryKeyword,
}

impl PointRole {
    /// Single-character marker for text plots
    pub fn marker(&self) -> char {
        match self {
            PointRole::ScrapedFull => 'o',
            PointRole::QueryFull => '^',
            PointRole::ScrapedKeyword => 's',
            PointRole::QueryKeyword => 'D',
        }
    }
}

impl fmt::Display for PointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PointRole::ScrapedFull => "scraped",
            PointRole::QueryFull => "query",
            PointRole::ScrapedKeyword => "scraped_kw",
            PointRole::QueryKeyword => "query_kw",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct PooledVector<'a> {
    pub role: PointRole,
    /// Index of the source record, 0 = newest
    pub age: usize,
    pub timestamp: DateTime<Local>,
    pub vector: &'a [f32],
}
