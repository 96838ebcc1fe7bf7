//! Pagination types
//!
//! Runtime bookkeeping for one stream enumeration: where we are, what we
//! have already seen, and why we stopped.

use crate::decode::record_identity;
use crate::types::{JsonValue, Method};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Safety limit on requests per enumeration
pub const MAX_ITERATIONS: u32 = 10_000;

/// Identical consecutive pages tolerated before giving up
pub const DUPLICATE_PAGE_LIMIT: u32 = 2;

/// Query parameter carrying the offset
pub const SKIP_PARAM: &str = "skip";

/// Query parameter carrying the page size
pub const TOP_PARAM: &str = "top";

/// Fingerprint of a page, used to spot an API repeating itself
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageSignature {
    /// First id, last id and length
    Ids {
        first: String,
        last: String,
        len: usize,
    },
    /// Hash of the canonical JSON of the page, when ids are missing
    Digest(u64),
}

impl PageSignature {
    /// Compute the signature of a non-empty page
    pub fn of(records: &[JsonValue]) -> Self {
        let first = records.first().and_then(record_identity);
        let last = records.last().and_then(record_identity);
        match (first, last) {
            (Some(first), Some(last)) => Self::Ids {
                first,
                last,
                len: records.len(),
            },
            _ => {
                // serde_json maps keep keys sorted, so this is canonical
                let canonical = serde_json::to_string(records).unwrap_or_default();
                let mut hasher = DefaultHasher::new();
                canonical.hash(&mut hasher);
                Self::Digest(hasher.finish())
            }
        }
    }
}

/// Why an enumeration ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The response held no records
    EmptyPage,
    /// The same page came back too many times in a row
    DuplicatePages,
    /// Every record on the page had been seen before
    NoNewRecords,
    /// Fewer records than the page size
    ShortPage,
    /// The offset reached the reported total
    TotalReached,
    /// The endpoint returns one resource
    SingleResource,
    /// The iteration ceiling was hit
    IterationCeiling,
}

/// Base request for every page of an enumeration
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub method: Method,
    /// Resolved path, may carry its own query string
    pub path: String,
    /// Parameters sent with every page
    pub params: HashMap<String, String>,
    pub body: Option<JsonValue>,
    /// `None` for single-resource endpoints
    pub page_size: Option<u32>,
}

impl PageRequest {
    /// A paged GET request
    pub fn get(path: impl Into<String>, page_size: Option<u32>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            page_size,
            ..Default::default()
        }
    }

    /// Add a parameter sent with every page
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Runtime state of one enumeration
#[derive(Debug, Clone)]
pub struct SyncCursor {
    pub offset: u64,
    pub page_size: Option<u32>,
    /// Identities already yielded
    pub seen: HashSet<String>,
    pub last_signature: Option<PageSignature>,
    pub duplicate_pages: u32,
    /// Requests issued so far
    pub iteration: u32,
    pub max_iterations: u32,
    pub records_yielded: u64,
    pub stop_reason: Option<StopReason>,
}

impl SyncCursor {
    /// Fresh cursor for a page size
    pub fn new(page_size: Option<u32>) -> Self {
        Self {
            offset: 0,
            page_size,
            seen: HashSet::new(),
            last_signature: None,
            duplicate_pages: 0,
            iteration: 0,
            max_iterations: MAX_ITERATIONS,
            records_yielded: 0,
            stop_reason: None,
        }
    }

    /// Whether the enumeration has ended
    pub fn is_done(&self) -> bool {
        self.stop_reason.is_some()
    }

    /// Mark the enumeration as ended
    pub fn finish(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
    }

    /// Paging parameters for the next request
    pub fn page_params(&self) -> Vec<(&'static str, String)> {
        match self.page_size {
            Some(size) => vec![
                (SKIP_PARAM, self.offset.to_string()),
                (TOP_PARAM, size.to_string()),
            ],
            None => vec![],
        }
    }

    /// Record a page signature, returning `(repeated, duplicate_limit_hit)`
    pub fn observe_signature(&mut self, signature: PageSignature) -> (bool, bool) {
        let repeated = self.last_signature.as_ref() == Some(&signature);
        if repeated {
            self.duplicate_pages += 1;
        } else {
            self.duplicate_pages = 0;
        }
        self.last_signature = Some(signature);
        (repeated, self.duplicate_pages >= DUPLICATE_PAGE_LIMIT)
    }

    /// Keep only records not yielded before; identity-less records always pass
    pub fn dedup(&mut self, records: Vec<JsonValue>) -> Vec<JsonValue> {
        let fresh: Vec<JsonValue> = records
            .into_iter()
            .filter(|record| match record_identity(record) {
                Some(id) => self.seen.insert(id),
                None => true,
            })
            .collect();
        self.records_yielded += fresh.len() as u64;
        fresh
    }

    /// Move past a page of `len` records
    pub fn advance(&mut self, len: usize, total: Option<u64>) {
        let Some(page_size) = self.page_size else {
            self.finish(StopReason::SingleResource);
            return;
        };
        if (len as u64) < u64::from(page_size) {
            self.finish(StopReason::ShortPage);
            return;
        }
        self.offset += len as u64;
        if let Some(total) = total {
            if self.offset >= total {
                self.finish(StopReason::TotalReached);
            }
        }
    }
}
