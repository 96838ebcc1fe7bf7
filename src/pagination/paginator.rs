//! Offset paginator
//!
//! Drives `skip`/`top` pagination against an API that does not always honour
//! it: a page repeated twice or a page with nothing new ends the enumeration
//! instead of looping forever.

use super::types::{PageRequest, PageSignature, StopReason, SyncCursor};
use crate::decode::{total_records, RecordExtractor};
use crate::error::Result;
use crate::http::{RequestConfig, RequestExecutor};
use crate::types::JsonValue;
use tracing::{debug, error, info, warn};

/// Enumerates one stream page by page
#[derive(Debug)]
pub struct Paginator {
    stream: String,
    request: PageRequest,
    extractor: RecordExtractor,
    cursor: SyncCursor,
}

impl Paginator {
    /// Create a paginator for `stream`
    pub fn new(stream: impl Into<String>, request: PageRequest, extractor: RecordExtractor) -> Self {
        let cursor = SyncCursor::new(request.page_size);
        Self {
            stream: stream.into(),
            request,
            extractor,
            cursor,
        }
    }

    /// Lower the iteration ceiling
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.cursor.max_iterations = max_iterations;
        self
    }

    /// Current cursor
    pub fn cursor(&self) -> &SyncCursor {
        &self.cursor
    }

    /// Fetch the next page of unseen records
    ///
    /// Returns `None` once the enumeration has ended. Every `Some` page holds
    /// at least one record.
    pub async fn next_page(
        &mut self,
        executor: &dyn RequestExecutor,
    ) -> Result<Option<Vec<JsonValue>>> {
        if self.cursor.is_done() {
            return Ok(None);
        }

        if self.cursor.iteration >= self.cursor.max_iterations {
            error!(
                "Stream {}: hit maximum iteration limit of {}, pagination is not advancing",
                self.stream, self.cursor.max_iterations
            );
            self.cursor.finish(StopReason::IterationCeiling);
            return Ok(None);
        }
        self.cursor.iteration += 1;

        let request = self.build_request();
        let body = executor
            .execute(self.request.method, &self.request.path, request)
            .await?;

        let records = self.extractor.extract(&body);
        let len = records.len();
        debug!(
            "Stream {}: page {} at offset {} returned {} records",
            self.stream, self.cursor.iteration, self.cursor.offset, len
        );

        if records.is_empty() {
            info!(
                "No more records for stream {} after {} iterations",
                self.stream, self.cursor.iteration
            );
            self.cursor.finish(StopReason::EmptyPage);
            return Ok(None);
        }

        let (repeated, limit_hit) = self.cursor.observe_signature(PageSignature::of(&records));
        if limit_hit {
            warn!(
                "Stream {}: API returned identical page {} times, it may not support pagination. Stopping to prevent duplicates",
                self.stream,
                self.cursor.duplicate_pages + 1
            );
            self.cursor.finish(StopReason::DuplicatePages);
            return Ok(None);
        }

        let fresh = self.cursor.dedup(records);
        if fresh.is_empty() {
            if repeated {
                warn!(
                    "Stream {}: page repeated with all {} records already seen. Pagination complete",
                    self.stream, len
                );
            } else {
                info!(
                    "Stream {}: all {} records were duplicates. Pagination complete",
                    self.stream, len
                );
            }
            self.cursor.finish(StopReason::NoNewRecords);
            return Ok(None);
        }

        self.cursor.advance(len, total_records(&body));
        if let Some(reason) = self.cursor.stop_reason {
            debug!("Stream {}: pagination finished ({:?})", self.stream, reason);
        }

        Ok(Some(fresh))
    }

    fn build_request(&self) -> RequestConfig {
        let mut request = RequestConfig::new()
            .queries(self.request.params.clone())
            .queries(self.cursor.page_params());
        if let Some(body) = &self.request.body {
            request = request.json(body.clone());
        }
        request
    }
}
