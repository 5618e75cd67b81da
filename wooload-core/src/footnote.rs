//! Object Cache Pro footnote extraction
//!
//! With `analytics.footnote` enabled, Object Cache Pro appends a single HTML
//! comment after the closing `</body>` tag:
//!
//! ```text
//! <!-- plugin=object-cache-pro client=phpredis metric#hits=4248 metric#hit-ratio=99.7 ... -->
//! ```

use crate::error::MetricsParseError;
use serde::Serialize;
use std::collections::HashMap;
use wooload_http::HttpResponse;

const FOOTNOTE_MARKER: &str = "<!-- plugin=object-cache-pro";
const COMMENT_END: &str = "-->";

/// Per-response object cache metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheMetrics {
    pub hits: u64,
    /// Percentage, 0 to 100
    pub hit_ratio: f64,
    pub store_reads: u64,
    pub store_writes: u64,
    /// Milliseconds spent in the cache
    pub ms_cache: f64,
    pub ms_cache_median: f64,
    /// Cache time as a percentage of request time
    pub ms_cache_ratio: f64,
    pub using_relay: bool,
    pub using_phpredis: bool,
}

/// Extract cache metrics from a response body
///
/// Returns `Ok(None)` when no footnote is present in the document tail.
/// A footnote that is present but incomplete is an error, never a partial
/// value.
pub fn parse_metrics_from_response(
    response: &HttpResponse,
) -> Result<Option<CacheMetrics>, MetricsParseError> {
    parse_metrics_from_body(&response.body)
}

/// Same as [`parse_metrics_from_response`], on raw text
pub fn parse_metrics_from_body(body: &str) -> Result<Option<CacheMetrics>, MetricsParseError> {
    let tail = document_tail(body);
    let start = match tail.rfind(FOOTNOTE_MARKER) {
        Some(start) => start,
        None => return Ok(None),
    };

    let comment = &tail[start + "<!--".len()..];
    let end = comment
        .find(COMMENT_END)
        .ok_or(MetricsParseError::Unterminated)?;

    let fields = comment[..end]
        .split_whitespace()
        .filter_map(|token| token.split_once('='))
        .collect::<HashMap<_, _>>();

    Footnote(fields).into_metrics().map(Some)
}

/// Everything after the last `</body>`, or the whole body when there is none
pub(crate) fn document_tail(body: &str) -> &str {
    // ASCII lower-casing keeps byte offsets identical
    let lowered = body.to_ascii_lowercase();
    match lowered.rfind("</body>") {
        Some(idx) => &body[idx + "</body>".len()..],
        None => body,
    }
}

struct Footnote<'a>(HashMap<&'a str, &'a str>);

impl<'a> Footnote<'a> {
    fn into_metrics(self) -> Result<CacheMetrics, MetricsParseError> {
        let client = self.required("client")?.to_ascii_lowercase();

        Ok(CacheMetrics {
            hits: self.count("metric#hits")?,
            hit_ratio: self.measure("metric#hit-ratio")?,
            store_reads: self.count("metric#store-reads")?,
            store_writes: self.count("metric#store-writes")?,
            ms_cache: self.measure("metric#ms-cache")?,
            ms_cache_median: self.measure("metric#ms-cache-median")?,
            ms_cache_ratio: self.measure("metric#ms-cache-ratio")?,
            using_relay: client == "relay",
            using_phpredis: client == "phpredis",
        })
    }

    fn required(&self, field: &'static str) -> Result<&'a str, MetricsParseError> {
        self.0
            .get(field)
            .copied()
            .ok_or(MetricsParseError::MissingField(field))
    }

    fn count(&self, field: &'static str) -> Result<u64, MetricsParseError> {
        let raw = self.required(field)?;
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(field, raw));
        }
        raw.parse().map_err(|_| invalid(field, raw))
    }

    fn measure(&self, field: &'static str) -> Result<f64, MetricsParseError> {
        let raw = self.required(field)?;
        // Rust float parsing accepts "inf" and "NaN", which a footnote never emits
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            return Err(invalid(field, raw));
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
            _ => Err(invalid(field, raw)),
        }
    }
}

fn invalid(field: &'static str, raw: &str) -> MetricsParseError {
    MetricsParseError::InvalidValue {
        field,
        value: raw.to_string(),
    }
}
