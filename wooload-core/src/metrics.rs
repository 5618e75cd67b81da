//! Metric names and per-response recording

use crate::cache::page_cache_status;
use crate::footnote::parse_metrics_from_response;
use crate::sink::MetricSink;
use tracing::{trace, warn};
use wooload_http::HttpResponse;

pub const ERRORS: &str = "errors";
pub const RESPONSE_CACHED: &str = "response_cached";
pub const CACHE_HITS: &str = "cache_hits";
pub const CACHE_HIT_RATIO: &str = "cache_hit_ratio";
pub const STORE_READS: &str = "store_reads";
pub const STORE_WRITES: &str = "store_writes";
pub const MS_CACHE: &str = "ms_cache";
pub const MS_CACHE_MEDIAN: &str = "ms_cache_median";
pub const MS_CACHE_RATIO: &str = "ms_cache_ratio";
pub const USING_RELAY: &str = "using_relay";
pub const USING_PHPREDIS: &str = "using_phpredis";

pub const HTTP_REQ_DURATION: &str = "http_req_duration";
pub const ITERATIONS: &str = "iterations";
pub const ITERATION_FAILURES: &str = "iteration_failures";
pub const METRICS_PARSE_ERRORS: &str = "metrics_parse_errors";

/// Trends whose samples are durations in milliseconds
pub const TIME_TRENDS: &[&str] = &[HTTP_REQ_DURATION, MS_CACHE, MS_CACHE_MEDIAN];

/// Record the request duration, the page-cache verdict and, when the
/// response carries a footnote, the object cache metrics
///
/// A malformed footnote is counted and logged but never fails the caller.
pub fn record_response_metrics(sink: &dyn MetricSink, response: &HttpResponse) {
    sink.add_trend(HTTP_REQ_DURATION, response.elapsed.as_secs_f64() * 1000.0);

    let cache = page_cache_status(response);
    sink.add_rate(RESPONSE_CACHED, cache.cached);

    match parse_metrics_from_response(response) {
        Ok(Some(metrics)) => {
            sink.add_trend(CACHE_HITS, metrics.hits as f64);
            sink.add_trend(CACHE_HIT_RATIO, metrics.hit_ratio);
            sink.add_trend(STORE_READS, metrics.store_reads as f64);
            sink.add_trend(STORE_WRITES, metrics.store_writes as f64);
            sink.add_trend(MS_CACHE, metrics.ms_cache);
            sink.add_trend(MS_CACHE_MEDIAN, metrics.ms_cache_median);
            sink.add_trend(MS_CACHE_RATIO, metrics.ms_cache_ratio);
            sink.add_rate(USING_RELAY, metrics.using_relay);
            sink.add_rate(USING_PHPREDIS, metrics.using_phpredis);
        }
        Ok(None) => trace!("No cache footnote in response from {}", response.url),
        Err(e) => {
            warn!("Ignoring cache footnote from {}: {}", response.url, e);
            sink.add_counter(METRICS_PARSE_ERRORS, 1);
        }
    }
}
