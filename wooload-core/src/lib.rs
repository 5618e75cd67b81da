//! Core domain logic for wooload
//!
//! Everything here works on a single completed response or a single metric
//! sample: page-cache detection, Object Cache Pro footnote extraction, the
//! page-cache bypass cookies, request checks, login form extraction and the
//! metric sink the flow records into.

pub mod cache;
pub mod checks;
pub mod cookies;
pub mod error;
pub mod footnote;
pub mod form;
pub mod helpers;
pub mod metrics;
pub mod sink;

// Re-export commonly used types at the crate root
pub use cache::{page_cache_status, response_was_cached, CacheSignal, PageCacheStatus};
pub use checks::{is_ok, page_is_not_login, LOGIN_FORM_CLASS};
pub use cookies::{apply_bypass_cookies, bypass_page_cache_cookies};
pub use error::{FormError, MetricsParseError, ValidationError};
pub use footnote::{parse_metrics_from_body, parse_metrics_from_response, CacheMetrics};
pub use form::LoginForm;
pub use helpers::{rand, rand_duration, site_page, validate_site_url};
pub use metrics::record_response_metrics;
pub use sink::{CheckSummary, MetricRegistry, MetricSink, MetricsSnapshot, RateSummary, TrendSummary};
