//! Page-cache hit detection
//!
//! Different stacks report full-page cache status in different places. The
//! signals are consulted in a fixed order and the first one present decides.

use crate::footnote::document_tail;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::trace;
use wooload_http::HttpResponse;

static PAGE_CACHE_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<!--\s*page-cache:\s*([A-Za-z-]+)\s*-->").expect("valid page-cache regex")
});

const SUPER_CACHE_SIGNATURE: &str = "<!-- Cached page generated by";

const HIT_VALUES: [&str; 4] = ["HIT", "STALE", "UPDATING", "REVALIDATED"];

/// Where a page-cache verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheSignal {
    CfCacheStatus,
    XCache,
    XLitespeedCache,
    XCacheStatus,
    XProxyCache,
    BodyMarker,
}

impl CacheSignal {
    const HEADERS: [CacheSignal; 5] = [
        CacheSignal::CfCacheStatus,
        CacheSignal::XCache,
        CacheSignal::XLitespeedCache,
        CacheSignal::XCacheStatus,
        CacheSignal::XProxyCache,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheSignal::CfCacheStatus => "cf-cache-status",
            CacheSignal::XCache => "x-cache",
            CacheSignal::XLitespeedCache => "x-litespeed-cache",
            CacheSignal::XCacheStatus => "x-cache-status",
            CacheSignal::XProxyCache => "x-proxy-cache",
            CacheSignal::BodyMarker => "body",
        }
    }
}

impl fmt::Display for CacheSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page-cache verdict for one response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageCacheStatus {
    pub cached: bool,
    /// `None` when the response carried no cache signal at all
    pub source: Option<CacheSignal>,
}

/// Whether the response was served from a full-page cache
pub fn response_was_cached(response: &HttpResponse) -> bool {
    page_cache_status(response).cached
}

pub fn page_cache_status(response: &HttpResponse) -> PageCacheStatus {
    for signal in CacheSignal::HEADERS {
        if let Some(value) = response.header(signal.as_str()) {
            let verdict = header_verdict(signal, value);
            trace!("Page cache decided by {}: {:?} -> {}", signal, value, verdict);
            return PageCacheStatus {
                cached: verdict,
                source: Some(signal),
            };
        }
    }

    let tail = document_tail(&response.body);
    if let Some(captures) = PAGE_CACHE_COMMENT.captures_iter(tail).last() {
        return PageCacheStatus {
            cached: is_hit(&captures[1]),
            source: Some(CacheSignal::BodyMarker),
        };
    }
    if tail.contains(SUPER_CACHE_SIGNATURE) {
        return PageCacheStatus {
            cached: true,
            source: Some(CacheSignal::BodyMarker),
        };
    }

    PageCacheStatus {
        cached: false,
        source: None,
    }
}

fn header_verdict(signal: CacheSignal, value: &str) -> bool {
    match signal {
        // Each proxy hop appends its own entry; the one nearest the client counts
        CacheSignal::XCache => value
            .rsplit(',')
            .next()
            .and_then(|entry| entry.split_whitespace().next())
            .map(is_hit)
            .unwrap_or(false),
        _ => is_hit(value),
    }
}

fn is_hit(value: &str) -> bool {
    let value = value.trim().to_ascii_uppercase();
    HIT_VALUES.contains(&value.as_str())
}
