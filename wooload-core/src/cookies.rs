//! Cookies that make page caches pass a request through to PHP

use tracing::debug;
use url::Url;
use wooload_http::{CookieStore, HttpError};

const BYPASS_COOKIES: &[(&str, &str)] = &[
    ("wordpress_no_cache", "1"),
    ("woocommerce_items_in_cart", "1"),
];

/// The cookies a virtual user sends to defeat full-page caching
pub fn bypass_page_cache_cookies() -> &'static [(&'static str, &'static str)] {
    BYPASS_COOKIES
}

/// Set every bypass cookie on `store`, scoped to `site` with `Path=/`
pub fn apply_bypass_cookies<S>(store: &S, site: &Url) -> Result<(), HttpError>
where
    S: CookieStore + ?Sized,
{
    for (name, value) in bypass_page_cache_cookies() {
        store.set_cookie(site, name, value, "/")?;
    }
    debug!("Applied {} page-cache bypass cookies for {}", BYPASS_COOKIES.len(), site);
    Ok(())
}
