//! Site URL validation and think-time jitter

use crate::error::ValidationError;
use std::time::Duration;
use url::Url;

/// Validate and normalise the site under test
///
/// Accepts absolute `http`/`https` URLs with a host. A trailing slash on the
/// path is removed so `{site}/my-account/` joins cleanly.
pub fn validate_site_url(raw: Option<&str>) -> Result<Url, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::MissingSiteUrl);
    }

    let invalid = |reason: &str| ValidationError::InvalidSiteUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }

    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    url.set_fragment(None);
    Ok(url)
}

/// A page under the site root, keeping any sub-directory the site lives in
pub fn site_page(site: &Url, path: &str) -> Url {
    let mut url = site.clone();
    let joined = format!(
        "{}/{}",
        site.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url
}

/// Uniform random integer in `min..=max`
///
/// Reversed bounds are swapped rather than rejected.
pub fn rand(min: u64, max: u64) -> u64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    fastrand::u64(low..=high)
}

/// Random think time between `min_secs` and `max_secs`, inclusive, at
/// millisecond resolution
pub fn rand_duration(min_secs: u64, max_secs: u64) -> Duration {
    let millis = rand(min_secs.saturating_mul(1000), max_secs.saturating_mul(1000));
    Duration::from_millis(millis)
}
