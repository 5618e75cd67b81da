//! Shared serde helpers and env-flag parsing

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Durations written as whole seconds, or as `"{millis}ms"` when they carry
/// a sub-second part
///
/// Reading also accepts k6-style strings such as `"90s"`, `"5m"`, `"1h"` or
/// `"500ms"`, so stage lists can be copied from an existing k6 script.
pub mod serde_duration {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Seconds(u64),
        Text(String),
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_u64(duration.as_secs())
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawDuration::deserialize(deserializer)? {
            RawDuration::Seconds(seconds) => Ok(Duration::from_secs(seconds)),
            RawDuration::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
        }
    }
}

/// Parse `"30"`, `"30s"`, `"2m"`, `"1h"` or `"250ms"`
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{}'", text))?;
    let too_large = || format!("duration '{}' is too large", text);
    let duration = match unit {
        "" | "s" => Duration::from_secs(value),
        "ms" => Duration::from_millis(value),
        "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(too_large)?),
        "h" => Duration::from_secs(value.checked_mul(3600).ok_or_else(too_large)?),
        other => return Err(format!("unknown duration unit '{}' in '{}'", other, text)),
    };
    Ok(duration)
}

pub fn default_true() -> bool {
    true
}

pub fn default_false() -> bool {
    false
}

/// Interpret a flag the way a shell script would: anything non-empty is on,
/// except `0` and `false`.
pub fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}
