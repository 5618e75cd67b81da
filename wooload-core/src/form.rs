//! HTML login form extraction and submission
//!
//! Only the subset of HTML form semantics a WordPress login form uses is
//! supported: `<input>` and `<button>` controls, checked checkboxes and
//! radios, and the first named submit button.

use crate::error::FormError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;
use url::Url;
use wooload_http::{HttpClient, HttpMethod, HttpResponse};

static FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<form\b([^>]*)>(.*?)</form\s*>").expect("valid form regex"));

static CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(input|button)\b([^>]*)>").expect("valid control regex"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+)))?"#)
        .expect("valid attribute regex")
});

/// A form found in a page, ready to be submitted by the same session
#[derive(Debug, Clone, PartialEq)]
pub struct LoginForm {
    pub action: Url,
    pub method: HttpMethod,
    /// Successful controls in document order
    pub fields: Vec<(String, String)>,
}

impl LoginForm {
    /// Find the first form whose class list contains `class`
    pub fn extract(response: &HttpResponse, class: &str) -> Result<Self, FormError> {
        for captures in FORM.captures_iter(&response.body) {
            let attrs = parse_attributes(&captures[1]);
            let matches_class = attrs
                .get("class")
                .map(|classes| classes.split_whitespace().any(|c| c == class))
                .unwrap_or(false);
            if !matches_class {
                continue;
            }

            let action = match attrs.get("action").map(|a| a.trim()) {
                Some(action) if !action.is_empty() => {
                    response
                        .url
                        .join(action)
                        .map_err(|source| FormError::InvalidAction {
                            action: action.to_string(),
                            source,
                        })?
                }
                _ => response.url.clone(),
            };

            let method = attrs
                .get("method")
                .and_then(|m| m.parse().ok())
                .unwrap_or(HttpMethod::Post);

            let form = Self {
                action,
                method,
                fields: collect_fields(&captures[2]),
            };
            debug!(
                "Extracted {} form with {} fields posting to {}",
                class,
                form.fields.len(),
                form.action
            );
            return Ok(form);
        }

        Err(FormError::NotFound(class.to_string()))
    }

    /// The form's own fields with `overrides` replacing or appending by name
    pub fn merged_fields(&self, overrides: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut fields = self.fields.clone();
        for (name, value) in overrides {
            match fields.iter_mut().find(|(existing, _)| existing == name) {
                Some(field) => field.1 = value.to_string(),
                None => fields.push((name.to_string(), value.to_string())),
            }
        }
        fields
    }

    /// Submit the form with `overrides` merged over its own fields
    pub async fn submit<C>(
        &self,
        client: &C,
        overrides: &[(&str, &str)],
    ) -> Result<HttpResponse, FormError>
    where
        C: HttpClient + ?Sized,
    {
        let fields = self.merged_fields(overrides);
        let response = match self.method {
            HttpMethod::Post => client.post_form(&self.action, &fields).await?,
            HttpMethod::Get => {
                let mut url = self.action.clone();
                url.query_pairs_mut().clear().extend_pairs(&fields);
                client.get(&url).await?
            }
        };
        Ok(response)
    }
}

fn collect_fields(body: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let mut submitter_taken = false;

    for control in CONTROL.captures_iter(body) {
        let tag = control[1].to_ascii_lowercase();
        let attrs = parse_attributes(&control[2]);
        let name = match attrs.get("name") {
            Some(name) if !name.is_empty() => name.clone(),
            _ => continue,
        };
        if attrs.contains_key("disabled") {
            continue;
        }

        let default_type = if tag == "button" { "submit" } else { "text" };
        let kind = attrs
            .get("type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_else(|| default_type.to_string());
        let value = attrs.get("value").cloned();

        match kind.as_str() {
            "submit" | "image" => {
                if !submitter_taken {
                    submitter_taken = true;
                    fields.push((name, value.unwrap_or_default()));
                }
            }
            "checkbox" | "radio" => {
                if attrs.contains_key("checked") {
                    fields.push((name, value.unwrap_or_else(|| "on".to_string())));
                }
            }
            "button" | "reset" | "file" => {}
            _ => fields.push((name, value.unwrap_or_default())),
        }
    }

    fields
}

fn parse_attributes(raw: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(raw)
        .map(|captures| {
            let name = captures[1].to_ascii_lowercase();
            let value = captures
                .get(2)
                .or_else(|| captures.get(3))
                .or_else(|| captures.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (name, value)
        })
        .fold(HashMap::new(), |mut attrs, (name, value)| {
            // First occurrence wins, as in browsers
            attrs.entry(name).or_insert(value);
            attrs
        })
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let decoded = candidate
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&candidate[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
