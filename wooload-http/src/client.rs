//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{HttpMethod, HttpResponse};
use reqwest::cookie::{CookieStore as _, Jar};
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};
use url::Url;

/// HTTP client trait for making the requests a virtual user needs
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpError>;

    /// POST `fields` as `application/x-www-form-urlencoded`
    async fn post_form(
        &self,
        url: &Url,
        fields: &[(String, String)],
    ) -> Result<HttpResponse, HttpError>;
}

/// Cookie store attached to a single session
pub trait CookieStore: Send + Sync {
    fn set_cookie(&self, site: &Url, name: &str, value: &str, path: &str) -> Result<(), HttpError>;
}

/// A client with its own cookie store
pub trait Session: HttpClient + CookieStore {}

impl<T: HttpClient + CookieStore + ?Sized> Session for T {}

/// Creates a fresh, isolated session for every iteration
pub trait SessionFactory: Send + Sync {
    fn create_session(&self) -> Result<Box<dyn Session>, HttpError>;
}

/// reqwest-backed session with a private cookie jar
#[derive(Debug, Clone)]
pub struct SiteSession {
    client: Client,
    jar: Arc<Jar>,
}

impl SiteSession {
    /// Create a session with an empty cookie jar
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating SiteSession with timeout: {}s",
            config.timeout.as_secs()
        );
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(HttpError::ClientBuild)?;

        Ok(Self { client, jar })
    }

    /// The `Cookie` header this session would send to `url`
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &Url,
        form: Option<&[(String, String)]>,
    ) -> Result<HttpResponse, HttpError> {
        let network_error = |source| HttpError::NetworkError {
            method,
            url: url.to_string(),
            source,
        };

        debug!("Sending {} request to {}", method, url);
        let mut request = self.client.request(method.into(), url.clone());
        if let Some(fields) = form {
            trace!("Adding {} form fields to request", fields.len());
            request = request.form(fields);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(network_error)?;

        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let mut result = HttpResponse::new(final_url, status);
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                result.append_header(name.as_str(), value.to_string());
            }
        }

        result.body = response.text().await.map_err(network_error)?;
        result.elapsed = start.elapsed();

        debug!(
            "HTTP response received: {} {} ({} bytes in {:?})",
            status,
            result.url,
            result.body.len(),
            result.elapsed
        );
        Ok(result)
    }
}

#[async_trait::async_trait]
impl HttpClient for SiteSession {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpError> {
        self.send(HttpMethod::Get, url, None).await
    }

    async fn post_form(
        &self,
        url: &Url,
        fields: &[(String, String)],
    ) -> Result<HttpResponse, HttpError> {
        self.send(HttpMethod::Post, url, Some(fields)).await
    }
}

impl CookieStore for SiteSession {
    fn set_cookie(&self, site: &Url, name: &str, value: &str, path: &str) -> Result<(), HttpError> {
        let invalid = |reason: &str| HttpError::InvalidCookie {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "=;,".contains(c))
        {
            return Err(invalid("name contains a reserved character"));
        }
        if value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || ";,".contains(c))
        {
            return Err(invalid("value contains a reserved character"));
        }
        if site.host_str().is_none() {
            return Err(HttpError::InvalidUrl(format!("{} has no host", site)));
        }

        self.jar
            .add_cookie_str(&format!("{}={}; Path={}", name, value, path), site);
        debug!("Set cookie {} for {}", name, site);
        Ok(())
    }
}

/// Builds [`SiteSession`]s from a shared configuration
#[derive(Debug, Clone, Default)]
pub struct SiteSessionFactory {
    config: HttpConfig,
}

impl SiteSessionFactory {
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }
}

impl SessionFactory for SiteSessionFactory {
    fn create_session(&self) -> Result<Box<dyn Session>, HttpError> {
        Ok(Box::new(SiteSession::new(&self.config)?))
    }
}
