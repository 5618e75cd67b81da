//! The WooCommerce account flow
//!
//! One iteration signs a customer in on a fresh session:
//!
//! 1. Load homepage
//! 2. Login: load `/my-account/` and submit the login form
//! 3. Load orders
//! 4. Load orders again, now likely warm in the object cache
//!
//! Think time is inserted between groups. Every group records exactly one
//! `status is 2xx` check.

use crate::error::FlowError;
use std::time::Duration;
use tracing::{debug, info_span, Instrument};
use url::Url;
use wooload_config::{CredentialsConfig, PauseConfig, ScenarioConfig, SiteConfig};
use wooload_core::checks::{CHECK_LOGIN_ACCEPTED, CHECK_NOT_LOGIN, CHECK_STATUS_OK};
use wooload_core::metrics::ERRORS;
use wooload_core::{
    apply_bypass_cookies, is_ok, page_is_not_login, rand, rand_duration,
    record_response_metrics, site_page, validate_site_url, LoginForm, MetricSink,
    ValidationError, LOGIN_FORM_CLASS,
};
use wooload_http::{HttpError, HttpResponse, Session};

pub const GROUP_SETUP: &str = "Setup";
pub const GROUP_HOMEPAGE: &str = "Load homepage";
pub const GROUP_LOGIN: &str = "Login";
pub const GROUP_ORDERS: &str = "Load orders";

const ACCOUNT_PATH: &str = "/my-account/";
const ORDERS_PATH: &str = "/my-account/orders/";

/// A configured account flow, shared read-only by every virtual user
#[derive(Debug, Clone)]
pub struct AccountFlow {
    site: Url,
    bypass_cache: bool,
    credentials: CredentialsConfig,
    pause: PauseConfig,
}

impl AccountFlow {
    pub fn new(site: Url) -> Self {
        Self {
            site,
            bypass_cache: false,
            credentials: CredentialsConfig::default(),
            pause: PauseConfig::default(),
        }
    }

    /// Build the flow from configuration, validating the site URL
    pub fn from_config(site: &SiteConfig, scenario: &ScenarioConfig) -> Result<Self, ValidationError> {
        let url = validate_site_url(site.url.as_deref())?;
        Ok(Self::new(url)
            .with_bypass_cache(site.bypass_cache)
            .with_credentials(site.credentials.clone())
            .with_pause(scenario.pause))
    }

    pub fn with_bypass_cache(mut self, bypass_cache: bool) -> Self {
        self.bypass_cache = bypass_cache;
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialsConfig) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_pause(mut self, pause: PauseConfig) -> Self {
        self.pause = pause;
        self
    }

    pub fn site(&self) -> &Url {
        &self.site
    }

    /// Run one full iteration on `session`, which must be fresh
    pub async fn run_iteration(
        &self,
        session: &dyn Session,
        sink: &dyn MetricSink,
    ) -> Result<(), FlowError> {
        if self.bypass_cache {
            apply_bypass_cookies(session, &self.site).map_err(|source| FlowError::Http {
                group: GROUP_SETUP,
                source,
            })?;
        }

        self.load_homepage(session, sink)
            .instrument(info_span!("group", name = GROUP_HOMEPAGE))
            .await?;
        self.think().await;

        self.login(session, sink)
            .instrument(info_span!("group", name = GROUP_LOGIN))
            .await?;
        self.think().await;

        self.load_orders(session, sink)
            .instrument(info_span!("group", name = GROUP_ORDERS))
            .await?;
        self.think().await;

        self.load_orders(session, sink)
            .instrument(info_span!("group", name = GROUP_ORDERS))
            .await
    }

    async fn load_homepage(&self, session: &dyn Session, sink: &dyn MetricSink) -> Result<(), FlowError> {
        let response = fetch(session, sink, GROUP_HOMEPAGE, &self.site).await?;
        expect_ok(sink, GROUP_HOMEPAGE, &response)?;
        record_response_metrics(sink, &response);
        Ok(())
    }

    async fn login(&self, session: &dyn Session, sink: &dyn MetricSink) -> Result<(), FlowError> {
        let page = fetch(session, sink, GROUP_LOGIN, &site_page(&self.site, ACCOUNT_PATH)).await?;
        if !is_ok(&page) {
            return Err(fail_status(sink, GROUP_LOGIN, &page));
        }
        record_response_metrics(sink, &page);

        let form = LoginForm::extract(&page, LOGIN_FORM_CLASS).map_err(|source| FlowError::Form {
            group: GROUP_LOGIN,
            source,
        })?;

        let username = self.username();
        debug!("Signing in as {}", username);
        let response = form
            .submit(
                session,
                &[
                    ("username", username.as_str()),
                    ("password", self.credentials.password.as_str()),
                    ("rememberme", self.credentials.remember.as_str()),
                ],
            )
            .await
            .map_err(|source| match source {
                wooload_core::FormError::Http(source) => transport_failure(sink, GROUP_LOGIN, source),
                source => FlowError::Form {
                    group: GROUP_LOGIN,
                    source,
                },
            })?;

        expect_ok(sink, GROUP_LOGIN, &response)?;

        let accepted = page_is_not_login(&response);
        sink.record_check(CHECK_LOGIN_ACCEPTED, accepted);
        if !accepted {
            return Err(FlowError::LoginRejected {
                group: GROUP_LOGIN,
                username,
            });
        }

        record_response_metrics(sink, &response);
        Ok(())
    }

    async fn load_orders(&self, session: &dyn Session, sink: &dyn MetricSink) -> Result<(), FlowError> {
        let url = site_page(&self.site, ORDERS_PATH);
        let response = fetch(session, sink, GROUP_ORDERS, &url).await?;
        expect_ok(sink, GROUP_ORDERS, &response)?;

        let signed_in = page_is_not_login(&response);
        sink.record_check(CHECK_NOT_LOGIN, signed_in);
        if !signed_in {
            return Err(FlowError::SessionLost {
                group: GROUP_ORDERS,
                url: response.url.to_string(),
            });
        }

        record_response_metrics(sink, &response);
        Ok(())
    }

    fn username(&self) -> String {
        format!(
            "{}{}",
            self.credentials.username_prefix,
            rand(self.credentials.first_user, self.credentials.last_user)
        )
    }

    fn think_time(&self) -> Duration {
        rand_duration(self.pause.min, self.pause.max)
    }

    async fn think(&self) {
        let pause = self.think_time();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}

async fn fetch(
    session: &dyn Session,
    sink: &dyn MetricSink,
    group: &'static str,
    url: &Url,
) -> Result<HttpResponse, FlowError> {
    session
        .get(url)
        .await
        .map_err(|source| transport_failure(sink, group, source))
}

/// Record the group's status check, failing the group on a non-2xx response
fn expect_ok(sink: &dyn MetricSink, group: &'static str, response: &HttpResponse) -> Result<(), FlowError> {
    if !is_ok(response) {
        return Err(fail_status(sink, group, response));
    }
    sink.record_check(CHECK_STATUS_OK, true);
    sink.add_rate(ERRORS, false);
    Ok(())
}

fn fail_status(sink: &dyn MetricSink, group: &'static str, response: &HttpResponse) -> FlowError {
    sink.record_check(CHECK_STATUS_OK, false);
    sink.add_rate(ERRORS, true);
    FlowError::UnexpectedStatus {
        group,
        url: response.url.to_string(),
        status: response.status,
    }
}

fn transport_failure(sink: &dyn MetricSink, group: &'static str, source: HttpError) -> FlowError {
    sink.add_rate(ERRORS, true);
    FlowError::Http { group, source }
}
