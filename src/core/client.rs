//! Public client surface + builder.
//!
//! The client owns the `reqwest::Client` and the endpoint bases; every other
//! module borrows it. Endpoint bases are overridable so tests can point the
//! client at a mock server.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use url::Url;

use crate::core::CcassError;

/// Default desktop UA to avoid trivial bot blocking.
pub(crate) const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/122.0.0.0 Safari/537.36"
);

/// Shareholding search page (one POST per ticker per date).
pub(crate) const DEFAULT_BASE_SDW: &str = "https://www3.hkexnews.hk/sdw/search/searchsdw.aspx";

/// JSON index of stock codes with shareholding data on a given date.
pub(crate) const DEFAULT_BASE_STOCK_LIST: &str =
    "https://www3.hkexnews.hk/sdw/search/stocklist.aspx";

/// JSON index of clearing participants on a given date.
pub(crate) const DEFAULT_BASE_PARTICIPANT_LIST: &str =
    "https://www.hkexnews.hk/sdw/search/partlist.aspx";

/// Overall request timeout applied when the builder does not override it.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CcassClient {
    http: Client,
    base_sdw: Url,
    base_stock_list: Url,
    base_participant_list: Url,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl Default for CcassClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl CcassClient {
    /// Create a new builder.
    pub fn builder() -> CcassClientBuilder {
        CcassClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
    pub(crate) fn base_sdw(&self) -> &Url {
        &self.base_sdw
    }
    pub(crate) fn base_stock_list(&self) -> &Url {
        &self.base_stock_list
    }
    pub(crate) fn base_participant_list(&self) -> &Url {
        &self.base_participant_list
    }

    /// Suspend until the rate limiter admits one more request. A client
    /// without a limiter never waits.
    ///
    /// Every outbound request goes through this, so retries and index lookups
    /// count against the same ceiling as the primary fetches.
    pub(crate) async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// A copy of this client sharing `limiter` with its siblings.
    pub(crate) fn with_limiter(&self, limiter: Arc<DefaultDirectRateLimiter>) -> Self {
        let mut client = self.clone();
        client.limiter = Some(limiter);
        client
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct CcassClientBuilder {
    user_agent: Option<String>,
    base_sdw: Option<Url>,
    base_stock_list: Option<Url>,
    base_participant_list: Option<Url>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    requests_per_second: Option<NonZeroU32>,
}

impl CcassClientBuilder {
    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the shareholding search endpoint.
    #[must_use]
    pub fn base_sdw(mut self, url: Url) -> Self {
        self.base_sdw = Some(url);
        self
    }

    /// Override the stock-list index endpoint.
    #[must_use]
    pub fn base_stock_list(mut self, url: Url) -> Self {
        self.base_stock_list = Some(url);
        self
    }

    /// Override the participant-list index endpoint.
    #[must_use]
    pub fn base_participant_list(mut self, url: Url) -> Self {
        self.base_participant_list = Some(url);
        self
    }

    /// Set a global request timeout (overall). Default: 30s.
    #[must_use]
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Cap outbound requests to `rps` per 1-second window. Requests beyond
    /// the ceiling suspend until the window rolls over. Default: no ceiling.
    #[must_use]
    pub fn requests_per_second(mut self, rps: NonZeroU32) -> Self {
        self.requests_per_second = Some(rps);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if a default endpoint fails to parse or the underlying
    /// HTTP client cannot be constructed.
    pub fn build(self) -> Result<CcassClient, CcassError> {
        let base_sdw = match self.base_sdw {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_SDW)?,
        };
        let base_stock_list = match self.base_stock_list {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_STOCK_LIST)?,
        };
        let base_participant_list = match self.base_participant_list {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_PARTICIPANT_LIST)?,
        };

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .cookie_store(true)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT));

        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        let http = httpb.build()?;

        let limiter = self
            .requests_per_second
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Ok(CcassClient {
            http,
            base_sdw,
            base_stock_list,
            base_participant_list,
            limiter,
        })
    }
}
