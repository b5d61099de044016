//! Session authentication against the modem web interface
//!
//! The modem hands out a session cookie on an unauthenticated request to its
//! root page and only serves the status page when that cookie is presented
//! together with HTTP Basic credentials. Every poll cycle performs both
//! steps from scratch since the device rotates its token.

use crate::error::{MonitorError, Stage};
use crate::models::Credentials;
use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{redirect, Client};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// One `name=value` pair of the token cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub name: String,
    pub value: String,
    /// The device sent the value wrapped in double quotes
    pub quoted: bool,
}

impl CookiePair {
    /// Render as `name=value`, restoring quotes where the value needs them
    fn render(&self) -> String {
        if self.quoted || self.value.contains([' ', ',']) {
            format!("{}=\"{}\"", self.name, self.value)
        } else {
            format!("{}={}", self.name, self.value)
        }
    }
}

/// Cookie pairs captured from the token response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pairs: Vec<CookiePair>,
}

impl SessionToken {
    /// Parse the raw text of a `Set-Cookie` header.
    ///
    /// Every part must be a `name=value` pair; attributes such as `Path=/`
    /// are kept and returned to the device in order. A bare attribute like
    /// `HttpOnly` is rejected.
    pub fn parse(raw: &str) -> Result<Self, MonitorError> {
        let mut pairs = Vec::new();

        for part in raw.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let malformed = || MonitorError::MalformedCookie {
                pair: part.to_string(),
            };

            let (name, value) = part.split_once('=').ok_or_else(malformed)?;
            let name = name.trim();
            if !is_cookie_name(name) {
                return Err(malformed());
            }

            let (value, quoted) = match value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
            {
                Some(inner) => (inner, true),
                None => (value, false),
            };
            if !is_cookie_value(value) {
                return Err(malformed());
            }

            pairs.push(CookiePair {
                name: name.to_string(),
                value: value.to_string(),
                quoted,
            });
        }

        if pairs.is_empty() {
            return Err(MonitorError::MissingSessionCookie);
        }

        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[CookiePair] {
        &self.pairs
    }

    /// Render the pairs as a `Cookie` request header value
    pub fn cookie_header(&self) -> String {
        self.pairs
            .iter()
            .map(CookiePair::render)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// RFC 6265 token characters
fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
        })
}

/// Printable ASCII (space included) except `"`, `;` and `\`
fn is_cookie_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\')
}

/// Transport used by the authenticator to talk to the modem
#[async_trait]
pub trait ModemTransport: Send + Sync {
    /// Issue the unauthenticated token request and return the raw
    /// `Set-Cookie` header, if the device sent one
    async fn request_session_cookie(&self) -> Result<Option<String>, MonitorError>;

    /// Fetch the status page body with Basic credentials and the session cookie
    async fn fetch_status_page(
        &self,
        credentials: &Credentials,
        token: &SessionToken,
    ) -> Result<String, MonitorError>;
}

/// Two-step token-then-fetch protocol
#[derive(Clone)]
pub struct SessionAuthenticator {
    transport: Arc<dyn ModemTransport>,
    credentials: Credentials,
}

impl SessionAuthenticator {
    pub fn new(transport: Arc<dyn ModemTransport>, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Step one: obtain a fresh session token
    pub async fn acquire_token(&self) -> Result<SessionToken, MonitorError> {
        let raw = self
            .transport
            .request_session_cookie()
            .await?
            .ok_or(MonitorError::MissingSessionCookie)?;

        SessionToken::parse(&raw)
    }

    /// Run both steps and return the status page body
    pub async fn fetch_status_page(&self) -> Result<String, MonitorError> {
        let token = self.acquire_token().await?;
        debug!(cookies = token.pairs().len(), "Acquired session token");

        self.transport
            .fetch_status_page(&self.credentials, &token)
            .await
    }
}

/// reqwest-backed transport for a single modem
pub struct HttpTransport {
    token_client: Client,
    page_client: Client,
    root_url: Url,
    status_url: Url,
}

impl HttpTransport {
    /// Create a transport for `host` (a bare host, `host:port` or a full URL)
    pub fn new(host: &str, status_path: &str, timeout: Duration) -> Result<Self, MonitorError> {
        let root_url = device_url(host)?;
        let status_url = root_url
            .join(status_path)
            .map_err(|source| MonitorError::InvalidHost {
                host: host.to_string(),
                source,
            })?;

        let token_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MonitorError::Client)?;

        // The token is forwarded by hand; no redirects, no cookie store.
        let page_client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(MonitorError::Client)?;

        Ok(Self {
            token_client,
            page_client,
            root_url,
            status_url,
        })
    }
}

/// Build the device root URL, defaulting to plain HTTP
fn device_url(host: &str) -> Result<Url, MonitorError> {
    let host = host.trim();
    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}/", host.trim_end_matches('/'))
    };

    Url::parse(&candidate).map_err(|source| MonitorError::InvalidHost {
        host: host.to_string(),
        source,
    })
}

#[async_trait]
impl ModemTransport for HttpTransport {
    async fn request_session_cookie(&self) -> Result<Option<String>, MonitorError> {
        let response = self
            .token_client
            .get(self.root_url.clone())
            .send()
            .await
            .map_err(|source| MonitorError::Transport {
                stage: Stage::TokenAcquisition,
                source,
            })?;

        debug!(status = %response.status(), "Token request answered");

        Ok(response
            .headers()
            .get(SET_COOKIE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned()))
    }

    async fn fetch_status_page(
        &self,
        credentials: &Credentials,
        token: &SessionToken,
    ) -> Result<String, MonitorError> {
        let response = self
            .page_client
            .get(self.status_url.clone())
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header(COOKIE, token.cookie_header())
            .send()
            .await
            .map_err(|source| MonitorError::Transport {
                stage: Stage::AuthenticatedFetch,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::HttpStatus {
                stage: Stage::AuthenticatedFetch,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| MonitorError::Transport {
                stage: Stage::AuthenticatedFetch,
                source,
            })
    }
}
