use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{header, StatusCode, Url};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{body_excerpt, CoreError};
use crate::rpc::types::{ClientConfig, Credentials, RawResponse, JSON_RPC_PATH};
use crate::rpc::Transport;

use super::connection::parse_endpoint;
use super::digest::{generate_cnonce, select_challenge, Challenge, DigestChallenge};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// The last challenge the daemon issued, reused so later calls can
/// authenticate on the first attempt.
struct CachedChallenge {
    challenge: Challenge,
    nonce_count: u32,
}

/// Credentials attached to a single POST.
enum Authorization {
    Digest(String),
    Basic,
}

/// JSON-RPC transport over HTTP(S) with challenge/response authentication.
///
/// The first POST goes out without credentials (or pre-authenticated from a
/// cached challenge). A `401` is answered exactly once; a second rejection
/// is an authentication error. Connection failures are never retried.
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    credentials: Option<Credentials>,
    limiter: Option<DirectRateLimiter>,
    challenge: RwLock<Option<CachedChallenge>>,
}

impl HttpTransport {
    /// Create a transport for `config.endpoint`.
    ///
    /// If `requests_per_second` is set, every outbound HTTP request counts
    /// against the limit, including the authentication retry.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let url = parse_endpoint(&config.endpoint)?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .tcp_nodelay(true)
            .build()
            .map_err(CoreError::Transport)?;

        let limiter = match config.requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            url,
            credentials: config.endpoint.credentials,
            limiter,
            challenge: RwLock::new(None),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    async fn post(
        &self,
        body: &[u8],
        authorization: Option<&Authorization>,
    ) -> Result<reqwest::Response, CoreError> {
        self.wait_for_rate_limit().await;

        let mut builder = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.to_vec());
        match (authorization, &self.credentials) {
            (Some(Authorization::Digest(value)), _) => {
                builder = builder.header(header::AUTHORIZATION, value);
            }
            (Some(Authorization::Basic), Some(creds)) => {
                builder = builder.basic_auth(&creds.username, Some(&creds.password));
            }
            _ => {}
        }

        builder.send().await.map_err(CoreError::Transport)
    }

    /// Authorization for the first attempt, taken from the cached challenge.
    async fn cached_authorization(&self) -> Option<Authorization> {
        let credentials = self.credentials.as_ref()?;
        let mut cache = self.challenge.write().await;
        let cached = cache.as_mut()?;
        cached.nonce_count = cached.nonce_count.wrapping_add(1);
        Some(authorize(&cached.challenge, credentials, cached.nonce_count))
    }

    /// Remember a freshly issued challenge and answer it.
    async fn accept_challenge(
        &self,
        challenge: Challenge,
        credentials: &Credentials,
    ) -> Authorization {
        let authorization = authorize(&challenge, credentials, 1);
        *self.challenge.write().await = Some(CachedChallenge {
            challenge,
            nonce_count: 1,
        });
        authorization
    }

    async fn auth_failure(&self, reason: impl Into<String>) -> CoreError {
        *self.challenge.write().await = None;
        CoreError::Authentication {
            url: self.url.to_string(),
            reason: reason.into(),
        }
    }
}

fn authorize(challenge: &Challenge, credentials: &Credentials, nonce_count: u32) -> Authorization {
    match challenge {
        Challenge::Digest(digest) => Authorization::Digest(digest_header(
            digest,
            credentials,
            nonce_count,
        )),
        Challenge::Basic => Authorization::Basic,
    }
}

fn digest_header(digest: &DigestChallenge, credentials: &Credentials, nonce_count: u32) -> String {
    digest.authorization(
        credentials,
        "POST",
        JSON_RPC_PATH,
        nonce_count,
        &generate_cnonce(),
    )
}

/// Turn a non-auth response into the raw body or a status error.
///
/// Error bodies are kept as a bounded excerpt; a body that cannot be read
/// is reported in its place.
async fn into_raw(response: reqwest::Response) -> Result<RawResponse, CoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = match response.text().await {
            Ok(text) => body_excerpt(&text),
            Err(e) => format!("<response body unreadable: {e}>"),
        };
        return Err(CoreError::HttpStatus { status, body });
    }

    let body = response.bytes().await.map_err(CoreError::Transport)?;
    Ok(RawResponse {
        status,
        body: body.to_vec(),
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, body: Vec<u8>) -> Result<RawResponse, CoreError> {
        let cached = self.cached_authorization().await;
        let preauthenticated = cached.is_some();
        let response = self.post(&body, cached.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return into_raw(response).await;
        }

        let Some(credentials) = &self.credentials else {
            return Err(self
                .auth_failure("daemon requires authentication but no credentials are configured")
                .await);
        };

        let challenge = select_challenge(
            response
                .headers()
                .get_all(header::WWW_AUTHENTICATE)
                .iter()
                .filter_map(|value| value.to_str().ok()),
        );
        let Some(challenge) = challenge else {
            warn!(url = %self.url, "401 without a supported WWW-Authenticate challenge");
            return Err(self
                .auth_failure("daemon sent no supported authentication challenge")
                .await);
        };

        debug!(
            url = %self.url,
            preauthenticated,
            digest = matches!(challenge, Challenge::Digest(_)),
            "auth challenge received; retrying once"
        );
        let authorization = self.accept_challenge(challenge, credentials).await;
        let retry = self.post(&body, Some(&authorization)).await?;

        match retry.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(self
                .auth_failure(format!(
                    "credentials for `{}` rejected ({})",
                    credentials.username,
                    retry.status()
                ))
                .await),
            _ => into_raw(retry).await,
        }
    }
}
