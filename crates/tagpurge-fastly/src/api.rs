//! Fastly API client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, header};
use serde::de::DeserializeOwned;
use tagpurge_core::hashing::join_keys;
use tagpurge_core::{PurgeMethod, ServiceId, SurrogateKey, SurrogateKeySet, TagpurgeError};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::FastlyConfig;
use crate::error::FastlyError;
use crate::purge::models::{CurrentUser, PurgeStatus, TokenInfo};
use crate::purge::{Authorization, CredentialCheck, PurgeBackend};
use crate::sync::CredentialState;

/// Header carrying the API token.
pub const FASTLY_KEY_HEADER: &str = "Fastly-Key";
/// Header carrying the keys to purge.
pub const SURROGATE_KEY_HEADER: &str = "Surrogate-Key";
/// Header turning a purge into a soft purge.
pub const SOFT_PURGE_HEADER: &str = "Fastly-Soft-Purge";
/// Most keys the API accepts in one purge request.
pub const MAX_KEYS_PER_REQUEST: usize = 256;

/// Fastly REST API client.
///
/// Cheap to share behind an `Arc`; the validation state is shared by every
/// clone of the handle.
pub struct FastlyApi {
    client: Client,
    config: FastlyConfig,
    state: Arc<CredentialState>,
}

impl FastlyApi {
    /// Creates a new client.
    pub fn new(config: FastlyConfig) -> Result<Self, FastlyError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("tagpurge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FastlyError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            config,
            state: Arc::new(CredentialState::new()),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FastlyConfig {
        &self.config
    }

    fn service(&self) -> Result<&ServiceId, FastlyError> {
        self.config
            .service_id()
            .ok_or(FastlyError::NotConfigured("service_id"))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, FastlyError> {
        let key = self
            .config
            .api_key()
            .ok_or(FastlyError::NotConfigured("api_key"))?;
        let url = format!("{}/{}", self.config.api_url(), path.trim_start_matches('/'));

        Ok(self
            .client
            .request(method, url)
            .header(FASTLY_KEY_HEADER, key.expose())
            .header(header::ACCEPT, "application/json"))
    }

    fn purge_request(&self, path: &str) -> Result<RequestBuilder, FastlyError> {
        let request = self.request(Method::POST, path)?;
        Ok(match self.config.purge_method() {
            PurgeMethod::Soft => request.header(SOFT_PURGE_HEADER, "1"),
            PurgeMethod::Instant => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, FastlyError> {
        let response = request
            .send()
            .await
            .map_err(|e| FastlyError::from_reqwest(e, self.config.timeout().as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FastlyError::api(status.as_u16(), body));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, FastlyError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| FastlyError::Decode(e.to_string()))
    }

    async fn try_check_credentials(&self) -> Result<CredentialCheck, FastlyError> {
        if self.config.api_key().is_none() {
            return Ok(CredentialCheck::invalid("API key is not configured"));
        }
        if self.config.service_id().is_none() {
            return Ok(CredentialCheck::invalid("service id is not configured"));
        }

        let token: TokenInfo = self
            .send_json(self.request(Method::GET, "/tokens/self")?)
            .await?;
        let scopes = token.scopes();
        debug!(scopes = %scopes, "Fetched token scopes");

        if scopes.grants_purge() {
            return Ok(CredentialCheck::Valid {
                via: Authorization::PurgeScopes,
            });
        }

        if !scopes.is_global() {
            return Ok(CredentialCheck::invalid(format!(
                "token scopes '{}' do not allow purging",
                scopes
            )));
        }

        let user: CurrentUser = self
            .send_json(self.request(Method::GET, "/current_user")?)
            .await?;

        if user.role.can_purge() {
            Ok(CredentialCheck::Valid {
                via: Authorization::GlobalRole { role: user.role },
            })
        } else {
            Ok(CredentialCheck::invalid(format!(
                "global token owned by role '{}' cannot purge",
                user.role
            )))
        }
    }

    /// Fails unless the cached validation says the credentials may purge,
    /// revalidating first when the cached result is missing or stale.
    async fn ensure_valid(&self) -> Result<(), FastlyError> {
        let stale = match self.config.validation_ttl() {
            Some(ttl) => self.state.needs_revalidation(ttl),
            None => !self.state.is_checked(),
        };

        if stale {
            self.check_credentials().await;
        }

        if self.state.is_valid() {
            Ok(())
        } else {
            Err(FastlyError::InvalidCredentials)
        }
    }

    async fn try_purge_all(&self) -> Result<(), FastlyError> {
        let path = format!("/service/{}/purge_all", self.service()?);
        let status: PurgeStatus = self.send_json(self.request(Method::POST, &path)?).await?;

        if status.is_ok() {
            Ok(())
        } else {
            Err(FastlyError::PurgeRejected {
                operation: "purge all",
                status: status.status,
            })
        }
    }

    async fn try_purge_url(&self, url: &str) -> Result<(), FastlyError> {
        let target = purge_target(url)?;
        let status: PurgeStatus = self
            .send_json(self.purge_request(&format!("/purge/{}", target))?)
            .await?;

        if status.is_ok() {
            Ok(())
        } else {
            Err(FastlyError::PurgeRejected {
                operation: "purge url",
                status: status.status,
            })
        }
    }

    async fn try_purge_keys(&self, keys: &SurrogateKeySet) -> Result<(), FastlyError> {
        let path = format!("/service/{}/purge", self.service()?);

        for batch in keys.batches(MAX_KEYS_PER_REQUEST) {
            let request = self
                .purge_request(&path)?
                .header(SURROGATE_KEY_HEADER, join_keys(batch));
            self.send(request).await?;
            debug!(count = batch.len(), "Purged surrogate key batch");
        }

        Ok(())
    }

    /// Runs a gated purge, recording and logging its outcome.
    async fn gated<F, Fut>(&self, operation: &str, purge: F) -> Result<(), FastlyError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<(), FastlyError>>,
    {
        // Refused purges never reach the API and are not counted.
        if let Err(e) = self.ensure_valid().await {
            warn!(operation, "Purge skipped, credentials are not valid");
            return Err(e);
        }

        match purge().await {
            Ok(()) => {
                self.state.record_purge(true);
                info!(operation, "Fastly purge succeeded");
                Ok(())
            },
            Err(e) => {
                self.state.record_purge(false);
                error!(operation, error = %e, "Fastly purge failed");
                Err(e)
            },
        }
    }
}

#[async_trait]
impl PurgeBackend for FastlyApi {
    async fn check_credentials(&self) -> CredentialCheck {
        let check = self
            .try_check_credentials()
            .await
            .unwrap_or_else(|e| CredentialCheck::invalid(e.to_string()));

        match &check {
            CredentialCheck::Valid { via } => {
                self.state.record_valid();
                info!(?via, "Fastly API credentials are valid");
            },
            CredentialCheck::Invalid { reason } => {
                self.state.record_invalid(reason.clone());
                warn!(reason = %reason, "Fastly API credentials are not valid");
            },
        }

        check
    }

    async fn purge_all(&self) -> Result<(), FastlyError> {
        self.gated("purge all", || self.try_purge_all()).await
    }

    async fn purge_url(&self, url: &str) -> Result<(), FastlyError> {
        // Bad input is rejected before the credential gate.
        purge_target(url)?;
        self.gated("purge url", || self.try_purge_url(url)).await
    }

    async fn purge_keys(&self, keys: &[SurrogateKey]) -> Result<(), FastlyError> {
        let keys: SurrogateKeySet = keys.iter().cloned().collect();
        if keys.is_empty() {
            debug!("No surrogate keys to purge");
            return Ok(());
        }

        self.gated("purge keys", || self.try_purge_keys(&keys)).await
    }

    fn state(&self) -> &CredentialState {
        &self.state
    }

    fn name(&self) -> &str {
        "fastly"
    }

    fn service_id(&self) -> Option<&ServiceId> {
        self.config.service_id()
    }

    fn purge_method(&self) -> PurgeMethod {
        self.config.purge_method()
    }
}

impl std::fmt::Debug for FastlyApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastlyApi")
            .field("api_url", &self.config.api_url())
            .field("service_id", &self.config.service_id())
            .field("valid", &self.state.valid())
            .finish()
    }
}

/// Turns a page URL into the path segment of a `POST /purge/...` call.
fn purge_target(raw: &str) -> Result<String, TagpurgeError> {
    let url = Url::parse(raw.trim()).map_err(|e| TagpurgeError::invalid_url(raw, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TagpurgeError::invalid_url(
            raw,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    let host = url
        .host_str()
        .ok_or_else(|| TagpurgeError::invalid_url(raw, "missing host"))?;

    let mut target = host.to_string();
    if let Some(port) = url.port() {
        target.push_str(&format!(":{}", port));
    }
    target.push_str(url.path());
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    Ok(target)
}
