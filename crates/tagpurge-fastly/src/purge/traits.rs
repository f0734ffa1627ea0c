//! Purge backend trait definition.

use async_trait::async_trait;
use tagpurge_core::{PurgeMethod, ServiceId, SurrogateKey};

use super::CredentialCheck;
use crate::error::FastlyError;
use crate::sync::CredentialState;

/// A CDN able to validate its credentials and purge cached content.
///
/// Each purge is gated by the cached validation result in
/// [`CredentialState`]; a backend never sends a purge with credentials it
/// already knows to be invalid.
///
/// # Implementors
///
/// - `FastlyApi` - the Fastly REST API
///
/// # Example
///
/// ```ignore
/// use tagpurge_fastly::{FastlyApi, FastlyConfig, PurgeBackend};
///
/// let api = FastlyApi::new(config)?;
/// if api.validate_api_key().await {
///     api.purge_url("https://www.example.com/about").await?;
/// }
/// ```
#[async_trait]
pub trait PurgeBackend: Send + Sync {
    /// Checks the credentials against the CDN and records the outcome.
    ///
    /// Transport failures count as invalid credentials.
    async fn check_credentials(&self) -> CredentialCheck;

    /// Returns true if the credentials may purge.
    async fn validate_api_key(&self) -> bool {
        self.check_credentials().await.is_valid()
    }

    /// Purges everything cached for the service.
    async fn purge_all(&self) -> Result<(), FastlyError>;

    /// Purges a single URL.
    async fn purge_url(&self, url: &str) -> Result<(), FastlyError>;

    /// Purges every object tagged with any of `keys`.
    ///
    /// An empty slice succeeds without contacting the CDN.
    async fn purge_keys(&self, keys: &[SurrogateKey]) -> Result<(), FastlyError>;

    /// Returns the cached credential state.
    fn state(&self) -> &CredentialState;

    /// Returns the name of this backend, for logs and diagnostics.
    fn name(&self) -> &str;

    /// Returns the service being purged, if configured.
    fn service_id(&self) -> Option<&ServiceId> {
        None
    }

    /// Returns how purged objects are removed.
    fn purge_method(&self) -> PurgeMethod {
        PurgeMethod::Instant
    }
}
