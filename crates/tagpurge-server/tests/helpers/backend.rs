//! Backend de prueba que registra las llamadas en vez de purgar.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tagpurge_core::{PurgeMethod, ServiceId, SurrogateKey};
use tagpurge_fastly::{Authorization, CredentialCheck, CredentialState, FastlyError, PurgeBackend};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    All,
    Url(String),
    Keys(Vec<String>),
}

/// Backend con credenciales y fallos configurables.
pub struct MockBackend {
    state: CredentialState,
    service_id: ServiceId,
    valid: bool,
    fail_purges: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    /// Backend con credenciales validas ya verificadas.
    pub fn valid() -> Self {
        let backend = Self::with(true, false);
        backend.state.record_valid();
        backend
    }

    /// Backend cuyas credenciales no pueden purgar.
    pub fn invalid() -> Self {
        let backend = Self::with(false, false);
        backend.state.record_invalid("token lacks purge scopes");
        backend
    }

    /// Backend valido cuyo CDN rechaza todos los purges.
    pub fn failing() -> Self {
        let backend = Self::with(true, true);
        backend.state.record_valid();
        backend
    }

    fn with(valid: bool, fail_purges: bool) -> Self {
        Self {
            state: CredentialState::new(),
            service_id: ServiceId::new("svc123"),
            valid,
            fail_purges,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Cada purge tarda `delay` antes de responder.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn purge(&self, call: Call) -> Result<(), FastlyError> {
        if !self.state.is_valid() {
            return Err(FastlyError::InvalidCredentials);
        }
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_purges {
            self.state.record_purge(false);
            Err(FastlyError::api(503, "service unavailable"))
        } else {
            self.state.record_purge(true);
            Ok(())
        }
    }
}

#[async_trait]
impl PurgeBackend for MockBackend {
    async fn check_credentials(&self) -> CredentialCheck {
        if self.valid {
            self.state.record_valid();
            CredentialCheck::Valid {
                via: Authorization::PurgeScopes,
            }
        } else {
            self.state.record_invalid("token lacks purge scopes");
            CredentialCheck::invalid("token lacks purge scopes")
        }
    }

    async fn purge_all(&self) -> Result<(), FastlyError> {
        self.purge(Call::All).await
    }

    async fn purge_url(&self, url: &str) -> Result<(), FastlyError> {
        if !url.starts_with("http") {
            return Err(tagpurge_core::TagpurgeError::invalid_url(url, "unsupported scheme").into());
        }
        self.purge(Call::Url(url.to_string())).await
    }

    async fn purge_keys(&self, keys: &[SurrogateKey]) -> Result<(), FastlyError> {
        if keys.is_empty() {
            return Ok(());
        }
        self.purge(Call::Keys(keys.iter().map(|k| k.to_string()).collect()))
            .await
    }

    fn state(&self) -> &CredentialState {
        &self.state
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn service_id(&self) -> Option<&ServiceId> {
        Some(&self.service_id)
    }

    fn purge_method(&self) -> PurgeMethod {
        PurgeMethod::Soft
    }
}
