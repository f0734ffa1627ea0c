//! Fastly API response bodies.

use serde::Deserialize;
use tagpurge_core::{TokenScope, TokenScopes, UserRole};

/// Body of `GET /tokens/self`.
///
/// Scopes arrive either as a space separated `scope` string or as a
/// `scopes` array, depending on the API version.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenInfo {
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
}

impl TokenInfo {
    pub fn scopes(&self) -> TokenScopes {
        let from_string = self.scope.iter().flat_map(|s| s.split_whitespace());
        let from_array = self.scopes.iter().flatten().map(String::as_str);

        from_string.chain(from_array).map(TokenScope::from).collect()
    }
}

/// Body of `GET /current_user`.
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentUser {
    pub role: UserRole,
}

/// Body of `POST /service/{id}/purge_all` and `POST /purge/{url}`.
#[derive(Debug, Deserialize)]
pub(crate) struct PurgeStatus {
    pub status: String,
}

impl PurgeStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
