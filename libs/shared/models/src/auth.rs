use serde::{Deserialize, Serialize};

/// Claims carried by the provider session token. The token alone does not
/// identify an application user; `sub` is the provider user id and the
/// matching `users` row supplies name and role.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: Option<String>,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    pub aud: Option<String>,
}

/// The resolved actor behind a request: the application-level `users` row
/// matched to the session token. Handlers receive this as an explicit
/// parameter; there is no ambient current-user state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub active: bool,
}

impl Identity {
    pub fn is_role(&self, role: &str) -> bool {
        self.role == role
    }
}
