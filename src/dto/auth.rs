use serde::{Deserialize, Serialize};

/// Body of the authentication response. The upstream system returns the
/// session token in either `code` or `token` depending on deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthResponse {
    pub fn into_token(self) -> Option<String> {
        self.code
            .or(self.token)
            .filter(|token| !token.trim().is_empty())
    }
}
