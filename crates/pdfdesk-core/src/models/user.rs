use serde::{Deserialize, Serialize};

/// Body of `POST /api/users/register/`, sent once the identity provider has
/// confirmed the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Identity-provider subject, empty when unknown.
    pub sub: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUserResponse {
    pub message: String,
    pub user_id: i64,
    pub email: String,
}

/// Body of `POST /api/auth/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub token: String,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Result of a sign-up with the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpResult {
    pub user_sub: String,
    pub user_confirmed: bool,
}

/// Where a confirmation or reset code was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeDelivery {
    pub destination: Option<String>,
    pub delivery_medium: Option<String>,
}

/// Tokens issued by the identity provider on a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub id_token: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}
