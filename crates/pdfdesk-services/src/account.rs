//! Account registration flow.
//!
//! Sign-up happens with the identity provider; the backend only learns about
//! the user once the emailed code is confirmed. The names given at sign-up are
//! kept in a pending-signup file until then.

use pdfdesk_api_client::{ApiClient, IdentityClient};
use pdfdesk_core::models::{RegisterUserRequest, RegisterUserResponse, SignUpResult};
use pdfdesk_core::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::json_file;

const PENDING_SIGNUP_FILE: &str = "pending_signup.json";

/// Sign-up form as entered by the user.
#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

impl SignUpForm {
    /// Local checks made before anything is sent.
    pub fn validate(&self) -> ClientResult<()> {
        if self.email.trim().is_empty() {
            return Err(ClientError::InvalidInput("Email is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(ClientError::InvalidInput("Password is required".to_string()));
        }
        if self.password != self.confirm_password {
            return Err(ClientError::InvalidInput("Passwords do not match".to_string()));
        }
        Ok(())
    }
}

/// Names and subject captured at sign-up, waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSignup {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub sub: String,
}

#[derive(Clone, Debug)]
pub struct PendingSignupStore {
    path: PathBuf,
}

impl PendingSignupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store next to the session file.
    pub fn beside(session_file: &Path) -> Self {
        Self::new(session_file.with_file_name(PENDING_SIGNUP_FILE))
    }

    /// Pending sign-up for `email`, if one was recorded.
    pub async fn load(&self, email: &str) -> ClientResult<Option<PendingSignup>> {
        let pending: Option<PendingSignup> = json_file::read(&self.path).await?;
        Ok(pending.filter(|p| p.email.eq_ignore_ascii_case(email.trim())))
    }

    pub async fn save(&self, pending: &PendingSignup) -> ClientResult<()> {
        json_file::write(&self.path, pending).await
    }

    pub async fn clear(&self) -> ClientResult<()> {
        json_file::remove(&self.path).await
    }
}

/// Validate the form, create the identity-provider account and remember the
/// names for [`confirm_and_register`].
pub async fn sign_up(
    identity: &IdentityClient,
    pending: &PendingSignupStore,
    form: &SignUpForm,
) -> ClientResult<SignUpResult> {
    form.validate()?;
    let email = form.email.trim();
    let result = identity
        .sign_up(email, &form.password, &form.first_name, &form.last_name)
        .await?;

    pending
        .save(&PendingSignup {
            email: email.to_string(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            sub: result.user_sub.clone(),
        })
        .await?;
    tracing::info!(email, confirmed = result.user_confirmed, "Signed up");
    Ok(result)
}

/// Confirm the emailed code, then register the user with the backend.
///
/// `names` overrides whatever the pending-signup file holds.
pub async fn confirm_and_register(
    identity: &IdentityClient,
    api: &ApiClient,
    pending: &PendingSignupStore,
    email: &str,
    code: &str,
    names: Option<(String, String)>,
) -> ClientResult<RegisterUserResponse> {
    let email = email.trim();
    if code.trim().is_empty() {
        return Err(ClientError::InvalidInput(
            "Confirmation code is required".to_string(),
        ));
    }
    identity.confirm_sign_up(email, code).await?;

    let recorded = pending.load(email).await?;
    let (first_name, last_name) = match (names, &recorded) {
        (Some(names), _) => names,
        (None, Some(p)) => (p.first_name.clone(), p.last_name.clone()),
        (None, None) => (String::new(), String::new()),
    };
    let request = RegisterUserRequest {
        email: email.to_string(),
        first_name,
        last_name,
        sub: recorded.map(|p| p.sub).unwrap_or_default(),
    };
    let response = api.register_user(&request).await?;

    pending.clear().await?;
    tracing::info!(email, user_id = response.user_id, "Registered with backend");
    Ok(response)
}
