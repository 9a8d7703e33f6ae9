//! Identity provider client (Cognito user-pool JSON API).
//!
//! Every call is an unauthenticated `POST` to the pool endpoint with the
//! operation named in `X-Amz-Target`. Failures carry the provider's exception
//! name and message verbatim.

use pdfdesk_core::models::{AuthTokens, CodeDelivery, SignUpResult};
use pdfdesk_core::{ClientConfig, ClientError, ClientResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{decode_json, transport_error};

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

#[derive(Clone, Debug)]
pub struct IdentityClient {
    client: Client,
    endpoint: String,
    client_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttributeType<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    password: &'a str,
    user_attributes: Vec<AttributeType<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    user_sub: String,
    #[serde(default)]
    user_confirmed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmSignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
    force_alias_creation: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UsernameRequest<'a> {
    client_id: &'a str,
    username: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmForgotPasswordRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
    password: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct CodeDeliveryResponse {
    #[serde(default)]
    code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CodeDeliveryDetails {
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    delivery_medium: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: HashMap<&'a str, &'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize, Default)]
struct ProviderError {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

impl IdentityClient {
    pub fn new(endpoint: String, client_id: String, timeout: Duration) -> ClientResult<Self> {
        if client_id.trim().is_empty() {
            return Err(ClientError::Config(
                "Identity provider client id is not configured".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            client_id,
        })
    }

    /// Requires `PDFDESK_COGNITO_CLIENT_ID`.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let client_id = config.cognito_client_id.clone().ok_or_else(|| {
            ClientError::Config("Set PDFDESK_COGNITO_CLIENT_ID to use account commands".to_string())
        })?;
        Self::new(config.cognito_endpoint(), client_id, config.http_timeout())
    }

    async fn call<B, T>(&self, operation: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        tracing::debug!(operation, "Identity provider call");
        let payload = serde_json::to_vec(body)?;
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .body(payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error: ProviderError = serde_json::from_str(&text).unwrap_or_default();
            let code = error
                .kind
                .as_deref()
                .map(|k| k.rsplit('#').next().unwrap_or(k).to_string())
                .unwrap_or_else(|| format!("HTTP{}", status.as_u16()));
            let message = error
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("{} failed", operation));
            return Err(ClientError::Identity { code, message });
        }

        decode_json(response).await
    }

    /// Register a new account. The provider emails a confirmation code.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ClientResult<SignUpResult> {
        let request = SignUpRequest {
            client_id: &self.client_id,
            username: email,
            password,
            user_attributes: vec![
                AttributeType {
                    name: "given_name",
                    value: first_name,
                },
                AttributeType {
                    name: "family_name",
                    value: last_name,
                },
            ],
        };
        let response: SignUpResponse = self.call("SignUp", &request).await?;
        Ok(SignUpResult {
            user_sub: response.user_sub,
            user_confirmed: response.user_confirmed,
        })
    }

    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> ClientResult<()> {
        let request = ConfirmSignUpRequest {
            client_id: &self.client_id,
            username: email,
            confirmation_code: code.trim(),
            force_alias_creation: true,
        };
        let _: IgnoredAny = self.call("ConfirmSignUp", &request).await?;
        Ok(())
    }

    pub async fn resend_confirmation_code(&self, email: &str) -> ClientResult<CodeDelivery> {
        let request = UsernameRequest {
            client_id: &self.client_id,
            username: email,
        };
        let response: CodeDeliveryResponse = self.call("ResendConfirmationCode", &request).await?;
        Ok(code_delivery(response))
    }

    /// Start a password reset; the provider sends a verification code.
    pub async fn forgot_password(&self, email: &str) -> ClientResult<CodeDelivery> {
        let request = UsernameRequest {
            client_id: &self.client_id,
            username: email,
        };
        let response: CodeDeliveryResponse = self.call("ForgotPassword", &request).await?;
        Ok(code_delivery(response))
    }

    pub async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> ClientResult<()> {
        let request = ConfirmForgotPasswordRequest {
            client_id: &self.client_id,
            username: email,
            confirmation_code: code.trim(),
            password: new_password,
        };
        let _: IgnoredAny = self.call("ConfirmForgotPassword", &request).await?;
        Ok(())
    }

    /// Password login. Challenges (MFA, forced password change) are not
    /// supported and reported as errors.
    pub async fn initiate_auth(&self, email: &str, password: &str) -> ClientResult<AuthTokens> {
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.client_id,
            auth_parameters: HashMap::from([("USERNAME", email), ("PASSWORD", password)]),
        };
        let response: InitiateAuthResponse = self.call("InitiateAuth", &request).await?;

        if let Some(challenge) = response.challenge_name {
            return Err(ClientError::Identity {
                code: challenge.clone(),
                message: format!("Authentication challenge {} is not supported", challenge),
            });
        }

        let result = response.authentication_result.ok_or_else(|| {
            ClientError::InvalidResponse("Authentication result missing".to_string())
        })?;
        let id_token = result
            .id_token
            .ok_or_else(|| ClientError::InvalidResponse("ID token missing".to_string()))?;

        Ok(AuthTokens {
            id_token,
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            expires_in: result.expires_in,
        })
    }
}

fn code_delivery(response: CodeDeliveryResponse) -> CodeDelivery {
    response
        .code_delivery_details
        .map(|d| CodeDelivery {
            destination: d.destination,
            delivery_medium: d.delivery_medium,
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn identity(server: &mockito::ServerGuard) -> IdentityClient {
        IdentityClient::new(
            format!("{}/", server.url()),
            "client-123".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn requires_client_id() {
        let err = IdentityClient::new(
            "http://localhost/".to_string(),
            " ".to_string(),
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));

        let err = IdentityClient::from_config(&ClientConfig::default()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn sign_up_sends_name_attributes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", "AWSCognitoIdentityProviderService.SignUp")
            .match_header("content-type", AMZ_JSON)
            .match_body(Matcher::Json(json!({
                "ClientId": "client-123",
                "Username": "ana@example.com",
                "Password": "Secr3t!pass",
                "UserAttributes": [
                    {"Name": "given_name", "Value": "Ana"},
                    {"Name": "family_name", "Value": "Lima"}
                ]
            })))
            .with_status(200)
            .with_body(r#"{"UserSub":"sub-1","UserConfirmed":false,"CodeDeliveryDetails":{}}"#)
            .create_async()
            .await;

        let result = identity(&server)
            .sign_up("ana@example.com", "Secr3t!pass", "Ana", "Lima")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(result.user_sub, "sub-1");
        assert!(!result.user_confirmed);
    }

    #[tokio::test]
    async fn provider_errors_are_passed_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_header(
                "x-amz-target",
                "AWSCognitoIdentityProviderService.ConfirmSignUp",
            )
            .with_status(400)
            .with_body(
                r#"{"__type":"com.amazonaws#CodeMismatchException","message":"Invalid verification code provided, please try again."}"#,
            )
            .create_async()
            .await;

        let err = identity(&server)
            .confirm_sign_up("ana@example.com", "000000")
            .await
            .unwrap_err();
        match err {
            ClientError::Identity { code, message } => {
                assert_eq!(code, "CodeMismatchException");
                assert_eq!(
                    message,
                    "Invalid verification code provided, please try again."
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn initiate_auth_returns_id_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_header("x-amz-target", "AWSCognitoIdentityProviderService.InitiateAuth")
            .match_body(Matcher::PartialJson(json!({
                "AuthFlow": "USER_PASSWORD_AUTH",
                "AuthParameters": {"USERNAME": "ana@example.com", "PASSWORD": "pw"}
            })))
            .with_status(200)
            .with_body(
                r#"{"AuthenticationResult":{"IdToken":"id.jwt","AccessToken":"acc","RefreshToken":"ref","ExpiresIn":3600,"TokenType":"Bearer"},"ChallengeParameters":{}}"#,
            )
            .create_async()
            .await;

        let tokens = identity(&server)
            .initiate_auth("ana@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(tokens.id_token, "id.jwt");
        assert_eq!(tokens.expires_in, Some(3600));
    }

    #[tokio::test]
    async fn initiate_auth_rejects_challenges() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"ChallengeName":"NEW_PASSWORD_REQUIRED","Session":"s"}"#)
            .create_async()
            .await;

        let err = identity(&server)
            .initiate_auth("ana@example.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Identity { ref code, .. } if code == "NEW_PASSWORD_REQUIRED"));
    }

    #[tokio::test]
    async fn forgot_password_reports_delivery() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_header("x-amz-target", "AWSCognitoIdentityProviderService.ForgotPassword")
            .with_status(200)
            .with_body(
                r#"{"CodeDeliveryDetails":{"Destination":"a***@e***","DeliveryMedium":"EMAIL","AttributeName":"email"}}"#,
            )
            .create_async()
            .await;

        let delivery = identity(&server)
            .forgot_password("ana@example.com")
            .await
            .unwrap();
        assert_eq!(delivery.destination.as_deref(), Some("a***@e***"));
        assert_eq!(delivery.delivery_medium.as_deref(), Some("EMAIL"));
    }
}
