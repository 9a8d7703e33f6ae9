//! HTTP clients for the pdfdesk collaborators.
//!
//! - [`ApiClient`]: the backend REST API (session, upload tickets, file
//!   listing, deletion, search, user registration) with configurable auth.
//! - [`PresignedStorageClient`]: single-request writes to presigned URLs.
//! - [`IdentityClient`]: the identity provider's user-pool API.

pub mod api;
pub mod identity;
pub mod storage;

use pdfdesk_core::{ClientConfig, ClientError, ClientResult, ErrorBody};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use identity::IdentityClient;
pub use storage::PresignedStorageClient;

/// API path prefix.
pub const API_PREFIX: &str = "/api";

/// Authentication strategy for the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Auth {
    /// No credentials (login, registration, public listing).
    None,
    /// `Cookie: id_token={token}`, the cookie the backend sets on login.
    SessionCookie(String),
    /// `Authorization: Bearer {token}`
    Bearer(String),
}

/// HTTP client for the backend API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Unauthenticated client for the configured backend.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(config.api_url.clone(), Auth::None, config.http_timeout())
    }

    /// Same connection pool and base URL, different credentials.
    pub fn with_auth(&self, auth: Auth) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::None => request,
            Auth::SessionCookie(token) => request.header("Cookie", format!("id_token={}", token)),
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
        }
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        self.apply_auth(request)
            .send()
            .await
            .map_err(transport_error)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        self.get_with(path, query, |body| body.detail_or("API request failed"))
            .await
    }

    /// GET with a caller-chosen error message extractor.
    async fn get_with<T, F>(&self, path: &str, query: &[(&str, String)], message: F) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&ErrorBody) -> String,
    {
        let url = self.build_url(path);
        tracing::debug!(%url, "GET");
        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = self.send(request).await?;
        let response = ensure_success(response, message).await?;
        decode_json(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.post_json_with(path, body, |body| body.detail_or("API request failed"))
            .await
    }

    /// POST with a caller-chosen error message extractor.
    async fn post_json_with<T, B, F>(&self, path: &str, body: &B, message: F) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize,
        F: FnOnce(&ErrorBody) -> String,
    {
        let url = self.build_url(path);
        tracing::debug!(%url, "POST");
        let response = self.send(self.client.post(&url).json(body)).await?;
        let response = ensure_success(response, message).await?;
        decode_json(response).await
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let url = self.build_url(path);
        tracing::debug!(%url, "DELETE");
        let response = self.send(self.client.delete(&url)).await?;
        ensure_success(response, |body| body.detail_or("API request failed")).await?;
        Ok(())
    }

    /// Underlying reqwest client. Requests built from it carry no auth.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map a reqwest failure that happened before any response arrived.
pub(crate) fn transport_error(error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout
    } else if error.is_connect() {
        ClientError::Network(format!("Connection failed: {}", error))
    } else {
        ClientError::Network(error.to_string())
    }
}

/// Pass successful responses through; turn failures into
/// [`ClientError::Status`] using `message` to pick the text out of the body.
pub(crate) async fn ensure_success<F>(response: Response, message: F) -> ClientResult<Response>
where
    F: FnOnce(&ErrorBody) -> String,
{
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body = ErrorBody::parse(&text);
    Err(ClientError::Status {
        status: status.as_u16(),
        message: message(&body),
    })
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let text = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&text).map_err(|e| {
        ClientError::InvalidResponse(format!("Failed to parse response as JSON: {}", e))
    })
}

// Re-export domain types for convenience.
pub use pdfdesk_core::models::{FileRecord, FileStatus, SearchResponse, UploadTicket};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_trims_trailing_slash() {
        let client = ApiClient::new(
            "http://localhost:8000/".to_string(),
            Auth::None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.build_url("/api/data/files/"),
            "http://localhost:8000/api/data/files/"
        );
    }

    #[test]
    fn with_auth_keeps_base_url() {
        let client = ApiClient::new(
            "http://localhost:8000".to_string(),
            Auth::None,
            Duration::from_secs(5),
        )
        .unwrap();
        let authed = client.with_auth(Auth::SessionCookie("tok".into()));
        assert_eq!(authed.base_url(), client.base_url());
        assert_eq!(authed.auth(), &Auth::SessionCookie("tok".into()));
        assert_eq!(client.auth(), &Auth::None);
    }

    #[tokio::test]
    async fn get_reports_status_and_detail() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/data/files/")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"You do not have permission to perform this action."}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), Auth::None, Duration::from_secs(5)).unwrap();
        let err = client
            .get::<serde_json::Value>("/api/data/files/", &[])
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.status(), Some(403));
        assert_eq!(
            err.user_message(),
            "You do not have permission to perform this action."
        );
    }

    #[tokio::test]
    async fn session_cookie_is_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/auth/session/")
            .match_header("cookie", "id_token=abc.def.ghi")
            .with_status(200)
            .with_body(r#"{"authenticated":true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(
            server.url(),
            Auth::SessionCookie("abc.def.ghi".into()),
            Duration::from_secs(5),
        )
        .unwrap();
        let body: serde_json::Value = client.get("/api/auth/session/", &[]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body["authenticated"], true);
    }

    #[tokio::test]
    async fn invalid_json_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), Auth::None, Duration::from_secs(5)).unwrap();
        let err = client
            .get::<serde_json::Value>("/api/", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
