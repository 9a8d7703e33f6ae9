//! Domain methods for the backend API client.

use async_trait::async_trait;
use pdfdesk_core::models::{
    is_valid_threshold, normalize_query, FileRecord, LoginRequest, MessageResponse,
    RegisterUserRequest, RegisterUserResponse, SearchResponse, UploadTicket, UploadTicketRequest,
    UploadTicketResponse,
};
use pdfdesk_core::{ClientError, ClientResult, TicketIssuer};
use reqwest::StatusCode;

use crate::{decode_json, ensure_success, ApiClient, API_PREFIX};

const UPLOAD_REQUEST_FAILED: &str = "Upload request failed";
const MISSING_UPLOAD_URL: &str = "Upload request response did not include an upload URL";
const NO_MATCH: &str = "No match found.";

impl ApiClient {
    /// Ask the backend whether the current credentials form a live session.
    ///
    /// 401/403 mean "not authenticated"; any other failure is an error.
    pub async fn check_session(&self) -> ClientResult<bool> {
        match self
            .get::<serde_json::Value>(&format!("{}/auth/session/", API_PREFIX), &[])
            .await
        {
            Ok(_) => Ok(true),
            Err(ClientError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Exchange an identity-provider ID token for a backend session.
    pub async fn login(&self, id_token: &str) -> ClientResult<MessageResponse> {
        let body = LoginRequest {
            token: id_token.to_string(),
        };
        self.post_json_with(&format!("{}/auth/login/", API_PREFIX), &body, |b| {
            b.error_or("Backend login failed")
        })
        .await
    }

    /// End the backend session.
    pub async fn logout(&self) -> ClientResult<MessageResponse> {
        self.post_json(
            &format!("{}/auth/logout/", API_PREFIX),
            &serde_json::json!({}),
        )
        .await
    }

    /// Register a confirmed identity-provider user with the backend.
    pub async fn register_user(
        &self,
        request: &RegisterUserRequest,
    ) -> ClientResult<RegisterUserResponse> {
        self.post_json_with(&format!("{}/users/register/", API_PREFIX), request, |b| {
            b.error_or("Registration failed")
        })
        .await
    }

    /// List stored files, newest first.
    pub async fn list_files(&self) -> ClientResult<Vec<FileRecord>> {
        self.get(&format!("{}/data/files/", API_PREFIX), &[]).await
    }

    /// Delete a file and everything derived from it.
    pub async fn delete_file(&self, file_id: &str) -> ClientResult<()> {
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return Err(ClientError::InvalidInput("File id must not be empty".to_string()));
        }
        self.delete(&format!(
            "{}/data/files/{}/",
            API_PREFIX,
            urlencoding::encode(file_id)
        ))
        .await
    }

    /// Semantic search over the stored documents.
    ///
    /// Blank queries and thresholds outside `[0, 1]` are rejected without a
    /// request.
    pub async fn search(&self, query: &str, threshold: f64) -> ClientResult<SearchResponse> {
        let query = normalize_query(query)
            .ok_or_else(|| ClientError::InvalidInput("Search query must not be empty".to_string()))?;
        if !is_valid_threshold(threshold) {
            return Err(ClientError::InvalidInput(format!(
                "Threshold must be between 0 and 1, got {}",
                threshold
            )));
        }

        let params = [("query", query), ("threshold", threshold.to_string())];
        self.get_with(&format!("{}/search/", API_PREFIX), &params, |b| {
            b.error_or(NO_MATCH)
        })
        .await
    }
}

#[async_trait]
impl TicketIssuer for ApiClient {
    async fn request_upload_ticket(
        &self,
        request: &UploadTicketRequest,
    ) -> ClientResult<UploadTicket> {
        let url = self.build_url(&format!("{}/uploads/upload-request/", API_PREFIX));
        tracing::debug!(%url, file_name = %request.file_name, "Requesting upload ticket");

        let response = self.send(self.client().post(&url).json(request)).await?;
        let status = response.status().as_u16();
        let response = ensure_success(response, |b| b.detail_or(UPLOAD_REQUEST_FAILED)).await?;
        let body: UploadTicketResponse = decode_json(response).await?;

        match body.upload_url.filter(|u| !u.trim().is_empty()) {
            Some(upload_url) => Ok(UploadTicket { upload_url }),
            None => Err(ClientError::Status {
                status,
                message: body
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| MISSING_UPLOAD_URL.to_string()),
            }),
        }
    }
}
