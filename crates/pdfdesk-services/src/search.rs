//! Question/answer history over the semantic search endpoint.

use pdfdesk_api_client::ApiClient;
use pdfdesk_core::models::{
    is_valid_threshold, normalize_query, SearchExchange, DEFAULT_SEARCH_THRESHOLD,
};
use pdfdesk_core::{ClientError, ClientResult};

pub struct SearchSession {
    threshold: f64,
    history: Vec<SearchExchange>,
}

impl SearchSession {
    pub fn new(threshold: f64) -> ClientResult<Self> {
        if !is_valid_threshold(threshold) {
            return Err(ClientError::InvalidInput(format!(
                "Threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        Ok(Self {
            threshold,
            history: Vec::new(),
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) -> ClientResult<()> {
        if !is_valid_threshold(threshold) {
            return Err(ClientError::InvalidInput(format!(
                "Threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        self.threshold = threshold;
        Ok(())
    }

    /// Ask one question. Only answered questions are added to the history.
    pub async fn ask(&mut self, api: &ApiClient, query: &str) -> ClientResult<&SearchExchange> {
        let response = api.search(query, self.threshold).await?;
        tracing::debug!(file = %response.file.file_name, "Search answered");
        self.history.push(SearchExchange {
            query: normalize_query(query).unwrap_or_default(),
            threshold: self.threshold,
            file: response.file,
            response: response.response,
        });
        self.history
            .last()
            .ok_or_else(|| ClientError::InvalidResponse("Search history is empty".to_string()))
    }

    pub fn history(&self) -> &[SearchExchange] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SEARCH_THRESHOLD,
            history: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pdfdesk_api_client::Auth;
    use std::time::Duration;

    const MATCH: &str = r#"{
        "file": {
            "file_id": "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
            "file_name": "policy.pdf",
            "s3_uri": "s3://bucket/policy.pdf",
            "cdn_url": "https://cdn.example/policy.pdf",
            "file_status": "COMPLETED",
            "processed_flag": true,
            "created_at": "2025-03-01T10:00:00Z"
        },
        "response": "Refunds are accepted within 30 days."
    }"#;

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(SearchSession::new(1.5).is_err());
        let mut session = SearchSession::default();
        assert_eq!(session.threshold(), DEFAULT_SEARCH_THRESHOLD);
        assert!(session.set_threshold(-0.1).is_err());
        session.set_threshold(0.9).unwrap();
        assert_eq!(session.threshold(), 0.9);
    }

    #[tokio::test]
    async fn answered_questions_are_kept_in_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/search/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "refund policy".into()),
                Matcher::UrlEncoded("threshold".into(), "0.8".into()),
            ]))
            .with_status(200)
            .with_body(MATCH)
            .create_async()
            .await;
        server
            .mock("GET", "/api/search/")
            .match_query(Matcher::UrlEncoded("query".into(), "weather".into()))
            .with_status(404)
            .with_body(r#"{"error":"No relevant document found."}"#)
            .create_async()
            .await;

        let api = ApiClient::new(server.url(), Auth::None, Duration::from_secs(5)).unwrap();
        let mut session = SearchSession::new(0.8).unwrap();

        let exchange = session.ask(&api, "refund policy").await.unwrap();
        assert_eq!(exchange.file.file_name, "policy.pdf");

        let err = session.ask(&api, "weather").await.unwrap_err();
        assert_eq!(err.user_message(), "No relevant document found.");

        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].query, "refund policy");
        assert_eq!(session.history()[0].threshold, 0.8);

        session.clear();
        assert!(session.history().is_empty());
    }
}
