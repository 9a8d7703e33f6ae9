//! Process-wide authentication state.
//!
//! [`SessionState`] is created once, initialised once against the backend's
//! session check, and handed to whatever needs an authorised client. Logout
//! tears it down explicitly.

use chrono::Utc;
use pdfdesk_api_client::{ApiClient, Auth, IdentityClient};
use pdfdesk_core::models::StoredSession;
use pdfdesk_core::{ClientError, ClientResult};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::json_file;

/// Persists the current session between CLI invocations.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> ClientResult<Option<StoredSession>> {
        json_file::read(&self.path).await
    }

    pub async fn save(&self, session: &StoredSession) -> ClientResult<()> {
        json_file::write(&self.path, session).await
    }

    pub async fn clear(&self) -> ClientResult<()> {
        json_file::remove(&self.path).await
    }
}

#[derive(Default)]
struct Inner {
    initialized: bool,
    authenticated: bool,
    session: Option<StoredSession>,
}

pub struct SessionState {
    store: SessionStore,
    inner: RwLock<Inner>,
}

impl SessionState {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Check the stored session against the backend.
    ///
    /// Runs the session check at most once per state; later calls return the
    /// cached answer. A transport failure counts as unauthenticated but keeps
    /// the stored token. A token the backend rejects is discarded.
    pub async fn initialize(&self, api: &ApiClient) -> ClientResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.initialized {
            return Ok(inner.authenticated);
        }

        let stored = self.store.load().await?;
        let auth = match &stored {
            Some(session) => Auth::SessionCookie(session.id_token.clone()),
            None => Auth::None,
        };
        let authenticated = match api.with_auth(auth).check_session().await {
            Ok(true) => {
                inner.session = stored;
                true
            }
            Ok(false) => {
                if stored.is_some() {
                    tracing::info!("Stored session is no longer valid");
                    self.store.clear().await?;
                }
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed");
                false
            }
        };

        inner.authenticated = authenticated && inner.session.is_some();
        inner.initialized = true;
        Ok(inner.authenticated)
    }

    /// Password login: identity provider first, then the backend session.
    pub async fn login(
        &self,
        identity: &IdentityClient,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> ClientResult<StoredSession> {
        let tokens = identity.initiate_auth(email, password).await?;
        api.login(&tokens.id_token).await?;

        let session = StoredSession {
            id_token: tokens.id_token,
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.store.save(&session).await?;

        let mut inner = self.inner.write().await;
        inner.initialized = true;
        inner.authenticated = true;
        inner.session = Some(session.clone());
        tracing::info!(email, "Logged in");
        Ok(session)
    }

    /// End the session. The backend call is best effort; local state is
    /// always cleared.
    pub async fn logout(&self, api: &ApiClient) -> ClientResult<()> {
        let mut inner = self.inner.write().await;
        let session = match inner.session.take() {
            Some(session) => Some(session),
            None => self.store.load().await?,
        };
        if let Some(session) = &session {
            if let Err(e) = api
                .with_auth(Auth::SessionCookie(session.id_token.clone()))
                .logout()
                .await
            {
                tracing::warn!(error = %e, "Backend logout failed");
            }
        }

        self.store.clear().await?;
        inner.authenticated = false;
        inner.initialized = true;
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.authenticated
    }

    pub async fn email(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.email.clone())
    }

    /// `api` carrying the session cookie, or `Unauthorized` when logged out.
    pub async fn authorized_client(&self, api: &ApiClient) -> ClientResult<ApiClient> {
        let inner = self.inner.read().await;
        match (&inner.session, inner.authenticated) {
            (Some(session), true) => Ok(api.with_auth(Auth::SessionCookie(session.id_token.clone()))),
            _ => Err(ClientError::Unauthorized(
                "Not logged in. Run `pdfdesk login` first.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn api(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(server.url(), Auth::None, Duration::from_secs(5)).unwrap()
    }

    fn stored(token: &str) -> StoredSession {
        StoredSession {
            id_token: token.to_string(),
            email: "ana@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert!(store.load().await.unwrap().is_none());

        store.save(&stored("tok")).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().id_token, "tok");

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_session_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(SessionStore::new(path).load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn initialize_checks_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/auth/session/")
            .match_header("cookie", "id_token=tok")
            .with_status(200)
            .with_body(r#"{"authenticated":true}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&stored("tok")).await.unwrap();
        let state = SessionState::new(store);

        assert!(state.initialize(&api(&server)).await.unwrap());
        assert!(state.initialize(&api(&server)).await.unwrap());
        mock.assert_async().await;

        assert_eq!(state.email().await.as_deref(), Some("ana@example.com"));
        let client = state.authorized_client(&api(&server)).await.unwrap();
        assert_eq!(client.auth(), &Auth::SessionCookie("tok".into()));
    }

    #[tokio::test]
    async fn rejected_session_is_discarded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/session/")
            .with_status(401)
            .with_body(r#"{"detail":"Authentication credentials were not provided."}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&stored("expired")).await.unwrap();
        let state = SessionState::new(store.clone());

        assert!(!state.initialize(&api(&server)).await.unwrap());
        assert!(store.load().await.unwrap().is_none());
        let err = state.authorized_client(&api(&server)).await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_means_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let state = SessionState::new(SessionStore::new(dir.path().join("session.json")));
        let api = ApiClient::new(
            "http://127.0.0.1:9".to_string(),
            Auth::None,
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(!state.initialize(&api).await.unwrap());
        assert!(!state.is_authenticated().await);
    }

    #[tokio::test]
    async fn unreachable_backend_keeps_stored_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&stored("still-valid")).await.unwrap();
        let state = SessionState::new(store.clone());
        let api = ApiClient::new(
            "http://127.0.0.1:9".to_string(),
            Auth::None,
            Duration::from_secs(2),
        )
        .unwrap();

        assert!(!state.initialize(&api).await.unwrap());
        let kept = store.load().await.unwrap();
        assert_eq!(kept.map(|s| s.id_token).as_deref(), Some("still-valid"));
    }

    #[tokio::test]
    async fn login_then_logout() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/idp/")
            .match_header("x-amz-target", "AWSCognitoIdentityProviderService.InitiateAuth")
            .with_status(200)
            .with_body(r#"{"AuthenticationResult":{"IdToken":"fresh.jwt"}}"#)
            .create_async()
            .await;
        let backend_login = server
            .mock("POST", "/api/auth/login/")
            .match_body(Matcher::Json(serde_json::json!({"token": "fresh.jwt"})))
            .with_status(200)
            .with_body(r#"{"message":"Login successful"}"#)
            .create_async()
            .await;
        let backend_logout = server
            .mock("POST", "/api/auth/logout/")
            .match_header("cookie", "id_token=fresh.jwt")
            .with_status(200)
            .with_body(r#"{"message":"Logged out"}"#)
            .create_async()
            .await;

        let identity = IdentityClient::new(
            format!("{}/idp/", server.url()),
            "client".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let state = SessionState::new(store.clone());

        let session = state
            .login(&identity, &api(&server), "ana@example.com", "pw")
            .await
            .unwrap();
        backend_login.assert_async().await;
        assert_eq!(session.id_token, "fresh.jwt");
        assert!(state.is_authenticated().await);
        assert_eq!(store.load().await.unwrap().unwrap().id_token, "fresh.jwt");

        state.logout(&api(&server)).await.unwrap();
        backend_logout.assert_async().await;
        assert!(!state.is_authenticated().await);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_survives_backend_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/logout/")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&stored("tok")).await.unwrap();
        let state = SessionState::new(store.clone());

        state.logout(&api(&server)).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
