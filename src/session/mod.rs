//! Session/identity store
//!
//! Holds the signed-in principal and its bearer credential for a client of
//! the gateway, and keeps a snapshot in a [`SnapshotStore`] so the session survives restarts.

pub mod store;

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    gateway::Authenticator,
    models::user::{AuthResponse, Credential, Principal},
};

pub use store::{MemorySnapshotStore, SnapshotError, SnapshotStore, SqliteSnapshotStore};

/// Well-known key of the persisted session snapshot
pub const SESSION_KEY: &str = "lendpool_auth_v2";

/// Persisted form of a session: `{"token": ..., "principal": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub token: Credential,
    #[serde(alias = "user")]
    pub principal: Principal,
}

impl From<AuthResponse> for SessionSnapshot {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            principal: response.principal,
        }
    }
}

/// Explicit session context, passed to whatever issues gateway calls
pub struct SessionContext {
    current: RwLock<Option<SessionSnapshot>>,
    store: Arc<dyn SnapshotStore>,
}

impl SessionContext {
    /// Empty session backed by `store`; call [`restore`](Self::restore) to pick up a prior one
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            current: RwLock::new(None),
            store,
        }
    }

    /// Build a context and restore any persisted session
    pub async fn open(store: Arc<dyn SnapshotStore>) -> Self {
        let context = Self::new(store);
        context.restore().await;
        context
    }

    /// Sign in through `authenticator` and persist the resulting session
    pub async fn login(
        &self,
        authenticator: &dyn Authenticator,
        username: &str,
        password: &str,
    ) -> AppResult<(Credential, Principal)> {
        let response = authenticator.login(username, password).await?;
        Ok(self.establish(response).await)
    }

    /// Adopt a session obtained elsewhere, e.g. from registration
    pub async fn establish(&self, response: AuthResponse) -> (Credential, Principal) {
        let snapshot = SessionSnapshot::from(response);
        self.persist(&snapshot).await;
        self.replace(snapshot)
    }

    /// Rebuild the session from the persisted snapshot.
    ///
    /// Unreadable or malformed data is discarded and treated as no session.
    pub async fn restore(&self) -> Option<(Credential, Principal)> {
        let raw = match self.store.load(SESSION_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read session snapshot: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<SessionSnapshot>(&raw) {
            Ok(snapshot) => {
                self.persist(&snapshot).await;
                Some(self.replace(snapshot))
            }
            Err(e) => {
                tracing::warn!("Discarding malformed session snapshot: {}", e);
                if let Err(e) = self.store.delete(SESSION_KEY).await {
                    tracing::warn!("Failed to remove session snapshot: {}", e);
                }
                *self.current.write() = None;
                None
            }
        }
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.current.read().as_ref().map(|s| s.principal.clone())
    }

    pub fn credential(&self) -> Option<Credential> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .read()
            .as_ref()
            .map(|s| s.principal.is_admin())
            .unwrap_or(false)
    }

    /// Forget the session in memory and in the store
    pub async fn logout(&self) {
        *self.current.write() = None;
        if let Err(e) = self.store.delete(SESSION_KEY).await {
            tracing::warn!("Failed to remove session snapshot: {}", e);
        }
    }

    fn replace(&self, snapshot: SessionSnapshot) -> (Credential, Principal) {
        let result = (snapshot.token.clone(), snapshot.principal.clone());
        *self.current.write() = Some(snapshot);
        result
    }

    async fn persist(&self, snapshot: &SessionSnapshot) {
        let raw = match serde_json::to_string(snapshot) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize session snapshot: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.save(SESSION_KEY, &raw).await {
            tracing::warn!("Failed to persist session snapshot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Role;
    use async_trait::async_trait;

    struct FixedAuthenticator;

    #[async_trait]
    impl Authenticator for FixedAuthenticator {
        async fn login(&self, username: &str, password: &str) -> AppResult<AuthResponse> {
            if password != "pass1234" {
                return Err(AppError::InvalidCredentials);
            }
            Ok(AuthResponse {
                token: Credential(format!("token-{}", username)),
                principal: Principal {
                    id: 9,
                    username: username.to_string(),
                    display_name: "Admin".to_string(),
                    role: Role::Admin,
                },
            })
        }
    }

    fn memory_store() -> Arc<MemorySnapshotStore> {
        Arc::new(MemorySnapshotStore::new())
    }

    #[tokio::test]
    async fn restores_staff_snapshot() {
        let store = memory_store();
        store
            .save(
                SESSION_KEY,
                r#"{"token":"t1","principal":{"id":3,"username":"staff1","displayName":"Staff One","role":"staff"}}"#,
            )
            .await
            .unwrap();

        let session = SessionContext::new(store);
        let (token, principal) = session.restore().await.unwrap();
        assert_eq!(token, Credential("t1".to_string()));
        assert_eq!(principal.username, "staff1");
        assert!(!session.is_admin());
        assert_eq!(session.credential(), Some(Credential("t1".to_string())));
    }

    #[tokio::test]
    async fn accepts_legacy_user_field() {
        let store = memory_store();
        store
            .save(
                SESSION_KEY,
                r#"{"token":"t2","user":{"id":4,"username":"boss","displayName":"Boss","role":"admin"}}"#,
            )
            .await
            .unwrap();

        let session = SessionContext::open(store).await;
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_discarded() {
        let store = memory_store();
        store.save(SESSION_KEY, "{not json").await.unwrap();

        let session = SessionContext::new(store.clone());
        assert!(session.restore().await.is_none());
        assert!(session.current_principal().is_none());
        assert_eq!(store.load(SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn no_snapshot_means_no_session() {
        let session = SessionContext::open(memory_store()).await;
        assert!(session.current_principal().is_none());
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn login_persists_and_logout_clears() {
        let store = memory_store();
        let session = SessionContext::new(store.clone());

        let (token, principal) = session
            .login(&FixedAuthenticator, "admin", "pass1234")
            .await
            .unwrap();
        assert_eq!(token.as_str(), "token-admin");
        assert!(principal.is_admin());
        assert!(session.is_admin());
        assert!(store.load(SESSION_KEY).await.unwrap().is_some());

        // a fresh context picks the session back up
        let reopened = SessionContext::open(store.clone()).await;
        assert_eq!(reopened.current_principal(), Some(principal));

        session.logout().await;
        assert!(session.current_principal().is_none());
        assert_eq!(store.load(SESSION_KEY).await.unwrap(), None);
        // idempotent
        session.logout().await;
        assert!(session.credential().is_none());
    }

    #[tokio::test]
    async fn failed_login_leaves_session_untouched() {
        let store = memory_store();
        let session = SessionContext::new(store.clone());

        let err = session
            .login(&FixedAuthenticator, "admin", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert!(session.current_principal().is_none());
        assert_eq!(store.load(SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn sqlite_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("client.db").display());

        let store = SqliteSnapshotStore::connect(&url).await.unwrap();
        let session = SessionContext::new(Arc::new(store.clone()));
        session
            .establish(AuthResponse {
                token: Credential("t3".to_string()),
                principal: Principal {
                    id: 5,
                    username: "nok".to_string(),
                    display_name: "Nok".to_string(),
                    role: Role::Staff,
                },
            })
            .await;
        store.close().await;

        let store = SqliteSnapshotStore::connect(&url).await.unwrap();
        let reopened = SessionContext::open(Arc::new(store)).await;
        assert_eq!(reopened.credential(), Some(Credential("t3".to_string())));
        assert!(!reopened.is_admin());
    }
}
