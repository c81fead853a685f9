use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// The actor a booking is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub is_anonymous: bool,
}

impl Identity {
    pub fn user(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
            display_name: None,
            is_anonymous: false,
        }
    }

    pub fn anonymous(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            is_anonymous: true,
        }
    }

    /// Name used in greetings.
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Traveler")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Auth service error: {0}")]
    Backend(String),
}

/// Hosted authentication service capability.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError>;

    async fn update_display_name(&self, uid: &str, name: &str) -> Result<Identity, AuthError>;

    async fn lookup(&self, uid: &str) -> Result<Option<Identity>, AuthError>;
}

/// Client-side session over an [`AuthProvider`]: holds the current identity
/// and notifies listeners whenever it changes.
pub struct AuthSession {
    provider: Arc<dyn AuthProvider>,
    current: watch::Sender<Option<Identity>>,
}

impl AuthSession {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (current, _) = watch::channel(None);
        Self { provider, current }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.provider.sign_up(email, password).await?;
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.provider.sign_in(email, password).await?;
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn sign_in_anonymously(&self) -> Result<Identity, AuthError> {
        let identity = self.provider.sign_in_anonymously().await?;
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub fn sign_out(&self) {
        if self.current.send_replace(None).is_some() {
            tracing::debug!("Signed out");
        }
    }

    pub async fn update_display_name(&self, name: &str) -> Result<Identity, AuthError> {
        let uid = self.current_identity().ok_or(AuthError::NotSignedIn)?.uid;
        let identity = self.provider.update_display_name(&uid, name).await?;
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    /// Receives every sign-in and sign-out from now on.
    pub fn on_identity_changed(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct SingleUser {
        name: Mutex<Option<String>>,
    }

    #[async_trait]
    impl AuthProvider for SingleUser {
        async fn sign_up(&self, _email: &str, _password: &str) -> Result<Identity, AuthError> {
            Err(AuthError::EmailInUse)
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
            if email == "ana@example.com" && password == "secret1" {
                Ok(Identity::user("u-1", email))
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }

        async fn sign_in_anonymously(&self) -> Result<Identity, AuthError> {
            Ok(Identity::anonymous("anon-1"))
        }

        async fn update_display_name(&self, uid: &str, name: &str) -> Result<Identity, AuthError> {
            *self.name.lock().unwrap() = Some(name.to_string());
            let mut identity = Identity::user(uid, "ana@example.com");
            identity.display_name = Some(name.to_string());
            Ok(identity)
        }

        async fn lookup(&self, _uid: &str) -> Result<Option<Identity>, AuthError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_session_notifies_on_sign_in_and_out() {
        let session = AuthSession::new(Arc::new(SingleUser::default()));
        let mut changes = session.on_identity_changed();
        assert!(session.current_identity().is_none());

        session.sign_in("ana@example.com", "secret1").await.unwrap();
        changes.changed().await.unwrap();
        assert_eq!(changes.borrow().as_ref().map(|i| i.uid.as_str()), Some("u-1"));

        session.sign_out();
        changes.changed().await.unwrap();
        assert!(changes.borrow().is_none());
    }

    #[tokio::test]
    async fn test_failed_sign_in_leaves_session_untouched() {
        let session = AuthSession::new(Arc::new(SingleUser::default()));
        let err = session.sign_in("ana@example.com", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(session.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_update_display_name_requires_session() {
        let session = AuthSession::new(Arc::new(SingleUser::default()));
        assert_eq!(
            session.update_display_name("Ana").await.unwrap_err(),
            AuthError::NotSignedIn
        );

        session.sign_in("ana@example.com", "secret1").await.unwrap();
        let updated = session.update_display_name("Ana").await.unwrap();
        assert_eq!(updated.greeting_name(), "Ana");
        assert_eq!(session.current_identity().unwrap().greeting_name(), "Ana");
    }
}
