use async_trait::async_trait;
use globetrail_core::{AuthError, AuthProvider, Identity};
use globetrail_shared::Masked;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    uid: String,
    salt: String,
    password_hash: String,
}

#[derive(Default)]
struct Directory {
    /// Keyed by lower-cased e-mail.
    accounts: HashMap<String, Account>,
    identities: HashMap<String, Identity>,
}

/// Process-local account directory standing in for a hosted auth service.
#[derive(Default)]
pub struct MemoryAuthProvider {
    directory: RwLock<Directory>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    format!("{:x}", Sha256::digest(format!("{}:{}", salt, password).as_bytes()))
}

fn new_uid() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let key = email.to_lowercase();
        let mut directory = self.directory.write().await;
        if directory.accounts.contains_key(&key) {
            return Err(AuthError::EmailInUse);
        }

        let uid = new_uid();
        let salt = new_uid();
        let identity = Identity::user(uid.clone(), email);
        directory.accounts.insert(
            key,
            Account {
                uid: uid.clone(),
                password_hash: hash_password(&salt, password),
                salt,
            },
        );
        directory.identities.insert(uid, identity.clone());

        info!("Account created for {}", Masked(email.to_string()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let directory = self.directory.read().await;
        let account = directory
            .accounts
            .get(&email.trim().to_lowercase())
            .ok_or(AuthError::InvalidCredentials)?;

        if hash_password(&account.salt, password) != account.password_hash {
            return Err(AuthError::InvalidCredentials);
        }

        directory
            .identities
            .get(&account.uid)
            .cloned()
            .ok_or_else(|| AuthError::Backend(format!("account {} has no identity", account.uid)))
    }

    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError> {
        let identity = Identity::anonymous(new_uid());
        self.directory
            .write()
            .await
            .identities
            .insert(identity.uid.clone(), identity.clone());
        Ok(identity)
    }

    async fn update_display_name(&self, uid: &str, name: &str) -> Result<Identity, AuthError> {
        let mut directory = self.directory.write().await;
        let identity = directory.identities.get_mut(uid).ok_or(AuthError::NotSignedIn)?;
        identity.display_name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
        Ok(identity.clone())
    }

    async fn lookup(&self, uid: &str) -> Result<Option<Identity>, AuthError> {
        Ok(self.directory.read().await.identities.get(uid).cloned())
    }
}
