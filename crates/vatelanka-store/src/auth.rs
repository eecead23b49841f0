//! Identity-provider boundary.
//!
//! Accounts start unverified and signed out; login refuses unverified
//! accounts, so a session only ever holds a verified user.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
}

pub trait AuthClient: Send + Sync {
    /// Create an account. The new account is unverified and the caller
    /// stays signed out until a successful [`AuthClient::login`].
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser, AuthError>> + Send;

    /// Sign in. Fails with [`AuthError::EmailNotVerified`] for accounts
    /// that have not confirmed their address.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser, AuthError>> + Send;

    fn send_password_reset(&self, email: &str)
        -> impl Future<Output = Result<(), AuthError>> + Send;

    fn current_user(&self) -> impl Future<Output = Option<AuthUser>> + Send;

    fn sign_out(&self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    verified: bool,
}

#[derive(Default)]
struct MemoryAuthInner {
    accounts: HashMap<String, Account>,
    session: Option<AuthUser>,
}

/// In-memory [`AuthClient`].
#[derive(Default, Clone)]
pub struct MemoryAuth {
    inner: Arc<Mutex<MemoryAuthInner>>,
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stand-in for the user clicking the verification link.
    pub fn mark_verified(&self, email: &str) {
        let mut inner = self.inner.lock().expect("auth lock");
        if let Some(account) = inner.accounts.get_mut(email) {
            account.verified = true;
        }
    }
}

impl AuthClient for MemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let mut inner = self.inner.lock().expect("auth lock");
        if inner.accounts.contains_key(email) {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        let account = Account {
            uid: uuid::Uuid::new_v4().to_string(),
            password: password.to_string(),
            verified: false,
        };
        let user = AuthUser {
            uid: account.uid.clone(),
            email: email.to_string(),
            email_verified: false,
        };
        inner.accounts.insert(email.to_string(), account);
        // Signed out until the address is verified and login succeeds.
        inner.session = None;
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let mut inner = self.inner.lock().expect("auth lock");
        let account = inner
            .accounts
            .get(email)
            .ok_or(AuthError::InvalidCredentials)?;
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        if !account.verified {
            inner.session = None;
            return Err(AuthError::EmailNotVerified);
        }
        let user = AuthUser {
            uid: account.uid.clone(),
            email: email.to_string(),
            email_verified: true,
        };
        inner.session = Some(user.clone());
        Ok(user)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let inner = self.inner.lock().expect("auth lock");
        if inner.accounts.contains_key(email) {
            Ok(())
        } else {
            Err(AuthError::UnknownEmail(email.to_string()))
        }
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.inner.lock().expect("auth lock").session.clone()
    }

    async fn sign_out(&self) {
        self.inner.lock().expect("auth lock").session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signup_leaves_the_user_signed_out_and_unverified() {
        let auth = MemoryAuth::new();
        let user = auth.sign_up("amal@example.com", "pw").await.unwrap();
        assert!(!user.email_verified);
        assert!(auth.current_user().await.is_none());
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let auth = MemoryAuth::new();
        auth.sign_up("amal@example.com", "pw").await.unwrap();
        let result = auth.sign_up("amal@example.com", "pw2").await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyRegistered)));
    }

    #[tokio::test]
    async fn unverified_login_is_treated_as_logged_out() {
        let auth = MemoryAuth::new();
        auth.sign_up("amal@example.com", "pw").await.unwrap();
        let result = auth.login("amal@example.com", "pw").await;
        assert!(matches!(result, Err(AuthError::EmailNotVerified)));
        assert!(auth.current_user().await.is_none());
    }

    #[tokio::test]
    async fn verified_login_establishes_a_session() {
        let auth = MemoryAuth::new();
        auth.sign_up("amal@example.com", "pw").await.unwrap();
        auth.mark_verified("amal@example.com");
        let user = auth.login("amal@example.com", "pw").await.unwrap();
        assert!(user.email_verified);
        assert_eq!(auth.current_user().await, Some(user));

        auth.sign_out().await;
        assert!(auth.current_user().await.is_none());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let auth = MemoryAuth::new();
        auth.sign_up("amal@example.com", "pw").await.unwrap();
        auth.mark_verified("amal@example.com");
        assert!(matches!(
            auth.login("amal@example.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost@example.com", "pw").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn password_reset_requires_a_known_email() {
        let auth = MemoryAuth::new();
        auth.sign_up("amal@example.com", "pw").await.unwrap();
        assert!(auth.send_password_reset("amal@example.com").await.is_ok());
        assert!(matches!(
            auth.send_password_reset("ghost@example.com").await,
            Err(AuthError::UnknownEmail(_))
        ));
    }
}
