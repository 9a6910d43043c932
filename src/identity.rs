//! Sign-in sessions and the admin allow-list.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::storage::{LocalStore, StoreError};

const SESSION_KEY: &str = "session";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0:?} is not a valid email address")]
    InvalidEmail(String),
    #[error("not signed in; run `tunedeck login <email>` first")]
    NotSignedIn,
    #[error("{0} is not allowed to manage the catalog")]
    NotAuthorized(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    /// Display name when set, email otherwise.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

pub trait IdentityProvider {
    fn sign_in(&mut self, email: &str, display_name: Option<&str>) -> Result<User, AuthError>;
    fn sign_out(&mut self) -> Result<(), AuthError>;
    fn current_user(&self) -> Result<Option<User>, AuthError>;
}

/// Session kept in the local store; there is no password exchange.
pub struct LocalIdentity<S: LocalStore> {
    store: S,
}

impl<S: LocalStore> LocalIdentity<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: LocalStore> IdentityProvider for LocalIdentity<S> {
    fn sign_in(&mut self, email: &str, display_name: Option<&str>) -> Result<User, AuthError> {
        let email = email.trim();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(AuthError::InvalidEmail(email.to_string()));
        }

        let user = User {
            email: email.to_string(),
            display_name: display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        };
        self.store.set(SESSION_KEY, &user)?;
        info!(email = %user.email, "signed in");
        Ok(user)
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        self.store.remove(SESSION_KEY)?;
        Ok(())
    }

    fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.store.get(SESSION_KEY)?)
    }
}

/// Emails allowed to use the admin commands.
pub struct AdminGate {
    allowed: Vec<String>,
}

impl AdminGate {
    pub fn new(allowed: &[String]) -> Self {
        Self {
            allowed: allowed
                .iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_admin(&self, user: &User) -> bool {
        let email = user.email.trim().to_lowercase();
        self.allowed.iter().any(|a| *a == email)
    }

    /// Return the signed-in admin.
    ///
    /// A signed-in user who is not on the list is signed out.
    pub fn authorize(&self, identity: &mut impl IdentityProvider) -> Result<User, AuthError> {
        let user = identity.current_user()?.ok_or(AuthError::NotSignedIn)?;
        if self.is_admin(&user) {
            return Ok(user);
        }

        warn!(email = %user.email, "rejected non-admin session");
        identity.sign_out()?;
        Err(AuthError::NotAuthorized(user.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn gate() -> AdminGate {
        AdminGate::new(&["Admin@Example.com".to_string(), "  ".to_string()])
    }

    #[test]
    fn sign_in_validates_and_persists_session() {
        let mut id = LocalIdentity::new(MemoryStore::default());
        assert!(matches!(id.sign_in("nobody", None), Err(AuthError::InvalidEmail(_))));
        assert!(matches!(id.sign_in("@example.com", None), Err(AuthError::InvalidEmail(_))));
        assert_eq!(id.current_user().unwrap(), None);

        let user = id.sign_in(" dj@example.com ", Some("  ")).unwrap();
        assert_eq!(user.email, "dj@example.com");
        assert_eq!(user.display_name, None);
        assert_eq!(user.label(), "dj@example.com");
        assert_eq!(id.current_user().unwrap(), Some(user));

        id.sign_out().unwrap();
        assert_eq!(id.current_user().unwrap(), None);
    }

    #[test]
    fn label_prefers_display_name() {
        let user = User {
            email: "dj@example.com".into(),
            display_name: Some("DJ".into()),
        };
        assert_eq!(user.label(), "DJ");
    }

    #[test]
    fn admin_match_is_case_insensitive() {
        let user = User {
            email: "admin@example.COM".into(),
            display_name: None,
        };
        assert!(gate().is_admin(&user));
    }

    #[test]
    fn authorize_without_session_fails() {
        let mut id = LocalIdentity::new(MemoryStore::default());
        assert!(matches!(gate().authorize(&mut id), Err(AuthError::NotSignedIn)));
    }

    #[test]
    fn authorize_admits_admins_and_signs_out_everyone_else() {
        let mut id = LocalIdentity::new(MemoryStore::default());

        id.sign_in("admin@example.com", Some("Boss")).unwrap();
        assert_eq!(gate().authorize(&mut id).unwrap().label(), "Boss");
        assert!(id.current_user().unwrap().is_some());

        id.sign_in("guest@example.com", None).unwrap();
        assert!(matches!(
            gate().authorize(&mut id),
            Err(AuthError::NotAuthorized(e)) if e == "guest@example.com"
        ));
        assert_eq!(id.current_user().unwrap(), None);
    }
}
