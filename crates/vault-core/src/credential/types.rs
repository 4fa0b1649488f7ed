//! Credential type definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A stored site login - text fields are zeroed when dropped
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    /// Unique identifier, assigned once at creation
    #[zeroize(skip)]
    pub id: Uuid,

    /// Site the login belongs to (e.g., "example.com")
    pub site: String,

    pub username: String,

    pub password: String,
}

impl Credential {
    /// Build a credential from user-supplied fields and a fresh id
    pub fn from_fields(id: Uuid, mut fields: NewCredential) -> Self {
        Self {
            id,
            site: std::mem::take(&mut fields.site),
            username: std::mem::take(&mut fields.username),
            password: std::mem::take(&mut fields.password),
        }
    }

    /// Case-insensitive match of `needle` against site or username.
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.site.to_lowercase().contains(needle) || self.username.to_lowercase().contains(needle)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("site", &self.site)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Fields supplied when adding a credential (the id is assigned by the vault)
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct NewCredential {
    pub site: String,
    pub username: String,
    pub password: String,
}

impl NewCredential {
    pub fn new(site: &str, username: &str, password: &str) -> Self {
        Self {
            site: site.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

impl std::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCredential")
            .field("site", &self.site)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fields_moves_values() {
        let id = Uuid::new_v4();
        let cred = Credential::from_fields(id, NewCredential::new("example.com", "alice", "p@ss"));

        assert_eq!(cred.id, id);
        assert_eq!(cred.site, "example.com");
        assert_eq!(cred.username, "alice");
        assert_eq!(cred.password, "p@ss");
    }

    #[test]
    fn test_debug_redacts_password() {
        let cred = Credential::from_fields(
            Uuid::new_v4(),
            NewCredential::new("example.com", "alice", "hunter2"),
        );
        let debug = format!("{:?}", cred);

        assert!(debug.contains("example.com"));
        assert!(!debug.contains("hunter2"));
        assert!(!format!("{:?}", NewCredential::new("a", "b", "hunter2")).contains("hunter2"));
    }

    #[test]
    fn test_matches_site_or_username() {
        let cred = Credential::from_fields(
            Uuid::new_v4(),
            NewCredential::new("GitHub.com", "Alice", "x"),
        );

        assert!(cred.matches("github"));
        assert!(cred.matches("ali"));
        assert!(!cred.matches("bob"));
    }

    #[test]
    fn test_serde_shape() {
        let cred = Credential::from_fields(
            Uuid::nil(),
            NewCredential::new("example.com", "alice", "p@ss"),
        );
        let json = serde_json::to_value(&cred).unwrap();

        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["site"], "example.com");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["password"], "p@ss");
    }
}
