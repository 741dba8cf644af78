use serde::{Deserialize, Serialize};

/// The profile of the logged-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The email address the user logged in with.
    pub email: String,

    /// The display name reported by the backend, if any.
    pub name: Option<String>,
}

impl UserProfile {
    /// Create a new profile.
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
        }
    }

    /// The name to show in the chat header. Falls back to the local part of
    /// the email address when the backend did not report a name.
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// The locally persisted authentication session.
///
/// A present token implies a present user, best effort: the store tolerates a
/// missing or unparseable profile and leaves `user` empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The opaque bearer token, if logged in.
    pub token: Option<String>,

    /// The user profile, if known.
    pub user: Option<UserProfile>,
}

impl Session {
    /// An empty, logged-out session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A logged-in session.
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    /// Returns true if a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
