//! # Session
//!
//! Who is signed in, and with which token. Owned by the root controller and
//! only mutated there: created at startup from the credential store, filled in
//! when the profile loads, reset on logout.

use crate::api::{Credential, User};

#[derive(Debug, Default)]
pub struct Session {
    pub authenticated: bool,
    pub credential: Option<Credential>,
    pub user: Option<User>,
}

impl Session {
    /// A session holding a token that has not been validated yet.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            authenticated: false,
            credential: Some(credential),
            user: None,
        }
    }

    /// Marks the session authenticated once the profile is known.
    pub fn sign_in(&mut self, credential: Credential, user: User) {
        self.credential = Some(credential);
        self.user = Some(user);
        self.authenticated = true;
    }

    /// Drops the profile but keeps the token, e.g. when the profile fetch
    /// failed for a reason other than a rejected token.
    pub fn demote(&mut self) {
        self.user = None;
        self.authenticated = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 1,
            username: "reader".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sign_in_then_reset() {
        let mut session = Session::with_credential(Credential::new("tok"));
        assert!(!session.authenticated);

        session.sign_in(Credential::new("tok"), user());
        assert!(session.authenticated);
        assert_eq!(session.username(), Some("reader"));

        session.reset();
        assert!(!session.authenticated);
        assert!(session.credential.is_none());
        assert!(session.user.is_none());
    }

    #[test]
    fn test_demote_keeps_credential() {
        let mut session = Session::default();
        session.sign_in(Credential::new("tok"), user());
        session.demote();
        assert!(!session.authenticated);
        assert_eq!(session.credential, Some(Credential::new("tok")));
    }
}
