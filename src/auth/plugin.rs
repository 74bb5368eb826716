use crate::finder::{FinderError, UtilityFinder};
use crate::model::{Root, UserContainer};
use crate::store::Database;

use super::error::AuthError;

/// Login and password as supplied by the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

/// Locates the user container inside a root.
pub trait UserSource: Send + Sync {
    fn users<'r>(&self, root: &'r Root) -> Result<&'r UserContainer, FinderError>;
}

impl UserSource for UtilityFinder {
    fn users<'r>(&self, root: &'r Root) -> Result<&'r UserContainer, FinderError> {
        UtilityFinder::users(self, root)
    }
}

impl<F> UserSource for F
where
    F: for<'r> Fn(&'r Root) -> Result<&'r UserContainer, FinderError> + Send + Sync,
{
    fn users<'r>(&self, root: &'r Root) -> Result<&'r UserContainer, FinderError> {
        self(root)
    }
}

/// Compares a supplied password with the stored one.
pub type PasswordCheck = Box<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Plain equality between the supplied and stored passwords.
///
/// Insecure: passwords are stored unhashed and compared as-is. Supply a
/// real check with `ZodbPlugin::with_check` for anything but local use.
pub fn cleartext_check(supplied: &str, stored: &str) -> bool {
    supplied == stored
}

/// Authenticates credentials against the users stored in the database.
pub struct ZodbPlugin {
    db: Database,
    base: String,
    users: Box<dyn UserSource>,
    check: PasswordCheck,
}

impl ZodbPlugin {
    pub fn new(db: Database, base: impl Into<String>, users: impl UserSource + 'static) -> Self {
        Self {
            db,
            base: base.into(),
            users: Box::new(users),
            check: Box::new(cleartext_check),
        }
    }

    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.check = Box::new(check);
        self
    }

    /// Return the user id if `credentials` match a stored user.
    ///
    /// The connection opened for the lookup is closed on every path.
    pub fn authenticate(&self, credentials: &Credentials) -> Result<Option<String>, AuthError> {
        let conn = self.db.connect(&self.base)?;
        let users = self.users.users(conn.root())?;
        let matched = users
            .get(&credentials.login)
            .filter(|user| (self.check)(&credentials.password, user.password()))
            .map(|user| user.id().to_string());
        if matched.is_none() {
            tracing::info!(login = %credentials.login, "authentication failed");
        }
        conn.abort();
        Ok(matched)
    }
}
