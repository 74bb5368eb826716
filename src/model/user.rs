use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::{Container, ContainerError, Location, Member};

/// A site account.
///
/// The password is stored as given. `auth::cleartext_check` compares it
/// verbatim; neither is safe outside a prototype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    location: Location,
    email: String,
    password: String,
    groups: Vec<String>,
}

impl User {
    pub fn new<I, S>(email: impl Into<String>, password: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location: Location::default(),
            email: email.into(),
            password: password.into(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> &str {
        self.key()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }
}

impl Member for User {
    const KIND: &'static str = "user";

    /// Users are keyed by their login id, so the id doubles as the title.
    fn title(&self) -> &str {
        &self.location.name
    }

    fn location(&self) -> &Location {
        &self.location
    }

    fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }

    fn validate(&self) -> Result<(), String> {
        if !self.email.contains('@') {
            return Err(format!("`{}` is not an email address", self.email));
        }
        if self.password.is_empty() {
            return Err("password is required".to_string());
        }
        Ok(())
    }
}

/// The `users` collection. Ids are chosen by the user and never renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContainer {
    users: Container<User>,
}

impl Default for UserContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl UserContainer {
    pub const NAME: &'static str = "users";

    pub fn new() -> Self {
        Self {
            users: Container::new(Self::NAME),
        }
    }

    /// Register a user under `id`. Fails with `Duplicate` if the id exists.
    pub fn add_user<I, S>(
        &mut self,
        id: &str,
        email: &str,
        password: &str,
        groups: I,
    ) -> Result<String, ContainerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users
            .insert_new(id, User::new(email, password, groups))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.get_mut(id)
    }
}

impl Deref for UserContainer {
    type Target = Container<User>;

    fn deref(&self) -> &Self::Target {
        &self.users
    }
}
