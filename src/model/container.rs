//! Container - an ordered, keyed collection that owns its members.
//!
//! Every container enforces the same contract: keys are unique single
//! traversal segments, members are validated on insertion, and each
//! member's back-reference names the container that owns it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::ContainerError;
use super::Member;

/// Turn a display name into a container key: lower-cased, whitespace
/// and path separators replaced by underscores, and every other
/// character that is not a letter, digit, `-`, `_` or `.` dropped.
///
/// Letters outside ASCII are kept; links percent-encode them.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            c if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') => Some(c),
            c if c.is_whitespace() || c == '/' => Some('_'),
            _ => None,
        })
        .collect()
}

fn validate_key(key: &str) -> Result<(), ContainerError> {
    if key.is_empty() || key == "." || key == ".." || key.contains('/') || key.starts_with("@@")
    {
        return Err(ContainerError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Ordered keyed collection of `T`.
///
/// Iteration follows insertion order. Replacing an existing key keeps its
/// original position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container<T> {
    name: String,
    order: Vec<String>,
    members: HashMap<String, T>,
}

impl<T: Member> Container<T> {
    /// Create an empty container. `name` is the path members point back to.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: Vec::new(),
            members: HashMap::new(),
        }
    }

    /// The container's path, used as every member's parent reference.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Move the container under a new path and re-point every member at it.
    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        for (key, member) in self.members.iter_mut() {
            member.attach(&self.name, key);
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.members.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.members.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|key| key.as_str())
    }

    /// Members in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|key| self.members.get(key))
    }

    /// `(key, member)` pairs in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &T)> {
        self.order
            .iter()
            .filter_map(|key| self.members.get(key).map(|member| (key.as_str(), member)))
    }

    /// Store `member` under `key`, replacing any previous member.
    ///
    /// Returns the replaced member, if any.
    pub fn insert(&mut self, key: &str, mut member: T) -> Result<Option<T>, ContainerError> {
        validate_key(key)?;
        member.validate().map_err(|reason| ContainerError::InvalidMember {
            kind: T::KIND,
            reason,
        })?;
        member.attach(&self.name, key);

        let previous = self.members.insert(key.to_string(), member);
        if previous.is_none() {
            self.order.push(key.to_string());
        }
        Ok(previous)
    }

    /// Store `member` under an explicit `key`, failing if the key is taken.
    ///
    /// The container is left untouched on failure.
    pub fn insert_new(&mut self, key: &str, member: T) -> Result<String, ContainerError> {
        if self.contains(key) {
            return Err(ContainerError::Duplicate {
                container: self.name.clone(),
                key: key.to_string(),
            });
        }
        self.insert(key, member)?;
        Ok(key.to_string())
    }

    /// Store `member` under a fresh key derived from its title.
    pub fn add(&mut self, member: T) -> Result<String, ContainerError> {
        let base = slugify(member.title());
        validate_key(&base).map_err(|_| ContainerError::InvalidMember {
            kind: T::KIND,
            reason: format!("title {:?} does not produce a usable key", member.title()),
        })?;
        let key = self.unique_key(&base);
        self.insert(&key, member)?;
        Ok(key)
    }

    /// First free key among `base`, `base_001`, `base_002`, ...
    pub fn unique_key(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        let mut counter = 1u32;
        loop {
            let candidate = format!("{}_{:03}", base, counter);
            if !self.contains(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}
