//! Security - principals, permissions and access-control lists.
//!
//! Authorization walks the ACLs along a context's lineage from the
//! context itself up to the root. The first entry that names one of the
//! requester's principals and covers the permission decides; if nothing
//! matches, the request is denied.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    View,
    Add,
    Edit,
    Admin,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::View => "view",
            Permission::Add => "add",
            Permission::Edit => "edit",
            Permission::Admin => "admin",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    Everyone,
    Authenticated,
    User(String),
    Group(String),
}

impl Principal {
    /// Principals held by a requester: everyone, plus the user and their
    /// groups when authenticated.
    pub fn effective(user: Option<&str>, groups: &[String]) -> Vec<Principal> {
        let mut principals = vec![Principal::Everyone];
        if let Some(user) = user {
            principals.push(Principal::Authenticated);
            principals.push(Principal::User(user.to_string()));
            principals.extend(groups.iter().cloned().map(Principal::Group));
        }
        principals
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Allow,
    Deny,
}

/// Which permissions an entry covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    All,
    Only(Vec<Permission>),
}

impl Grant {
    fn covers(&self, permission: Permission) -> bool {
        match self {
            Grant::All => true,
            Grant::Only(permissions) => permissions.contains(&permission),
        }
    }
}

/// Access-control entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ace {
    pub action: Action,
    pub principal: Principal,
    pub grant: Grant,
}

impl Ace {
    pub fn allow(principal: Principal, grant: Grant) -> Self {
        Self {
            action: Action::Allow,
            principal,
            grant,
        }
    }

    pub fn deny(principal: Principal, grant: Grant) -> Self {
        Self {
            action: Action::Deny,
            principal,
            grant,
        }
    }
}

pub type Acl = Vec<Ace>;

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

/// Check `permission` against ACLs ordered root first, context last.
pub fn authorize(lineage: &[Acl], principals: &[Principal], permission: Permission) -> Decision {
    for acl in lineage.iter().rev() {
        for ace in acl {
            if principals.contains(&ace.principal) && ace.grant.covers(permission) {
                return match ace.action {
                    Action::Allow => Decision::Allowed,
                    Action::Deny => Decision::Denied,
                };
            }
        }
    }
    Decision::Denied
}
