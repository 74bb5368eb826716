use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::error::AuthError;
use super::plugin::Credentials;

/// Name of the cookie carrying a login ticket.
pub const TICKET_COOKIE: &str = "auth_tkt";

/// Realm announced in Basic challenges.
pub const REALM: &str = "Mint";

/// Parse an `Authorization: Basic ...` header.
///
/// Returns `Ok(None)` for other schemes.
pub fn parse_basic(header: &str) -> Result<Option<Credentials>, AuthError> {
    let Some((scheme, encoded)) = header.trim().split_once(' ') else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("basic") {
        return Ok(None);
    }
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AuthError::MalformedHeader(e.to_string()))?;
    let decoded =
        String::from_utf8(decoded).map_err(|e| AuthError::MalformedHeader(e.to_string()))?;
    let (login, password) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::MalformedHeader("missing `:` separator".to_string()))?;
    Ok(Some(Credentials::new(login, password)))
}

/// Encode credentials as a Basic header value.
pub fn basic_header(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.login, credentials.password);
    format!("Basic {}", STANDARD.encode(raw))
}

/// The `WWW-Authenticate` value sent with a 401.
pub fn challenge() -> String {
    format!("Basic realm=\"{}\"", REALM)
}

/// Split a `Cookie` header into name/value pairs.
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Login tickets handed out as the `auth_tkt` cookie.
///
/// Tickets live in memory only; restarting the server logs everyone out.
#[derive(Debug, Clone, Default)]
pub struct TicketStore {
    tickets: Arc<RwLock<HashMap<String, String>>>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let ticket = uuid::Uuid::new_v4().simple().to_string();
        self.tickets
            .write()
            .map_err(|_| AuthError::LockPoisoned)?
            .insert(ticket.clone(), user_id.to_string());
        tracing::debug!(user = user_id, "issued login ticket");
        Ok(ticket)
    }

    pub fn identify(&self, ticket: &str) -> Result<Option<String>, AuthError> {
        Ok(self
            .tickets
            .read()
            .map_err(|_| AuthError::LockPoisoned)?
            .get(ticket)
            .cloned())
    }

    /// Forget a ticket. Returns the user it belonged to.
    pub fn revoke(&self, ticket: &str) -> Result<Option<String>, AuthError> {
        Ok(self
            .tickets
            .write()
            .map_err(|_| AuthError::LockPoisoned)?
            .remove(ticket))
    }

    /// `Set-Cookie` value carrying `ticket`.
    pub fn cookie(ticket: &str) -> String {
        format!("{}={}; Path=/; HttpOnly", TICKET_COOKIE, ticket)
    }

    /// `Set-Cookie` value that clears the ticket cookie.
    pub fn expired_cookie() -> String {
        format!("{}=; Path=/; Max-Age=0", TICKET_COOKIE)
    }
}
