//! Auth - identifying requesters and checking their credentials.
//!
//! Requests are identified by a login ticket cookie or by HTTP Basic
//! credentials. Credentials are checked by `ZodbPlugin` against the user
//! container in the database; the container is located through a
//! `UserSource`, normally the `UtilityFinder`.
//!
//! ## Example
//!
//! ```ignore
//! let plugin = ZodbPlugin::new(db.clone(), "mint_root", UtilityFinder::standard());
//! let user = plugin.authenticate(&Credentials::new("admin", "test"))?;
//! assert_eq!(user.as_deref(), Some("admin"));
//! ```

mod error;
mod identity;
mod plugin;

pub use error::AuthError;
pub use identity::{
    basic_header, challenge, parse_basic, parse_cookies, TicketStore, REALM, TICKET_COOKIE,
};
pub use plugin::{cleartext_check, Credentials, PasswordCheck, UserSource, ZodbPlugin};
