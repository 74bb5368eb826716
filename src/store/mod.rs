//! Store - the object database and the media files beside it.
//!
//! ## Example
//!
//! ```ignore
//! let db = Database::from_uri("file://var/mint.db")?;
//! db.bootstrap("mint_root", Root::new)?;
//!
//! let mut conn = db.connect("mint_root")?;
//! conn.root_mut().videos.add_video("Intro", "", ["feature"])?;
//! conn.commit()?;
//! ```

mod connection;
mod database;
mod error;
mod media;

pub use connection::Connection;
pub use database::{Database, Versioned};
pub use error::{MediaError, StoreError};
pub use media::{content_type_for, MediaStore};
