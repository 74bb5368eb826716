//! mint - a video publishing site over a persistent, traversable object graph.
//!
//! ## Architecture
//!
//! ```text
//! HTTP (axum) ─▶ App::handle
//!                  ├─ auth:      ticket cookie / Basic ─▶ ZodbPlugin
//!                  ├─ routing:   RouteMapper, else traversal
//!                  ├─ security:  ACL lineage check
//!                  ├─ views:     page and form handlers
//!                  └─ store:     Connection commit (retry on conflict)
//!
//! store::Database ─▶ Root ─▶ videos / users / channels / banners
//! ```

pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod finder;
#[cfg(feature = "http")]
pub mod http;
pub mod model;
pub mod routing;
pub mod security;
pub mod store;
pub mod traversal;
pub mod views;

pub use app::{App, Services};
pub use auth::{Credentials, ZodbPlugin};
pub use bootstrap::{bootstrap, Seed, SeedError};
pub use config::{Config, ConfigError};
pub use finder::{FinderError, UtilityFinder};
pub use model::{ContainerError, Root};
pub use store::{Connection, Database, StoreError};
pub use views::{Request, Response};
