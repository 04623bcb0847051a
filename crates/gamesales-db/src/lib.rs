//! GameSales Database Layer
//!
//! Data access for the GameSales backend's PostgreSQL schema, plus an
//! in-memory store with the same behaviour.
//!
//! # Architecture
//!
//! - **Repositories**: one per table family, returning raw row models
//! - **Stores**: [`SalesStore`] implementations that convert rows into
//!   domain types and publish change events on every write
//! - **Change feed**: broadcast channel fed by writes and by Postgres
//!   `NOTIFY` triggers, consumed by view caches as "reload" signals
//!
//! Table and column names follow the backend's existing schema; the
//! bundled migration recreates it for local development.

pub mod config;
pub mod error;
pub mod feed;
pub mod memory;
pub mod models;
pub mod repos;
pub mod store;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use feed::{ChangeFeed, ChangeSubscription, FeedSignal, NOTIFY_CHANNEL};
pub use memory::MemoryStore;
pub use models::*;
pub use repos::*;
pub use store::{HealthStatus, PgStore, SalesStore};
