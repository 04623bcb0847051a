//! GameSales Types - Canonical domain types for gamified sales tracking
//!
//! This crate contains all foundational types for GameSales with zero
//! dependencies on other gamesales crates:
//!
//! - Identity types (UserId, SaleId, GoalId, etc.)
//! - Profiles, roles and the explicit [`Session`] value
//! - Sales, goals with bonus tiers, achievements and missions
//! - Signup requests reviewed by a master
//! - Change notifications emitted by the data layer
//!
//! Column values that the backend stores as Postgres enums are mapped with
//! `as_db_str` / `from_db_str` on each enum.

pub mod identity;
pub mod profile;
pub mod sale;
pub mod goal;
pub mod achievement;
pub mod mission;
pub mod signup;
pub mod change;
pub mod error;

pub use identity::*;
pub use profile::*;
pub use sale::*;
pub use goal::*;
pub use achievement::*;
pub use mission::*;
pub use signup::*;
pub use change::*;
pub use error::*;

/// Version of the GameSales types schema
pub const TYPES_VERSION: &str = "0.1.0";
