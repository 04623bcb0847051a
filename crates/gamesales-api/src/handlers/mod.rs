//! API Handlers
//!
//! Request handlers organized by page.

pub mod goals;
pub mod health;
pub mod progress;
pub mod sales;
pub mod signups;
