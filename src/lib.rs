//! # Cafeteria
//!
//! A hot dog cafeteria built around two concurrency primitives: a fair burner
//! pool shared by every order, and a per-order barrier that calls the
//! customer's handler exactly once when both parts of a hot dog are cooked.
//!
//! ## Usage
//!
//! ```bash
//! cafeteria run [-n orders] [--burners N] [--config cafeteria.toml] [--json]
//! ```
//!
//! ## Modules
//!
//! - `app` - Logging setup, configuration loading and fatal error reporting for the binary
//! - `config` - Kitchen configuration (burner count, cook times) from TOML and environment
//! - `error` - Error type shared by the whole crate
//! - `kitchen` - Gas cooker, ingredients, orders and the cafeteria front door
pub mod app;
pub mod config;
pub mod error;
pub mod kitchen;


pub use error::{KitchenError, Result};
