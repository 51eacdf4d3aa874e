//! Hot dog kitchen
//!
//! Provides the shared gas cooker (a fair burner pool), the ingredients cooked
//! on it, the per-order completion barrier and the cafeteria front door that
//! accepts orders from any thread.

pub mod burners;
pub mod cafeteria;
pub mod hotdog;
pub mod ingredients;
pub mod order;

pub use burners::{BurnerSource, BurnerToken, GasCooker, PoolMetrics};
pub use cafeteria::Cafeteria;
pub use hotdog::HotDog;
pub use ingredients::{Ingredient, PartKind, Store};
pub use order::{HotDogHandler, Order, OrderPhase};

/// Identifier assigned to every accepted order
pub type OrderId = u64;
