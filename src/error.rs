use thiserror::Error;

use crate::kitchen::{OrderId, PartKind};

#[derive(Error, Debug)]
pub enum KitchenError {
    #[error("No burner will ever become available: the gas cooker is closed")]
    ResourceExhaustedPermanently,

    #[error("Invalid burner token use: {reason}")]
    InvalidTokenUse { reason: String },

    #[error("Order {order_id} was cancelled")]
    Cancelled { order_id: OrderId },

    #[error("Ingredient {ingredient} is in the wrong state: {reason}")]
    IngredientState { ingredient: String, reason: String },

    #[error("Cannot assemble a hot dog: {part} is not cooked")]
    Incomplete { part: PartKind },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl KitchenError {
    /// Whether the error comes from cancelling the order rather than a fault.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, KitchenError::Cancelled { .. })
    }

    /// Process exit code when this error ends the program
    pub fn exit_code(&self) -> i32 {
        match self {
            KitchenError::Config(_) | KitchenError::Toml(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, KitchenError>;
