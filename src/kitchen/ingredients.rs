//! Hot dog ingredients and the store that hands them out

use super::burners::BurnerToken;
use crate::error::{KitchenError, Result};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// The two parts every hot dog is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Bread,
    Sausage,
}

impl PartKind {
    /// What happens to the part on a burner ("baking", "frying")
    pub fn process(&self) -> &'static str {
        match self {
            PartKind::Bread => "baking",
            PartKind::Sausage => "frying",
        }
    }

    /// Past participle for log lines ("baked", "fried")
    pub fn done(&self) -> &'static str {
        match self {
            PartKind::Bread => "baked",
            PartKind::Sausage => "fried",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartKind::Bread => write!(f, "bread"),
            PartKind::Sausage => write!(f, "sausage"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CookState {
    Raw,
    Cooking { started: Instant, burner: u64 },
    Cooked { cook_time: Duration, burner: u64 },
}

/// A single bread or sausage.
///
/// Cooking only moves forward: raw, cooking, cooked. Each step happens once.
#[derive(Debug)]
pub struct Ingredient {
    id: u64,
    kind: PartKind,
    state: Mutex<CookState>,
}

impl Ingredient {
    pub fn new(id: u64, kind: PartKind) -> Self {
        Self {
            id,
            kind,
            state: Mutex::new(CookState::Raw),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    fn lock(&self) -> MutexGuard<'_, CookState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_error(&self, reason: &str) -> KitchenError {
        KitchenError::IngredientState {
            ingredient: format!("{} #{}", self.kind, self.id),
            reason: reason.to_string(),
        }
    }

    /// Put the ingredient on the burner held by `burner`
    pub fn begin_cooking(&self, burner: &BurnerToken) -> Result<()> {
        let mut state = self.lock();
        match *state {
            CookState::Raw => {
                *state = CookState::Cooking {
                    started: Instant::now(),
                    burner: burner.id(),
                };
                Ok(())
            }
            CookState::Cooking { .. } => Err(self.state_error("already cooking")),
            CookState::Cooked { .. } => Err(self.state_error("already cooked")),
        }
    }

    /// Take the ingredient off the burner; returns how long it cooked
    pub fn stop_cooking(&self) -> Result<Duration> {
        let mut state = self.lock();
        match *state {
            CookState::Cooking { started, burner } => {
                let cook_time = started.elapsed();
                *state = CookState::Cooked { cook_time, burner };
                Ok(cook_time)
            }
            CookState::Raw => Err(self.state_error("cooking never started")),
            CookState::Cooked { .. } => Err(self.state_error("already cooked")),
        }
    }

    pub fn is_cooking(&self) -> bool {
        matches!(*self.lock(), CookState::Cooking { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(*self.lock(), CookState::Cooked { .. })
    }

    /// Measured time on the burner, once cooked
    pub fn cook_time(&self) -> Option<Duration> {
        match *self.lock() {
            CookState::Cooked { cook_time, .. } => Some(cook_time),
            _ => None,
        }
    }

    /// Token id of the burner the ingredient was cooked on
    pub fn burner(&self) -> Option<u64> {
        match *self.lock() {
            CookState::Cooking { burner, .. } | CookState::Cooked { burner, .. } => Some(burner),
            CookState::Raw => None,
        }
    }
}

/// Hands out raw ingredients with store-wide unique ids
#[derive(Debug, Default)]
pub struct Store {
    next_id: AtomicU64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get_bread(&self) -> Arc<Ingredient> {
        Arc::new(Ingredient::new(self.next_id(), PartKind::Bread))
    }

    pub fn get_sausage(&self) -> Arc<Ingredient> {
        Arc::new(Ingredient::new(self.next_id(), PartKind::Sausage))
    }
}
