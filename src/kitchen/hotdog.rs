use super::ingredients::{Ingredient, PartKind};
use super::OrderId;
use crate::error::{KitchenError, Result};
use std::sync::Arc;
use std::time::Duration;

/// A finished order: one baked bread and one fried sausage
#[derive(Debug, Clone)]
pub struct HotDog {
    id: OrderId,
    bread: Arc<Ingredient>,
    sausage: Arc<Ingredient>,
}

impl HotDog {
    /// Assemble a hot dog; both parts must be of the right kind and cooked
    pub fn new(id: OrderId, bread: Arc<Ingredient>, sausage: Arc<Ingredient>) -> Result<Self> {
        for (part, expected) in [(&bread, PartKind::Bread), (&sausage, PartKind::Sausage)] {
            if part.kind() != expected {
                return Err(KitchenError::IngredientState {
                    ingredient: format!("{} #{}", part.kind(), part.id()),
                    reason: format!("expected {expected}"),
                });
            }
            if !part.is_finished() {
                return Err(KitchenError::Incomplete { part: expected });
            }
        }

        Ok(Self { id, bread, sausage })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn bread(&self) -> &Ingredient {
        &self.bread
    }

    pub fn sausage(&self) -> &Ingredient {
        &self.sausage
    }

    pub fn bake_time(&self) -> Duration {
        self.bread.cook_time().unwrap_or_default()
    }

    pub fn fry_time(&self) -> Duration {
        self.sausage.cook_time().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kitchen::burners::GasCooker;

    async fn cooked(kind: PartKind, id: u64, cooker: &GasCooker) -> Arc<Ingredient> {
        let part = Arc::new(Ingredient::new(id, kind));
        let burner = cooker.acquire().await.expect("Failed to acquire");
        part.begin_cooking(&burner).expect("Begin should succeed");
        part.stop_cooking().expect("Stop should succeed");
        part
    }

    #[tokio::test]
    async fn test_assemble_from_cooked_parts() {
        let cooker = GasCooker::new(2);
        let bread = cooked(PartKind::Bread, 1, &cooker).await;
        let sausage = cooked(PartKind::Sausage, 2, &cooker).await;

        let hot_dog = HotDog::new(7, bread, sausage).expect("Hot dog should assemble");

        assert_eq!(hot_dog.id(), 7);
        assert!(hot_dog.bread().is_finished());
        assert!(hot_dog.sausage().is_finished());
    }

    #[tokio::test]
    async fn test_raw_sausage_is_rejected() {
        let cooker = GasCooker::new(1);
        let bread = cooked(PartKind::Bread, 1, &cooker).await;
        let sausage = Arc::new(Ingredient::new(2, PartKind::Sausage));

        let err = HotDog::new(1, bread, sausage).expect_err("Raw sausage must be rejected");

        assert!(matches!(
            err,
            KitchenError::Incomplete {
                part: PartKind::Sausage
            }
        ));
    }

    #[tokio::test]
    async fn test_swapped_parts_are_rejected() {
        let cooker = GasCooker::new(2);
        let bread = cooked(PartKind::Bread, 1, &cooker).await;
        let sausage = cooked(PartKind::Sausage, 2, &cooker).await;

        let err = HotDog::new(1, sausage, bread).expect_err("Swapped parts must be rejected");

        assert!(err.to_string().contains("expected bread"));
    }
}
