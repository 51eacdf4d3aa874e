//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use cafeteria::config::KitchenConfig;
use cafeteria::kitchen::{BurnerSource, BurnerToken, GasCooker, HotDog, OrderId, PartKind};
use cafeteria::{KitchenError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Handler result tagged with the order it belongs to
pub type Delivery = (OrderId, Result<HotDog>);

/// Kitchen configuration with short cook times for fast tests
pub fn quick_config(burners: usize) -> KitchenConfig {
    KitchenConfig::default()
        .with_burners(burners)
        .with_cook_times(Duration::from_millis(10), Duration::from_millis(15))
}

/// Collects handler invocations from many orders
pub struct DeliveryLog {
    tx: mpsc::UnboundedSender<Delivery>,
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl DeliveryLog {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Handler for one order; sends the result tagged with the id it reports
    pub fn handler(&self) -> impl FnOnce(Result<HotDog>) + Send + 'static {
        let tx = self.tx.clone();
        move |result| {
            let order_id = match &result {
                Ok(hot_dog) => hot_dog.id(),
                Err(KitchenError::Cancelled { order_id }) => *order_id,
                Err(_) => 0,
            };
            let _ = tx.send((order_id, result));
        }
    }

    /// Wait until every handler handed out has fired or been dropped
    pub async fn drain(self) -> Vec<Delivery> {
        let Self { tx, mut rx } = self;
        drop(tx);
        let mut deliveries = Vec::new();
        while let Some(delivery) = rx.recv().await {
            deliveries.push(delivery);
        }
        deliveries
    }
}

/// Burner source that records the order in which requests arrive and are granted
pub struct RecordingSource {
    inner: GasCooker,
    pub requests: Mutex<Vec<(OrderId, PartKind)>>,
    pub grants: Mutex<Vec<(OrderId, PartKind)>>,
}

impl RecordingSource {
    pub fn new(inner: GasCooker) -> Arc<Self> {
        Arc::new(Self {
            inner,
            requests: Mutex::new(Vec::new()),
            grants: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl BurnerSource for RecordingSource {
    async fn acquire_for(&self, order_id: OrderId, part: PartKind) -> Result<BurnerToken> {
        self.requests.lock().unwrap().push((order_id, part));
        let token = self.inner.acquire().await?;
        self.grants.lock().unwrap().push((order_id, part));
        Ok(token)
    }
}

/// Burner source that never serves one part of one order
pub struct FailingSource {
    inner: GasCooker,
    order_id: OrderId,
    part: PartKind,
}

impl FailingSource {
    pub fn new(inner: GasCooker, order_id: OrderId, part: PartKind) -> Arc<Self> {
        Arc::new(Self {
            inner,
            order_id,
            part,
        })
    }
}

#[async_trait]
impl BurnerSource for FailingSource {
    async fn acquire_for(&self, order_id: OrderId, part: PartKind) -> Result<BurnerToken> {
        if order_id == self.order_id && part == self.part {
            return Err(KitchenError::ResourceExhaustedPermanently);
        }
        self.inner.acquire().await
    }
}
