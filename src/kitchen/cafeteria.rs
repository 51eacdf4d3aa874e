//! Cafeteria front door
//!
//! Accepts hot dog orders from any thread, numbers them, and starts one
//! [`Order`] per request against the shared gas cooker. In-flight orders are
//! kept in a table keyed by id until their handler has fired.

use super::burners::{BurnerSource, GasCooker};
use super::hotdog::HotDog;
use super::ingredients::Store;
use super::order::Order;
use super::OrderId;
use crate::config::KitchenConfig;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info};

type OrderTable = Mutex<HashMap<OrderId, Arc<Order>>>;

fn lock_table(table: &OrderTable) -> MutexGuard<'_, HashMap<OrderId, Arc<Order>>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cooks hot dogs on a single gas cooker
pub struct Cafeteria {
    runtime: Handle,
    config: KitchenConfig,
    gas_cooker: GasCooker,
    burner_source: Arc<dyn BurnerSource>,
    store: Store,
    next_order_id: AtomicU64,
    orders: Arc<OrderTable>,
}

impl Cafeteria {
    /// Create a cafeteria whose orders run on `runtime`
    pub fn new(runtime: Handle, config: KitchenConfig) -> Self {
        let gas_cooker = GasCooker::new(config.burners);
        info!(burners = config.burners, "Cafeteria open");
        Self {
            runtime,
            burner_source: Arc::new(gas_cooker.clone()),
            gas_cooker,
            config,
            store: Store::new(),
            next_order_id: AtomicU64::new(1),
            orders: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Take burners from `source` instead of the cafeteria's own gas cooker
    pub fn with_burner_source(mut self, source: Arc<dyn BurnerSource>) -> Self {
        self.burner_source = source;
        self
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub fn gas_cooker(&self) -> &GasCooker {
        &self.gas_cooker
    }

    /// Number of accepted orders whose handler has not fired yet
    pub fn in_flight(&self) -> usize {
        lock_table(&self.orders).len()
    }

    /// Order a hot dog.
    ///
    /// Returns the order id right away; `handler` is called exactly once, later,
    /// with the hot dog or the reason the order failed. Safe to call from any
    /// thread.
    pub fn order_hot_dog<F>(&self, handler: F) -> OrderId
    where
        F: FnOnce(Result<HotDog>) + Send + 'static,
    {
        let order_id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        let table: Weak<OrderTable> = Arc::downgrade(&self.orders);

        let order = Order::new(
            order_id,
            Arc::clone(&self.burner_source),
            self.store.get_bread(),
            self.store.get_sausage(),
            self.config.cook_times(),
            Box::new(move |result| {
                if let Some(table) = table.upgrade() {
                    lock_table(&table).remove(&order_id);
                }
                handler(result);
            }),
        );

        // Registered before it starts so a fast failure still finds its entry.
        lock_table(&self.orders).insert(order_id, Arc::clone(&order));
        debug!(order_id, "Order accepted");
        order.start(&self.runtime);
        order_id
    }

    /// Cancel an in-flight order; false if it is unknown or already resolved
    pub fn cancel_order(&self, order_id: OrderId) -> bool {
        let order = lock_table(&self.orders).get(&order_id).cloned();
        match order {
            Some(order) => order.cancel(),
            None => false,
        }
    }

    /// Close the gas cooker. Parts still waiting for a burner fail, and so does
    /// every later order; parts already on a burner finish normally.
    pub fn shutdown(&self) {
        info!(in_flight = self.in_flight(), "Cafeteria closing");
        self.gas_cooker.close();
    }
}
