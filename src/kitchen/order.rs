//! Per-order completion barrier
//!
//! An order cooks its bread and its sausage as two independent tasks on the
//! shared gas cooker. Both tasks report back through [`Order::on_part_done`],
//! which runs under the order's own lock, so exactly one report observes the
//! order becoming ready and the caller's handler fires exactly once.

use super::burners::BurnerSource;
use super::hotdog::HotDog;
use super::ingredients::{Ingredient, PartKind};
use super::OrderId;
use crate::error::{KitchenError, Result};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument, Span};

/// Callback receiving the finished hot dog or the reason the order failed
pub type HotDogHandler = Box<dyn FnOnce(Result<HotDog>) + Send + 'static>;

/// How long each part stays on its burner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookTimes {
    pub bread: Duration,
    pub sausage: Duration,
}

impl CookTimes {
    pub fn for_part(&self, part: PartKind) -> Duration {
        match part {
            PartKind::Bread => self.bread,
            PartKind::Sausage => self.sausage,
        }
    }
}

impl Default for CookTimes {
    fn default() -> Self {
        Self {
            bread: Duration::from_millis(1000),
            sausage: Duration::from_millis(1500),
        }
    }
}

/// Lifecycle of an order; phases only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderPhase {
    Created,
    Cooking,
    AllPartsReady,
    Completed,
}

struct BarrierState {
    phase: OrderPhase,
    bread_done: bool,
    sausage_done: bool,
    handler: Option<HotDogHandler>,
}

impl BarrierState {
    fn mark_done(&mut self, part: PartKind) {
        match part {
            PartKind::Bread => self.bread_done = true,
            PartKind::Sausage => self.sausage_done = true,
        }
    }

    fn all_done(&self) -> bool {
        self.bread_done && self.sausage_done
    }
}

enum Resolution {
    Ready(HotDogHandler),
    Failed(HotDogHandler, KitchenError),
}

/// One hot dog in the making
pub struct Order {
    id: OrderId,
    cooker: Arc<dyn BurnerSource>,
    bread: Arc<Ingredient>,
    sausage: Arc<Ingredient>,
    cook_times: CookTimes,
    started: Instant,
    span: Span,
    barrier: Mutex<BarrierState>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl Order {
    pub fn new(
        id: OrderId,
        cooker: Arc<dyn BurnerSource>,
        bread: Arc<Ingredient>,
        sausage: Arc<Ingredient>,
        cook_times: CookTimes,
        handler: HotDogHandler,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            cooker,
            bread,
            sausage,
            cook_times,
            started: Instant::now(),
            span: info_span!("order", order_id = id),
            barrier: Mutex::new(BarrierState {
                phase: OrderPhase::Created,
                bread_done: false,
                sausage_done: false,
                handler: Some(handler),
            }),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn phase(&self) -> OrderPhase {
        self.lock_barrier().phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase() == OrderPhase::Completed
    }

    fn ingredient(&self, part: PartKind) -> &Arc<Ingredient> {
        match part {
            PartKind::Bread => &self.bread,
            PartKind::Sausage => &self.sausage,
        }
    }

    fn lock_barrier(&self) -> MutexGuard<'_, BarrierState> {
        self.barrier.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<AbortHandle>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seconds since the order was created, for log lines
    fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Start cooking both parts on `runtime`. Calling it twice has no effect.
    pub fn start(self: &Arc<Self>, runtime: &Handle) {
        {
            let mut barrier = self.lock_barrier();
            if barrier.phase != OrderPhase::Created {
                return;
            }
            barrier.phase = OrderPhase::Cooking;
        }

        let mut tasks = self.lock_tasks();
        for part in [PartKind::Bread, PartKind::Sausage] {
            let report = PartReport::new(Arc::clone(self), part);
            let handle = runtime.spawn(
                async move {
                    let outcome = report.order.cook_part(part).await;
                    report.finish(outcome);
                }
                .instrument(self.span.clone()),
            );
            tasks.push(handle.abort_handle());
        }
    }

    /// Acquire a burner, cook the part for its fixed time, release the burner.
    async fn cook_part(&self, part: PartKind) -> Result<()> {
        let ingredient = self.ingredient(part);
        let burner = self.cooker.acquire_for(self.id, part).await?;

        ingredient.begin_cooking(&burner)?;
        info!(elapsed = self.elapsed(), "Start {} {}", part.process(), part);

        tokio::time::sleep(self.cook_times.for_part(part)).await;

        let cook_time = ingredient.stop_cooking()?;
        drop(burner);
        debug!(
            elapsed = self.elapsed(),
            cook_ms = cook_time.as_millis() as u64,
            "{} off the burner",
            part
        );
        Ok(())
    }

    /// Record that one part finished, successfully or not.
    ///
    /// The first failure, or the report that completes both parts, resolves
    /// the order. Everything reported after that is dropped.
    pub fn on_part_done(&self, part: PartKind, outcome: Result<()>) {
        let resolution = {
            let mut barrier = self.lock_barrier();
            if barrier.phase == OrderPhase::Completed {
                match &outcome {
                    Ok(()) => warn!(%part, "Ignoring {} report for a completed order", part),
                    Err(e) => debug!(%part, error = %e, "Ignoring late failure report"),
                }
                return;
            }

            match outcome {
                Ok(()) => {
                    barrier.mark_done(part);
                    info!(elapsed = self.elapsed(), "{} has been {}", part, part.done());
                    if !barrier.all_done() {
                        return;
                    }
                    barrier.phase = OrderPhase::AllPartsReady;
                    barrier.phase = OrderPhase::Completed;
                    barrier.handler.take().map(Resolution::Ready)
                }
                Err(error) => {
                    warn!(elapsed = self.elapsed(), %part, error = %error, "Part failed");
                    barrier.phase = OrderPhase::Completed;
                    barrier
                        .handler
                        .take()
                        .map(|handler| Resolution::Failed(handler, error))
                }
            }
        };

        match resolution {
            Some(Resolution::Ready(handler)) => {
                let hot_dog =
                    HotDog::new(self.id, Arc::clone(&self.bread), Arc::clone(&self.sausage));
                if hot_dog.is_ok() {
                    info!(elapsed = self.elapsed(), "Hot dog is ready");
                }
                handler(hot_dog);
            }
            Some(Resolution::Failed(handler, error)) => {
                self.abort_tasks();
                handler(Err(error));
            }
            None => {}
        }
    }

    /// Abandon the order.
    ///
    /// The handler receives [`KitchenError::Cancelled`] unless the order has
    /// already resolved. Queued burner requests are withdrawn and held burners
    /// are returned as the part tasks unwind.
    pub fn cancel(&self) -> bool {
        let handler = {
            let mut barrier = self.lock_barrier();
            if barrier.phase == OrderPhase::Completed {
                return false;
            }
            barrier.phase = OrderPhase::Completed;
            barrier.handler.take()
        };

        info!(elapsed = self.elapsed(), "Order cancelled");
        self.abort_tasks();
        if let Some(handler) = handler {
            handler(Err(KitchenError::Cancelled { order_id: self.id }));
        }
        true
    }

    fn abort_tasks(&self) {
        for task in self.lock_tasks().iter() {
            task.abort();
        }
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .finish()
    }
}

/// Reports a part task's outcome to its order, even when the task is aborted or panics.
struct PartReport {
    order: Arc<Order>,
    part: PartKind,
    reported: bool,
}

impl PartReport {
    fn new(order: Arc<Order>, part: PartKind) -> Self {
        Self {
            order,
            part,
            reported: false,
        }
    }

    fn finish(mut self, outcome: Result<()>) {
        self.reported = true;
        self.order.on_part_done(self.part, outcome);
    }
}

impl Drop for PartReport {
    fn drop(&mut self) {
        if !self.reported {
            let order_id = self.order.id;
            self.order
                .on_part_done(self.part, Err(KitchenError::Cancelled { order_id }));
        }
    }
}
