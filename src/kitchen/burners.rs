//! Burner pool for the shared gas cooker
//!
//! The cooker owns a fixed number of interchangeable burners. A request that
//! cannot be served right away waits in a strict FIFO queue, and a released
//! burner is handed straight to the head of that queue instead of going back
//! to the free count, so a newcomer can never overtake a waiting request.

use super::{OrderId, PartKind};
use crate::error::{KitchenError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, trace};

static NEXT_COOKER_ID: AtomicU64 = AtomicU64::new(1);

/// Snapshot of gas cooker usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolMetrics {
    /// Total number of burners
    pub capacity: usize,
    /// Burners nobody holds
    pub available: usize,
    /// Burners currently held by a token
    pub in_use: usize,
    /// Acquire requests waiting in the queue
    pub waiting: usize,
    /// Total number of tokens handed out
    pub total_acquisitions: u64,
    /// Number of acquire requests that had to queue
    pub queued_acquisitions: u64,
    /// Highest number of tokens held at the same time
    pub peak_in_use: usize,
}

/// Anything an order can take burners from
#[async_trait]
pub trait BurnerSource: Send + Sync {
    /// Acquire a burner for one part of an order
    async fn acquire_for(&self, order_id: OrderId, part: PartKind) -> Result<BurnerToken>;
}

struct Waiter {
    id: u64,
    grant: oneshot::Sender<BurnerToken>,
}

struct CookerState {
    available: usize,
    waiters: VecDeque<Waiter>,
    outstanding: HashSet<u64>,
    closed: bool,
    next_waiter_id: u64,
    next_token_id: u64,
    total_acquisitions: u64,
    queued_acquisitions: u64,
    peak_in_use: usize,
}

impl CookerState {
    /// Record a new outstanding token and return its id.
    fn mint(&mut self) -> u64 {
        let id = self.next_token_id;
        self.next_token_id += 1;
        self.outstanding.insert(id);
        self.total_acquisitions += 1;
        self.peak_in_use = self.peak_in_use.max(self.outstanding.len());
        id
    }
}

struct CookerShared {
    id: u64,
    capacity: usize,
    state: Mutex<CookerState>,
}

impl CookerShared {
    fn lock(&self) -> MutexGuard<'_, CookerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Give a burner back. The head waiter, if any, receives it directly.
    fn return_unit(self: &Arc<Self>, token_id: u64) {
        let mut state = self.lock();
        if !state.outstanding.remove(&token_id) {
            return;
        }

        loop {
            let Some(waiter) = state.waiters.pop_front() else {
                state.available += 1;
                trace!(cooker = self.id, available = state.available, "Burner returned");
                return;
            };

            // The unit stays counted as outstanding while it is in flight, so a
            // concurrent acquire sees nothing free and has to queue.
            let next_id = state.mint();
            drop(state);

            let token = BurnerToken::new(Arc::clone(self), next_id);
            match waiter.grant.send(token) {
                Ok(()) => {
                    trace!(cooker = self.id, waiter = waiter.id, "Burner handed to waiter");
                    return;
                }
                Err(token) => {
                    // The waiter was cancelled after it left the queue.
                    token.disarm();
                    state = self.lock();
                    state.outstanding.remove(&next_id);
                    state.total_acquisitions -= 1;
                }
            }
        }
    }

    fn withdraw(&self, waiter_id: u64) {
        let mut state = self.lock();
        state.waiters.retain(|waiter| waiter.id != waiter_id);
    }
}

/// Exclusive use of one burner.
///
/// Tokens can be moved but never cloned. Dropping a token returns its burner
/// to the cooker that issued it, so every exit path releases the unit.
pub struct BurnerToken {
    cooker: Option<Arc<CookerShared>>,
    id: u64,
}

impl BurnerToken {
    fn new(cooker: Arc<CookerShared>, id: u64) -> Self {
        Self {
            cooker: Some(cooker),
            id,
        }
    }

    /// Token serial number, unique within its cooker
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Id of the cooker that issued this token
    pub fn cooker_id(&self) -> u64 {
        self.cooker.as_ref().map_or(0, |cooker| cooker.id)
    }

    /// Consume the token without returning its burner.
    fn disarm(mut self) {
        self.cooker = None;
    }
}

impl Drop for BurnerToken {
    fn drop(&mut self) {
        if let Some(cooker) = self.cooker.take() {
            cooker.return_unit(self.id);
        }
    }
}

impl fmt::Debug for BurnerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BurnerToken")
            .field("cooker", &self.cooker_id())
            .field("id", &self.id)
            .finish()
    }
}

/// Removes a queued request when the acquire future is dropped before it is served.
struct QueuedAcquire<'a> {
    cooker: &'a CookerShared,
    waiter_id: u64,
    grant: oneshot::Receiver<BurnerToken>,
    settled: bool,
}

impl<'a> QueuedAcquire<'a> {
    fn new(
        cooker: &'a CookerShared,
        waiter_id: u64,
        grant: oneshot::Receiver<BurnerToken>,
    ) -> Self {
        Self {
            cooker,
            waiter_id,
            grant,
            settled: false,
        }
    }

    async fn wait(&mut self) -> Result<BurnerToken> {
        let outcome = (&mut self.grant).await;
        // Granted or closed, the waiter has already left the queue either way.
        self.settled = true;
        outcome.map_err(|_| KitchenError::ResourceExhaustedPermanently)
    }
}

impl Drop for QueuedAcquire<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.cooker.withdraw(self.waiter_id);
        }
    }
}

/// Gas cooker with a fixed number of burners, shared by every order
#[derive(Clone)]
pub struct GasCooker {
    shared: Arc<CookerShared>,
}

impl GasCooker {
    /// Create a cooker with `burners` burners
    pub fn new(burners: usize) -> Self {
        let id = NEXT_COOKER_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            shared: Arc::new(CookerShared {
                id,
                capacity: burners,
                state: Mutex::new(CookerState {
                    available: burners,
                    waiters: VecDeque::new(),
                    outstanding: HashSet::new(),
                    closed: false,
                    next_waiter_id: 0,
                    next_token_id: 0,
                    total_acquisitions: 0,
                    queued_acquisitions: 0,
                    peak_in_use: 0,
                }),
            }),
        }
    }

    /// Unique id of this cooker instance
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn available(&self) -> usize {
        self.shared.lock().available
    }

    pub fn in_use(&self) -> usize {
        self.shared.lock().outstanding.len()
    }

    pub fn waiting(&self) -> usize {
        self.shared.lock().waiters.len()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    pub fn metrics(&self) -> PoolMetrics {
        let state = self.shared.lock();
        PoolMetrics {
            capacity: self.shared.capacity,
            available: state.available,
            in_use: state.outstanding.len(),
            waiting: state.waiters.len(),
            total_acquisitions: state.total_acquisitions,
            queued_acquisitions: state.queued_acquisitions,
            peak_in_use: state.peak_in_use,
        }
    }

    /// Acquire a burner, waiting in line if none is free.
    ///
    /// Fails with [`KitchenError::ResourceExhaustedPermanently`] once the cooker
    /// is closed. Dropping the returned future while it waits removes the
    /// request from the queue.
    pub async fn acquire(&self) -> Result<BurnerToken> {
        let (waiter_id, grant) = {
            let mut state = self.shared.lock();
            if state.closed {
                return Err(KitchenError::ResourceExhaustedPermanently);
            }

            if state.available > 0 && state.waiters.is_empty() {
                state.available -= 1;
                let token_id = state.mint();
                return Ok(BurnerToken::new(Arc::clone(&self.shared), token_id));
            }

            let (tx, rx) = oneshot::channel();
            let waiter_id = state.next_waiter_id;
            state.next_waiter_id += 1;
            state.queued_acquisitions += 1;
            state.waiters.push_back(Waiter {
                id: waiter_id,
                grant: tx,
            });
            (waiter_id, rx)
        };

        let mut queued = QueuedAcquire::new(&self.shared, waiter_id, grant);
        queued.wait().await
    }

    /// Return a burner explicitly.
    ///
    /// A token issued by a different cooker is rejected with
    /// [`KitchenError::InvalidTokenUse`]; this cooker's counters stay untouched
    /// and the token still goes back to the cooker that issued it.
    pub fn release(&self, token: BurnerToken) -> Result<()> {
        let issued_here = token
            .cooker
            .as_ref()
            .is_some_and(|cooker| Arc::ptr_eq(cooker, &self.shared));
        if !issued_here {
            return Err(KitchenError::InvalidTokenUse {
                reason: format!(
                    "token {} was issued by gas cooker {}, not {}",
                    token.id,
                    token.cooker_id(),
                    self.shared.id
                ),
            });
        }

        drop(token);
        Ok(())
    }

    /// Close the cooker for good.
    ///
    /// Every queued request fails with
    /// [`KitchenError::ResourceExhaustedPermanently`], and so does every later
    /// acquire. Tokens still held can be released as usual.
    pub fn close(&self) {
        let abandoned: Vec<Waiter> = {
            let mut state = self.shared.lock();
            state.closed = true;
            state.waiters.drain(..).collect()
        };
        debug!(
            cooker = self.shared.id,
            abandoned = abandoned.len(),
            "Gas cooker closed"
        );
        drop(abandoned);
    }
}

#[async_trait]
impl BurnerSource for GasCooker {
    async fn acquire_for(&self, order_id: OrderId, part: PartKind) -> Result<BurnerToken> {
        trace!(order_id, %part, "Requesting burner");
        let token = self.acquire().await?;
        debug!(order_id, %part, token = token.id(), "Burner acquired");
        Ok(token)
    }
}

impl fmt::Debug for GasCooker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GasCooker")
            .field("id", &self.shared.id)
            .field("capacity", &self.shared.capacity)
            .finish()
    }
}
