//! Connection pool primitives for the tfb store layer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::MAX_CONNECTION_COUNT;

struct PoolState<T> {
    idle: Vec<T>,
}

/// Sizing limits fixed when the pool is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolLimits {
    /// Upper bound on connections checked out or idle at once.
    pub max_open: usize,
    /// Upper bound on connections kept around while idle. Connections
    /// released past this bound are closed.
    pub max_idle: usize,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_open: MAX_CONNECTION_COUNT,
            max_idle: MAX_CONNECTION_COUNT,
        }
    }
}

type Factory<T> = Box<dyn Fn() -> Result<T, String> + Send + Sync>;

/// A bounded pool for reusable connection-like objects.
pub struct Pool<T> {
    limits: PoolLimits,
    factory: Factory<T>,
    state: Mutex<PoolState<T>>,
    available: Condvar,
    in_flight: AtomicUsize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AcquireError {
    #[error("timed out waiting for a pooled connection")]
    Timeout,
    #[error("failed to open connection: {0}")]
    Create(String),
}

/// A pooled value that returns to the pool on drop.
pub struct Pooled<T> {
    pool: Arc<Pool<T>>,
    value: Option<T>,
}

impl<T> Pool<T> {
    pub fn new<F, E>(limits: PoolLimits, factory: F) -> Arc<Self>
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: std::fmt::Display,
    {
        let factory: Factory<T> = Box::new(move || factory().map_err(|err| err.to_string()));
        Arc::new(Self {
            limits: PoolLimits {
                max_open: limits.max_open.max(1),
                max_idle: limits.max_idle,
            },
            factory,
            state: Mutex::new(PoolState { idle: Vec::new() }),
            available: Condvar::new(),
            in_flight: AtomicUsize::new(0),
        })
    }

    /// Check out an idle connection, opening a new one while under
    /// `max_open`. `None` waits indefinitely.
    pub fn acquire(self: &Arc<Self>, timeout: Option<Duration>) -> Result<Pooled<T>, AcquireError> {
        let deadline = timeout.map(|limit| Instant::now() + limit);
        let mut state = self.lock_state();
        loop {
            if let Some(item) = state.idle.pop() {
                return Ok(Pooled {
                    pool: Arc::clone(self),
                    value: Some(item),
                });
            }

            if self.in_flight.load(Ordering::SeqCst) < self.limits.max_open {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                drop(state);
                return match (self.factory)() {
                    Ok(item) => Ok(Pooled {
                        pool: Arc::clone(self),
                        value: Some(item),
                    }),
                    Err(err) => {
                        self.discard();
                        Err(AcquireError::Create(err))
                    }
                };
            }

            state = match deadline {
                None => self
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(limit) => {
                    let now = Instant::now();
                    if now >= limit {
                        return Err(AcquireError::Timeout);
                    }
                    let (guard, _) = self
                        .available
                        .wait_timeout(state, limit - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    guard
                }
            };
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn idle_count(&self) -> usize {
        self.lock_state().idle.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // `in_flight` only drops under the state lock; a waiter that saw the
    // pool full is parked on `available` before the notify.
    fn release(&self, item: T) {
        let mut state = self.lock_state();
        if state.idle.len() < self.limits.max_idle {
            state.idle.push(item);
            self.available.notify_one();
            return;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.available.notify_one();
        drop(state);
        drop(item);
    }

    fn discard(&self) {
        let _state = self.lock_state();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.available.notify_one();
    }
}

impl<T> Pooled<T> {
    /// Close the connection instead of returning it to the pool.
    pub fn discard(mut self) {
        if self.value.take().is_some() {
            self.pool.discard();
        }
    }
}

impl<T> AsRef<T> for Pooled<T> {
    fn as_ref(&self) -> &T {
        // Only `discard` and `drop` take the value, and both consume the guard.
        match self.value.as_ref() {
            Some(value) => value,
            None => unreachable!("pooled value released while borrowed"),
        }
    }
}

impl<T> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(item) = self.value.take() {
            self.pool.release(item);
        }
    }
}
