//! Per-operation deadlines and cooperative cancellation.
//!
//! Every remote call made by the resource runs inside an [`OperationContext`]:
//! a fixed budget for the operation (create/read/update/delete) combined with
//! a [`StopSignal`] owned by whoever drives the lifecycle. Whichever fires
//! first abandons the in-flight call.

use std::future::Future;
use std::time::Duration;

use core_config::{env_parse, ConfigError, FromEnv};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Largest budget accepted from configuration (one week)
pub const MAX_TIMEOUT_MINUTES: u64 = 7 * 24 * 60;

/// Stand-in for "no deadline" when a budget cannot be represented as an instant
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `Instant::now() + budget`, saturating to a far-future instant instead of
/// overflowing.
pub(crate) fn deadline_after(budget: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(budget)
        .unwrap_or_else(|| now + FAR_FUTURE)
}

/// Budgets for each lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTimeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_WRITE_TIMEOUT,
            read: DEFAULT_READ_TIMEOUT,
            update: DEFAULT_WRITE_TIMEOUT,
            delete: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl FromEnv for ResourceTimeouts {
    /// Reads `PRICING_TIMEOUT_{CREATE,READ,UPDATE,DELETE}_MINUTES`, each at
    /// most [`MAX_TIMEOUT_MINUTES`]
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let minutes = |key: &str, default: Duration| -> Result<Duration, ConfigError> {
            let value = env_parse(key, default.as_secs() / 60)?;
            if value > MAX_TIMEOUT_MINUTES {
                return Err(ConfigError::ParseError {
                    key: key.to_string(),
                    details: format!(
                        "{} minutes exceeds the maximum of {}",
                        value, MAX_TIMEOUT_MINUTES
                    ),
                });
            }
            Ok(Duration::from_secs(value * 60))
        };

        Ok(Self {
            create: minutes("PRICING_TIMEOUT_CREATE_MINUTES", defaults.create)?,
            read: minutes("PRICING_TIMEOUT_READ_MINUTES", defaults.read)?,
            update: minutes("PRICING_TIMEOUT_UPDATE_MINUTES", defaults.update)?,
            delete: minutes("PRICING_TIMEOUT_DELETE_MINUTES", defaults.delete)?,
        })
    }
}

impl ResourceTimeouts {
    pub fn for_create(&self, stop: &StopSignal) -> OperationContext {
        OperationContext::new(stop, self.create)
    }

    pub fn for_read(&self, stop: &StopSignal) -> OperationContext {
        OperationContext::new(stop, self.read)
    }

    pub fn for_update(&self, stop: &StopSignal) -> OperationContext {
        OperationContext::new(stop, self.update)
    }

    pub fn for_delete(&self, stop: &StopSignal) -> OperationContext {
        OperationContext::new(stop, self.delete)
    }
}

/// Cancellation signal owned by the caller; flipping it to `true` stops work.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// Create a signal together with the sender that triggers it
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    /// A signal that never fires
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    async fn stopped(&self) {
        let mut rx = self.rx.clone();
        // A dropped sender can no longer stop us.
        let closed = rx.wait_for(|stopped| *stopped).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// Deadline plus stop signal for a single lifecycle operation
#[derive(Debug, Clone)]
pub struct OperationContext {
    stop: StopSignal,
    budget: Duration,
    deadline: Instant,
}

impl OperationContext {
    /// The deadline starts counting now and is shared by every call made
    /// through this context.
    pub fn new(stop: &StopSignal, budget: Duration) -> Self {
        Self {
            stop: stop.clone(),
            budget,
            deadline: deadline_after(budget),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Drive `call` until it completes, the deadline passes, or the stop
    /// signal fires.
    pub async fn run<T, F>(&self, call: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if self.stop.is_stopped() {
            return Err(ClientError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.stop.stopped() => Err(ClientError::Cancelled),
            result = tokio::time::timeout_at(self.deadline, call) => {
                result.unwrap_or_else(|_| Err(ClientError::Timeout(self.budget)))
            }
        }
    }
}
