//! Repeating truck poll with bounded backoff

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use fleetmap_types::{Error, Result};

use crate::config::Config;

/// How the wait between ticks grows while the backend is failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_delay: Duration,
    /// Consecutive failures before the outage counts as persistent
    pub persistent_after: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_delay: config.backoff_max(),
            persistent_after: config.persistent_failure_threshold.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Health of the polling loop as seen from the last ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureState {
    Healthy,
    /// Failing, but fewer times in a row than the persistent threshold
    Transient { failures: u32 },
    Persistent { failures: u32 },
}

impl FailureState {
    pub fn failures(&self) -> u32 {
        match self {
            FailureState::Healthy => 0,
            FailureState::Transient { failures } | FailureState::Persistent { failures } => *failures,
        }
    }
}

impl std::fmt::Display for FailureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureState::Healthy => write!(f, "healthy"),
            FailureState::Transient { failures } => write!(f, "transient failure ({} in a row)", failures),
            FailureState::Persistent { failures } => write!(f, "backend down ({} failures in a row)", failures),
        }
    }
}

/// Delay bookkeeping: `base * 2^(n-1)` after `n` consecutive transport
/// failures, capped at `max_delay`, back to `base` on success.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    policy: RetryPolicy,
    state: FailureState,
}

impl Backoff {
    pub fn new(base: Duration, policy: RetryPolicy) -> Self {
        Self {
            base,
            policy,
            state: FailureState::Healthy,
        }
    }

    pub fn state(&self) -> FailureState {
        self.state
    }

    /// Wait before the next tick given the current state
    pub fn delay(&self) -> Duration {
        let failures = self.state.failures();
        if failures == 0 {
            return self.base;
        }
        let factor = 1u32.checked_shl(failures - 1).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .unwrap_or(self.policy.max_delay)
            .min(self.policy.max_delay.max(self.base))
    }

    pub fn record_success(&mut self) -> Duration {
        if let FailureState::Persistent { failures } = self.state {
            info!(failures, "fleet API reachable again");
        }
        self.state = FailureState::Healthy;
        self.base
    }

    /// Only transport failures back off. Anything else is logged and the
    /// cadence is kept.
    pub fn record_failure(&mut self, err: &Error) -> Duration {
        if !err.is_transport() {
            warn!(error = %err, "truck poll failed");
            return self.delay();
        }

        let failures = self.state.failures().saturating_add(1);
        if failures >= self.policy.persistent_after {
            if !matches!(self.state, FailureState::Persistent { .. }) {
                error!(failures, error = %err, "fleet API unavailable, backing off");
            } else {
                debug!(failures, error = %err, "fleet API still unavailable");
            }
            self.state = FailureState::Persistent { failures };
        } else {
            warn!(failures, error = %err, "truck poll failed, will retry");
            self.state = FailureState::Transient { failures };
        }
        self.delay()
    }
}

/// Runs a tick now and then again after every settled tick.
///
/// Stopped while `handle` is `None`. Dropping the scheduler stops it.
pub struct PollScheduler {
    handle: Option<JoinHandle<()>>,
    policy: RetryPolicy,
    backoff: Arc<Mutex<Backoff>>,
}

impl PollScheduler {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            handle: None,
            policy,
            backoff: Arc::new(Mutex::new(Backoff::new(Duration::ZERO, policy))),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn failure_state(&self) -> FailureState {
        lock(&self.backoff).state()
    }

    /// Run `tick` once, awaited, then keep running it every `interval`
    /// on a spawned task. No-op while already running.
    pub async fn start<F, Fut>(&mut self, interval: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        if self.is_running() {
            debug!("polling already running");
            return;
        }

        *lock(&self.backoff) = Backoff::new(interval, self.policy);
        info!(interval_ms = interval.as_millis() as u64, "polling started");

        let first_delay = run_tick(&mut tick, &self.backoff).await;
        let backoff = Arc::clone(&self.backoff);
        self.handle = Some(tokio::spawn(async move {
            let mut delay = first_delay;
            loop {
                tokio::time::sleep(delay).await;
                delay = run_tick(&mut tick, &backoff).await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("polling stopped");
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_tick<F, Fut>(tick: &mut F, backoff: &Mutex<Backoff>) -> Duration
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let result = tick().await;
    let mut backoff = lock(backoff);
    match result {
        Ok(()) => backoff.record_success(),
        Err(e) => backoff.record_failure(&e),
    }
}

fn lock(backoff: &Mutex<Backoff>) -> std::sync::MutexGuard<'_, Backoff> {
    backoff.lock().unwrap_or_else(PoisonError::into_inner)
}
