use crate::errors::{SellingPartnerError, SellingPartnerResult};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for circuit breaker behavior.
///
/// Zero values are filled with the defaults at construction: 5 consecutive
/// failures to trip, 60 seconds open before probing.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive-failure threshold that trips the breaker open
    pub max_failures: u32,
    /// Minimum time the breaker stays open before admitting a probe
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: crate::DEFAULT_MAX_FAILURES,
            open_timeout: Duration::from_secs(crate::DEFAULT_OPEN_TIMEOUT_SECS),
        }
    }
}

/// Circuit breaker state
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CircuitState {
    /// Circuit is closed, requests flow normally
    Closed,
    /// Circuit is open, requests are rejected without execution
    Open,
    /// Circuit is half-open, probing whether the service recovered
    HalfOpen,
}

/// Hook for circuit breaker state changes.
///
/// Invoked on a spawned thread after the transition commits, never while the
/// breaker's lock is held and never blocking the caller that triggered the
/// transition. Treat it as an eventually-consistent notification: there is no
/// ordering guarantee relative to subsequent `execute` calls.
pub trait CircuitBreakerHook: Send + Sync {
    /// Called with the previous and new state after every transition
    fn on_state_change(&self, old_state: CircuitState, new_state: CircuitState);
}

// All mutable bookkeeping lives under one lock: every transition decision
// reads state, failure_count and last_failure together.
#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker guarding a degrading downstream dependency.
///
/// Wraps a fallible operation (typically an HTTP call made by the transport
/// layer) and gates admission by state:
///
/// - `Closed`: all requests pass through; `max_failures` consecutive failures
///   trip the breaker open.
/// - `Open`: requests are rejected immediately with
///   [`SellingPartnerError::CircuitOpen`] until `open_timeout` has elapsed
///   since the last failure, then the next caller is admitted as a probe.
/// - `HalfOpen`: probes pass through; one success closes the breaker, one
///   failure re-trips it.
///
/// One breaker instance per protected dependency, shared behind an `Arc`
/// across callers. The lock is not held while the wrapped operation runs, so
/// concurrent `execute` calls interleave freely between another call's
/// admission and its result recording; the failure count is an approximate
/// guard, not an exact tally.
///
/// Note on probing: every caller arriving after the open timeout elapses is
/// admitted, not just one. A thundering herd of simultaneous probes can reach
/// a barely-recovered dependency; callers needing a single exclusive probe
/// must serialize above this layer.
pub struct CircuitBreaker {
    max_failures: u32,
    open_timeout: Duration,
    inner: RwLock<BreakerInner>,
    hook: Option<Arc<dyn CircuitBreakerHook>>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration.
    ///
    /// Starts closed with a zero failure count. Zero config fields are
    /// replaced with the defaults.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let max_failures = if config.max_failures == 0 {
            crate::DEFAULT_MAX_FAILURES
        } else {
            config.max_failures
        };
        let open_timeout = if config.open_timeout.is_zero() {
            Duration::from_secs(crate::DEFAULT_OPEN_TIMEOUT_SECS)
        } else {
            config.open_timeout
        };

        Self {
            max_failures,
            open_timeout,
            inner: RwLock::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
            hook: None,
        }
    }

    /// Add a hook for circuit breaker state changes
    pub fn with_hook(mut self, hook: Arc<dyn CircuitBreakerHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Execute the given operation through the breaker.
    ///
    /// If the breaker rejects the call, the operation is never invoked and
    /// [`SellingPartnerError::CircuitOpen`] is returned immediately. If
    /// admitted, the operation runs exactly once with no lock held, and its
    /// result is returned to the caller unchanged after being recorded.
    pub async fn execute<F, Fut, T>(&self, f: F) -> SellingPartnerResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SellingPartnerResult<T>>,
    {
        if !self.try_admit() {
            tracing::debug!("circuit open, rejecting request without execution");
            return Err(SellingPartnerError::CircuitOpen);
        }

        let result = f().await;
        match &result {
            Ok(_) => self.record_success(),
            Err(e) => {
                tracing::debug!(error = %e, "recording operation failure");
                self.record_failure();
            }
        }
        result
    }

    /// Get the current state of the circuit breaker.
    ///
    /// A best-effort snapshot: a concurrent `execute` may transition the
    /// breaker at any point after the read.
    pub fn state(&self) -> CircuitState {
        self.inner.read().state
    }

    /// Get the current consecutive-failure count
    pub fn failure_count(&self) -> u32 {
        self.inner.read().failure_count
    }

    /// Get the time until the circuit transitions to half-open.
    ///
    /// Returns `None` unless the circuit is open.
    pub fn time_until_half_open(&self) -> Option<Duration> {
        let inner = self.inner.read();
        if inner.state != CircuitState::Open {
            return None;
        }
        match inner.last_failure {
            Some(last) => Some(self.open_timeout.saturating_sub(last.elapsed())),
            None => Some(Duration::ZERO),
        }
    }

    /// Unconditionally force the breaker closed with a zero failure count.
    ///
    /// If the state actually changed, the hook fires exactly as for a natural
    /// transition. Idempotent.
    pub fn reset(&self) {
        let transition = {
            let mut inner = self.inner.write();
            let old_state = inner.state;
            inner.state = CircuitState::Closed;
            inner.failure_count = 0;
            (old_state != CircuitState::Closed).then_some((old_state, CircuitState::Closed))
        };
        if let Some((old, new)) = transition {
            tracing::info!(from = ?old, to = ?new, "circuit breaker manually reset");
            self.notify_state_change(old, new);
        }
    }

    /// Admission check. Returns true if the operation may run, transitioning
    /// `Open -> HalfOpen` when the open timeout has elapsed.
    fn try_admit(&self) -> bool {
        let transition = {
            let mut inner = self.inner.write();
            match inner.state {
                CircuitState::Closed | CircuitState::HalfOpen => None,
                CircuitState::Open => {
                    let expired = inner
                        .last_failure
                        .map(|last| last.elapsed() > self.open_timeout)
                        .unwrap_or(true);
                    if !expired {
                        return false;
                    }
                    inner.state = CircuitState::HalfOpen;
                    Some((CircuitState::Open, CircuitState::HalfOpen))
                }
            }
        };
        if let Some((old, new)) = transition {
            tracing::info!(from = ?old, to = ?new, "circuit breaker admitting probe");
            self.notify_state_change(old, new);
        }
        true
    }

    /// Record a successful operation
    fn record_success(&self) {
        let transition = {
            let mut inner = self.inner.write();
            match inner.state {
                CircuitState::Closed => {
                    inner.failure_count = 0;
                    None
                }
                CircuitState::HalfOpen => {
                    inner.failure_count = 0;
                    inner.state = CircuitState::Closed;
                    Some((CircuitState::HalfOpen, CircuitState::Closed))
                }
                // A delayed in-flight operation completing after an
                // out-of-band reset: state untouched.
                CircuitState::Open => None,
            }
        };
        if let Some((old, new)) = transition {
            tracing::info!(from = ?old, to = ?new, "circuit breaker recovered");
            self.notify_state_change(old, new);
        }
    }

    /// Record a failed operation
    fn record_failure(&self) {
        let transition = {
            let mut inner = self.inner.write();
            inner.failure_count = inner.failure_count.saturating_add(1);
            inner.last_failure = Some(Instant::now());

            match inner.state {
                CircuitState::Closed if inner.failure_count >= self.max_failures => {
                    inner.state = CircuitState::Open;
                    Some((CircuitState::Closed, CircuitState::Open))
                }
                // A single probe failure re-trips the breaker; the failure
                // count is not reset on this edge.
                CircuitState::HalfOpen => {
                    inner.state = CircuitState::Open;
                    Some((CircuitState::HalfOpen, CircuitState::Open))
                }
                _ => None,
            }
        };
        if let Some((old, new)) = transition {
            tracing::warn!(from = ?old, to = ?new, "circuit breaker tripped");
            self.notify_state_change(old, new);
        }
    }

    // Fire-and-forget dispatch on a fresh thread so the hook cannot block the
    // transitioning caller and cannot deadlock by re-entering the breaker.
    fn notify_state_change(&self, old: CircuitState, new: CircuitState) {
        if let Some(hook) = &self.hook {
            let hook = Arc::clone(hook);
            std::thread::spawn(move || hook.on_state_change(old, new));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_breaker(max_failures: u32, open_timeout: Duration) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            max_failures,
            open_timeout,
        })
    }

    async fn fail(cb: &CircuitBreaker) -> SellingPartnerResult<u32> {
        cb.execute(|| async {
            Err(SellingPartnerError::Server {
                message: "Service unavailable".to_string(),
                status_code: Some(503),
            })
        })
        .await
    }

    async fn succeed(cb: &CircuitBreaker) -> SellingPartnerResult<u32> {
        cb.execute(|| async { Ok(42) }).await
    }

    #[test]
    fn test_circuit_breaker_starts_closed() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig::default());
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
    }

    #[test]
    fn test_zero_config_fields_use_defaults() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            max_failures: 0,
            open_timeout: Duration::ZERO,
        });
        assert_eq!(cb.max_failures, crate::DEFAULT_MAX_FAILURES);
        assert_eq!(
            cb.open_timeout,
            Duration::from_secs(crate::DEFAULT_OPEN_TIMEOUT_SECS)
        );
    }

    #[tokio::test]
    async fn test_circuit_breaker_opens_after_threshold() {
        let cb = failing_breaker(3, Duration::from_secs(60));

        assert!(fail(&cb).await.is_err());
        assert!(fail(&cb).await.is_err());
        assert_eq!(cb.state(), CircuitState::Closed);

        assert!(fail(&cb).await.is_err());
        assert_eq!(cb.state(), CircuitState::Open);
        assert_eq!(cb.failure_count(), 3);
    }

    #[tokio::test]
    async fn test_open_circuit_rejects_with_sentinel() {
        let cb = failing_breaker(1, Duration::from_secs(60));
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        let result = succeed(&cb).await;
        assert!(matches!(result, Err(SellingPartnerError::CircuitOpen)));
    }

    #[tokio::test]
    async fn test_operation_error_forwarded_unchanged() {
        let cb = failing_breaker(5, Duration::from_secs(60));
        let result = fail(&cb).await;
        match result {
            Err(SellingPartnerError::Server { status_code, .. }) => {
                assert_eq!(status_code, Some(503));
            }
            other => panic!("expected server error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_success_resets_counter_without_state_change() {
        let cb = failing_breaker(3, Duration::from_secs(60));

        let _ = fail(&cb).await;
        let _ = fail(&cb).await;
        assert_eq!(cb.failure_count(), 2);
        assert_eq!(cb.state(), CircuitState::Closed);

        assert!(succeed(&cb).await.is_ok());
        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_to_closed_on_probe_success() {
        let cb = failing_breaker(2, Duration::from_millis(10));

        let _ = fail(&cb).await;
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(succeed(&cb).await.is_ok());
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_half_open_to_open_on_probe_failure() {
        let cb = failing_breaker(2, Duration::from_millis(10));

        let _ = fail(&cb).await;
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(fail(&cb).await.is_err());
        assert_eq!(cb.state(), CircuitState::Open);
        // Probe failure increments rather than resets the streak
        assert_eq!(cb.failure_count(), 3);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let cb = failing_breaker(1, Duration::from_secs(60));
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);

        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
    }

    #[test]
    fn test_time_until_half_open() {
        let cb = failing_breaker(1, Duration::from_millis(100));
        assert_eq!(cb.time_until_half_open(), None);

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        let remaining = cb.time_until_half_open();
        assert!(remaining.is_some());
        assert!(remaining.unwrap() <= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_straggler_success_after_reset_is_a_no_op() {
        let cb = failing_breaker(1, Duration::from_secs(60));
        let _ = fail(&cb).await;
        assert_eq!(cb.state(), CircuitState::Open);

        // A success recorded while open (e.g. a delayed in-flight operation
        // finishing after the trip) must not change state.
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Open);
    }
}
