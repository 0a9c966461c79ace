use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Minimum time between two search requests to the provider.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(2000);

type Clearance = Shared<BoxFuture<'static, ()>>;

#[derive(Default)]
struct LimiterState {
    last_clearance: Option<Instant>,
    pending: Option<Clearance>,
}

/// Throttles outbound requests to at most one per `min_interval`.
///
/// Callers that arrive while a delay is already armed share that single delay
/// and are released together when it fires. There is no fairness or ordering
/// among them.
pub struct RateLimiter {
    min_interval: Duration,
    state: Arc<Mutex<LimiterState>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Arc::new(Mutex::new(LimiterState::default())),
        }
    }

    /// Resolve once it is safe to send the next request.
    pub async fn wait(&self) {
        let clearance = {
            let mut state = self.state.lock();

            if let Some(pending) = &state.pending {
                pending.clone()
            } else {
                let now = Instant::now();
                match state.last_clearance {
                    Some(last) if now.duration_since(last) < self.min_interval => {
                        let deadline = last + self.min_interval;
                        tracing::debug!(
                            wait_ms = (deadline - now).as_millis() as u64,
                            "Rate limit delay armed"
                        );
                        let clearance = Self::arm(Arc::downgrade(&self.state), deadline);
                        state.pending = Some(clearance.clone());
                        clearance
                    }
                    _ => {
                        state.last_clearance = Some(now);
                        return;
                    }
                }
            }
        };

        clearance.await;
    }

    fn arm(state: Weak<Mutex<LimiterState>>, deadline: Instant) -> Clearance {
        async move {
            sleep_until(deadline).await;
            if let Some(state) = state.upgrade() {
                let mut state = state.lock();
                state.last_clearance = Some(Instant::now());
                state.pending = None;
            }
        }
        .boxed()
        .shared()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
