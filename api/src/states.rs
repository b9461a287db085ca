use crate::{config::Config, db::Db};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Cloned into every handler. All fields are cheap `Arc` clones.
///
/// `login_limiter` throttles `POST /sessions` per account so a single
/// account cannot be brute forced.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<Config>,
    pub login_limiter: Arc<DefaultKeyedRateLimiter<Uuid>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let per_minute =
            NonZeroU32::new(config.login_attempts_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            db: Db::new(),
            config: Arc::new(config),
            login_limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
        }
    }

    /// Drop limiter entries whose quota has fully replenished
    pub fn prune_login_limiter(&self) {
        self.login_limiter.retain_recent();
        self.login_limiter.shrink_to_fit();
        debug!("Login limiter holds {} accounts", self.login_limiter.len());
    }

    /// Run [`AppState::prune_login_limiter`] every `period` until the
    /// runtime shuts down
    pub fn spawn_limiter_pruning(&self, period: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                state.prune_login_limiter();
            }
        })
    }
}
