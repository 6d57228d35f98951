use std::sync::Arc;
use crate::cache::ResponseCache;
use crate::clock::Clock;
use crate::config::Limits;
use crate::github::GitHubSource;
use crate::mailer::ContactRelay;
use crate::models::GitHubData;
use crate::rate_limit::RateLimiter;

// app's shared state, built once in main and handed to every handler
pub struct AppState {
    pub rate_limiter: RateLimiter,          // contact endpoint, per client address
    pub github_cache: ResponseCache<GitHubData>,
    pub github: Arc<dyn GitHubSource>,
    pub contact_relay: Option<ContactRelay>, // None when email is not configured
    pub default_github_user: String,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        limits: Limits,
        clock: Arc<dyn Clock>,
        github: Arc<dyn GitHubSource>,
        contact_relay: Option<ContactRelay>,
        default_github_user: String,
    ) -> Self {
        Self {
            rate_limiter: RateLimiter::new(limits.rate_limit, limits.rate_window, clock.clone()),
            github_cache: ResponseCache::new(limits.cache_ttl, clock.clone()),
            github,
            contact_relay,
            default_github_user,
            clock,
        }
    }
}
