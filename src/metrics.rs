use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref CONTACT_REQUESTS: Counter =
        register_counter!("portfolio_contact_requests_total", "Total contact form submissions received").unwrap();
    pub static ref CONTACT_RATE_LIMITED: Counter =
        register_counter!("portfolio_contact_rate_limited_total", "Contact submissions rejected by the rate limiter").unwrap();
    pub static ref EMAILS_SENT: Counter =
        register_counter!("portfolio_emails_sent_total", "Contact emails accepted by the email provider").unwrap();
    pub static ref RATE_LIMIT_KEYS: Gauge =
        register_gauge!("portfolio_rate_limit_keys", "Client addresses tracked by the rate limiter").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("portfolio_github_cache_hits_total", "Fresh GitHub cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("portfolio_github_cache_misses_total", "GitHub requests that went upstream").unwrap();
    pub static ref CACHE_STALE_SERVED: Counter =
        register_counter!("portfolio_github_cache_stale_total", "Stale GitHub data served after an upstream failure").unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("portfolio_github_cache_size", "Current number of items in the GitHub cache").unwrap();
    pub static ref GITHUB_FETCH_LATENCY: Histogram = register_histogram!(
        "portfolio_github_fetch_latency_seconds",
        "GitHub upstream fetch latency in seconds"
    )
    .unwrap();
}
