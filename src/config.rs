use chrono::TimeDelta;
use clap::Parser;
use std::time::Duration;
use thiserror::Error;

// CLI argument structure; every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "portfolio-api")]
#[command(about = "Contact relay and GitHub data proxy for the portfolio site")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // GitHub user served when the request does not name one
    #[arg(long, env = "GITHUB_USER", default_value = "mo7amed4522")]
    pub github_user: String,

    // Optional token, raises GitHub's rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    // Cache TTL in seconds
    #[arg(short, long, env = "CACHE_TTL", default_value_t = 300)]
    pub cache_ttl: u64,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 5)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 3600)]
    pub rate_window: u64,

    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    #[arg(long, env = "RESEND_API_URL", default_value = "https://api.resend.com")]
    pub resend_api_url: String,

    // Inbox that receives contact submissions
    #[arg(long, env = "CONTACT_EMAIL")]
    pub contact_email: Option<String>,

    #[arg(
        long,
        env = "MAIL_FROM",
        default_value = "Portfolio Contact <noreply@khaled-portfolio.vercel.app>"
    )]
    pub mail_from: String,

    // Timeout for GitHub and Resend calls, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT", default_value_t = 10)]
    pub upstream_timeout: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--rate-limit must be at least 1")]
    ZeroRateLimit,

    #[error("--{name} must be between 1 and {max} seconds, got {value}")]
    BadDuration { name: &'static str, value: u64, max: u64 },
}

/// Limits validated from [`Args`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub rate_limit: u32,
    pub rate_window: TimeDelta,
    pub cache_ttl: TimeDelta,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            rate_limit: 5,
            rate_window: TimeDelta::hours(1),
            cache_ttl: TimeDelta::minutes(5),
        }
    }
}

// a year is far more than either window needs
const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

impl Args {
    pub fn limits(&self) -> Result<Limits, ConfigError> {
        if self.rate_limit == 0 {
            return Err(ConfigError::ZeroRateLimit);
        }
        Ok(Limits {
            rate_limit: self.rate_limit,
            rate_window: seconds("rate-window", self.rate_window)?,
            cache_ttl: seconds("cache-ttl", self.cache_ttl)?,
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

fn seconds(name: &'static str, value: u64) -> Result<TimeDelta, ConfigError> {
    let err = ConfigError::BadDuration { name, value, max: MAX_WINDOW_SECS };
    if value == 0 || value > MAX_WINDOW_SECS {
        return Err(err);
    }
    i64::try_from(value).ok().and_then(TimeDelta::try_seconds).ok_or(err)
}
