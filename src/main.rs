mod cache;
mod clock;
mod config;
mod error;
mod github;
mod handlers;
mod mailer;
mod metrics;
mod models;
mod rate_limit;
mod state;
mod validation;

use clap::Parser; // for cli
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::clock::{Clock, SystemClock};
use crate::config::Args;
use crate::github::GitHubClient;
use crate::mailer::{ContactRelay, ResendMailer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();
    let limits = args.limits()?;

    let client = reqwest::Client::builder()
        .timeout(args.upstream_timeout())
        .build()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let github = Arc::new(GitHubClient::new(
        client.clone(),
        &args.github_api_url,
        args.github_token.clone(),
    ));

    let contact_relay = match (args.resend_api_key.clone(), args.contact_email.clone()) {
        (Some(api_key), Some(to)) => Some(ContactRelay {
            mailer: Arc::new(ResendMailer::new(client, &args.resend_api_url, api_key)),
            from: args.mail_from.clone(),
            to,
        }),
        _ => {
            tracing::warn!("RESEND_API_KEY or CONTACT_EMAIL not set, contact submissions will fail");
            None
        }
    };

    // creating shared state
    let state = Arc::new(AppState::new(
        limits,
        clock,
        github,
        contact_relay,
        args.github_user.clone(),
    ));

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Portfolio API running on http://localhost:{}", args.port);
    tracing::info!("Default GitHub user: {}", args.github_user);
    tracing::info!("GitHub cache TTL: {} seconds", args.cache_ttl);
    tracing::info!(
        "Contact rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );

    axum::serve(listener, app).await?;
    Ok(())
}
