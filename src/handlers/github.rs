use axum::{Json, extract::{Query, State}};
use serde::Deserialize;
use std::sync::Arc;
use crate::cache::github_cache_key;
use crate::error::ApiError;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE, CACHE_STALE_SERVED, GITHUB_FETCH_LATENCY};
use crate::models::{GitHubData, GitHubResponse, StatusResponse};
use crate::state::AppState;
use crate::validation::is_valid_username;

#[derive(Debug, Deserialize)]
pub struct GitHubQuery {
    pub user: Option<String>,
}

/// Serves a fresh cache hit, otherwise fetches from GitHub. When the fetch
/// fails any cached entry, however old, is served with a warning.
pub async fn github_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GitHubQuery>,
) -> Result<Json<GitHubResponse>, ApiError> {
    let username = query
        .user
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| state.default_github_user.clone());
    if !is_valid_username(&username) {
        return Err(ApiError::InvalidUsername(username));
    }

    let key = github_cache_key(&username);

    // check cache first
    if let Some(hit) = state.github_cache.get(&key) {
        if hit.fresh {
            CACHE_HITS.inc();
            tracing::debug!(user = %username, "github cache hit");
            return Ok(Json(GitHubResponse::cached(hit.data)));
        }
    }
    CACHE_MISSES.inc();

    let timer = GITHUB_FETCH_LATENCY.start_timer();
    let result = state.github.fetch(&username).await;
    timer.observe_duration();

    match result {
        Ok(profile) => {
            let data = GitHubData::from_profile(profile, state.clock.now());
            state.github_cache.put(&key, data.clone());
            CACHE_SIZE.set(state.github_cache.len() as f64);
            tracing::info!(user = %username, repositories = data.repositories.len(), "github data refreshed");
            Ok(Json(GitHubResponse::fresh(data)))
        }
        Err(e) => {
            tracing::error!(user = %username, error = %e, "github fetch failed");
            match state.github_cache.get(&key) {
                Some(stale) => {
                    CACHE_STALE_SERVED.inc();
                    tracing::warn!(user = %username, "serving cached github data after upstream failure");
                    Ok(Json(GitHubResponse::stale(stale.data)))
                }
                None => Err(ApiError::GitHub(e)),
            }
        }
    }
}

pub async fn clear_cache_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    state.github_cache.clear();
    CACHE_SIZE.set(0.0);
    tracing::info!("github cache cleared");

    Json(StatusResponse {
        success: true,
        message: "GitHub API cache cleared",
    })
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::Harness;
    use axum::{body::Body, http::{Request, StatusCode}};
    use chrono::TimeDelta;
    use std::sync::atomic::Ordering;

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn second_call_within_five_minutes_is_cached() {
        let harness = Harness::new();

        let (status, first) = harness.send(get("/api/github?user=octocat")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["success"], true);
        assert_eq!(first["cached"], false);
        assert_eq!(first["data"]["user"]["login"], "octocat");
        assert_eq!(first["data"]["repositories"].as_array().unwrap().len(), 1);
        assert!(first["data"]["lastUpdated"].is_string());

        harness.clock.advance(TimeDelta::minutes(4));
        let (_, second) = harness.send(get("/api/github?user=octocat")).await;
        assert_eq!(second["cached"], true);
        assert_eq!(second["data"], first["data"]);
        assert!(second.get("warning").is_none());
        assert_eq!(harness.github.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refetches_after_the_freshness_window() {
        let harness = Harness::new();
        harness.send(get("/api/github?user=octocat")).await;

        harness.clock.advance(TimeDelta::minutes(5));
        let (_, body) = harness.send(get("/api/github?user=octocat")).await;
        assert_eq!(body["cached"], false);
        assert_eq!(harness.github.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn upstream_failure_serves_stale_data_with_warning() {
        let harness = Harness::new();
        let (_, first) = harness.send(get("/api/github?user=octocat")).await;

        harness.clock.advance(TimeDelta::hours(2));
        harness.github.fail.store(true, Ordering::SeqCst);
        let (status, body) = harness.send(get("/api/github?user=octocat")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["cached"], true);
        assert_eq!(body["warning"], "Using cached data due to API error");
        assert_eq!(body["data"], first["data"]);
    }

    #[tokio::test]
    async fn upstream_failure_without_cache_is_a_server_error() {
        let harness = Harness::new();
        harness.github.fail.store(true, Ordering::SeqCst);

        let (status, body) = harness.send(get("/api/github?user=octocat")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to fetch GitHub data");
        assert!(!body.to_string().contains("503"));
    }

    #[tokio::test]
    async fn defaults_to_configured_user() {
        let harness = Harness::new();
        let (_, body) = harness.send(get("/api/github")).await;
        assert_eq!(body["data"]["user"]["login"], "octocat");

        let (_, body) = harness.send(get("/api/github?user=")).await;
        assert_eq!(body["cached"], true);
    }

    #[tokio::test]
    async fn users_are_cached_separately() {
        let harness = Harness::new();
        harness.send(get("/api/github?user=octocat")).await;
        let (_, body) = harness.send(get("/api/github?user=hubot")).await;

        assert_eq!(body["cached"], false);
        assert_eq!(body["data"]["user"]["login"], "hubot");
        assert_eq!(harness.state.github_cache.len(), 2);
    }

    #[tokio::test]
    async fn rejects_malformed_usernames() {
        let harness = Harness::new();
        let (status, body) = harness.send(get("/api/github?user=..%2Fadmin")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid username");
        assert_eq!(harness.github.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_clears_the_cache() {
        let harness = Harness::new();
        harness.send(get("/api/github?user=octocat")).await;

        let req = Request::delete("/api/github").body(Body::empty()).unwrap();
        let (status, body) = harness.send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "GitHub API cache cleared");
        assert!(harness.state.github_cache.get("github-octocat").is_none());

        // with the cache gone a failing upstream surfaces as an error
        harness.github.fail.store(true, Ordering::SeqCst);
        let (status, _) = harness.send(get("/api/github?user=octocat")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
