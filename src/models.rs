use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::validation::FieldError;

// Repositories returned to the front-end
pub const MAX_REPOSITORIES: usize = 12;

// Contact form after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

// GitHub user profile (subset of the REST API shape)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GitHubUser {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: String,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub created_at: String,
}

// GitHub repository (subset of the REST API shape)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub language: Option<String>,
    pub updated_at: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub fork: bool,
}

// Raw upstream result, before filtering
#[derive(Debug, Clone)]
pub struct GitHubProfile {
    pub user: GitHubUser,
    pub repositories: Vec<GitHubRepo>,
}

/// What the GitHub endpoint serves and caches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubData {
    pub user: GitHubUser,
    pub repositories: Vec<GitHubRepo>,
    pub last_updated: DateTime<Utc>,
}

impl GitHubData {
    /// Drops forks and the profile README repo (named after the user), then
    /// keeps the first [`MAX_REPOSITORIES`] in upstream order.
    pub fn from_profile(profile: GitHubProfile, fetched_at: DateTime<Utc>) -> Self {
        let login = profile.user.login.to_lowercase();
        let repositories = profile
            .repositories
            .into_iter()
            .filter(|repo| !repo.fork && repo.name.to_lowercase() != login)
            .take(MAX_REPOSITORIES)
            .collect();

        Self {
            user: profile.user,
            repositories,
            last_updated: fetched_at,
        }
    }
}

// Response bodies

#[derive(Debug, Serialize)]
pub struct ContactReceipt {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: ContactReceipt,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub message: &'static str,
    pub active_limits: usize,
}

#[derive(Debug, Serialize)]
pub struct GitHubResponse {
    pub success: bool,
    pub data: GitHubData,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

impl GitHubResponse {
    pub fn fresh(data: GitHubData) -> Self {
        Self { success: true, data, cached: false, warning: None }
    }

    pub fn cached(data: GitHubData) -> Self {
        Self { success: true, data, cached: true, warning: None }
    }

    pub fn stale(data: GitHubData) -> Self {
        Self {
            success: true,
            data,
            cached: true,
            warning: Some("Using cached data due to API error"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}
