use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use thiserror::Error;
use crate::models::{GitHubProfile, GitHubRepo, GitHubUser};

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("request to GitHub failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API error: {user} {repos}")]
    Status { user: u16, repos: u16 },
}

/// Source of profile and repository data for a GitHub login.
#[async_trait]
pub trait GitHubSource: Send + Sync {
    async fn fetch(&self, username: &str) -> Result<GitHubProfile, GitHubError>;
}

// GitHub REST API client
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(client: reqwest::Client, api_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let req = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github.v3+json")
            .header(USER_AGENT, "Portfolio-App/1.0");

        match &self.token {
            Some(token) => req.header(AUTHORIZATION, format!("token {}", token)),
            None => req,
        }
    }
}

#[async_trait]
impl GitHubSource for GitHubClient {
    async fn fetch(&self, username: &str) -> Result<GitHubProfile, GitHubError> {
        let user_url = format!("{}/users/{}", self.api_url, username);
        let repos_url = format!(
            "{}/users/{}/repos?per_page=100&sort=updated&direction=desc",
            self.api_url, username
        );

        // both requests go out together; either failing fails the fetch
        let (user_res, repos_res) =
            tokio::try_join!(self.get(user_url).send(), self.get(repos_url).send())?;

        if !user_res.status().is_success() || !repos_res.status().is_success() {
            return Err(GitHubError::Status {
                user: user_res.status().as_u16(),
                repos: repos_res.status().as_u16(),
            });
        }

        let user = user_res.json::<GitHubUser>().await?;
        let repositories = repos_res.json::<Vec<GitHubRepo>>().await?;

        Ok(GitHubProfile { user, repositories })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::serve_upstream;
    use axum::{
        Json, Router,
        extract::{Path, RawQuery},
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use serde_json::{Value, json};

    #[test]
    fn status_error_reports_both_codes() {
        let err = GitHubError::Status { user: 200, repos: 403 };
        assert_eq!(err.to_string(), "GitHub API error: 200 403");
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = GitHubClient::new(reqwest::Client::new(), "https://api.github.com/", None);
        assert_eq!(client.api_url, "https://api.github.com");
    }

    #[test]
    fn sends_token_when_configured() {
        let client = GitHubClient::new(
            reqwest::Client::new(),
            "https://api.github.com",
            Some("abc".to_string()),
        );
        let req = client.get("https://api.github.com/users/octocat".to_string()).build().unwrap();

        assert_eq!(req.headers()[AUTHORIZATION], "token abc");
        assert_eq!(req.headers()[USER_AGENT], "Portfolio-App/1.0");
        assert_eq!(req.headers()[ACCEPT], "application/vnd.github.v3+json");
    }

    #[test]
    fn omits_authorization_without_token() {
        let client = GitHubClient::new(reqwest::Client::new(), "https://api.github.com", None);
        let req = client.get("https://api.github.com/users/octocat".to_string()).build().unwrap();
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    const REPOS_QUERY: &str = "per_page=100&sort=updated&direction=desc";

    // Payloads shaped like api.github.com, extra fields included
    async fn fake_user(Path(login): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
        if headers.get(USER_AGENT).is_none() {
            return (StatusCode::FORBIDDEN, Json(json!({ "message": "User-Agent required" })));
        }
        if login == "ghost" {
            return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" })));
        }
        (
            StatusCode::OK,
            Json(json!({
                "login": login,
                "id": 583231,
                "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
                "type": "User",
                "name": "The Octocat",
                "company": "@github",
                "blog": "https://github.blog",
                "location": "San Francisco",
                "bio": null,
                "html_url": format!("https://github.com/{}", login),
                "public_repos": 8,
                "followers": 9000,
                "following": 9,
                "created_at": "2011-01-25T18:44:36Z"
            })),
        )
    }

    async fn fake_repos(
        Path(login): Path<String>,
        RawQuery(query): RawQuery,
    ) -> (StatusCode, Json<Value>) {
        if query.as_deref() != Some(REPOS_QUERY) {
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": "unexpected query" })));
        }
        if login == "norepos" {
            return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" })));
        }
        (
            StatusCode::OK,
            Json(json!([
                {
                    "id": 1296269,
                    "name": "Hello-World",
                    "full_name": format!("{}/Hello-World", login),
                    "owner": { "login": login },
                    "description": "My first repository on GitHub!",
                    "html_url": format!("https://github.com/{}/Hello-World", login),
                    "stargazers_count": 80,
                    "watchers_count": 80,
                    "forks_count": 9,
                    "language": "Rust",
                    "updated_at": "2024-01-26T19:14:43Z",
                    "topics": ["octocat", "api"],
                    "fork": false
                },
                {
                    "id": 1300192,
                    "name": "Spoon-Knife",
                    "description": null,
                    "html_url": format!("https://github.com/{}/Spoon-Knife", login),
                    "stargazers_count": 12,
                    "forks_count": 140,
                    "language": null,
                    "updated_at": "2024-01-20T10:00:00Z",
                    "fork": true
                }
            ])),
        )
    }

    async fn client_for_fake_github() -> GitHubClient {
        let app = Router::new()
            .route("/users/{login}", get(fake_user))
            .route("/users/{login}/repos", get(fake_repos));
        let base = serve_upstream(app).await;
        GitHubClient::new(reqwest::Client::new(), &base, None)
    }

    #[tokio::test]
    async fn fetches_user_and_repositories() {
        let client = client_for_fake_github().await;
        let profile = client.fetch("octocat").await.unwrap();

        assert_eq!(profile.user.login, "octocat");
        assert_eq!(profile.user.name.as_deref(), Some("The Octocat"));
        assert_eq!(profile.user.followers, 9000);
        assert_eq!(profile.repositories.len(), 2);
        assert_eq!(profile.repositories[0].topics, vec!["octocat", "api"]);
        assert!(profile.repositories[1].fork);
        assert!(profile.repositories[1].topics.is_empty());
    }

    #[tokio::test]
    async fn repos_failure_alone_fails_the_fetch() {
        let client = client_for_fake_github().await;
        let err = client.fetch("norepos").await.unwrap_err();
        assert!(matches!(err, GitHubError::Status { user: 200, repos: 404 }));
    }

    #[tokio::test]
    async fn missing_user_fails_the_fetch() {
        let client = client_for_fake_github().await;
        let err = client.fetch("ghost").await.unwrap_err();
        assert!(matches!(err, GitHubError::Status { user: 404, repos: 200 }));
    }
}
