//! GitHub API client.

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{GitHubError, Result};

/// Client for interacting with the GitHub REST API v3.
///
/// All requests are blocking; each invocation of a tool issues its
/// requests sequentially and exits.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    token: String,
    base_url: String,
    client: Client,
}

impl GitHubClient {
    /// Create a new client with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: "https://api.github.com".into(),
            client: Client::new(),
        }
    }

    /// Create a client using the GITHUB_TOKEN environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| GitHubError::MissingToken)?;
        Ok(Self::new(token))
    }

    /// Point the client at a different API root (GitHub Enterprise, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Login of the user the token belongs to.
    pub fn authenticated_user(&self) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct User {
            login: String,
        }

        let user: User = self.get("/user")?;
        Ok(user.login)
    }

    /// Default headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token)).expect("Invalid token format"),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("repoforge"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers
    }

    /// Surface a non-2xx response as an API error with its payload intact.
    fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(GitHubError::Api {
            status: status.as_u16(),
            body,
        })
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .map_err(|e| GitHubError::Decode(e.to_string()))
    }

    /// Make a GET request to the GitHub API.
    pub(crate) fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.get(&url).headers(self.headers()).send()?;
        Self::decode(Self::check(response)?)
    }

    /// Make a POST request to the GitHub API.
    pub(crate) fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()?;
        Self::decode(Self::check(response)?)
    }

    /// Make a PATCH request to the GitHub API.
    pub(crate) fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .patch(&url)
            .headers(self.headers())
            .json(body)
            .send()?;
        Self::decode(Self::check(response)?)
    }

    /// Make a PUT request with a JSON body to the GitHub API.
    pub(crate) fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .put(&url)
            .headers(self.headers())
            .json(body)
            .send()?;
        Self::decode(Self::check(response)?)
    }

    /// Make a bodyless PUT request; the API answers 204 on success.
    pub(crate) fn put_unit(&self, endpoint: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.put(&url).headers(self.headers()).send()?;
        Self::check(response)?;
        Ok(())
    }

    /// Make a DELETE request; the API answers 204 on success.
    pub(crate) fn delete(&self, endpoint: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.delete(&url).headers(self.headers()).send()?;
        Self::check(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_missing_token() {
        // No test in this crate sets GITHUB_TOKEN; clients are built with
        // an explicit token, so removing the variable here is safe.
        std::env::remove_var("GITHUB_TOKEN");
        let err = GitHubClient::from_env().unwrap_err();
        assert!(matches!(err, GitHubError::MissingToken));
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let client = GitHubClient::new("t").with_base_url("https://ghe.example.com/api/v3/");
        assert_eq!(client.base_url(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_non_success_surfaces_status_and_body() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/user")
            .with_status(401)
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create();

        let client = GitHubClient::new("bad-token").with_base_url(&server.url());
        let err = client.authenticated_user().unwrap_err();

        match err {
            GitHubError::Api { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Bad credentials"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_authenticated_user() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/user")
            .with_status(200)
            .with_body(r#"{"login":"octocat"}"#)
            .create();

        let client = GitHubClient::new("token").with_base_url(&server.url());
        assert_eq!(client.authenticated_user().unwrap(), "octocat");
        mock.assert();
    }
}
