//! Repository operations: creation, lookup, default branch.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::client::GitHubClient;
use crate::error::Result;

/// A repository addressed by owner login and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The account a repository lives under: the authenticated user when no
/// organization flag was given, an organization otherwise.
#[derive(Debug, Clone)]
pub enum Owner {
    User,
    Org(String),
}

impl Owner {
    pub fn from_flag(org: Option<String>) -> Self {
        match org {
            Some(org) => Self::Org(org),
            None => Self::User,
        }
    }

    /// Resolve the owner's login, asking the API for the authenticated
    /// user when no organization was named.
    pub fn login(&self, client: &GitHubClient) -> Result<String> {
        match self {
            Self::User => client.authenticated_user(),
            Self::Org(org) => Ok(org.clone()),
        }
    }

    /// Address a repository under this owner.
    pub fn repo(&self, client: &GitHubClient, name: &str) -> Result<RepoRef> {
        Ok(RepoRef::new(self.login(client)?, name))
    }
}

/// Repository information from the GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub default_branch: String,
    pub html_url: String,
    #[serde(rename = "private")]
    pub is_private: bool,
    pub description: Option<String>,
}

/// Request body for repository creation.
///
/// Optional text fields are omitted from the payload when unset so the
/// API applies its own defaults.
#[derive(Debug, Clone, Serialize)]
pub struct NewRepository {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub private: bool,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_downloads: bool,
    pub has_projects: bool,
    pub auto_init: bool,
    pub allow_squash_merge: bool,
    pub allow_merge_commit: bool,
    pub allow_rebase_merge: bool,
}

impl NewRepository {
    /// A public repository with every feature enabled, matching the
    /// API defaults for a plain create call.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            homepage: None,
            private: false,
            has_issues: true,
            has_wiki: true,
            has_downloads: true,
            has_projects: true,
            auto_init: false,
            allow_squash_merge: true,
            allow_merge_commit: true,
            allow_rebase_merge: true,
        }
    }
}

/// Repository-level operations.
pub trait RepoOps {
    /// Create a repository under the user or an organization.
    fn create_repo(&self, owner: &Owner, repo: &NewRepository) -> Result<Repository>;

    /// Get a specific repository.
    fn get_repo(&self, repo: &RepoRef) -> Result<Repository>;

    /// Set the default branch of a repository.
    fn set_default_branch(&self, repo: &RepoRef, branch: &str) -> Result<Repository>;
}

impl RepoOps for GitHubClient {
    fn create_repo(&self, owner: &Owner, repo: &NewRepository) -> Result<Repository> {
        let endpoint = match owner {
            Owner::User => "/user/repos".to_string(),
            Owner::Org(org) => format!("/orgs/{}/repos", org),
        };
        self.post(&endpoint, repo)
    }

    fn get_repo(&self, repo: &RepoRef) -> Result<Repository> {
        let endpoint = format!("/repos/{}/{}", repo.owner, repo.name);
        self.get(&endpoint)
    }

    fn set_default_branch(&self, repo: &RepoRef, branch: &str) -> Result<Repository> {
        let endpoint = format!("/repos/{}/{}", repo.owner, repo.name);
        self.patch(&endpoint, &serde_json::json!({ "default_branch": branch }))
    }
}

/// Copy the source repository's default branch setting to the destination.
///
/// The branch must already exist in the destination repository; the API
/// error is surfaced otherwise. Returns the branch name that was set.
pub fn clone_default_branch(
    client: &GitHubClient,
    source: &RepoRef,
    dest: &RepoRef,
) -> Result<String> {
    let branch = client.get_repo(source)?.default_branch;
    tracing::info!("setting default branch '{}' on '{}'", branch, dest);
    client.set_default_branch(dest, &branch)?;
    Ok(branch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_repository_omits_unset_fields() {
        let body = serde_json::to_value(NewRepository::new("widgets")).unwrap();
        assert_eq!(body["name"], "widgets");
        assert!(body.get("description").is_none());
        assert!(body.get("homepage").is_none());
        assert_eq!(body["auto_init"], false);
        assert_eq!(body["allow_rebase_merge"], true);
    }

    #[test]
    fn test_create_repo_in_org_posts_once() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/orgs/acme/repos")
            .with_status(201)
            .with_body(
                r#"{
                    "id": 42,
                    "name": "widgets",
                    "full_name": "acme/widgets",
                    "default_branch": "main",
                    "html_url": "https://github.com/acme/widgets",
                    "private": true,
                    "description": null
                }"#,
            )
            .expect(1)
            .create();

        let client = GitHubClient::new("token").with_base_url(&server.url());
        let mut new_repo = NewRepository::new("widgets");
        new_repo.private = true;

        let repo = client
            .create_repo(&Owner::Org("acme".into()), &new_repo)
            .unwrap();

        assert_eq!(repo.id, 42);
        assert_eq!(repo.full_name, "acme/widgets");
        assert!(repo.is_private);
        mock.assert();
    }

    #[test]
    fn test_create_repo_for_user_uses_user_endpoint() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/user/repos")
            .with_status(201)
            .with_body(
                r#"{
                    "id": 7,
                    "name": "widgets",
                    "full_name": "octocat/widgets",
                    "default_branch": "main",
                    "html_url": "https://github.com/octocat/widgets",
                    "private": false,
                    "description": "tools"
                }"#,
            )
            .create();

        let client = GitHubClient::new("token").with_base_url(&server.url());
        let repo = client
            .create_repo(&Owner::User, &NewRepository::new("widgets"))
            .unwrap();

        assert_eq!(repo.description.as_deref(), Some("tools"));
        mock.assert();
    }

    #[test]
    fn test_clone_default_branch() {
        let mut server = mockito::Server::new();
        let get = server
            .mock("GET", "/repos/acme/src")
            .with_status(200)
            .with_body(
                r#"{
                    "id": 1,
                    "name": "src",
                    "full_name": "acme/src",
                    "default_branch": "develop",
                    "html_url": "https://github.com/acme/src",
                    "private": false,
                    "description": null
                }"#,
            )
            .create();
        let patch = server
            .mock("PATCH", "/repos/acme/dst")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({ "default_branch": "develop" }),
            ))
            .with_status(200)
            .with_body(
                r#"{
                    "id": 2,
                    "name": "dst",
                    "full_name": "acme/dst",
                    "default_branch": "develop",
                    "html_url": "https://github.com/acme/dst",
                    "private": false,
                    "description": null
                }"#,
            )
            .create();

        let client = GitHubClient::new("token").with_base_url(&server.url());
        let branch = clone_default_branch(
            &client,
            &RepoRef::new("acme", "src"),
            &RepoRef::new("acme", "dst"),
        )
        .unwrap();

        assert_eq!(branch, "develop");
        get.assert();
        patch.assert();
    }

    #[test]
    fn test_owner_login_resolves_user() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/user")
            .with_status(200)
            .with_body(r#"{"login":"octocat"}"#)
            .create();

        let client = GitHubClient::new("token").with_base_url(&server.url());
        assert_eq!(Owner::User.login(&client).unwrap(), "octocat");
        assert_eq!(
            Owner::Org("acme".into()).login(&client).unwrap(),
            "acme"
        );
    }
}
