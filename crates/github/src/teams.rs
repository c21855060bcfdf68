//! Team access operations.
//!
//! Teams are an organization concept: cloning team access only works
//! between two repositories of the same organization, and permission
//! levels are reset to the organization default.

use serde::Deserialize;

use crate::client::GitHubClient;
use crate::error::Result;
use crate::repos::RepoRef;

/// A team with access to a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub name: String,
    pub slug: String,
}

/// Team-level operations.
pub trait TeamOps {
    /// List every team with access to a repository, following pagination.
    fn list_repo_teams(&self, repo: &RepoRef) -> Result<Vec<Team>>;

    /// Give a team access to a repository at the default permission level.
    fn add_team_to_repo(&self, org: &str, team_slug: &str, repo: &RepoRef) -> Result<()>;
}

impl TeamOps for GitHubClient {
    fn list_repo_teams(&self, repo: &RepoRef) -> Result<Vec<Team>> {
        let mut all_teams = Vec::new();
        let mut page = 1;

        loop {
            let endpoint = format!(
                "/repos/{}/{}/teams?per_page=100&page={}",
                repo.owner, repo.name, page
            );
            let teams: Vec<Team> = self.get(&endpoint)?;

            if teams.is_empty() {
                break;
            }

            all_teams.extend(teams);
            page += 1;

            // Safety limit to prevent infinite loops
            if page > 100 {
                break;
            }
        }

        Ok(all_teams)
    }

    fn add_team_to_repo(&self, org: &str, team_slug: &str, repo: &RepoRef) -> Result<()> {
        let endpoint = format!(
            "/orgs/{}/teams/{}/repos/{}/{}",
            org, team_slug, repo.owner, repo.name
        );
        self.put_unit(&endpoint)
    }
}

/// Give every team of `source` access to `dest` within `org`.
///
/// Teams that cannot be added are logged as warnings and the remaining
/// teams are still attempted; the last error is returned afterwards so
/// a partial failure still fails the invocation. Returns the number of
/// teams added.
pub fn clone_repo_teams(
    client: &GitHubClient,
    org: &str,
    source: &str,
    dest: &str,
) -> Result<usize> {
    let source = RepoRef::new(org, source);
    let dest = RepoRef::new(org, dest);

    let teams = client.list_repo_teams(&source)?;

    let mut added = 0;
    let mut last_error = None;
    for team in &teams {
        tracing::info!("adding team '{}' to repo '{}'", team.name, dest);
        match client.add_team_to_repo(org, &team.slug, &dest) {
            Ok(()) => added += 1,
            Err(err) => {
                tracing::warn!(
                    "could not add team '{}' to repo '{}': {}",
                    team.name,
                    dest,
                    err
                );
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(err) => Err(err),
        None => Ok(added),
    }
}
