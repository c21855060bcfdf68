//! Branch protection operations.
//!
//! The read shape returned by the protection endpoint differs from the
//! shape the update endpoint accepts (expanded user/team objects vs.
//! plain login/slug lists), so both are modeled and
//! [`ProtectionUpdate::from_protection`] converts between them.

use serde::{Deserialize, Serialize};

use crate::client::GitHubClient;
use crate::error::Result;
use crate::repos::RepoRef;

const BRANCH_NOT_PROTECTED: &str = "Branch not protected";

/// A branch as returned by the branches endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}

/// Branch protection configuration as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchProtection {
    #[serde(default)]
    pub required_status_checks: Option<StatusChecks>,
    #[serde(default)]
    pub enforce_admins: Option<EnforceAdmins>,
    #[serde(default)]
    pub required_pull_request_reviews: Option<PullRequestReviews>,
    #[serde(default)]
    pub restrictions: Option<Restrictions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChecks {
    pub strict: bool,
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnforceAdmins {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviews {
    #[serde(default)]
    pub dismissal_restrictions: Option<DismissalRestrictions>,
    #[serde(default)]
    pub dismiss_stale_reviews: bool,
    #[serde(default)]
    pub require_code_owner_reviews: bool,
    #[serde(default)]
    pub required_approving_review_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DismissalRestrictions {
    #[serde(default)]
    pub users: Vec<Account>,
    #[serde(default)]
    pub teams: Vec<TeamRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Restrictions {
    #[serde(default)]
    pub users: Vec<Account>,
    #[serde(default)]
    pub teams: Vec<TeamRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRef {
    pub slug: String,
}

/// Request body for the protection update endpoint.
///
/// The endpoint requires all four keys to be present; absent settings
/// are serialized as null, which clears them.
#[derive(Debug, Clone, Serialize)]
pub struct ProtectionUpdate {
    pub required_status_checks: Option<StatusChecks>,
    pub enforce_admins: Option<bool>,
    pub required_pull_request_reviews: Option<ReviewUpdate>,
    pub restrictions: Option<RestrictionUpdate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissal_restrictions: Option<RestrictionUpdate>,
    pub dismiss_stale_reviews: bool,
    pub require_code_owner_reviews: bool,
    pub required_approving_review_count: u32,
}

/// User logins and team slugs, the flat form the update endpoint takes.
#[derive(Debug, Clone, Serialize)]
pub struct RestrictionUpdate {
    pub users: Vec<String>,
    pub teams: Vec<String>,
}

impl ProtectionUpdate {
    /// Convert a protection configuration read from one branch into the
    /// update payload for another. `include_status_checks: false` drops
    /// the required status checks from the copy.
    pub fn from_protection(protection: &BranchProtection, include_status_checks: bool) -> Self {
        let required_status_checks = if include_status_checks {
            protection.required_status_checks.clone()
        } else {
            None
        };

        let required_pull_request_reviews =
            protection
                .required_pull_request_reviews
                .as_ref()
                .map(|reviews| ReviewUpdate {
                    dismissal_restrictions: reviews.dismissal_restrictions.as_ref().map(|d| {
                        RestrictionUpdate {
                            users: d.users.iter().map(|u| u.login.clone()).collect(),
                            teams: d.teams.iter().map(|t| t.slug.clone()).collect(),
                        }
                    }),
                    dismiss_stale_reviews: reviews.dismiss_stale_reviews,
                    require_code_owner_reviews: reviews.require_code_owner_reviews,
                    required_approving_review_count: reviews.required_approving_review_count,
                });

        let restrictions = protection
            .restrictions
            .as_ref()
            .map(|r| RestrictionUpdate {
                users: r.users.iter().map(|u| u.login.clone()).collect(),
                teams: r.teams.iter().map(|t| t.slug.clone()).collect(),
            });

        Self {
            required_status_checks,
            enforce_admins: protection.enforce_admins.as_ref().map(|e| e.enabled),
            required_pull_request_reviews,
            restrictions,
        }
    }
}

/// Branch protection operations.
pub trait ProtectionOps {
    /// Get a branch. 404 if it does not exist.
    fn get_branch(&self, repo: &RepoRef, branch: &str) -> Result<Branch>;

    /// Get the protection configuration of a branch. The API answers
    /// 404 "Branch not protected" for unprotected branches.
    fn get_branch_protection(&self, repo: &RepoRef, branch: &str) -> Result<BranchProtection>;

    /// Replace the protection configuration of a branch.
    fn set_branch_protection(
        &self,
        repo: &RepoRef,
        branch: &str,
        update: &ProtectionUpdate,
    ) -> Result<()>;

    /// Remove all protection from a branch.
    fn remove_branch_protection(&self, repo: &RepoRef, branch: &str) -> Result<()>;
}

impl ProtectionOps for GitHubClient {
    fn get_branch(&self, repo: &RepoRef, branch: &str) -> Result<Branch> {
        let endpoint = format!("/repos/{}/{}/branches/{}", repo.owner, repo.name, branch);
        self.get(&endpoint)
    }

    fn get_branch_protection(&self, repo: &RepoRef, branch: &str) -> Result<BranchProtection> {
        let endpoint = format!(
            "/repos/{}/{}/branches/{}/protection",
            repo.owner, repo.name, branch
        );
        self.get(&endpoint)
    }

    fn set_branch_protection(
        &self,
        repo: &RepoRef,
        branch: &str,
        update: &ProtectionUpdate,
    ) -> Result<()> {
        let endpoint = format!(
            "/repos/{}/{}/branches/{}/protection",
            repo.owner, repo.name, branch
        );
        let _: serde_json::Value = self.put(&endpoint, update)?;
        Ok(())
    }

    fn remove_branch_protection(&self, repo: &RepoRef, branch: &str) -> Result<()> {
        let endpoint = format!(
            "/repos/{}/{}/branches/{}/protection",
            repo.owner, repo.name, branch
        );
        self.delete(&endpoint)
    }
}

/// What [`clone_branch_protection`] did to the destination branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionOutcome {
    /// The source rules were applied to the destination branch.
    Applied,
    /// The source branch is unprotected, so protection was removed
    /// from the destination branch.
    Removed,
}

/// Copy the protection rules of `source_branch` onto `dest_branch`.
///
/// Both branches must exist. Users and teams without access to the
/// destination repository are silently omitted by the API.
pub fn clone_branch_protection(
    client: &GitHubClient,
    source: &RepoRef,
    source_branch: &str,
    dest: &RepoRef,
    dest_branch: &str,
    include_status_checks: bool,
) -> Result<ProtectionOutcome> {
    client.get_branch(source, source_branch)?;
    client.get_branch(dest, dest_branch)?;

    match client.get_branch_protection(source, source_branch) {
        Ok(protection) => {
            let update = ProtectionUpdate::from_protection(&protection, include_status_checks);
            tracing::info!(
                "applying protection rules of '{}@{}' to '{}@{}'",
                source,
                source_branch,
                dest,
                dest_branch
            );
            client.set_branch_protection(dest, dest_branch, &update)?;
            Ok(ProtectionOutcome::Applied)
        }
        Err(err) if err.api_message().as_deref() == Some(BRANCH_NOT_PROTECTED) => {
            tracing::info!(
                "source branch '{}@{}' is unprotected, removing protection from '{}@{}'",
                source,
                source_branch,
                dest,
                dest_branch
            );
            match client.remove_branch_protection(dest, dest_branch) {
                Ok(()) => Ok(ProtectionOutcome::Removed),
                // Destination was never protected either.
                Err(err) if err.api_message().as_deref() == Some(BRANCH_NOT_PROTECTED) => {
                    Ok(ProtectionOutcome::Removed)
                }
                Err(err) => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}
