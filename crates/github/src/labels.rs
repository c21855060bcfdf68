//! Issue label operations: listing, mutation, and cloning between repositories.

use serde::{Deserialize, Serialize};

use crate::client::GitHubClient;
use crate::error::Result;
use crate::repos::RepoRef;

/// An issue label.
///
/// The same shape serves as API response and request body; `color` is the
/// six-digit hex code without the leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Label-level operations.
pub trait LabelOps {
    /// List every label of a repository, following pagination.
    fn list_labels(&self, repo: &RepoRef) -> Result<Vec<Label>>;

    /// Get a single label by name. 404 if it does not exist.
    fn get_label(&self, repo: &RepoRef, name: &str) -> Result<Label>;

    /// Create a label.
    fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<Label>;

    /// Update the label currently called `name`.
    fn update_label(&self, repo: &RepoRef, name: &str, label: &Label) -> Result<Label>;

    /// Delete a label.
    fn delete_label(&self, repo: &RepoRef, name: &str) -> Result<()>;
}

impl LabelOps for GitHubClient {
    fn list_labels(&self, repo: &RepoRef) -> Result<Vec<Label>> {
        let mut all_labels = Vec::new();
        let mut page = 1;

        loop {
            let endpoint = format!(
                "/repos/{}/{}/labels?per_page=100&page={}",
                repo.owner, repo.name, page
            );
            let labels: Vec<Label> = self.get(&endpoint)?;

            if labels.is_empty() {
                break;
            }

            all_labels.extend(labels);
            page += 1;

            // Safety limit to prevent infinite loops
            if page > 100 {
                break;
            }
        }

        Ok(all_labels)
    }

    fn get_label(&self, repo: &RepoRef, name: &str) -> Result<Label> {
        let endpoint = format!(
            "/repos/{}/{}/labels/{}",
            repo.owner,
            repo.name,
            urlencoding::encode(name)
        );
        self.get(&endpoint)
    }

    fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<Label> {
        let endpoint = format!("/repos/{}/{}/labels", repo.owner, repo.name);
        self.post(&endpoint, label)
    }

    fn update_label(&self, repo: &RepoRef, name: &str, label: &Label) -> Result<Label> {
        let endpoint = format!(
            "/repos/{}/{}/labels/{}",
            repo.owner,
            repo.name,
            urlencoding::encode(name)
        );
        self.patch(&endpoint, label)
    }

    fn delete_label(&self, repo: &RepoRef, name: &str) -> Result<()> {
        let endpoint = format!(
            "/repos/{}/{}/labels/{}",
            repo.owner,
            repo.name,
            urlencoding::encode(name)
        );
        self.delete(&endpoint)
    }
}

/// Options for [`clone_labels`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CloneLabelOptions {
    /// Update labels that already exist in the destination.
    pub overwrite: bool,
    /// Delete every destination label before cloning.
    pub delete_existing: bool,
}

/// What a [`clone_labels`] run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloneLabelSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub deleted: usize,
}

/// Copy labels from `source` to `dest`.
///
/// Existing destination labels are skipped unless `overwrite` is set;
/// `delete_existing` clears the destination first.
pub fn clone_labels(
    client: &GitHubClient,
    source: &RepoRef,
    dest: &RepoRef,
    options: CloneLabelOptions,
) -> Result<CloneLabelSummary> {
    let mut summary = CloneLabelSummary::default();

    if options.delete_existing {
        for label in client.list_labels(dest)? {
            tracing::info!("deleting label '{}' from '{}'", label.name, dest);
            client.delete_label(dest, &label.name)?;
            summary.deleted += 1;
        }
    }

    for label in client.list_labels(source)? {
        match client.get_label(dest, &label.name) {
            Ok(_existing) => {
                if options.overwrite {
                    tracing::info!("updating label '{}' in '{}'", label.name, dest);
                    client.update_label(dest, &label.name, &label)?;
                    summary.updated += 1;
                } else {
                    tracing::info!("label '{}' exists in '{}', skipped", label.name, dest);
                    summary.skipped += 1;
                }
            }
            Err(err) if err.is_not_found() => {
                tracing::info!("creating label '{}' in '{}'", label.name, dest);
                client.create_label(dest, &label)?;
                summary.created += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(summary)
}
