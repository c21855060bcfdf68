//! github - GitHub repository administration for repoforge
//!
//! Each subcommand wraps one GitHub REST API v3 operation: parse flags,
//! issue the authenticated requests, print the result, exit.
//!
//! A personal access token with write access to the repositories
//! involved must be set in the GITHUB_TOKEN environment variable.
//!
//! Commands:
//! - create <NAME>: Create a repository under the user or an organization
//! - clone-labels <SOURCE> <DEST>: Copy issue labels between repositories
//! - clone-teams <ORG> <SOURCE> <DEST>: Copy team access between repositories
//! - clone-default-branch <SOURCE> <DEST>: Copy the default branch setting
//! - clone-protection <SOURCE> <DEST>: Copy branch protection rules

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use github::{
    clone_branch_protection, clone_default_branch, clone_labels, clone_repo_teams,
    CloneLabelOptions, GitHubClient, NewRepository, Owner, ProtectionOutcome, RepoOps,
};
use repoforge_core::{Config, Paths};

#[derive(Parser)]
#[command(name = "github")]
#[command(about = "GitHub repository administration - create repos and clone settings between them")]
#[command(version)]
#[command(after_help = r#"AUTHENTICATION:
    A personal access token is read from the GITHUB_TOKEN environment
    variable. Repositories of organizations require a token with access
    to that organization.

OWNERS:
    Commands that take --org style flags fall back to the repositories
    of the authenticated user when the flag is omitted.

EXAMPLES:
    github create widgets --org acme --private
    github clone-labels template widgets --org-source acme --org-dest acme
    github clone-teams acme template widgets
    github clone-default-branch template widgets --org-source acme
    github clone-protection template widgets --org-source acme --branch-source main
"#)]
struct Cli {
    /// Print progress messages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also print debugging messages to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a repository on GitHub
    Create {
        /// Desired name of the repository
        name: String,

        /// Organization to create the repository under
        #[arg(long)]
        org: Option<String>,

        /// Project description
        #[arg(long)]
        description: Option<String>,

        /// URL with more information about the project
        #[arg(long)]
        homepage: Option<String>,

        /// Make the repository private
        #[arg(long)]
        private: bool,

        /// Disable the issue tracker
        #[arg(long)]
        no_issues: bool,

        /// Disable the wiki
        #[arg(long)]
        no_wiki: bool,

        /// Disable downloads
        #[arg(long)]
        no_downloads: bool,

        /// Disable project boards
        #[arg(long)]
        no_projects: bool,

        /// Disable squash merges
        #[arg(long)]
        no_squash_merge: bool,

        /// Disable merge commits
        #[arg(long)]
        no_merge_commit: bool,

        /// Disable rebase merges
        #[arg(long)]
        no_rebase_merge: bool,
    },

    /// Copy issue labels from one repository to another
    CloneLabels {
        /// Name of the source repository
        source: String,

        /// Name of the destination repository
        dest: String,

        /// Organization hosting the source repository
        #[arg(long)]
        org_source: Option<String>,

        /// Organization hosting the destination repository
        #[arg(long)]
        org_dest: Option<String>,

        /// Update labels that already exist in the destination
        #[arg(long)]
        overwrite: bool,

        /// Delete all destination labels before cloning
        #[arg(long)]
        delete_existing: bool,
    },

    /// Give the teams of one repository access to another (same organization)
    CloneTeams {
        /// Organization hosting both repositories
        org: String,

        /// Name of the source repository
        source: String,

        /// Name of the destination repository
        dest: String,
    },

    /// Copy the default branch setting from one repository to another
    CloneDefaultBranch {
        /// Name of the source repository
        source: String,

        /// Name of the destination repository
        dest: String,

        /// Organization hosting the source repository
        #[arg(long)]
        org_source: Option<String>,

        /// Organization hosting the destination repository
        #[arg(long)]
        org_dest: Option<String>,
    },

    /// Copy branch protection rules from one repository to another
    CloneProtection {
        /// Name of the source repository
        source: String,

        /// Name of the destination repository
        dest: String,

        /// Template branch in the source repository
        #[arg(long, default_value = "master")]
        branch_source: String,

        /// Target branch in the destination repository
        #[arg(long, default_value = "master")]
        branch_dest: String,

        /// Organization hosting the source repository
        #[arg(long)]
        org_source: Option<String>,

        /// Organization hosting the destination repository
        #[arg(long)]
        org_dest: Option<String>,

        /// Do not clone required status checks
        #[arg(long)]
        no_status_checks: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.debug);

    let config = load_config()?;
    let client = build_client(&config)?;

    match cli.command {
        Commands::Create {
            name,
            org,
            description,
            homepage,
            private,
            no_issues,
            no_wiki,
            no_downloads,
            no_projects,
            no_squash_merge,
            no_merge_commit,
            no_rebase_merge,
        } => {
            let mut repo = NewRepository::new(name);
            repo.description = description;
            repo.homepage = homepage;
            repo.private = private;
            repo.has_issues = !no_issues;
            repo.has_wiki = !no_wiki;
            repo.has_downloads = !no_downloads;
            repo.has_projects = !no_projects;
            repo.allow_squash_merge = !no_squash_merge;
            repo.allow_merge_commit = !no_merge_commit;
            repo.allow_rebase_merge = !no_rebase_merge;
            cmd_create(&client, owner_or_default(org, &config), repo)
        }

        Commands::CloneLabels {
            source,
            dest,
            org_source,
            org_dest,
            overwrite,
            delete_existing,
        } => cmd_clone_labels(
            &client,
            owner_or_default(org_source, &config),
            &source,
            owner_or_default(org_dest, &config),
            &dest,
            CloneLabelOptions {
                overwrite,
                delete_existing,
            },
        ),

        Commands::CloneTeams { org, source, dest } => cmd_clone_teams(&client, &org, &source, &dest),

        Commands::CloneDefaultBranch {
            source,
            dest,
            org_source,
            org_dest,
        } => cmd_clone_default_branch(
            &client,
            owner_or_default(org_source, &config),
            &source,
            owner_or_default(org_dest, &config),
            &dest,
        ),

        Commands::CloneProtection {
            source,
            dest,
            branch_source,
            branch_dest,
            org_source,
            org_dest,
            no_status_checks,
        } => cmd_clone_protection(
            &client,
            owner_or_default(org_source, &config),
            &source,
            &branch_source,
            owner_or_default(org_dest, &config),
            &dest,
            &branch_dest,
            !no_status_checks,
        ),
    }
}

/// Map --verbose/--debug onto an env filter; RUST_LOG still takes
/// precedence when set.
fn init_logging(verbose: bool, debug: bool) {
    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> Result<Config> {
    let paths = Paths::new();
    Config::load(&paths.config_file()).context("Failed to load repoforge config")
}

fn build_client(config: &Config) -> Result<GitHubClient> {
    let mut client = GitHubClient::from_env()?;
    if let Some(ref url) = config.api_url {
        client = client.with_base_url(url);
    }
    Ok(client)
}

/// An omitted --org flag falls back to the configured default
/// organization, then to the authenticated user.
fn owner_or_default(org: Option<String>, config: &Config) -> Owner {
    Owner::from_flag(org.or_else(|| config.default_org.clone()))
}

/// Create a repository and report its identifier.
fn cmd_create(client: &GitHubClient, owner: Owner, repo: NewRepository) -> Result<()> {
    let created = client
        .create_repo(&owner, &repo)
        .with_context(|| format!("Could not create repository '{}'", repo.name))?;

    println!("success: Created repository {} (id {})", created.full_name, created.id);
    println!("  {}", created.html_url);

    Ok(())
}

/// Copy labels between repositories.
fn cmd_clone_labels(
    client: &GitHubClient,
    org_source: Owner,
    source: &str,
    org_dest: Owner,
    dest: &str,
    options: CloneLabelOptions,
) -> Result<()> {
    let source = org_source.repo(client, source)?;
    let dest = org_dest.repo(client, dest)?;

    let summary = clone_labels(client, &source, &dest, options)
        .with_context(|| format!("Could not clone labels from '{}' to '{}'", source, dest))?;

    println!(
        "success: Labels cloned from {} to {}: {} created, {} updated, {} skipped, {} deleted",
        source, dest, summary.created, summary.updated, summary.skipped, summary.deleted
    );

    Ok(())
}

/// Give the source repository's teams access to the destination.
fn cmd_clone_teams(client: &GitHubClient, org: &str, source: &str, dest: &str) -> Result<()> {
    let added = clone_repo_teams(client, org, source, dest)
        .context("One or more teams could not be added")?;

    println!(
        "success: {} team(s) of {}/{} now have access to {}/{}",
        added, org, source, org, dest
    );

    Ok(())
}

/// Copy the default branch setting between repositories.
fn cmd_clone_default_branch(
    client: &GitHubClient,
    org_source: Owner,
    source: &str,
    org_dest: Owner,
    dest: &str,
) -> Result<()> {
    let source = org_source.repo(client, source)?;
    let dest = org_dest.repo(client, dest)?;

    let branch = clone_default_branch(client, &source, &dest).with_context(|| {
        format!(
            "Could not copy the default branch of '{}' to '{}' (the branch must exist in both)",
            source, dest
        )
    })?;

    println!("success: Default branch of {} set to '{}'", dest, branch);

    Ok(())
}

/// Copy branch protection rules between repositories.
#[allow(clippy::too_many_arguments)]
fn cmd_clone_protection(
    client: &GitHubClient,
    org_source: Owner,
    source: &str,
    branch_source: &str,
    org_dest: Owner,
    dest: &str,
    branch_dest: &str,
    include_status_checks: bool,
) -> Result<()> {
    let source = org_source.repo(client, source)?;
    let dest = org_dest.repo(client, dest)?;

    let outcome = clone_branch_protection(
        client,
        &source,
        branch_source,
        &dest,
        branch_dest,
        include_status_checks,
    )
    .with_context(|| {
        format!(
            "Could not clone protection rules from '{}@{}' to '{}@{}'",
            source, branch_source, dest, branch_dest
        )
    })?;

    match outcome {
        ProtectionOutcome::Applied => println!(
            "success: Protection rules of {}@{} applied to {}@{}",
            source, branch_source, dest, branch_dest
        ),
        ProtectionOutcome::Removed => println!(
            "success: Source branch unprotected, protection removed from {}@{}",
            dest, branch_dest
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_create_flags() {
        let cli = Cli::try_parse_from([
            "github", "create", "widgets", "--org", "acme", "--private", "--no-wiki",
        ])
        .unwrap();
        match cli.command {
            Commands::Create {
                name,
                org,
                private,
                no_wiki,
                no_issues,
                ..
            } => {
                assert_eq!(name, "widgets");
                assert_eq!(org.as_deref(), Some("acme"));
                assert!(private);
                assert!(no_wiki);
                assert!(!no_issues);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_clone_protection_defaults_to_master() {
        let cli = Cli::try_parse_from(["github", "clone-protection", "src", "dst"]).unwrap();
        match cli.command {
            Commands::CloneProtection {
                branch_source,
                branch_dest,
                no_status_checks,
                ..
            } => {
                assert_eq!(branch_source, "master");
                assert_eq!(branch_dest, "master");
                assert!(!no_status_checks);
            }
            _ => panic!("expected clone-protection"),
        }
    }

    #[test]
    fn test_owner_falls_back_to_configured_org() {
        let config = Config {
            api_url: None,
            default_org: Some("acme".to_string()),
        };
        assert!(matches!(
            owner_or_default(None, &config),
            Owner::Org(org) if org == "acme"
        ));
        assert!(matches!(
            owner_or_default(Some("other".to_string()), &config),
            Owner::Org(org) if org == "other"
        ));
        assert!(matches!(
            owner_or_default(None, &Config::default()),
            Owner::User
        ));
    }
}
