//! repoforge - Unified entry point for the repoforge tools
//!
//! The front door picks one tool and executes it once, synchronously,
//! to completion. No state is shared between the tools; this binary
//! only resolves the tool and replaces the current process.

use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use repoforge_core::Paths;
use serde::Serialize;

/// Tool metadata
#[derive(Debug, Clone, Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
}

impl Tool {
    const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

/// The repoforge tools
const TOOLS: &[Tool] = &[
    Tool::new(
        "github",
        "GitHub repository administration - create repos and clone settings",
    ),
    Tool::new(
        "scaffold",
        "Project scaffolding - render repository skeletons from templates",
    ),
];

/// repoforge - GitHub repository administration and project scaffolding.
#[derive(Parser)]
#[command(name = "repoforge")]
#[command(version)]
#[command(about = "Unified entry point for the repoforge tools")]
#[command(disable_help_subcommand = true)]
#[command(arg_required_else_help = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Tool name to run (alternative to subcommand)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all tools with installation status
    Tools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify installation and diagnose issues
    Doctor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        return match command {
            Commands::Tools { json } => cmd_tools(json),
            Commands::Doctor => cmd_doctor(),
        };
    }

    if cli.args.is_empty() {
        return cmd_help();
    }

    let first = &cli.args[0];

    if let Some(tool) = TOOLS.iter().find(|t| t.name == first) {
        dispatch_tool(tool.name, &cli.args[1..])
    } else {
        eprintln!("{} Unknown command: {}", "error:".red(), first);
        eprintln!("Run {} for usage", "repoforge".bold());
        std::process::exit(1);
    }
}

fn cmd_help() -> Result<()> {
    println!("{}", "repoforge".cyan().bold());
    println!(
        "{}",
        "GitHub repository administration and project scaffolding.".dimmed()
    );
    println!();

    println!("{}", "USAGE".bold());
    println!("    repoforge <tool> [args...]   Run a repoforge tool");
    println!("    repoforge <command>          Run a meta-command");
    println!();

    println!("{}", "TOOLS".bold());
    for tool in TOOLS {
        println!("    {:12} {}", tool.name.cyan(), tool.description);
    }
    println!();

    println!("{}", "META-COMMANDS".bold());
    println!("    {:12} List all tools with installation status", "tools".magenta());
    println!("    {:12} Verify installation and diagnose issues", "doctor".magenta());
    println!();

    println!("{}", "QUICK START".bold());
    println!("    repoforge github create widgets --org acme");
    println!("    repoforge scaffold new python-package myapp");
    println!();

    Ok(())
}

fn cmd_tools(json: bool) -> Result<()> {
    let paths = Paths::new();

    #[derive(Serialize)]
    struct ToolInfo {
        name: &'static str,
        description: &'static str,
        installed: bool,
        path: PathBuf,
    }

    let tools_info: Vec<ToolInfo> = TOOLS
        .iter()
        .map(|t| {
            let path = paths.tools.join(t.name);
            let installed = path.is_file() && is_executable(&path);
            ToolInfo {
                name: t.name,
                description: t.description,
                installed,
                path,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools_info)?);
        return Ok(());
    }

    println!("{}", "Repoforge Tools".bold());
    println!();

    for info in &tools_info {
        if info.installed {
            println!("{} {} - {}", "ok".green(), info.name.cyan(), info.description);
        } else {
            println!(
                "{}  {} - {} {}",
                "!".yellow(),
                info.name.dimmed(),
                info.description,
                "(not installed)".red()
            );
        }
    }

    Ok(())
}

fn cmd_doctor() -> Result<()> {
    let paths = Paths::new();

    println!("{}", "Repoforge Doctor".bold());
    println!();

    let mut issues = 0;

    println!("{}", "Checking installation...".bold());
    if paths.tools.exists() {
        println!(
            "{} Tools directory exists: {}",
            "ok".green(),
            paths.tools.display()
        );
    } else {
        println!(
            "{}  Tools directory missing: {}",
            "!".yellow(),
            paths.tools.display()
        );
        issues += 1;
    }

    println!();
    println!("{}", "Checking tools...".bold());
    for tool in TOOLS {
        let tool_path = paths.tools.join(tool.name);
        if tool_path.exists() && is_executable(&tool_path) {
            println!("{} {}", "ok".green(), tool.name);
        } else {
            println!("{}  {} - not found", "!".yellow(), tool.name);
            issues += 1;
        }
    }

    println!();
    println!("{}", "Checking environment...".bold());
    if std::env::var("GITHUB_TOKEN").is_ok() {
        println!("{} GITHUB_TOKEN is set", "ok".green());
    } else {
        println!(
            "{}  GITHUB_TOKEN not set - the github tool will refuse to run",
            "!".yellow()
        );
        issues += 1;
    }

    println!();
    println!("{}", "Checking dependencies...".bold());
    for dep in ["git"] {
        if which::which(dep).is_ok() {
            println!("{} {}", "ok".green(), dep);
        } else {
            println!("{}  {} - not found", "!".yellow(), dep);
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("{} All checks passed!", "ok".green());
    } else {
        println!("{}  {} issues found", "!".yellow(), issues);
    }

    Ok(())
}

fn dispatch_tool(name: &str, args: &[String]) -> Result<()> {
    let paths = Paths::new();
    let tool_path = paths.tools.join(name);

    if !tool_path.exists() {
        eprintln!("{} Tool '{}' is not installed", "error:".red(), name);
        eprintln!("Run {} to check installation", "repoforge doctor".bold());
        std::process::exit(1);
    }

    // Replace the current process; nothing to clean up after dispatch
    let err = Command::new(&tool_path).args(args).exec();

    // If we get here, exec failed
    Err(err).context(format!("Failed to exec {}", tool_path.display()))
}

fn is_executable(path: &PathBuf) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            return metadata.permissions().mode() & 0o111 != 0;
        }
    }
    path.is_file()
}
