//! scaffold - Project scaffolding for repoforge
//!
//! Render new repository skeletons from templates with prompt-driven
//! token substitution.
//!
//! Commands:
//! - new <TEMPLATE> <NAME>: Render a template into ./<NAME>
//! - list: List available templates
//! - show <TEMPLATE>: Show a template's manifest and file tree
//! - add <PATH>: Add a directory as a user template
//! - remove <TEMPLATE>: Remove a user template
//! - vars <TEMPLATE>: Show declared prompts and tokens used
//! - init: Write a starter scaffold.json into the current directory

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

use scaffold::{render, scan_tokens, Answers, TemplateStore};

#[derive(Parser)]
#[command(name = "scaffold")]
#[command(about = "Project scaffolding - render new repository skeletons from templates")]
#[command(version)]
#[command(after_help = r#"TEMPLATE TOKENS:
    Files and path components may contain {{TOKEN}} placeholders.
    Standard tokens are always available:
    {{NAME}}        Project name
    {{AUTHOR}}      Author name (from git config)
    {{EMAIL}}       Author email (from git config)
    {{DATE}}        Current date (YYYY-MM-DD)
    {{YEAR}}        Current year
    {{DESCRIPTION}} Project description

    Templates declare further prompts in scaffold.json; answers come
    from --answer flags, manifest defaults, or interactive prompts.

EXAMPLES:
    scaffold new python-package myapp
    scaffold new python-package myapp --answer PACKAGE_NAME=myapp --no-input
    scaffold add ~/my-template
    scaffold list
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template into a new project directory
    New {
        /// Template name to use
        template: String,

        /// Project name
        name: String,

        /// Answer a prompt (KEY=VALUE)
        #[arg(long = "answer", value_name = "KEY=VALUE")]
        answers: Vec<String>,

        /// Never prompt; fail when a required answer is missing
        #[arg(long)]
        no_input: bool,

        /// Don't initialize a git repository
        #[arg(long)]
        no_git: bool,

        /// Overwrite an existing directory
        #[arg(long)]
        force: bool,
    },

    /// List available templates
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a template's manifest and file tree
    Show {
        /// Template name
        template: String,
    },

    /// Add a directory as user template
    Add {
        /// Path to directory
        path: PathBuf,

        /// Name for the template (default: directory name)
        name: Option<String>,
    },

    /// Remove a user template
    Remove {
        /// Template name to remove
        template: String,
    },

    /// Show declared prompts and the tokens used in a template
    Vars {
        /// Template name
        template: String,
    },

    /// Write a starter scaffold.json into the current directory
    Init {
        /// Template name (default: directory name)
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = TemplateStore::new()?;

    match cli.command {
        Some(Commands::New {
            template,
            name,
            answers,
            no_input,
            no_git,
            force,
        }) => cmd_new(&store, &template, &name, &answers, no_input, !no_git, force),

        Some(Commands::List { json }) => cmd_list(&store, json),

        Some(Commands::Show { template }) => cmd_show(&store, &template),

        Some(Commands::Add { path, name }) => cmd_add(&store, &path, name.as_deref()),

        Some(Commands::Remove { template }) => cmd_remove(&store, &template),

        Some(Commands::Vars { template }) => cmd_vars(&store, &template),

        Some(Commands::Init { name }) => cmd_init(name.as_deref()),

        None => cmd_list(&store, false),
    }
}

/// Render a template into a new project directory
fn cmd_new(
    store: &TemplateStore,
    template_name: &str,
    project_name: &str,
    answer_pairs: &[String],
    no_input: bool,
    init_git: bool,
    force: bool,
) -> Result<()> {
    let template = store.get(template_name)?;

    let dest = PathBuf::from(project_name);
    if dest.exists() {
        if force {
            std::fs::remove_dir_all(&dest).with_context(|| {
                format!("Failed to remove existing directory: {}", dest.display())
            })?;
        } else {
            bail!(
                "Directory already exists: {}\nUse --force to overwrite",
                dest.display()
            );
        }
    }

    let mut answers = Answers::standard(project_name);
    answers.add_from_pairs(answer_pairs)?;

    if let Some(ref manifest) = template.manifest {
        let interactive = !no_input && std::io::stdin().is_terminal();
        answers.resolve_prompts(manifest, interactive)?;
    }

    eprintln!("info: Rendering template: {}", template_name);

    render(&template, &dest, &answers, init_git)
        .with_context(|| format!("Failed to render template: {}", template_name))?;

    println!("success: Project created: {}", project_name);
    println!();
    println!("Next steps:");
    println!("  cd {}", project_name);

    if let Some(ref manifest) = template.manifest {
        for step in &manifest.next_steps {
            println!("  {}", answers.substitute(step));
        }
    }

    Ok(())
}

/// List all available templates
fn cmd_list(store: &TemplateStore, json: bool) -> Result<()> {
    let templates = store.list()?;

    if json {
        let json_output: Vec<_> = templates
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "path": t.path.to_string_lossy(),
                    "builtin": t.builtin,
                    "description": t.description(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_output)?);
        return Ok(());
    }

    println!("\x1b[1mAvailable Templates\x1b[0m");
    println!();

    let builtin: Vec<_> = templates.iter().filter(|t| t.builtin).collect();
    let user: Vec<_> = templates.iter().filter(|t| !t.builtin).collect();

    if !builtin.is_empty() {
        println!("\x1b[36mBuilt-in:\x1b[0m");
        for t in &builtin {
            println!("  \x1b[32m{}\x1b[0m", t.name);
            if t.description() != "No description" {
                println!("    \x1b[2m{}\x1b[0m", t.description());
            }
        }
        println!();
    }

    if !user.is_empty() {
        println!("\x1b[36mUser Templates:\x1b[0m");
        for t in &user {
            println!("  \x1b[32m{}\x1b[0m", t.name);
            if t.description() != "No description" {
                println!("    \x1b[2m{}\x1b[0m", t.description());
            }
        }
    } else if builtin.is_empty() {
        println!("\x1b[2mNo templates found.\x1b[0m");
        println!("Add one with: scaffold add /path/to/template");
    }

    Ok(())
}

/// Show details about a template
fn cmd_show(store: &TemplateStore, template_name: &str) -> Result<()> {
    let template = store.get(template_name)?;

    println!("\x1b[1mTemplate: {}\x1b[0m", template.name);
    println!("\x1b[2mPath: {}\x1b[0m", template.path.display());
    println!();

    if let Some(ref manifest) = template.manifest {
        println!("\x1b[36mManifest:\x1b[0m");
        println!("{}", serde_json::to_string_pretty(manifest)?);
        println!();
    }

    println!("\x1b[36mStructure:\x1b[0m");
    print_tree(&template.path, "", true)?;

    Ok(())
}

/// Print directory tree structure
fn print_tree(path: &PathBuf, prefix: &str, is_last: bool) -> Result<()> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or(".");

    // The manifest is not part of the rendered tree
    if name == "scaffold.json" {
        return Ok(());
    }

    let connector = if prefix.is_empty() {
        ""
    } else if is_last {
        "--- "
    } else {
        "|-- "
    };

    println!("{}{}{}", prefix, connector, name);

    if path.is_dir() {
        let mut entries: Vec<_> = std::fs::read_dir(path)?.filter_map(|e| e.ok()).collect();

        entries.sort_by_key(|e| e.file_name());
        entries.retain(|e| e.file_name() != "scaffold.json");

        let count = entries.len();
        for (i, entry) in entries.into_iter().enumerate() {
            let child_path = entry.path();
            let is_last_child = i == count - 1;

            let new_prefix = if prefix.is_empty() {
                String::new()
            } else if is_last {
                format!("{}    ", prefix)
            } else {
                format!("{}|   ", prefix)
            };

            print_tree(&child_path, &new_prefix, is_last_child)?;
        }
    }

    Ok(())
}

/// Add a directory as a user template
fn cmd_add(store: &TemplateStore, path: &PathBuf, name: Option<&str>) -> Result<()> {
    let abs_path = if path.is_absolute() {
        path.clone()
    } else {
        std::env::current_dir()?.join(path)
    };

    let template = store.add(&abs_path, name)?;

    println!("success: Template added: {}", template.name);

    Ok(())
}

/// Remove a user template
fn cmd_remove(store: &TemplateStore, template_name: &str) -> Result<()> {
    store.remove(template_name)?;

    println!("success: Template removed: {}", template_name);

    Ok(())
}

/// Show declared prompts and every token found in the tree
fn cmd_vars(store: &TemplateStore, template_name: &str) -> Result<()> {
    let template = store.get(template_name)?;

    println!("\x1b[1mTemplate Prompts: {}\x1b[0m", template.name);
    println!();

    if let Some(ref manifest) = template.manifest {
        println!("\x1b[36mDeclared Prompts:\x1b[0m");
        if manifest.prompts.is_empty() {
            println!("  (none declared)");
        }
        for prompt in &manifest.prompts {
            match prompt.default {
                Some(ref default) => {
                    println!("  {{{{{}}}}} - {} [{}]", prompt.name, prompt.text(), default)
                }
                None => println!("  {{{{{}}}}} - {} (required)", prompt.name, prompt.text()),
            }
        }
        println!();
    }

    let tokens = scan_tokens(&template.path)?;

    println!("\x1b[36mTokens Used in Template:\x1b[0m");
    if tokens.is_empty() {
        println!("  (none found)");
    } else {
        for token in &tokens {
            println!("  {{{{{}}}}}", token);
        }
    }

    Ok(())
}

/// Write a starter manifest into the current directory
fn cmd_init(name: Option<&str>) -> Result<()> {
    let path = TemplateStore::init(name)?;

    println!("success: Manifest written: {}", path.display());
    println!("Edit scaffold.json and use {{{{TOKENS}}}} in your files");
    println!("Then run: scaffold add . <name>");

    Ok(())
}
