//! Prompt answers and token substitution.
//!
//! Answers are resolved in order: values supplied on the command line,
//! then manifest defaults, then interactive prompts. Tokens use the
//! `{{UPPER_SNAKE}}` syntax and are replaced in file contents and in
//! file/directory names.

use anyhow::{bail, Result};
use chrono::Local;
use regex::Regex;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::process::Command;

use crate::error::RenderError;
use crate::manifest::Manifest;

const TOKEN_PATTERN: &str = r"\{\{([A-Z_][A-Z0-9_]*)\}\}";

/// Resolved answers keyed by token name.
#[derive(Debug, Clone)]
pub struct Answers {
    values: HashMap<String, String>,
}

impl Answers {
    /// Answers pre-populated with the standard tokens.
    pub fn standard(project_name: &str) -> Self {
        let mut values = HashMap::new();

        values.insert("NAME".to_string(), project_name.to_string());
        values.insert("AUTHOR".to_string(), author());
        values.insert("EMAIL".to_string(), email());
        values.insert(
            "DATE".to_string(),
            Local::now().format("%Y-%m-%d").to_string(),
        );
        values.insert("YEAR".to_string(), Local::now().format("%Y").to_string());
        values.insert("DESCRIPTION".to_string(), "A new project".to_string());

        Self { values }
    }

    /// Set an answer.
    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_uppercase(), value.to_string());
    }

    /// Get an answer.
    pub fn get(&self, name: &str) -> Option<&String> {
        self.values.get(&name.to_uppercase())
    }

    /// Parse `KEY=VALUE` pairs from --answer flags.
    pub fn add_from_pairs(&mut self, pairs: &[String]) -> Result<()> {
        for pair in pairs {
            let Some((key, value)) = pair.split_once('=') else {
                bail!("Invalid answer '{}': expected KEY=VALUE", pair);
            };
            self.set(key.trim(), value.trim());
        }
        Ok(())
    }

    /// Resolve every prompt the manifest declares.
    ///
    /// Prompts already answered are left alone; the rest take their
    /// default, or ask on stdin when `interactive` is set. A prompt
    /// with neither an answer nor a default is fatal.
    pub fn resolve_prompts(&mut self, manifest: &Manifest, interactive: bool) -> Result<()> {
        for prompt in &manifest.prompts {
            if self.values.contains_key(&prompt.name) {
                continue;
            }

            if interactive {
                let answer = ask(prompt.text(), prompt.default.as_deref())?;
                match answer {
                    Some(value) => self.set(&prompt.name, &value),
                    None => bail!(RenderError::MissingAnswer(prompt.name.clone())),
                }
            } else {
                match prompt.default.as_deref() {
                    Some(default) => self.set(&prompt.name, default),
                    None => bail!(RenderError::MissingAnswer(prompt.name.clone())),
                }
            }
        }
        Ok(())
    }

    /// Replace all `{{TOKEN}}` patterns in a string. Unknown tokens
    /// are left as-is.
    pub fn substitute(&self, content: &str) -> String {
        let re = Regex::new(TOKEN_PATTERN).unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let name = &caps[1];
            self.values
                .get(name)
                .cloned()
                .unwrap_or_else(|| format!("{{{{{}}}}}", name))
        })
        .to_string()
    }

    /// All answer names, sorted.
    pub fn names(&self) -> Vec<&String> {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        names
    }
}

/// Find all tokens used in a string.
pub fn find_tokens(content: &str) -> Vec<String> {
    let re = Regex::new(TOKEN_PATTERN).unwrap();

    let mut tokens: Vec<String> = re
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .collect();

    tokens.sort();
    tokens.dedup();
    tokens
}

/// Check if a file is likely binary (no token substitution).
pub fn is_binary(content: &[u8]) -> bool {
    // NUL byte in the first 8KB
    let check_len = content.len().min(8192);
    content[..check_len].contains(&0)
}

/// Ask a question on stderr and read the answer from stdin. An empty
/// answer takes the default; None when there is neither.
fn ask(text: &str, default: Option<&str>) -> Result<Option<String>> {
    let mut stderr = io::stderr();
    match default {
        Some(default) => write!(stderr, "{} [{}]: ", text, default)?,
        None => write!(stderr, "{}: ", text)?,
    }
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim();

    if answer.is_empty() {
        Ok(default.map(str::to_string))
    } else {
        Ok(Some(answer.to_string()))
    }
}

fn author() -> String {
    if let Some(name) = git_config("user.name") {
        return name;
    }
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

fn email() -> String {
    if let Some(email) = git_config("user.email") {
        return email;
    }
    let user = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
    format!("{}@localhost", user)
}

fn git_config(key: &str) -> Option<String> {
    let output = Command::new("git").args(["config", key]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
