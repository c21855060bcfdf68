//! Template manifest handling.
//!
//! Each template carries a `scaffold.json` at its root describing the
//! prompts to resolve before rendering. Prompt names double as the
//! `{{TOKEN}}` names substituted into the tree.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::RenderError;

/// File name of the manifest inside a template directory.
pub const MANIFEST_FILE: &str = "scaffold.json";

/// A single prompt declared by a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    /// Token name, e.g. PACKAGE_NAME
    pub name: String,

    /// Question shown to the user; the token name is shown when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Default answer; a prompt without one is required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Prompt {
    /// The text to present when asking for this prompt.
    pub fn text(&self) -> &str {
        self.prompt.as_deref().unwrap_or(&self.name)
    }
}

/// Template manifest from scaffold.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    /// Template name
    #[serde(default)]
    pub name: String,

    /// Template description
    #[serde(default)]
    pub description: String,

    /// Template version
    #[serde(default)]
    pub version: String,

    /// Template author
    #[serde(default)]
    pub author: String,

    /// Prompts resolved before rendering, in declaration order
    #[serde(default)]
    pub prompts: Vec<Prompt>,

    /// Next steps to show after rendering
    #[serde(default)]
    pub next_steps: Vec<String>,
}

impl Manifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest: Manifest =
            serde_json::from_str(&content).context("Failed to parse scaffold.json")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check the manifest invariants: prompt names are unique and are
    /// valid token names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for prompt in &self.prompts {
            if !is_token_name(&prompt.name) {
                bail!(RenderError::InvalidManifest(format!(
                    "prompt name '{}' is not a valid token name (expected UPPER_SNAKE)",
                    prompt.name
                )));
            }
            if !seen.insert(prompt.name.as_str()) {
                bail!(RenderError::InvalidManifest(format!(
                    "duplicate prompt name '{}'",
                    prompt.name
                )));
            }
        }
        Ok(())
    }

    /// A starter manifest for `scaffold init`.
    pub fn starter(name: &str, author: String) -> Self {
        Self {
            name: name.to_string(),
            description: "{{DESCRIPTION}}".to_string(),
            version: "1.0.0".to_string(),
            author,
            prompts: vec![
                Prompt {
                    name: "NAME".to_string(),
                    prompt: Some("Project name".to_string()),
                    default: None,
                },
                Prompt {
                    name: "DESCRIPTION".to_string(),
                    prompt: Some("Project description".to_string()),
                    default: Some("A new project".to_string()),
                },
            ],
            next_steps: vec!["Review the generated files".to_string()],
        }
    }
}

/// Token names are UPPER_SNAKE identifiers.
fn is_token_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_uppercase() || first == '_')
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "name": "python-package",
                "description": "A Python package",
                "prompts": [
                    {"name": "PACKAGE_NAME", "prompt": "Package name"},
                    {"name": "LICENSE", "default": "MIT"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.name, "python-package");
        assert_eq!(manifest.prompts.len(), 2);
        assert_eq!(manifest.prompts[0].text(), "Package name");
        assert_eq!(manifest.prompts[1].text(), "LICENSE");
        assert_eq!(manifest.prompts[1].default.as_deref(), Some("MIT"));
        manifest.validate().unwrap();
    }

    #[test]
    fn test_duplicate_prompt_names_rejected() {
        let manifest: Manifest = serde_json::from_str(
            r#"{"prompts": [{"name": "NAME"}, {"name": "NAME"}]}"#,
        )
        .unwrap();

        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate prompt name"));
    }

    #[test]
    fn test_invalid_token_name_rejected() {
        let manifest: Manifest =
            serde_json::from_str(r#"{"prompts": [{"name": "lower-case"}]}"#).unwrap();

        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("not a valid token name"));
    }

    #[test]
    fn test_is_token_name() {
        assert!(is_token_name("NAME"));
        assert!(is_token_name("PACKAGE_NAME"));
        assert!(is_token_name("_PRIVATE2"));
        assert!(!is_token_name(""));
        assert!(!is_token_name("name"));
        assert!(!is_token_name("2NAME"));
    }
}
