//! Template discovery and management.
//!
//! Built-in templates ship with the repository and are located through
//! REPOFORGE_TEMPLATE_DIR, a share directory next to the executable, or
//! /usr/share/repoforge/templates. User templates live under the data
//! directory and shadow built-ins with the same name.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::answers::Answers;
use crate::error::RenderError;
use crate::manifest::{Manifest, MANIFEST_FILE};

/// A template on disk.
#[derive(Debug, Clone)]
pub struct Template {
    /// Template name (directory name)
    pub name: String,
    /// Path to the template directory
    pub path: PathBuf,
    /// Whether this is a built-in template
    pub builtin: bool,
    /// Manifest, if scaffold.json exists
    pub manifest: Option<Manifest>,
}

impl Template {
    /// Load a template from a directory.
    pub fn from_path(path: &Path, builtin: bool) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid template path"))?
            .to_string();

        let manifest_path = path.join(MANIFEST_FILE);
        let manifest = if manifest_path.exists() {
            Some(Manifest::load(&manifest_path)?)
        } else {
            None
        };

        Ok(Self {
            name,
            path: path.to_path_buf(),
            builtin,
            manifest,
        })
    }

    /// Get the template description
    pub fn description(&self) -> &str {
        self.manifest
            .as_ref()
            .map(|m| m.description.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or("No description")
    }
}

/// Template store - locates built-in and user templates.
pub struct TemplateStore {
    builtin_dir: PathBuf,
    user_dir: PathBuf,
}

impl TemplateStore {
    /// Create a store using the standard directories.
    pub fn new() -> Result<Self> {
        let paths = repoforge_core::Paths::new();
        let user_dir = paths.data.join("templates");
        fs::create_dir_all(&user_dir)?;

        let builtin_dir = std::env::var("REPOFORGE_TEMPLATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                if let Ok(exe_path) = std::env::current_exe() {
                    if let Some(parent) = exe_path.parent() {
                        let templates_path = parent.join("../share/repoforge/templates");
                        if templates_path.exists() {
                            return templates_path;
                        }
                    }
                }
                PathBuf::from("/usr/share/repoforge/templates")
            });

        Ok(Self {
            builtin_dir,
            user_dir,
        })
    }

    /// Create with custom directories (for testing)
    pub fn with_dirs(builtin_dir: PathBuf, user_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&user_dir)?;
        Ok(Self {
            builtin_dir,
            user_dir,
        })
    }

    /// List all available templates, user templates shadowing built-ins.
    pub fn list(&self) -> Result<Vec<Template>> {
        let mut templates = Vec::new();

        if self.builtin_dir.exists() {
            for entry in fs::read_dir(&self.builtin_dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    if let Ok(template) = Template::from_path(&path, true) {
                        templates.push(template);
                    }
                }
            }
        }

        if self.user_dir.exists() {
            for entry in fs::read_dir(&self.user_dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    if let Ok(template) = Template::from_path(&path, false) {
                        templates.retain(|t| t.name != template.name);
                        templates.push(template);
                    }
                }
            }
        }

        templates.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(templates)
    }

    /// Find a template by name.
    pub fn find(&self, name: &str) -> Result<Option<Template>> {
        // User templates take precedence
        let user_path = self.user_dir.join(name);
        if user_path.is_dir() {
            return Ok(Some(Template::from_path(&user_path, false)?));
        }

        let builtin_path = self.builtin_dir.join(name);
        if builtin_path.is_dir() {
            return Ok(Some(Template::from_path(&builtin_path, true)?));
        }

        Ok(None)
    }

    /// Find a template by name or fail with a rendering error.
    pub fn get(&self, name: &str) -> Result<Template> {
        match self.find(name)? {
            Some(template) => Ok(template),
            None => bail!(RenderError::TemplateNotFound(name.to_string())),
        }
    }

    /// Add a directory as a user template.
    pub fn add(&self, source: &Path, name: Option<&str>) -> Result<Template> {
        if !source.is_dir() {
            bail!("Source is not a directory: {}", source.display());
        }

        let template_name = name.map(String::from).unwrap_or_else(|| {
            source
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("template")
                .to_string()
        });

        let dest = self.user_dir.join(&template_name);
        if dest.exists() {
            bail!("Template already exists: {}", template_name);
        }

        copy_dir_recursive(source, &dest)?;

        // Write a starter manifest if the source has none
        let manifest_path = dest.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            let author = Answers::standard("")
                .get("AUTHOR")
                .cloned()
                .unwrap_or_default();
            let manifest = Manifest::starter(&template_name, author);
            fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
        }

        Template::from_path(&dest, false)
    }

    /// Remove a user template.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.user_dir.join(name);
        if !path.exists() {
            bail!("User template not found: {}", name);
        }

        fs::remove_dir_all(&path)
            .with_context(|| format!("Failed to remove template: {}", name))?;

        Ok(())
    }

    /// Initialize a manifest in the current directory.
    pub fn init(name: Option<&str>) -> Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        let template_name = name.map(String::from).unwrap_or_else(|| {
            cwd.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("template")
                .to_string()
        });

        let manifest_path = cwd.join(MANIFEST_FILE);
        if manifest_path.exists() {
            bail!("{} already exists", MANIFEST_FILE);
        }

        let author = Answers::standard("")
            .get("AUTHOR")
            .cloned()
            .unwrap_or_default();
        let manifest = Manifest::starter(&template_name, author);
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

        Ok(manifest_path)
    }
}

/// Recursively copy a directory
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Prompt;
    use tempfile::TempDir;

    fn write_template(dir: &Path, description: &str) {
        fs::create_dir_all(dir).unwrap();
        let manifest = Manifest {
            name: dir.file_name().unwrap().to_string_lossy().into_owned(),
            description: description.to_string(),
            version: "1.0.0".to_string(),
            author: "Test".to_string(),
            prompts: vec![Prompt {
                name: "NAME".to_string(),
                prompt: None,
                default: None,
            }],
            next_steps: vec![],
        };
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest).unwrap(),
        )
        .unwrap();
        fs::write(dir.join("README.md"), "# {{NAME}}\n").unwrap();
    }

    #[test]
    fn test_template_from_path_loads_manifest() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("demo");
        write_template(&dir, "A demo template");

        let template = Template::from_path(&dir, true).unwrap();
        assert!(template.manifest.is_some());
        assert_eq!(template.description(), "A demo template");
    }

    #[test]
    fn test_template_without_manifest() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("bare");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("file.txt"), "plain").unwrap();

        let template = Template::from_path(&dir, false).unwrap();
        assert!(template.manifest.is_none());
        assert_eq!(template.description(), "No description");
    }

    #[test]
    fn test_list_user_templates_shadow_builtins() {
        let tmp = TempDir::new().unwrap();
        let builtin_dir = tmp.path().join("builtin");
        let user_dir = tmp.path().join("user");

        write_template(&builtin_dir.join("demo"), "built-in demo");
        write_template(&user_dir.join("demo"), "user demo");
        write_template(&builtin_dir.join("other"), "other");

        let store = TemplateStore::with_dirs(builtin_dir, user_dir).unwrap();
        let templates = store.list().unwrap();

        assert_eq!(templates.len(), 2);
        let demo = templates.iter().find(|t| t.name == "demo").unwrap();
        assert!(!demo.builtin);
        assert_eq!(demo.description(), "user demo");
    }

    #[test]
    fn test_get_unknown_template_fails() {
        let tmp = TempDir::new().unwrap();
        let store = TemplateStore::with_dirs(
            tmp.path().join("builtin"),
            tmp.path().join("user"),
        )
        .unwrap();

        let err = store.get("nope").unwrap_err();
        assert!(err.to_string().contains("Template not found"));
    }

    #[test]
    fn test_add_and_remove_user_template() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("main.py"), "print('{{NAME}}')").unwrap();

        let store = TemplateStore::with_dirs(
            tmp.path().join("builtin"),
            tmp.path().join("user"),
        )
        .unwrap();

        let template = store.add(&source, Some("pytool")).unwrap();
        assert_eq!(template.name, "pytool");
        // A starter manifest is written for bare directories
        assert!(template.manifest.is_some());

        store.remove("pytool").unwrap();
        assert!(store.find("pytool").unwrap().is_none());
    }

    #[test]
    fn test_add_duplicate_name_fails() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source");
        fs::create_dir_all(&source).unwrap();

        let store = TemplateStore::with_dirs(
            tmp.path().join("builtin"),
            tmp.path().join("user"),
        )
        .unwrap();

        store.add(&source, Some("dup")).unwrap();
        let err = store.add(&source, Some("dup")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
