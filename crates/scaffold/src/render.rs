//! Rendering a template tree onto disk.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

use crate::answers::{self, Answers};
use crate::error::RenderError;
use crate::manifest::MANIFEST_FILE;
use crate::store::Template;

/// Materialize `template` at `dest` with the given answers.
///
/// Every `{{TOKEN}}` in file contents and path components is replaced;
/// binary files are copied verbatim. The destination must not exist:
/// rendering never overwrites.
pub fn render(template: &Template, dest: &Path, answers: &Answers, init_git: bool) -> Result<()> {
    if dest.exists() {
        bail!(RenderError::DestinationExists(dest.to_path_buf()));
    }

    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create destination: {}", dest.display()))?;

    for entry in WalkDir::new(&template.path)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let src_path = entry.path();
        let rel_path = src_path.strip_prefix(&template.path)?;

        // The manifest describes the template; it is not part of it.
        if rel_path.as_os_str() == MANIFEST_FILE {
            continue;
        }
        if rel_path.as_os_str().is_empty() {
            continue;
        }

        // Substitute tokens in path components
        let mut dest_rel = PathBuf::new();
        for component in rel_path.components() {
            let component_str = component.as_os_str().to_string_lossy();
            dest_rel.push(answers.substitute(&component_str));
        }

        let dest_path = dest.join(&dest_rel);

        if src_path.is_dir() {
            fs::create_dir_all(&dest_path)
                .with_context(|| format!("Failed to create directory: {}", dest_path.display()))?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = fs::read(src_path)
            .with_context(|| format!("Failed to read: {}", src_path.display()))?;

        if answers::is_binary(&content) {
            fs::write(&dest_path, &content)
                .with_context(|| format!("Failed to write: {}", dest_path.display()))?;
        } else {
            let text = String::from_utf8_lossy(&content);
            fs::write(&dest_path, answers.substitute(&text))
                .with_context(|| format!("Failed to write: {}", dest_path.display()))?;
        }

        copy_exec_bit(src_path, &dest_path)?;
    }

    if init_git {
        let _ = Command::new("git")
            .args(["init", "-q"])
            .current_dir(dest)
            .output();

        let _ = Command::new("git")
            .args(["add", "."])
            .current_dir(dest)
            .output();
    }

    Ok(())
}

/// Collect every token used anywhere in a template tree: in file and
/// directory names, and in text file contents.
pub fn scan_tokens(root: &Path) -> Result<Vec<String>> {
    let mut all_tokens = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            all_tokens.extend(answers::find_tokens(name));
        }

        let is_manifest = path
            .file_name()
            .map(|n| n == MANIFEST_FILE)
            .unwrap_or(false);
        if path.is_file() && !is_manifest {
            if let Ok(content) = fs::read(path) {
                if !answers::is_binary(&content) {
                    if let Ok(text) = String::from_utf8(content) {
                        all_tokens.extend(answers::find_tokens(&text));
                    }
                }
            }
        }
    }

    all_tokens.sort();
    all_tokens.dedup();
    Ok(all_tokens)
}

#[cfg(unix)]
fn copy_exec_bit(src: &Path, dest: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(src_meta) = src.metadata() {
        let src_mode = src_meta.permissions().mode();
        if src_mode & 0o111 != 0 {
            let mut perms = fs::metadata(dest)?.permissions();
            perms.set_mode(src_mode);
            fs::set_permissions(dest, perms)?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn copy_exec_bit(_src: &Path, _dest: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, Prompt};
    use tempfile::TempDir;

    fn write_test_template(dir: &Path) {
        fs::create_dir_all(dir).unwrap();

        let manifest = Manifest {
            name: "test-template".to_string(),
            description: "A test template".to_string(),
            version: "1.0.0".to_string(),
            author: "Test".to_string(),
            prompts: vec![Prompt {
                name: "PACKAGE_NAME".to_string(),
                prompt: Some("Package name".to_string()),
                default: Some("pkg".to_string()),
            }],
            next_steps: vec![],
        };
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest).unwrap(),
        )
        .unwrap();

        fs::write(dir.join("README.md"), "# {{NAME}}\n\n{{DESCRIPTION}}\n").unwrap();

        let subdir = dir.join("src").join("{{PACKAGE_NAME}}");
        fs::create_dir_all(&subdir).unwrap();
        fs::write(subdir.join("__init__.py"), "\"\"\"{{NAME}}.\"\"\"\n").unwrap();

        // A file with a NUL byte must be copied untouched.
        fs::write(dir.join("logo.bin"), b"\x89PNG\x00{{NAME}}").unwrap();
    }

    fn test_template(dir: &Path) -> Template {
        write_test_template(dir);
        Template::from_path(dir, true).unwrap()
    }

    #[test]
    fn test_render_substitutes_contents_and_paths() {
        let tmp = TempDir::new().unwrap();
        let template = test_template(&tmp.path().join("template"));
        let dest = tmp.path().join("myproject");

        let mut answers = Answers::standard("myproject");
        answers.set("PACKAGE_NAME", "myproject");

        render(&template, &dest, &answers, false).unwrap();

        let readme = fs::read_to_string(dest.join("README.md")).unwrap();
        assert!(readme.starts_with("# myproject"));

        assert!(dest.join("src/myproject/__init__.py").exists());
        assert!(!dest.join(MANIFEST_FILE).exists());
    }

    #[test]
    fn test_render_copies_binary_files_verbatim() {
        let tmp = TempDir::new().unwrap();
        let template = test_template(&tmp.path().join("template"));
        let dest = tmp.path().join("out");

        let answers = Answers::standard("out");
        render(&template, &dest, &answers, false).unwrap();

        let logo = fs::read(dest.join("logo.bin")).unwrap();
        assert_eq!(logo, b"\x89PNG\x00{{NAME}}");
    }

    #[test]
    fn test_render_twice_fails_on_existing_destination() {
        let tmp = TempDir::new().unwrap();
        let template = test_template(&tmp.path().join("template"));
        let dest = tmp.path().join("proj");

        let answers = Answers::standard("proj");
        render(&template, &dest, &answers, false).unwrap();

        let err = render(&template, &dest, &answers, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_render_same_answers_same_output() {
        let tmp = TempDir::new().unwrap();
        let template = test_template(&tmp.path().join("template"));

        let mut answers = Answers::standard("proj");
        answers.set("PACKAGE_NAME", "proj");

        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        render(&template, &first, &answers, false).unwrap();
        render(&template, &second, &answers, false).unwrap();

        assert_eq!(
            fs::read_to_string(first.join("README.md")).unwrap(),
            fs::read_to_string(second.join("README.md")).unwrap()
        );
    }

    #[test]
    fn test_scan_tokens_covers_names_and_contents() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("template");
        write_test_template(&dir);

        let tokens = scan_tokens(&dir).unwrap();
        assert!(tokens.contains(&"NAME".to_string()));
        assert!(tokens.contains(&"DESCRIPTION".to_string()));
        assert!(tokens.contains(&"PACKAGE_NAME".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_render_preserves_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("template");
        write_test_template(&dir);
        let script = dir.join("run.sh");
        fs::write(&script, "#!/bin/sh\necho {{NAME}}\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let template = Template::from_path(&dir, true).unwrap();
        let dest = tmp.path().join("proj");
        render(&template, &dest, &Answers::standard("proj"), false).unwrap();

        let mode = fs::metadata(dest.join("run.sh")).unwrap().permissions().mode();
        assert!(mode & 0o111 != 0);
    }
}
