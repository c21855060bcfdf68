//! Rendering errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure conditions of template rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("No answer for required prompt '{0}' (no default declared)")]
    MissingAnswer(String),

    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}
