//! Template rendering for repoforge.
//!
//! Templates are directory trees whose files and path components may
//! contain `{{TOKEN}}` placeholders. A `scaffold.json` manifest at the
//! template root declares the prompts to resolve before rendering.

pub mod answers;
pub mod error;
pub mod manifest;
pub mod render;
pub mod store;

pub use answers::Answers;
pub use error::RenderError;
pub use manifest::{Manifest, Prompt};
pub use render::{render, scan_tokens};
pub use store::{Template, TemplateStore};
