//! Per-page rendering.
//!
//! Each page is rendered independently against the shared, read-only
//! [`Navigation`]:
//!
//! 1. Convert the Markdown body to HTML ([`crate::markdown`]).
//! 2. Resolve the page template, falling back to `template_default.html`.
//! 3. Build the template context.
//! 4. Render and write the result as UTF-8.
//!
//! ## Template Context
//!
//! Keys are layered, later layers winning on collision:
//!
//! | Layer | Keys |
//! |-------|------|
//! | Front matter | whatever the author wrote (`title`, `desc`, `template`, ...) |
//! | Computed | `content` (HTML), `filename`, `filepath`, `link` |
//! | Navigation | `root_files`, `<dir>_files`, ..., `all_files` |

use crate::markdown;
use crate::templates::{Resolved, TemplateError, Templates};
use crate::types::{ContentFile, Navigation};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Context keys computed per page, shadowing front matter of the same name.
const COMPUTED_KEYS: [&str; 4] = ["content", "filename", "filepath", "link"];

/// The variables a page template is rendered against.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub file: &'a ContentFile,
    /// Rendered HTML body.
    pub content: String,
    pub navigation: &'a Navigation,
}

impl<'a> PageContext<'a> {
    pub fn new(file: &'a ContentFile, navigation: &'a Navigation) -> Self {
        Self {
            file,
            content: markdown::render(&file.body),
            navigation,
        }
    }

    /// Base name of the source file (`first-post.md`).
    pub fn filename(&self) -> String {
        self.file
            .source
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Source path as given to the generator (`markdown/blog/first-post.md`).
    pub fn filepath(&self) -> String {
        self.file.source.to_string_lossy().into_owned()
    }

    fn is_shadowed(&self, key: &str) -> bool {
        COMPUTED_KEYS.contains(&key) || self.navigation.has_context_key(key)
    }
}

impl Serialize for PageContext<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.file.metadata {
            if !self.is_shadowed(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry("content", &self.content)?;
        map.serialize_entry("filename", &self.filename())?;
        map.serialize_entry("filepath", &self.filepath())?;
        map.serialize_entry("link", &self.file.link)?;
        self.navigation.serialize_entries(&mut map)?;
        map.end()
    }
}

/// A page rendered in memory.
#[derive(Debug)]
pub struct RenderedPage {
    pub template: Resolved,
    pub html: String,
}

/// Render one page without touching the filesystem (apart from template reads).
pub fn render_page(
    file: &ContentFile,
    navigation: &Navigation,
    templates: &Templates,
) -> Result<RenderedPage, RenderError> {
    let template = templates.resolve(&file.template_name())?;
    let context = PageContext::new(file, navigation);
    let html = templates.render(&template.file_name, &context)?;
    Ok(RenderedPage { template, html })
}

/// Render one page and write it to `output`.
pub fn write_page(
    file: &ContentFile,
    navigation: &Navigation,
    templates: &Templates,
    output: &Path,
) -> Result<Resolved, RenderError> {
    let page = render_page(file, navigation, templates)?;
    fs::write(output, page.html).map_err(|source| RenderError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(page.template)
}
