//! Template lookup and rendering.
//!
//! Templates live flat in the template directory and follow a naming
//! convention:
//!
//! ```text
//! templates/
//! ├── template_default.html    # page template `default` (the fallback)
//! ├── template_blog.html       # page template `blog`
//! ├── partial_header.html      # {% include 'partial_header.html' %}
//! └── partial_footer.html
//! ```
//!
//! A page names its template in front matter (`template: blog`). When that
//! file does not exist the page falls back to `template_default.html`; if
//! that is missing too, the page cannot be rendered.
//!
//! The syntax is Jinja (minijinja): `{{ var }}`, `{% if %}`, `{% for %}`,
//! `{% include %}`. Output is not HTML-escaped because `content` is already
//! rendered HTML.

use minijinja::{AutoEscape, Environment, path_loader};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Page template used when the requested one is absent.
pub const DEFAULT_TEMPLATE: &str = "default";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template '{requested}' not found and no '{fallback}' in {dir}")]
    NotFound {
        requested: String,
        fallback: String,
        dir: PathBuf,
    },
    #[error("failed to render {template}: {source}")]
    Render {
        template: String,
        #[source]
        source: minijinja::Error,
    },
}

/// The template file chosen for a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// File name within the template directory, e.g. `template_blog.html`.
    pub file_name: String,
    /// True when the requested template was missing and the default was used.
    pub fell_back: bool,
}

/// File name of a page template: `blog` → `template_blog.html`.
pub fn page_template_file(name: &str) -> String {
    format!("template_{name}.html")
}

/// Names must stay inside the template directory: no separators, no `..`.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// Template engine bound to one template directory.
#[derive(Debug)]
pub struct Templates {
    dir: PathBuf,
    env: Environment<'static>,
}

impl Templates {
    pub fn new(dir: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir));
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self {
            dir: dir.to_path_buf(),
            env,
        }
    }

    fn has_page_template(&self, name: &str) -> bool {
        is_plain_name(name) && self.dir.join(page_template_file(name)).is_file()
    }

    /// Pick the template file for a page that asked for `name`.
    pub fn resolve(&self, name: &str) -> Result<Resolved, TemplateError> {
        if self.has_page_template(name) {
            return Ok(Resolved {
                file_name: page_template_file(name),
                fell_back: false,
            });
        }
        if self.has_page_template(DEFAULT_TEMPLATE) {
            return Ok(Resolved {
                file_name: page_template_file(DEFAULT_TEMPLATE),
                fell_back: name != DEFAULT_TEMPLATE,
            });
        }
        Err(TemplateError::NotFound {
            requested: page_template_file(name),
            fallback: page_template_file(DEFAULT_TEMPLATE),
            dir: self.dir.clone(),
        })
    }

    /// Render a template file against `context`.
    pub fn render<S: Serialize>(&self, file_name: &str, context: S) -> Result<String, TemplateError> {
        let render_err = |source| TemplateError::Render {
            template: file_name.to_string(),
            source,
        };
        let template = self.env.get_template(file_name).map_err(render_err)?;
        template.render(context).map_err(render_err)
    }

    /// Names of the page templates present, sorted (`["blog", "default"]`).
    pub fn page_templates(&self) -> std::io::Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| {
                let file_name = e.file_name().to_string_lossy().into_owned();
                file_name
                    .strip_prefix("template_")
                    .and_then(|rest| rest.strip_suffix(".html"))
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        Ok(names)
    }
}
