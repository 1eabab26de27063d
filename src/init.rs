//! Project scaffolding.
//!
//! Writes a small working site into the configured content and template
//! directories so the first `mdgen` run has something to build:
//!
//! ```text
//! markdown/
//! ├── index.md
//! ├── about.md
//! └── blog/
//!     └── first-post.md
//! templates/
//! ├── template_default.html
//! ├── template_blog.html
//! ├── partial_header.html
//! └── partial_footer.html
//! ```
//!
//! Files that already exist are left as they are and reported, so running
//! init inside an existing project only fills in what is missing.

use crate::config::SiteConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InitError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which configured directory a scaffold file belongs in.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Root {
    Markdown,
    Templates,
}

/// Scaffold files: (root, path relative to that root, contents).
const SCAFFOLD: &[(Root, &str, &str)] = &[
    (
        Root::Markdown,
        "index.md",
        include_str!("../static/scaffold/markdown/index.md"),
    ),
    (
        Root::Markdown,
        "about.md",
        include_str!("../static/scaffold/markdown/about.md"),
    ),
    (
        Root::Markdown,
        "blog/first-post.md",
        include_str!("../static/scaffold/markdown/blog/first-post.md"),
    ),
    (
        Root::Templates,
        "template_default.html",
        include_str!("../static/scaffold/templates/template_default.html"),
    ),
    (
        Root::Templates,
        "template_blog.html",
        include_str!("../static/scaffold/templates/template_blog.html"),
    ),
    (
        Root::Templates,
        "partial_header.html",
        include_str!("../static/scaffold/templates/partial_header.html"),
    ),
    (
        Root::Templates,
        "partial_footer.html",
        include_str!("../static/scaffold/templates/partial_footer.html"),
    ),
];

/// What init did, file by file.
#[derive(Debug, Default, PartialEq)]
pub struct InitReport {
    pub created: Vec<PathBuf>,
    /// Already present, not overwritten.
    pub skipped: Vec<PathBuf>,
}

/// Scaffold the sample site into the config's content and template dirs.
pub fn init(config: &SiteConfig) -> Result<InitReport, InitError> {
    scaffold(&config.markdown_dir, &config.template_dir)
}

/// Write any missing scaffold file under `markdown_dir` / `template_dir`.
pub fn scaffold(markdown_dir: &Path, template_dir: &Path) -> Result<InitReport, InitError> {
    let mut report = InitReport::default();

    for (root, rel, contents) in SCAFFOLD {
        let path = match root {
            Root::Markdown => markdown_dir.join(rel),
            Root::Templates => template_dir.join(rel),
        };
        if path.exists() {
            report.skipped.push(path);
            continue;
        }
        let io_err = |source| InitError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&path, contents).map_err(io_err)?;
        report.created.push(path);
    }

    Ok(report)
}
