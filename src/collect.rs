//! Content discovery and categorization.
//!
//! The first pass of a generation run. Walks the content tree, parses every
//! Markdown file's front matter, and groups the results into buckets by
//! top-level directory:
//!
//! ```text
//! markdown/                    buckets
//! ├── index.md                 root_files: index.html, about.html
//! ├── about.md
//! ├── blog/                    blog_files: blog/first-post.html,
//! │   ├── first-post.md                    blog/2024/recap.html
//! │   └── 2024/
//! │       └── recap.md
//! └── docs/                    docs_files: docs/setup.html
//!     └── setup.md
//!                              all_files:  all five, walk order
//! ```
//!
//! Buckets are discovered, not declared: any top-level directory holding at
//! least one content file gets one. `root` always exists, possibly empty.
//!
//! A file whose front matter fails to parse is reported and left out. A file
//! missing `title`, `desc` or `template` is reported but kept.

use crate::frontmatter::{self, FrontMatterError};
use crate::types::{ContentFile, Navigation, ROOT_BUCKET};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extension recognized as content. Matched exactly: `README.MD` is not content.
pub const CONTENT_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Why a single file was skipped or flagged during collection.
#[derive(Error, Debug)]
pub enum FileIssue {
    #[error("could not read file: {0}")]
    Read(#[source] std::io::Error),
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
}

/// A per-file problem found while collecting.
#[derive(Debug)]
pub enum CollectIssue {
    /// The file could not be read or parsed and was left out.
    Skipped { path: PathBuf, issue: FileIssue },
    /// Required front matter fields are absent; the file is still used.
    MissingFields {
        path: PathBuf,
        fields: Vec<&'static str>,
    },
}

/// Result of the collection pass.
#[derive(Debug, Default)]
pub struct Collection {
    pub files: Vec<ContentFile>,
    pub issues: Vec<CollectIssue>,
}

impl Collection {
    /// Source paths that were left out because they failed to parse.
    pub fn skipped(&self) -> impl Iterator<Item = &Path> {
        self.issues.iter().filter_map(|issue| match issue {
            CollectIssue::Skipped { path, .. } => Some(path.as_path()),
            CollectIssue::MissingFields { .. } => None,
        })
    }
}

/// True if `path` has the content extension.
pub fn is_content_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == CONTENT_EXTENSION)
}

/// Slash-separated form of a relative path, independent of platform separator.
pub fn slash_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Output link for a content-relative path: `blog/x.md` → `blog/x.html`.
pub fn output_link(rel: &Path) -> String {
    slash_path(&rel.with_extension("html"))
}

/// Walk `root` and collect every content file, in walk order.
///
/// Walk order is sorted by file name within each directory so repeated runs
/// see the same sequence.
pub fn collect(root: &Path) -> Result<Collection, CollectError> {
    let mut collection = Collection::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_content_file(entry.path()) {
            continue;
        }

        let source = entry.path().to_path_buf();
        let Ok(rel) = source.strip_prefix(root) else {
            continue;
        };

        match load_file(&source, rel) {
            Ok(file) => {
                let missing = file.missing_fields();
                if !missing.is_empty() {
                    collection.issues.push(CollectIssue::MissingFields {
                        path: source.clone(),
                        fields: missing,
                    });
                }
                collection.files.push(file);
            }
            Err(issue) => collection.issues.push(CollectIssue::Skipped {
                path: source,
                issue,
            }),
        }
    }

    Ok(collection)
}

fn load_file(source: &Path, rel: &Path) -> Result<ContentFile, FileIssue> {
    let text = fs::read_to_string(source).map_err(FileIssue::Read)?;
    let doc = frontmatter::parse(&text)?;
    Ok(ContentFile {
        source: source.to_path_buf(),
        path: slash_path(rel),
        link: output_link(rel),
        metadata: doc.metadata,
        body: doc.body,
    })
}

/// Group files into buckets by the first segment of their link.
///
/// Single pass, insertion-if-absent. Collection order is kept within each
/// bucket.
pub fn categorize(files: Vec<ContentFile>) -> Navigation {
    let mut buckets: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    buckets.insert(ROOT_BUCKET.to_string(), Vec::new());

    for (index, file) in files.iter().enumerate() {
        buckets
            .entry(file.bucket().to_string())
            .or_default()
            .push(index);
    }

    Navigation::new(files, buckets)
}
