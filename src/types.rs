//! Shared types used across the pipeline.
//!
//! [`ContentFile`] records are built once by the collector and never mutated.
//! [`Navigation`] groups them into buckets and is handed, read-only, to every
//! page render.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Author-supplied front matter: string keys, arbitrary JSON-like values.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Front matter fields every page is expected to declare.
pub const REQUIRED_FIELDS: &[&str] = &["title", "desc", "template"];

/// Bucket for files that sit directly in the content root.
pub const ROOT_BUCKET: &str = "root";

/// Reserved context key holding every collected file.
pub const ALL_FILES_KEY: &str = "all_files";

/// One discovered Markdown file.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentFile {
    /// Absolute or working-directory-relative path to the source file.
    pub source: PathBuf,
    /// Slash-separated path relative to the content root (`blog/x.md`).
    pub path: String,
    /// Output path relative to the build root (`blog/x.html`).
    pub link: String,
    pub metadata: Metadata,
    /// Raw Markdown body, front matter removed.
    pub body: String,
}

impl ContentFile {
    /// Required fields absent from this file's metadata, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !self.metadata.contains_key(*field))
            .collect()
    }

    /// The `template` field as a template name.
    ///
    /// Scalars are spelled as written in front matter: `template: 404` names
    /// `404`, `template: true` names `true`. A missing or null field is
    /// `"default"`. Lists and maps become their JSON text, which never
    /// matches a template file, so the page falls back to the default.
    pub fn template_name(&self) -> Cow<'_, str> {
        match self.metadata.get("template") {
            None | Some(Value::Null) => Cow::Borrowed("default"),
            Some(Value::String(name)) => Cow::Borrowed(name.as_str()),
            Some(Value::Number(n)) => Cow::Owned(n.to_string()),
            Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }

    /// Display title: the `title` field, falling back to the source path.
    pub fn title(&self) -> &str {
        self.metadata
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.path)
    }

    /// Name of the bucket this file belongs to: the first segment of its link,
    /// or [`ROOT_BUCKET`] for files directly in the content root.
    pub fn bucket(&self) -> &str {
        match self.link.split_once('/') {
            Some((first, _)) => first,
            None => ROOT_BUCKET,
        }
    }
}

/// Templates see a file as its metadata plus `path`, `link` and `content`.
/// The computed keys shadow author keys of the same name.
impl Serialize for ContentFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        const COMPUTED: [&str; 3] = ["path", "link", "content"];
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.metadata {
            if !COMPUTED.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry("path", &self.path)?;
        map.serialize_entry("link", &self.link)?;
        map.serialize_entry("content", &self.body)?;
        map.end()
    }
}

/// Site-wide navigation context: files grouped by top-level directory.
///
/// Serializes as `{ "<bucket>_files": [...], ..., "all_files": [...] }`.
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    files: Vec<ContentFile>,
    /// Bucket name → indices into `files`, in collection order.
    buckets: BTreeMap<String, Vec<usize>>,
}

impl Navigation {
    pub(crate) fn new(files: Vec<ContentFile>, buckets: BTreeMap<String, Vec<usize>>) -> Self {
        Self { files, buckets }
    }

    /// Every collected file, in collection order.
    pub fn all_files(&self) -> &[ContentFile] {
        &self.files
    }

    /// Bucket names in sorted order.
    pub fn bucket_names(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Files in the named bucket (`"blog"`, `"root"`), or `None` if unknown.
    pub fn bucket(&self, name: &str) -> Option<Vec<&ContentFile>> {
        self.buckets
            .get(name)
            .map(|indices| indices.iter().map(|&i| &self.files[i]).collect())
    }

    /// `(context key, file count)` per bucket, e.g. `("blog_files", 3)`.
    pub fn bucket_counts(&self) -> Vec<(String, usize)> {
        self.buckets
            .iter()
            .map(|(name, indices)| (bucket_key(name), indices.len()))
            .collect()
    }

    /// True if `key` is one of the context keys this navigation emits.
    pub fn has_context_key(&self, key: &str) -> bool {
        key == ALL_FILES_KEY
            || key
                .strip_suffix("_files")
                .is_some_and(|name| self.buckets.contains_key(name))
    }

    /// Write every `<bucket>_files` entry and `all_files` into `map`.
    pub(crate) fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        for (name, indices) in &self.buckets {
            let key = bucket_key(name);
            // A content directory literally named `all` must not shadow the full list.
            if key == ALL_FILES_KEY {
                continue;
            }
            let files: Vec<&ContentFile> = indices.iter().map(|&i| &self.files[i]).collect();
            map.serialize_entry(&key, &files)?;
        }
        map.serialize_entry(ALL_FILES_KEY, &self.files)
    }
}

/// Context key for a bucket name: `blog` → `blog_files`.
pub fn bucket_key(name: &str) -> String {
    format!("{name}_files")
}

impl Serialize for Navigation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_entries(&mut map)?;
        map.end()
    }
}
