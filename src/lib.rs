//! # mdgen
//!
//! A minimal static site generator. Markdown files with a front matter header
//! are rendered through named Jinja templates and written to a build
//! directory that mirrors the content tree.
//!
//! # Architecture: Two Passes Over the Content Tree
//!
//! ```text
//! 1. Collect    markdown/  →  Navigation    (front matter parsed, files bucketed)
//! 2. Render     markdown/  →  build/        (every page sees the full Navigation)
//! ```
//!
//! Navigation is built completely before the first page renders, so a page
//! early in the walk can still list pages that come after it. Files are parsed
//! once; the second pass reuses the collected records.
//!
//! Every run is a full rebuild: the build directory is deleted and recreated.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frontmatter`] | Splits `---` YAML / `+++` TOML front matter from the Markdown body |
//! | [`collect`] | Pass 1: walks the content root, builds [`types::ContentFile`] records, buckets them |
//! | [`types`] | `ContentFile` and `Navigation`, plus how templates see them |
//! | [`markdown`] | Markdown → HTML with tables, footnotes and highlighted code blocks |
//! | [`templates`] | `template_<name>.html` lookup with default fallback, minijinja rendering |
//! | [`render`] | Per-page context assembly and output |
//! | [`generate`] | Pass 2 and the orchestration around both passes |
//! | [`init`] | Writes a sample site to start from |
//! | [`config`] | `mdgen.toml` loading, merging with CLI overrides, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Template Context
//!
//! Every page template receives the page's front matter keys, `content` (the
//! rendered body), `filename`, `filepath`, `link`, and one list per bucket:
//!
//! ```text
//! root_files    files directly in markdown/ (always present)
//! blog_files    files anywhere below markdown/blog/
//! all_files     every collected file
//! ```
//!
//! Each list entry carries its front matter plus `path`, `link` and `content`
//! (the raw Markdown).

pub mod collect;
pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod init;
pub mod markdown;
pub mod output;
pub mod render;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
