//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Pages are shown by what they are (title, output link) first, with source
//! paths and template choices as indented context lines. Problems lead with
//! the affected source path so they can be fixed without searching.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Cleaning build
//! Collected 5 files
//!     blog_files: 2
//!     docs_files: 1
//!     root_files: 2
//! Warning: markdown/draft.md is missing desc, template
//! markdown/about.md → build/about.html
//! markdown/docs/setup.md → build/docs/setup.html
//!     Template: template_default.html (fallback)
//! Failed: markdown/broken.md
//!     Error: template 'template_x.html' not found and no 'template_default.html' in templates
//!
//! Generated 4 pages, 1 failed
//! ```
//!
//! ## Check
//!
//! ```text
//! blog_files
//! 001 First Post → blog/first-post.html
//!     Source: blog/first-post.md
//!     Template: template_blog.html
//!
//! Templates
//!     template_blog.html
//!     template_default.html
//!
//! Checked 5 pages: 0 without a template, 0 skipped
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::{CheckReport, GenerateEvent, GenerateSummary, PageCheck};
use crate::init::InitReport;
use crate::templates::{Resolved, page_template_file};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

fn template_line(template: &Resolved) -> String {
    if template.fell_back {
        format!("{}Template: {} (fallback)", indent(1), template.file_name)
    } else {
        format!("{}Template: {}", indent(1), template.file_name)
    }
}

// ============================================================================
// Generate output
// ============================================================================

/// Format a single generation event as display lines.
///
/// Conversions using the requested template print one line; fallbacks and
/// problems add indented context.
pub fn format_generate_event(event: &GenerateEvent) -> Vec<String> {
    match event {
        GenerateEvent::Cleaning { build_dir } => {
            vec![format!("Cleaning {}", build_dir.display())]
        }
        GenerateEvent::Skipped { source, reason } => vec![
            format!("Skipped: {}", source.display()),
            format!("{}Error: {}", indent(1), reason),
        ],
        GenerateEvent::MissingFields { source, fields } => vec![format!(
            "Warning: {} is missing {}",
            source.display(),
            fields.join(", ")
        )],
        GenerateEvent::Collected { files, buckets } => {
            let mut lines = vec![format!("Collected {}", plural(*files, "file"))];
            for (key, count) in buckets {
                lines.push(format!("{}{}: {}", indent(1), key, count));
            }
            lines
        }
        GenerateEvent::Converted {
            source,
            output,
            template,
        } => {
            let mut lines = vec![format!(
                "{} \u{2192} {}",
                source.display(),
                output.display()
            )];
            if template.fell_back {
                lines.push(template_line(template));
            }
            lines
        }
        GenerateEvent::Failed { source, error } => vec![
            format!("Failed: {}", source.display()),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

/// Format the closing summary of a generation run.
///
/// An empty content tree gets a hint pointing at `init`.
pub fn format_generate_summary(summary: &GenerateSummary, markdown_dir: &Path) -> Vec<String> {
    if summary.processed == 0 && summary.failed == 0 {
        return vec![
            String::new(),
            format!("No Markdown files found in {}", markdown_dir.display()),
            format!(
                "{}Run `mdgen init` (or `mdgen --init`) to create a sample site",
                indent(1)
            ),
        ];
    }

    let mut line = format!("Generated {}", plural(summary.processed, "page"));
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    vec![String::new(), line]
}

/// Print the generate summary to stdout.
pub fn print_generate_summary(summary: &GenerateSummary, markdown_dir: &Path) {
    for line in format_generate_summary(summary, markdown_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

fn page_lines(index: usize, page: &PageCheck) -> Vec<String> {
    let mut lines = vec![
        format!("{} {} \u{2192} {}", format_index(index), page.title, page.link),
        format!("{}Source: {}", indent(1), page.path),
    ];
    match &page.template {
        Ok(template) => lines.push(template_line(template)),
        Err(error) => lines.push(format!("{}Error: {}", indent(1), error)),
    }
    lines
}

/// Format the dry-run report: pages grouped by navigation bucket, each with
/// the template it would render through.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();

    for name in report.navigation.bucket_names() {
        let Some(files) = report.navigation.bucket(name) else {
            continue;
        };
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(crate::types::bucket_key(name));
        if files.is_empty() {
            lines.push(format!("{}(empty)", indent(1)));
        }
        for (i, file) in files.iter().enumerate() {
            if let Some(page) = report.pages.iter().find(|p| p.path == file.path) {
                lines.extend(page_lines(i + 1, page));
            }
        }
    }

    lines.push(String::new());
    lines.push("Templates".to_string());
    if report.templates.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for name in &report.templates {
        lines.push(format!("{}{}", indent(1), page_template_file(name)));
    }

    lines.push(String::new());
    lines.push(format!(
        "Checked {}: {} without a template, {} skipped",
        plural(report.pages.len(), "page"),
        report.unresolved(),
        report.skipped
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Init output
// ============================================================================

/// Format what init created and what it left alone.
pub fn format_init_output(report: &InitReport) -> Vec<String> {
    let mut lines = Vec::new();
    for path in &report.created {
        lines.push(format!("Created {}", path.display()));
    }
    for path in &report.skipped {
        lines.push(format!("Exists  {}", path.display()));
    }
    lines.push(String::new());
    if report.created.is_empty() {
        lines.push("Nothing to do, all scaffold files already exist".to_string());
    } else {
        lines.push(format!(
            "Initialized {}. Run `mdgen` to build the site",
            plural(report.created.len(), "file")
        ));
    }
    lines
}

/// Print init output to stdout.
pub fn print_init_output(report: &InitReport) {
    for line in format_init_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn resolved(file_name: &str, fell_back: bool) -> Resolved {
        Resolved {
            file_name: file_name.to_string(),
            fell_back,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(0, "page"), "0 pages");
        assert_eq!(plural(1, "page"), "1 page");
        assert_eq!(plural(2, "file"), "2 files");
    }

    // =========================================================================
    // Generate events
    // =========================================================================

    #[test]
    fn converted_with_requested_template_is_one_line() {
        let event = GenerateEvent::Converted {
            source: PathBuf::from("markdown/blog/x.md"),
            output: PathBuf::from("build/blog/x.html"),
            template: resolved("template_blog.html", false),
        };
        assert_eq!(
            format_generate_event(&event),
            vec!["markdown/blog/x.md \u{2192} build/blog/x.html"]
        );
    }

    #[test]
    fn converted_with_fallback_shows_template() {
        let event = GenerateEvent::Converted {
            source: PathBuf::from("markdown/x.md"),
            output: PathBuf::from("build/x.html"),
            template: resolved("template_default.html", true),
        };
        let lines = format_generate_event(&event);
        assert_eq!(lines[1], "    Template: template_default.html (fallback)");
    }

    #[test]
    fn collected_lists_bucket_counts() {
        let event = GenerateEvent::Collected {
            files: 3,
            buckets: vec![("blog_files".into(), 2), ("root_files".into(), 1)],
        };
        assert_eq!(
            format_generate_event(&event),
            vec!["Collected 3 files", "    blog_files: 2", "    root_files: 1"]
        );
    }

    #[test]
    fn missing_fields_warning_names_fields() {
        let event = GenerateEvent::MissingFields {
            source: PathBuf::from("markdown/a.md"),
            fields: vec!["desc", "template"],
        };
        assert_eq!(
            format_generate_event(&event),
            vec!["Warning: markdown/a.md is missing desc, template"]
        );
    }

    #[test]
    fn failures_and_skips_include_error() {
        let failed = GenerateEvent::Failed {
            source: PathBuf::from("markdown/a.md"),
            error: "boom".into(),
        };
        assert_eq!(
            format_generate_event(&failed),
            vec!["Failed: markdown/a.md", "    Error: boom"]
        );

        let skipped = GenerateEvent::Skipped {
            source: PathBuf::from("markdown/b.md"),
            reason: "bad yaml".into(),
        };
        assert_eq!(
            format_generate_event(&skipped),
            vec!["Skipped: markdown/b.md", "    Error: bad yaml"]
        );
    }

    #[test]
    fn summary_counts_pages_and_failures() {
        let summary = GenerateSummary {
            collected: 5,
            processed: 4,
            failed: 1,
        };
        assert_eq!(
            format_generate_summary(&summary, Path::new("markdown")),
            vec!["", "Generated 4 pages, 1 failed"]
        );
    }

    #[test]
    fn summary_without_failures() {
        let summary = GenerateSummary {
            collected: 1,
            processed: 1,
            failed: 0,
        };
        assert_eq!(
            format_generate_summary(&summary, Path::new("markdown")),
            vec!["", "Generated 1 page"]
        );
    }

    #[test]
    fn empty_site_hints_at_init() {
        let lines = format_generate_summary(&GenerateSummary::default(), Path::new("content"));
        assert_eq!(lines[1], "No Markdown files found in content");
        assert!(lines[2].contains("mdgen init"));
    }

    // =========================================================================
    // Init
    // =========================================================================

    #[test]
    fn init_output_lists_created_and_existing() {
        let report = InitReport {
            created: vec![PathBuf::from("markdown/about.md")],
            skipped: vec![PathBuf::from("markdown/index.md")],
        };
        assert_eq!(
            format_init_output(&report),
            vec![
                "Created markdown/about.md",
                "Exists  markdown/index.md",
                "",
                "Initialized 1 file. Run `mdgen` to build the site",
            ]
        );
    }

    #[test]
    fn init_output_when_nothing_created() {
        let report = InitReport {
            created: vec![],
            skipped: vec![PathBuf::from("markdown/index.md")],
        };
        let lines = format_init_output(&report);
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Nothing to do, all scaffold files already exist")
        );
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_output_groups_by_bucket() {
        use crate::test_helpers::*;

        let tmp = setup_fixtures();
        let config = crate::config::SiteConfig {
            markdown_dir: tmp.path().join("markdown"),
            build_dir: tmp.path().join("build"),
            template_dir: tmp.path().join("templates"),
            ..Default::default()
        };
        let report = crate::generate::check(&config, None).unwrap();
        let lines = format_check_output(&report);

        assert_eq!(lines[0], "blog_files");
        assert_eq!(lines[1], "001 Recap \u{2192} blog/2024/recap.html");
        assert_eq!(lines[2], "    Source: blog/2024/recap.md");
        assert_eq!(lines[3], "    Template: template_blog.html");
        assert!(lines.contains(&"docs_files".to_string()));
        assert!(lines.contains(&"    Template: template_default.html (fallback)".to_string()));
        assert!(lines.contains(&"    template_blog.html".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Checked 5 pages: 0 without a template, 0 skipped")
        );
    }
}
