//! Site generation.
//!
//! Drives a full rebuild:
//!
//! ```text
//! 1. Preconditions   markdown/ and templates/ must exist     (fatal)
//! 2. Clean           build/ removed and recreated empty
//! 3. Collect         markdown/ → Vec<ContentFile>           (per-file issues reported)
//! 4. Categorize      Vec<ContentFile> → Navigation          (root_files, blog_files, ...)
//! 5. Process         markdown/ mirrored into build/          (per-file failures reported)
//! ```
//!
//! ## Output Structure
//!
//! The build tree mirrors the content tree one to one, including directories
//! with no content files:
//!
//! ```text
//! markdown/                     build/
//! ├── index.md                  ├── index.html
//! ├── blog/                     ├── blog/
//! │   └── first-post.md    →    │   └── first-post.html
//! └── drafts/                   └── drafts/
//!     └── notes.txt
//! ```
//!
//! ## Failure Policy
//!
//! Only a missing content or template directory (or an unusable build
//! directory) stops the run, and it does so before the build directory is
//! touched. Everything that goes wrong with a single page (bad front matter,
//! no usable template, render or write failure) is reported through
//! [`GenerateEvent`] and the run moves on to the next page.
//!
//! ## Parallel Rendering
//!
//! Directories are created in walk order first; pages are then rendered on
//! rayon's pool. Outcomes are reported in walk order, so console output and
//! the build tree do not depend on scheduling.

use crate::collect::{self, CollectError, CollectIssue, Collection};
use crate::config::{ConfigError, SiteConfig};
use crate::render::{self, RenderError};
use crate::templates::{Resolved, Templates};
use crate::types::{ContentFile, Navigation};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("Markdown directory '{0}' does not exist")]
    MissingSourceDir(PathBuf),
    #[error("Template directory '{0}' does not exist")]
    MissingTemplateDir(PathBuf),
}

impl GenerateError {
    /// Whether the error is a missing input directory that `init` would create.
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            GenerateError::MissingSourceDir(_) | GenerateError::MissingTemplateDir(_)
        )
    }
}

/// Progress reported while generating.
#[derive(Debug)]
pub enum GenerateEvent {
    /// An existing build directory is about to be deleted.
    Cleaning { build_dir: PathBuf },
    /// A file was left out of the site during collection.
    Skipped { source: PathBuf, reason: String },
    /// A file lacks required front matter fields but is still rendered.
    MissingFields {
        source: PathBuf,
        fields: Vec<&'static str>,
    },
    /// Collection finished.
    Collected {
        files: usize,
        buckets: Vec<(String, usize)>,
    },
    /// A page was written.
    Converted {
        source: PathBuf,
        output: PathBuf,
        template: Resolved,
    },
    /// A page could not be rendered or written.
    Failed { source: PathBuf, error: String },
}

/// Counts for one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateSummary {
    /// Files collected into the navigation context.
    pub collected: usize,
    /// Pages written.
    pub processed: usize,
    /// Content files that produced no page.
    pub failed: usize,
}

/// Counts from the directory processor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessSummary {
    pub processed: usize,
    pub failed: usize,
}

fn emit(events: Option<&Sender<GenerateEvent>>, event: GenerateEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        tx.send(event).ok();
    }
}

/// Check that both input directories exist. Touches nothing.
pub fn check_inputs(config: &SiteConfig) -> Result<(), GenerateError> {
    if !config.markdown_dir.is_dir() {
        return Err(GenerateError::MissingSourceDir(config.markdown_dir.clone()));
    }
    if !config.template_dir.is_dir() {
        return Err(GenerateError::MissingTemplateDir(
            config.template_dir.clone(),
        ));
    }
    config.validate()?;
    Ok(())
}

/// Collect and categorize without writing anything.
///
/// Issues found while collecting are reported through `events`.
pub fn build_navigation(
    markdown_dir: &Path,
    events: Option<&Sender<GenerateEvent>>,
) -> Result<(Collection, Navigation), GenerateError> {
    let mut collection = collect::collect(markdown_dir)?;
    for issue in &collection.issues {
        let event = match issue {
            CollectIssue::Skipped { path, issue } => GenerateEvent::Skipped {
                source: path.clone(),
                reason: issue.to_string(),
            },
            CollectIssue::MissingFields { path, fields } => GenerateEvent::MissingFields {
                source: path.clone(),
                fields: fields.clone(),
            },
        };
        emit(events, event);
    }

    let files = std::mem::take(&mut collection.files);
    let navigation = collect::categorize(files);
    emit(
        events,
        GenerateEvent::Collected {
            files: navigation.all_files().len(),
            buckets: navigation.bucket_counts(),
        },
    );
    Ok((collection, navigation))
}

/// Run a full rebuild: clean the build directory, collect, categorize, render.
pub fn generate(
    config: &SiteConfig,
    events: Option<&Sender<GenerateEvent>>,
) -> Result<GenerateSummary, GenerateError> {
    check_inputs(config)?;

    if config.build_dir.exists() {
        emit(
            events,
            GenerateEvent::Cleaning {
                build_dir: config.build_dir.clone(),
            },
        );
        fs::remove_dir_all(&config.build_dir)?;
    }
    fs::create_dir_all(&config.build_dir)?;

    let (_, navigation) = build_navigation(&config.markdown_dir, events)?;
    let templates = Templates::new(&config.template_dir);
    let summary = process_directory(
        &config.markdown_dir,
        &config.build_dir,
        &templates,
        &navigation,
        events,
    )?;

    Ok(GenerateSummary {
        collected: navigation.all_files().len(),
        processed: summary.processed,
        failed: summary.failed,
    })
}

/// Template resolution for one collected page, as reported by `check`.
#[derive(Debug)]
pub struct PageCheck {
    /// Content-root-relative source path.
    pub path: String,
    pub link: String,
    pub title: String,
    pub template: Result<Resolved, String>,
}

/// Result of a dry run: the navigation that would be rendered and the
/// template each page would use.
#[derive(Debug)]
pub struct CheckReport {
    pub navigation: Navigation,
    pub pages: Vec<PageCheck>,
    /// Page template names present in the template directory.
    pub templates: Vec<String>,
    /// Files left out because their front matter failed to parse.
    pub skipped: usize,
}

impl CheckReport {
    /// Pages with no usable template.
    pub fn unresolved(&self) -> usize {
        self.pages.iter().filter(|p| p.template.is_err()).count()
    }
}

/// Collect, categorize and resolve templates without writing anything.
pub fn check(
    config: &SiteConfig,
    events: Option<&Sender<GenerateEvent>>,
) -> Result<CheckReport, GenerateError> {
    check_inputs(config)?;
    let (collection, navigation) = build_navigation(&config.markdown_dir, events)?;
    let templates = Templates::new(&config.template_dir);

    let pages = navigation
        .all_files()
        .iter()
        .map(|file| PageCheck {
            path: file.path.clone(),
            link: file.link.clone(),
            title: file.title().to_string(),
            template: templates
                .resolve(&file.template_name())
                .map_err(|e| e.to_string()),
        })
        .collect();

    Ok(CheckReport {
        skipped: collection.skipped().count(),
        templates: templates.page_templates()?,
        navigation,
        pages,
    })
}

/// One content file to render.
struct Job {
    source: PathBuf,
    rel: String,
    output: PathBuf,
}

enum Outcome {
    Written(Resolved),
    /// Front matter failed to parse; already reported during collection.
    NotCollected,
    Failed(RenderError),
}

/// Mirror `src_dir` into `out_dir`, rendering every content file.
///
/// Every directory under `src_dir` gets a counterpart, empty or not.
/// Content files are rendered against `navigation`, which must have been
/// built from the same tree beforehand.
pub fn process_directory(
    src_dir: &Path,
    out_dir: &Path,
    templates: &Templates,
    navigation: &Navigation,
    events: Option<&Sender<GenerateEvent>>,
) -> Result<ProcessSummary, GenerateError> {
    fs::create_dir_all(out_dir)?;

    let mut jobs = Vec::new();
    for entry in WalkDir::new(src_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(CollectError::from)?;
        let Ok(rel) = entry.path().strip_prefix(src_dir) else {
            continue;
        };

        if entry.file_type().is_dir() {
            let target = out_dir.join(rel);
            if !target.is_dir() {
                fs::create_dir_all(&target)?;
            }
        } else if entry.file_type().is_file() && collect::is_content_file(entry.path()) {
            jobs.push(Job {
                source: entry.path().to_path_buf(),
                rel: collect::slash_path(rel),
                output: out_dir.join(rel).with_extension("html"),
            });
        }
    }

    let by_path: HashMap<&str, &ContentFile> = navigation
        .all_files()
        .iter()
        .map(|f| (f.path.as_str(), f))
        .collect();

    let outcomes: Vec<Outcome> = jobs
        .par_iter()
        .map(|job| match by_path.get(job.rel.as_str()) {
            Some(file) => match render::write_page(file, navigation, templates, &job.output) {
                Ok(template) => Outcome::Written(template),
                Err(e) => Outcome::Failed(e),
            },
            None => Outcome::NotCollected,
        })
        .collect();

    let mut summary = ProcessSummary::default();
    for (job, outcome) in jobs.into_iter().zip(outcomes) {
        match outcome {
            Outcome::Written(template) => {
                summary.processed += 1;
                emit(
                    events,
                    GenerateEvent::Converted {
                        source: job.source,
                        output: job.output,
                        template,
                    },
                );
            }
            Outcome::NotCollected => summary.failed += 1,
            Outcome::Failed(error) => {
                summary.failed += 1;
                emit(
                    events,
                    GenerateEvent::Failed {
                        source: job.source,
                        error: error.to_string(),
                    },
                );
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn fixture_config(root: &Path) -> SiteConfig {
        SiteConfig {
            markdown_dir: root.join("markdown"),
            build_dir: root.join("build"),
            template_dir: root.join("templates"),
            ..Default::default()
        }
    }

    fn run(config: &SiteConfig) -> (Result<GenerateSummary, GenerateError>, Vec<GenerateEvent>) {
        let (tx, rx) = mpsc::channel();
        let result = generate(config, Some(&tx));
        drop(tx);
        (result, rx.into_iter().collect())
    }

    #[test]
    fn fixture_site_fully_generated() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        let (result, _) = run(&config);

        let summary = result.unwrap();
        assert_eq!(
            summary,
            GenerateSummary {
                collected: 5,
                processed: 5,
                failed: 0
            }
        );
        assert_eq!(
            list_files(&config.build_dir),
            vec![
                "about.html",
                "blog/2024/recap.html",
                "blog/first-post.html",
                "docs/setup.html",
                "index.html",
            ]
        );
    }

    #[test]
    fn directories_mirrored_including_empty_ones() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        run(&config).0.unwrap();

        assert_eq!(
            list_dirs(&config.build_dir),
            vec!["blog", "blog/2024", "docs", "drafts"]
        );
    }

    #[test]
    fn rendered_page_contains_body_metadata_and_navigation() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        run(&config).0.unwrap();

        let index = read_file(&config.build_dir, "index.html");
        assert!(index.contains("<title>Home Page</title>"));
        assert!(index.contains("content=\"Welcome to the fixture site\""));
        assert!(index.contains("<h1>Welcome</h1>"));
        assert!(index.contains("<header>"));
        assert!(index.contains("<footer>index.md</footer>"));
        assert!(index.contains("href=\"/blog/first-post.html\">First Post</a>"));
        assert!(index.contains("href=\"/about.html\">About</a>"));
    }

    #[test]
    fn blog_template_lists_other_posts_only() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        run(&config).0.unwrap();

        let post = read_file(&config.build_dir, "blog/first-post.html");
        assert!(post.contains("<body class=\"blog\">"));
        assert!(post.contains("href=\"/blog/2024/recap.html\""));
        assert!(!post.contains("href=\"/blog/first-post.html\""));
        assert!(post.contains("codehilite"));
    }

    #[test]
    fn missing_template_falls_back_to_default() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        let (_, events) = run(&config);

        let setup = read_file(&config.build_dir, "docs/setup.html");
        assert!(setup.contains("<title>Setup</title>"));

        let fell_back = events.iter().any(|e| {
            matches!(e, GenerateEvent::Converted { source, template, .. }
                if source.ends_with("docs/setup.md") && template.fell_back)
        });
        assert!(fell_back);
    }

    #[test]
    fn missing_default_template_fails_only_that_page() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        fs::remove_file(config.template_dir.join("template_default.html")).unwrap();

        let (result, events) = run(&config);
        let summary = result.unwrap();
        // Pages on the blog template still render.
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 3);
        assert!(config.build_dir.join("blog/first-post.html").exists());
        assert!(!config.build_dir.join("index.html").exists());

        let failures = events
            .iter()
            .filter(|e| matches!(e, GenerateEvent::Failed { .. }))
            .count();
        assert_eq!(failures, 3);
    }

    #[test]
    fn bad_front_matter_skipped_rest_generated() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        write_file(tmp.path(), "markdown/broken.md", "---\ntitle: [oops\n---\n");

        let (result, events) = run(&config);
        let summary = result.unwrap();
        assert_eq!(summary.collected, 5);
        assert_eq!(summary.processed, 5);
        assert_eq!(summary.failed, 1);
        assert!(!config.build_dir.join("broken.html").exists());
        assert!(events.iter().any(|e| matches!(
            e,
            GenerateEvent::Skipped { source, .. } if source.ends_with("broken.md")
        )));
    }

    #[test]
    fn missing_fields_reported_page_still_written() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        write_file(tmp.path(), "markdown/bare.md", "# Bare\n");

        let (result, events) = run(&config);
        assert_eq!(result.unwrap().processed, 6);
        assert!(read_file(&config.build_dir, "bare.html").contains("<title></title>"));
        assert!(events.iter().any(|e| matches!(
            e,
            GenerateEvent::MissingFields { fields, .. } if fields == &vec!["title", "desc", "template"]
        )));
    }

    #[test]
    fn stale_build_output_removed() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        write_file(&config.build_dir, "old/stale.html", "stale");
        write_file(&config.build_dir, "leftover.txt", "stale");

        let (_, events) = run(&config);
        let files = list_files(&config.build_dir);
        assert!(!files.iter().any(|f| f.contains("stale") || f.contains("leftover")));
        assert!(!config.build_dir.join("old").exists());
        assert!(matches!(events.first(), Some(GenerateEvent::Cleaning { .. })));
    }

    #[test]
    fn regeneration_is_byte_identical() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());

        run(&config).0.unwrap();
        let first: Vec<(String, String)> = list_files(&config.build_dir)
            .into_iter()
            .map(|f| {
                let content = read_file(&config.build_dir, &f);
                (f, content)
            })
            .collect();

        run(&config).0.unwrap();
        let second: Vec<(String, String)> = list_files(&config.build_dir)
            .into_iter()
            .map(|f| {
                let content = read_file(&config.build_dir, &f);
                (f, content)
            })
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_markdown_dir_leaves_build_untouched() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        fs::remove_dir_all(&config.markdown_dir).unwrap();
        write_file(&config.build_dir, "keep.html", "keep");

        let (result, events) = run(&config);
        assert!(matches!(result, Err(GenerateError::MissingSourceDir(_))));
        assert!(result.unwrap_err().is_missing_input());
        assert_eq!(read_file(&config.build_dir, "keep.html"), "keep");
        assert!(events.is_empty());
    }

    #[test]
    fn missing_template_dir_leaves_build_untouched() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        fs::remove_dir_all(&config.template_dir).unwrap();
        write_file(&config.build_dir, "keep.html", "keep");

        let (result, _) = run(&config);
        assert!(matches!(result, Err(GenerateError::MissingTemplateDir(_))));
        assert_eq!(read_file(&config.build_dir, "keep.html"), "keep");
    }

    #[test]
    fn empty_markdown_dir_generates_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("markdown")).unwrap();
        write_file(tmp.path(), "templates/template_default.html", "x");
        let config = fixture_config(tmp.path());

        let (result, _) = run(&config);
        assert_eq!(result.unwrap(), GenerateSummary::default());
        assert!(config.build_dir.is_dir());
        assert!(list_files(&config.build_dir).is_empty());
    }

    #[test]
    fn events_reported_in_walk_order() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        let (_, events) = run(&config);

        let converted: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                GenerateEvent::Converted { output, .. } => Some(collect::slash_path(
                    output.strip_prefix(&config.build_dir).unwrap(),
                )),
                _ => None,
            })
            .collect();
        assert_eq!(
            converted,
            vec![
                "about.html",
                "blog/2024/recap.html",
                "blog/first-post.html",
                "docs/setup.html",
                "index.html",
            ]
        );
    }

    #[test]
    fn check_reports_templates_without_writing() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        let report = check(&config, None).unwrap();

        assert!(!config.build_dir.exists());
        assert_eq!(report.pages.len(), 5);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.unresolved(), 0);
        assert_eq!(report.templates, vec!["blog", "default"]);

        let setup = report.pages.iter().find(|p| p.path == "docs/setup.md").unwrap();
        assert!(setup.template.as_ref().unwrap().fell_back);
        let post = report.pages.iter().find(|p| p.path == "blog/first-post.md").unwrap();
        assert_eq!(post.template.as_ref().unwrap().file_name, "template_blog.html");
    }

    #[test]
    fn check_counts_unresolved_pages() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        fs::remove_file(config.template_dir.join("template_default.html")).unwrap();
        write_file(tmp.path(), "markdown/broken.md", "---\ntitle: [x\n---\n");

        let report = check(&config, None).unwrap();
        assert_eq!(report.unresolved(), 3);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn process_directory_without_events() {
        let tmp = setup_fixtures();
        let config = fixture_config(tmp.path());
        let (_, navigation) = build_navigation(&config.markdown_dir, None).unwrap();
        let templates = Templates::new(&config.template_dir);

        let out = tmp.path().join("elsewhere");
        let summary =
            process_directory(&config.markdown_dir, &out, &templates, &navigation, None).unwrap();
        assert_eq!(
            summary,
            ProcessSummary {
                processed: 5,
                failed: 0
            }
        );
        assert!(out.join("blog/2024/recap.html").exists());
    }
}
