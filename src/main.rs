use clap::{Parser, Subcommand};
use mdgen::config::{self, Overrides, SiteConfig};
use mdgen::generate::{self, GenerateError};
use mdgen::{init, output};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "mdgen")]
#[command(about = "Static site generator for Markdown with Jinja templates")]
#[command(long_about = "\
Static site generator for Markdown with Jinja templates

Every .md file under the markdown directory becomes an .html file at the same
relative path under the build directory, rendered through the template named
in its front matter.

Project structure:

  mdgen.toml                       # Optional config (see 'mdgen gen-config')
  markdown/
  ├── index.md                     # → build/index.html       (root_files)
  ├── about.md                     # → build/about.html       (root_files)
  └── blog/
      └── first-post.md            # → build/blog/first-post.html (blog_files)
  templates/
  ├── template_default.html        # Used when a page's template is missing
  ├── template_blog.html           # template: blog
  └── partial_header.html          # {% include 'partial_header.html' %}

Front matter:
  ---
  title: First Post
  desc: Shown in <meta name=\"description\">
  template: blog
  ---

The build directory is deleted and recreated on every run.
Run 'mdgen init' to create a sample site.")]
#[command(version = version_string())]
struct Cli {
    /// Markdown content directory
    #[arg(long, global = true)]
    markdown_dir: Option<PathBuf>,

    /// Output directory (deleted and recreated on every run)
    #[arg(long, global = true)]
    build_dir: Option<PathBuf>,

    /// Template directory
    #[arg(long, global = true)]
    template_dir: Option<PathBuf>,

    /// Config file [default: mdgen.toml, if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Scaffold a sample site instead of generating (same as `init`)
    #[arg(long)]
    init: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the site (default)
    Generate,
    /// Write a sample site into the markdown and template directories
    Init,
    /// Collect content and resolve templates without writing anything
    Check,
    /// Print a stock mdgen.toml with all options documented
    GenConfig,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            markdown_dir: self.markdown_dir.clone(),
            build_dir: self.build_dir.clone(),
            template_dir: self.template_dir.clone(),
        }
    }

    fn load_config(&self) -> Result<SiteConfig, config::ConfigError> {
        config::load_config(self.config.as_deref(), &self.overrides())
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let command = match cli.command.as_ref() {
        _ if cli.init => Command::Init,
        Some(Command::Generate) | None => Command::Generate,
        Some(Command::Init) => Command::Init,
        Some(Command::Check) => Command::Check,
        Some(Command::GenConfig) => Command::GenConfig,
    };

    match command {
        Command::Generate => {
            let site_config = cli.load_config()?;
            init_thread_pool(&site_config.processing);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_generate_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = generate::generate(&site_config, Some(&tx));
            drop(tx);
            printer.join().ok();
            let summary = result.map_err(with_init_hint)?;
            output::print_generate_summary(&summary, &site_config.markdown_dir);
        }
        Command::Init => {
            let site_config = cli.load_config()?;
            let report = init::init(&site_config)?;
            output::print_init_output(&report);
        }
        Command::Check => {
            let site_config = cli.load_config()?;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_generate_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = generate::check(&site_config, Some(&tx));
            drop(tx);
            printer.join().ok();
            let report = result.map_err(with_init_hint)?;
            output::print_check_output(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Append the `init` hint to missing-directory errors.
fn with_init_hint(err: GenerateError) -> Box<dyn std::error::Error> {
    if err.is_missing_input() {
        format!("{err}\nRun `mdgen init` (or `mdgen --init`) to create a sample site").into()
    } else {
        err.into()
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
