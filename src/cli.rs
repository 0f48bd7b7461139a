//! Command-line interface for crumbtrail.

use clap::{Parser, Subcommand};
use colored::*;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

use crate::assemble;
use crate::languages::LanguageRegistry;
use crate::render::GithubRenderer;
use crate::report::{self, MarkdownGenerator};
use crate::scanner::{self, Crumb};
use crate::walk;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Learn, design or document a codebase by putting breadcrumbs in source
/// code.
///
/// Crumbtrail scans source files for `cc:` comment markers, reassembles
/// them into ordered trails and standalone remarks, and generates a
/// Markdown or JSON document out of them.
#[derive(Parser)]
#[command(name = "crumbtrail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a project for breadcrumb comments and generate a document
    Scan(ScanArgs),
    /// Render a generated Markdown file into HTML via the GitHub API
    Render(RenderArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Project directory containing augmented source code
    #[arg(short = 'd', long = "dir")]
    pub dir: PathBuf,

    /// Project prefix on GitHub (for GFM) or just a name
    #[arg(short, long, default_value = "ProjectName")]
    pub project: String,

    /// Entrypoint file that is likely the source of main trails
    #[arg(short, long, default_value = "")]
    pub entry: String,

    /// Include path prefixes
    #[arg(long = "include")]
    pub includes: Vec<String>,

    /// Exclude specific path regexes (e.g. vendor)
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Source prefix for the file paths referenced in the documentation
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// The format of output to produce: markdown or json
    #[arg(short, long, default_value = "markdown")]
    pub format: String,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the render command.
#[derive(Parser)]
pub struct RenderArgs {
    /// Input Markdown file to render
    pub file: PathBuf,

    /// Output format: gfm (GitHub Flavoured) or readme
    #[arg(long, default_value = "readme")]
    pub to: String,

    /// Repository context for gfm mode (e.g. org/repo)
    #[arg(long)]
    pub context: Option<String>,

    /// Output file path (default: input path with .html appended)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// GitHub Client ID for authorization of requests
    #[arg(long)]
    pub client_id: Option<String>,

    /// GitHub Client Secret for authorization of requests
    #[arg(long)]
    pub client_secret: Option<String>,
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    if args.format != "markdown" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'markdown' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }
    if args.entry.is_empty() {
        eprintln!(
            "{} project entrypoint file should be specified with -e or --entry",
            "warning:".yellow().bold()
        );
    }

    let registry = LanguageRegistry::builtin();
    let excludes = walk::compile_excludes(&args.excludes)?;
    let files = walk::collect_source_files(&args.dir, &args.includes, &excludes, &registry)?;

    // Files are scanned in parallel; the collect preserves the sorted walk
    // order, which the promotion rule depends on.
    let crumbs_per_file: Vec<Vec<Crumb>> = files
        .par_iter()
        .filter_map(|file| {
            let lang = registry.lookup(
                file.path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or(""),
            )?;
            let content = match fs::read_to_string(&file.path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!(
                        "{} cannot read {}: {}",
                        "warning:".yellow().bold(),
                        file.rel_path,
                        e
                    );
                    return None;
                }
            };
            match scanner::collect_crumbs(&file.rel_path, lang, &content) {
                Ok(crumbs) => Some(crumbs),
                Err(e) => {
                    eprintln!(
                        "{} skipping {}: {}",
                        "warning:".yellow().bold(),
                        file.rel_path,
                        e
                    );
                    None
                }
            }
        })
        .collect();

    let grouped = assemble::regroup(&args.entry, crumbs_per_file);

    let output = match args.format.as_str() {
        "json" => report::render_json(&grouped)?,
        _ => MarkdownGenerator::new(&args.project, &args.prefix).render_document(&grouped),
    };

    match &args.out {
        Some(path) => fs::write(path, output)?,
        None => println!("{}", output),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the render command.
pub fn run_render(args: &RenderArgs) -> anyhow::Result<i32> {
    if args.to != "gfm" && args.to != "readme" {
        eprintln!("Error: invalid output format {:?}, must be 'gfm' or 'readme'", args.to);
        return Ok(EXIT_ERROR);
    }

    let markdown = fs::read_to_string(&args.file)?;
    let renderer = GithubRenderer::new(args.client_id.clone(), args.client_secret.clone())?;

    let runtime = tokio::runtime::Runtime::new()?;
    let html = runtime.block_on(async {
        match args.to.as_str() {
            "gfm" => renderer.render_gfm(&markdown, args.context.as_deref()).await,
            _ => renderer.render_readme(&markdown).await,
        }
    })?;

    let out = match &args.out {
        Some(path) => path.clone(),
        None => {
            let mut path = args.file.clone().into_os_string();
            path.push(".html");
            PathBuf::from(path)
        }
    };
    fs::write(&out, html)?;
    println!("Rendered {} to {}", args.file.display(), out.display());

    Ok(EXIT_SUCCESS)
}
