use clap::{Parser, Subcommand};
use linkshelf::types::Warning;
use linkshelf::{assets, config, generate, ingest, output, source, tree};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "linkshelf")]
#[command(about = "Static site generator for link directories kept in a spreadsheet")]
#[command(long_about = "\
Static site generator for link directories kept in a spreadsheet

A published spreadsheet is the data source. One sheet lists links, another
declares categories; every run fetches the workbook and renders the site.

Spreadsheet layout:

  Links sheet (first row is a header)
    title | url | description | category | kind | lang | sender | source | created
    Foo   | https://foo.example | ... | Tech > AI | ...

  Categories sheet (first row is a header)
    category  | title                   | description
    Tech      |                         |
    Tech > AI | Artificial Intelligence | Markdown *allowed*

Output:

  docs/
  ├── index.html        # Home: top-level categories, latest links
  ├── tech/index.html   # One page per category
  ├── tech/ai/*.html    # One page per link
  ├── data.json
  ├── sitemap.xml
  ├── rss.xml
  └── atom.xml

Configuration layers (later wins): stock defaults, linkshelf.toml, .env,
environment variables. Run 'linkshelf gen-config' for a documented config.")]
#[command(version = env!("LINKSHELF_VERSION"))]
struct Cli {
    /// Config file
    #[arg(long, default_value = "linkshelf.toml", global = true)]
    config: PathBuf,

    /// Environment file with KEY=VALUE lines
    #[arg(long, default_value = ".env", global = true)]
    env_file: PathBuf,

    /// Output directory
    #[arg(long, default_value = "docs", global = true)]
    output: PathBuf,

    /// Read a local .xlsx file instead of fetching spreadsheet.url
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the spreadsheet and render the site
    Build,
    /// Fetch and validate the spreadsheet, print the category tree, write nothing
    Check,
    /// Print a stock linkshelf.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::Layer::new().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Check => {
            let config = config::load_config(&cli.config, &cli.env_file, std::env::vars())?;
            println!("==> Reading spreadsheet");
            let (tree, warnings) = load_tree(&config, cli.input.as_deref())?;
            output::print_check_output(&tree, &warnings);
            println!("==> Spreadsheet is valid");
        }
        Command::Build => {
            let config = config::load_config(&cli.config, &cli.env_file, std::env::vars())?;
            println!("==> Reading spreadsheet");
            let (tree, _) = load_tree(&config, cli.input.as_deref())?;

            println!("==> Generating site \u{2192} {}", cli.output.display());
            let build_date = chrono::Local::now().date_naive();
            let asset_report = assets::publish(
                Some(Path::new(&config.assets.dir)),
                &cli.output,
                config.assets.minify_css,
            )?;
            let report = generate::generate(&tree, &config, &cli.output, build_date)?;
            let permalinks = generate::Permalinks::assign(&tree);
            output::print_build_output(&tree, &permalinks, &report, &asset_report);
            println!("==> Build complete: {}", cli.output.display());
        }
    }

    Ok(())
}

/// Fetch (or read) the workbook, normalize it, and build the category tree.
///
/// Returns the ingestion warnings followed by the tree's own, each already
/// logged.
fn load_tree(
    config: &config::SiteConfig,
    input: Option<&Path>,
) -> Result<(tree::CategoryTree, Vec<Warning>), Box<dyn std::error::Error>> {
    let sheet = &config.spreadsheet;
    let bytes = match input {
        Some(path) => source::read_file(path)?,
        None => source::fetch(&sheet.url)?,
    };
    let workbook = source::parse_workbook(bytes, &sheet.links_sheet, &sheet.categories_sheet)?;
    let ingested = ingest::ingest(&workbook, sheet)?;

    let mut warnings = ingested.warnings;
    let tree = tree::build(&ingested.categories, ingested.links, sheet.category_separator);
    warnings.extend(tree.warnings().iter().cloned());

    for warning in &warnings {
        warn!("{warning}");
    }
    info!(
        categories = tree.category_count(),
        links = tree.links().len(),
        warnings = warnings.len(),
        "category tree ready"
    );
    Ok((tree, warnings))
}
