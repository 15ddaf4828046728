// ABOUTME: CLI for the dputils scraper and file helpers.
// ABOUTME: Extracts records or links from a page as JSON and reads or writes files by extension.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dputils_scrape::{FetchPolicy, RepeatQuery, Scraper, Selector, SelectorSet};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dputils")]
#[command(about = "Scrape fields from web pages and read or write files", long_about = None)]
struct Cli {
    /// Log progress at info level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract one record from the whole page.
    Get {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Extract one record per repeated item under a section.
    GetAll {
        #[command(flatten)]
        page: PageArgs,

        /// Section selector as JSON (default: body).
        #[arg(long)]
        target: Option<String>,

        /// Item selector as JSON (default: div).
        #[arg(long)]
        items: Option<String>,

        /// Fail when the section or items are missing instead of printing [].
        #[arg(long)]
        strict: bool,
    },
    /// List distinct links on the page, one per line.
    Links {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Only collect links under this selector (JSON).
        #[arg(long)]
        target: Option<String>,
    },
    /// Print the text content of a file.
    Read {
        path: PathBuf,

        /// Text encoding label.
        #[arg(long, default_value = "utf-8")]
        encoding: String,

        /// Write the raw bytes instead of decoded text.
        #[arg(long)]
        binary: bool,
    },
    /// Write text into a file, choosing the format from its extension.
    Write { path: PathBuf, content: String },
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Page URL (http/https).
    url: String,

    /// Parse this local HTML file instead of fetching; the URL is kept as a label.
    #[arg(long)]
    html: Option<PathBuf>,

    /// Strip the query string before fetching.
    #[arg(long)]
    clean: bool,

    /// Explicit User-Agent header (default: random browser string).
    #[arg(long)]
    user_agent: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Keep going without a document when the fetch fails.
    #[arg(long)]
    lenient: bool,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[command(flatten)]
    fetch: FetchArgs,

    /// JSON file mapping field names to selectors.
    #[arg(long)]
    fields: PathBuf,

    /// Output null for missing fields instead of failing.
    #[arg(long)]
    suppress_errors: bool,

    /// Output compact JSON instead of pretty.
    #[arg(long)]
    compact: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Get { page } => {
            let fields = load_fields(&page.fields)?;
            let scraper = open_page(&page.fetch)?;
            let record = scraper.get_data(&fields, page.suppress_errors)?;
            print_json(&serde_json::to_value(&record)?, page.compact)
        }
        Command::GetAll {
            page,
            target,
            items,
            strict,
        } => {
            let fields = load_fields(&page.fields)?;
            let defaults = RepeatQuery::default();
            let query = RepeatQuery {
                target: parse_selector(target.as_deref())?.unwrap_or(defaults.target),
                items: parse_selector(items.as_deref())?.unwrap_or(defaults.items),
                suppress_errors: page.suppress_errors,
                verbose: cli.verbose,
                strict,
            };
            let scraper = open_page(&page.fetch)?;
            let records = scraper.get_repeating_data(&query, &fields)?;
            print_json(&serde_json::to_value(&records)?, page.compact)
        }
        Command::Links { fetch, target } => {
            let target = parse_selector(target.as_deref())?;
            let scraper = open_page(&fetch)?;
            let mut out = io::stdout().lock();
            for link in scraper.links(target.as_ref())? {
                writeln!(out, "{}", link)?;
            }
            Ok(())
        }
        Command::Read {
            path,
            encoding,
            binary,
        } => {
            if binary {
                let bytes = dputils_files::get_bytes(&path)?;
                io::stdout().lock().write_all(&bytes)?;
            } else {
                let text = dputils_files::get_data_with_encoding(&path, &encoding)?;
                print!("{}", text);
            }
            Ok(())
        }
        Command::Write { path, content } => {
            if !dputils_files::save_data(&path, &content)? {
                bail!("file type could not be understood: {}", path.display());
            }
            print_json(&json!({ "path": path, "saved": true }), true)
        }
    }
}

fn open_page(args: &FetchArgs) -> Result<Scraper> {
    if let Some(html_path) = &args.html {
        let html = fs::read_to_string(html_path)
            .with_context(|| format!("reading {}", html_path.display()))?;
        return Ok(Scraper::from_html(args.url.clone(), &html));
    }

    let mut builder = Scraper::builder()
        .clean(args.clean)
        .timeout(Duration::from_secs(args.timeout_secs));
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    if args.lenient {
        builder = builder.fetch_policy(FetchPolicy::Lenient);
    }
    Ok(builder.build(&args.url)?)
}

fn load_fields(path: &Path) -> Result<SelectorSet> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(SelectorSet::from_json(&json)?)
}

fn parse_selector(json: Option<&str>) -> Result<Option<Selector>> {
    json.map(|s| serde_json::from_str(s).with_context(|| format!("invalid selector {}", s)))
        .transpose()
}

fn print_json(value: &serde_json::Value, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}
