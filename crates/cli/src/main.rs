use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::Parser;
use marrow_core::{ArticleBody, Document, DomTree, ExtractConfig, Extraction, Extractor};
use owo_colors::OwoColorize;
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the extracted article body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Html,
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: html, text, json", s)),
        }
    }
}

/// Locate the main article body of an HTML document
#[derive(Parser, Debug)]
#[command(name = "marrow")]
#[command(author = "Marrow Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Locate the main article body of an HTML document", long_about = None)]
struct Args {
    /// Local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (html, text, json)
    #[arg(short, long, default_value = "html", value_name = "FORMAT")]
    format: OutputFormat,

    /// Extraction settings as JSON; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Normalized text length that counts as a complete article
    #[arg(long, value_name = "NUM")]
    char_threshold: Option<usize>,

    /// Number of top candidates to track
    #[arg(long, value_name = "NUM")]
    top_candidates: Option<usize>,

    /// Page title used to drop a duplicated headline (default: the document's <title>)
    #[arg(long, value_name = "TITLE")]
    title: Option<String>,

    /// Keep headlines even when they repeat the page title
    #[arg(long, conflicts_with = "title")]
    no_title_check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Print a styled banner for verbose mode
fn print_banner() {
    eprintln!("\n{} {} {}", "Marrow".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Locate the main article body of an HTML document".dimmed());
    eprintln!();
}

/// Print a styled step message
fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Format file size for display
fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Install the log subscriber: `debug` under `--verbose`, otherwise
/// `RUST_LOG` with a `warn` default. Logs go to stderr.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

/// Load the base config from `--config`, then apply command-line overrides.
fn build_config(args: &Args) -> anyhow::Result<ExtractConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw =
                fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("Invalid config file: {}", path.display()))?
        }
        None => ExtractConfig::default(),
    };

    if let Some(threshold) = args.char_threshold {
        config.char_threshold = threshold;
    }
    if let Some(top) = args.top_candidates {
        config.top_candidates = top;
    }

    config.validate().context("Invalid extraction settings")?;
    Ok(config)
}

fn render_json(article: &ArticleBody<'_>, tree: &DomTree<'_>) -> anyhow::Result<String> {
    let attempts: Vec<_> = article
        .attempts
        .iter()
        .map(|attempt| {
            json!({
                "tag": tree.tag_name(attempt.node),
                "text_length": attempt.text_length,
                "flags": attempt.flags.to_string(),
            })
        })
        .collect();

    let report = json!({
        "tag": article.element.tag_name(),
        "id": article.element.attr("id"),
        "class": article.element.attr("class"),
        "text_length": article.text_length,
        "outcome": article.outcome,
        "attempts": attempts,
        "text": article.text(),
    });

    serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let config = build_config(&args)?;

    if args.verbose {
        let source = if args.input == "-" { "stdin".to_string() } else { format!("file {}", args.input) };
        print_step(1, 4, &format!("Reading from {}", source.bright_white()));
    }

    let html = read_input(&args.input)?;

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), format_size(html.len()).bright_white());
        eprintln!();
        print_step(2, 4, "Parsing HTML document");
    }

    let doc = Document::parse(&html).context("Failed to parse HTML")?;
    let tree = DomTree::build(&doc);

    let title = if args.no_title_check { None } else { args.title.clone().or_else(|| doc.title()) };

    if args.verbose {
        if let Some(title) = &title {
            eprintln!("  {} {}", "Title:".dimmed(), title.bright_white());
        }
        eprintln!("  {} {}", "Elements:".dimmed(), tree.len().to_string().bright_white());
        eprintln!();
        print_step(3, 4, "Locating article body");
    }

    let extraction = Extractor::new(&tree, title.as_deref(), &config).run();

    let article = match extraction {
        Extraction::Found(article) => article,
        Extraction::NotFound { reason, attempts } => {
            if args.verbose {
                print_warning(&format!("Gave up after {} passes", attempts.len()));
            }
            bail!("No article body found: {}", reason);
        }
    };

    if args.verbose {
        eprintln!(
            "  {} {}",
            "Element:".dimmed(),
            format!("<{}>", article.element.tag_name()).bright_white()
        );
        eprintln!(
            "  {} {}",
            "Length:".dimmed(),
            article.text_length.to_string().bright_white()
        );
        eprintln!(
            "  {} {}",
            "Outcome:".dimmed(),
            format!("{:?}", article.outcome).bright_white()
        );
        eprintln!();
        print_step(4, 4, "Writing output");
        eprintln!(
            "  {} {}",
            "Format:".dimmed(),
            format!("{:?}", args.format).bright_white()
        );
        eprintln!();
    }

    let output = match args.format {
        OutputFormat::Html => article.outer_html(),
        OutputFormat::Text => article.text(),
        OutputFormat::Json => render_json(&article, &tree)?,
    };

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
