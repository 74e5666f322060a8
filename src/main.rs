// svg-inliner CLI
//
// Reads an HTML document, replaces marked <img> SVG references with
// accessible inline <svg> elements, and writes the transformed document.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use svg_inliner::{InlineOptions, SvgInliner};

#[derive(Parser)]
#[command(name = "svg-inliner")]
#[command(version, about = "Inline marked <img> SVG references as accessible <svg> elements", long_about = None)]
#[command(after_help = "EXAMPLES:
    svg-inliner page.html --base-url https://example.com/ -o page.out.html
    cat page.html | svg-inliner - --base-url https://example.com/")]
struct Cli {
    /// Input HTML file, or - for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Base URL that relative src attributes resolve against
    #[arg(long, value_name = "URL")]
    base_url: String,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// CSS selector matching the image elements to inline
    #[arg(long, value_name = "SELECTOR")]
    selector: Option<String>,

    /// JSON file with full inlining options (--selector wins on conflict)
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Suppress the per-element summary on stderr
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let html = if cli.input == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(&cli.input)
            .with_context(|| format!("Failed to read {}", cli.input))?
    };

    let mut options = match &cli.options {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid options file {}", path.display()))?
        }
        None => InlineOptions::default(),
    };
    if let Some(selector) = cli.selector {
        options = options.with_selector(selector);
    }

    let mut inliner = SvgInliner::new(&cli.base_url, options)?;
    let result = inliner.inline(html).await?;

    if !cli.quiet {
        eprintln!("inlined {} of {} svg image(s)", result.successes, result.total());
        for failure in &result.failures {
            eprintln!("  {}: {} ({})", failure.stage, failure.url, failure.error);
        }
    }

    match cli.output {
        Some(path) => std::fs::write(&path, result.html)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", result.html),
    }

    Ok(())
}
