//! Highlight Changes
//!
//! Runs change localization over a page layout and prints the resulting
//! highlight annotations and summary as JSON.
//!
//! Usage:
//!   cargo run --release --bin highlight_changes -- --layout pages.json --changes changes.json
//!   cargo run --release --bin highlight_changes -- --layout pages.json --changes changes.json --config locator.json
//!
//! `pages.json` is an array of page layouts (`page_number`, `width`, `height`,
//! `lines` with `text` and `bbox`). `changes.json` maps 1-based page numbers
//! to change records.

use change_highlight::annotation::HighlightAnnotation;
use change_highlight::change::load_page_changes_file;
use change_highlight::config::LocatorConfig;
use change_highlight::highlighter::{HighlightSummary, PageHighlighter};
use change_highlight::page::{PageLayout, TextPage};
use serde::Serialize;
use std::path::PathBuf;
use std::process;

struct CliConfig {
    layout: PathBuf,
    changes: PathBuf,
    config: Option<PathBuf>,
    opacity: Option<f32>,
}

impl CliConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut layout = None;
        let mut changes = None;
        let mut config = None;
        let mut opacity = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--layout" => {
                    i += 1;
                    layout = args.get(i).map(PathBuf::from);
                },
                "--changes" => {
                    i += 1;
                    changes = args.get(i).map(PathBuf::from);
                },
                "--config" => {
                    i += 1;
                    config = args.get(i).map(PathBuf::from);
                },
                "--opacity" => {
                    i += 1;
                    let value = args.get(i).ok_or("--opacity needs a value")?;
                    opacity = Some(
                        value
                            .parse::<f32>()
                            .map_err(|e| format!("invalid opacity {:?}: {}", value, e))?,
                    );
                },
                other => return Err(format!("unknown argument {:?}", other)),
            }
            i += 1;
        }

        Ok(Self {
            layout: layout.ok_or("--layout <pages.json> is required")?,
            changes: changes.ok_or("--changes <changes.json> is required")?,
            config,
            opacity,
        })
    }
}

#[derive(Serialize)]
struct PageAnnotations {
    page_number: usize,
    annotations: Vec<HighlightAnnotation>,
}

#[derive(Serialize)]
struct Output {
    processed: usize,
    highlighted: usize,
    skipped: usize,
    summary: HighlightSummary,
    pages: Vec<PageAnnotations>,
}

fn run(cli: CliConfig) -> change_highlight::Result<Output> {
    let config = match &cli.config {
        Some(path) => LocatorConfig::from_json_file(path)?,
        None => LocatorConfig::default(),
    };

    let mut layouts: Vec<PageLayout> = serde_json::from_str(&std::fs::read_to_string(&cli.layout)?)?;
    layouts.sort_by_key(|layout| layout.page_number);
    let mut pages: Vec<TextPage> = layouts.into_iter().map(TextPage::from_layout).collect();
    let changes = load_page_changes_file(&cli.changes)?;
    log::info!(
        "Loaded {} page(s), {} change record(s)",
        pages.len(),
        changes.values().map(Vec::len).sum::<usize>()
    );

    let mut highlighter = PageHighlighter::new(config)?;
    if let Some(opacity) = cli.opacity {
        highlighter = highlighter.with_opacity(opacity);
    }
    let summary = highlighter.process_pages(pages.iter_mut().map(|page| (page.page_number(), page)), &changes);

    let now = chrono::Utc::now();
    let pages = pages
        .iter_mut()
        .filter(|page| !page.annotations().is_empty())
        .map(|page| PageAnnotations {
            page_number: page.page_number(),
            annotations: page
                .take_annotations()
                .into_iter()
                .map(|annotation| annotation.with_creation_date(now))
                .collect(),
        })
        .collect();

    Ok(Output {
        processed: summary.processed(),
        highlighted: summary.highlighted(),
        skipped: summary.skipped(),
        summary,
        pages,
    })
}

fn main() {
    env_logger::init();

    let cli = match CliConfig::from_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: highlight_changes --layout <pages.json> --changes <changes.json> [--config <locator.json>] [--opacity <0..1>]");
            process::exit(2);
        },
    };

    match run(cli).and_then(|output| Ok(serde_json::to_string_pretty(&output)?)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        },
    }
}
