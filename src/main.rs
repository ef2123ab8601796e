use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use doc_renamer::classify_client::ClassifyClient;
use doc_renamer::document_store::{DocumentStore, InputFile, media_type_for};
use doc_renamer::downloads::Downloader;
use doc_renamer::pipeline::{
    Pipeline, PipelineConfig, PipelineEvent, ProcessingOutcome, ProgressSink,
};
use doc_renamer::tui::app::App;
use doc_renamer::tui::events::run_tui;

const DEFAULT_ENDPOINT: &str = "http://localhost:3000";
const DEFAULT_OUTPUT_DIR: &str = "renamed";
const LOG_FILE: &str = "doc-renamer.log";

#[derive(Debug)]
struct CliOptions {
    paths: Vec<PathBuf>,
    endpoint: String,
    output_dir: PathBuf,
    auto_download: bool,
    headless: bool,
}

fn print_usage(program: &str) {
    println!("Document Renamer");
    println!("================");
    println!();
    println!("Usage: {program} [options] <file_or_dir> [more_paths...]");
    println!();
    println!("Options:");
    println!("  --endpoint <url>   Classification service base URL (default {DEFAULT_ENDPOINT})");
    println!("  --output <dir>     Directory for renamed copies (default ./{DEFAULT_OUTPUT_DIR})");
    println!("  --auto-download    Save renamed copies as soon as items complete");
    println!("  --headless         Run once without the TUI and print a summary");
}

fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions {
        paths: Vec::new(),
        endpoint: DEFAULT_ENDPOINT.to_string(),
        output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        auto_download: false,
        headless: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--endpoint" => {
                let value = iter.next().context("--endpoint needs a URL")?;
                options.endpoint = value.clone();
            }
            "--output" => {
                let value = iter.next().context("--output needs a directory")?;
                options.output_dir = PathBuf::from(value);
            }
            "--auto-download" => options.auto_download = true,
            "--headless" => options.headless = true,
            other if other.starts_with("--") => {
                anyhow::bail!("Unknown option: {other}");
            }
            path => options.paths.push(PathBuf::from(path)),
        }
    }

    Ok(options)
}

/// Load candidate files from the given paths. Directories are scanned one
/// level deep. The declared media type is inferred from the extension and
/// may be absent; the store's intake filter has the final word.
fn load_candidates(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    let mut candidates = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.is_file())
                .collect();
            entries.sort();
            for entry in entries {
                if let Some(candidate) = load_one(&entry)? {
                    candidates.push(candidate);
                }
            }
        } else if path.is_file() {
            if let Some(candidate) = load_one(path)? {
                candidates.push(candidate);
            }
        } else {
            anyhow::bail!("Path not found: {}", path.display());
        }
    }

    Ok(candidates)
}

fn load_one(path: &Path) -> Result<Option<InputFile>> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(InputFile::new(name, media_type_for(name), bytes)))
}

fn init_logging() -> Result<()> {
    let log_file = File::create(LOG_FILE).context("Failed to create log file")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("doc_renamer=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Sink that prints one line per item for the headless mode.
struct StdoutReporter;

impl ProgressSink for StdoutReporter {
    fn on_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::ItemStarted { name, .. } => {
                println!("  ... {name}");
            }
            PipelineEvent::ItemSettled { outcome, .. } => match outcome {
                ProcessingOutcome::Completed { new_name } => {
                    println!("  ✓ renamed to {new_name}");
                }
                ProcessingOutcome::Failed { reason } => {
                    println!("  ✗ failed: {reason}");
                }
            },
            PipelineEvent::BatchCompleted {
                current_batch,
                total_batches,
            } => {
                println!("--- Batch {current_batch} of {total_batches} settled ---");
            }
            PipelineEvent::RunFinished { .. } => {}
        }
    }
}

async fn run_headless(store: DocumentStore, mut pipeline: Pipeline) -> Result<()> {
    println!(
        "Processing {} file(s) in {} batch(es)...\n",
        store.len(),
        store.total_batches()
    );

    pipeline.start(&store).await;

    let stats = pipeline.results().stats();
    println!();
    println!("================");
    println!(
        "Summary: {} of {} files renamed, {} failed",
        stats.completed, stats.total, stats.failed
    );

    if pipeline.config().auto_download {
        println!(
            "Renamed copies saved to {}",
            pipeline.downloader().output_dir().display()
        );
    } else if stats.completed > 0 {
        println!("Run with --auto-download to save renamed copies.");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let program = env::args().next().unwrap_or_else(|| "doc-renamer".to_string());

    if args.is_empty() {
        print_usage(&program);
        return Ok(());
    }

    let options = parse_args(&args)?;
    if options.paths.is_empty() {
        print_usage(&program);
        anyhow::bail!("No input files given");
    }

    init_logging()?;

    let candidates = load_candidates(&options.paths)?;
    let candidate_count = candidates.len();

    let mut store = DocumentStore::new();
    let accepted = store.add(candidates);
    if accepted < candidate_count {
        println!(
            "Accepted {accepted} of {candidate_count} candidate file(s); unsupported types were skipped."
        );
    }

    let client = ClassifyClient::new(&options.endpoint);
    let downloader = Downloader::new(&options.output_dir);
    let config = PipelineConfig {
        auto_download: options.auto_download,
    };

    if options.headless {
        let pipeline = Pipeline::with_sink(client, downloader, config, Box::new(StdoutReporter));
        run_headless(store, pipeline).await
    } else {
        let pipeline = Pipeline::new(client, downloader, config);
        let app = App::new(store, pipeline);
        run_tui(app)
            .await
            .map_err(|e| anyhow::anyhow!("TUI error: {e}"))
    }
}
