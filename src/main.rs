use bonkscan_cv::learning::ActiveLearning;
use clap::Parser;
use std::path::PathBuf;

mod review;
mod scan;

#[derive(Parser)]
#[command(name = "bonkscan", about = "Detect inventory items in a game screenshot")]
struct Cli {
    /// Directory holding items.json, weapons.json, ...
    #[arg(long)]
    data: PathBuf,

    /// Icon directory; may be given more than once
    #[arg(long, required = true)]
    icons: Vec<PathBuf>,

    #[arg(long)]
    screenshot: PathBuf,

    /// JSON scan configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file with text-recognition detections to fuse in
    #[arg(long)]
    ocr: Option<PathBuf>,

    /// Write the full scan result as JSON
    #[arg(long)]
    export: Option<PathBuf>,

    /// Review uncertain detections interactively
    #[arg(long)]
    review: bool,
}

fn main() {
    // Structured logging. Use `RUST_LOG=info` etc.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Scan failed: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let outcome = scan::run_scan(&scan::ScanOptions {
        data_dir: &cli.data,
        icon_dirs: &cli.icons,
        screenshot: &cli.screenshot,
        config: cli.config.as_deref(),
        ocr: cli.ocr.as_deref(),
    })?;

    scan::print_detections(&outcome.result.detections);

    if let Some(path) = &cli.export {
        outcome.result.export_json(path)?;
        println!("Results exported: {:?}", path);
    }

    if cli.review {
        let mut learning = ActiveLearning::new(outcome.scanner.config().learning.clone());
        let stdin = std::io::stdin();
        let stats = review::run_review(
            &mut learning,
            &outcome.result.detections,
            outcome.scanner.catalog(),
            Some(&outcome.screenshot),
            stdin.lock(),
            std::io::stdout(),
        )?;
        println!(
            "Reviewed {}, corrections {}, skipped {}",
            stats.total_reviewed, stats.corrections_added, stats.skipped
        );
        let log = learning.drain_verification_log();
        if !log.is_empty() {
            println!("{}", serde_json::to_string_pretty(&log)?);
        }
    }

    Ok(())
}
