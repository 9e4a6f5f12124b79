//! txtpdf CLI - convert a directory of text files into chunked PDFs

mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use clap::Parser;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rayon::prelude::*;

use txtpdf::{
    ConversionReport, ConvertOptions, FontLocator, Margins, PageConfig, ParagraphStyle,
    ProgressEvent, ProgressSink, TextConverter,
};

#[derive(Parser)]
#[command(name = "txtpdf")]
#[command(version)]
#[command(about = "Convert large text files into chunked PDF documents", long_about = None)]
struct Cli {
    /// Directory containing .txt files
    #[arg(value_name = "INPUT_DIR", default_value = "input_txt")]
    input: PathBuf,

    /// Directory for generated PDFs
    #[arg(value_name = "OUTPUT_DIR", default_value = "output_pdf")]
    output: PathBuf,

    /// TrueType/OpenType font used for all output
    #[arg(long, env = "TXTPDF_FONT", default_value = "./font/Vazirmatn-Regular.ttf")]
    font: PathBuf,

    /// Maximum chunk size in megabytes
    #[arg(long, env = "TXTPDF_MAX_CHUNK_MB", default_value_t = 10)]
    max_chunk_mb: u64,

    /// Concurrent chunk tasks per file
    #[arg(long, env = "TXTPDF_WORKERS", default_value_t = 4)]
    workers: usize,

    /// Files converted concurrently [default: min(4, files)]
    #[arg(short, long, env = "TXTPDF_JOBS")]
    jobs: Option<usize>,

    /// Minimum percentage change between progress updates
    #[arg(long, env = "TXTPDF_PROGRESS_THRESHOLD", default_value_t = 10)]
    progress_threshold: u32,

    /// Minimum seconds between progress updates
    #[arg(long, env = "TXTPDF_PROGRESS_INTERVAL", default_value_t = 2.0)]
    progress_interval: f64,

    /// Page margin in points, applied to all four sides
    #[arg(long, env = "TXTPDF_MARGIN", default_value_t = 36.0)]
    margin: f32,

    /// Paragraph font size in points
    #[arg(long, env = "TXTPDF_FONT_SIZE", default_value_t = 11.0)]
    font_size: f32,

    /// Paragraph line height in points
    #[arg(long, env = "TXTPDF_LEADING", default_value_t = 16.0)]
    leading: f32,

    /// Write all conversion reports to this JSON file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Also log to this file, rotated at 5 MB with 5 backups
    #[arg(long, env = "TXTPDF_LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        ConvertOptions::new()
            .with_max_chunk_mb(self.max_chunk_mb)
            .with_worker_pool_size(self.workers)
            .with_progress(self.progress_threshold, self.progress_interval)
            .with_page(PageConfig::a4().with_margins(Margins::uniform(self.margin)))
            .with_style(ParagraphStyle::new(self.font_size, self.leading))
            .with_font(FontLocator::new(&self.font))
    }
}

/// Drives one progress bar from chunk completion events.
struct BarProgress {
    bar: ProgressBar,
}

impl ProgressSink for BarProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        self.bar.set_length(event.total as u64);
        self.bar.set_position(event.completed as u64);
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_file.as_deref()) {
        eprintln!("{}: cannot open log file: {}", "Error".red().bold(), e);
        process::exit(1);
    }

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.is_dir() {
        return Err(format!("input directory not found: {}", cli.input.display()).into());
    }
    if !cli.font.is_file() {
        return Err(format!("font file not found: {}", cli.font.display()).into());
    }

    let files = discover_inputs(&cli.input)?;
    if files.is_empty() {
        return Err(format!("no .txt files in {}", cli.input.display()).into());
    }
    fs::create_dir_all(&cli.output)?;

    let converter = TextConverter::new(cli.options())?;
    let jobs = cli.jobs.unwrap_or(4).min(files.len()).max(1);
    log::info!("Converting {} file(s) with {} job(s)", files.len(), jobs);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    let bars = MultiProgress::new();
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
        .progress_chars("#>-");

    let outcomes: Mutex<Vec<(PathBuf, Result<ConversionReport, String>)>> = Mutex::new(Vec::new());
    pool.install(|| {
        files.par_iter().for_each(|path| {
            let name = file_label(path);
            let bar = bars.add(ProgressBar::new(0));
            bar.set_style(style.clone());
            bar.set_message(name.clone());

            let sink = BarProgress { bar: bar.clone() };
            let outcome = converter
                .convert_file(path, &cli.output, &sink)
                .map_err(|e| e.to_string());
            match &outcome {
                Ok(report) if report.is_complete() => bar.finish_with_message(format!("{} done", name)),
                Ok(_) => bar.abandon_with_message(format!("{} partial", name)),
                Err(_) => bar.abandon_with_message(format!("{} failed", name)),
            }

            if let Ok(mut all) = outcomes.lock() {
                all.push((path.clone(), outcome));
            }
        });
    });

    let mut outcomes = outcomes.into_inner().map_err(|e| e.to_string())?;
    outcomes.sort_by(|a, b| a.0.cmp(&b.0));
    let failed_chunks = print_summary(&outcomes);

    if let Some(report_path) = &cli.report {
        let reports: Vec<&ConversionReport> =
            outcomes.iter().filter_map(|(_, o)| o.as_ref().ok()).collect();
        fs::write(report_path, serde_json::to_string_pretty(&reports)?)?;
        println!("{} {}", "Report saved to".green(), report_path.display());
    }

    let failed_files = outcomes.iter().filter(|(_, o)| o.is_err()).count();
    if failed_files > 0 || failed_chunks > 0 {
        process::exit(2);
    }
    Ok(())
}

/// `*.txt` files directly inside `dir`, sorted by path.
fn discover_inputs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_txt = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_txt && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Print one line per file and return the number of failed chunks.
fn print_summary(outcomes: &[(PathBuf, Result<ConversionReport, String>)]) -> usize {
    println!("\n{}", "Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let mut failed_chunks = 0;
    for (path, outcome) in outcomes {
        let name = file_label(path);
        match outcome {
            Ok(report) => {
                let ok = report.succeeded().count();
                let failed = report.failed().count();
                failed_chunks += failed;
                let status = if failed == 0 {
                    "ok".green().bold()
                } else {
                    "partial".yellow().bold()
                };
                println!(
                    "  {} {} ({}/{} chunks)",
                    status,
                    name,
                    ok,
                    report.chunk_count
                );
                for result in report.failed() {
                    if let txtpdf::RenderResult::Failure {
                        chunk_index,
                        message,
                        ..
                    } = result
                    {
                        println!("    {} chunk {}: {}", "└─".dimmed(), chunk_index, message);
                    }
                }
            }
            Err(message) => println!("  {} {}: {}", "failed".red().bold(), name, message),
        }
    }
    failed_chunks
}
