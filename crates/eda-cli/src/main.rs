//! CLI entry point for the EDA tool.

use clap::{Args, Parser, Subcommand};
use eda_cli::commands::{self, HeadPreview, ReportOutcome};
use eda_cli::utils::{format_number, format_percent, truncate_str};
use eda_cli::{DatasetSummary, EdaError, EdaResult, LoadOptions, QualityConfig, ReportConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Exploratory data analysis for delimited text files",
    long_about = "Loads a CSV-like file and prints a preview, an overview, or writes a full \
                  EDA report (tables, quality flags, charts, Markdown).\n\n\
                  EXAMPLES:\n  \
                  # First rows\n  \
                  eda-cli head data.csv -n 10\n\n  \
                  # Per-column overview as JSON\n  \
                  eda-cli overview data.csv --json\n\n  \
                  # Full report with a semicolon separator\n  \
                  eda-cli report data.csv --sep ';' --out-dir reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the first rows of the file
    Head {
        #[command(flatten)]
        input: InputArgs,

        /// Number of rows (clamped to the row count)
        #[arg(short, long, default_value_t = 5)]
        n: usize,
    },

    /// Print row/column counts and a per-column summary
    Overview {
        #[command(flatten)]
        input: InputArgs,

        /// Output the summary as JSON (disables logging)
        #[arg(long)]
        json: bool,
    },

    /// Write the full report into a directory
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Path to the delimited text file
    path: PathBuf,

    /// Field separator (single character, `\t` for tab)
    #[arg(long, default_value = ",")]
    sep: String,

    /// Text encoding (e.g. utf-8, windows-1251, latin1)
    #[arg(long, default_value = "utf-8")]
    encoding: String,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Maximum number of histograms
    #[arg(long, default_value_t = 6)]
    max_hist_columns: usize,

    /// Values kept per categorical column
    #[arg(long, default_value_t = 5)]
    top_k_categories: usize,

    /// Maximum number of categorical columns profiled
    #[arg(long, default_value_t = 20)]
    max_category_columns: usize,

    /// Report title
    #[arg(long, default_value = "EDA report")]
    title: String,

    /// Missing share (0.0 - 1.0) from which a column is listed as problematic
    #[arg(long, default_value_t = 0.1)]
    min_missing_share: f64,

    /// JSON file with quality thresholds (missing fields keep defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override: minimum row count
    #[arg(long)]
    min_rows: Option<usize>,

    /// Override: maximum column count
    #[arg(long)]
    max_columns: Option<usize>,

    /// Override: missing share above which the table is flagged
    #[arg(long)]
    max_missing_share: Option<f64>,

    /// Override: share of zeros at which a numeric column is flagged
    #[arg(long)]
    zero_share_threshold: Option<f64>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let json_output = matches!(cli.command, Command::Overview { json: true, .. });
    init_logging(&cli.log_level, cli.quiet, json_output);

    let (path, result) = match &cli.command {
        Command::Head { input, n } => (&input.path, run_head(input, *n)),
        Command::Overview { input, json } => (&input.path, run_overview(input, *json)),
        Command::Report(args) => (&args.input.path, run_report(args)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(path, &e, json_output),
    }
}

fn report_failure(path: &Path, err: &EdaError, json_output: bool) -> ExitCode {
    if json_output {
        match serde_json::to_string_pretty(err) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("{err}"),
        }
    }

    if err.is_bad_parameter() {
        if !json_output {
            eprintln!("Error: Invalid value for '{}': {}", path.display(), err);
        }
        ExitCode::from(2)
    } else {
        if !json_output {
            error!("{}", err);
            eprintln!("Error: {err}");
        }
        ExitCode::from(1)
    }
}

fn load_options(input: &InputArgs) -> EdaResult<LoadOptions> {
    LoadOptions::from_cli(&input.sep, &input.encoding)
}

// ============================================================================
// head
// ============================================================================

fn run_head(input: &InputArgs, n: usize) -> EdaResult<()> {
    let preview = commands::head(&input.path, &load_options(input)?, n)?;
    print_head(&preview);
    Ok(())
}

/// Note: this uses `println!` for user-facing output, independent of log level.
fn print_head(preview: &HeadPreview) {
    print!("{}", format_head(preview));
}

fn format_head(preview: &HeadPreview) -> String {
    let mut out = String::new();
    if preview.clamped {
        out.push_str(&format!(
            "Requested {} rows, file has {}; showing {}.\n",
            preview.requested, preview.total_rows, preview.shown
        ));
    }
    out.push_str(&format!(
        "First {} of {} rows:\n\n",
        preview.shown, preview.total_rows
    ));

    let cells: Vec<Vec<String>> = preview
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|c| truncate_str(c.as_deref().unwrap_or("NA"), 20))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = preview
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(truncate_str(name, 20).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = preview
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:<w$}", truncate_str(name, 20), w = *w))
        .collect();
    let header = header.join("  ");
    out.push_str(&format!("{header}\n{}\n", "-".repeat(header.chars().count())));

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
            .collect();
        out.push_str(&format!("{}\n", line.join("  ")));
    }

    out.push_str(&format!("\n  Total rows: {}\n", preview.total_rows));
    out.push_str(&format!("  Total columns: {}\n", preview.columns.len()));
    out.push_str(&format!("  Columns: {}\n", preview.columns.join(", ")));
    out
}

// ============================================================================
// overview
// ============================================================================

fn run_overview(input: &InputArgs, json: bool) -> EdaResult<()> {
    let summary = commands::overview(&input.path, &load_options(input)?)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_overview(&summary);
    }
    Ok(())
}

fn print_overview(summary: &DatasetSummary) {
    println!("\n{}", "=".repeat(80));
    println!("DATASET OVERVIEW");
    println!("{}", "=".repeat(80));
    println!("  Rows: {}", summary.n_rows);
    println!("  Columns: {}", summary.n_cols);
    println!();

    println!(
        "{:<20} {:<12} {:<10} {:<10} {:<8} {:<18}",
        "Column", "Kind", "Missing", "Missing %", "Unique", "Mean / Top value"
    );
    println!("{}", "-".repeat(80));

    for c in &summary.columns {
        let detail = match (&c.numeric, &c.most_frequent) {
            (Some(stats), _) => format_number(stats.mean),
            (None, Some(top)) => top.clone(),
            (None, None) => String::new(),
        };
        println!(
            "{:<20} {:<12} {:<10} {:<10} {:<8} {:<18}",
            truncate_str(&c.name, 19),
            c.kind,
            c.missing,
            format_percent(c.missing_share, 1),
            c.unique,
            truncate_str(&detail, 18)
        );
    }
    println!("{}", "=".repeat(80));
}

// ============================================================================
// report
// ============================================================================

fn run_report(args: &ReportArgs) -> EdaResult<()> {
    let options = load_options(&args.input)?;
    let config = report_config(args)?;
    let outcome = commands::report(&args.input.path, &options, &config)?;
    print_report(&outcome);
    Ok(())
}

fn report_config(args: &ReportArgs) -> EdaResult<ReportConfig> {
    let base = match &args.config {
        Some(path) => QualityConfig::from_json_file(path)?,
        None => QualityConfig::default(),
    };

    let mut builder = QualityConfig::builder().base(base);
    if let Some(rows) = args.min_rows {
        builder = builder.min_rows(rows);
    }
    if let Some(columns) = args.max_columns {
        builder = builder.max_columns(columns);
    }
    if let Some(share) = args.max_missing_share {
        builder = builder.max_missing_share(share);
    }
    if let Some(share) = args.zero_share_threshold {
        builder = builder.zero_share_threshold(share);
    }
    let quality = builder.build()?;

    Ok(ReportConfig::default()
        .with_out_dir(&args.out_dir)
        .with_title(&args.title)
        .with_max_hist_columns(args.max_hist_columns)
        .with_top_k_categories(args.top_k_categories)
        .with_max_category_columns(args.max_category_columns)
        .with_min_missing_share(args.min_missing_share)
        .with_quality(quality))
}

fn print_report(outcome: &ReportOutcome) {
    println!("\n{}", "=".repeat(80));
    println!("REPORT WRITTEN");
    println!("{}", "=".repeat(80));
    println!("  Directory: {}", outcome.out_dir.display());
    println!("  Markdown:  {}", outcome.markdown.display());
    println!("  Tables:    {}", outcome.tables.join(", "));
    if !outcome.charts.is_empty() {
        println!("  Charts:    {}", outcome.charts.join(", "));
    }
    println!();

    println!("  Quality score: {:.2}", outcome.flags.quality_score);
    let triggered = outcome.flags.triggered();
    if triggered.is_empty() {
        println!("  No quality flags raised.");
    } else {
        for flag in triggered {
            println!("  - {flag}");
        }
    }

    if !outcome.problematic_columns.is_empty() {
        println!(
            "  Problematic columns (missing): {}",
            outcome.problematic_columns.join(", ")
        );
    }
    println!("{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(requested: usize, total_rows: usize) -> HeadPreview {
        let rows: Vec<Vec<Option<String>>> = (0..requested.min(total_rows))
            .map(|i| vec![Some(i.to_string()), None])
            .collect();
        HeadPreview {
            requested,
            shown: rows.len(),
            total_rows,
            clamped: requested > total_rows,
            columns: vec!["id".to_string(), "city".to_string()],
            rows,
        }
    }

    #[test]
    fn test_head_always_shows_totals() {
        let out = format_head(&preview(2, 4));

        assert!(out.starts_with("First 2 of 4 rows:"));
        assert!(!out.contains("Requested"));
        assert!(out.contains("  Total rows: 4\n"));
        assert!(out.contains("  Total columns: 2\n"));
        assert!(out.contains("  Columns: id, city\n"));
        assert!(out.contains("0   NA"));
    }

    #[test]
    fn test_head_clamp_notice() {
        let out = format_head(&preview(10, 3));

        assert!(out.starts_with("Requested 10 rows, file has 3; showing 3."));
        assert!(out.contains("First 3 of 3 rows:"));
    }
}
