use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pageviews_core::calendar::Month;
use pageviews_core::config::{PipelineConfig, DEFAULT_INPUT_PATH};
use pageviews_core::figure::Figure;
use pageviews_core::outliers::FilteredPageViews;
use pageviews_core::pipeline::{self, FilterSummary};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily page view outlier filtering and charts", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// CSV file with a `date` column and one numeric value column
    #[arg(long, global = true, default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,

    /// Directory the PNG files are written to
    #[arg(long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Print the figure handles as JSON after rendering
    #[arg(long, global = true)]
    describe: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Render all three charts (default)
    All,
    /// Render the daily line chart
    Line,
    /// Render the monthly-average bar chart
    Bar,
    /// Render the year-wise and month-wise box plots
    Box,
    /// Print filtering statistics and the monthly means without rendering
    Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.json);

    let config = PipelineConfig::new(cli.global.input.clone(), cli.global.output_dir.clone());

    match cli.command.unwrap_or(Command::All) {
        Command::All => {
            let report = pipeline::run_pipeline(&config)
                .with_context(|| format!("failed to render {}", config.input_path.display()))?;
            log_summary(&report.summary);
            if cli.global.describe {
                print_figures(&[&report.line, &report.bar, &report.boxes])?;
            }
        }
        Command::Line => {
            let filtered = prepare(&config)?;
            let figure = pipeline::run_line(&config, &filtered).context("failed to draw line plot")?;
            if cli.global.describe {
                print_figures(&[&figure])?;
            }
        }
        Command::Bar => {
            let filtered = prepare(&config)?;
            let figure = pipeline::run_bar(&config, &filtered).context("failed to draw bar plot")?;
            if cli.global.describe {
                print_figures(&[&figure])?;
            }
        }
        Command::Box => {
            let filtered = prepare(&config)?;
            let figure = pipeline::run_box(&config, &filtered).context("failed to draw box plot")?;
            if cli.global.describe {
                print_figures(&[&figure])?;
            }
        }
        Command::Summary => {
            let filtered = prepare(&config)?;
            let summary = FilterSummary::from(&filtered);
            println!("rows loaded:  {}", summary.raw_rows);
            println!("rows kept:    {}", summary.kept_rows);
            println!("rows removed: {}", summary.removed_rows);
            println!(
                "kept range:   [{:.1}, {:.1}]",
                summary.bounds.lower, summary.bounds.upper
            );

            let means = pipeline::monthly_view(&filtered).context("failed to aggregate months")?;
            let header: Vec<String> = Month::ALL
                .iter()
                .map(|month| format!("{:>8}", month.abbreviation()))
                .collect();
            println!("\nyear {}", header.join(" "));
            for (year, row) in means.rows() {
                let cells: Vec<String> = row
                    .iter()
                    .map(|cell| match cell {
                        Some(mean) => format!("{mean:>8.0}"),
                        None => format!("{:>8}", "-"),
                    })
                    .collect();
                println!("{year} {}", cells.join(" "));
            }
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn prepare(config: &PipelineConfig) -> Result<FilteredPageViews> {
    let filtered = pipeline::prepare(config)
        .with_context(|| format!("failed to load {}", config.input_path.display()))?;
    log_summary(&FilterSummary::from(&filtered));
    Ok(filtered)
}

fn log_summary(summary: &FilterSummary) {
    info!(
        raw_rows = summary.raw_rows,
        kept_rows = summary.kept_rows,
        removed_rows = summary.removed_rows,
        lower = summary.bounds.lower,
        upper = summary.bounds.upper,
        "page views filtered"
    );
}

fn print_figures(figures: &[&Figure]) -> Result<()> {
    let json = serde_json::to_string_pretty(figures).context("failed to serialize figures")?;
    println!("{json}");
    Ok(())
}
