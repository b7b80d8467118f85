use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use mood_trend::config::{AnalysisConfig, ComputeOn, ConfigOverrides};
use mood_trend::models::{MoodBand, MoodEntry};
use mood_trend::pipeline::{self, DateRange};
use mood_trend::{export, logging, report, source};

#[derive(Parser)]
#[command(name = "mood-trend")]
#[command(about = "Mood score trends, anomalies and weekly summaries", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// CSV or JSON file of entries; mock data is generated when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    /// Days of mock data to generate
    #[arg(long, default_value_t = source::DEFAULT_DAYS)]
    days: u32,
    /// Seed for mock data
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated fetch latency for mock data, in milliseconds
    #[arg(long, default_value_t = source::DEFAULT_LATENCY.as_millis() as u64)]
    latency_ms: u64,
}

#[derive(Args)]
struct AnalysisArgs {
    /// JSON file with analysis settings
    #[arg(long, env = "MOOD_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "MOOD_WINDOW")]
    window: Option<usize>,
    #[arg(long, env = "MOOD_Z_THRESH")]
    z_thresh: Option<f64>,
    #[arg(long, env = "MOOD_WEEKS")]
    weeks: Option<usize>,
    #[arg(long, env = "MOOD_STREAK_THRESHOLD")]
    streak_threshold: Option<f64>,
    #[arg(long, value_enum, env = "MOOD_COMPUTE_ON")]
    compute_on: Option<ComputeOn>,
    /// First date to include (yyyy-mm-dd)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last date to include (yyyy-mm-dd)
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl AnalysisArgs {
    fn resolve(&self) -> anyhow::Result<(AnalysisConfig, DateRange)> {
        let overrides = ConfigOverrides {
            window: self.window,
            z_thresh: self.z_thresh,
            weeks: self.weeks,
            streak_threshold: self.streak_threshold,
            compute_on: self.compute_on,
        };
        let config = AnalysisConfig::resolve(self.config.as_deref(), &overrides)?;
        Ok((config, DateRange::new(self.from, self.to)))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a mock history to CSV
    Generate {
        #[arg(long, default_value_t = source::DEFAULT_DAYS)]
        days: u32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "entries.csv")]
        out: PathBuf,
    },
    /// Print the trend summary
    Analyze {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        analysis: AnalysisArgs,
        /// Print the full summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        analysis: AnalysisArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export processed points to a timestamped CSV
    Export {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        analysis: AnalysisArgs,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long, default_value = "mood-export")]
        prefix: String,
    },
}

fn seed_or_now(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    })
}

async fn acquire(args: &SourceArgs) -> anyhow::Result<Vec<MoodEntry>> {
    match &args.input {
        Some(path) => source::load_entries(path),
        None => {
            let seed = seed_or_now(args.seed);
            info!(days = args.days, seed, "using mock entries");
            let latency = Duration::from_millis(args.latency_ms);
            Ok(source::fetch_mock_entries(args.days, latency, seed).await)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Generate { days, seed, out } => {
            let today = Utc::now().date_naive();
            let entries = source::generate_entries(days, today, seed_or_now(seed));
            source::write_csv(&out, &entries)?;
            println!("Wrote {} entries to {}.", entries.len(), out.display());
        }
        Commands::Analyze {
            source: source_args,
            analysis,
            json,
        } => {
            let (config, range) = analysis.resolve()?;
            let entries = acquire(&source_args).await?;
            let summary = pipeline::summarize(&entries, &config, &range);

            if json {
                let rendered =
                    serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
                println!("{rendered}");
                return Ok(());
            }

            if summary.points.is_empty() {
                println!("No entries found for this window.");
                return Ok(());
            }

            println!("Weekly averages:");
            for bucket in summary.weekly.iter() {
                println!(
                    "- {} {:.2} ({})",
                    bucket.week_end,
                    bucket.avg,
                    MoodBand::from_score(bucket.avg).label()
                );
            }
            match summary.trend_delta {
                Some(delta) => println!("Trend: {delta:+.2}"),
                None => println!("Trend: not enough data"),
            }
            println!(
                "Anomalies: {} of {} points",
                summary.anomaly_count,
                summary.points.len()
            );
            println!("Streaks at or above {}:", config.streak_threshold);
            for streak in summary.streaks.iter() {
                println!("- {} to {} ({} days)", streak.start, streak.end, streak.length);
            }
        }
        Commands::Report {
            source: source_args,
            analysis,
            out,
        } => {
            let (config, range) = analysis.resolve()?;
            let entries = acquire(&source_args).await?;
            let summary = pipeline::summarize(&entries, &config, &range);
            let report = report::build_report(&entries, &range, &summary);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            source: source_args,
            analysis,
            out_dir,
            prefix,
        } => {
            let (config, range) = analysis.resolve()?;
            let entries = acquire(&source_args).await?;
            let points = pipeline::process_entries(&entries, &config, &range);
            let sources = range.filter_entries(&entries);
            let rows = export::export_rows(&points, &sources);
            let path = export::export_to_dir(&out_dir, &prefix, &rows, Utc::now())?;
            println!("Exported {} rows to {}.", rows.len(), path.display());
        }
    }

    Ok(())
}
