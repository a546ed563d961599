//! `oncall` CLI -- expand recurring appointments and report on-call coverage.
//!
//! ## Usage
//!
//! ```sh
//! # First Monday of every month at 16:00 for an hour, through 2026
//! oncall expand --ordinal first --weekday monday --time 16:00 --duration 60 --from 2026
//!
//! # Coverage gaps for the 30 days starting Jan 1 (assignments JSON on stdin)
//! oncall gaps --start 2026-01-01T00:00:00 < assignments.json
//!
//! # Human-readable summary, failing on malformed assignments
//! oncall gaps -i assignments.json --start 2026-01-01T00:00:00 --strict --summary
//!
//! # Double-booked shifts
//! oncall overlaps -i assignments.json
//!
//! # Who is on call at a given time
//! oncall on-call -i assignments.json --at 2026-01-10T03:00:00
//! ```
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`); `-v` enables debug.

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use oncall_engine::{
    expand, find_gaps, find_overlaps, on_call_at, AssignmentInterval, CoverageReport,
    CoverageWindow, MalformedPolicy, RecurrenceRequest, RecurrenceRule, DEFAULT_WINDOW_DAYS,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "oncall",
    version,
    about = "Recurring appointment expansion and on-call coverage reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a monthly weekday rule into appointment occurrences
    Expand {
        /// Which matching weekday of the month: first, second, third, fourth, last
        #[arg(long)]
        ordinal: String,
        /// Weekday, Monday through Friday
        #[arg(long)]
        weekday: String,
        /// Start time of each appointment (HH:mm)
        #[arg(long)]
        time: String,
        /// Length of each appointment in minutes
        #[arg(long, allow_negative_numbers = true)]
        duration: i64,
        /// First year to expand
        #[arg(long)]
        from: i32,
        /// Last year to expand (defaults to --from)
        #[arg(long)]
        to: Option<i32>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Report uncovered time in an on-call window
    Gaps {
        /// Assignments JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Window start (e.g. 2026-01-01T00:00:00)
        #[arg(long)]
        start: NaiveDateTime,
        /// Window length in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: i64,
        /// Fail on malformed assignments instead of skipping them
        #[arg(long)]
        strict: bool,
        /// Print a human-readable summary instead of JSON
        #[arg(long)]
        summary: bool,
    },
    /// List pairs of overlapping assignments
    Overlaps {
        /// Assignments JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List the assignments active at a given time
    OnCall {
        /// The instant to look up (e.g. 2026-01-10T03:00:00)
        #[arg(long)]
        at: NaiveDateTime,
        /// Assignments JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Expand {
            ordinal,
            weekday,
            time,
            duration,
            from,
            to,
            output,
        } => {
            let request = RecurrenceRequest {
                ordinal,
                weekday,
                time_of_day: time,
                duration_minutes: duration,
                start_year: from,
                end_year: to.unwrap_or(from),
            };
            let rule = RecurrenceRule::try_from(&request).context("Invalid recurrence")?;
            debug!(rule = %rule, "expanding");
            let occurrences = expand(&rule).context("Failed to expand recurrence")?;
            write_output(output.as_deref(), &to_json(&occurrences)?)?;
        }
        Commands::Gaps {
            input,
            output,
            start,
            days,
            strict,
            summary,
        } => {
            let assignments = read_assignments(input.as_deref())?;
            let window = CoverageWindow::rolling(start, days).context("Invalid coverage window")?;
            let policy = if strict {
                MalformedPolicy::Reject
            } else {
                MalformedPolicy::Skip
            };
            let report = find_gaps(&window, &assignments, policy)
                .context("Failed to compute coverage gaps")?;

            let rendered = if summary {
                render_summary(&report)
            } else {
                to_json(&report)?
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Overlaps { input, output } => {
            let assignments = read_assignments(input.as_deref())?;
            let overlaps = find_overlaps(&assignments);
            write_output(output.as_deref(), &to_json(&overlaps)?)?;
        }
        Commands::OnCall { at, input, output } => {
            let assignments = read_assignments(input.as_deref())?;
            let active = on_call_at(&assignments, at);
            write_output(output.as_deref(), &to_json(&active)?)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn render_summary(report: &CoverageReport) -> String {
    let fmt = "%Y-%m-%d %H:%M";
    let mut out = String::new();
    out.push_str(&format!(
        "Window:    {} to {}\n",
        report.window.start.format(fmt),
        report.window.end.format(fmt)
    ));
    out.push_str(&format!("Coverage:  {}\n", report.coverage_display()));
    out.push_str(&format!("Gaps:      {}\n", report.gaps.len()));
    for gap in &report.gaps {
        out.push_str(&format!(
            "  {} -> {}  ({:.1} h)\n",
            gap.start.format(fmt),
            gap.end.format(fmt),
            gap.hours
        ));
    }
    if !report.skipped.is_empty() {
        out.push_str(&format!(
            "Skipped:   {} malformed assignment(s)\n",
            report.skipped.len()
        ));
    }
    out
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    json.push('\n');
    Ok(json)
}

fn read_assignments(path: Option<&str>) -> Result<Vec<AssignmentInterval>> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse assignments JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
