//! Command-line argument definitions.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use cstat_core::WindowSelection;

/// Contact sensor log analyzer.
///
/// Reads timestamped open/closed export files from door and window sensors
/// and derives per-day usage statistics and plottable state series.
#[derive(Debug, Parser)]
#[command(name = "cstat", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute per-device statistics, plus the overall mean across devices.
    Report {
        /// Device export files, one per device.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Time window to restrict the analysis to.
        #[arg(long, value_enum, default_value_t = WindowArg::All)]
        window: WindowArg,

        /// Start date for `--window custom`.
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End date for `--window custom`.
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Emit JSON instead of the human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Emit window-aligned series points for external plotting.
    Series {
        /// Device export files, one per device.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Time window to restrict the series to.
        #[arg(long, value_enum, default_value_t = WindowArg::All)]
        window: WindowArg,

        /// Start date for `--window custom`.
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End date for `--window custom`.
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Emit a single document holding every device's series.
        #[arg(long)]
        combined: bool,
    },
}

/// Recognized time-window options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WindowArg {
    All,
    Today,
    LastWeek,
    LastMonth,
    LastYear,
    Custom,
}

impl WindowArg {
    /// Pairs the flag with its custom dates, if any.
    pub fn to_selection(
        self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<WindowSelection> {
        match self {
            Self::All => Ok(WindowSelection::All),
            Self::Today => Ok(WindowSelection::Today),
            Self::LastWeek => Ok(WindowSelection::LastWeek),
            Self::LastMonth => Ok(WindowSelection::LastMonth),
            Self::LastYear => Ok(WindowSelection::LastYear),
            Self::Custom => match (from, to) {
                (Some(from), Some(to)) => Ok(WindowSelection::Custom { from, to }),
                _ => anyhow::bail!("--window custom requires both --from and --to"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_window_requires_both_dates() {
        let from: NaiveDate = "2024-03-01".parse().unwrap();
        assert!(WindowArg::Custom.to_selection(Some(from), None).is_err());
        assert!(WindowArg::Custom.to_selection(None, None).is_err());
    }

    #[test]
    fn custom_window_builds_selection() {
        let from: NaiveDate = "2024-03-01".parse().unwrap();
        let to: NaiveDate = "2024-03-07".parse().unwrap();
        assert_eq!(
            WindowArg::Custom.to_selection(Some(from), Some(to)).unwrap(),
            WindowSelection::Custom { from, to }
        );
    }

    #[test]
    fn non_custom_windows_ignore_dates() {
        assert_eq!(
            WindowArg::All.to_selection(None, None).unwrap(),
            WindowSelection::All
        );
        assert_eq!(
            WindowArg::LastWeek.to_selection(None, None).unwrap(),
            WindowSelection::LastWeek
        );
    }

    #[test]
    fn cli_parses_report_invocation() {
        let cli = Cli::try_parse_from([
            "cstat",
            "report",
            "front-door.csv",
            "--window",
            "last-week",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Report {
                files,
                window,
                json,
                ..
            } => {
                assert_eq!(files.len(), 1);
                assert_eq!(window, WindowArg::LastWeek);
                assert!(json);
            }
            Commands::Series { .. } => panic!("expected report command"),
        }
    }

    #[test]
    fn report_requires_at_least_one_file() {
        assert!(Cli::try_parse_from(["cstat", "report"]).is_err());
    }
}
