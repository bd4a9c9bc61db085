//! Command implementations for the bloomwatch CLI.
//!
//! Provides subcommands for browsing the region catalogue, fetching a raw
//! vegetation-index series, running the full region analysis, and asking for
//! a region's weather outlook.

use bw_core::http::{ClientConfig, HttpClient, DEFAULT_BASE_URL};
use bw_core::selection::Selection;
use bw_pipeline::config::PipelineConfig;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub mod analyze;
pub mod contents;
pub mod series;
pub mod weather;

/// Where the analytics service lives and how long to wait for it.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Base URL of the analytics service
    #[arg(long, env = "BLOOMWATCH_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Time budget of each remote call, in seconds
    #[arg(long, env = "BLOOMWATCH_TIMEOUT_SECS", default_value_t = 60, global = true)]
    pub timeout_secs: u64,
}

impl ConnectionArgs {
    pub fn client(&self) -> anyhow::Result<HttpClient> {
        let config = ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
        };
        Ok(HttpClient::new(&config)?)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default().with_stage_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    #[arg(long)]
    pub country: String,

    #[arg(long)]
    pub county: String,

    #[arg(long)]
    pub region: String,

    /// Year token, used verbatim in the series path
    #[arg(long)]
    pub year: String,
}

impl From<SelectionArgs> for Selection {
    fn from(args: SelectionArgs) -> Self {
        Selection {
            country: args.country,
            county: args.county,
            region: args.region,
            year: args.year,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the countries, counties and regions the service has data for
    Contents,

    /// Fetch a raw series and print it normalized for charting
    Series {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Print raw values instead of the 1-100 display range
        #[arg(long)]
        raw: bool,
    },

    /// Run the full region analysis and print the snapshot as JSON
    Analyze {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Also write the snapshot JSON to this path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Print the current weather and outlook for a region
    Weather {
        #[arg(long)]
        region: String,

        /// Reference day, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub async fn run(connection: ConnectionArgs, command: Command) -> anyhow::Result<()> {
    let client = connection.client()?;
    match command {
        Command::Contents => contents::run_contents(&client).await,
        Command::Series { selection, raw } => {
            series::run_series(&client, &selection.into(), raw).await
        }
        Command::Analyze { selection, output } => {
            analyze::run_analyze(
                client,
                connection.pipeline_config(),
                &selection.into(),
                output.as_deref(),
            )
            .await
        }
        Command::Weather { region, date } => weather::run_weather(&client, &region, date).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        connection: ConnectionArgs,
        #[command(subcommand)]
        command: Command,
    }

    #[test]
    fn test_parse_analyze() {
        let cli = TestCli::parse_from([
            "bw-cli",
            "analyze",
            "--country",
            "India",
            "--county",
            "Kerala",
            "--region",
            "Munnar",
            "--year",
            "2024",
            "--timeout-secs",
            "5",
        ]);
        assert_eq!(cli.connection.timeout_secs, 5);
        match cli.command {
            Command::Analyze { selection, output } => {
                let selection: Selection = selection.into();
                assert_eq!(selection.series_path(), "2024/India/Kerala/Munnar");
                assert!(output.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_weather_date() {
        let cli = TestCli::parse_from(["bw-cli", "weather", "--region", "Munnar", "--date", "2025-10-04"]);
        match cli.command {
            Command::Weather { region, date } => {
                assert_eq!(region, "Munnar");
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 10, 4));
            }
            _ => panic!("expected weather"),
        }
    }

    #[test]
    fn test_pipeline_config_uses_timeout() {
        let connection = ConnectionArgs {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 7,
        };
        assert_eq!(
            connection.pipeline_config().stage_timeout,
            Duration::from_secs(7)
        );
    }
}
