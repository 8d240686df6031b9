//! Command-line and environment configuration shared by the binaries

use anyhow::{ensure, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::inventory::AbcPolicy;
use crate::models::parse_date;

pub const DEFAULT_DATA_PATH: &str = "data/supply_chain_data.csv";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

fn parse_as_of(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("unrecognized date '{}'", value))
}

#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// Shipment CSV to analyze
    #[arg(long, env = "SUPPLY_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Reference date for on-track/overdue classification (default: today)
    #[arg(long, env = "SUPPLY_AS_OF", value_parser = parse_as_of)]
    pub as_of: Option<NaiveDate>,

    /// Cumulative value share (%) closing class A
    #[arg(long, default_value_t = 80.0)]
    pub abc_a_cutoff: f64,

    /// Cumulative value share (%) closing class B
    #[arg(long, default_value_t = 95.0)]
    pub abc_b_cutoff: f64,
}

impl DataArgs {
    pub fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn abc_policy(&self) -> Result<AbcPolicy> {
        ensure!(
            self.abc_a_cutoff > 0.0
                && self.abc_a_cutoff <= self.abc_b_cutoff
                && self.abc_b_cutoff <= 100.0,
            "ABC cutoffs must satisfy 0 < A <= B <= 100 (got {} / {})",
            self.abc_a_cutoff,
            self.abc_b_cutoff
        );
        Ok(AbcPolicy {
            a_cutoff: self.abc_a_cutoff,
            b_cutoff: self.abc_b_cutoff,
        })
    }
}

#[derive(Debug, Clone, Args)]
pub struct InsightArgs {
    /// OpenAI-compatible chat-completions URL; insights are disabled when unset
    #[arg(long = "insight-endpoint", env = "INSIGHT_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long = "insight-api-key", env = "INSIGHT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long = "insight-model", env = "INSIGHT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long = "insight-timeout-secs", env = "INSIGHT_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

/// Settings for the text-generation client
#[derive(Debug, Clone, PartialEq)]
pub struct InsightConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl InsightConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl InsightArgs {
    /// `None` when no endpoint is configured
    pub fn to_config(&self) -> Option<InsightConfig> {
        let endpoint = self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        Some(InsightConfig {
            endpoint: endpoint.to_string(),
            api_key: self.api_key.clone().filter(|k| !k.is_empty()),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        insight: InsightArgs,
    }

    #[test]
    fn flags_build_configs() {
        let cli = TestCli::parse_from([
            "test",
            "--data-path",
            "orders.csv",
            "--as-of",
            "03/15/2024",
            "--insight-endpoint",
            "http://localhost:9000/v1/chat/completions",
            "--insight-timeout-secs",
            "2",
        ]);
        assert_eq!(cli.data.data_path, PathBuf::from("orders.csv"));
        assert_eq!(cli.data.as_of(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(cli.data.abc_policy().unwrap(), AbcPolicy::default());

        let config = cli.insight.to_config().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn blank_endpoint_disables_insights() {
        let args = InsightArgs {
            endpoint: Some("  ".into()),
            api_key: None,
            model: DEFAULT_MODEL.into(),
            timeout_secs: 8,
        };
        assert!(args.to_config().is_none());
    }

    #[test]
    fn inverted_cutoffs_are_rejected() {
        let args = DataArgs {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            as_of: None,
            abc_a_cutoff: 90.0,
            abc_b_cutoff: 70.0,
        };
        assert!(args.abc_policy().is_err());
    }
}
