//! Application configuration.
//!
//! Built-in baseline tables, optionally extended by a TOML file named in
//! `TEAMBENCH_CONFIG`, then overridden by individual environment variables:
//!
//! - `TEAMBENCH_CONFIG` - path to a TOML file (optional)
//! - `TEAMBENCH_REJECTION_POLICY` - `reject-row` (default) or `abort-all`
//! - `TEAMBENCH_AGGREGATION` - `latest` (default), `mean`, `median`, `sum`, `min`, `max`
//! - `TEAMBENCH_DEFAULT_CATEGORY` - benchmark category for uncategorized records

use crate::domain::config::{
    AggregationPolicy, ComparisonConfig, NormalizationConfig, RejectionPolicy,
};
use crate::domain::ingestion::alias::{CanonicalRole, SynonymTable};
use crate::domain::metrics::benchmark::{Benchmark, BenchmarkTable, DEFAULT_CATEGORY};
use crate::domain::metrics::direction::{DirectionTable, MetricDirection};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// On-disk configuration; every section is optional.
///
/// ```toml
/// rejection_policy = "abort-all"
/// aggregation = "mean"
/// default_category = "delivery"
/// date_formats = ["%d/%m/%Y"]
///
/// [synonyms]
/// team = ["crew"]
///
/// [directions]
/// "Lead Time" = "lower_is_better"
///
/// [metric_aliases]
/// "Throughput" = "Velocity"
///
/// [[benchmarks]]
/// category = "delivery"
/// metric_name = "Velocity"
/// target_value = 20.0
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub rejection_policy: Option<String>,
    pub aggregation: Option<String>,
    pub default_category: Option<String>,
    /// Replaces the built-in format list when present.
    pub date_formats: Option<Vec<String>>,
    /// Role name -> extra accepted spellings.
    pub synonyms: BTreeMap<String, Vec<String>>,
    /// Metric -> direction.
    pub directions: BTreeMap<String, String>,
    /// Alias -> canonical metric name for benchmark lookups.
    pub metric_aliases: BTreeMap<String, String>,
    pub benchmarks: Vec<Benchmark>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).context(format!("Failed to parse config TOML: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub normalization: NormalizationConfig,
    pub comparison: ComparisonConfig,
    pub synonyms: SynonymTable,
    pub benchmarks: BenchmarkTable,
    pub config_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            normalization: NormalizationConfig::default(),
            comparison: ComparisonConfig::default(),
            synonyms: SynonymTable::baseline(),
            benchmarks: BenchmarkTable::default(),
            config_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_path(None)
    }

    /// Like `from_env`, with `config_path` taking precedence over `TEAMBENCH_CONFIG`.
    pub fn from_env_with_path(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.or_else(|| {
            env::var("TEAMBENCH_CONFIG")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
        });
        let mut file = match &config_path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        if let Ok(policy) = env::var("TEAMBENCH_REJECTION_POLICY") {
            file.rejection_policy = Some(policy);
        }
        if let Ok(aggregation) = env::var("TEAMBENCH_AGGREGATION") {
            file.aggregation = Some(aggregation);
        }
        if let Ok(category) = env::var("TEAMBENCH_DEFAULT_CATEGORY") {
            file.default_category = Some(category);
        }

        let mut config = Self::from_file(file)?;
        config.config_path = config_path;
        Ok(config)
    }

    /// Build validated domain configuration from file values layered over the baselines.
    pub fn from_file(file: ConfigFile) -> Result<Self> {
        let policy = match &file.rejection_policy {
            Some(policy) => RejectionPolicy::from_str(policy)?,
            None => RejectionPolicy::default(),
        };
        let normalization = match file.date_formats {
            Some(formats) => NormalizationConfig::new(policy, formats)
                .context("Invalid date_formats in configuration")?,
            None => NormalizationConfig::default().with_policy(policy),
        };

        let aggregation = match &file.aggregation {
            Some(aggregation) => AggregationPolicy::from_str(aggregation)?,
            None => AggregationPolicy::default(),
        };
        let mut directions = DirectionTable::baseline();
        for (metric, direction) in &file.directions {
            let direction = MetricDirection::from_str(direction)
                .context(format!("Invalid direction for metric '{}'", metric))?;
            directions.set(metric, direction);
        }

        let mut synonyms = SynonymTable::baseline();
        for (role, spellings) in &file.synonyms {
            let role = CanonicalRole::from_str(role).context("Invalid [synonyms] section")?;
            for spelling in spellings {
                synonyms.add(role, spelling);
            }
        }

        let default_category = file
            .default_category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        let mut benchmarks = BenchmarkTable::new(default_category);
        // Aliases first: inserts resolve metric names through them
        for (alias, metric) in &file.metric_aliases {
            benchmarks.add_metric_alias(alias, metric);
        }
        for benchmark in file.benchmarks {
            if !benchmark.target_value.is_finite() {
                anyhow::bail!(
                    "Benchmark target for {}/{} must be finite",
                    benchmark.category,
                    benchmark.metric_name
                );
            }
            benchmarks.insert(benchmark);
        }

        Ok(Self {
            normalization,
            comparison: ComparisonConfig::new(aggregation, directions),
            synonyms,
            benchmarks,
            config_path: None,
        })
    }
}
