use crate::domain::metrics::direction::MetricDirection;
use crate::domain::metrics::naming::{collapse_whitespace, lookup_key};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_CATEGORY: &str = "general";

/// Target value for a metric within a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub category: String,
    pub metric_name: String,
    pub target_value: f64,
    #[serde(default)]
    pub direction: MetricDirection,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Benchmark {
    pub fn new(
        category: impl Into<String>,
        metric_name: impl Into<String>,
        target_value: f64,
        direction: MetricDirection,
    ) -> Self {
        Self {
            category: category.into(),
            metric_name: metric_name.into(),
            target_value,
            direction,
            unit: None,
        }
    }
}

/// Read-only benchmark reference data: category -> metric -> benchmark.
///
/// Lookups ignore case and whitespace. Metric aliases are resolved when
/// looking up, on both sides, so they apply to benchmarks inserted before or
/// after the alias was registered.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkTable {
    default_category: String,
    entries: HashMap<String, HashMap<String, Benchmark>>,
    metric_aliases: HashMap<String, String>,
}

impl Default for BenchmarkTable {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY)
    }
}

impl BenchmarkTable {
    pub fn new(default_category: &str) -> Self {
        Self {
            default_category: collapse_whitespace(default_category),
            entries: HashMap::new(),
            metric_aliases: HashMap::new(),
        }
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// Insert or replace a benchmark under its own metric spelling.
    /// Returns the previous entry, if any.
    pub fn insert(&mut self, benchmark: Benchmark) -> Option<Benchmark> {
        let metric_key = lookup_key(&benchmark.metric_name);
        self.entries
            .entry(lookup_key(&benchmark.category))
            .or_default()
            .insert(metric_key, benchmark)
    }

    /// Register `alias` as another spelling of `metric`.
    pub fn add_metric_alias(&mut self, alias: &str, metric: &str) {
        self.metric_aliases
            .insert(lookup_key(alias), lookup_key(metric));
    }

    /// Find the benchmark for a metric; `None` category means the default one.
    ///
    /// An entry stored under the canonical spelling wins over entries stored
    /// under one of its aliases; among aliases the lexically first key wins.
    pub fn lookup(&self, category: Option<&str>, metric: &str) -> Option<&Benchmark> {
        let category_key = lookup_key(category.unwrap_or(&self.default_category));
        let metrics = self.entries.get(&category_key)?;
        let wanted = self.canonical_metric_key(metric);
        metrics.get(&wanted).or_else(|| {
            metrics
                .iter()
                .filter(|(key, _)| self.canonical_metric_key(key) == wanted)
                .min_by(|a, b| a.0.cmp(b.0))
                .map(|(_, benchmark)| benchmark)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Benchmark> {
        self.entries.values().flat_map(HashMap::values)
    }

    fn canonical_metric_key(&self, metric: &str) -> String {
        let key = lookup_key(metric);
        self.metric_aliases.get(&key).cloned().unwrap_or(key)
    }
}
