use crate::domain::comparison::engine::{ComparisonEngine, distinct};
use crate::domain::metrics::record::MetricRecord;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};
use std::str::FromStr;

/// Descriptive statistics of one team's values for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` below two values.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl DescriptiveStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        // statrs works on f64 slices; mean/std_dev return None on empty data
        let data = Data::new(values.to_vec());
        let mean = data.mean()?;
        let std_dev = if values.len() >= 2 { data.std_dev() } else { None };

        Some(Self {
            count: values.len(),
            mean,
            median: percentile(values, 50.0)?,
            std_dev,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMetricStats {
    pub team: String,
    pub metric: String,
    pub stats: DescriptiveStats,
}

/// Outlier detection rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutlierMethod {
    /// Outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
    #[default]
    Iqr,
    /// `|z| > 3` using the sample standard deviation.
    ZScore,
}

impl FromStr for OutlierMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "iqr" => Ok(OutlierMethod::Iqr),
            "zscore" | "z-score" | "z" => Ok(OutlierMethod::ZScore),
            _ => anyhow::bail!("Invalid outlier method: {}. Must be 'iqr' or 'zscore'", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedRecord {
    pub record: MetricRecord,
    pub is_outlier: bool,
}

/// Percentile with linear interpolation between closest ranks (`p` in 0..=100).
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// One flag per input value, in input order.
pub fn detect_outliers(values: &[f64], method: OutlierMethod) -> Vec<bool> {
    match method {
        OutlierMethod::Iqr => {
            let (Some(q1), Some(q3)) = (percentile(values, 25.0), percentile(values, 75.0)) else {
                return vec![false; values.len()];
            };
            let iqr = q3 - q1;
            let (low, high) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
            values.iter().map(|v| *v < low || *v > high).collect()
        }
        OutlierMethod::ZScore => {
            let stats = DescriptiveStats::from_values(values);
            match stats.and_then(|s| s.std_dev.map(|sd| (s.mean, sd))) {
                Some((mean, sd)) if sd > 0.0 => values
                    .iter()
                    .map(|v| ((v - mean) / sd).abs() > 3.0)
                    .collect(),
                _ => vec![false; values.len()],
            }
        }
    }
}

impl ComparisonEngine<'_> {
    /// Count, mean, median, std-dev, min and max per (team, metric) with data.
    /// Repeated team or metric names are reported once.
    pub fn team_statistics<T: AsRef<str>, M: AsRef<str>>(
        &self,
        records: &[MetricRecord],
        teams: &[T],
        metrics: &[M],
    ) -> Vec<TeamMetricStats> {
        let teams = distinct(teams);
        let mut out = Vec::new();
        for metric in distinct(metrics) {
            for team in &teams {
                let values: Vec<f64> = self
                    .select(records, team, &metric)
                    .iter()
                    .map(|r| r.value)
                    .collect();
                if let Some(stats) = DescriptiveStats::from_values(&values) {
                    out.push(TeamMetricStats {
                        team: team.clone(),
                        metric: metric.clone(),
                        stats,
                    });
                }
            }
        }
        out
    }

    /// Flag outlying records of one metric across all teams.
    pub fn outliers(
        &self,
        records: &[MetricRecord],
        metric: &str,
        method: OutlierMethod,
    ) -> Vec<FlaggedRecord> {
        let selected: Vec<&MetricRecord> = records.iter().filter(|r| r.metric == metric).collect();
        let values: Vec<f64> = selected.iter().map(|r| r.value).collect();
        selected
            .into_iter()
            .zip(detect_outliers(&values, method))
            .map(|(record, is_outlier)| FlaggedRecord {
                record: record.clone(),
                is_outlier,
            })
            .collect()
    }
}
