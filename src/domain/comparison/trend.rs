use crate::domain::comparison::aggregation::mean;
use crate::domain::comparison::engine::ComparisonEngine;
use crate::domain::errors::ComparisonError;
use crate::domain::metrics::direction::MetricDirection;
use crate::domain::metrics::record::MetricRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const MIN_TREND_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Movement of a metric over time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub metric: String,
    pub team: Option<String>,
    pub data_points: usize,
    /// Least-squares slope per observation, in date order.
    pub slope: f64,
    pub first_half_mean: f64,
    pub second_half_mean: f64,
    /// Fractional change between the half means; `None` when the first half averages zero.
    pub percent_change: Option<f64>,
    pub trend: TrendDirection,
    /// Whether the trend moves in the metric's better direction.
    pub improving: bool,
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub range: DateRange,
    pub mean: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub metric: String,
    pub team: Option<String>,
    pub first: PeriodSummary,
    pub second: PeriodSummary,
    /// `second.mean - first.mean`; `None` unless both periods have data.
    pub absolute_change: Option<f64>,
    pub percent_change: Option<f64>,
}

impl ComparisonEngine<'_> {
    /// Trend of a metric over its dated records, optionally for one team.
    ///
    /// Undated records are ignored. Records sharing a date keep their input
    /// order.
    pub fn trend(
        &self,
        records: &[MetricRecord],
        metric: &str,
        team: Option<&str>,
    ) -> Result<TrendAnalysis, ComparisonError> {
        let mut dated: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter(|r| r.metric == metric && team.is_none_or(|t| r.team == t))
            .filter_map(|r| r.date.map(|date| (date, r.value)))
            .collect();
        if dated.len() < MIN_TREND_POINTS {
            return Err(ComparisonError::InsufficientData {
                metric: metric.to_string(),
                points: dated.len(),
                required: MIN_TREND_POINTS,
            });
        }
        dated.sort_by_key(|(date, _)| *date);
        let values: Vec<f64> = dated.into_iter().map(|(_, value)| value).collect();

        let slope = least_squares_slope(&values);
        let half = values.len() / 2;
        let first_half_mean = mean(&values[..half]).unwrap_or_default();
        let second_half_mean = mean(&values[half..]).unwrap_or_default();
        let trend = if slope > 0.0 {
            TrendDirection::Increasing
        } else if slope < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };
        let improving = match self.direction_for(metric) {
            MetricDirection::HigherIsBetter => trend == TrendDirection::Increasing,
            MetricDirection::LowerIsBetter => trend == TrendDirection::Decreasing,
        };

        Ok(TrendAnalysis {
            metric: metric.to_string(),
            team: team.map(str::to_string),
            data_points: values.len(),
            slope,
            first_half_mean,
            second_half_mean,
            percent_change: (first_half_mean != 0.0)
                .then(|| (second_half_mean - first_half_mean) / first_half_mean),
            trend,
            improving,
        })
    }

    /// Mean of a metric over two inclusive date ranges.
    pub fn compare_periods(
        &self,
        records: &[MetricRecord],
        metric: &str,
        team: Option<&str>,
        first: DateRange,
        second: DateRange,
    ) -> PeriodComparison {
        let summarize = |range: DateRange| {
            let values: Vec<f64> = records
                .iter()
                .filter(|r| r.metric == metric && team.is_none_or(|t| r.team == t))
                .filter(|r| r.date.is_some_and(|d| range.contains(d)))
                .map(|r| r.value)
                .collect();
            PeriodSummary {
                range,
                mean: mean(&values),
                count: values.len(),
            }
        };
        let first = summarize(first);
        let second = summarize(second);

        let (absolute_change, percent_change) = match (first.mean, second.mean) {
            (Some(a), Some(b)) => (Some(b - a), (a != 0.0).then(|| (b - a) / a)),
            _ => (None, None),
        };

        PeriodComparison {
            metric: metric.to_string(),
            team: team.map(str::to_string),
            first,
            second,
            absolute_change,
            percent_change,
        }
    }
}

/// Slope of the least-squares line through `(index, value)`.
fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;
    let (covariance, variance) = values.iter().enumerate().fold(
        (0.0, 0.0),
        |(cov, var), (i, y)| {
            let dx = i as f64 - x_mean;
            (cov + dx * (y - y_mean), var + dx * dx)
        },
    );
    if variance == 0.0 { 0.0 } else { covariance / variance }
}
