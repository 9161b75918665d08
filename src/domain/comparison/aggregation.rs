use crate::domain::comparison::statistics::percentile;
use crate::domain::config::comparison_config::AggregationPolicy;
use crate::domain::metrics::record::MetricRecord;

/// Collapse the selected records of one team/metric into a single value.
///
/// Returns `None` for an empty selection.
pub fn aggregate(records: &[&MetricRecord], policy: AggregationPolicy) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let values: Vec<f64> = records.iter().map(|r| r.value).collect();

    match policy {
        AggregationPolicy::LatestByDate => {
            let latest = records.iter().filter_map(|r| r.date).max();
            match latest {
                Some(latest) => {
                    let on_latest: Vec<f64> = records
                        .iter()
                        .filter(|r| r.date == Some(latest))
                        .map(|r| r.value)
                        .collect();
                    mean(&on_latest)
                }
                None => mean(&values),
            }
        }
        AggregationPolicy::Mean => mean(&values),
        AggregationPolicy::Median => percentile(&values, 50.0),
        AggregationPolicy::Sum => Some(values.iter().sum()),
        AggregationPolicy::Min => values.iter().copied().reduce(f64::min),
        AggregationPolicy::Max => values.iter().copied().reduce(f64::max),
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
