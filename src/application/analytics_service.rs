use crate::config::AppConfig;
use crate::domain::comparison::{
    BenchmarkComparison, ComparisonEngine, ComparisonResult, DateRange, FlaggedRecord,
    OutlierMethod, PerformerSummary, PeriodComparison, TeamMetricStats, TeamScore, TrendAnalysis,
};
use crate::domain::ingestion::{Normalized, Normalizer, RawTable};
use crate::domain::metrics::{DatasetSummary, MetricRecord};
use crate::infrastructure::tabular::load_csv_table;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Entry point for ingestion and analytics, wired to one `AppConfig`.
pub struct AnalyticsService {
    config: AppConfig,
}

impl AnalyticsService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn engine(&self) -> ComparisonEngine<'_> {
        ComparisonEngine::new(&self.config.comparison)
    }

    pub fn normalize(&self, table: &RawTable) -> Result<Normalized> {
        let normalizer = Normalizer::new(&self.config.normalization, &self.config.synonyms);
        let normalized = normalizer
            .normalize(table)
            .context("Failed to normalize input table")?;

        info!(
            "Normalized {} row(s) as {:?}: {} accepted, {} rejected",
            table.row_count(),
            normalized.shape,
            normalized.report.accepted_count,
            normalized.report.rejected_count
        );
        for warning in &normalized.report.warnings {
            warn!("{}", warning);
        }
        for rejection in &normalized.report.rejections {
            debug!(
                "Rejected row {} column '{}': {}",
                rejection.row, rejection.column, rejection.reason
            );
        }
        Ok(normalized)
    }

    /// Read a CSV file and normalize it.
    pub fn load_csv(&self, path: &Path) -> Result<Normalized> {
        let table = load_csv_table(path)?;
        info!(
            "Loaded {} with {} column(s) and {} row(s)",
            path.display(),
            table.columns().len(),
            table.row_count()
        );
        self.normalize(&table)
            .with_context(|| format!("Failed to ingest {}", path.display()))
    }

    pub fn summarize(&self, records: &[MetricRecord]) -> DatasetSummary {
        DatasetSummary::from_records(records)
    }

    pub fn compare_teams(
        &self,
        records: &[MetricRecord],
        teams: &[String],
        metrics: &[String],
        baseline: Option<&str>,
    ) -> Result<Vec<ComparisonResult>> {
        let results = self
            .engine()
            .compare_teams(records, teams, metrics, baseline)
            .context("Team comparison failed")?;
        info!(
            "Compared {} team(s) on {} metric(s) using {} aggregation",
            teams.len(),
            results.len(),
            self.config.comparison.aggregation
        );
        Ok(results)
    }

    pub fn compare_to_benchmarks(
        &self,
        records: &[MetricRecord],
        teams: &[String],
        metrics: &[String],
    ) -> Result<BenchmarkComparison> {
        let comparison = self
            .engine()
            .compare_to_benchmarks(records, teams, metrics, &self.config.benchmarks)
            .context("Benchmark comparison failed")?;

        let met = comparison.results.iter().filter(|r| r.meets_benchmark).count();
        info!(
            "Benchmarks: {}/{} pair(s) meet target, {} unmatched",
            met,
            comparison.results.len(),
            comparison.unmatched.len()
        );
        for pair in &comparison.unmatched {
            debug!("No benchmark result for {}/{}: {:?}", pair.team, pair.metric, pair.reason);
        }
        Ok(comparison)
    }

    pub fn performance_ranking(&self, records: &[MetricRecord], metrics: &[String]) -> Vec<TeamScore> {
        let ranking = self.engine().performance_ranking(records, metrics);
        if ranking.is_empty() {
            warn!("No team has data for any of {:?}", metrics);
        }
        ranking
    }

    pub fn best_and_worst(&self, records: &[MetricRecord], metrics: &[String]) -> Vec<PerformerSummary> {
        self.engine().best_and_worst(records, metrics)
    }

    pub fn team_statistics(
        &self,
        records: &[MetricRecord],
        teams: &[String],
        metrics: &[String],
    ) -> Vec<TeamMetricStats> {
        self.engine().team_statistics(records, teams, metrics)
    }

    pub fn outliers(
        &self,
        records: &[MetricRecord],
        metric: &str,
        method: OutlierMethod,
    ) -> Vec<FlaggedRecord> {
        let flagged = self.engine().outliers(records, metric, method);
        let count = flagged.iter().filter(|f| f.is_outlier).count();
        if count > 0 {
            info!("{} outlier(s) in {} by {:?}", count, metric, method);
        }
        flagged
    }

    pub fn trend(
        &self,
        records: &[MetricRecord],
        metric: &str,
        team: Option<&str>,
    ) -> Result<TrendAnalysis> {
        self.engine()
            .trend(records, metric, team)
            .context(format!("Trend analysis failed for {}", metric))
    }

    pub fn compare_periods(
        &self,
        records: &[MetricRecord],
        metric: &str,
        team: Option<&str>,
        first: DateRange,
        second: DateRange,
    ) -> PeriodComparison {
        self.engine()
            .compare_periods(records, metric, team, first, second)
    }
}
