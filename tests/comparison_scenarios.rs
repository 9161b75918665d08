use chrono::NaiveDate;
use teambench::domain::comparison::ComparisonEngine;
use teambench::domain::config::{AggregationPolicy, ComparisonConfig, NormalizationConfig};
use teambench::domain::errors::ComparisonError;
use teambench::domain::ingestion::{Cell, Normalizer, RawTable, SynonymTable};
use teambench::domain::metrics::{
    Benchmark, BenchmarkTable, DirectionTable, MetricDirection, MetricRecord,
};

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn teams(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_long_form_baseline_comparison() {
    let table = RawTable::new(["Team", "Metric", "Value", "Date"])
        .with_row([
            ("Team", Cell::from("TeamA")),
            ("Metric", Cell::from("Velocity")),
            ("Value", Cell::from(25.0)),
            ("Date", Cell::from("2024-01-01")),
        ])
        .with_row([
            ("Team", Cell::from("TeamB")),
            ("Metric", Cell::from("Velocity")),
            ("Value", Cell::from(30.0)),
            ("Date", Cell::from("2024-01-01")),
        ]);
    let normalization = NormalizationConfig::default();
    let synonyms = SynonymTable::baseline();
    let normalized = Normalizer::new(&normalization, &synonyms)
        .normalize(&table)
        .unwrap();
    assert_eq!(normalized.records.len(), 2);

    let config = ComparisonConfig::default();
    let results = ComparisonEngine::new(&config)
        .compare_teams(
            &normalized.records,
            &teams(&["TeamA", "TeamB"]),
            &["Velocity"],
            Some("TeamA"),
        )
        .unwrap();

    let velocity = &results[0];
    let team_b = velocity.row("TeamB").unwrap();
    assert_eq!(team_b.delta_from_baseline, 5.0);
    assert_eq!(team_b.percent_delta, Some(0.2));
    assert_eq!(team_b.rank, 1);
    assert_eq!(velocity.row("TeamA").unwrap().rank, 2);
}

#[test]
fn test_wide_form_row_expands_per_metric() {
    let table = RawTable::new(["team", "date", "Velocity", "Quality"]).with_row([
        ("team", Cell::from("TeamA")),
        ("date", Cell::from(jan(1))),
        ("Velocity", Cell::from(25.0)),
        ("Quality", Cell::from(85.0)),
    ]);
    let normalization = NormalizationConfig::default();
    let synonyms = SynonymTable::baseline();

    let normalized = Normalizer::new(&normalization, &synonyms)
        .normalize(&table)
        .unwrap();

    assert_eq!(
        normalized.records,
        vec![
            MetricRecord::new("TeamA", "Velocity", 25.0).with_date(jan(1)),
            MetricRecord::new("TeamA", "Quality", 85.0).with_date(jan(1)),
        ]
    );
}

#[test]
fn test_benchmark_gap_for_higher_is_better() {
    let mut benchmarks = BenchmarkTable::default();
    benchmarks.insert(Benchmark::new("general", "Velocity", 20.0, MetricDirection::HigherIsBetter));
    let records = vec![MetricRecord::new("TeamA", "Velocity", 25.0).with_date(jan(1))];
    let config = ComparisonConfig::default();

    let comparison = ComparisonEngine::new(&config)
        .compare_to_benchmarks(&records, &teams(&["TeamA"]), &["Velocity"], &benchmarks)
        .unwrap();

    let result = &comparison.results[0];
    assert_eq!(result.gap, 5.0);
    assert_eq!(result.percent_gap, Some(0.25));
    assert!(result.meets_benchmark);
}

#[test]
fn test_benchmark_sign_convention_for_lower_is_better() {
    let mut benchmarks = BenchmarkTable::default();
    benchmarks.insert(Benchmark::new(
        "general",
        "Defect Rate",
        0.05,
        MetricDirection::LowerIsBetter,
    ));
    let records = vec![
        MetricRecord::new("TeamA", "Defect Rate", 0.03),
        MetricRecord::new("TeamB", "Defect Rate", 0.10),
    ];
    let config = ComparisonConfig::default();

    let comparison = ComparisonEngine::new(&config)
        .compare_to_benchmarks(
            &records,
            &teams(&["TeamA", "TeamB"]),
            &["Defect Rate"],
            &benchmarks,
        )
        .unwrap();

    let team_a = &comparison.results[0];
    let team_b = &comparison.results[1];
    // Gap keeps its sign regardless of direction; only `meets` flips
    assert!(team_a.gap < 0.0);
    assert!(team_a.meets_benchmark);
    assert!(team_b.gap > 0.0);
    assert!(!team_b.meets_benchmark);
}

#[test]
fn test_no_benchmark_for_any_pair() {
    let records = vec![MetricRecord::new("TeamA", "Velocity", 25.0)];
    let config = ComparisonConfig::default();

    let err = ComparisonEngine::new(&config)
        .compare_to_benchmarks(
            &records,
            &teams(&["TeamA"]),
            &["Velocity"],
            &BenchmarkTable::default(),
        )
        .unwrap_err();

    assert_eq!(err, ComparisonError::NoBenchmarkAvailable { requested: 1 });
}

#[test]
fn test_ranks_follow_direction() {
    let records = vec![
        MetricRecord::new("TeamA", "Cycle Time", 4.0),
        MetricRecord::new("TeamB", "Cycle Time", 2.5),
        MetricRecord::new("TeamC", "Cycle Time", 6.0),
        MetricRecord::new("TeamA", "Velocity", 30.0),
        MetricRecord::new("TeamB", "Velocity", 22.0),
        MetricRecord::new("TeamC", "Velocity", 41.0),
    ];
    let config = ComparisonConfig::new(AggregationPolicy::Mean, DirectionTable::baseline());
    let names = teams(&["TeamA", "TeamB", "TeamC"]);

    let results = ComparisonEngine::new(&config)
        .compare_teams(&records, &names, &["Cycle Time", "Velocity"], None)
        .unwrap();

    for result in &results {
        let mut ranks: Vec<usize> = result.rows.iter().map(|r| r.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
    // Cycle time is lower-is-better, velocity higher-is-better
    assert_eq!(results[0].rows[0].team, "TeamB");
    assert_eq!(results[1].rows[0].team, "TeamC");
}

#[test]
fn test_tied_aggregates_rank_by_team_name() {
    let records = vec![
        MetricRecord::new("TeamC", "Velocity", 30.0),
        MetricRecord::new("TeamA", "Velocity", 30.0),
        MetricRecord::new("TeamB", "Velocity", 35.0),
    ];
    let config = ComparisonConfig::new(AggregationPolicy::Mean, DirectionTable::baseline());

    let results = ComparisonEngine::new(&config)
        .compare_teams(&records, &teams(&["TeamC", "TeamA", "TeamB"]), &["Velocity"], None)
        .unwrap();

    let order: Vec<(&str, usize)> = results[0]
        .rows
        .iter()
        .map(|r| (r.team.as_str(), r.rank))
        .collect();
    // Ranks are positions 1..n; equal aggregates do not share a rank
    assert_eq!(order, vec![("TeamB", 1), ("TeamA", 2), ("TeamC", 3)]);
}

#[test]
fn test_team_without_data_is_not_ranked() {
    let records = vec![
        MetricRecord::new("TeamA", "Velocity", 30.0),
        MetricRecord::new("TeamB", "Velocity", 22.0),
    ];
    let config = ComparisonConfig::default();

    let results = ComparisonEngine::new(&config)
        .compare_teams(&records, &teams(&["TeamA", "TeamB", "TeamC"]), &["Velocity"], None)
        .unwrap();

    assert_eq!(results[0].rows.len(), 2);
    assert!(results[0].row("TeamC").is_none());
}
