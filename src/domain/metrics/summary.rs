use crate::domain::metrics::record::MetricRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Overview of a normalized record set: distinct teams, metrics and the covered period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub record_count: usize,
    pub teams: Vec<String>,
    pub metrics: Vec<String>,
    pub categories: Vec<String>,
    pub projects: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub undated_records: usize,
}

impl DatasetSummary {
    pub fn from_records(records: &[MetricRecord]) -> Self {
        let mut teams = BTreeSet::new();
        let mut metrics = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut projects = BTreeSet::new();
        let mut first_date: Option<NaiveDate> = None;
        let mut last_date: Option<NaiveDate> = None;
        let mut undated_records = 0;

        for record in records {
            teams.insert(record.team.clone());
            metrics.insert(record.metric.clone());
            if let Some(category) = &record.category {
                categories.insert(category.clone());
            }
            if let Some(project) = &record.project {
                projects.insert(project.clone());
            }
            match record.date {
                Some(date) => {
                    first_date = Some(first_date.map_or(date, |d| d.min(date)));
                    last_date = Some(last_date.map_or(date, |d| d.max(date)));
                }
                None => undated_records += 1,
            }
        }

        Self {
            record_count: records.len(),
            teams: teams.into_iter().collect(),
            metrics: metrics.into_iter().collect(),
            categories: categories.into_iter().collect(),
            projects: projects.into_iter().collect(),
            first_date,
            last_date,
            undated_records,
        }
    }
}
