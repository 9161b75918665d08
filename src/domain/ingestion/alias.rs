//! Column alias resolution
//!
//! Maps observed column headers to canonical semantic roles through a
//! configurable synonym table. Resolution is first-match-wins in the fixed
//! role priority order, so a column is never claimed by two roles.

use crate::domain::errors::IngestionError;
use crate::domain::metrics::naming::lookup_key;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Semantic role a column can play, declared in resolution priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalRole {
    Team,
    Metric,
    Value,
    Date,
    Category,
    Unit,
    Project,
    Notes,
    Id,
    #[serde(rename = "created_at")]
    CreatedAt,
}

impl CanonicalRole {
    pub const PRIORITY: [CanonicalRole; 10] = [
        CanonicalRole::Team,
        CanonicalRole::Metric,
        CanonicalRole::Value,
        CanonicalRole::Date,
        CanonicalRole::Category,
        CanonicalRole::Unit,
        CanonicalRole::Project,
        CanonicalRole::Notes,
        CanonicalRole::Id,
        CanonicalRole::CreatedAt,
    ];

    /// Canonical field name, also the canonical column header.
    pub fn field_name(&self) -> &'static str {
        match self {
            CanonicalRole::Team => "team",
            CanonicalRole::Metric => "metric",
            CanonicalRole::Value => "value",
            CanonicalRole::Date => "date",
            CanonicalRole::Category => "category",
            CanonicalRole::Unit => "unit",
            CanonicalRole::Project => "project",
            CanonicalRole::Notes => "notes",
            CanonicalRole::Id => "id",
            CanonicalRole::CreatedAt => "created_at",
        }
    }

    /// Roles carried forward onto every record emitted from a wide row.
    pub fn is_identifier(&self) -> bool {
        !matches!(
            self,
            CanonicalRole::Metric | CanonicalRole::Value | CanonicalRole::Id | CanonicalRole::CreatedAt
        )
    }

    /// Storage-assigned fields; they describe one stored record and only
    /// carry over from long-form rows.
    pub fn is_storage_field(&self) -> bool {
        matches!(self, CanonicalRole::Id | CanonicalRole::CreatedAt)
    }
}

impl fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl FromStr for CanonicalRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = lookup_key(s);
        CanonicalRole::PRIORITY
            .into_iter()
            .find(|role| role.field_name() == key)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid role: {}. Must be one of team, metric, value, date, category, unit, project, notes, id, created_at",
                    s
                )
            })
    }
}

/// Accepted spellings per canonical role, compared case- and whitespace-insensitively
#[derive(Debug, Clone, PartialEq)]
pub struct SynonymTable {
    spellings: HashMap<CanonicalRole, HashSet<String>>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::baseline()
    }
}

impl SynonymTable {
    /// Table where each role accepts only its own canonical field name.
    pub fn canonical_only() -> Self {
        let mut table = Self {
            spellings: HashMap::new(),
        };
        for role in CanonicalRole::PRIORITY {
            table.add(role, role.field_name());
        }
        table
    }

    /// Built-in baseline table; configuration may extend it.
    pub fn baseline() -> Self {
        let mut table = Self::canonical_only();
        let synonyms: [(CanonicalRole, &[&str]); 10] = [
            (
                CanonicalRole::Team,
                &["team name", "team_name", "group", "squad", "tribe"],
            ),
            (
                CanonicalRole::Metric,
                &["metric name", "metric_name", "measure", "kpi", "indicator"],
            ),
            (
                CanonicalRole::Value,
                &["score", "result", "amount", "measurement", "metric value"],
            ),
            (
                CanonicalRole::Date,
                &["time", "timestamp", "period", "day", "reporting date"],
            ),
            (CanonicalRole::Category, &["type", "area", "dimension"]),
            (CanonicalRole::Unit, &["units", "uom", "unit of measure"]),
            (CanonicalRole::Project, &["initiative", "program", "product"]),
            (CanonicalRole::Notes, &["note", "comment", "comments", "remarks"]),
            (CanonicalRole::Id, &["record id", "record_id"]),
            (CanonicalRole::CreatedAt, &["created at", "created", "createdat"]),
        ];
        for (role, spellings) in synonyms {
            for spelling in spellings {
                table.add(role, spelling);
            }
        }
        table
    }

    pub fn add(&mut self, role: CanonicalRole, spelling: &str) {
        let key = lookup_key(spelling);
        if !key.is_empty() {
            self.spellings.entry(role).or_default().insert(key);
        }
    }

    pub fn accepts(&self, role: CanonicalRole, column: &str) -> bool {
        self.spellings
            .get(&role)
            .is_some_and(|set| set.contains(&lookup_key(column)))
    }
}

/// Result of alias resolution: which observed column plays which role
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoleMapping {
    assigned: BTreeMap<CanonicalRole, String>,
    unresolved: Vec<String>,
}

impl RoleMapping {
    pub fn column_for(&self, role: CanonicalRole) -> Option<&str> {
        self.assigned.get(&role).map(String::as_str)
    }

    pub fn role_of(&self, column: &str) -> Option<CanonicalRole> {
        self.assigned
            .iter()
            .find(|(_, assigned)| assigned.as_str() == column)
            .map(|(role, _)| *role)
    }

    pub fn has(&self, role: CanonicalRole) -> bool {
        self.assigned.contains_key(&role)
    }

    /// Columns no role claimed, in input order.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Resolved identifier roles with their columns, in priority order.
    pub fn identifier_columns(&self) -> impl Iterator<Item = (CanonicalRole, &str)> {
        self.assigned
            .iter()
            .filter(|(role, _)| role.is_identifier())
            .map(|(role, column)| (*role, column.as_str()))
    }
}

/// Resolve observed column names to canonical roles.
///
/// # Errors
///
/// `UnrecognizedSchema` when no column resolves to `team`, or when nothing
/// could carry values (no `value` column and no unresolved column).
pub fn resolve_columns(
    columns: &[String],
    synonyms: &SynonymTable,
) -> Result<RoleMapping, IngestionError> {
    let mut assigned = BTreeMap::new();
    let mut claimed: HashSet<&str> = HashSet::new();

    for role in CanonicalRole::PRIORITY {
        let hit = columns
            .iter()
            .find(|column| !claimed.contains(column.as_str()) && synonyms.accepts(role, column));
        if let Some(column) = hit {
            claimed.insert(column.as_str());
            assigned.insert(role, column.clone());
        }
    }

    let unresolved: Vec<String> = columns
        .iter()
        .filter(|column| !claimed.contains(column.as_str()))
        .cloned()
        .collect();

    if !assigned.contains_key(&CanonicalRole::Team) {
        return Err(IngestionError::UnrecognizedSchema {
            reason: "no column resolves to team".to_string(),
            columns: columns.to_vec(),
        });
    }
    if !assigned.contains_key(&CanonicalRole::Value) && unresolved.is_empty() {
        return Err(IngestionError::UnrecognizedSchema {
            reason: "no value-bearing column".to_string(),
            columns: columns.to_vec(),
        });
    }

    Ok(RoleMapping {
        assigned,
        unresolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolves_canonical_long_form() {
        let mapping = resolve_columns(
            &cols(&["team", "metric", "value", "date"]),
            &SynonymTable::baseline(),
        )
        .unwrap();

        assert_eq!(mapping.column_for(CanonicalRole::Team), Some("team"));
        assert_eq!(mapping.column_for(CanonicalRole::Metric), Some("metric"));
        assert_eq!(mapping.column_for(CanonicalRole::Value), Some("value"));
        assert_eq!(mapping.column_for(CanonicalRole::Date), Some("date"));
        assert!(mapping.unresolved().is_empty());
    }

    #[test]
    fn test_matching_ignores_case_and_whitespace() {
        let mapping = resolve_columns(
            &cols(&["  TEAM   Name ", "KPI", "Score"]),
            &SynonymTable::baseline(),
        )
        .unwrap();

        assert_eq!(mapping.column_for(CanonicalRole::Team), Some("  TEAM   Name "));
        assert_eq!(mapping.column_for(CanonicalRole::Metric), Some("KPI"));
        assert_eq!(mapping.column_for(CanonicalRole::Value), Some("Score"));
    }

    #[test]
    fn test_first_match_wins_within_role() {
        let mapping = resolve_columns(
            &cols(&["Squad", "Team", "Velocity", "Quality"]),
            &SynonymTable::baseline(),
        )
        .unwrap();

        assert_eq!(mapping.column_for(CanonicalRole::Team), Some("Squad"));
        assert_eq!(mapping.unresolved(), ["Team", "Velocity", "Quality"]);
    }

    #[test]
    fn test_column_never_claimed_twice() {
        let mut synonyms = SynonymTable::baseline();
        synonyms.add(CanonicalRole::Metric, "team");

        let mapping =
            resolve_columns(&cols(&["team", "value", "kpi"]), &synonyms).unwrap();

        assert_eq!(mapping.column_for(CanonicalRole::Team), Some("team"));
        assert_eq!(mapping.column_for(CanonicalRole::Metric), Some("kpi"));
        assert_eq!(mapping.role_of("team"), Some(CanonicalRole::Team));
    }

    #[test]
    fn test_missing_team_is_unrecognized() {
        let err = resolve_columns(&cols(&["metric", "value"]), &SynonymTable::baseline())
            .unwrap_err();

        match err {
            IngestionError::UnrecognizedSchema { columns, .. } => {
                assert_eq!(columns, cols(&["metric", "value"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_value_bearing_column_is_unrecognized() {
        let err = resolve_columns(&cols(&["team", "date", "notes"]), &SynonymTable::baseline())
            .unwrap_err();
        assert!(matches!(err, IngestionError::UnrecognizedSchema { .. }));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(CanonicalRole::from_str(" Team ").unwrap(), CanonicalRole::Team);
        assert_eq!(CanonicalRole::from_str("created_at").unwrap(), CanonicalRole::CreatedAt);
        assert!(CanonicalRole::from_str("owner").is_err());
    }

    #[test]
    fn test_storage_columns_resolve_after_other_roles() {
        let mapping = resolve_columns(
            &cols(&["id", "team", "metric", "value", "created_at"]),
            &SynonymTable::baseline(),
        )
        .unwrap();

        assert_eq!(mapping.column_for(CanonicalRole::Id), Some("id"));
        assert_eq!(mapping.column_for(CanonicalRole::CreatedAt), Some("created_at"));
        assert!(mapping.unresolved().is_empty());
        assert!(!CanonicalRole::Id.is_identifier());
    }
}
