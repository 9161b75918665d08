//! Repository Pattern Abstractions
//!
//! Mitigation plans are the only state this crate keeps between calls.
//! Storage lives behind `MitigationPlanRepository` so the state machine in
//! `domain::mitigation` never touches a connection.
//!
//! # Concurrency
//!
//! Saves are optimistic: the caller passes the `version` the plan had when
//! it was loaded, and the repository refuses the write with
//! `RepositoryError::VersionConflict` if another writer got there first.
//!
//! # Example
//!
//! ```rust,no_run
//! use teambench::domain::mitigation::MitigationPlan;
//! use teambench::domain::repositories::MitigationPlanRepository;
//! use teambench::infrastructure::InMemoryPlanRepository;
//!
//! # async {
//! let repo = InMemoryPlanRepository::new();
//! let plan = MitigationPlan::new("Platform", "Defect Rate", None, 0.05, "Cut escaped bugs").unwrap();
//! repo.create(&plan).await.unwrap();
//! let plans = repo.find_by_team("Platform").await.unwrap();
//! # };
//! ```

use crate::domain::errors::RepositoryError;
use crate::domain::mitigation::MitigationPlan;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for persisting and querying mitigation plans
#[async_trait]
pub trait MitigationPlanRepository: Send + Sync {
    /// Store a new plan
    async fn create(&self, plan: &MitigationPlan) -> Result<(), RepositoryError>;

    /// Load a plan by id
    async fn get(&self, plan_id: Uuid) -> Result<MitigationPlan, RepositoryError>;

    /// Replace a stored plan, provided it is still at `expected_version`
    async fn save(
        &self,
        plan: &MitigationPlan,
        expected_version: u64,
    ) -> Result<(), RepositoryError>;

    /// Remove a plan together with its action items
    async fn delete(&self, plan_id: Uuid) -> Result<(), RepositoryError>;

    /// Plans for one team, oldest first
    async fn find_by_team(&self, team: &str) -> Result<Vec<MitigationPlan>, RepositoryError>;

    /// Plans for one metric, oldest first
    async fn find_by_metric(&self, metric: &str) -> Result<Vec<MitigationPlan>, RepositoryError>;

    /// Case-insensitive search over team, metric and description
    async fn search(&self, query: &str) -> Result<Vec<MitigationPlan>, RepositoryError>;

    /// Get all plans, oldest first
    async fn get_all(&self) -> Result<Vec<MitigationPlan>, RepositoryError>;
}
