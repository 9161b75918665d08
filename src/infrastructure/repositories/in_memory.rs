//! In-Memory Repository Implementations
//!
//! Thread-safe, in-memory implementation of `MitigationPlanRepository`.
//!
//! # Features
//!
//! - **Thread-safe**: Uses `Arc<RwLock>` for concurrent access
//! - **Optimistic versioning**: stale saves fail with `VersionConflict`
//! - **Testing**: Ideal for unit tests and the CLI
//!
//! # Limitations
//!
//! - Data is lost on process exit
//! - No sharing across processes

use crate::domain::errors::RepositoryError;
use crate::domain::mitigation::MitigationPlan;
use crate::domain::repositories::MitigationPlanRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct InMemoryPlanRepository {
    plans: Arc<RwLock<HashMap<Uuid, MitigationPlan>>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self {
            plans: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<MitigationPlan>
    where
        F: Fn(&MitigationPlan) -> bool,
    {
        let plans = self.plans.read().await;
        let mut found: Vec<MitigationPlan> = plans.values().filter(|p| predicate(*p)).cloned().collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        found
    }
}

impl Default for InMemoryPlanRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MitigationPlanRepository for InMemoryPlanRepository {
    async fn create(&self, plan: &MitigationPlan) -> Result<(), RepositoryError> {
        let mut plans = self.plans.write().await;
        if let Some(existing) = plans.get(&plan.id) {
            return Err(RepositoryError::VersionConflict {
                plan_id: plan.id.to_string(),
                expected: plan.version,
                actual: existing.version,
            });
        }
        plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn get(&self, plan_id: Uuid) -> Result<MitigationPlan, RepositoryError> {
        self.plans
            .read()
            .await
            .get(&plan_id)
            .cloned()
            .ok_or_else(|| RepositoryError::PlanNotFound {
                plan_id: plan_id.to_string(),
            })
    }

    async fn save(
        &self,
        plan: &MitigationPlan,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        let mut plans = self.plans.write().await;
        let stored = plans
            .get_mut(&plan.id)
            .ok_or_else(|| RepositoryError::PlanNotFound {
                plan_id: plan.id.to_string(),
            })?;
        if stored.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                plan_id: plan.id.to_string(),
                expected: expected_version,
                actual: stored.version,
            });
        }
        *stored = plan.clone();
        Ok(())
    }

    async fn delete(&self, plan_id: Uuid) -> Result<(), RepositoryError> {
        self.plans
            .write()
            .await
            .remove(&plan_id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::PlanNotFound {
                plan_id: plan_id.to_string(),
            })
    }

    async fn find_by_team(&self, team: &str) -> Result<Vec<MitigationPlan>, RepositoryError> {
        Ok(self.filtered(|p| p.team == team).await)
    }

    async fn find_by_metric(&self, metric: &str) -> Result<Vec<MitigationPlan>, RepositoryError> {
        Ok(self.filtered(|p| p.metric == metric).await)
    }

    async fn search(&self, query: &str) -> Result<Vec<MitigationPlan>, RepositoryError> {
        Ok(self.filtered(|p| p.matches(query)).await)
    }

    async fn get_all(&self) -> Result<Vec<MitigationPlan>, RepositoryError> {
        Ok(self.filtered(|_| true).await)
    }
}
