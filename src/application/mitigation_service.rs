use crate::domain::errors::MitigationError;
use crate::domain::mitigation::{
    ActionItemStatus, ActionItemUpdate, MitigationPlan, NewActionItem, PlanProgress,
};
use crate::domain::repositories::MitigationPlanRepository;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Drives mitigation plans through their lifecycle against a repository.
///
/// Each mutation loads the plan, applies one domain transition and saves it
/// back at the version it was loaded with, so concurrent writers surface as
/// `VersionConflict` instead of lost updates.
pub struct MitigationService {
    repository: Arc<dyn MitigationPlanRepository>,
}

impl MitigationService {
    pub fn new(repository: Arc<dyn MitigationPlanRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_plan(
        &self,
        team: &str,
        metric: &str,
        current_value: Option<f64>,
        target_value: f64,
        description: &str,
    ) -> Result<MitigationPlan> {
        let plan = MitigationPlan::new(team, metric, current_value, target_value, description)?;
        self.repository
            .create(&plan)
            .await
            .context("Failed to store new mitigation plan")?;
        info!("Created mitigation plan {} for {}/{}", plan.id, team, metric);
        Ok(plan)
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> Result<MitigationPlan> {
        Ok(self.repository.get(plan_id).await?)
    }

    pub async fn add_action_item(&self, plan_id: Uuid, item: NewActionItem) -> Result<Uuid> {
        let title = item.title.clone();
        let mut item_id = None;
        self.mutate(plan_id, "add action item", |plan| {
            item_id = Some(plan.add_action_item(item)?);
            Ok(())
        })
        .await?;
        let item_id = item_id.context("Action item was not created")?;
        info!("Added action item {} '{}' to plan {}", item_id, title, plan_id);
        Ok(item_id)
    }

    pub async fn set_item_status(
        &self,
        plan_id: Uuid,
        item_id: Uuid,
        status: ActionItemStatus,
    ) -> Result<MitigationPlan> {
        self.mutate(plan_id, "update action item status", |plan| {
            plan.set_item_status(item_id, status)
        })
        .await
    }

    pub async fn update_action_item(
        &self,
        plan_id: Uuid,
        item_id: Uuid,
        update: ActionItemUpdate,
    ) -> Result<MitigationPlan> {
        self.mutate(plan_id, "edit action item", |plan| {
            plan.update_action_item(item_id, update)
        })
        .await
    }

    pub async fn update_details(
        &self,
        plan_id: Uuid,
        description: Option<String>,
        current_value: Option<f64>,
        target_value: Option<f64>,
    ) -> Result<MitigationPlan> {
        self.mutate(plan_id, "edit plan", |plan| {
            plan.update_details(description, current_value, target_value)
        })
        .await
    }

    pub async fn activate_plan(&self, plan_id: Uuid) -> Result<MitigationPlan> {
        self.mutate(plan_id, "activate plan", MitigationPlan::activate)
            .await
    }

    pub async fn complete_plan(&self, plan_id: Uuid) -> Result<MitigationPlan> {
        let plan = self
            .mutate(plan_id, "complete plan", MitigationPlan::complete)
            .await?;
        info!("Mitigation plan {} completed", plan_id);
        Ok(plan)
    }

    pub async fn cancel_plan(&self, plan_id: Uuid) -> Result<MitigationPlan> {
        let plan = self
            .mutate(plan_id, "cancel plan", MitigationPlan::cancel)
            .await?;
        info!("Mitigation plan {} cancelled", plan_id);
        Ok(plan)
    }

    pub async fn delete_plan(&self, plan_id: Uuid) -> Result<()> {
        self.repository.delete(plan_id).await?;
        info!("Deleted mitigation plan {}", plan_id);
        Ok(())
    }

    pub async fn progress(&self, plan_id: Uuid) -> Result<PlanProgress> {
        Ok(self.get_plan(plan_id).await?.progress())
    }

    pub async fn plans_for_team(&self, team: &str) -> Result<Vec<MitigationPlan>> {
        Ok(self.repository.find_by_team(team).await?)
    }

    pub async fn plans_for_metric(&self, metric: &str) -> Result<Vec<MitigationPlan>> {
        Ok(self.repository.find_by_metric(metric).await?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<MitigationPlan>> {
        Ok(self.repository.search(query).await?)
    }

    async fn mutate<F>(&self, plan_id: Uuid, action: &str, apply: F) -> Result<MitigationPlan>
    where
        F: FnOnce(&mut MitigationPlan) -> Result<(), MitigationError>,
    {
        let mut plan = self.repository.get(plan_id).await?;
        let loaded_version = plan.version;

        if let Err(e) = apply(&mut plan) {
            warn!("Rejected '{}' on plan {}: {}", action, plan_id, e);
            return Err(e.into());
        }
        if plan.version != loaded_version {
            self.repository
                .save(&plan, loaded_version)
                .await
                .context(format!("Failed to save plan {} after '{}'", plan_id, action))?;
        }
        Ok(plan)
    }
}
