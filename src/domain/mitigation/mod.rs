pub mod action_item;
pub mod plan;

pub use action_item::{ActionItem, ActionItemStatus, ActionItemUpdate, NewActionItem, Priority};
pub use plan::{MitigationPlan, PlanProgress, PlanStatus};
