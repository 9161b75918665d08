// Ingestion and comparison analytics
pub mod analytics_service;

// Mitigation plan workflow
pub mod mitigation_service;

pub use analytics_service::AnalyticsService;
pub use mitigation_service::MitigationService;
