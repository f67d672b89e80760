//! Deploy and nuke reports.
//!
//! Reports carry service names, statuses and error summaries only. Rendered
//! content and context values never end up here.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stagehand_core::ServiceName;

use crate::error::{CleanupError, PostActionError};

/// Terminal status of one service in a deploy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Installed fingerprint already matched; nothing uploaded.
    Unchanged,
    /// Uploaded, post-install action attempted.
    Updated,
    /// Dry run: the service differs and would have been uploaded.
    WouldUpdate,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Unchanged => write!(f, "unchanged"),
            ServiceStatus::Updated => write!(f, "updated"),
            ServiceStatus::WouldUpdate => write!(f, "would update"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOutcome {
    pub service: ServiceName,
    pub status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_action_error: Option<PostActionError>,
}

impl ServiceOutcome {
    pub fn new(service: ServiceName, status: ServiceStatus) -> Self {
        ServiceOutcome {
            service,
            status,
            post_action_error: None,
        }
    }
}

/// Per-service outcomes of a deploy run, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    pub target: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub services: Vec<ServiceOutcome>,
}

impl DeployReport {
    pub fn start(target: &str, dry_run: bool) -> Self {
        DeployReport {
            target: target.to_string(),
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            services: Vec::new(),
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// `(service, status)` pairs in declaration order.
    pub fn statuses(&self) -> Vec<(&str, ServiceStatus)> {
        self.services
            .iter()
            .map(|o| (o.service.0.as_str(), o.status))
            .collect()
    }

    pub fn count(&self, status: ServiceStatus) -> usize {
        self.services.iter().filter(|o| o.status == status).count()
    }

    pub fn post_action_errors(&self) -> impl Iterator<Item = &PostActionError> {
        self.services
            .iter()
            .filter_map(|o| o.post_action_error.as_ref())
    }
}

/// Result of a nuke run. Every declared service is attempted; failures are
/// gathered in `errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NukeReport {
    pub target: String,
    pub services: Vec<ServiceName>,
    pub errors: Vec<CleanupError>,
}

impl NukeReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
