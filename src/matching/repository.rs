use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Community, CommunityId, CompatibilityResult, RecordedScore, UserId};

/// Source of each user's latest raw instrument scores.
pub trait AssessmentStore: Send + Sync {
    /// `Ok(None)` when the user has never been assessed.
    fn latest_assessments(
        &self,
        user_id: &UserId,
    ) -> Result<Option<BTreeMap<String, RecordedScore>>, StoreError>;
}

/// Read-only view of the community directory.
pub trait CommunityCatalog: Send + Sync {
    fn get_community(&self, id: &CommunityId) -> Result<Option<Community>, StoreError>;
    /// Communities in catalog order; ranking ties keep this order.
    fn list_communities(&self) -> Result<Vec<Community>, StoreError>;
}

/// Error enumeration for collaborator failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Downstream hook receiving freshly ranked recommendations (presenter, notifier).
pub trait RecommendationSink: Send + Sync {
    fn publish(&self, batch: RecommendationBatch) -> Result<(), SinkError>;
}

/// Ranked recommendations produced in response to an assessment change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBatch {
    pub user_id: UserId,
    pub trigger_instrument: String,
    pub generated_at: DateTime<Utc>,
    pub recommendations: Vec<CompatibilityResult>,
}

/// Recommendation dispatch error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("recommendation sink unavailable: {0}")]
    Transport(String),
}
