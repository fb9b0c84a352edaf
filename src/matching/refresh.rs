use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use super::domain::UserId;
use super::repository::{AssessmentStore, CommunityCatalog, RecommendationBatch, RecommendationSink};
use super::service::{CommunityMatchingService, MatchingError};

/// Re-runs the ranking when a user's assessment changes and forwards the result downstream.
pub struct AssessmentChangeHandler<A, C, S> {
    service: Arc<CommunityMatchingService<A, C>>,
    sink: Arc<S>,
}

impl<A, C, S> AssessmentChangeHandler<A, C, S>
where
    A: AssessmentStore + 'static,
    C: CommunityCatalog + 'static,
    S: RecommendationSink + 'static,
{
    pub fn new(service: Arc<CommunityMatchingService<A, C>>, sink: Arc<S>) -> Self {
        Self { service, sink }
    }

    /// Returns how many recommendations were forwarded.
    pub fn handle_assessment_change(
        &self,
        user_id: &UserId,
        instrument: &str,
    ) -> Result<usize, MatchingError> {
        info!(%user_id, instrument, "assessment change detected");

        let result = self.refresh(user_id, instrument);
        if let Err(err) = &result {
            error!(%user_id, instrument, error = %err, "failed to refresh recommendations");
        }
        result
    }

    fn refresh(&self, user_id: &UserId, instrument: &str) -> Result<usize, MatchingError> {
        let recommendations = self.service.rank_communities_for_user(user_id)?;
        let count = recommendations.len();

        self.sink.publish(RecommendationBatch {
            user_id: user_id.clone(),
            trigger_instrument: instrument.to_string(),
            generated_at: Utc::now(),
            recommendations,
        })?;

        info!(%user_id, count, "generated new recommendations");
        Ok(count)
    }
}
