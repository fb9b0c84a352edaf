use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::MatchingConfig;
use super::domain::{CommunityId, CompatibilityResult, UserAssessmentProfile, UserId};
use super::repository::{AssessmentStore, CommunityCatalog, SinkError, StoreError};
use super::scoring::CompatibilityScorer;

/// Service composing the scorer with the assessment store and community catalog.
pub struct CommunityMatchingService<A, C> {
    assessments: Arc<A>,
    catalog: Arc<C>,
    scorer: CompatibilityScorer,
}

impl<A, C> CommunityMatchingService<A, C>
where
    A: AssessmentStore + 'static,
    C: CommunityCatalog + 'static,
{
    pub fn new(assessments: Arc<A>, catalog: Arc<C>, config: Arc<MatchingConfig>) -> Self {
        Self {
            assessments,
            catalog,
            scorer: CompatibilityScorer::new(config),
        }
    }

    /// Score a profile against a catalog community.
    pub fn score_community(
        &self,
        profile: &UserAssessmentProfile,
        community_id: &CommunityId,
    ) -> Result<CompatibilityResult, MatchingError> {
        let community = self
            .catalog
            .get_community(community_id)?
            .ok_or_else(|| MatchingError::CommunityNotFound(community_id.clone()))?;

        Ok(self.scorer.score(profile, &community))
    }

    /// Build the user's profile from the store. `None` when nothing usable is recorded.
    pub fn load_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserAssessmentProfile>, MatchingError> {
        let Some(recorded) = self.assessments.latest_assessments(user_id)? else {
            return Ok(None);
        };

        let profile = UserAssessmentProfile::from_recorded(
            user_id.clone(),
            &recorded,
            &self.scorer.config().instruments,
        );

        if profile.is_empty() {
            Ok(None)
        } else {
            Ok(Some(profile))
        }
    }

    /// Top communities for a user, best match first.
    pub fn rank_communities_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CompatibilityResult>, MatchingError> {
        Ok(self.rank_with_report(user_id)?.recommendations)
    }

    /// Ranking plus the communities that had to be skipped along the way.
    pub fn rank_with_report(&self, user_id: &UserId) -> Result<Ranking, MatchingError> {
        match self.load_profile(user_id)? {
            Some(profile) => self.rank_profile(&profile),
            None => {
                warn!(%user_id, "no assessment data found for user");
                Ok(Ranking::empty(user_id.clone()))
            }
        }
    }

    /// Rank every catalog community against an already built profile.
    pub fn rank_profile(&self, profile: &UserAssessmentProfile) -> Result<Ranking, MatchingError> {
        let communities = self.catalog.list_communities()?;
        let policy = self.scorer.config().ranking;
        let considered = communities.len();

        let mut recommendations = Vec::new();
        let mut skipped = Vec::new();

        for community in communities {
            match self.score_community(profile, &community.id) {
                Ok(result) if result.compatibility_score > policy.min_score => {
                    recommendations.push(result);
                }
                Ok(result) => {
                    debug!(
                        user_id = %profile.user_id,
                        community = %result.community_slug,
                        score = result.compatibility_score,
                        "dropping low relevance community"
                    );
                }
                Err(error) => {
                    warn!(
                        user_id = %profile.user_id,
                        community_id = %community.id,
                        %error,
                        "skipping community after scoring failure"
                    );
                    skipped.push(SkippedCommunity {
                        community_id: community.id,
                        reason: error.to_string(),
                    });
                }
            }
        }

        // sort_by is stable: equal scores keep catalog order
        recommendations.sort_by(|a, b| b.compatibility_score.total_cmp(&a.compatibility_score));
        recommendations.truncate(policy.limit);

        info!(
            user_id = %profile.user_id,
            considered,
            recommended = recommendations.len(),
            skipped = skipped.len(),
            "ranked communities for user"
        );

        Ok(Ranking {
            user_id: profile.user_id.clone(),
            considered,
            recommendations,
            skipped,
        })
    }
}

/// Outcome of ranking every catalog community for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub user_id: UserId,
    pub considered: usize,
    pub recommendations: Vec<CompatibilityResult>,
    pub skipped: Vec<SkippedCommunity>,
}

impl Ranking {
    fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            considered: 0,
            recommendations: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Community omitted from a ranking because its lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCommunity {
    pub community_id: CommunityId,
    pub reason: String,
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("community does not exist: {0}")]
    CommunityNotFound(CommunityId),
    #[error(transparent)]
    Upstream(#[from] StoreError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
