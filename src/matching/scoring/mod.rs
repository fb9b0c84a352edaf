mod reasoning;
mod rules;

use std::sync::Arc;

use super::config::MatchingConfig;
use super::domain::{Community, CompatibilityResult, UserAssessmentProfile};
use super::focus::CommunityFocus;
use rules::tally_contributions;

/// Stateless scorer applying the matching configuration to a profile.
#[derive(Debug, Clone)]
pub struct CompatibilityScorer {
    config: Arc<MatchingConfig>,
}

impl CompatibilityScorer {
    pub fn new(config: Arc<MatchingConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Score a profile against one community. Never fails; no overlap yields zero.
    pub fn score(
        &self,
        profile: &UserAssessmentProfile,
        community: &Community,
    ) -> CompatibilityResult {
        let fallback = CommunityFocus::default();
        let focus = self.config.focus(&community.slug).unwrap_or(&fallback);

        let tally = tally_contributions(profile, focus, &self.config);
        let compatibility_score = tally.normalized();
        let reasoning =
            reasoning::explain(&community.name, &tally.matching_factors, compatibility_score);

        CompatibilityResult {
            community_id: community.id.clone(),
            community_slug: community.slug.clone(),
            compatibility_score,
            reasoning,
            matching_factors: tally.matching_factors,
            assessment_contributions: tally.contributions,
        }
    }
}

impl Default for CompatibilityScorer {
    fn default() -> Self {
        Self::new(Arc::new(MatchingConfig::standard()))
    }
}
