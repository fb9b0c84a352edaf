use std::collections::BTreeMap;

use super::super::config::MatchingConfig;
use super::super::domain::{AssessmentContribution, UserAssessmentProfile};
use super::super::focus::CommunityFocus;

pub(crate) struct ScoreTally {
    pub weighted_sum: f64,
    pub weight_total: f64,
    pub matching_factors: Vec<String>,
    pub contributions: BTreeMap<String, AssessmentContribution>,
}

impl ScoreTally {
    /// Weighted average of contributions, clamped to [0, 1]. Zero when nothing overlapped.
    pub fn normalized(&self) -> f64 {
        if self.weight_total > 0.0 {
            (self.weighted_sum / self.weight_total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Walk configured instruments in order and accumulate those the community targets.
pub(crate) fn tally_contributions(
    profile: &UserAssessmentProfile,
    focus: &CommunityFocus,
    config: &MatchingConfig,
) -> ScoreTally {
    let mut tally = ScoreTally {
        weighted_sum: 0.0,
        weight_total: 0.0,
        matching_factors: Vec::new(),
        contributions: BTreeMap::new(),
    };

    let specificity_factor = config.specificity.factor_for(focus.specificity);

    for instrument in config.instruments.iter() {
        let Some(result) = profile.assessments.get(&instrument.key) else {
            continue;
        };
        if !focus.targets(&instrument.key) {
            continue;
        }
        let Some(band) = instrument.classify(result.score) else {
            continue;
        };

        let contribution = band.multiplier * specificity_factor * instrument.weight;

        tally.weighted_sum += contribution;
        tally.weight_total += instrument.weight;
        tally
            .matching_factors
            .push(instrument.factor_label(&band.label));
        tally.contributions.insert(
            instrument.key.clone(),
            AssessmentContribution {
                score: result.score,
                weight: instrument.weight,
                contribution,
            },
        );
    }

    tally
}
