use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::instruments::InstrumentCatalog;

/// Identifier wrapper for platform users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for communities listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommunityId(pub String);

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entry for a peer-support community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub slug: String,
}

/// Raw instrument score as held by the assessment store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedScore {
    pub score: f64,
    pub recorded_at: DateTime<Utc>,
}

impl RecordedScore {
    /// Whether this score should replace `existing`. Ties go to the later arrival.
    pub fn supersedes(&self, existing: &RecordedScore) -> bool {
        self.recorded_at >= existing.recorded_at
    }
}

/// One instrument's classified outcome for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub instrument: String,
    pub score: f64,
    pub severity: String,
    pub recorded_at: DateTime<Utc>,
}

/// Latest assessment result per instrument for a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAssessmentProfile {
    pub user_id: UserId,
    pub assessments: BTreeMap<String, AssessmentResult>,
}

impl UserAssessmentProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            assessments: BTreeMap::new(),
        }
    }

    /// Build a profile from raw store scores, classifying each against the catalog.
    ///
    /// Entries for unknown instruments, non-finite scores, and scores outside the
    /// instrument range are dropped: they count as "not assessed".
    pub fn from_recorded(
        user_id: UserId,
        recorded: &BTreeMap<String, RecordedScore>,
        catalog: &InstrumentCatalog,
    ) -> Self {
        let mut profile = Self::new(user_id);

        for (key, entry) in recorded {
            let Some(instrument) = catalog.get(key) else {
                tracing::debug!(user_id = %profile.user_id, instrument = %key, "ignoring unconfigured instrument");
                continue;
            };

            match instrument.classify(entry.score) {
                Some(band) => {
                    profile.assessments.insert(
                        key.clone(),
                        AssessmentResult {
                            instrument: key.clone(),
                            score: entry.score,
                            severity: band.label.clone(),
                            recorded_at: entry.recorded_at,
                        },
                    );
                }
                None => {
                    tracing::debug!(
                        user_id = %profile.user_id,
                        instrument = %key,
                        score = entry.score,
                        "ignoring score outside instrument range"
                    );
                }
            }
        }

        profile
    }

    pub fn is_empty(&self) -> bool {
        self.assessments.is_empty()
    }
}

/// Per-instrument detail explaining how a score was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssessmentContribution {
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Scorer output for one (user, community) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub community_id: CommunityId,
    pub community_slug: String,
    pub compatibility_score: f64,
    pub reasoning: String,
    pub matching_factors: Vec<String>,
    pub assessment_contributions: BTreeMap<String, AssessmentContribution>,
}

impl CompatibilityResult {
    pub fn percentage(&self) -> u8 {
        (self.compatibility_score * 100.0).round().clamp(0.0, 100.0) as u8
    }
}
