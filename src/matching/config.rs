use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::focus::{standard_focus_map, CommunityFocus, SpecificityFactors};
use super::instruments::InstrumentCatalog;

/// Cutoff and size limit applied when ranking communities for a user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingPolicy {
    /// Results scoring at or below this value are dropped.
    pub min_score: f64,
    pub limit: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            min_score: 0.2,
            limit: 10,
        }
    }
}

/// Scoring configuration: instruments, community focus, and ranking policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub instruments: InstrumentCatalog,
    pub communities: BTreeMap<String, CommunityFocus>,
    #[serde(default)]
    pub specificity: SpecificityFactors,
    #[serde(default)]
    pub ranking: RankingPolicy,
}

impl MatchingConfig {
    pub fn standard() -> Self {
        Self {
            instruments: InstrumentCatalog::standard(),
            communities: standard_focus_map(),
            specificity: SpecificityFactors::default(),
            ranking: RankingPolicy::default(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MatchingConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MatchingConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn focus(&self, slug: &str) -> Option<&CommunityFocus> {
        self.communities.get(slug)
    }

    pub fn validate(&self) -> Result<(), MatchingConfigError> {
        self.instruments.validate()?;

        for (slug, focus) in &self.communities {
            if let Some(unknown) = focus
                .instruments
                .iter()
                .find(|key| !self.instruments.contains(key.as_str()))
            {
                return Err(MatchingConfigError::Invalid(format!(
                    "community '{slug}' targets unknown instrument '{unknown}'"
                )));
            }
        }

        let factors = self.specificity;
        if [factors.specific, factors.general, factors.neutral]
            .iter()
            .any(|factor| !(factor.is_finite() && *factor > 0.0))
        {
            return Err(MatchingConfigError::Invalid(
                "specificity factors must be positive".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.ranking.min_score) {
            return Err(MatchingConfigError::Invalid(format!(
                "ranking min_score {} must be in [0, 1)",
                self.ranking.min_score
            )));
        }

        Ok(())
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchingConfigError {
    #[error("failed to read matching config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid matching config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid matching config: {0}")]
    Invalid(String),
}
