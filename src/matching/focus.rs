use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// How narrowly a community targets the concerns it is relevant to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specificity {
    Specific,
    General,
    #[default]
    Neutral,
}

/// Instruments a community is a match target for, plus its specificity class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommunityFocus {
    pub instruments: BTreeSet<String>,
    #[serde(default)]
    pub specificity: Specificity,
}

impl CommunityFocus {
    pub fn new<I, S>(specificity: Specificity, instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            instruments: instruments.into_iter().map(Into::into).collect(),
            specificity,
        }
    }

    pub fn targets(&self, instrument: &str) -> bool {
        self.instruments.contains(instrument)
    }
}

/// Multipliers applied per specificity class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecificityFactors {
    pub specific: f64,
    pub general: f64,
    pub neutral: f64,
}

impl Default for SpecificityFactors {
    fn default() -> Self {
        Self {
            specific: 1.2,
            general: 0.8,
            neutral: 1.0,
        }
    }
}

impl SpecificityFactors {
    pub fn factor_for(&self, specificity: Specificity) -> f64 {
        match specificity {
            Specificity::Specific => self.specific,
            Specificity::General => self.general,
            Specificity::Neutral => self.neutral,
        }
    }
}

/// Default focus map keyed by community slug.
pub fn standard_focus_map() -> BTreeMap<String, CommunityFocus> {
    use Specificity::{General, Neutral, Specific};

    let entries: [(&str, Specificity, &[&str]); 16] = [
        ("general-support", General, &["phq9"]),
        ("mental-wellness", General, &["phq9"]),
        ("therapy-discussion", General, &["phq9", "ptsd5"]),
        ("depression-support", Specific, &["phq9"]),
        ("anxiety-support", Specific, &["gad7"]),
        ("panic-disorder", Specific, &["gad7"]),
        ("social-anxiety", Specific, &["gad7"]),
        ("ptsd-support", Specific, &["ptsd5"]),
        ("trauma-recovery", Specific, &["ptsd5"]),
        ("anxiety-depression", Neutral, &["phq9", "gad7"]),
        ("recovery-journey", Neutral, &["phq9"]),
        ("mindfulness-meditation", Neutral, &["gad7"]),
        ("coping-strategies", Neutral, &["gad7"]),
        ("veterans-support", Neutral, &["ptsd5"]),
        ("complex-trauma", Neutral, &["ptsd5"]),
        ("healing-journey", Neutral, &["ptsd5"]),
    ];

    entries
        .into_iter()
        .map(|(slug, specificity, instruments)| {
            (
                slug.to_string(),
                CommunityFocus::new(specificity, instruments.iter().copied()),
            )
        })
        .collect()
}
