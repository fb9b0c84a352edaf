//! Assessment-driven community matching.
//!
//! Screening results (PHQ-9, GAD-7, PTSD-5, ...) are classified into severity
//! bands and weighed against each community's declared focus to produce a
//! normalized compatibility score, the reasoning behind it, and a ranked list
//! of recommendations per user.

pub mod config;
pub mod domain;
pub mod focus;
pub mod import;
pub mod instruments;
pub mod memory;
pub mod refresh;
pub mod repository;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::{MatchingConfig, MatchingConfigError, RankingPolicy};
pub use domain::{
    AssessmentContribution, AssessmentResult, Community, CommunityId, CompatibilityResult,
    RecordedScore, UserAssessmentProfile, UserId,
};
pub use focus::{CommunityFocus, Specificity, SpecificityFactors};
pub use import::{
    scores_from_pre_assessment, AssessmentCsvImporter, CommunityCsvImporter, ImportError,
};
pub use instruments::{Instrument, InstrumentCatalog, ScoreRange, SeverityBand};
pub use memory::{InMemoryAssessmentStore, InMemoryCommunityCatalog, InMemoryRecommendationSink};
pub use refresh::AssessmentChangeHandler;
pub use repository::{
    AssessmentStore, CommunityCatalog, RecommendationBatch, RecommendationSink, SinkError,
    StoreError,
};
pub use scoring::CompatibilityScorer;
pub use service::{CommunityMatchingService, MatchingError, Ranking, SkippedCommunity};
