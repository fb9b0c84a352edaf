use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::matching::config::MatchingConfig;
use crate::matching::domain::{
    Community, CommunityId, RecordedScore, UserAssessmentProfile, UserId,
};
use crate::matching::instruments::InstrumentCatalog;
use crate::matching::memory::{InMemoryAssessmentStore, InMemoryCommunityCatalog};
use crate::matching::repository::{AssessmentStore, CommunityCatalog, StoreError};
use crate::matching::service::CommunityMatchingService;

pub(super) fn recorded_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub(super) fn user() -> UserId {
    UserId("user-123".to_string())
}

pub(super) fn community(id: &str, name: &str, slug: &str) -> Community {
    Community {
        id: CommunityId(id.to_string()),
        name: name.to_string(),
        slug: slug.to_string(),
    }
}

pub(super) fn raw_scores(scores: &[(&str, f64)]) -> BTreeMap<String, RecordedScore> {
    scores
        .iter()
        .map(|(key, score)| {
            (
                key.to_string(),
                RecordedScore {
                    score: *score,
                    recorded_at: recorded_at(),
                },
            )
        })
        .collect()
}

pub(super) fn profile(scores: &[(&str, f64)]) -> UserAssessmentProfile {
    UserAssessmentProfile::from_recorded(
        user(),
        &raw_scores(scores),
        &InstrumentCatalog::standard(),
    )
}

/// Catalog order used by ranking tests; ties resolve in this order.
pub(super) fn catalog_communities() -> Vec<Community> {
    [
        ("c-general", "General Support", "general-support"),
        ("c-wellness", "Mental Wellness", "mental-wellness"),
        ("c-therapy", "Therapy Discussion", "therapy-discussion"),
        ("c-depression", "Depression Support Network", "depression-support"),
        ("c-anxiety", "Anxiety Support Circle", "anxiety-support"),
        ("c-panic", "Panic Disorder Peers", "panic-disorder"),
        ("c-social", "Social Anxiety Collective", "social-anxiety"),
        ("c-ptsd", "PTSD Support Network", "ptsd-support"),
        ("c-trauma", "Trauma Recovery", "trauma-recovery"),
        ("c-overlap", "Anxiety & Depression", "anxiety-depression"),
        ("c-recovery", "Recovery Journey", "recovery-journey"),
        ("c-mindful", "Mindfulness & Meditation", "mindfulness-meditation"),
        ("c-coping", "Coping Strategies", "coping-strategies"),
        ("c-veterans", "Veterans Support", "veterans-support"),
        ("c-complex", "Complex Trauma", "complex-trauma"),
        ("c-healing", "Healing Journey", "healing-journey"),
        ("c-books", "Book Club", "book-club"),
    ]
    .iter()
    .map(|(id, name, slug)| community(id, name, slug))
    .collect()
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn seeded_store(scores: &[(&str, f64)]) -> InMemoryAssessmentStore {
    let store = InMemoryAssessmentStore::default();
    store
        .record_all(&user(), raw_scores(scores))
        .expect("seed store");
    store
}

pub(super) fn matching_service<A, C>(
    assessments: A,
    catalog: C,
    config: MatchingConfig,
) -> CommunityMatchingService<A, C>
where
    A: AssessmentStore + 'static,
    C: CommunityCatalog + 'static,
{
    CommunityMatchingService::new(Arc::new(assessments), Arc::new(catalog), Arc::new(config))
}

pub(super) fn standard_service(
    scores: &[(&str, f64)],
) -> CommunityMatchingService<InMemoryAssessmentStore, InMemoryCommunityCatalog> {
    matching_service(
        seeded_store(scores),
        InMemoryCommunityCatalog::new(catalog_communities()),
        MatchingConfig::standard(),
    )
}

/// Catalog whose point lookups fail for selected ids while listing still works.
pub(super) struct FlakyCatalog {
    pub(super) inner: InMemoryCommunityCatalog,
    pub(super) failing: BTreeSet<CommunityId>,
}

impl FlakyCatalog {
    pub(super) fn failing_on(ids: &[&str]) -> Self {
        Self {
            inner: InMemoryCommunityCatalog::new(catalog_communities()),
            failing: ids.iter().map(|id| CommunityId(id.to_string())).collect(),
        }
    }
}

impl CommunityCatalog for FlakyCatalog {
    fn get_community(&self, id: &CommunityId) -> Result<Option<Community>, StoreError> {
        if self.failing.contains(id) {
            return Err(StoreError::Unavailable(format!("lookup timed out for {id}")));
        }
        self.inner.get_community(id)
    }

    fn list_communities(&self) -> Result<Vec<Community>, StoreError> {
        self.inner.list_communities()
    }
}

/// Catalog that lists a community it can no longer resolve.
pub(super) struct StaleCatalog {
    pub(super) inner: InMemoryCommunityCatalog,
    pub(super) listed: Vec<Community>,
}

impl CommunityCatalog for StaleCatalog {
    fn get_community(&self, id: &CommunityId) -> Result<Option<Community>, StoreError> {
        self.inner.get_community(id)
    }

    fn list_communities(&self) -> Result<Vec<Community>, StoreError> {
        Ok(self.listed.clone())
    }
}

#[derive(Default)]
pub(super) struct UnavailableAssessments;

impl AssessmentStore for UnavailableAssessments {
    fn latest_assessments(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<BTreeMap<String, RecordedScore>>, StoreError> {
        Err(StoreError::Unavailable("assessment database offline".to_string()))
    }
}
