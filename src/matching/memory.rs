use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Community, CommunityId, RecordedScore, UserId};
use super::repository::{
    AssessmentStore, CommunityCatalog, RecommendationBatch, RecommendationSink, SinkError,
    StoreError,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
}

/// Assessment store keeping the latest score per (user, instrument).
#[derive(Default, Clone)]
pub struct InMemoryAssessmentStore {
    records: Arc<Mutex<HashMap<UserId, BTreeMap<String, RecordedScore>>>>,
}

impl InMemoryAssessmentStore {
    /// Record a score. An older `recorded_at` never replaces a newer one.
    pub fn record(
        &self,
        user_id: UserId,
        instrument: impl Into<String>,
        score: RecordedScore,
    ) -> Result<(), StoreError> {
        let mut guard = lock(&self.records)?;
        let entries = guard.entry(user_id).or_default();
        let instrument = instrument.into();

        let replace = entries
            .get(&instrument)
            .map_or(true, |existing| score.supersedes(existing));
        if replace {
            entries.insert(instrument, score);
        }
        Ok(())
    }

    pub fn record_all(
        &self,
        user_id: &UserId,
        scores: BTreeMap<String, RecordedScore>,
    ) -> Result<(), StoreError> {
        for (instrument, score) in scores {
            self.record(user_id.clone(), instrument, score)?;
        }
        Ok(())
    }

    pub fn users(&self) -> Result<Vec<UserId>, StoreError> {
        let guard = lock(&self.records)?;
        let mut users: Vec<_> = guard.keys().cloned().collect();
        users.sort();
        Ok(users)
    }
}

impl AssessmentStore for InMemoryAssessmentStore {
    fn latest_assessments(
        &self,
        user_id: &UserId,
    ) -> Result<Option<BTreeMap<String, RecordedScore>>, StoreError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(user_id).cloned())
    }
}

/// Catalog preserving insertion order.
#[derive(Default, Clone)]
pub struct InMemoryCommunityCatalog {
    communities: Arc<Mutex<Vec<Community>>>,
}

impl InMemoryCommunityCatalog {
    pub fn new(communities: Vec<Community>) -> Self {
        Self {
            communities: Arc::new(Mutex::new(communities)),
        }
    }

    /// Add a community, replacing any entry with the same id in place.
    pub fn insert(&self, community: Community) -> Result<(), StoreError> {
        let mut guard = lock(&self.communities)?;
        match guard.iter_mut().find(|existing| existing.id == community.id) {
            Some(existing) => *existing = community,
            None => guard.push(community),
        }
        Ok(())
    }
}

impl CommunityCatalog for InMemoryCommunityCatalog {
    fn get_community(&self, id: &CommunityId) -> Result<Option<Community>, StoreError> {
        let guard = lock(&self.communities)?;
        Ok(guard.iter().find(|community| &community.id == id).cloned())
    }

    fn list_communities(&self) -> Result<Vec<Community>, StoreError> {
        let guard = lock(&self.communities)?;
        Ok(guard.clone())
    }
}

/// Sink collecting published batches, for demos and tests.
#[derive(Default, Clone)]
pub struct InMemoryRecommendationSink {
    batches: Arc<Mutex<Vec<RecommendationBatch>>>,
}

impl RecommendationSink for InMemoryRecommendationSink {
    fn publish(&self, batch: RecommendationBatch) -> Result<(), SinkError> {
        let mut guard = self
            .batches
            .lock()
            .map_err(|_| SinkError::Transport("in-memory sink lock poisoned".to_string()))?;
        guard.push(batch);
        Ok(())
    }
}

impl InMemoryRecommendationSink {
    pub fn batches(&self) -> Vec<RecommendationBatch> {
        self.batches
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}
