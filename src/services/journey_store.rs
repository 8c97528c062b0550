//! Per-user behavior and stage stores.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::models::{BehaviorUpdate, UserBehavior, UserJourneyStage, METADATA_USER_ID};

/// Behavior records keyed by user id.
#[derive(Debug)]
pub struct BehaviorStore {
    records: HashMap<String, UserBehavior>,
    max_page_views: usize,
    max_interactions: usize,
}

impl BehaviorStore {
    /// Empty store; histories are trimmed to the given bounds on every merge.
    pub fn new(max_page_views: usize, max_interactions: usize) -> Self {
        Self {
            records: HashMap::new(),
            max_page_views,
            max_interactions,
        }
    }

    /// Merge `update` into the user's record, creating it on first sight.
    pub fn record(
        &mut self,
        user_id: &str,
        update: BehaviorUpdate,
        now: DateTime<Utc>,
    ) -> &mut UserBehavior {
        let behavior = self
            .records
            .entry(user_id.to_string())
            .or_insert_with(|| UserBehavior::new(now));
        behavior.merge(update, now, self.max_page_views, self.max_interactions);
        behavior
    }

    /// Behavior for `user_id`.
    pub fn get(&self, user_id: &str) -> Option<&UserBehavior> {
        self.records.get(user_id)
    }

    /// Number of users with a behavior record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No users recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Current stage per user. No history is kept.
#[derive(Debug, Default)]
pub struct StageStore {
    records: HashMap<String, UserJourneyStage>,
}

impl StageStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the user's stage, stamping `userId` into its metadata.
    pub fn record(&mut self, user_id: &str, mut stage: UserJourneyStage) -> &UserJourneyStage {
        stage
            .metadata
            .insert(METADATA_USER_ID.to_string(), Value::String(user_id.to_string()));
        self.records.insert(user_id.to_string(), stage);
        &self.records[user_id]
    }

    /// Current stage for `user_id`.
    pub fn get(&self, user_id: &str) -> Option<&UserJourneyStage> {
        self.records.get(user_id)
    }

    /// Number of users with a stage.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No stages recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
