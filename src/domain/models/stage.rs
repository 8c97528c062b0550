//! Journey stage records.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key the engine injects with the owning user's id.
pub const METADATA_USER_ID: &str = "userId";

/// Metadata key listing the app stages a user has completed.
pub const METADATA_COMPLETED_STAGES: &str = "completedStages";

/// The eight named journey stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStage {
    /// First visits
    Awareness,
    /// Comparing options
    Consideration,
    /// Choosing a plan
    Decision,
    /// Trial started
    Onboarding,
    /// Using core features
    Adoption,
    /// Returning regularly
    Retention,
    /// Growing usage or seats
    Expansion,
    /// Recommending the product
    Advocacy,
}

impl JourneyStage {
    /// All stages in funnel order.
    pub const ALL: [Self; 8] = [
        Self::Awareness,
        Self::Consideration,
        Self::Decision,
        Self::Onboarding,
        Self::Adoption,
        Self::Retention,
        Self::Expansion,
        Self::Advocacy,
    ];

    /// Wire name, e.g. `onboarding`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Awareness => "awareness",
            Self::Consideration => "consideration",
            Self::Decision => "decision",
            Self::Onboarding => "onboarding",
            Self::Adoption => "adoption",
            Self::Retention => "retention",
            Self::Expansion => "expansion",
            Self::Advocacy => "advocacy",
        }
    }
}

impl std::fmt::Display for JourneyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JourneyStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("unknown journey stage: {s}"))
    }
}

/// Current stage record for a user. Replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserJourneyStage {
    /// Funnel stage
    pub stage: JourneyStage,
    /// Optional finer-grained label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substage: Option<String>,
    /// When the stage was entered; temporal conditions count from here
    pub timestamp: DateTime<Utc>,
    /// Free-form; see [`METADATA_USER_ID`] and [`METADATA_COMPLETED_STAGES`]
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl UserJourneyStage {
    /// Stage entered at `timestamp` with empty metadata.
    pub fn new(stage: JourneyStage, timestamp: DateTime<Utc>) -> Self {
        Self {
            stage,
            substage: None,
            timestamp,
            metadata: HashMap::new(),
        }
    }

    /// Set the substage.
    pub fn with_substage(mut self, substage: impl Into<String>) -> Self {
        self.substage = Some(substage.into());
        self
    }

    /// Insert one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Convenience for setting `completedStages`.
    pub fn with_completed_stages<I, S>(self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = stages
            .into_iter()
            .map(|s| Value::String(s.into()))
            .collect();
        self.with_metadata(METADATA_COMPLETED_STAGES, Value::Array(list))
    }

    /// User id stored in metadata, if any.
    pub fn metadata_user_id(&self) -> Option<&str> {
        self.metadata.get(METADATA_USER_ID).and_then(Value::as_str)
    }

    /// Whether `completedStages` contains `app_stage`.
    pub fn has_completed(&self, app_stage: &str) -> bool {
        self.metadata
            .get(METADATA_COMPLETED_STAGES)
            .and_then(Value::as_array)
            .is_some_and(|stages| stages.iter().any(|s| s.as_str() == Some(app_stage)))
    }
}
