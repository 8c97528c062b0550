//! User-facing recommendations and admin insights.

use serde::{Deserialize, Serialize};

use super::stage::JourneyStage;

/// What a recommendation points the user at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    /// A product feature
    Feature,
    /// Guides, templates and other reading
    Content,
    /// A concrete next step such as starting a trial
    Action,
}

/// Display priority, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Nice to have
    Low,
    /// Worth showing
    Medium,
    /// Show first
    High,
}

/// A localized recommendation derived from stage and behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Serialized as `type`
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    /// Short heading in the user's language
    pub title: String,
    /// One-sentence explanation
    pub description: String,
    /// Display priority
    pub priority: Priority,
    /// Call-to-action button label
    pub cta: String,
}

/// Churn/engagement risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Engaged and recently active
    Low,
    /// Cooling off
    Medium,
    /// Likely to churn
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Summary of a user's journey for support dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInsights {
    /// Current funnel stage
    pub stage: JourneyStage,
    /// Stored engagement score, 0-100
    pub engagement_score: u8,
    /// Bucket of the stored score
    pub risk_level: RiskLevel,
    /// Localized suggestion
    pub next_best_action: String,
}
