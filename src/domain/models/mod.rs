//! Domain models for journey automation.

pub mod behavior;
pub mod config;
pub mod recommendation;
pub mod stage;
pub mod trigger;

pub use behavior::{
    BehaviorUpdate, Interaction, Language, PageView, Preferences, UserBehavior,
    MAX_ENGAGEMENT_SCORE,
};
pub use config::{Config, EngineConfig, LogFormat, LoggingConfig, RotationPolicy};
pub use recommendation::{Priority, Recommendation, RecommendationKind, RiskLevel, UserInsights};
pub use stage::{JourneyStage, UserJourneyStage, METADATA_COMPLETED_STAGES, METADATA_USER_ID};
pub use trigger::{
    Action, ActionKind, AutomationTrigger, BehavioralCondition, Condition, ConditionKind,
    MilestoneCondition, RawCondition, TemporalCondition,
};
