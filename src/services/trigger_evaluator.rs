//! Condition evaluation.
//!
//! A trigger passes when every condition holds. Behavioral and temporal
//! conditions are plain facts over the current records; milestone
//! conditions also consult the user's fired-set so they hold at most once.
//! Unknown keys never hold.

use chrono::{DateTime, Utc};

use crate::domain::models::{
    AutomationTrigger, BehavioralCondition, Condition, JourneyStage, MilestoneCondition,
    TemporalCondition, UserBehavior, UserJourneyStage,
};
use crate::services::fire_guard::FireGuard;

/// Fired-set owner used when a stage record carries no `userId`.
pub const DEFAULT_USER: &str = "default_user";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Snapshot of one user's state for a single evaluation pass.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Behavior record being evaluated
    pub behavior: &'a UserBehavior,
    /// Stage record; temporal and milestone conditions fail without one
    pub stage: Option<&'a UserJourneyStage>,
    /// Fired-set lookup for milestones
    pub guard: &'a FireGuard,
    /// Evaluation instant
    pub now: DateTime<Utc>,
}

/// Fractional days elapsed between `since` and `now`.
pub fn days_between(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - since).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Stateless condition checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerEvaluator;

impl TriggerEvaluator {
    /// New evaluator
    pub fn new() -> Self {
        Self
    }

    /// AND over all conditions; an empty list passes.
    pub fn should_fire(&self, trigger: &AutomationTrigger, ctx: &EvaluationContext<'_>) -> bool {
        trigger
            .conditions
            .iter()
            .all(|condition| self.condition_holds(condition, ctx))
    }

    /// Check a single condition against the snapshot.
    pub fn condition_holds(&self, condition: &Condition, ctx: &EvaluationContext<'_>) -> bool {
        match condition {
            Condition::Behavioral(c) => Self::behavioral(c, ctx),
            Condition::Temporal(c) => Self::temporal(c, ctx),
            Condition::Milestone(c) => Self::milestone(c, ctx),
        }
    }

    fn behavioral(condition: &BehavioralCondition, ctx: &EvaluationContext<'_>) -> bool {
        let behavior = ctx.behavior;
        match condition {
            BehavioralCondition::TimeOnPage { min_secs } => behavior
                .last_page_view()
                .is_some_and(|view| view.duration >= *min_secs),
            BehavioralCondition::EngagementScore { min } => {
                f64::from(behavior.engagement_score) >= *min
            }
            BehavioralCondition::PageVisit { page } => {
                behavior.page_views.iter().any(|view| &view.page == page)
            }
            BehavioralCondition::DaysSinceLastLogin { days } => {
                days_between(behavior.last_activity, ctx.now) >= *days
            }
            BehavioralCondition::Interaction { action } => behavior
                .interactions
                .iter()
                .any(|interaction| &interaction.action == action),
            BehavioralCondition::Unrecognized { key, .. } => {
                tracing::debug!(condition = %key, "Unrecognized behavioral condition");
                false
            }
        }
    }

    fn temporal(condition: &TemporalCondition, ctx: &EvaluationContext<'_>) -> bool {
        let Some(stage) = ctx.stage else {
            return false;
        };
        match condition {
            TemporalCondition::DaysSinceSignup { days } => {
                days_between(stage.timestamp, ctx.now) >= *days
            }
            TemporalCondition::Unrecognized { key, .. } => {
                tracing::debug!(condition = %key, "Unrecognized temporal condition");
                false
            }
        }
    }

    fn milestone(condition: &MilestoneCondition, ctx: &EvaluationContext<'_>) -> bool {
        let Some(stage) = ctx.stage else {
            return false;
        };
        let user_id = stage.metadata_user_id().unwrap_or(DEFAULT_USER);
        let not_yet_fired = || !ctx.guard.has_fired(user_id, &condition.fired_key());

        match condition {
            MilestoneCondition::TrialStarted => {
                stage.stage == JourneyStage::Onboarding && not_yet_fired()
            }
            MilestoneCondition::FirstPrdCreated => {
                stage.stage == JourneyStage::Adoption && stage.has_completed("prd") && not_yet_fired()
            }
            MilestoneCondition::FirstPrototypeShipped => {
                stage.stage == JourneyStage::Retention
                    && stage.has_completed("prototype")
                    && not_yet_fired()
            }
            MilestoneCondition::Custom { value, .. } => {
                value.as_bool() == Some(true) && not_yet_fired()
            }
        }
    }
}
