//! Journey automation engine.
//!
//! `JourneyEngine` owns every piece of per-user state (behavior, stage,
//! fired-set, throttle map) plus the listener list, and shares a read-only
//! trigger catalog. Each write re-evaluates the whole catalog for that
//! user synchronously before returning.
//!
//! Hosts that need shared access wrap the engine in a lock; one engine per
//! process is the expected deployment, but tests can build as many
//! isolated engines as they like.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::errors::ListenerError;
use crate::domain::models::{
    BehaviorUpdate, EngineConfig, Recommendation, RiskLevel, UserBehavior, UserInsights,
    UserJourneyStage,
};
use crate::domain::ports::{AutomationEvent, AutomationListener, Clock, ListenerId, SystemClock};
use crate::services::automation_dispatcher::AutomationDispatcher;
use crate::services::fire_guard::{FireGuard, GuardDecision};
use crate::services::journey_store::{BehaviorStore, StageStore};
use crate::services::recommendations;
use crate::services::trigger_catalog::TriggerCatalog;
use crate::services::trigger_evaluator::{EvaluationContext, TriggerEvaluator};

/// Which triggers fired or were throttled in one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// Trigger ids whose actions were dispatched, in catalog order
    pub fired: Vec<String>,
    /// Trigger ids whose conditions held but that fired inside the window
    pub throttled: Vec<String>,
}

impl EvaluationOutcome {
    /// Whether `trigger_id` fired in this pass.
    pub fn fired(&self, trigger_id: &str) -> bool {
        self.fired.iter().any(|id| id == trigger_id)
    }

    /// Nothing matched.
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty() && self.throttled.is_empty()
    }
}

/// Per-user journey state plus the trigger evaluation loop.
///
/// All writes go through `&mut self` and evaluate synchronously, so the
/// returned [`EvaluationOutcome`] already reflects dispatched events:
///
/// ```
/// use std::sync::Arc;
/// use brainsait_journey::{BehaviorUpdate, JourneyEngine, ManualClock};
///
/// let clock = Arc::new(ManualClock::default());
/// let mut engine = JourneyEngine::default().with_clock(clock);
/// let outcome = engine.record_behavior("u1", BehaviorUpdate::new().with_engagement_score(10));
/// assert!(outcome.fired.is_empty());
/// assert!(engine.behavior("u1").is_some());
/// ```
pub struct JourneyEngine {
    config: EngineConfig,
    catalog: Arc<TriggerCatalog>,
    clock: Arc<dyn Clock>,
    evaluator: TriggerEvaluator,
    behaviors: BehaviorStore,
    stages: StageStore,
    guard: FireGuard,
    dispatcher: AutomationDispatcher,
}

impl JourneyEngine {
    /// Engine with the built-in catalog and the system clock.
    pub fn new(config: EngineConfig) -> Self {
        let window_secs = i64::try_from(config.throttle_window_secs).unwrap_or(i64::MAX);
        let window = Duration::try_seconds(window_secs).unwrap_or(Duration::MAX);
        Self {
            behaviors: BehaviorStore::new(config.max_page_views, config.max_interactions),
            stages: StageStore::new(),
            guard: FireGuard::new(window),
            dispatcher: AutomationDispatcher::new(),
            evaluator: TriggerEvaluator::new(),
            catalog: Arc::new(TriggerCatalog::builtin()),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the trigger catalog.
    pub fn with_catalog(mut self, catalog: Arc<TriggerCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the time source. Tests and replays use a `ManualClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Triggers this engine evaluates.
    pub fn catalog(&self) -> &TriggerCatalog {
        &self.catalog
    }

    /// Merge a behavior update, then evaluate the user's triggers.
    #[tracing::instrument(skip(self, update), fields(page_views = update.page_views.len()))]
    pub fn record_behavior(&mut self, user_id: &str, update: BehaviorUpdate) -> EvaluationOutcome {
        let now = self.clock.now();
        let score_supplied = update.engagement_score.is_some();
        let behavior = self.behaviors.record(user_id, update, now);

        if self.config.derive_engagement_score && !score_supplied {
            behavior.engagement_score = recommendations::calculate_engagement_score(behavior, now);
        }

        self.evaluate(user_id)
    }

    /// Replace the user's stage, then evaluate the user's triggers.
    #[tracing::instrument(skip(self, stage), fields(stage = %stage.stage))]
    pub fn record_stage(&mut self, user_id: &str, stage: UserJourneyStage) -> EvaluationOutcome {
        self.stages.record(user_id, stage);
        self.evaluate(user_id)
    }

    /// Run every catalog trigger for one user. No-op without a behavior record.
    ///
    /// Triggers whose conditions all hold are passed through the throttle;
    /// those allowed to fire dispatch one event per action to every
    /// listener before the next trigger is considered.
    pub fn evaluate(&mut self, user_id: &str) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome::default();
        let Some(behavior) = self.behaviors.get(user_id) else {
            tracing::trace!(user_id, "No behavior recorded; skipping evaluation");
            return outcome;
        };
        let stage = self.stages.get(user_id);
        let now = self.clock.now();

        for trigger in self.catalog.iter() {
            let ctx = EvaluationContext {
                behavior,
                stage,
                guard: &self.guard,
                now,
            };
            if !self.evaluator.should_fire(trigger, &ctx) {
                continue;
            }

            match self.guard.try_fire(user_id, trigger, now) {
                GuardDecision::Throttled { remaining } => {
                    tracing::debug!(
                        user_id,
                        trigger_id = %trigger.id,
                        remaining_secs = remaining.num_seconds(),
                        "Trigger throttled"
                    );
                    outcome.throttled.push(trigger.id.clone());
                }
                GuardDecision::Fire => {
                    let report = self.dispatcher.dispatch(trigger, user_id, behavior, now);
                    tracing::info!(
                        user_id,
                        trigger_id = %trigger.id,
                        trigger_name = %trigger.name,
                        events = report.events,
                        failed = report.failed,
                        "Automation trigger fired"
                    );
                    outcome.fired.push(trigger.id.clone());
                }
            }
        }

        outcome
    }

    /// Register a listener for every future automation event.
    pub fn subscribe(&mut self, listener: Arc<dyn AutomationListener>) -> ListenerId {
        self.dispatcher.subscribe(listener)
    }

    /// Register a closure listener.
    pub fn subscribe_fn<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&AutomationEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.dispatcher.subscribe_fn(listener)
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Empty unless both behavior and stage are recorded.
    pub fn get_recommendations(&self, user_id: &str) -> Vec<Recommendation> {
        match (self.behaviors.get(user_id), self.stages.get(user_id)) {
            (Some(behavior), Some(stage)) => recommendations::recommendations_for(behavior, stage),
            _ => Vec::new(),
        }
    }

    /// Stage, score, risk and next best action. `None` unless both
    /// behavior and stage are recorded.
    pub fn get_user_insights(&self, user_id: &str) -> Option<UserInsights> {
        let behavior = self.behaviors.get(user_id)?;
        let stage = self.stages.get(user_id)?;
        Some(recommendations::insights_for(behavior, stage, self.clock.now()))
    }

    /// Churn risk from engagement and inactivity.
    pub fn churn_risk(&self, user_id: &str) -> Option<RiskLevel> {
        self.behaviors
            .get(user_id)
            .map(|behavior| recommendations::churn_risk(behavior, self.clock.now()))
    }

    /// Whether a trigger id or milestone key is in the user's fired-set.
    pub fn has_fired(&self, user_id: &str, trigger_id: &str) -> bool {
        self.guard.has_fired(user_id, trigger_id)
    }

    /// Clear the user's fired-set and throttle entries. Records are kept.
    pub fn reset_user_state(&mut self, user_id: &str) {
        self.guard.reset_user(user_id);
        tracing::info!(user_id, "Automation state reset");
    }

    /// Drop throttle entries whose window has passed. Returns how many.
    pub fn prune_expired_throttles(&mut self) -> usize {
        let pruned = self.guard.prune_expired(self.clock.now());
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned expired throttle entries");
        }
        pruned
    }

    /// Stored behavior record.
    pub fn behavior(&self, user_id: &str) -> Option<&UserBehavior> {
        self.behaviors.get(user_id)
    }

    /// Stored stage record.
    pub fn stage(&self, user_id: &str) -> Option<&UserJourneyStage> {
        self.stages.get(user_id)
    }

    /// Number of subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.dispatcher.listener_count()
    }

    /// Drop all per-user state and listeners.
    pub fn dispose(&mut self) {
        tracing::info!(
            users = self.behaviors.len(),
            listeners = self.dispatcher.listener_count(),
            "Disposing journey engine"
        );
        self.behaviors.clear();
        self.stages.clear();
        self.guard.clear();
        self.dispatcher.clear();
    }
}

impl Default for JourneyEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for JourneyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JourneyEngine")
            .field("triggers", &self.catalog.len())
            .field("users", &self.behaviors.len())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
