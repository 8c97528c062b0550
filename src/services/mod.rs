//! Engine services and the `JourneyEngine` facade that owns them.

pub mod automation_dispatcher;
pub mod fire_guard;
pub mod journey_engine;
pub mod journey_store;
pub mod recommendations;
pub mod trigger_catalog;
pub mod trigger_evaluator;

pub use automation_dispatcher::{AutomationDispatcher, DispatchReport};
pub use fire_guard::{FireGuard, GuardDecision};
pub use journey_engine::{EvaluationOutcome, JourneyEngine};
pub use journey_store::{BehaviorStore, StageStore};
pub use trigger_catalog::{builtin_triggers, TriggerCatalog};
pub use trigger_evaluator::{days_between, EvaluationContext, TriggerEvaluator, DEFAULT_USER};
