//! BrainSAIT journey automation engine
//!
//! Tracks per-user behavior and lifecycle stage, evaluates a catalog of
//! automation triggers on every update, and notifies subscribed listeners
//! when a trigger fires. Also produces stage-based recommendations and
//! engagement insights.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the clock/listener ports
//! - **Service Layer** (`services`): stores, evaluator, guard, dispatcher
//!   and the `JourneyEngine` facade
//! - **Adapters** (`adapters`): broadcast fan-out for async consumers
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): catalog inspection and scripted replays
//!
//! # Example
//!
//! ```
//! use brainsait_journey::{BehaviorUpdate, EngineConfig, JourneyEngine, PageView};
//!
//! let mut engine = JourneyEngine::new(EngineConfig::default());
//! engine.subscribe_fn(|event| {
//!     println!("{} -> {}", event.trigger_id, event.action.kind);
//!     Ok(())
//! });
//!
//! let now = chrono::Utc::now();
//! let outcome = engine.record_behavior(
//!     "user-1",
//!     BehaviorUpdate::new().with_page_view(PageView::new("/pricing", now, 45.0)),
//! );
//! assert!(outcome.fired("pricing_page_engagement"));
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::BroadcastListener;
pub use domain::errors::{CatalogError, ListenerError};
pub use domain::models::{
    Action, ActionKind, AutomationTrigger, BehaviorUpdate, Condition, Config, EngineConfig,
    Interaction, JourneyStage, Language, LoggingConfig, PageView, Preferences, Recommendation,
    RiskLevel, UserBehavior, UserInsights, UserJourneyStage,
};
pub use domain::ports::{
    AutomationEvent, AutomationListener, Clock, ListenerId, ManualClock, SystemClock,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{EvaluationOutcome, JourneyEngine, TriggerCatalog};
