//! Scripted journey replay.
//!
//! A replay script drives one engine on a manual clock through a sequence
//! of steps and reports what fired. Scripts are YAML:
//!
//! ```yaml
//! start: 2026-01-01T09:00:00Z
//! user: u1
//! steps:
//!   - action: behavior
//!     page_views: [{ page: /pricing, duration: 45 }]
//!   - action: stage
//!     stage: onboarding
//!   - action: advance
//!     days: 3
//!   - action: insights
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use comfy_table::Cell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;

use crate::adapters::BroadcastListener;
use crate::cli::commands::load_catalog;
use crate::cli::output::{join_or_dash, output, table_with_header, truncate, CommandOutput};
use crate::domain::models::{
    BehaviorUpdate, Config, EngineConfig, Interaction, JourneyStage, PageView, Preferences,
    UserJourneyStage,
};
use crate::domain::ports::{AutomationEvent, Clock, ManualClock};
use crate::services::{EvaluationOutcome, JourneyEngine, TriggerCatalog};

/// Arguments for `replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to the replay script (YAML)
    pub script: PathBuf,
}

fn default_user() -> String {
    "default_user".to_string()
}

/// A parsed replay script.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    /// Clock start; wall-clock now when omitted
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,

    /// User for steps that do not name one
    #[serde(default = "default_user")]
    pub user: String,

    /// Executed in order
    pub steps: Vec<ReplayStep>,
}

/// Page view without a timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptPageView {
    /// Page path
    pub page: String,
    /// Seconds on page
    #[serde(default)]
    pub duration: f64,
}

/// Interaction without a timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptInteraction {
    /// Action name
    pub action: String,
    /// Element name
    #[serde(default)]
    pub element: String,
}

/// One scripted step, tagged by `action`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayStep {
    /// Record a behavior update
    Behavior {
        /// Overrides the script user
        #[serde(default)]
        user: Option<String>,
        /// Stamped with the current clock
        #[serde(default)]
        page_views: Vec<ScriptPageView>,
        /// Stamped with the current clock
        #[serde(default)]
        interactions: Vec<ScriptInteraction>,
        /// Explicit score
        #[serde(default)]
        engagement_score: Option<u8>,
        /// Replacement preferences
        #[serde(default)]
        preferences: Option<Preferences>,
    },
    /// Replace the stage record
    Stage {
        /// Overrides the script user
        #[serde(default)]
        user: Option<String>,
        /// New stage
        stage: JourneyStage,
        /// Optional substage
        #[serde(default)]
        substage: Option<String>,
        /// Written to `completedStages` metadata
        #[serde(default)]
        completed_stages: Vec<String>,
        /// Extra metadata entries
        #[serde(default)]
        metadata: HashMap<String, Value>,
    },
    /// Move the manual clock
    Advance {
        /// Days
        #[serde(default)]
        days: i64,
        /// Hours
        #[serde(default)]
        hours: i64,
        /// Minutes
        #[serde(default)]
        minutes: i64,
        /// Seconds; negative values move the clock back
        #[serde(default)]
        seconds: i64,
    },
    /// Re-run evaluation without new input
    Evaluate {
        /// Overrides the script user
        #[serde(default)]
        user: Option<String>,
    },
    /// Report recommendations
    Recommend {
        /// Overrides the script user
        #[serde(default)]
        user: Option<String>,
    },
    /// Report insights
    Insights {
        /// Overrides the script user
        #[serde(default)]
        user: Option<String>,
    },
    /// Clear fired-set and throttle entries
    Reset {
        /// Overrides the script user
        #[serde(default)]
        user: Option<String>,
    },
}

impl ReplayStep {
    fn name(&self) -> &'static str {
        match self {
            Self::Behavior { .. } => "behavior",
            Self::Stage { .. } => "stage",
            Self::Advance { .. } => "advance",
            Self::Evaluate { .. } => "evaluate",
            Self::Recommend { .. } => "recommend",
            Self::Insights { .. } => "insights",
            Self::Reset { .. } => "reset",
        }
    }

    fn user(&self) -> Option<&str> {
        match self {
            Self::Behavior { user, .. }
            | Self::Stage { user, .. }
            | Self::Evaluate { user }
            | Self::Recommend { user }
            | Self::Insights { user }
            | Self::Reset { user } => user.as_deref(),
            Self::Advance { .. } => None,
        }
    }
}

/// What one step did.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Zero-based step index
    pub index: usize,
    /// Step name
    pub action: String,
    /// Resolved user; `None` for clock steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Clock after the step
    pub clock: DateTime<Utc>,
    /// Triggers that fired
    pub fired: Vec<String>,
    /// Triggers held back by the throttle
    pub throttled: Vec<String>,
    /// Recommendations, insights or the new clock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

/// Flattened automation event.
#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    /// Fire time
    pub timestamp: DateTime<Utc>,
    /// User
    pub user_id: String,
    /// Trigger
    pub trigger_id: String,
    /// Action kind
    pub action: String,
    /// Action payload
    pub payload: Value,
}

impl From<AutomationEvent> for EventRow {
    fn from(event: AutomationEvent) -> Self {
        Self {
            timestamp: event.timestamp,
            user_id: event.user_id,
            trigger_id: event.trigger_id,
            action: event.action.kind.to_string(),
            payload: event.action.payload,
        }
    }
}

/// Full replay result.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutput {
    /// One report per step
    pub steps: Vec<StepReport>,
    /// Every event delivered, in order
    pub events: Vec<EventRow>,
}

impl ReplayOutput {
    /// Trigger ids in the order they fired.
    pub fn fired(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.fired.iter().map(String::as_str))
            .collect()
    }
}

impl CommandOutput for ReplayOutput {
    fn to_human(&self) -> String {
        let mut steps = table_with_header(&["#", "Step", "User", "Fired", "Throttled", "Detail"]);
        for step in &self.steps {
            let detail = step
                .detail
                .as_ref()
                .map_or_else(|| "-".to_string(), |d| truncate(&d.to_string(), 60));
            steps.add_row(vec![
                Cell::new(step.index),
                Cell::new(&step.action),
                Cell::new(step.user.as_deref().unwrap_or("-")),
                Cell::new(join_or_dash(&step.fired)),
                Cell::new(join_or_dash(&step.throttled)),
                Cell::new(detail),
            ]);
        }

        let mut out = format!("{steps}\n");
        if self.events.is_empty() {
            out.push_str("No automation events.");
            return out;
        }

        let mut events = table_with_header(&["Time", "User", "Trigger", "Action", "Payload"]);
        for event in &self.events {
            events.add_row(vec![
                Cell::new(event.timestamp.format("%Y-%m-%d %H:%M:%S")),
                Cell::new(&event.user_id),
                Cell::new(&event.trigger_id),
                Cell::new(&event.action),
                Cell::new(truncate(&event.payload.to_string(), 60)),
            ]);
        }
        out.push_str(&format!("{} automation event(s):\n{events}", self.events.len()));
        out
    }
}

/// Run `script` against a fresh engine and collect what happened.
pub fn run_script(
    script: &ReplayScript,
    config: &EngineConfig,
    catalog: Arc<TriggerCatalog>,
) -> Result<ReplayOutput> {
    let clock = Arc::new(ManualClock::new(script.start.unwrap_or_else(Utc::now)));
    let mut engine = JourneyEngine::new(config.clone())
        .with_catalog(catalog)
        .with_clock(clock.clone());

    let broadcast = Arc::new(BroadcastListener::new(config.event_channel_capacity));
    let mut rx = broadcast.subscribe();
    engine.subscribe(broadcast);

    let mut out = ReplayOutput {
        steps: Vec::with_capacity(script.steps.len()),
        events: Vec::new(),
    };

    for (i, step) in script.steps.iter().enumerate() {
        let user = step.user().unwrap_or(&script.user).to_string();
        let (outcome, detail) = apply_step(&mut engine, &clock, step, &user)
            .with_context(|| format!("Replay step {} ({}) failed", i + 1, step.name()))?;

        out.steps.push(StepReport {
            index: i + 1,
            action: step.name().to_string(),
            user: (!matches!(step, ReplayStep::Advance { .. })).then_some(user),
            clock: clock.now(),
            fired: outcome.fired,
            throttled: outcome.throttled,
            detail,
        });
        drain_events(&mut rx, &mut out.events);
    }

    tracing::debug!(
        steps = out.steps.len(),
        events = out.events.len(),
        "Replay finished"
    );
    engine.dispose();
    Ok(out)
}

fn apply_step(
    engine: &mut JourneyEngine,
    clock: &ManualClock,
    step: &ReplayStep,
    user: &str,
) -> Result<(EvaluationOutcome, Option<Value>)> {
    let now = clock.now();

    let result = match step {
        ReplayStep::Behavior {
            page_views,
            interactions,
            engagement_score,
            preferences,
            ..
        } => {
            let mut update = BehaviorUpdate::new();
            for view in page_views {
                update = update.with_page_view(PageView::new(&view.page, now, view.duration));
            }
            for interaction in interactions {
                update = update.with_interaction(Interaction::new(
                    &interaction.action,
                    &interaction.element,
                    now,
                ));
            }
            if let Some(score) = engagement_score {
                update = update.with_engagement_score(*score);
            }
            if let Some(prefs) = preferences {
                update = update.with_preferences(prefs.clone());
            }
            (engine.record_behavior(user, update), None)
        }

        ReplayStep::Stage {
            stage,
            substage,
            completed_stages,
            metadata,
            ..
        } => {
            let mut record = UserJourneyStage::new(*stage, now);
            if let Some(sub) = substage {
                record = record.with_substage(sub);
            }
            for (key, value) in metadata {
                record = record.with_metadata(key, value.clone());
            }
            if !completed_stages.is_empty() {
                record = record.with_completed_stages(completed_stages);
            }
            (engine.record_stage(user, record), None)
        }

        ReplayStep::Advance {
            days,
            hours,
            minutes,
            seconds,
        } => {
            let Some(target) = checked_delta(*days, *hours, *minutes, *seconds)
                .and_then(|delta| now.checked_add_signed(delta))
            else {
                bail!("advance moves the clock out of range");
            };
            clock.set(target);
            (
                EvaluationOutcome::default(),
                Some(Value::String(clock.now().to_rfc3339())),
            )
        }

        ReplayStep::Evaluate { .. } => (engine.evaluate(user), None),

        ReplayStep::Recommend { .. } => {
            let recommendations = engine.get_recommendations(user);
            (
                EvaluationOutcome::default(),
                Some(serde_json::to_value(recommendations)?),
            )
        }

        ReplayStep::Insights { .. } => {
            let insights = engine.get_user_insights(user);
            (
                EvaluationOutcome::default(),
                Some(serde_json::to_value(insights)?),
            )
        }

        ReplayStep::Reset { .. } => {
            engine.reset_user_state(user);
            (EvaluationOutcome::default(), None)
        }
    };

    Ok(result)
}

fn checked_delta(days: i64, hours: i64, minutes: i64, seconds: i64) -> Option<Duration> {
    [
        Duration::try_days(days),
        Duration::try_hours(hours),
        Duration::try_minutes(minutes),
        Duration::try_seconds(seconds),
    ]
    .into_iter()
    .try_fold(Duration::zero(), |total, part| total.checked_add(&part?))
}

fn drain_events(rx: &mut Receiver<AutomationEvent>, events: &mut Vec<EventRow>) {
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event.into()),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Replay event receiver lagged; events lost");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

/// Run `replay`: read the script, replay it, print the result.
pub async fn execute(args: ReplayArgs, config: &Config, json_mode: bool) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("Failed to read replay script {}", args.script.display()))?;
    let script: ReplayScript = serde_yaml::from_str(&raw)
        .with_context(|| format!("Invalid replay script {}", args.script.display()))?;

    let catalog = load_catalog(&config.engine).await?;
    let out = run_script(&script, &config.engine, catalog)?;
    output(&out, json_mode);

    Ok(())
}
