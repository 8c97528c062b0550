//! Automation trigger definitions.
//!
//! A trigger pairs AND-ed conditions with actions that all fire together.
//! Conditions are typed per kind; the serialized form keeps the flat
//! `{type, condition, value}` shape so catalogs stay hand-editable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::CatalogError;

/// The three condition families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Facts from page views, interactions and the engagement score
    Behavioral,
    /// Time elapsed since the stage was set
    Temporal,
    /// One-shot life-cycle events
    Milestone,
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Behavioral => write!(f, "behavioral"),
            Self::Temporal => write!(f, "temporal"),
            Self::Milestone => write!(f, "milestone"),
        }
    }
}

/// Conditions over observed interaction facts.
#[derive(Debug, Clone, PartialEq)]
pub enum BehavioralCondition {
    /// Most recent page view lasted at least `min_secs`.
    TimeOnPage {
        /// Seconds
        min_secs: f64,
    },
    /// Stored engagement score is at least `min`.
    EngagementScore {
        /// Inclusive lower bound, 0-100
        min: f64,
    },
    /// Any recorded page view matches `page`.
    PageVisit {
        /// Exact page path
        page: String,
    },
    /// At least `days` have passed since the last activity.
    DaysSinceLastLogin {
        /// Days of inactivity
        days: f64,
    },
    /// Any recorded interaction has this `action`.
    Interaction {
        /// Interaction action name
        action: String,
    },
    /// Unknown key; never satisfied.
    Unrecognized {
        /// Key as written in the catalog
        key: String,
        /// Value as written in the catalog
        value: Value,
    },
}

/// Conditions over elapsed time since the stage record was set.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalCondition {
    /// At least `days` have passed since the stage timestamp.
    DaysSinceSignup {
        /// Minimum whole-or-fractional days
        days: f64,
    },
    /// Unknown key; never satisfied.
    Unrecognized {
        /// Key as written in the catalog
        key: String,
        /// Value as written in the catalog
        value: Value,
    },
}

/// One-shot life-cycle conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum MilestoneCondition {
    /// Stage is `onboarding`.
    TrialStarted,
    /// Stage is `adoption` and `prd` is completed.
    FirstPrdCreated,
    /// Stage is `retention` and `prototype` is completed.
    FirstPrototypeShipped,
    /// Any other milestone: satisfied only when `value` is `true`.
    Custom {
        /// Milestone name; fired-set key is `milestone_<key>`
        key: String,
        /// Must be `true` for the milestone to hold
        value: Value,
    },
}

impl MilestoneCondition {
    /// Key recorded in the fired-set once this milestone has fired.
    pub fn fired_key(&self) -> String {
        match self {
            Self::TrialStarted => "trial_started".to_string(),
            Self::FirstPrdCreated => "first_prd_created".to_string(),
            Self::FirstPrototypeShipped => "first_prototype_shipped".to_string(),
            Self::Custom { key, .. } => format!("milestone_{key}"),
        }
    }
}

/// A single trigger condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub enum Condition {
    /// See [`BehavioralCondition`]
    Behavioral(BehavioralCondition),
    /// See [`TemporalCondition`]
    Temporal(TemporalCondition),
    /// See [`MilestoneCondition`]
    Milestone(MilestoneCondition),
}

impl Condition {
    /// `time_on_page >= min_secs`
    pub fn time_on_page(min_secs: f64) -> Self {
        Self::Behavioral(BehavioralCondition::TimeOnPage { min_secs })
    }

    /// `engagement_score >= min`
    pub fn engagement_score(min: f64) -> Self {
        Self::Behavioral(BehavioralCondition::EngagementScore { min })
    }

    /// Page visited at least once
    pub fn page_visit(page: impl Into<String>) -> Self {
        Self::Behavioral(BehavioralCondition::PageVisit { page: page.into() })
    }

    /// Inactive for at least `days`
    pub fn days_since_last_login(days: f64) -> Self {
        Self::Behavioral(BehavioralCondition::DaysSinceLastLogin { days })
    }

    /// Interaction performed at least once
    pub fn interaction(action: impl Into<String>) -> Self {
        Self::Behavioral(BehavioralCondition::Interaction {
            action: action.into(),
        })
    }

    /// Stage set at least `days` ago
    pub fn days_since_signup(days: f64) -> Self {
        Self::Temporal(TemporalCondition::DaysSinceSignup { days })
    }

    /// Wrap a milestone condition
    pub fn milestone(milestone: MilestoneCondition) -> Self {
        Self::Milestone(milestone)
    }

    /// Condition family
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Behavioral(_) => ConditionKind::Behavioral,
            Self::Temporal(_) => ConditionKind::Temporal,
            Self::Milestone(_) => ConditionKind::Milestone,
        }
    }

    /// The condition key as written in a catalog.
    pub fn key(&self) -> &str {
        match self {
            Self::Behavioral(b) => match b {
                BehavioralCondition::TimeOnPage { .. } => "time_on_page",
                BehavioralCondition::EngagementScore { .. } => "engagement_score",
                BehavioralCondition::PageVisit { .. } => "page_visit",
                BehavioralCondition::DaysSinceLastLogin { .. } => "days_since_last_login",
                BehavioralCondition::Interaction { .. } => "interaction",
                BehavioralCondition::Unrecognized { key, .. } => key,
            },
            Self::Temporal(t) => match t {
                TemporalCondition::DaysSinceSignup { .. } => "days_since_signup",
                TemporalCondition::Unrecognized { key, .. } => key,
            },
            Self::Milestone(m) => match m {
                MilestoneCondition::TrialStarted => "trial_started",
                MilestoneCondition::FirstPrdCreated => "first_prd_created",
                MilestoneCondition::FirstPrototypeShipped => "first_prototype_shipped",
                MilestoneCondition::Custom { key, .. } => key,
            },
        }
    }

    /// Whether this condition came from an unknown key.
    pub fn is_unrecognized(&self) -> bool {
        matches!(
            self,
            Self::Behavioral(BehavioralCondition::Unrecognized { .. })
                | Self::Temporal(TemporalCondition::Unrecognized { .. })
        )
    }
}

/// Flat catalog form of a condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCondition {
    /// Condition family, serialized as `type`
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    /// Condition key such as `page_visit`
    pub condition: String,
    /// Threshold, page, action or flag for the key
    #[serde(default)]
    pub value: Value,
}

fn expect_number(condition: &str, value: &Value) -> Result<f64, CatalogError> {
    value
        .as_f64()
        .ok_or_else(|| CatalogError::InvalidConditionValue {
            condition: condition.to_string(),
            expected: "number",
            actual: value.to_string(),
        })
}

/// Known milestones carry no parameter; only `true` (or no value) is accepted.
fn expect_true(condition: &str, value: &Value) -> Result<(), CatalogError> {
    match value {
        Value::Null | Value::Bool(true) => Ok(()),
        other => Err(CatalogError::InvalidConditionValue {
            condition: condition.to_string(),
            expected: "true",
            actual: other.to_string(),
        }),
    }
}

fn expect_string(condition: &str, value: &Value) -> Result<String, CatalogError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CatalogError::InvalidConditionValue {
            condition: condition.to_string(),
            expected: "string",
            actual: value.to_string(),
        })
}

impl TryFrom<RawCondition> for Condition {
    type Error = CatalogError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let RawCondition {
            kind,
            condition,
            value,
        } = raw;
        let key = condition.as_str();

        let parsed = match kind {
            ConditionKind::Behavioral => Self::Behavioral(match key {
                "time_on_page" => BehavioralCondition::TimeOnPage {
                    min_secs: expect_number(key, &value)?,
                },
                "engagement_score" => BehavioralCondition::EngagementScore {
                    min: expect_number(key, &value)?,
                },
                "page_visit" => BehavioralCondition::PageVisit {
                    page: expect_string(key, &value)?,
                },
                "days_since_last_login" => BehavioralCondition::DaysSinceLastLogin {
                    days: expect_number(key, &value)?,
                },
                "interaction" => BehavioralCondition::Interaction {
                    action: expect_string(key, &value)?,
                },
                _ => BehavioralCondition::Unrecognized {
                    key: condition,
                    value,
                },
            }),
            ConditionKind::Temporal => Self::Temporal(match key {
                "days_since_signup" => TemporalCondition::DaysSinceSignup {
                    days: expect_number(key, &value)?,
                },
                _ => TemporalCondition::Unrecognized {
                    key: condition,
                    value,
                },
            }),
            ConditionKind::Milestone => Self::Milestone(match key {
                "trial_started" => {
                    expect_true(key, &value)?;
                    MilestoneCondition::TrialStarted
                }
                "first_prd_created" => {
                    expect_true(key, &value)?;
                    MilestoneCondition::FirstPrdCreated
                }
                "first_prototype_shipped" => {
                    expect_true(key, &value)?;
                    MilestoneCondition::FirstPrototypeShipped
                }
                _ => MilestoneCondition::Custom {
                    key: condition,
                    value,
                },
            }),
        };

        Ok(parsed)
    }
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        let kind = condition.kind();
        let key = condition.key().to_string();
        let value = match condition {
            Condition::Behavioral(b) => match b {
                BehavioralCondition::TimeOnPage { min_secs } => Value::from(min_secs),
                BehavioralCondition::EngagementScore { min } => Value::from(min),
                BehavioralCondition::PageVisit { page } => Value::String(page),
                BehavioralCondition::DaysSinceLastLogin { days } => Value::from(days),
                BehavioralCondition::Interaction { action } => Value::String(action),
                BehavioralCondition::Unrecognized { value, .. } => value,
            },
            Condition::Temporal(t) => match t {
                TemporalCondition::DaysSinceSignup { days } => Value::from(days),
                TemporalCondition::Unrecognized { value, .. } => value,
            },
            Condition::Milestone(m) => match m {
                MilestoneCondition::Custom { value, .. } => value,
                _ => Value::Bool(true),
            },
        };

        Self {
            kind,
            condition: key,
            value,
        }
    }
}

/// Kinds of action a trigger can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// In-app notification
    Notification,
    /// Templated email
    Email,
    /// WhatsApp message
    Whatsapp,
    /// Client-side UI change such as a modal or banner
    UiChange,
    /// Message from the AI assistant
    AiAssistance,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notification => write!(f, "notification"),
            Self::Email => write!(f, "email"),
            Self::Whatsapp => write!(f, "whatsapp"),
            Self::UiChange => write!(f, "ui_change"),
            Self::AiAssistance => write!(f, "ai_assistance"),
        }
    }
}

/// An action with an opaque payload interpreted by the listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Serialized as `type`
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Passed through untouched to listeners
    #[serde(default)]
    pub payload: Value,
}

impl Action {
    /// Action of `kind` carrying `payload`
    pub fn new(kind: ActionKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// A named rule: all conditions must hold, then every action fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationTrigger {
    /// Unique within a catalog
    pub id: String,
    /// Display name
    pub name: String,
    /// AND-ed; an empty list always holds
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Dispatched in order when the trigger fires
    pub actions: Vec<Action>,
}

impl AutomationTrigger {
    /// Trigger with no conditions or actions yet.
    ///
    /// ```
    /// use brainsait_journey::{ActionKind, AutomationTrigger, Condition};
    /// use serde_json::json;
    ///
    /// let trigger = AutomationTrigger::new("docs_reader", "Docs reader")
    ///     .when(Condition::page_visit("/docs"))
    ///     .then(ActionKind::Email, json!({"template": "docs_digest"}));
    /// assert_eq!(trigger.conditions.len(), 1);
    /// assert!(!trigger.is_one_shot());
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a condition
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an action
    pub fn then(mut self, kind: ActionKind, payload: Value) -> Self {
        self.actions.push(Action::new(kind, payload));
        self
    }

    /// Fired-set keys for this trigger's milestone conditions.
    pub fn milestone_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.conditions.iter().filter_map(|c| match c {
            Condition::Milestone(m) => Some(m.fired_key()),
            _ => None,
        })
    }

    /// Whether any condition is a milestone (one-shot) condition.
    pub fn is_one_shot(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| c.kind() == ConditionKind::Milestone)
    }
}
