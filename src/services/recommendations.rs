//! Stage-driven recommendations, engagement scoring and insights.
//!
//! Everything here is a pure function of the current records and the
//! clock, so repeated calls with unchanged state return equal results.

use chrono::{DateTime, Utc};

use crate::domain::models::{
    JourneyStage, Language, Priority, Recommendation, RecommendationKind, RiskLevel,
    UserBehavior, UserInsights, UserJourneyStage, MAX_ENGAGEMENT_SCORE,
};
use crate::services::trigger_evaluator::days_between;

/// Onboarding users under this score get the assistant recommendation.
pub const ONBOARDING_ASSIST_THRESHOLD: u8 = 50;

struct Localized {
    title: (&'static str, &'static str),
    description: (&'static str, &'static str),
    cta: (&'static str, &'static str),
}

impl Localized {
    fn render(&self, kind: RecommendationKind, priority: Priority, lang: Language) -> Recommendation {
        Recommendation {
            kind,
            title: lang.pick(self.title.0, self.title.1).to_string(),
            description: lang.pick(self.description.0, self.description.1).to_string(),
            priority,
            cta: lang.pick(self.cta.0, self.cta.1).to_string(),
        }
    }
}

const QUICK_START: Localized = Localized {
    title: ("Quick Start Guide", "دليل البداية السريعة"),
    description: (
        "Learn how to create your first innovative idea in 5 minutes",
        "تعلم كيفية إنشاء أول فكرة مبتكرة في 5 دقائق",
    ),
    cta: ("Start Now", "ابدأ الآن"),
};

const FREE_TRIAL: Localized = Localized {
    title: ("Try Free Demo", "جرب التجربة المجانية"),
    description: (
        "Test all features for 14 days free",
        "اختبر جميع الميزات لمدة 14 يوم مجاناً",
    ),
    cta: ("Start Trial", "ابدأ التجربة"),
};

const AI_ASSISTANT: Localized = Localized {
    title: ("AI Assistant", "المساعد الذكي"),
    description: (
        "Let AI guide you through your innovation journey",
        "دع الذكاء الاصطناعي يساعدك في رحلة الابتكار",
    ),
    cta: ("Enable Assistant", "تفعيل المساعد"),
};

const SMART_SUGGESTIONS: Localized = Localized {
    title: ("Smart Suggestions", "الاقتراحات الذكية"),
    description: (
        "Get personalized suggestions to improve your projects",
        "احصل على اقتراحات مخصصة لتحسين مشاريعك",
    ),
    cta: ("Explore Now", "استكشف الآن"),
};

/// At most one recommendation, chosen by stage.
pub fn recommendations_for(
    behavior: &UserBehavior,
    stage: &UserJourneyStage,
) -> Vec<Recommendation> {
    let lang = behavior.preferences.language;

    let recommendation = match stage.stage {
        JourneyStage::Awareness => {
            Some(QUICK_START.render(RecommendationKind::Content, Priority::High, lang))
        }
        JourneyStage::Consideration => {
            Some(FREE_TRIAL.render(RecommendationKind::Action, Priority::High, lang))
        }
        JourneyStage::Onboarding if behavior.engagement_score < ONBOARDING_ASSIST_THRESHOLD => {
            Some(AI_ASSISTANT.render(RecommendationKind::Feature, Priority::Medium, lang))
        }
        JourneyStage::Adoption => {
            Some(SMART_SUGGESTIONS.render(RecommendationKind::Feature, Priority::Medium, lang))
        }
        _ => None,
    };

    recommendation.into_iter().collect()
}

/// Engagement score derived from activity volume and recency.
///
/// Page views add 5 each (max 30), interactions 10 each (max 50), and
/// activity within the last day adds 20 (within a week, 10).
pub fn calculate_engagement_score(behavior: &UserBehavior, now: DateTime<Utc>) -> u8 {
    let views = behavior.page_views.len().saturating_mul(5).min(30);
    let interactions = behavior.interactions.len().saturating_mul(10).min(50);

    let idle_days = days_between(behavior.last_activity, now);
    let recency = if idle_days < 1.0 {
        20
    } else if idle_days < 7.0 {
        10
    } else {
        0
    };

    let total = (views + interactions + recency).min(usize::from(MAX_ENGAGEMENT_SCORE));
    u8::try_from(total).unwrap_or(MAX_ENGAGEMENT_SCORE)
}

/// Risk bucket from the stored engagement score.
pub fn risk_level(behavior: &UserBehavior) -> RiskLevel {
    match behavior.engagement_score {
        70.. => RiskLevel::Low,
        40..=69 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

/// Churn risk from the derived score and idle time.
pub fn churn_risk(behavior: &UserBehavior, now: DateTime<Utc>) -> RiskLevel {
    let score = calculate_engagement_score(behavior, now);
    let idle_days = days_between(behavior.last_activity, now);

    if score > 70 && idle_days < 3.0 {
        RiskLevel::Low
    } else if score > 40 && idle_days < 7.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Localized suggestion for whoever is looking after this user.
pub fn next_best_action(
    behavior: &UserBehavior,
    stage: &UserJourneyStage,
    now: DateTime<Utc>,
) -> String {
    let lang = behavior.preferences.language;

    let text = if calculate_engagement_score(behavior, now) < 30 {
        lang.pick("Send personalized welcome message", "إرسال رسالة ترحيب شخصية")
    } else if stage.stage == JourneyStage::Consideration {
        lang.pick("Offer personalized trial", "عرض تجربة مجانية مخصصة")
    } else {
        lang.pick("Share valuable content", "مشاركة محتوى قيم")
    };

    text.to_string()
}

/// Assemble [`UserInsights`]. Risk uses the stored score; the next best
/// action uses the derived one.
pub fn insights_for(
    behavior: &UserBehavior,
    stage: &UserJourneyStage,
    now: DateTime<Utc>,
) -> UserInsights {
    UserInsights {
        stage: stage.stage,
        engagement_score: behavior.engagement_score,
        risk_level: risk_level(behavior),
        next_best_action: next_best_action(behavior, stage, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Interaction, PageView, Preferences};
    use chrono::Duration;

    fn behavior(now: DateTime<Utc>, score: u8, lang: Language) -> UserBehavior {
        let mut b = UserBehavior::new(now);
        b.engagement_score = score;
        b.preferences = Preferences {
            language: lang,
            ..Default::default()
        };
        b
    }

    #[test]
    fn test_stage_recommendations() {
        let now = Utc::now();
        let b = behavior(now, 10, Language::En);

        let awareness = recommendations_for(&b, &UserJourneyStage::new(JourneyStage::Awareness, now));
        assert_eq!(awareness.len(), 1);
        assert_eq!(awareness[0].kind, RecommendationKind::Content);
        assert_eq!(awareness[0].title, "Quick Start Guide");
        assert_eq!(awareness[0].priority, Priority::High);

        let consideration =
            recommendations_for(&b, &UserJourneyStage::new(JourneyStage::Consideration, now));
        assert_eq!(consideration[0].kind, RecommendationKind::Action);
        assert_eq!(consideration[0].cta, "Start Trial");

        let adoption = recommendations_for(&b, &UserJourneyStage::new(JourneyStage::Adoption, now));
        assert_eq!(adoption[0].title, "Smart Suggestions");

        for stage in [
            JourneyStage::Decision,
            JourneyStage::Retention,
            JourneyStage::Expansion,
            JourneyStage::Advocacy,
        ] {
            assert!(recommendations_for(&b, &UserJourneyStage::new(stage, now)).is_empty());
        }
    }

    #[test]
    fn test_onboarding_assistant_depends_on_score() {
        let now = Utc::now();
        let stage = UserJourneyStage::new(JourneyStage::Onboarding, now);

        let low = recommendations_for(&behavior(now, 49, Language::En), &stage);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].title, "AI Assistant");

        let engaged = recommendations_for(&behavior(now, 50, Language::En), &stage);
        assert!(engaged.is_empty());
    }

    #[test]
    fn test_arabic_text() {
        let now = Utc::now();
        let recs = recommendations_for(
            &behavior(now, 0, Language::Ar),
            &UserJourneyStage::new(JourneyStage::Awareness, now),
        );
        assert_eq!(recs[0].title, "دليل البداية السريعة");
        assert_eq!(recs[0].cta, "ابدأ الآن");
    }

    #[test]
    fn test_engagement_score_formula() {
        let now = Utc::now();
        let mut b = UserBehavior::new(now);
        assert_eq!(calculate_engagement_score(&b, now), 20);

        for i in 0..10 {
            b.page_views.push_back(PageView::new(format!("/{i}"), now, 1.0));
        }
        for _ in 0..3 {
            b.interactions.push_back(Interaction::new("click", "button", now));
        }
        assert_eq!(calculate_engagement_score(&b, now), 30 + 30 + 20);
        assert_eq!(calculate_engagement_score(&b, now + Duration::days(3)), 30 + 30 + 10);
        assert_eq!(calculate_engagement_score(&b, now + Duration::days(8)), 30 + 30);

        for _ in 0..10 {
            b.interactions.push_back(Interaction::new("click", "button", now));
        }
        assert_eq!(calculate_engagement_score(&b, now), 100);
    }

    #[test]
    fn test_risk_levels() {
        let now = Utc::now();
        assert_eq!(risk_level(&behavior(now, 70, Language::En)), RiskLevel::Low);
        assert_eq!(risk_level(&behavior(now, 40, Language::En)), RiskLevel::Medium);
        assert_eq!(risk_level(&behavior(now, 39, Language::En)), RiskLevel::High);
    }

    #[test]
    fn test_churn_risk() {
        let now = Utc::now();
        let mut b = UserBehavior::new(now);
        assert_eq!(churn_risk(&b, now), RiskLevel::High);

        for _ in 0..6 {
            b.interactions.push_back(Interaction::new("click", "button", now));
        }
        // 50 + 20 = 70: not above 70, but above 40
        assert_eq!(churn_risk(&b, now), RiskLevel::Medium);

        b.page_views.push_back(PageView::new("/", now, 1.0));
        assert_eq!(churn_risk(&b, now), RiskLevel::Low);
        assert_eq!(churn_risk(&b, now + Duration::days(8)), RiskLevel::High);
    }

    #[test]
    fn test_next_best_action() {
        let now = Utc::now();
        let quiet = UserBehavior::new(now);
        let consideration = UserJourneyStage::new(JourneyStage::Consideration, now);
        assert_eq!(
            next_best_action(&quiet, &consideration, now),
            "Send personalized welcome message"
        );

        let mut active = UserBehavior::new(now);
        active.page_views.push_back(PageView::new("/", now, 1.0));
        active.page_views.push_back(PageView::new("/", now, 1.0));
        assert_eq!(next_best_action(&active, &consideration, now), "Offer personalized trial");

        let adoption = UserJourneyStage::new(JourneyStage::Adoption, now);
        assert_eq!(next_best_action(&active, &adoption, now), "Share valuable content");
    }
}
