use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(PlanId);
id_newtype!(ProgressEntryId);
id_newtype!(FeedbackId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    GainMuscle,
    MaintainWeight,
    ImproveEndurance,
}

impl Goal {
    pub const ALL: [Goal; 4] = [
        Goal::LoseWeight,
        Goal::GainMuscle,
        Goal::MaintainWeight,
        Goal::ImproveEndurance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Goal::LoseWeight => "lose_weight",
            Goal::GainMuscle => "gain_muscle",
            Goal::MaintainWeight => "maintain_weight",
            Goal::ImproveEndurance => "improve_endurance",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|goal| goal.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Workout,
    Nutrition,
}

impl PlanKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "workout" => Some(PlanKind::Workout),
            "nutrition" => Some(PlanKind::Nutrition),
            _ => None,
        }
    }
}

/// Profile snapshot as returned by the auth endpoints.
///
/// Most fields are optional on the backend, so they stay optional here and
/// free-form strings are kept as sent rather than forced into enums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub equipment_available: Vec<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: PlanId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration_weeks: u32,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub plan_data: serde_json::Value,
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub id: PlanId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration_weeks: u32,
    pub daily_calories: i64,
    #[serde(default)]
    pub macros: serde_json::Value,
    #[serde(default)]
    pub meal_plan: serde_json::Value,
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: ProgressEntryId,
    pub user_id: UserId,
    pub date: NaiveDate,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub body_fat_percentage: Option<f64>,
    #[serde(default)]
    pub measurements: serde_json::Value,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanFeedback {
    pub id: FeedbackId,
    pub user_id: UserId,
    pub plan_type: PlanKind,
    pub plan_id: PlanId,
    pub rating: u8,
    #[serde(default)]
    pub feedback_text: Option<String>,
    #[serde(default)]
    pub difficulty_rating: Option<u8>,
    #[serde(default)]
    pub satisfaction_rating: Option<u8>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}
