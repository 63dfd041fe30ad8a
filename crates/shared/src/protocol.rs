use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ActivityLevel, ExperienceLevel, Goal, NutritionPlan, PlanFeedback, PlanId, PlanKind,
    ProgressEntry, UserProfile, WorkoutPlan,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: i32,
    pub weight: f64,
    pub height: f64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    pub experience_level: ExperienceLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body returned by both `/auth/register` and `/auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratePlanRequest {
    pub duration_weeks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlanResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub plan: WorkoutPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlanResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub plan: NutritionPlan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MyPlansResponse {
    #[serde(default)]
    pub workout_plans: Vec<WorkoutPlan>,
    #[serde(default)]
    pub nutrition_plans: Vec<NutritionPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub plan_type: PlanKind,
    pub plan_id: PlanId,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfaction_rating: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub feedback: PlanFeedback,
}

/// New or replacement progress entry. The backend upserts by `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntryRequest {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntryResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub entry: ProgressEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressListResponse {
    #[serde(default)]
    pub entries: Vec<ProgressEntry>,
    #[serde(default)]
    pub summary: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressStatsResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stats: serde_json::Value,
    #[serde(default)]
    pub chart_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
