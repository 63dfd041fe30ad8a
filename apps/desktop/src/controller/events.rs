//! User actions, backend commands, and typed operation outcomes.

use std::cmp::Ordering;

use client_core::GatewayError;
use shared::{
    domain::{
        ActivityLevel, ExperienceLevel, Goal, NutritionPlan, PlanFeedback, ProgressEntry,
        ProgressEntryId, UserProfile, WorkoutPlan,
    },
    protocol::{
        FeedbackRequest, HealthResponse, LoginRequest, MyPlansResponse, ProgressEntryRequest,
        ProgressListResponse, ProgressStatsResponse, RegisterRequest,
    },
};
use thiserror::Error;

use super::view::View;

/// Raw register form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: String,
    pub weight: String,
    pub height: String,
    pub goal: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("unknown goal '{0}'")]
    UnknownGoal(String),
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Missing(field));
    }
    Ok(trimmed.to_string())
}

fn positive<T>(field: &'static str, value: &str) -> Result<T, FormError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let raw = required(field, value)?;
    let parsed = raw.parse::<T>().map_err(|_| FormError::NotANumber {
        field,
        value: raw.clone(),
    })?;
    // NaN compares as unordered and is rejected here too.
    if parsed.partial_cmp(&T::default()) != Some(Ordering::Greater) {
        return Err(FormError::NotPositive { field });
    }
    Ok(parsed)
}

impl RegisterForm {
    /// Activity and experience are not asked for on sign-up; the backend
    /// defaults (`moderate`, `beginner`) are sent explicitly.
    pub fn validate(&self) -> Result<RegisterRequest, FormError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        if self.password.is_empty() {
            return Err(FormError::Missing("password"));
        }
        let age = positive::<i32>("age", &self.age)?;
        let weight = positive::<f64>("weight", &self.weight)?;
        let height = positive::<f64>("height", &self.height)?;
        let goal_raw = required("goal", &self.goal)?;
        let goal = Goal::parse(&goal_raw).ok_or(FormError::UnknownGoal(goal_raw))?;

        Ok(RegisterRequest {
            name,
            email,
            password: self.password.clone(),
            age,
            weight,
            height,
            goal,
            activity_level: ActivityLevel::default(),
            experience_level: ExperienceLevel::default(),
        })
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, FormError> {
        let email = required("email", &self.email)?;
        if self.password.is_empty() {
            return Err(FormError::Missing("password"));
        }
        Ok(LoginRequest {
            email,
            password: self.password.clone(),
        })
    }
}

pub fn validate_feedback(payload: &FeedbackRequest) -> Result<(), FormError> {
    let ratings = [
        Some(payload.rating),
        payload.difficulty_rating,
        payload.satisfaction_rating,
    ];
    match ratings.into_iter().flatten().find(|r| !(1..=5).contains(r)) {
        Some(bad) => Err(FormError::RatingOutOfRange(bad)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    Navigate(View),
    SubmitRegister(RegisterForm),
    SubmitLogin(LoginForm),
    Logout,
    GenerateWorkoutPlan { duration_weeks: u32 },
    GenerateNutritionPlan { duration_weeks: u32 },
    LoadPlans,
    SubmitFeedback(FeedbackRequest),
    AddProgress(ProgressEntryRequest),
    LoadProgress { days: u32 },
    LoadProgressStats,
    DeleteProgress { id: ProgressEntryId },
    CheckHealth,
    DismissError,
    DismissSuccess,
}

/// Work handed from the controller to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    VerifySession,
    Register(RegisterRequest),
    Login(LoginRequest),
    Logout,
    GenerateWorkoutPlan { duration_weeks: u32 },
    GenerateNutritionPlan { duration_weeks: u32 },
    ListPlans,
    SubmitFeedback(FeedbackRequest),
    AddProgress(ProgressEntryRequest),
    ListProgress { days: u32 },
    ProgressStats,
    DeleteProgress { id: ProgressEntryId },
    HealthCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    VerifySession,
    Register,
    Login,
    Logout,
    GenerateWorkoutPlan,
    GenerateNutritionPlan,
    ListPlans,
    SubmitFeedback,
    AddProgress,
    ListProgress,
    ProgressStats,
    DeleteProgress,
    HealthCheck,
}

impl BackendCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            BackendCommand::VerifySession => CommandKind::VerifySession,
            BackendCommand::Register(_) => CommandKind::Register,
            BackendCommand::Login(_) => CommandKind::Login,
            BackendCommand::Logout => CommandKind::Logout,
            BackendCommand::GenerateWorkoutPlan { .. } => CommandKind::GenerateWorkoutPlan,
            BackendCommand::GenerateNutritionPlan { .. } => CommandKind::GenerateNutritionPlan,
            BackendCommand::ListPlans => CommandKind::ListPlans,
            BackendCommand::SubmitFeedback(_) => CommandKind::SubmitFeedback,
            BackendCommand::AddProgress(_) => CommandKind::AddProgress,
            BackendCommand::ListProgress { .. } => CommandKind::ListProgress,
            BackendCommand::ProgressStats => CommandKind::ProgressStats,
            BackendCommand::DeleteProgress { .. } => CommandKind::DeleteProgress,
            BackendCommand::HealthCheck => CommandKind::HealthCheck,
        }
    }
}

impl CommandKind {
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::VerifySession => "verify_session",
            CommandKind::Register => "register",
            CommandKind::Login => "login",
            CommandKind::Logout => "logout",
            CommandKind::GenerateWorkoutPlan => "generate_workout_plan",
            CommandKind::GenerateNutritionPlan => "generate_nutrition_plan",
            CommandKind::ListPlans => "list_plans",
            CommandKind::SubmitFeedback => "submit_feedback",
            CommandKind::AddProgress => "add_progress",
            CommandKind::ListProgress => "list_progress",
            CommandKind::ProgressStats => "progress_stats",
            CommandKind::DeleteProgress => "delete_progress",
            CommandKind::HealthCheck => "health_check",
        }
    }

    /// Commands that run on behalf of a signed-in user, where a rejected
    /// token means the session is over.
    pub fn requires_session(self) -> bool {
        !matches!(
            self,
            CommandKind::VerifySession
                | CommandKind::Register
                | CommandKind::Login
                | CommandKind::Logout
                | CommandKind::HealthCheck
        )
    }

    fn error_context(self) -> UiErrorContext {
        match self {
            CommandKind::VerifySession => UiErrorContext::Bootstrap,
            CommandKind::Register => UiErrorContext::Register,
            CommandKind::Login => UiErrorContext::Login,
            CommandKind::GenerateWorkoutPlan
            | CommandKind::GenerateNutritionPlan
            | CommandKind::ListPlans
            | CommandKind::SubmitFeedback => UiErrorContext::Plans,
            CommandKind::AddProgress
            | CommandKind::ListProgress
            | CommandKind::ProgressStats
            | CommandKind::DeleteProgress => UiErrorContext::Progress,
            CommandKind::Logout | CommandKind::HealthCheck => UiErrorContext::General,
        }
    }
}

/// Successful result of a backend command.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Authenticated(UserProfile),
    SessionVerified(UserProfile),
    SessionRejected,
    LoggedOut,
    WorkoutPlan(WorkoutPlan),
    NutritionPlan(NutritionPlan),
    Plans(MyPlansResponse),
    FeedbackSent(PlanFeedback),
    ProgressSaved(ProgressEntry),
    ProgressListed(ProgressListResponse),
    ProgressStats(ProgressStatsResponse),
    ProgressDeleted(ProgressEntryId),
    Health(HealthResponse),
}

/// Typed result of one controller operation, consumed by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub command: CommandKind,
    pub result: Result<Completion, UiError>,
}

impl Outcome {
    pub fn ok(command: CommandKind, completion: Completion) -> Self {
        Self {
            command,
            result: Ok(completion),
        }
    }

    pub fn failed(command: CommandKind, error: &GatewayError) -> Self {
        Self {
            command,
            result: Err(UiError::from_gateway(command.error_context(), error)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Bootstrap,
    Register,
    Login,
    Plans,
    Progress,
    General,
}

pub const NETWORK_FAILURE_MESSAGE: &str = "Server unreachable; check your connection and retry.";
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Unexpected response from server.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// User-facing failure: a category for policy decisions and a message safe
/// to show as a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_gateway(context: UiErrorContext, err: &GatewayError) -> Self {
        let (category, message) = match err {
            GatewayError::Backend { message, .. } if err.is_authorization_failure() => {
                (UiErrorCategory::Auth, message.clone())
            }
            GatewayError::Backend { status, message } if (400..500).contains(status) => {
                (UiErrorCategory::Validation, message.clone())
            }
            GatewayError::Backend { message, .. } => (UiErrorCategory::Unknown, message.clone()),
            GatewayError::Network { .. } => {
                (UiErrorCategory::Transport, NETWORK_FAILURE_MESSAGE.to_string())
            }
            GatewayError::MalformedResponse { .. } => {
                (UiErrorCategory::Unknown, MALFORMED_RESPONSE_MESSAGE.to_string())
            }
        };
        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_form(context: UiErrorContext, err: &FormError) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context,
            message: err.to_string(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
