//! Pure state transitions: user actions in, view/notification changes and
//! backend commands out. No I/O happens here.

use shared::{
    domain::{NutritionPlan, UserProfile, WorkoutPlan},
    protocol::{MyPlansResponse, ProgressListResponse, ProgressStatsResponse},
};

use super::{
    events::{
        validate_feedback, BackendCommand, CommandKind, Completion, FormError, Outcome, UiError,
        UiErrorContext, UserAction, SESSION_EXPIRED_MESSAGE,
    },
    view::View,
};

/// Signed-in user, present only after the backend accepted the token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Most recent payload of each data-fetching operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatestResults {
    pub workout_plan: Option<WorkoutPlan>,
    pub nutrition_plan: Option<NutritionPlan>,
    pub plans: Option<MyPlansResponse>,
    pub progress: Option<ProgressListResponse>,
    pub progress_stats: Option<ProgressStatsResponse>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub view: View,
    pub session: Session,
    pub operation: OperationState,
    pub latest: LatestResults,
}

impl AppState {
    /// Whether the full-screen loading indicator replaces the active view.
    pub fn blocks_rendering(&self) -> bool {
        self.operation.loading && !self.view.shows_inline_progress()
    }

    fn begin(&mut self, command: BackendCommand) -> Transition {
        self.operation.loading = true;
        self.operation.error = None;
        Transition::Dispatch(command)
    }

    fn reject_form(&mut self, context: UiErrorContext, err: &FormError) -> Transition {
        self.operation.error = Some(UiError::from_form(context, err).message().to_string());
        Transition::Applied
    }

    fn clear_session(&mut self) {
        self.session = Session::default();
        self.latest = LatestResults::default();
        self.view = View::Landing;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Not allowed from the current state; nothing changed.
    Ignored,
    /// Handled locally without a backend call.
    Applied,
    /// Loading has started; the command must be executed and its outcome
    /// fed back through [`apply_outcome`].
    Dispatch(BackendCommand),
}

/// What the orchestrator must do after an outcome has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    None,
    DiscardToken,
}

/// Starts the startup verification when a token was restored.
pub fn begin_bootstrap(state: &mut AppState, has_token: bool) -> Transition {
    if !has_token {
        state.view = View::Landing;
        return Transition::Applied;
    }
    state.operation.loading = true;
    Transition::Dispatch(BackendCommand::VerifySession)
}

pub fn transition(state: &mut AppState, action: UserAction) -> Transition {
    let loading = state.operation.loading;
    let authenticated = state.session.is_authenticated();
    let view = state.view;

    match action {
        UserAction::DismissError => {
            state.operation.error = None;
            Transition::Applied
        }
        UserAction::DismissSuccess => {
            state.operation.success = None;
            Transition::Applied
        }
        UserAction::Navigate(target) => {
            let allowed = target != view
                && match (view.is_authenticated(), target.is_authenticated()) {
                    // Pure view change; permitted while an operation runs.
                    (true, true) => authenticated,
                    (false, false) => !loading,
                    (true, false) | (false, true) => false,
                };
            if !allowed {
                return Transition::Ignored;
            }
            state.view = target;
            Transition::Applied
        }
        _ if loading => Transition::Ignored,
        UserAction::SubmitRegister(form) if view == View::Register => match form.validate() {
            Ok(request) => state.begin(BackendCommand::Register(request)),
            Err(err) => state.reject_form(UiErrorContext::Register, &err),
        },
        UserAction::SubmitLogin(form) if view == View::Login => match form.validate() {
            Ok(request) => state.begin(BackendCommand::Login(request)),
            Err(err) => state.reject_form(UiErrorContext::Login, &err),
        },
        UserAction::CheckHealth => state.begin(BackendCommand::HealthCheck),
        _ if !authenticated || !view.is_authenticated() => Transition::Ignored,
        UserAction::Logout => state.begin(BackendCommand::Logout),
        UserAction::GenerateWorkoutPlan { duration_weeks } if view == View::Workout => {
            state.begin(BackendCommand::GenerateWorkoutPlan { duration_weeks })
        }
        UserAction::GenerateNutritionPlan { duration_weeks } if view == View::Nutrition => {
            state.begin(BackendCommand::GenerateNutritionPlan { duration_weeks })
        }
        UserAction::LoadPlans
            if matches!(view, View::Dashboard | View::Workout | View::Nutrition) =>
        {
            state.begin(BackendCommand::ListPlans)
        }
        UserAction::SubmitFeedback(payload) if matches!(view, View::Workout | View::Nutrition) => {
            match validate_feedback(&payload) {
                Ok(()) => state.begin(BackendCommand::SubmitFeedback(payload)),
                Err(err) => state.reject_form(UiErrorContext::Plans, &err),
            }
        }
        UserAction::AddProgress(entry) if view == View::Progress => {
            state.begin(BackendCommand::AddProgress(entry))
        }
        UserAction::LoadProgress { days } if view == View::Progress => {
            state.begin(BackendCommand::ListProgress { days })
        }
        UserAction::LoadProgressStats if view == View::Progress => {
            state.begin(BackendCommand::ProgressStats)
        }
        UserAction::DeleteProgress { id } if view == View::Progress => {
            state.begin(BackendCommand::DeleteProgress { id })
        }
        UserAction::SubmitRegister(_)
        | UserAction::SubmitLogin(_)
        | UserAction::GenerateWorkoutPlan { .. }
        | UserAction::GenerateNutritionPlan { .. }
        | UserAction::LoadPlans
        | UserAction::SubmitFeedback(_)
        | UserAction::AddProgress(_)
        | UserAction::LoadProgress { .. }
        | UserAction::LoadProgressStats
        | UserAction::DeleteProgress { .. } => Transition::Ignored,
    }
}

fn success_message(command: CommandKind, completion: &Completion) -> Option<String> {
    let fixed = match completion {
        Completion::SessionVerified(_) | Completion::SessionRejected => return None,
        Completion::Health(health) => {
            return Some(
                health
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Backend status: {}", health.status)),
            )
        }
        Completion::Authenticated(_) if command == CommandKind::Register => {
            "Account created successfully!"
        }
        Completion::Authenticated(_) => "Welcome back!",
        Completion::LoggedOut => "Signed out successfully",
        Completion::WorkoutPlan(_) => "Workout plan generated successfully!",
        Completion::NutritionPlan(_) => "Nutrition plan generated successfully!",
        Completion::Plans(_) => "Plans loaded",
        Completion::FeedbackSent(_) => "Feedback sent successfully!",
        Completion::ProgressSaved(_) => "Progress saved",
        Completion::ProgressListed(_) => "Progress loaded",
        Completion::ProgressStats(_) => "Progress statistics loaded",
        Completion::ProgressDeleted(_) => "Progress entry deleted",
    };
    Some(fixed.to_string())
}

/// Notification reducer: folds a finished operation back into the state.
pub fn apply_outcome(state: &mut AppState, outcome: Outcome) -> FollowUp {
    state.operation.loading = false;

    match outcome.result {
        Ok(completion) => {
            state.operation.error = None;
            if let Some(message) = success_message(outcome.command, &completion) {
                state.operation.success = Some(message);
            }
            apply_completion(state, completion)
        }
        Err(err) if outcome.command == CommandKind::VerifySession => {
            tracing::info!(
                reason = err.message(),
                "persisted session rejected at startup"
            );
            state.clear_session();
            FollowUp::DiscardToken
        }
        Err(err) if err.requires_reauth() && outcome.command.requires_session() => {
            tracing::warn!(
                command = outcome.command.name(),
                "authorization rejected; clearing session"
            );
            state.clear_session();
            state.operation.error = Some(SESSION_EXPIRED_MESSAGE.to_string());
            FollowUp::DiscardToken
        }
        Err(err) => {
            tracing::debug!(
                command = outcome.command.name(),
                category = ?err.category(),
                context = ?err.context(),
                "operation failed"
            );
            state.operation.error = Some(err.message().to_string());
            FollowUp::None
        }
    }
}

fn apply_completion(state: &mut AppState, completion: Completion) -> FollowUp {
    match completion {
        Completion::Authenticated(user) | Completion::SessionVerified(user) => {
            state.session.user = Some(user);
            state.view = View::Dashboard;
        }
        Completion::SessionRejected => {
            state.clear_session();
            return FollowUp::DiscardToken;
        }
        Completion::LoggedOut => state.clear_session(),
        Completion::WorkoutPlan(plan) => state.latest.workout_plan = Some(plan),
        Completion::NutritionPlan(plan) => state.latest.nutrition_plan = Some(plan),
        Completion::Plans(plans) => state.latest.plans = Some(plans),
        Completion::ProgressListed(progress) => state.latest.progress = Some(progress),
        Completion::ProgressStats(stats) => state.latest.progress_stats = Some(stats),
        Completion::ProgressSaved(entry) => {
            if let Some(progress) = state.latest.progress.as_mut() {
                // Entries are cached newest first.
                let entries = &mut progress.entries;
                entries.retain(|existing| existing.date != entry.date);
                let at = entries
                    .iter()
                    .position(|existing| existing.date < entry.date)
                    .unwrap_or(entries.len());
                entries.insert(at, entry);
            }
        }
        Completion::ProgressDeleted(id) => {
            if let Some(progress) = state.latest.progress.as_mut() {
                progress.entries.retain(|existing| existing.id != id);
            }
        }
        Completion::FeedbackSent(_) | Completion::Health(_) => {}
    }
    FollowUp::None
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
