//! Runs backend commands produced by the reducer and folds their outcomes
//! back into the application state.

use std::sync::Arc;

use client_core::Gateway;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    events::{BackendCommand, Completion, Outcome, UserAction},
    reducer::{apply_outcome, begin_bootstrap, transition, AppState, FollowUp, Transition},
    view::View,
};

/// Owns the session and view state; the gateway is injected.
///
/// The state lock is never held across a gateway call, so actions arriving
/// while an operation is in flight see `loading == true` and are refused by
/// the reducer instead of queueing.
pub struct SessionController {
    gateway: Arc<dyn Gateway>,
    state: Mutex<AppState>,
}

impl SessionController {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(AppState::default()),
        }
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    /// Startup check: verify a restored token before the first interactive
    /// view is chosen.
    pub async fn bootstrap(&self) -> View {
        let step = {
            let mut state = self.state.lock().await;
            begin_bootstrap(&mut state, self.gateway.has_token())
        };
        if let Transition::Dispatch(command) = step {
            self.run(command).await;
        }
        let view = self.state.lock().await.view;
        info!(%view, "bootstrap finished");
        view
    }

    pub async fn handle(&self, action: UserAction) -> Transition {
        let step = {
            let mut state = self.state.lock().await;
            transition(&mut state, action)
        };
        match &step {
            Transition::Dispatch(command) => self.run(command.clone()).await,
            Transition::Ignored => debug!("action ignored in current state"),
            Transition::Applied => {}
        }
        step
    }

    /// Brings up an unauthenticated form, going through `Landing` if needed.
    /// Returns whether the form is now showing.
    pub async fn open_form(&self, form: View) -> bool {
        if self.snapshot().await.view != form {
            self.handle(UserAction::Navigate(View::Landing)).await;
            self.handle(UserAction::Navigate(form)).await;
        }
        self.snapshot().await.view == form
    }

    async fn run(&self, command: BackendCommand) {
        let kind = command.kind();
        debug!(command = kind.name(), "dispatching backend command");
        let outcome = self.execute(command).await;

        let follow_up = {
            let mut state = self.state.lock().await;
            apply_outcome(&mut state, outcome)
        };
        if follow_up == FollowUp::DiscardToken {
            self.gateway.logout();
        }
    }

    async fn execute(&self, command: BackendCommand) -> Outcome {
        let kind = command.kind();
        let gateway = self.gateway.as_ref();
        let result = match command {
            BackendCommand::VerifySession => gateway.verify_session().await.map(|verified| {
                if verified.valid {
                    Completion::SessionVerified(verified.user)
                } else {
                    Completion::SessionRejected
                }
            }),
            BackendCommand::Register(profile) => gateway
                .register(&profile)
                .await
                .map(|auth| Completion::Authenticated(auth.user)),
            BackendCommand::Login(credentials) => gateway
                .login(&credentials)
                .await
                .map(|auth| Completion::Authenticated(auth.user)),
            BackendCommand::Logout => {
                gateway.logout();
                Ok(Completion::LoggedOut)
            }
            BackendCommand::GenerateWorkoutPlan { duration_weeks } => gateway
                .generate_workout_plan(duration_weeks)
                .await
                .map(|response| Completion::WorkoutPlan(response.plan)),
            BackendCommand::GenerateNutritionPlan { duration_weeks } => gateway
                .generate_nutrition_plan(duration_weeks)
                .await
                .map(|response| Completion::NutritionPlan(response.plan)),
            BackendCommand::ListPlans => gateway.list_plans().await.map(Completion::Plans),
            BackendCommand::SubmitFeedback(payload) => gateway
                .submit_feedback(&payload)
                .await
                .map(|response| Completion::FeedbackSent(response.feedback)),
            BackendCommand::AddProgress(entry) => gateway
                .add_progress_entry(&entry)
                .await
                .map(|response| Completion::ProgressSaved(response.entry)),
            BackendCommand::ListProgress { days } => gateway
                .list_progress_entries(days)
                .await
                .map(Completion::ProgressListed),
            BackendCommand::ProgressStats => gateway
                .progress_stats()
                .await
                .map(Completion::ProgressStats),
            BackendCommand::DeleteProgress { id } => gateway
                .delete_progress_entry(id)
                .await
                .map(|_| Completion::ProgressDeleted(id)),
            BackendCommand::HealthCheck => gateway.health_check().await.map(Completion::Health),
        };

        match result {
            Ok(completion) => Outcome::ok(kind, completion),
            Err(err) => {
                debug!(command = kind.name(), error = %err, "backend command failed");
                Outcome::failed(kind, &err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
