use super::*;
use crate::controller::events::{LoginForm, RegisterForm};
use chrono::{Datelike, NaiveDate};
use client_core::GatewayError;
use shared::{
    domain::{PlanId, PlanKind, ProgressEntry, ProgressEntryId, UserId},
    protocol::FeedbackRequest,
};

fn user() -> UserProfile {
    UserProfile {
        id: UserId(1),
        name: "Ana".into(),
        email: "ana@example.com".into(),
        age: Some(29),
        weight: Some(61.5),
        height: Some(168.0),
        goal: Some("gain_muscle".into()),
        activity_level: Some("moderate".into()),
        experience_level: Some("beginner".into()),
        dietary_restrictions: Vec::new(),
        equipment_available: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

fn signed_in(view: View) -> AppState {
    AppState {
        view,
        session: Session { user: Some(user()) },
        ..AppState::default()
    }
}

fn at(view: View) -> AppState {
    AppState {
        view,
        ..AppState::default()
    }
}

fn register_form() -> RegisterForm {
    RegisterForm {
        name: "Ana".into(),
        email: "ana@example.com".into(),
        password: "secret".into(),
        age: "29".into(),
        weight: "61.5".into(),
        height: "168".into(),
        goal: "gain_muscle".into(),
    }
}

fn progress_entry(id: i64, day: u32, weight: f64) -> ProgressEntry {
    ProgressEntry {
        id: ProgressEntryId(id),
        user_id: UserId(1),
        date: NaiveDate::from_ymd_opt(2024, 5, day).expect("date"),
        weight: Some(weight),
        body_fat_percentage: None,
        measurements: serde_json::Value::Null,
        notes: None,
        created_at: None,
    }
}

fn failed(command: CommandKind, status: u16, message: &str) -> Outcome {
    Outcome::failed(command, &GatewayError::backend(status, message))
}

#[test]
fn landing_offers_register_and_login() {
    let mut state = at(View::Landing);
    assert_eq!(
        transition(&mut state, UserAction::Navigate(View::Register)),
        Transition::Applied
    );
    assert_eq!(state.view, View::Register);

    assert_eq!(
        transition(&mut state, UserAction::Navigate(View::Landing)),
        Transition::Applied
    );
    assert_eq!(
        transition(&mut state, UserAction::Navigate(View::Login)),
        Transition::Applied
    );
    assert_eq!(state.view, View::Login);
}

#[test]
fn authenticated_views_are_unreachable_without_a_user() {
    for target in View::ALL.into_iter().filter(|view| view.is_authenticated()) {
        let mut state = at(View::Landing);
        assert_eq!(
            transition(&mut state, UserAction::Navigate(target)),
            Transition::Ignored,
            "{target} must not be reachable signed out"
        );
        assert_eq!(state.view, View::Landing);
    }
}

#[test]
fn signed_in_user_cannot_wander_back_to_auth_forms() {
    let mut state = signed_in(View::Dashboard);
    let before = state.clone();
    assert_eq!(
        transition(&mut state, UserAction::Navigate(View::Login)),
        Transition::Ignored
    );
    assert_eq!(state, before);
}

#[test]
fn navigation_between_authenticated_views_is_allowed_while_loading() {
    let mut state = signed_in(View::Workout);
    state.operation.loading = true;

    assert_eq!(
        transition(&mut state, UserAction::Navigate(View::Progress)),
        Transition::Applied
    );
    assert_eq!(state.view, View::Progress);
    assert!(state.operation.loading);
}

#[test]
fn leaving_an_auth_form_is_blocked_while_its_submit_is_in_flight() {
    let mut state = at(View::Register);
    state.operation.loading = true;

    assert_eq!(
        transition(&mut state, UserAction::Navigate(View::Landing)),
        Transition::Ignored
    );
    assert_eq!(state.view, View::Register);
}

#[test]
fn network_actions_are_no_ops_while_loading() {
    let cases = [
        (signed_in(View::Workout), UserAction::GenerateWorkoutPlan { duration_weeks: 4 }),
        (signed_in(View::Nutrition), UserAction::GenerateNutritionPlan { duration_weeks: 4 }),
        (signed_in(View::Dashboard), UserAction::LoadPlans),
        (signed_in(View::Dashboard), UserAction::Logout),
        (signed_in(View::Progress), UserAction::LoadProgress { days: 30 }),
        (at(View::Register), UserAction::SubmitRegister(register_form())),
        (at(View::Landing), UserAction::CheckHealth),
    ];

    for (mut state, action) in cases {
        state.operation.loading = true;
        state.operation.success = Some("earlier".into());
        let before = state.clone();

        assert_eq!(transition(&mut state, action.clone()), Transition::Ignored);
        assert_eq!(state, before, "{action:?} must leave state untouched");
    }
}

#[test]
fn valid_register_submit_dispatches_and_keeps_the_form_visible() {
    let mut state = at(View::Register);
    state.operation.error = Some("previous failure".into());

    let step = transition(&mut state, UserAction::SubmitRegister(register_form()));

    match step {
        Transition::Dispatch(BackendCommand::Register(request)) => {
            assert_eq!(request.age, 29);
            assert_eq!(request.height, 168.0);
            assert_eq!(request.goal, shared::domain::Goal::GainMuscle);
        }
        other => panic!("unexpected transition: {other:?}"),
    }
    assert!(state.operation.loading);
    assert_eq!(state.operation.error, None);
    assert!(!state.blocks_rendering());
}

#[test]
fn invalid_forms_report_the_field_without_a_backend_call() {
    let mut state = at(View::Register);
    let mut form = register_form();
    form.age = "twenty".into();

    assert_eq!(
        transition(&mut state, UserAction::SubmitRegister(form)),
        Transition::Applied
    );
    assert_eq!(
        state.operation.error.as_deref(),
        Some("age must be a number, got 'twenty'")
    );
    assert!(!state.operation.loading);

    let mut state = at(View::Login);
    let step = transition(
        &mut state,
        UserAction::SubmitLogin(LoginForm {
            email: "  ".into(),
            password: "secret".into(),
        }),
    );
    assert_eq!(step, Transition::Applied);
    assert_eq!(state.operation.error.as_deref(), Some("email is required"));
}

#[test]
fn plan_generation_only_starts_from_its_own_view() {
    let mut state = signed_in(View::Dashboard);
    assert_eq!(
        transition(&mut state, UserAction::GenerateWorkoutPlan { duration_weeks: 4 }),
        Transition::Ignored
    );

    let mut state = signed_in(View::Workout);
    assert_eq!(
        transition(&mut state, UserAction::GenerateWorkoutPlan { duration_weeks: 4 }),
        Transition::Dispatch(BackendCommand::GenerateWorkoutPlan { duration_weeks: 4 })
    );
    assert!(state.blocks_rendering());
}

#[test]
fn out_of_range_feedback_rating_is_rejected_locally() {
    let mut state = signed_in(View::Workout);
    let payload = FeedbackRequest {
        plan_type: PlanKind::Workout,
        plan_id: PlanId(1),
        rating: 4,
        feedback_text: None,
        difficulty_rating: Some(9),
        satisfaction_rating: None,
    };

    assert_eq!(
        transition(&mut state, UserAction::SubmitFeedback(payload)),
        Transition::Applied
    );
    assert_eq!(
        state.operation.error.as_deref(),
        Some("rating must be between 1 and 5, got 9")
    );
}

#[test]
fn register_rejection_stays_on_form_with_backend_message() {
    let mut state = at(View::Register);
    transition(&mut state, UserAction::SubmitRegister(register_form()));

    let follow_up = apply_outcome(
        &mut state,
        failed(CommandKind::Register, 400, "email already exists"),
    );

    assert_eq!(follow_up, FollowUp::None);
    assert_eq!(state.view, View::Register);
    assert_eq!(
        state.operation.error.as_deref(),
        Some("email already exists")
    );
    assert_eq!(state.session.user, None);
    assert!(!state.operation.loading);
}

#[test]
fn bad_credentials_are_an_error_not_a_session_expiry() {
    let mut state = at(View::Login);
    transition(
        &mut state,
        UserAction::SubmitLogin(LoginForm {
            email: "ana@example.com".into(),
            password: "wrong".into(),
        }),
    );

    let follow_up = apply_outcome(
        &mut state,
        failed(CommandKind::Login, 401, "Invalid credentials"),
    );

    assert_eq!(follow_up, FollowUp::None);
    assert_eq!(state.view, View::Login);
    assert_eq!(state.operation.error.as_deref(), Some("Invalid credentials"));
}

#[test]
fn successful_login_lands_on_dashboard_with_user() {
    let mut state = at(View::Login);
    state.operation.loading = true;

    let follow_up = apply_outcome(
        &mut state,
        Outcome::ok(CommandKind::Login, Completion::Authenticated(user())),
    );

    assert_eq!(follow_up, FollowUp::None);
    assert_eq!(state.view, View::Dashboard);
    assert_eq!(state.session.user, Some(user()));
    assert_eq!(state.operation.success.as_deref(), Some("Welcome back!"));
}

#[test]
fn expired_token_during_authenticated_action_signs_out() {
    let mut state = signed_in(View::Workout);
    transition(&mut state, UserAction::GenerateWorkoutPlan { duration_weeks: 4 });

    let follow_up = apply_outcome(
        &mut state,
        failed(CommandKind::GenerateWorkoutPlan, 401, "Token expirado"),
    );

    assert_eq!(follow_up, FollowUp::DiscardToken);
    assert_eq!(state.view, View::Landing);
    assert_eq!(state.session.user, None);
    assert_eq!(
        state.operation.error.as_deref(),
        Some(SESSION_EXPIRED_MESSAGE)
    );
}

#[test]
fn workout_plan_success_keeps_view_and_replaces_notifications() {
    let mut state = signed_in(View::Workout);
    state.operation.error = Some("stale".into());
    transition(&mut state, UserAction::GenerateWorkoutPlan { duration_weeks: 4 });

    let plan = WorkoutPlan {
        id: PlanId(10),
        user_id: UserId(1),
        title: "Workout plan".into(),
        description: None,
        duration_weeks: 4,
        difficulty_level: Some("beginner".into()),
        plan_data: serde_json::json!({}),
        ai_generated: true,
        created_at: None,
        is_active: true,
    };
    apply_outcome(
        &mut state,
        Outcome::ok(
            CommandKind::GenerateWorkoutPlan,
            Completion::WorkoutPlan(plan.clone()),
        ),
    );

    assert_eq!(state.view, View::Workout);
    assert_eq!(state.operation.error, None);
    assert_eq!(
        state.operation.success.as_deref(),
        Some("Workout plan generated successfully!")
    );
    assert_eq!(state.latest.workout_plan, Some(plan));
}

#[test]
fn non_auth_failure_keeps_session_and_view() {
    let mut state = signed_in(View::Nutrition);
    transition(&mut state, UserAction::GenerateNutritionPlan { duration_weeks: 4 });

    let follow_up = apply_outcome(
        &mut state,
        failed(CommandKind::GenerateNutritionPlan, 500, "Error interno del servidor"),
    );

    assert_eq!(follow_up, FollowUp::None);
    assert_eq!(state.view, View::Nutrition);
    assert!(state.session.is_authenticated());
    assert_eq!(
        state.operation.error.as_deref(),
        Some("Error interno del servidor")
    );
}

#[test]
fn logout_outcome_clears_everything_but_the_success_notice() {
    let mut state = signed_in(View::Settings);
    state.latest.plans = Some(Default::default());
    assert_eq!(
        transition(&mut state, UserAction::Logout),
        Transition::Dispatch(BackendCommand::Logout)
    );

    apply_outcome(
        &mut state,
        Outcome::ok(CommandKind::Logout, Completion::LoggedOut),
    );

    assert_eq!(state.view, View::Landing);
    assert_eq!(state.session, Session::default());
    assert_eq!(state.latest, LatestResults::default());
    assert_eq!(
        state.operation.success.as_deref(),
        Some("Signed out successfully")
    );
}

#[test]
fn dismissing_one_notification_leaves_the_other() {
    let mut state = signed_in(View::Dashboard);
    state.operation.error = Some("boom".into());
    state.operation.success = Some("yay".into());

    transition(&mut state, UserAction::DismissError);
    assert_eq!(state.operation.error, None);
    assert_eq!(state.operation.success.as_deref(), Some("yay"));

    state.operation.error = Some("boom again".into());
    transition(&mut state, UserAction::DismissSuccess);
    assert_eq!(state.operation.success, None);
    assert_eq!(state.operation.error.as_deref(), Some("boom again"));
}

#[test]
fn bootstrap_without_token_settles_on_landing_immediately() {
    let mut state = AppState::default();
    assert_eq!(begin_bootstrap(&mut state, false), Transition::Applied);
    assert_eq!(state.view, View::Landing);
    assert!(!state.operation.loading);
}

#[test]
fn bootstrap_rejection_is_silent_and_discards_token() {
    let mut state = AppState::default();
    assert_eq!(
        begin_bootstrap(&mut state, true),
        Transition::Dispatch(BackendCommand::VerifySession)
    );
    assert!(state.blocks_rendering());

    let follow_up = apply_outcome(
        &mut state,
        failed(CommandKind::VerifySession, 401, "Token inválido"),
    );

    assert_eq!(follow_up, FollowUp::DiscardToken);
    assert_eq!(state.view, View::Landing);
    assert_eq!(state.session.user, None);
    assert_eq!(state.operation, OperationState::default());
}

#[test]
fn saved_progress_replaces_the_cached_entry_for_that_day() {
    let mut state = signed_in(View::Progress);
    state.latest.progress = Some(ProgressListResponse {
        entries: vec![progress_entry(2, 3, 61.0), progress_entry(1, 2, 61.4)],
        summary: serde_json::Value::Null,
    });

    apply_outcome(
        &mut state,
        Outcome::ok(
            CommandKind::AddProgress,
            Completion::ProgressSaved(progress_entry(2, 3, 60.8)),
        ),
    );
    apply_outcome(
        &mut state,
        Outcome::ok(
            CommandKind::DeleteProgress,
            Completion::ProgressDeleted(ProgressEntryId(1)),
        ),
    );

    let entries = &state.latest.progress.as_ref().expect("progress").entries;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].weight, Some(60.8));
}

#[test]
fn saving_an_older_day_keeps_entries_newest_first() {
    let mut state = signed_in(View::Progress);
    state.latest.progress = Some(ProgressListResponse {
        entries: vec![progress_entry(2, 10, 61.0), progress_entry(1, 5, 61.4)],
        summary: serde_json::Value::Null,
    });

    for (id, day) in [(3, 1), (4, 7), (5, 12)] {
        apply_outcome(
            &mut state,
            Outcome::ok(
                CommandKind::AddProgress,
                Completion::ProgressSaved(progress_entry(id, day, 60.0)),
            ),
        );
    }

    let days: Vec<u32> = state
        .latest
        .progress
        .as_ref()
        .expect("progress")
        .entries
        .iter()
        .map(|entry| entry.date.day())
        .collect();
    assert_eq!(days, vec![12, 10, 7, 5, 1]);
}

#[test]
fn missing_user_404_is_reported_without_signing_out() {
    let mut state = signed_in(View::Progress);
    transition(&mut state, UserAction::LoadProgressStats);

    let follow_up = apply_outcome(
        &mut state,
        failed(CommandKind::ProgressStats, 404, "Usuario no encontrado"),
    );

    assert_eq!(follow_up, FollowUp::None);
    assert_eq!(state.view, View::Progress);
    assert!(state.session.is_authenticated());
    assert_eq!(
        state.operation.error.as_deref(),
        Some("Usuario no encontrado")
    );
}
