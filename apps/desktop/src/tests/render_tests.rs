use super::*;
use shared::domain::{UserId, UserProfile};

fn user() -> UserProfile {
    UserProfile {
        id: UserId(1),
        name: "Ana".into(),
        email: "ana@example.com".into(),
        age: None,
        weight: None,
        height: None,
        goal: None,
        activity_level: None,
        experience_level: None,
        dietary_restrictions: Vec::new(),
        equipment_available: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn signed_out_landing_shows_notifications() {
    let mut state = AppState::default();
    state.operation.error = Some("Invalid credentials".into());

    let text = render(&state);
    assert!(text.starts_with("[landing] signed out"));
    assert!(text.contains("error: Invalid credentials"));
    assert!(!text.contains("ok:"));
}

#[test]
fn loading_replaces_authenticated_views() {
    let mut state = AppState::default();
    state.view = View::Workout;
    state.session.user = Some(user());
    state.operation.loading = true;

    assert_eq!(render(&state), "[ loading... ]\n");
}

#[test]
fn auth_forms_show_progress_inline() {
    let mut state = AppState::default();
    state.view = View::Login;
    state.operation.loading = true;

    let text = render(&state);
    assert!(text.contains("[login]"));
    assert!(text.contains("(working...)"));
}
