//! Plain-text rendering of the controller state.

use std::fmt::Write as _;

use crate::controller::{AppState, View};

pub fn render(state: &AppState) -> String {
    let mut out = String::new();
    if state.blocks_rendering() {
        out.push_str("[ loading... ]\n");
        return out;
    }

    let _ = write!(out, "[{}]", state.view);
    match &state.session.user {
        Some(user) => {
            let _ = write!(out, " signed in as {} <{}>", user.name, user.email);
        }
        None => out.push_str(" signed out"),
    }
    if state.operation.loading {
        out.push_str(" (working...)");
    }
    out.push('\n');

    if let Some(error) = &state.operation.error {
        let _ = writeln!(out, "  error: {error}");
    }
    if let Some(success) = &state.operation.success {
        let _ = writeln!(out, "  ok: {success}");
    }
    render_latest(state, &mut out);
    out
}

fn render_latest(state: &AppState, out: &mut String) {
    let latest = &state.latest;
    match state.view {
        View::Workout => {
            if let Some(plan) = &latest.workout_plan {
                let _ = writeln!(
                    out,
                    "  workout #{} '{}' ({} weeks)",
                    plan.id, plan.title, plan.duration_weeks
                );
            }
        }
        View::Nutrition => {
            if let Some(plan) = &latest.nutrition_plan {
                let _ = writeln!(
                    out,
                    "  nutrition #{} '{}' ({} kcal/day, {} weeks)",
                    plan.id, plan.title, plan.daily_calories, plan.duration_weeks
                );
            }
        }
        View::Dashboard => {
            if let Some(plans) = &latest.plans {
                for plan in &plans.workout_plans {
                    let _ = writeln!(out, "  workout #{} {}", plan.id, plan.title);
                }
                for plan in &plans.nutrition_plans {
                    let _ = writeln!(out, "  nutrition #{} {}", plan.id, plan.title);
                }
            }
        }
        View::Progress => {
            if let Some(progress) = &latest.progress {
                for entry in &progress.entries {
                    let weight = entry
                        .weight
                        .map(|w| format!("{w:.1} kg"))
                        .unwrap_or_else(|| "-".into());
                    let _ = writeln!(out, "  #{} {} {}", entry.id, entry.date, weight);
                }
            }
            if let Some(stats) = &latest.progress_stats {
                let _ = writeln!(out, "  stats: {}", stats.stats);
            }
        }
        View::Landing | View::Register | View::Login | View::Settings => {}
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
