//! Line-oriented command parsing for the terminal front end.

use chrono::NaiveDate;
use shared::{
    domain::{PlanId, PlanKind, ProgressEntryId},
    protocol::{FeedbackRequest, ProgressEntryRequest},
};
use thiserror::Error;

use crate::controller::{UserAction, View};

pub const HELP: &str = "\
commands:
  register                              fill in the sign-up form
  login                                 sign in
  logout                                sign out
  go <view>                             landing|register|login|dashboard|workout|nutrition|progress|settings
  workout [weeks]                       generate a workout plan
  nutrition [weeks]                     generate a nutrition plan
  plans                                 list your plans
  feedback <kind> <plan_id> <rating> [text]
  progress add <date> [weight] [body_fat] [notes]
  progress list [days]
  progress stats
  progress delete <id>
  health                                check the backend
  dismiss error|success
  help
  quit";

/// Values used when an optional numeric argument is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellDefaults {
    pub plan_weeks: u32,
    pub progress_days: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Prompt for the register form, then submit it.
    Register,
    /// Prompt for credentials, then submit them.
    Login,
    Action(UserAction),
    Help,
    Quit,
}

impl ShellCommand {
    /// View a command's interactive form lives on, if it has one.
    pub fn form_view(&self) -> Option<View> {
        match self {
            ShellCommand::Register => Some(View::Register),
            ShellCommand::Login => Some(View::Login),
            ShellCommand::Action(_) | ShellCommand::Help | ShellCommand::Quit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command '{0}', type 'help'")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown view '{0}'")]
    UnknownView(String),
    #[error("invalid {field}: '{value}'")]
    InvalidArgument { field: &'static str, value: String },
}

fn number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidArgument {
        field,
        value: raw.to_string(),
    })
}

fn optional<T: std::str::FromStr>(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, ParseError> {
    match raw {
        None | Some("-") => Ok(None),
        Some(raw) => number(field, raw).map(Some),
    }
}

fn rest(words: &[&str]) -> Option<String> {
    let text = words.join(" ");
    (!text.is_empty()).then_some(text)
}

/// Returns `Ok(None)` for a blank line.
pub fn parse_line(line: &str, defaults: ShellDefaults) -> Result<Option<ShellCommand>, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "register" => ShellCommand::Register,
        "login" => ShellCommand::Login,
        "logout" => ShellCommand::Action(UserAction::Logout),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "plans" => ShellCommand::Action(UserAction::LoadPlans),
        "health" => ShellCommand::Action(UserAction::CheckHealth),
        "go" => {
            let [raw] = args else {
                return Err(ParseError::Usage("go <view>"));
            };
            let view = View::parse(raw).ok_or_else(|| ParseError::UnknownView(raw.to_string()))?;
            ShellCommand::Action(UserAction::Navigate(view))
        }
        "workout" | "nutrition" => {
            let duration_weeks = match args {
                [] => defaults.plan_weeks,
                [weeks] => number("weeks", weeks)?,
                _ => return Err(ParseError::Usage("workout|nutrition [weeks]")),
            };
            ShellCommand::Action(if head.eq_ignore_ascii_case("workout") {
                UserAction::GenerateWorkoutPlan { duration_weeks }
            } else {
                UserAction::GenerateNutritionPlan { duration_weeks }
            })
        }
        "feedback" => parse_feedback(args)?,
        "progress" => parse_progress(args, defaults)?,
        "dismiss" => match args {
            ["error"] => ShellCommand::Action(UserAction::DismissError),
            ["success"] => ShellCommand::Action(UserAction::DismissSuccess),
            _ => return Err(ParseError::Usage("dismiss error|success")),
        },
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_feedback(args: &[&str]) -> Result<ShellCommand, ParseError> {
    const USAGE: &str = "feedback <workout|nutrition> <plan_id> <rating> [text]";
    let [kind, plan_id, rating, text @ ..] = args else {
        return Err(ParseError::Usage(USAGE));
    };
    let plan_type = PlanKind::parse(kind).ok_or_else(|| ParseError::InvalidArgument {
        field: "plan kind",
        value: kind.to_string(),
    })?;
    Ok(ShellCommand::Action(UserAction::SubmitFeedback(
        FeedbackRequest {
            plan_type,
            plan_id: PlanId(number("plan id", plan_id)?),
            rating: number("rating", rating)?,
            feedback_text: rest(text),
            difficulty_rating: None,
            satisfaction_rating: None,
        },
    )))
}

fn parse_progress(args: &[&str], defaults: ShellDefaults) -> Result<ShellCommand, ParseError> {
    const USAGE: &str = "progress add|list|stats|delete ...";
    let action = match args {
        ["add", date, tail @ ..] => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                ParseError::InvalidArgument {
                    field: "date (YYYY-MM-DD)",
                    value: date.to_string(),
                }
            })?;
            UserAction::AddProgress(ProgressEntryRequest {
                date,
                weight: optional("weight", tail.first().copied())?,
                body_fat_percentage: optional("body fat", tail.get(1).copied())?,
                measurements: None,
                notes: tail.get(2..).and_then(rest),
            })
        }
        ["list"] => UserAction::LoadProgress {
            days: defaults.progress_days,
        },
        ["list", days] => UserAction::LoadProgress {
            days: number("days", days)?,
        },
        ["stats"] => UserAction::LoadProgressStats,
        ["delete", id] => UserAction::DeleteProgress {
            id: ProgressEntryId(number("entry id", id)?),
        },
        _ => return Err(ParseError::Usage(USAGE)),
    };
    Ok(ShellCommand::Action(action))
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
