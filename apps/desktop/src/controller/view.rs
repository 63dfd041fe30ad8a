//! Closed set of screens the client can show.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Landing,
    Register,
    Login,
    Dashboard,
    Workout,
    Nutrition,
    Progress,
    Settings,
}

impl View {
    pub const ALL: [View; 8] = [
        View::Landing,
        View::Register,
        View::Login,
        View::Dashboard,
        View::Workout,
        View::Nutrition,
        View::Progress,
        View::Settings,
    ];

    /// Views that only make sense with a signed-in user.
    pub fn is_authenticated(self) -> bool {
        match self {
            View::Landing | View::Register | View::Login => false,
            View::Dashboard | View::Workout | View::Nutrition | View::Progress | View::Settings => {
                true
            }
        }
    }

    /// Register and login draw their own in-progress state on the submit
    /// button instead of being replaced by the full-screen loading indicator.
    pub fn shows_inline_progress(self) -> bool {
        matches!(self, View::Register | View::Login)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            View::Landing => "landing",
            View::Register => "register",
            View::Login => "login",
            View::Dashboard => "dashboard",
            View::Workout => "workout",
            View::Nutrition => "nutrition",
            View::Progress => "progress",
            View::Settings => "settings",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|view| view.as_str() == raw)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
