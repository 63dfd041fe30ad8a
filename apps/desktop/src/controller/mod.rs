//! Controller layer: view states, user actions, the reducer, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;
pub mod view;

pub use events::{LoginForm, RegisterForm, UserAction};
pub use orchestration::SessionController;
pub use reducer::AppState;
pub use view::View;
