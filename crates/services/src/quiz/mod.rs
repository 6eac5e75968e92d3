//! The quiz controller and the view derived from it.

mod action;
mod controller;
mod view;

pub use action::{ActionOutcome, QuizAction, action_for_key};
pub use controller::QuizController;
pub use view::{AnswerPanel, Badge, OptionState, OptionView, QuizView, ThumbnailView, build_view};
