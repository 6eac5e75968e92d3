#![forbid(unsafe_code)]

pub mod answer_key_service;
pub mod app_services;
pub mod assets;
pub mod error;
pub mod grading;
pub mod progress_service;
pub mod quiz;

pub use quiz_core::Clock;

pub use answer_key_service::{AnswerKeyOrigin, AnswerKeyService};
pub use app_services::AppServices;
pub use assets::{AssetLocation, AssetSource, DirAssetSource, HttpAssetSource};
pub use error::{AppServicesError, AssetError, ImportError, QuizError};
pub use grading::{GradingService, SelectionOutcome};
pub use progress_service::ProgressService;
pub use quiz::{ActionOutcome, QuizAction, QuizController, QuizView};
