mod answer_key;
mod ids;
mod letter;
mod order;
mod question;
mod score;
mod session;

pub use ids::{ParseIdError, QuestionId};
pub use letter::{LetterError, OptionLetter};

pub use answer_key::AnswerKey;
pub use order::{Order, OrderError};
pub use question::{ImageRef, Question, QuestionSet, QuestionSetError};
pub use score::{GradeStatus, ScoreRecord, ScoreStats, Scoreboard};
pub use session::{
    ProgressSnapshot, RestoreReport, RestoredProgress, SessionState, SessionStateError,
};
