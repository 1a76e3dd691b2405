//! Error types for the castaway ledger

use thiserror::Error;


pub type Result<T> = std::result::Result<T, LedgerError>;

/// Broad classification of a [`LedgerError`], used by callers to map failures
/// onto their own response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; surfaced to the caller verbatim, never retried.
    Validation,
    /// Operation not legal for the current state of the record (e.g. scored question).
    State,
    /// Unknown question, team, league season, ...
    NotFound,
    /// Storage or I/O failure.
    Internal,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("League season not provided and {env_var} environment variable not set")]
    MissingLeagueSeason { env_var: String },

    #[error("Failed to parse id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Question {question_id} does not belong to league season {league_season_id}")]
    LeagueSeasonMismatch {
        question_id: i64,
        league_season_id: i64,
    },

    #[error("Submissions for episode {episode} closed at air time")]
    DeadlinePassed { episode: u16 },

    #[error("Wager {wager} is outside the allowed range [{min}, {max}]")]
    WagerOutOfRange { wager: i64, min: i64, max: i64 },

    #[error("Question {question_id} requires a wager amount")]
    WagerRequired { question_id: i64 },

    #[error("'{answer}' is not one of the options for question {question_id}")]
    InvalidOption { question_id: i64, answer: String },

    #[error("Answer must not be empty")]
    EmptyAnswer,

    #[error("Question {question_id} appears more than once in the scoring batch")]
    DuplicateQuestion { question_id: i64 },

    #[error("Invalid question: {reason}")]
    InvalidQuestion { reason: String },

    #[error("Invalid roster interval: {reason}")]
    InvalidInterval { reason: String },

    #[error("Invalid {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("Invalid retention config: {reason}")]
    InvalidRetention { reason: String },

    #[error("Points for team {team_id} overflow at episode {episode}")]
    PointsOverflow { team_id: i64, episode: u16 },

    #[error("Question {question_id} has already been scored")]
    QuestionAlreadyScored { question_id: i64 },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::LeagueSeasonMismatch { .. }
            | LedgerError::DeadlinePassed { .. }
            | LedgerError::WagerOutOfRange { .. }
            | LedgerError::WagerRequired { .. }
            | LedgerError::InvalidOption { .. }
            | LedgerError::EmptyAnswer
            | LedgerError::DuplicateQuestion { .. }
            | LedgerError::InvalidQuestion { .. }
            | LedgerError::InvalidInterval { .. }
            | LedgerError::InvalidRetention { .. }
            | LedgerError::InvalidValue { .. }
            | LedgerError::PointsOverflow { .. }
            | LedgerError::MissingLeagueSeason { .. }
            | LedgerError::InvalidId(_) => ErrorKind::Validation,
            LedgerError::QuestionAlreadyScored { .. } => ErrorKind::State,
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::Database(_) | LedgerError::Json(_) | LedgerError::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        LedgerError::NotFound { entity, id }
    }
}
