//! The scoring core
//!
//! - `answers`: answer normalisation, submission validation and point deltas
//! - `questions`: batch scoring of a league season's questions
//! - `retention`: roster-interval coverage and the per-episode retention bonus
//! - `ledger`: idempotent rebuild of each team's per-episode points ledger
//! - `episode_state`: episode lifecycle and commissioner action items
//! - `results`: per-episode answer visibility for a viewing team

pub mod answers;
pub mod episode_state;
pub mod ledger;
pub mod questions;
pub mod results;
pub mod retention;

pub use answers::{answers_match, normalize_answer};
pub use episode_state::{
    CommissionerAction, CommissionerActionKind, EpisodeState, EpisodeStatus, LeagueEpisodeStates,
};
pub use ledger::{LeagueRecalculation, TeamFailure, TeamLedger, TeamRecalculation};
pub use questions::{ScoreRequest, ScoringSummary};
pub use results::{EpisodeResults, QuestionResult, TeamAnswer};
