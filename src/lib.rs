//! Castaway Ledger Library
//!
//! Scoring engine for fantasy Survivor leagues: turns team predictions and
//! roster-membership history into a per-episode points ledger and a running
//! total per team.
//!
//! ## Features
//!
//! - **Question Scoring**: Fixed-value and wagered questions, scored in all-or-nothing batches
//! - **Retention Bonus**: Points per castaway still on a team, read from roster intervals
//! - **Idempotent Ledger**: Per-team history rebuilt from source data on every recalculation
//! - **Episode Lifecycle**: Derived episode states and a prioritised commissioner to-do list
//! - **Database Storage**: SQLite via rusqlite, seeded from JSON fixtures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use castaway_ledger::{scoring::ScoreRequest, storage::LedgerDatabase, LeagueSeasonId, QuestionId};
//!
//! # fn example() -> castaway_ledger::Result<()> {
//! let mut db = LedgerDatabase::new()?;
//! let summary = db.score_questions(
//!     LeagueSeasonId::new(1),
//!     &[ScoreRequest::new(QuestionId::new(10), "Boston Rob")],
//! )?;
//! println!("{} teams recalculated", summary.teams_recalculated);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Set the league season and database path to avoid passing them in every command:
//! ```bash
//! export CASTAWAY_LEDGER_LEAGUE_SEASON=1
//! export CASTAWAY_LEDGER_DB=~/leagues/office.db
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod scoring;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{CastawayId, EpisodeNumber, LeagueSeasonId, QuestionId, SeasonId, TeamId};
pub use error::{ErrorKind, LedgerError, Result};
pub use storage::LedgerDatabase;

pub const LEAGUE_SEASON_ENV_VAR: &str = "CASTAWAY_LEDGER_LEAGUE_SEASON";
pub const DB_PATH_ENV_VAR: &str = "CASTAWAY_LEDGER_DB";
