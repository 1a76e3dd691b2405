//! CLI argument definitions and parsing structures.

use super::types::{EpisodeNumber, LeagueSeasonId, QuestionId, TeamId};
use crate::scoring::ScoreRequest;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Options shared by every subcommand
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the ledger database (or set `CASTAWAY_LEDGER_DB`).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// League season ID (or set `CASTAWAY_LEDGER_LEAGUE_SEASON`).
    #[clap(long, short, global = true)]
    pub league_season: Option<LeagueSeasonId>,

    /// Evaluate deadlines at this RFC 3339 instant instead of the current time.
    #[clap(long, global = true)]
    pub now: Option<DateTime<Utc>>,

    /// Output results as JSON instead of text lines.
    #[clap(long, global = true)]
    pub json: bool,

    /// Log engine activity at debug level (overridden by `RUST_LOG`).
    #[clap(long, short, global = true)]
    pub verbose: bool,
}

/// Parse `ID=TEXT` into a scoring request.
pub fn parse_score_request(s: &str) -> Result<ScoreRequest, String> {
    let (id, answer) = s
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION_ID=ANSWER, got '{}'", s))?;
    let question_id: QuestionId = id
        .parse()
        .map_err(|_| format!("invalid question id '{}'", id))?;
    Ok(ScoreRequest::new(question_id, answer))
}

#[derive(Debug, Parser)]
#[clap(
    name = "castaway-ledger",
    about = "Scoring ledger for fantasy Survivor leagues"
)]
pub struct Cli {
    #[clap(flatten)]
    pub global: GlobalOpts,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Seed seasons, league seasons, rosters and questions from a JSON fixture
    Load {
        /// Fixture file.
        path: PathBuf,
    },

    /// Record (or replace) a team's answer before the episode airs
    SubmitAnswer {
        #[clap(long, short)]
        question: QuestionId,

        #[clap(long, short)]
        team: TeamId,

        #[clap(long, short)]
        answer: String,

        /// Required for wager questions.
        #[clap(long, short = 'w')]
        wager: Option<i64>,
    },

    /// Score a batch of questions, all or nothing.
    ///
    /// Each `--answer` is `QUESTION_ID=CORRECT_ANSWER`; affected teams are
    /// recalculated in the same transaction.
    Score {
        #[clap(long = "answer", short, required = true, value_parser = parse_score_request)]
        answers: Vec<ScoreRequest>,
    },

    /// Rebuild team ledgers from source data
    Recalculate {
        /// Rebuild a single team.
        #[clap(long, short, conflicts_with = "all", required_unless_present = "all")]
        team: Option<TeamId>,

        /// Last episode to include (defaults to the league's current bound).
        #[clap(long, requires = "team")]
        through_episode: Option<EpisodeNumber>,

        /// Rebuild every rostered team in the league season.
        #[clap(long)]
        all: bool,
    },

    /// Show episode lifecycle states and the commissioner's to-do list
    EpisodeState {
        /// Only this episode.
        #[clap(long, short)]
        episode: Option<EpisodeNumber>,
    },

    /// Show an episode's questions and the answers visible to a team
    Results {
        #[clap(long, short)]
        episode: EpisodeNumber,

        /// The team viewing the results.
        #[clap(long, short)]
        team: TeamId,
    },

    /// Show the league season's standings
    Standings,

    /// Show a team's per-episode ledger
    Ledger {
        #[clap(long, short)]
        team: TeamId,
    },
}
