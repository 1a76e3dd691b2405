//! Data models for the storage layer

use crate::cli::types::{CastawayId, EpisodeNumber, LeagueSeasonId, QuestionId, SeasonId, TeamId};
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A season of the show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub season_id: SeasonId,
    pub name: String,
}

/// An episode of a season; the air date doubles as the submission deadline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub season_id: SeasonId,
    pub episode_number: EpisodeNumber,
    pub air_date: Option<DateTime<Utc>>,
}

/// Castaway status. Informational only; point eligibility comes from roster intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CastawayStatus {
    Active,
    Eliminated,
    Jury,
}

impl fmt::Display for CastawayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CastawayStatus::Active => "ACTIVE",
            CastawayStatus::Eliminated => "ELIMINATED",
            CastawayStatus::Jury => "JURY",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CastawayStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(CastawayStatus::Active),
            "ELIMINATED" => Ok(CastawayStatus::Eliminated),
            "JURY" => Ok(CastawayStatus::Jury),
            _ => Err(LedgerError::InvalidValue {
                field: "castaway status",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Castaway {
    pub castaway_id: CastawayId,
    pub season_id: SeasonId,
    pub name: String,
    pub status: CastawayStatus,
}

/// A league playing along with one season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSeason {
    pub league_season_id: LeagueSeasonId,
    pub season_id: SeasonId,
    pub name: String,
    pub active_episode: EpisodeNumber,
}

/// A fantasy team. `total_points` is a cache of the ledger's last running total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,
    pub league_season_id: LeagueSeasonId,
    pub name: String,
    pub total_points: i64,
}

/// One roster-membership interval. `end_episode = None` means still on the team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCastaway {
    pub team_id: TeamId,
    pub castaway_id: CastawayId,
    pub start_episode: EpisodeNumber,
    pub end_episode: Option<EpisodeNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub league_season_id: LeagueSeasonId,
    pub episode_number: EpisodeNumber,
    pub points_per_castaway: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    MultipleChoice,
    FillInTheBlank,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
            QuestionType::FillInTheBlank => "FILL_IN_THE_BLANK",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for QuestionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MULTIPLE_CHOICE" => Ok(QuestionType::MultipleChoice),
            "FILL_IN_THE_BLANK" => Ok(QuestionType::FillInTheBlank),
            _ => Err(LedgerError::InvalidValue {
                field: "question type",
                value: s.to_string(),
            }),
        }
    }
}

/// A prediction question for one episode of a league season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueQuestion {
    pub question_id: QuestionId,
    pub league_season_id: LeagueSeasonId,
    pub episode_number: EpisodeNumber,
    pub text: String,
    pub question_type: QuestionType,
    /// Allowed answers; only meaningful for multiple choice.
    pub options: Vec<String>,
    pub point_value: i64,
    pub is_wager: bool,
    pub min_wager: Option<i64>,
    pub max_wager: Option<i64>,
    pub is_scored: bool,
    pub correct_answer: Option<String>,
}

/// Input for creating a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub league_season_id: LeagueSeasonId,
    pub episode_number: EpisodeNumber,
    pub text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub point_value: i64,
    #[serde(default)]
    pub is_wager: bool,
    #[serde(default)]
    pub min_wager: Option<i64>,
    #[serde(default)]
    pub max_wager: Option<i64>,
}

/// Editable fields of an unscored question; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionUpdate {
    pub text: Option<String>,
    pub options: Option<Vec<String>>,
    pub point_value: Option<i64>,
    pub is_wager: Option<bool>,
    pub min_wager: Option<Option<i64>>,
    pub max_wager: Option<Option<i64>>,
}

/// A team's answer to a question; `points_earned` stays `None` until scored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAnswer {
    pub question_id: QuestionId,
    pub team_id: TeamId,
    pub answer: String,
    pub wager_amount: Option<i64>,
    pub points_earned: Option<i64>,
}

/// One ledger row per (team, episode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEpisodePoints {
    pub team_id: TeamId,
    pub episode_number: EpisodeNumber,
    pub question_points: i64,
    pub retention_points: i64,
    pub total_episode_points: i64,
    pub running_total: i64,
}

/// Standings row for a league season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub rank: u32,
    pub team_id: TeamId,
    pub name: String,
    pub total_points: i64,
}
