//! Bulk seeding of seasons, leagues, rosters and questions from JSON
//!
//! The fixture mirrors what the league/season/roster management collaborators
//! would have written. Explicit ids are honoured so that documents can refer
//! to rows they define; everything is inserted in a single transaction.

use super::{models::*, queries, schema::LedgerDatabase};
use crate::cli::types::{CastawayId, EpisodeNumber, LeagueSeasonId, QuestionId, SeasonId, TeamId};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::TransactionBehavior;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub seasons: Vec<SeasonFixture>,
    #[serde(default)]
    pub league_seasons: Vec<LeagueSeasonFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonFixture {
    pub id: SeasonId,
    pub name: String,
    #[serde(default)]
    pub episodes: Vec<EpisodeFixture>,
    #[serde(default)]
    pub castaways: Vec<CastawayFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeFixture {
    pub number: EpisodeNumber,
    #[serde(default)]
    pub air_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastawayFixture {
    pub id: CastawayId,
    pub name: String,
    #[serde(default = "default_status")]
    pub status: CastawayStatus,
}

fn default_status() -> CastawayStatus {
    CastawayStatus::Active
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSeasonFixture {
    pub id: LeagueSeasonId,
    pub season_id: SeasonId,
    pub name: String,
    #[serde(default)]
    pub active_episode: EpisodeNumber,
    /// `(episode, points per castaway)` pairs
    #[serde(default)]
    pub retention: Vec<RetentionFixture>,
    #[serde(default)]
    pub teams: Vec<TeamFixture>,
    #[serde(default)]
    pub questions: Vec<QuestionFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionFixture {
    pub episode: EpisodeNumber,
    pub points_per_castaway: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamFixture {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub roster: Vec<RosterFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFixture {
    pub castaway_id: CastawayId,
    pub start_episode: EpisodeNumber,
    #[serde(default)]
    pub end_episode: Option<EpisodeNumber>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionFixture {
    pub id: QuestionId,
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

/// Row counts written by [`LedgerDatabase::load_fixture`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSummary {
    pub seasons: usize,
    pub episodes: usize,
    pub castaways: usize,
    pub league_seasons: usize,
    pub teams: usize,
    pub roster_intervals: usize,
    pub questions: usize,
}

impl Fixture {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl LedgerDatabase {
    /// Seed the database from a fixture; all or nothing
    pub fn load_fixture(&mut self, fixture: &Fixture) -> Result<FixtureSummary> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut summary = FixtureSummary::default();

        for season in &fixture.seasons {
            queries::insert_season(&tx, Some(season.id), &season.name)?;
            summary.seasons += 1;

            for episode in &season.episodes {
                queries::upsert_episode(&tx, season.id, episode.number, episode.air_date)?;
                summary.episodes += 1;
            }
            for castaway in &season.castaways {
                queries::insert_castaway(
                    &tx,
                    Some(castaway.id),
                    season.id,
                    &castaway.name,
                    castaway.status,
                )?;
                summary.castaways += 1;
            }
        }

        for league in &fixture.league_seasons {
            queries::insert_league_season(
                &tx,
                Some(league.id),
                league.season_id,
                &league.name,
                league.active_episode,
            )?;
            summary.league_seasons += 1;

            for retention in &league.retention {
                queries::upsert_retention(
                    &tx,
                    league.id,
                    retention.episode,
                    retention.points_per_castaway,
                )?;
            }

            for team in &league.teams {
                queries::insert_team(&tx, Some(team.id), league.id, &team.name)?;
                summary.teams += 1;

                let mut roster = team.roster.clone();
                roster.sort_by_key(|entry| (entry.castaway_id, entry.start_episode));
                for entry in &roster {
                    queries::open_interval(&tx, team.id, entry.castaway_id, entry.start_episode)?;
                    if let Some(end) = entry.end_episode {
                        queries::close_interval(&tx, team.id, entry.castaway_id, end)?;
                    }
                    summary.roster_intervals += 1;
                }
            }

            for question in &league.questions {
                let new_question = NewQuestion {
                    league_season_id: league.id,
                    episode_number: question.episode_number,
                    text: question.text.clone(),
                    question_type: question.question_type,
                    options: question.options.clone(),
                    point_value: question.point_value,
                    is_wager: question.is_wager,
                    min_wager: question.min_wager,
                    max_wager: question.max_wager,
                };
                queries::insert_question(&tx, Some(question.id), &new_question)?;
                summary.questions += 1;
            }
        }

        tx.commit()?;
        Ok(summary)
    }
}
