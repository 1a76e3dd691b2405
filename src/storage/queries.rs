//! Basic database query operations
//!
//! Reads and collaborator-owned writes (seasons, teams, roster intervals,
//! retention config, questions). The free functions take a plain
//! [`Connection`] so they can run inside the engine's transactions; the
//! `LedgerDatabase` methods are the public entry points.

use super::{models::*, schema::LedgerDatabase};
use crate::cli::types::{CastawayId, EpisodeNumber, LeagueSeasonId, QuestionId, SeasonId, TeamId};
use crate::error::{LedgerError, Result};
use crate::scoring::answers::{validate_submission, MAX_WAGER};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::{BTreeMap, HashSet};

const QUESTION_COLUMNS: &str = "question_id, league_season_id, episode_number, text, question_type,
     options, point_value, is_wager, min_wager, max_wager, is_scored, correct_answer";

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

pub(crate) fn row_to_question(row: &Row) -> rusqlite::Result<LeagueQuestion> {
    let question_type: String = row.get(4)?;
    let options: String = row.get(5)?;

    Ok(LeagueQuestion {
        question_id: row.get(0)?,
        league_season_id: row.get(1)?,
        episode_number: row.get(2)?,
        text: row.get(3)?,
        question_type: question_type.parse().map_err(|e| conversion_error(4, e))?,
        options: serde_json::from_str(&options).map_err(|e| conversion_error(5, e))?,
        point_value: row.get(6)?,
        is_wager: row.get(7)?,
        min_wager: row.get(8)?,
        max_wager: row.get(9)?,
        is_scored: row.get(10)?,
        correct_answer: row.get(11)?,
    })
}

pub(crate) fn row_to_answer(row: &Row) -> rusqlite::Result<PlayerAnswer> {
    Ok(PlayerAnswer {
        question_id: row.get(0)?,
        team_id: row.get(1)?,
        answer: row.get(2)?,
        wager_amount: row.get(3)?,
        points_earned: row.get(4)?,
    })
}

fn row_to_interval(row: &Row) -> rusqlite::Result<TeamCastaway> {
    Ok(TeamCastaway {
        team_id: row.get(0)?,
        castaway_id: row.get(1)?,
        start_episode: row.get(2)?,
        end_episode: row.get(3)?,
    })
}

fn row_to_ledger(row: &Row) -> rusqlite::Result<TeamEpisodePoints> {
    Ok(TeamEpisodePoints {
        team_id: row.get(0)?,
        episode_number: row.get(1)?,
        question_points: row.get(2)?,
        retention_points: row.get(3)?,
        total_episode_points: row.get(4)?,
        running_total: row.get(5)?,
    })
}

// ---- reads ----------------------------------------------------------------

pub(crate) fn get_league_season(conn: &Connection, id: LeagueSeasonId) -> Result<LeagueSeason> {
    conn.query_row(
        "SELECT league_season_id, season_id, name, active_episode
         FROM league_seasons WHERE league_season_id = ?",
        params![id],
        |row| {
            Ok(LeagueSeason {
                league_season_id: row.get(0)?,
                season_id: row.get(1)?,
                name: row.get(2)?,
                active_episode: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("league season", id.as_i64()))
}

pub(crate) fn get_team(conn: &Connection, id: TeamId) -> Result<Team> {
    conn.query_row(
        "SELECT team_id, league_season_id, name, total_points FROM teams WHERE team_id = ?",
        params![id],
        |row| {
            Ok(Team {
                team_id: row.get(0)?,
                league_season_id: row.get(1)?,
                name: row.get(2)?,
                total_points: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("team", id.as_i64()))
}

pub(crate) fn list_teams(conn: &Connection, league_season: LeagueSeasonId) -> Result<Vec<Team>> {
    let mut stmt = conn.prepare(
        "SELECT team_id, league_season_id, name, total_points
         FROM teams WHERE league_season_id = ? ORDER BY team_id",
    )?;
    let rows = stmt.query_map(params![league_season], |row| {
        Ok(Team {
            team_id: row.get(0)?,
            league_season_id: row.get(1)?,
            name: row.get(2)?,
            total_points: row.get(3)?,
        })
    })?;

    let mut teams = Vec::new();
    for row in rows {
        teams.push(row?);
    }
    Ok(teams)
}

pub(crate) fn get_castaway(conn: &Connection, id: CastawayId) -> Result<Castaway> {
    conn.query_row(
        "SELECT castaway_id, season_id, name, status FROM castaways WHERE castaway_id = ?",
        params![id],
        |row| {
            let status: String = row.get(3)?;
            Ok(Castaway {
                castaway_id: row.get(0)?,
                season_id: row.get(1)?,
                name: row.get(2)?,
                status: status.parse().map_err(|e| conversion_error(3, e))?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("castaway", id.as_i64()))
}

pub(crate) fn get_question(conn: &Connection, id: QuestionId) -> Result<LeagueQuestion> {
    conn.query_row(
        &format!("SELECT {QUESTION_COLUMNS} FROM league_questions WHERE question_id = ?"),
        params![id],
        row_to_question,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("question", id.as_i64()))
}

pub(crate) fn questions_for_episode(
    conn: &Connection,
    league_season: LeagueSeasonId,
    episode: EpisodeNumber,
) -> Result<Vec<LeagueQuestion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {QUESTION_COLUMNS} FROM league_questions
         WHERE league_season_id = ? AND episode_number = ?
         ORDER BY question_id"
    ))?;
    let rows = stmt.query_map(params![league_season, episode], row_to_question)?;

    let mut questions = Vec::new();
    for row in rows {
        questions.push(row?);
    }
    Ok(questions)
}

/// `(episode, question count, scored count)` for every episode with questions
pub(crate) fn question_counts(
    conn: &Connection,
    league_season: LeagueSeasonId,
) -> Result<BTreeMap<EpisodeNumber, (u32, u32)>> {
    let mut stmt = conn.prepare(
        "SELECT episode_number, COUNT(*), COALESCE(SUM(is_scored), 0)
         FROM league_questions WHERE league_season_id = ?
         GROUP BY episode_number",
    )?;
    let rows = stmt.query_map(params![league_season], |row| {
        Ok((row.get::<_, EpisodeNumber>(0)?, row.get::<_, u32>(1)?, row.get::<_, u32>(2)?))
    })?;

    let mut counts = BTreeMap::new();
    for row in rows {
        let (episode, total, scored) = row?;
        counts.insert(episode, (total, scored));
    }
    Ok(counts)
}

/// Highest episode number that has at least one scored question
pub(crate) fn last_scored_episode(
    conn: &Connection,
    league_season: LeagueSeasonId,
) -> Result<Option<EpisodeNumber>> {
    Ok(conn.query_row(
        "SELECT MAX(episode_number) FROM league_questions
         WHERE league_season_id = ? AND is_scored = 1",
        params![league_season],
        |row| row.get::<_, Option<EpisodeNumber>>(0),
    )?)
}

pub(crate) fn get_episode(
    conn: &Connection,
    season: SeasonId,
    episode: EpisodeNumber,
) -> Result<Option<Episode>> {
    Ok(conn
        .query_row(
            "SELECT season_id, episode_number, air_date FROM episodes
             WHERE season_id = ? AND episode_number = ?",
            params![season, episode],
            |row| {
                Ok(Episode {
                    season_id: row.get(0)?,
                    episode_number: row.get(1)?,
                    air_date: row.get(2)?,
                })
            },
        )
        .optional()?)
}

pub(crate) fn list_episodes(conn: &Connection, season: SeasonId) -> Result<Vec<Episode>> {
    let mut stmt = conn.prepare(
        "SELECT season_id, episode_number, air_date FROM episodes
         WHERE season_id = ? ORDER BY episode_number",
    )?;
    let rows = stmt.query_map(params![season], |row| {
        Ok(Episode {
            season_id: row.get(0)?,
            episode_number: row.get(1)?,
            air_date: row.get(2)?,
        })
    })?;

    let mut episodes = Vec::new();
    for row in rows {
        episodes.push(row?);
    }
    Ok(episodes)
}

pub(crate) fn team_intervals(conn: &Connection, team: TeamId) -> Result<Vec<TeamCastaway>> {
    let mut stmt = conn.prepare(
        "SELECT team_id, castaway_id, start_episode, end_episode
         FROM team_castaways WHERE team_id = ?
         ORDER BY castaway_id, start_episode",
    )?;
    let rows = stmt.query_map(params![team], row_to_interval)?;

    let mut intervals = Vec::new();
    for row in rows {
        intervals.push(row?);
    }
    Ok(intervals)
}

/// Configured retention rate for one episode; unconfigured episodes pay nothing
pub(crate) fn retention_rate(
    conn: &Connection,
    league_season: LeagueSeasonId,
    episode: EpisodeNumber,
) -> Result<i64> {
    Ok(conn
        .query_row(
            "SELECT points_per_castaway FROM retention_configs
             WHERE league_season_id = ? AND episode_number = ?",
            params![league_season, episode],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .unwrap_or(0))
}

pub(crate) fn retention_rates(
    conn: &Connection,
    league_season: LeagueSeasonId,
) -> Result<BTreeMap<EpisodeNumber, i64>> {
    let mut stmt = conn.prepare(
        "SELECT episode_number, points_per_castaway FROM retention_configs
         WHERE league_season_id = ?",
    )?;
    let rows = stmt.query_map(params![league_season], |row| {
        Ok((row.get::<_, EpisodeNumber>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut rates = BTreeMap::new();
    for row in rows {
        let (episode, points) = row?;
        rates.insert(episode, points);
    }
    Ok(rates)
}

/// Sum of `points_earned` per episode over the team's scored answers
pub(crate) fn question_points_by_episode(
    conn: &Connection,
    team: TeamId,
) -> Result<BTreeMap<EpisodeNumber, i64>> {
    let mut stmt = conn.prepare(
        "SELECT q.episode_number, SUM(a.points_earned)
         FROM player_answers a
         JOIN league_questions q ON q.question_id = a.question_id
         WHERE a.team_id = ? AND q.is_scored = 1 AND a.points_earned IS NOT NULL
         GROUP BY q.episode_number",
    )?;
    let rows = stmt.query_map(params![team], |row| {
        Ok((row.get::<_, EpisodeNumber>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut points = BTreeMap::new();
    for row in rows {
        let (episode, sum) = row?;
        points.insert(episode, sum);
    }
    Ok(points)
}

pub(crate) fn answers_for_question(conn: &Connection, question: QuestionId) -> Result<Vec<PlayerAnswer>> {
    let mut stmt = conn.prepare(
        "SELECT question_id, team_id, answer, wager_amount, points_earned
         FROM player_answers WHERE question_id = ? ORDER BY team_id",
    )?;
    let rows = stmt.query_map(params![question], row_to_answer)?;

    let mut answers = Vec::new();
    for row in rows {
        answers.push(row?);
    }
    Ok(answers)
}

pub(crate) fn get_answer(
    conn: &Connection,
    question: QuestionId,
    team: TeamId,
) -> Result<Option<PlayerAnswer>> {
    Ok(conn
        .query_row(
            "SELECT question_id, team_id, answer, wager_amount, points_earned
             FROM player_answers WHERE question_id = ? AND team_id = ?",
            params![question, team],
            row_to_answer,
        )
        .optional()?)
}

pub(crate) fn team_ledger(conn: &Connection, team: TeamId) -> Result<Vec<TeamEpisodePoints>> {
    let mut stmt = conn.prepare(
        "SELECT team_id, episode_number, question_points, retention_points,
                total_episode_points, running_total
         FROM team_episode_points WHERE team_id = ? ORDER BY episode_number",
    )?;
    let rows = stmt.query_map(params![team], row_to_ledger)?;

    let mut ledger = Vec::new();
    for row in rows {
        ledger.push(row?);
    }
    Ok(ledger)
}

// ---- collaborator writes --------------------------------------------------

pub(crate) fn insert_season(conn: &Connection, id: Option<SeasonId>, name: &str) -> Result<SeasonId> {
    conn.execute(
        "INSERT INTO seasons (season_id, name) VALUES (?, ?)",
        params![id, name],
    )?;
    Ok(SeasonId::new(conn.last_insert_rowid()))
}

pub(crate) fn upsert_episode(
    conn: &Connection,
    season: SeasonId,
    episode: EpisodeNumber,
    air_date: Option<DateTime<Utc>>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO episodes (season_id, episode_number, air_date) VALUES (?, ?, ?)
         ON CONFLICT(season_id, episode_number) DO UPDATE SET air_date = excluded.air_date",
        params![season, episode, air_date],
    )?;
    Ok(())
}

pub(crate) fn insert_castaway(
    conn: &Connection,
    id: Option<CastawayId>,
    season: SeasonId,
    name: &str,
    status: CastawayStatus,
) -> Result<CastawayId> {
    conn.execute(
        "INSERT INTO castaways (castaway_id, season_id, name, status) VALUES (?, ?, ?, ?)",
        params![id, season, name, status.to_string()],
    )?;
    Ok(CastawayId::new(conn.last_insert_rowid()))
}

pub(crate) fn insert_league_season(
    conn: &Connection,
    id: Option<LeagueSeasonId>,
    season: SeasonId,
    name: &str,
    active_episode: EpisodeNumber,
) -> Result<LeagueSeasonId> {
    let active_episode = active_episode.numbered()?;
    conn.execute(
        "INSERT INTO league_seasons (league_season_id, season_id, name, active_episode)
         VALUES (?, ?, ?, ?)",
        params![id, season, name, active_episode],
    )?;
    Ok(LeagueSeasonId::new(conn.last_insert_rowid()))
}

pub(crate) fn insert_team(
    conn: &Connection,
    id: Option<TeamId>,
    league_season: LeagueSeasonId,
    name: &str,
) -> Result<TeamId> {
    get_league_season(conn, league_season)?;
    conn.execute(
        "INSERT INTO teams (team_id, league_season_id, name, total_points) VALUES (?, ?, ?, 0)",
        params![id, league_season, name],
    )?;
    Ok(TeamId::new(conn.last_insert_rowid()))
}

/// Open a roster interval. A castaway may only rejoin a team after its
/// previous interval was closed, and strictly after that interval's end.
pub(crate) fn open_interval(
    conn: &Connection,
    team: TeamId,
    castaway: CastawayId,
    start: EpisodeNumber,
) -> Result<()> {
    if start.as_u16() == 0 {
        return Err(LedgerError::InvalidInterval {
            reason: "episodes are numbered from 1".to_string(),
        });
    }

    let team_row = get_team(conn, team)?;
    let castaway_row = get_castaway(conn, castaway)?;
    let league_season = get_league_season(conn, team_row.league_season_id)?;
    if castaway_row.season_id != league_season.season_id {
        return Err(LedgerError::InvalidInterval {
            reason: format!(
                "castaway {} is not part of season {}",
                castaway, league_season.season_id
            ),
        });
    }

    let existing: Vec<TeamCastaway> = team_intervals(conn, team)?
        .into_iter()
        .filter(|interval| interval.castaway_id == castaway)
        .collect();

    for interval in &existing {
        match interval.end_episode {
            None => {
                return Err(LedgerError::InvalidInterval {
                    reason: format!("castaway {} is already on team {}", castaway, team),
                })
            }
            Some(end) if end >= start => {
                return Err(LedgerError::InvalidInterval {
                    reason: format!(
                        "castaway {} was on team {} through episode {}; cannot rejoin at episode {}",
                        castaway, team, end, start
                    ),
                })
            }
            Some(_) => {}
        }
    }

    conn.execute(
        "INSERT INTO team_castaways (team_id, castaway_id, start_episode, end_episode)
         VALUES (?, ?, ?, NULL)",
        params![team, castaway, start],
    )?;
    Ok(())
}

/// Close the open roster interval for (team, castaway) at `end` (inclusive)
pub(crate) fn close_interval(
    conn: &Connection,
    team: TeamId,
    castaway: CastawayId,
    end: EpisodeNumber,
) -> Result<()> {
    let open: Option<(i64, EpisodeNumber)> = conn
        .query_row(
            "SELECT id, start_episode FROM team_castaways
             WHERE team_id = ? AND castaway_id = ? AND end_episode IS NULL",
            params![team, castaway],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (row_id, start) =
        open.ok_or_else(|| LedgerError::not_found("open roster interval for castaway", castaway.as_i64()))?;

    if end < start {
        return Err(LedgerError::InvalidInterval {
            reason: format!(
                "end episode {} is before start episode {}",
                end, start
            ),
        });
    }

    conn.execute(
        "UPDATE team_castaways SET end_episode = ? WHERE id = ?",
        params![end, row_id],
    )?;
    Ok(())
}

pub(crate) fn upsert_retention(
    conn: &Connection,
    league_season: LeagueSeasonId,
    episode: EpisodeNumber,
    points_per_castaway: i64,
) -> Result<()> {
    if points_per_castaway < 0 {
        return Err(LedgerError::InvalidRetention {
            reason: format!("points per castaway must not be negative, got {}", points_per_castaway),
        });
    }
    get_league_season(conn, league_season)?;

    conn.execute(
        "INSERT INTO retention_configs (league_season_id, episode_number, points_per_castaway)
         VALUES (?, ?, ?)
         ON CONFLICT(league_season_id, episode_number)
         DO UPDATE SET points_per_castaway = excluded.points_per_castaway",
        params![league_season, episode, points_per_castaway],
    )?;
    Ok(())
}

/// Shape checks shared by question creation and editing
fn validate_question_definition(question: &NewQuestion) -> Result<()> {
    let invalid = |reason: &str| {
        Err(LedgerError::InvalidQuestion {
            reason: reason.to_string(),
        })
    };

    if question.text.trim().is_empty() {
        return invalid("question text must not be empty");
    }
    if question.episode_number.as_u16() == 0 {
        return invalid("episodes are numbered from 1");
    }
    if question.point_value < 0 {
        return invalid("point value must not be negative");
    }

    if question.question_type == QuestionType::MultipleChoice {
        let distinct: HashSet<String> = question
            .options
            .iter()
            .map(|option| crate::scoring::answers::normalize_answer(option))
            .collect();
        if distinct.contains("") {
            return invalid("options must not be blank");
        }
        if distinct.len() < 2 || distinct.len() != question.options.len() {
            return invalid("multiple choice needs at least two distinct options");
        }
    }

    if question.is_wager {
        if question.min_wager.is_some_and(|min| min < 0)
            || question.max_wager.is_some_and(|max| max < 0)
        {
            return invalid("wager bounds must not be negative");
        }
        if question.min_wager.is_some_and(|min| min > MAX_WAGER)
            || question.max_wager.is_some_and(|max| max > MAX_WAGER)
        {
            return invalid("wager bounds must not exceed the wager cap");
        }
        if let (Some(min), Some(max)) = (question.min_wager, question.max_wager) {
            if min > max {
                return invalid("minimum wager exceeds maximum wager");
            }
        }
    }

    Ok(())
}

pub(crate) fn insert_question(
    conn: &Connection,
    id: Option<QuestionId>,
    question: &NewQuestion,
) -> Result<QuestionId> {
    validate_question_definition(question)?;
    get_league_season(conn, question.league_season_id)?;

    let options = match question.question_type {
        QuestionType::MultipleChoice => serde_json::to_string(&question.options)?,
        QuestionType::FillInTheBlank => "[]".to_string(),
    };
    let (min_wager, max_wager) = if question.is_wager {
        (question.min_wager, question.max_wager)
    } else {
        (None, None)
    };

    conn.execute(
        "INSERT INTO league_questions
         (question_id, league_season_id, episode_number, text, question_type, options,
          point_value, is_wager, min_wager, max_wager, is_scored, correct_answer)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, NULL)",
        params![
            id,
            question.league_season_id,
            question.episode_number,
            question.text.trim(),
            question.question_type.to_string(),
            options,
            question.point_value,
            question.is_wager,
            min_wager,
            max_wager
        ],
    )?;
    Ok(QuestionId::new(conn.last_insert_rowid()))
}

fn ensure_unscored(question: &LeagueQuestion) -> Result<()> {
    if question.is_scored {
        return Err(LedgerError::QuestionAlreadyScored {
            question_id: question.question_id.as_i64(),
        });
    }
    Ok(())
}

impl LedgerDatabase {
    pub fn create_season(&mut self, name: &str) -> Result<SeasonId> {
        insert_season(&self.conn, None, name)
    }

    /// Insert or update an episode and its air date
    pub fn upsert_episode(
        &mut self,
        season: SeasonId,
        episode: EpisodeNumber,
        air_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        upsert_episode(&self.conn, season, episode, air_date)
    }

    pub fn list_episodes(&self, season: SeasonId) -> Result<Vec<Episode>> {
        list_episodes(&self.conn, season)
    }

    pub fn add_castaway(&mut self, season: SeasonId, name: &str) -> Result<CastawayId> {
        insert_castaway(&self.conn, None, season, name, CastawayStatus::Active)
    }

    pub fn get_castaway(&self, castaway: CastawayId) -> Result<Castaway> {
        get_castaway(&self.conn, castaway)
    }

    pub fn set_castaway_status(&mut self, castaway: CastawayId, status: CastawayStatus) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE castaways SET status = ? WHERE castaway_id = ?",
            params![status.to_string(), castaway],
        )?;
        if updated == 0 {
            return Err(LedgerError::not_found("castaway", castaway.as_i64()));
        }
        Ok(())
    }

    pub fn create_league_season(
        &mut self,
        season: SeasonId,
        name: &str,
        active_episode: EpisodeNumber,
    ) -> Result<LeagueSeasonId> {
        insert_league_season(&self.conn, None, season, name, active_episode)
    }

    pub fn get_league_season(&self, league_season: LeagueSeasonId) -> Result<LeagueSeason> {
        get_league_season(&self.conn, league_season)
    }

    pub fn set_active_episode(
        &mut self,
        league_season: LeagueSeasonId,
        episode: EpisodeNumber,
    ) -> Result<()> {
        let episode = episode.numbered()?;
        let updated = self.conn.execute(
            "UPDATE league_seasons SET active_episode = ? WHERE league_season_id = ?",
            params![episode, league_season],
        )?;
        if updated == 0 {
            return Err(LedgerError::not_found("league season", league_season.as_i64()));
        }
        Ok(())
    }

    pub fn create_team(&mut self, league_season: LeagueSeasonId, name: &str) -> Result<TeamId> {
        insert_team(&self.conn, None, league_season, name)
    }

    pub fn get_team(&self, team: TeamId) -> Result<Team> {
        get_team(&self.conn, team)
    }

    pub fn list_teams(&self, league_season: LeagueSeasonId) -> Result<Vec<Team>> {
        list_teams(&self.conn, league_season)
    }

    /// Put a castaway on a team from `start` onwards
    pub fn add_team_castaway(
        &mut self,
        team: TeamId,
        castaway: CastawayId,
        start: EpisodeNumber,
    ) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        open_interval(&tx, team, castaway, start)?;
        tx.commit()?;
        Ok(())
    }

    /// Drop a castaway from a team; they still count for `end` itself
    pub fn close_team_castaway(
        &mut self,
        team: TeamId,
        castaway: CastawayId,
        end: EpisodeNumber,
    ) -> Result<()> {
        close_interval(&self.conn, team, castaway, end)
    }

    pub fn team_castaway_intervals(&self, team: TeamId) -> Result<Vec<TeamCastaway>> {
        get_team(&self.conn, team)?;
        team_intervals(&self.conn, team)
    }

    pub fn set_retention_points(
        &mut self,
        league_season: LeagueSeasonId,
        episode: EpisodeNumber,
        points_per_castaway: i64,
    ) -> Result<()> {
        upsert_retention(&self.conn, league_season, episode, points_per_castaway)
    }

    pub fn retention_configs(&self, league_season: LeagueSeasonId) -> Result<Vec<RetentionConfig>> {
        Ok(retention_rates(&self.conn, league_season)?
            .into_iter()
            .map(|(episode_number, points_per_castaway)| RetentionConfig {
                league_season_id: league_season,
                episode_number,
                points_per_castaway,
            })
            .collect())
    }

    pub fn create_question(&mut self, question: &NewQuestion) -> Result<QuestionId> {
        insert_question(&self.conn, None, question)
    }

    pub fn get_question(&self, question: QuestionId) -> Result<LeagueQuestion> {
        get_question(&self.conn, question)
    }

    pub fn questions_for_episode(
        &self,
        league_season: LeagueSeasonId,
        episode: EpisodeNumber,
    ) -> Result<Vec<LeagueQuestion>> {
        questions_for_episode(&self.conn, league_season, episode)
    }

    /// Edit an unscored question. Scored questions are immutable.
    pub fn update_question(
        &mut self,
        question_id: QuestionId,
        update: &QuestionUpdate,
    ) -> Result<LeagueQuestion> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = get_question(&tx, question_id)?;
        ensure_unscored(&current)?;

        let merged = NewQuestion {
            league_season_id: current.league_season_id,
            episode_number: current.episode_number,
            text: update.text.clone().unwrap_or(current.text),
            question_type: current.question_type,
            options: update.options.clone().unwrap_or(current.options),
            point_value: update.point_value.unwrap_or(current.point_value),
            is_wager: update.is_wager.unwrap_or(current.is_wager),
            min_wager: update.min_wager.unwrap_or(current.min_wager),
            max_wager: update.max_wager.unwrap_or(current.max_wager),
        };
        validate_question_definition(&merged)?;

        let (min_wager, max_wager) = if merged.is_wager {
            (merged.min_wager, merged.max_wager)
        } else {
            (None, None)
        };
        let options = match merged.question_type {
            QuestionType::MultipleChoice => serde_json::to_string(&merged.options)?,
            QuestionType::FillInTheBlank => "[]".to_string(),
        };

        tx.execute(
            "UPDATE league_questions
             SET text = ?, options = ?, point_value = ?, is_wager = ?, min_wager = ?, max_wager = ?
             WHERE question_id = ? AND is_scored = 0",
            params![
                merged.text.trim(),
                options,
                merged.point_value,
                merged.is_wager,
                min_wager,
                max_wager,
                question_id
            ],
        )?;

        // Edits must leave every submitted answer acceptable under the new definition.
        let updated = get_question(&tx, question_id)?;
        for answer in answers_for_question(&tx, question_id)? {
            validate_submission(&updated, &answer.answer, answer.wager_amount).map_err(|err| {
                LedgerError::InvalidQuestion {
                    reason: format!(
                        "edit would invalidate team {}'s answer: {}",
                        answer.team_id, err
                    ),
                }
            })?;
        }
        tx.commit()?;
        Ok(updated)
    }

    /// Delete an unscored question together with its submitted answers
    pub fn delete_question(&mut self, question_id: QuestionId) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = get_question(&tx, question_id)?;
        ensure_unscored(&current)?;

        tx.execute(
            "DELETE FROM player_answers WHERE question_id = ?",
            params![question_id],
        )?;
        tx.execute(
            "DELETE FROM league_questions WHERE question_id = ? AND is_scored = 0",
            params![question_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_answer(&self, question: QuestionId, team: TeamId) -> Result<Option<PlayerAnswer>> {
        get_answer(&self.conn, question, team)
    }

    pub fn answers_for_question(&self, question: QuestionId) -> Result<Vec<PlayerAnswer>> {
        answers_for_question(&self.conn, question)
    }

    /// The team's ledger rows in episode order
    pub fn get_team_ledger(&self, team: TeamId) -> Result<Vec<TeamEpisodePoints>> {
        get_team(&self.conn, team)?;
        team_ledger(&self.conn, team)
    }

    /// Teams ranked by cached total; tied teams share a rank
    pub fn get_standings(&self, league_season: LeagueSeasonId) -> Result<Vec<Standing>> {
        get_league_season(&self.conn, league_season)?;

        let mut teams = list_teams(&self.conn, league_season)?;
        teams.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut standings: Vec<Standing> = Vec::with_capacity(teams.len());
        for (index, team) in teams.into_iter().enumerate() {
            let rank = match standings.last() {
                Some(prev) if prev.total_points == team.total_points => prev.rank,
                _ => index as u32 + 1,
            };
            standings.push(Standing {
                rank,
                team_id: team.team_id,
                name: team.name,
                total_points: team.total_points,
            });
        }
        Ok(standings)
    }
}
