//! Per-team points ledger.
//!
//! The ledger is always rebuilt from source data (scored answers, roster
//! intervals, retention config) as a fold over episodes `1..=max_episode`;
//! prior ledger rows are never read back. Running the rebuild twice over the
//! same data therefore writes identical rows. It is also the only writer of
//! `teams.total_points`.

use crate::cli::types::{EpisodeNumber, LeagueSeasonId, TeamId};
use crate::error::{LedgerError, Result};
use crate::scoring::retention::retention_points;
use crate::storage::{queries, LedgerDatabase, Team, TeamCastaway, TeamEpisodePoints};
use rayon::prelude::*;
use rusqlite::{params, Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};


/// Everything the fold needs for one team, read up front
#[derive(Debug, Clone)]
pub struct TeamScoringInputs {
    pub team_id: TeamId,
    /// Sum of `points_earned` of scored answers, keyed by question episode
    pub question_points: BTreeMap<EpisodeNumber, i64>,
    pub intervals: Vec<TeamCastaway>,
    /// Retention rate per episode; missing episodes pay nothing
    pub retention_rates: BTreeMap<EpisodeNumber, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLedger {
    pub team_id: TeamId,
    pub rows: Vec<TeamEpisodePoints>,
    pub final_total: i64,
}

/// Outcome of rebuilding one team's ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecalculation {
    pub team_id: TeamId,
    pub max_episode: EpisodeNumber,
    pub final_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamFailure {
    pub team_id: TeamId,
    pub error: String,
}

/// Outcome of rebuilding every rostered team in a league season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueRecalculation {
    pub league_season_id: LeagueSeasonId,
    pub max_episode: EpisodeNumber,
    pub teams_recalculated: usize,
    pub failures: Vec<TeamFailure>,
}

/// Fold episodes `1..=max_episode` into ledger rows with a running total.
///
/// Fails with `PointsOverflow` rather than wrapping when any sum leaves `i64`.
pub fn build_ledger(inputs: &TeamScoringInputs, max_episode: EpisodeNumber) -> Result<TeamLedger> {
    let mut running_total = 0i64;
    let mut rows = Vec::with_capacity(max_episode.as_u16() as usize);

    for episode in max_episode.through() {
        let overflow = || LedgerError::PointsOverflow {
            team_id: inputs.team_id.as_i64(),
            episode: episode.as_u16(),
        };

        let question_points = inputs.question_points.get(&episode).copied().unwrap_or(0);
        let rate = inputs.retention_rates.get(&episode).copied().unwrap_or(0);
        let retention = retention_points(&inputs.intervals, episode, rate).ok_or_else(overflow)?;
        let total_episode_points = question_points
            .checked_add(retention)
            .ok_or_else(overflow)?;
        running_total = running_total
            .checked_add(total_episode_points)
            .ok_or_else(overflow)?;

        rows.push(TeamEpisodePoints {
            team_id: inputs.team_id,
            episode_number: episode,
            question_points,
            retention_points: retention,
            total_episode_points,
            running_total,
        });
    }

    Ok(TeamLedger {
        team_id: inputs.team_id,
        rows,
        final_total: running_total,
    })
}

pub(crate) fn load_inputs(conn: &Connection, team: &Team) -> Result<TeamScoringInputs> {
    Ok(TeamScoringInputs {
        team_id: team.team_id,
        question_points: queries::question_points_by_episode(conn, team.team_id)?,
        intervals: queries::team_intervals(conn, team.team_id)?,
        retention_rates: queries::retention_rates(conn, team.league_season_id)?,
    })
}

/// Upsert every row, drop rows past `max_episode`, publish the final total.
pub(crate) fn write_ledger(
    conn: &Connection,
    ledger: &TeamLedger,
    max_episode: EpisodeNumber,
) -> Result<()> {
    let mut upsert = conn.prepare(
        "INSERT INTO team_episode_points
         (team_id, episode_number, question_points, retention_points, total_episode_points, running_total)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(team_id, episode_number) DO UPDATE SET
            question_points = excluded.question_points,
            retention_points = excluded.retention_points,
            total_episode_points = excluded.total_episode_points,
            running_total = excluded.running_total",
    )?;

    for row in &ledger.rows {
        upsert.execute(params![
            row.team_id,
            row.episode_number,
            row.question_points,
            row.retention_points,
            row.total_episode_points,
            row.running_total
        ])?;
    }

    conn.execute(
        "DELETE FROM team_episode_points WHERE team_id = ? AND episode_number > ?",
        params![ledger.team_id, max_episode],
    )?;
    conn.execute(
        "UPDATE teams SET total_points = ? WHERE team_id = ?",
        params![ledger.final_total, ledger.team_id],
    )?;
    Ok(())
}

/// Rebuild one team inside the caller's transaction
pub(crate) fn recalculate_team(
    conn: &Connection,
    team_id: TeamId,
    max_episode: EpisodeNumber,
) -> Result<TeamLedger> {
    let team = queries::get_team(conn, team_id)?;
    let inputs = load_inputs(conn, &team)?;
    let ledger = build_ledger(&inputs, max_episode)?;
    write_ledger(conn, &ledger, max_episode)?;

    debug!(
        team = %team_id,
        max_episode = %max_episode,
        final_total = ledger.final_total,
        "team ledger rebuilt"
    );
    Ok(ledger)
}

/// Default rebuild bound: the active episode, or the last scored episode if later.
pub(crate) fn default_max_episode(
    conn: &Connection,
    league_season: LeagueSeasonId,
) -> Result<EpisodeNumber> {
    let active = queries::get_league_season(conn, league_season)?.active_episode;
    let scored = queries::last_scored_episode(conn, league_season)?;
    Ok(scored.map_or(active, |scored| scored.max(active)))
}

fn rostered_teams(conn: &Connection, league_season: LeagueSeasonId) -> Result<Vec<Team>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT t.team_id FROM teams t
         JOIN team_castaways tc ON tc.team_id = t.team_id
         WHERE t.league_season_id = ?
         ORDER BY t.team_id",
    )?;
    let ids = stmt.query_map(params![league_season], |row| row.get::<_, TeamId>(0))?;

    let mut teams = Vec::new();
    for id in ids {
        teams.push(queries::get_team(conn, id?)?);
    }
    Ok(teams)
}

impl LedgerDatabase {
    /// The episode bound used when none is given explicitly
    pub fn default_recalculation_bound(&self, league_season: LeagueSeasonId) -> Result<EpisodeNumber> {
        default_max_episode(&self.conn, league_season)
    }

    /// Rebuild a team's ledger for episodes `1..=max_episode` atomically.
    pub fn recalculate_team_history(
        &mut self,
        team_id: TeamId,
        max_episode: EpisodeNumber,
    ) -> Result<TeamRecalculation> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let ledger = recalculate_team(&tx, team_id, max_episode)?;
        tx.commit()?;

        Ok(TeamRecalculation {
            team_id,
            max_episode,
            final_total: ledger.final_total,
        })
    }

    /// Rebuild every team that has a roster in the league season.
    ///
    /// Each team is committed in its own transaction; a failing team is
    /// reported in `failures` and leaves every other team's rows untouched.
    pub fn recalculate_all_episode_points(
        &mut self,
        league_season: LeagueSeasonId,
    ) -> Result<LeagueRecalculation> {
        let max_episode = default_max_episode(&self.conn, league_season)?;
        let teams = rostered_teams(&self.conn, league_season)?;

        let mut failures = Vec::new();
        let mut inputs = Vec::with_capacity(teams.len());
        for team in &teams {
            match load_inputs(&self.conn, team) {
                Ok(team_inputs) => inputs.push(team_inputs),
                Err(err) => {
                    warn!(team = %team.team_id, error = %err, "could not load scoring inputs");
                    failures.push(TeamFailure {
                        team_id: team.team_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        // The fold is pure; only the writes below touch the connection.
        let folded: Vec<(TeamId, Result<TeamLedger>)> = inputs
            .par_iter()
            .map(|team_inputs| (team_inputs.team_id, build_ledger(team_inputs, max_episode)))
            .collect();

        let mut teams_recalculated = 0;
        for (team_id, ledger) in folded {
            let outcome = ledger.and_then(|ledger| self.commit_ledger(&ledger, max_episode));
            match outcome {
                Ok(()) => teams_recalculated += 1,
                Err(err) => {
                    warn!(team = %team_id, error = %err, "team ledger not rebuilt");
                    failures.push(TeamFailure {
                        team_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            league_season = %league_season,
            max_episode = %max_episode,
            teams_recalculated,
            failed = failures.len(),
            "league ledger rebuilt"
        );

        Ok(LeagueRecalculation {
            league_season_id: league_season,
            max_episode,
            teams_recalculated,
            failures,
        })
    }

    fn commit_ledger(&mut self, ledger: &TeamLedger, max_episode: EpisodeNumber) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        write_ledger(&tx, ledger, max_episode)?;
        tx.commit()?;
        Ok(())
    }
}
