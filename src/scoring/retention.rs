//! Retention bonus: points for every castaway still on a team in a given episode.
//!
//! Eligibility is read from roster-membership intervals rather than any
//! "currently on team" flag, so past episodes are reproduced exactly after
//! later roster changes.

use crate::cli::types::{EpisodeNumber, TeamId};
use crate::error::{LedgerError, Result};
use crate::storage::{queries, LedgerDatabase, TeamCastaway};


/// Whether `interval` covers `episode`. Both ends are inclusive; an open
/// interval covers every episode from its start onwards.
pub fn is_on_team(interval: &TeamCastaway, episode: EpisodeNumber) -> bool {
    interval.start_episode <= episode && interval.end_episode.map_or(true, |end| end >= episode)
}

/// Number of intervals covering `episode`
pub fn castaways_on_team(intervals: &[TeamCastaway], episode: EpisodeNumber) -> usize {
    intervals
        .iter()
        .filter(|interval| is_on_team(interval, episode))
        .count()
}

/// Retention points for one episode at `points_per_castaway`; `None` on overflow.
pub fn retention_points(
    intervals: &[TeamCastaway],
    episode: EpisodeNumber,
    points_per_castaway: i64,
) -> Option<i64> {
    let count = i64::try_from(castaways_on_team(intervals, episode)).ok()?;
    count.checked_mul(points_per_castaway.max(0))
}

impl LedgerDatabase {
    /// Retention points the team earns for `episode` under its league's config
    pub fn retention_points(&self, team_id: TeamId, episode: EpisodeNumber) -> Result<i64> {
        let team = queries::get_team(&self.conn, team_id)?;
        let rate = queries::retention_rate(&self.conn, team.league_season_id, episode)?;
        let intervals = queries::team_intervals(&self.conn, team_id)?;
        retention_points(&intervals, episode, rate).ok_or(LedgerError::PointsOverflow {
            team_id: team_id.as_i64(),
            episode: episode.as_u16(),
        })
    }
}
