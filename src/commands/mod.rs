//! Command implementations for the castaway ledger CLI

pub mod load;
pub mod scoring;
pub mod submit;
pub mod views;


use crate::{
    error::LedgerError, storage::LedgerDatabase, LeagueSeasonId, Result, DB_PATH_ENV_VAR,
    LEAGUE_SEASON_ENV_VAR,
};
use serde::Serialize;
use std::path::PathBuf;

/// Use the explicit league season, falling back to `CASTAWAY_LEDGER_LEAGUE_SEASON`.
pub fn resolve_league_season(league_season: Option<LeagueSeasonId>) -> Result<LeagueSeasonId> {
    league_season
        .or_else(|| {
            std::env::var(LEAGUE_SEASON_ENV_VAR)
                .ok()
                .and_then(|s| s.parse::<LeagueSeasonId>().ok())
        })
        .ok_or_else(|| LedgerError::MissingLeagueSeason {
            env_var: LEAGUE_SEASON_ENV_VAR.to_string(),
        })
}

/// Explicit path, then `CASTAWAY_LEDGER_DB`, then the per-user data directory.
pub fn resolve_db_path(db: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = db {
        return Ok(path);
    }
    match std::env::var(DB_PATH_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => LedgerDatabase::default_path(),
    }
}

pub fn open_database(db: Option<PathBuf>) -> Result<LedgerDatabase> {
    let path = resolve_db_path(db)?;
    tracing::debug!(path = %path.display(), "opening ledger database");
    LedgerDatabase::open(&path)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
