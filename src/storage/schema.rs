//! Database schema and connection management

use crate::error::{LedgerError, Result};
use dirs::data_dir;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Database connection manager for the scoring ledger
pub struct LedgerDatabase {
    pub(crate) conn: Connection,
}

impl LedgerDatabase {
    /// Open (or create) the database at `path` and ensure tables exist
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure the data directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open the database at the default per-user location
    pub fn new() -> Result<Self> {
        let db_path = Self::default_path()?;
        Self::open(&db_path)
    }

    /// Create an in-memory database (tests and dry runs)
    pub fn new_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Get the default path to the database file
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = data_dir().ok_or_else(|| {
            LedgerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;
        Ok(data_dir.join("castaway-ledger").join("ledger.db"))
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS seasons (
                season_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS episodes (
                season_id INTEGER NOT NULL,
                episode_number INTEGER NOT NULL CHECK (episode_number >= 1),
                air_date TEXT,
                PRIMARY KEY (season_id, episode_number),
                FOREIGN KEY (season_id) REFERENCES seasons(season_id)
            );

            CREATE TABLE IF NOT EXISTS castaways (
                castaway_id INTEGER PRIMARY KEY,
                season_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'ACTIVE',
                FOREIGN KEY (season_id) REFERENCES seasons(season_id)
            );

            CREATE TABLE IF NOT EXISTS league_seasons (
                league_season_id INTEGER PRIMARY KEY,
                season_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                active_episode INTEGER NOT NULL DEFAULT 1,
                FOREIGN KEY (season_id) REFERENCES seasons(season_id)
            );

            CREATE TABLE IF NOT EXISTS teams (
                team_id INTEGER PRIMARY KEY,
                league_season_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                total_points INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (league_season_id) REFERENCES league_seasons(league_season_id)
            );

            CREATE TABLE IF NOT EXISTS team_castaways (
                id INTEGER PRIMARY KEY,
                team_id INTEGER NOT NULL,
                castaway_id INTEGER NOT NULL,
                start_episode INTEGER NOT NULL CHECK (start_episode >= 1),
                end_episode INTEGER CHECK (end_episode IS NULL OR end_episode >= start_episode),
                FOREIGN KEY (team_id) REFERENCES teams(team_id),
                FOREIGN KEY (castaway_id) REFERENCES castaways(castaway_id)
            );

            CREATE TABLE IF NOT EXISTS retention_configs (
                league_season_id INTEGER NOT NULL,
                episode_number INTEGER NOT NULL,
                points_per_castaway INTEGER NOT NULL CHECK (points_per_castaway >= 0),
                PRIMARY KEY (league_season_id, episode_number),
                FOREIGN KEY (league_season_id) REFERENCES league_seasons(league_season_id)
            );

            CREATE TABLE IF NOT EXISTS league_questions (
                question_id INTEGER PRIMARY KEY,
                league_season_id INTEGER NOT NULL,
                episode_number INTEGER NOT NULL,
                text TEXT NOT NULL,
                question_type TEXT NOT NULL,
                options TEXT NOT NULL DEFAULT '[]',
                point_value INTEGER NOT NULL DEFAULT 0,
                is_wager INTEGER NOT NULL DEFAULT 0,
                min_wager INTEGER,
                max_wager INTEGER,
                is_scored INTEGER NOT NULL DEFAULT 0,
                correct_answer TEXT,
                FOREIGN KEY (league_season_id) REFERENCES league_seasons(league_season_id)
            );

            CREATE TABLE IF NOT EXISTS player_answers (
                question_id INTEGER NOT NULL,
                team_id INTEGER NOT NULL,
                answer TEXT NOT NULL,
                wager_amount INTEGER,
                points_earned INTEGER,
                PRIMARY KEY (question_id, team_id),
                FOREIGN KEY (question_id) REFERENCES league_questions(question_id),
                FOREIGN KEY (team_id) REFERENCES teams(team_id)
            );

            CREATE TABLE IF NOT EXISTS team_episode_points (
                team_id INTEGER NOT NULL,
                episode_number INTEGER NOT NULL,
                question_points INTEGER NOT NULL,
                retention_points INTEGER NOT NULL,
                total_episode_points INTEGER NOT NULL,
                running_total INTEGER NOT NULL,
                PRIMARY KEY (team_id, episode_number),
                FOREIGN KEY (team_id) REFERENCES teams(team_id)
            );",
        )?;

        // Create indexes for the recalculation and state queries
        self.conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_team_castaways_team
                ON team_castaways(team_id, castaway_id);
             CREATE INDEX IF NOT EXISTS idx_questions_episode
                ON league_questions(league_season_id, episode_number);
             CREATE INDEX IF NOT EXISTS idx_answers_team
                ON player_answers(team_id);",
        )?;

        Ok(())
    }
}
