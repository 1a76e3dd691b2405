//! ID types for league seasons, teams, castaways and questions.

use crate::error::{LedgerError, Result};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares an `i64`-backed row id wrapper with the usual conversions.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

row_id!(
    /// Type-safe wrapper for a league's participation in one season.
    ///
    /// Every team, question and retention config hangs off a league season, so
    /// keeping it distinct from the other ids prevents scoring the wrong league.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use castaway_ledger::LeagueSeasonId;
    ///
    /// let id: LeagueSeasonId = "42".parse().unwrap();
    /// assert_eq!(id.as_i64(), 42);
    /// assert_eq!(id.to_string(), "42");
    /// ```
    LeagueSeasonId
);

row_id!(
    /// Type-safe wrapper for a season of the show
    SeasonId
);

row_id!(
    /// Type-safe wrapper for Team IDs
    TeamId
);

row_id!(
    /// Type-safe wrapper for Castaway IDs
    CastawayId
);

row_id!(
    /// Type-safe wrapper for League Question IDs
    QuestionId
);
