//! Episode numbering.

use crate::error::{LedgerError, Result};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// Type-safe wrapper for Episode numbers.
///
/// Episodes are numbered from 1; `EpisodeNumber(0)` is only ever used as the
/// "before the first episode" bound of a running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeNumber(pub u16);

impl EpisodeNumber {
    pub fn new(episode: u16) -> Self {
        Self(episode)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// `self` if it names a real episode; the 0 bound is rejected.
    pub fn numbered(self) -> Result<Self> {
        if self.0 == 0 {
            return Err(LedgerError::InvalidValue {
                field: "episode number",
                value: self.0.to_string(),
            });
        }
        Ok(self)
    }

    /// Episodes `1..=self`, in airing order.
    pub fn through(self) -> impl Iterator<Item = EpisodeNumber> {
        (1..=self.0).map(EpisodeNumber)
    }
}

impl Default for EpisodeNumber {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for EpisodeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EpisodeNumber {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self(s.trim().parse()?).numbered()
    }
}

impl ToSql for EpisodeNumber {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.0)))
    }
}

impl FromSql for EpisodeNumber {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        u16::column_result(value).map(Self)
    }
}
