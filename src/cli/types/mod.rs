//! Type-safe wrappers for league, team, castaway and episode identifiers.

pub mod episode;
pub mod ids;

pub use episode::EpisodeNumber;
pub use ids::{CastawayId, LeagueSeasonId, QuestionId, SeasonId, TeamId};
