//! Episode lifecycle.
//!
//! The state is a pure function of the episode's facts and the current time.
//! It gates nothing by itself: `can_submit` and the commissioner action list
//! are advisory, and the submission deadline is enforced separately when an
//! answer is recorded.

use crate::cli::types::{EpisodeNumber, LeagueSeasonId};
use crate::error::Result;
use crate::storage::{queries, LedgerDatabase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;


/// Submissions lock at air time. With no air date there is no deadline yet.
pub fn deadline_passed(air_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    air_date.is_some_and(|air_date| now >= air_date)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EpisodeState {
    Future,
    QuestionsNotReady,
    SubmissionsOpen,
    SubmissionsClosed,
    PartiallyScored,
    FullyScored,
}

/// Inputs to [`EpisodeState::derive`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeFacts {
    pub episode_number: EpisodeNumber,
    pub active_episode: EpisodeNumber,
    pub question_count: u32,
    pub scored_count: u32,
    pub air_date: Option<DateTime<Utc>>,
}

impl EpisodeState {
    pub fn derive(facts: &EpisodeFacts, now: DateTime<Utc>) -> Self {
        if facts.episode_number > facts.active_episode {
            EpisodeState::Future
        } else if facts.question_count == 0 {
            EpisodeState::QuestionsNotReady
        } else if facts.air_date.is_some_and(|air_date| now < air_date) {
            EpisodeState::SubmissionsOpen
        } else if facts.scored_count == 0 {
            EpisodeState::SubmissionsClosed
        } else if facts.scored_count < facts.question_count {
            EpisodeState::PartiallyScored
        } else {
            EpisodeState::FullyScored
        }
    }

    pub fn can_submit(&self) -> bool {
        matches!(self, EpisodeState::SubmissionsOpen)
    }

    /// What the commissioner should do next for an episode in this state
    pub fn commissioner_action(&self) -> Option<CommissionerActionKind> {
        match self {
            EpisodeState::QuestionsNotReady => Some(CommissionerActionKind::CreateQuestions),
            EpisodeState::SubmissionsClosed => Some(CommissionerActionKind::ScoreQuestions),
            EpisodeState::PartiallyScored => Some(CommissionerActionKind::ContinueScoring),
            EpisodeState::Future | EpisodeState::SubmissionsOpen | EpisodeState::FullyScored => {
                None
            }
        }
    }
}

impl fmt::Display for EpisodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EpisodeState::Future => "FUTURE",
            EpisodeState::QuestionsNotReady => "QUESTIONS_NOT_READY",
            EpisodeState::SubmissionsOpen => "SUBMISSIONS_OPEN",
            EpisodeState::SubmissionsClosed => "SUBMISSIONS_CLOSED",
            EpisodeState::PartiallyScored => "PARTIALLY_SCORED",
            EpisodeState::FullyScored => "FULLY_SCORED",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionerActionKind {
    CreateQuestions,
    ScoreQuestions,
    ContinueScoring,
}

impl CommissionerActionKind {
    /// Lower sorts first
    pub fn priority(&self) -> u8 {
        match self {
            CommissionerActionKind::ContinueScoring => 0,
            CommissionerActionKind::ScoreQuestions => 1,
            CommissionerActionKind::CreateQuestions => 2,
        }
    }
}

impl fmt::Display for CommissionerActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommissionerActionKind::CreateQuestions => "CREATE_QUESTIONS",
            CommissionerActionKind::ScoreQuestions => "SCORE_QUESTIONS",
            CommissionerActionKind::ContinueScoring => "CONTINUE_SCORING",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionerAction {
    pub episode_number: EpisodeNumber,
    pub kind: CommissionerActionKind,
}

/// Derived state of one episode plus the facts it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStatus {
    pub episode_number: EpisodeNumber,
    pub state: EpisodeState,
    pub can_submit: bool,
    pub question_count: u32,
    pub scored_count: u32,
    pub air_date: Option<DateTime<Utc>>,
}

impl EpisodeStatus {
    pub fn from_facts(facts: &EpisodeFacts, now: DateTime<Utc>) -> Self {
        let state = EpisodeState::derive(facts, now);
        Self {
            episode_number: facts.episode_number,
            state,
            can_submit: state.can_submit(),
            question_count: facts.question_count,
            scored_count: facts.scored_count,
            air_date: facts.air_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueEpisodeStates {
    pub league_season_id: LeagueSeasonId,
    pub active_episode: EpisodeNumber,
    pub episodes: Vec<EpisodeStatus>,
    pub actions: Vec<CommissionerAction>,
}

/// Action items for the given episodes, most urgent first
pub fn commissioner_actions(episodes: &[EpisodeStatus]) -> Vec<CommissionerAction> {
    let mut actions: Vec<CommissionerAction> = episodes
        .iter()
        .filter_map(|status| {
            status
                .state
                .commissioner_action()
                .map(|kind| CommissionerAction {
                    episode_number: status.episode_number,
                    kind,
                })
        })
        .collect();

    actions.sort_by_key(|action| (action.kind.priority(), action.episode_number));
    actions
}

impl LedgerDatabase {
    pub fn get_episode_state(
        &self,
        league_season: LeagueSeasonId,
        episode: EpisodeNumber,
        now: DateTime<Utc>,
    ) -> Result<EpisodeStatus> {
        let episode = episode.numbered()?;
        let league = queries::get_league_season(&self.conn, league_season)?;
        let (question_count, scored_count) = queries::question_counts(&self.conn, league_season)?
            .get(&episode)
            .copied()
            .unwrap_or((0, 0));
        let air_date = queries::get_episode(&self.conn, league.season_id, episode)?
            .and_then(|row| row.air_date);

        let facts = EpisodeFacts {
            episode_number: episode,
            active_episode: league.active_episode,
            question_count,
            scored_count,
            air_date,
        };
        Ok(EpisodeStatus::from_facts(&facts, now))
    }

    /// States of every episode up to the later of the active episode and the
    /// last scheduled one, with the commissioner's prioritised to-do list.
    pub fn get_league_episode_states(
        &self,
        league_season: LeagueSeasonId,
        now: DateTime<Utc>,
    ) -> Result<LeagueEpisodeStates> {
        let league = queries::get_league_season(&self.conn, league_season)?;
        let counts = queries::question_counts(&self.conn, league_season)?;
        let episodes = queries::list_episodes(&self.conn, league.season_id)?;

        let last_scheduled = episodes
            .iter()
            .map(|episode| episode.episode_number)
            .max()
            .unwrap_or(league.active_episode);
        let last = last_scheduled.max(league.active_episode);

        let statuses: Vec<EpisodeStatus> = last
            .through()
            .map(|episode_number| {
                let (question_count, scored_count) =
                    counts.get(&episode_number).copied().unwrap_or((0, 0));
                let air_date = episodes
                    .iter()
                    .find(|episode| episode.episode_number == episode_number)
                    .and_then(|episode| episode.air_date);

                EpisodeStatus::from_facts(
                    &EpisodeFacts {
                        episode_number,
                        active_episode: league.active_episode,
                        question_count,
                        scored_count,
                        air_date,
                    },
                    now,
                )
            })
            .collect();

        Ok(LeagueEpisodeStates {
            league_season_id: league_season,
            active_episode: league.active_episode,
            actions: commissioner_actions(&statuses),
            episodes: statuses,
        })
    }
}
