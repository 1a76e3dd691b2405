//! Episode results as seen by one team.
//!
//! Until the episode airs a team sees only its own answers; afterwards every
//! team's answers are visible.

use crate::cli::types::{EpisodeNumber, LeagueSeasonId, TeamId};
use crate::error::{LedgerError, Result};
use crate::scoring::episode_state::deadline_passed;
use crate::storage::{queries, LeagueQuestion, LedgerDatabase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAnswer {
    pub team_id: TeamId,
    pub team_name: String,
    pub answer: String,
    pub wager_amount: Option<i64>,
    pub points_earned: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: LeagueQuestion,
    pub answers: Vec<TeamAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeResults {
    pub league_season_id: LeagueSeasonId,
    pub episode_number: EpisodeNumber,
    pub viewer_team_id: TeamId,
    /// `false` means only the viewer's own answers are included
    pub deadline_passed: bool,
    pub questions: Vec<QuestionResult>,
}

impl LedgerDatabase {
    pub fn get_episode_results(
        &self,
        league_season: LeagueSeasonId,
        episode: EpisodeNumber,
        viewer: TeamId,
        now: DateTime<Utc>,
    ) -> Result<EpisodeResults> {
        let episode = episode.numbered()?;
        let league = queries::get_league_season(&self.conn, league_season)?;
        let viewer_team = queries::get_team(&self.conn, viewer)?;
        if viewer_team.league_season_id != league_season {
            return Err(LedgerError::not_found("team", viewer.as_i64()));
        }

        let air_date = queries::get_episode(&self.conn, league.season_id, episode)?
            .and_then(|row| row.air_date);
        let all_visible = deadline_passed(air_date, now);

        let team_names: HashMap<TeamId, String> = queries::list_teams(&self.conn, league_season)?
            .into_iter()
            .map(|team| (team.team_id, team.name))
            .collect();

        let mut questions = Vec::new();
        for question in queries::questions_for_episode(&self.conn, league_season, episode)? {
            let answers = queries::answers_for_question(&self.conn, question.question_id)?
                .into_iter()
                .filter(|answer| all_visible || answer.team_id == viewer)
                .map(|answer| TeamAnswer {
                    team_name: team_names.get(&answer.team_id).cloned().unwrap_or_default(),
                    team_id: answer.team_id,
                    answer: answer.answer,
                    wager_amount: answer.wager_amount,
                    points_earned: answer.points_earned,
                })
                .collect();

            questions.push(QuestionResult { question, answers });
        }

        Ok(EpisodeResults {
            league_season_id: league_season,
            episode_number: episode,
            viewer_team_id: viewer,
            deadline_passed: all_visible,
            questions,
        })
    }
}
