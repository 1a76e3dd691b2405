//! Batch scoring of questions.
//!
//! A batch is validated in full before anything is written, then applied in
//! one immediate transaction: questions marked scored, every submitted answer
//! given its `points_earned`, and every affected team's ledger rebuilt.

use crate::cli::types::{LeagueSeasonId, QuestionId, TeamId};
use crate::error::{LedgerError, Result};
use crate::scoring::answers::{match_option, points_for_answer};
use crate::scoring::ledger::{default_max_episode, recalculate_team};
use crate::storage::{queries, LeagueQuestion, LedgerDatabase, QuestionType};
use rusqlite::{params, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::info;

#[cfg(test)]
mod tests;

/// Correct answer for one question in a scoring batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub question_id: QuestionId,
    pub correct_answer: String,
}

impl ScoreRequest {
    pub fn new(question_id: QuestionId, correct_answer: impl Into<String>) -> Self {
        Self {
            question_id,
            correct_answer: correct_answer.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringSummary {
    pub scored_count: usize,
    pub answers_scored: usize,
    pub teams_recalculated: usize,
}

/// Resolve the correct answer to store, rejecting anything the batch may not score.
fn check_request(
    question: &LeagueQuestion,
    league_season: LeagueSeasonId,
    correct_answer: &str,
) -> Result<String> {
    let question_id = question.question_id.as_i64();

    if question.league_season_id != league_season {
        return Err(LedgerError::LeagueSeasonMismatch {
            question_id,
            league_season_id: league_season.as_i64(),
        });
    }
    if question.is_scored {
        return Err(LedgerError::QuestionAlreadyScored { question_id });
    }

    let trimmed = correct_answer.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::EmptyAnswer);
    }

    match question.question_type {
        QuestionType::MultipleChoice => match_option(question, trimmed)
            .map(str::to_string)
            .ok_or_else(|| LedgerError::InvalidOption {
                question_id,
                answer: trimmed.to_string(),
            }),
        QuestionType::FillInTheBlank => Ok(trimmed.to_string()),
    }
}

impl LedgerDatabase {
    /// Score a batch of questions for a league season, all or nothing.
    pub fn score_questions(
        &mut self,
        league_season: LeagueSeasonId,
        requests: &[ScoreRequest],
    ) -> Result<ScoringSummary> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        queries::get_league_season(&tx, league_season)?;

        let mut seen = HashSet::new();
        let mut batch = Vec::with_capacity(requests.len());
        for request in requests {
            if !seen.insert(request.question_id) {
                return Err(LedgerError::DuplicateQuestion {
                    question_id: request.question_id.as_i64(),
                });
            }
            let question = queries::get_question(&tx, request.question_id)?;
            let correct_answer = check_request(&question, league_season, &request.correct_answer)?;
            batch.push((question, correct_answer));
        }

        let mut summary = ScoringSummary::default();
        let mut affected_teams: BTreeSet<TeamId> = BTreeSet::new();

        for (question, correct_answer) in &batch {
            let updated = tx.execute(
                "UPDATE league_questions SET correct_answer = ?, is_scored = 1
                 WHERE question_id = ? AND is_scored = 0",
                params![correct_answer, question.question_id],
            )?;
            if updated != 1 {
                return Err(LedgerError::QuestionAlreadyScored {
                    question_id: question.question_id.as_i64(),
                });
            }
            summary.scored_count += 1;

            for answer in queries::answers_for_question(&tx, question.question_id)? {
                let points = points_for_answer(question, correct_answer, &answer);
                tx.execute(
                    "UPDATE player_answers SET points_earned = ?
                     WHERE question_id = ? AND team_id = ?",
                    params![points, answer.question_id, answer.team_id],
                )?;
                summary.answers_scored += 1;
                affected_teams.insert(answer.team_id);
            }
        }

        if !affected_teams.is_empty() {
            let max_episode = default_max_episode(&tx, league_season)?;
            for team_id in &affected_teams {
                recalculate_team(&tx, *team_id, max_episode)?;
            }
        }
        summary.teams_recalculated = affected_teams.len();

        tx.commit()?;

        info!(
            league_season = %league_season,
            scored = summary.scored_count,
            answers = summary.answers_scored,
            teams = summary.teams_recalculated,
            "questions scored"
        );
        Ok(summary)
    }
}
