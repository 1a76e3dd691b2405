//! Answer normalisation, submission validation and point deltas.

use crate::cli::types::{QuestionId, TeamId};
use crate::error::{LedgerError, Result};
use crate::scoring::episode_state::deadline_passed;
use crate::storage::{queries, LeagueQuestion, LedgerDatabase, PlayerAnswer, QuestionType};
use chrono::{DateTime, Utc};
use rusqlite::{params, TransactionBehavior};
use tracing::debug;


/// Largest wager any question accepts, and the ceiling used when a wager
/// question leaves `max_wager` unset.
pub const MAX_WAGER: i64 = 1_000_000;

/// Canonical comparison form: surrounding whitespace trimmed, lower-cased.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

pub fn answers_match(submitted: &str, correct: &str) -> bool {
    normalize_answer(submitted) == normalize_answer(correct)
}

/// Points a single answer earns once the question's correct answer is known.
///
/// Fixed questions pay `point_value` or nothing. Wager questions pay the
/// wager on a match and cost it otherwise; totals may go negative.
pub fn points_for_answer(question: &LeagueQuestion, correct_answer: &str, answer: &PlayerAnswer) -> i64 {
    let matched = answers_match(&answer.answer, correct_answer);

    if question.is_wager {
        let wager = answer.wager_amount.unwrap_or(0);
        if matched {
            wager
        } else {
            -wager
        }
    } else if matched {
        question.point_value
    } else {
        0
    }
}

/// The form in which an accepted submission is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAnswer {
    pub answer: String,
    pub wager_amount: Option<i64>,
}

/// Resolve `answer` against the question's allowed options, returning the
/// option's canonical text.
pub fn match_option<'a>(question: &'a LeagueQuestion, answer: &str) -> Option<&'a str> {
    question
        .options
        .iter()
        .find(|option| answers_match(option, answer))
        .map(String::as_str)
}

/// Check a submission against the question definition (not the deadline).
pub fn validate_submission(
    question: &LeagueQuestion,
    answer: &str,
    wager_amount: Option<i64>,
) -> Result<ValidatedAnswer> {
    let question_id = question.question_id.as_i64();

    if question.is_scored {
        return Err(LedgerError::QuestionAlreadyScored { question_id });
    }

    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::EmptyAnswer);
    }

    let stored = match question.question_type {
        QuestionType::MultipleChoice => match_option(question, trimmed)
            .ok_or_else(|| LedgerError::InvalidOption {
                question_id,
                answer: trimmed.to_string(),
            })?
            .to_string(),
        QuestionType::FillInTheBlank => trimmed.to_string(),
    };

    let wager_amount = if question.is_wager {
        let wager = wager_amount.ok_or(LedgerError::WagerRequired { question_id })?;
        let min = question.min_wager.unwrap_or(0);
        let max = question.max_wager.unwrap_or(MAX_WAGER).min(MAX_WAGER);
        if wager < min || wager > max {
            return Err(LedgerError::WagerOutOfRange { wager, min, max });
        }
        Some(wager)
    } else {
        None
    };

    Ok(ValidatedAnswer {
        answer: stored,
        wager_amount,
    })
}

impl LedgerDatabase {
    /// Record a team's answer, replacing any earlier submission for the question.
    ///
    /// The deadline is re-checked here against the episode's air date; the
    /// episode state is advisory only.
    pub fn submit_answer(
        &mut self,
        question_id: QuestionId,
        team_id: TeamId,
        answer: &str,
        wager_amount: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<PlayerAnswer> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let question = queries::get_question(&tx, question_id)?;
        let team = queries::get_team(&tx, team_id)?;
        if team.league_season_id != question.league_season_id {
            return Err(LedgerError::LeagueSeasonMismatch {
                question_id: question_id.as_i64(),
                league_season_id: team.league_season_id.as_i64(),
            });
        }

        let league_season = queries::get_league_season(&tx, question.league_season_id)?;
        let air_date = queries::get_episode(&tx, league_season.season_id, question.episode_number)?
            .and_then(|episode| episode.air_date);
        if deadline_passed(air_date, now) {
            return Err(LedgerError::DeadlinePassed {
                episode: question.episode_number.as_u16(),
            });
        }

        let validated = validate_submission(&question, answer, wager_amount)?;

        tx.execute(
            "INSERT INTO player_answers (question_id, team_id, answer, wager_amount, points_earned)
             VALUES (?, ?, ?, ?, NULL)
             ON CONFLICT(question_id, team_id) DO UPDATE SET
                answer = excluded.answer,
                wager_amount = excluded.wager_amount,
                points_earned = NULL",
            params![question_id, team_id, validated.answer, validated.wager_amount],
        )?;
        tx.commit()?;

        debug!(
            question = %question_id,
            team = %team_id,
            "answer recorded"
        );

        Ok(PlayerAnswer {
            question_id,
            team_id,
            answer: validated.answer,
            wager_amount: validated.wager_amount,
            points_earned: None,
        })
    }
}
