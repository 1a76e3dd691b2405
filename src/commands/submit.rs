//! Answer submission command

use crate::{
    storage::{LedgerDatabase, PlayerAnswer},
    QuestionId, Result, TeamId,
};
use chrono::{DateTime, Utc};

use super::print_json;

/// Parameters for [`handle_submit_answer`]
#[derive(Debug, Clone)]
pub struct SubmitAnswerParams {
    pub question: QuestionId,
    pub team: TeamId,
    pub answer: String,
    pub wager: Option<i64>,
    pub now: DateTime<Utc>,
    pub as_json: bool,
}

pub fn handle_submit_answer(
    db: &mut LedgerDatabase,
    params: SubmitAnswerParams,
) -> Result<PlayerAnswer> {
    let recorded = db.submit_answer(
        params.question,
        params.team,
        &params.answer,
        params.wager,
        params.now,
    )?;

    if params.as_json {
        print_json(&recorded)?;
    } else {
        match recorded.wager_amount {
            Some(wager) => println!(
                "✓ Team {} answered question {}: {} (wager {})",
                recorded.team_id, recorded.question_id, recorded.answer, wager
            ),
            None => println!(
                "✓ Team {} answered question {}: {}",
                recorded.team_id, recorded.question_id, recorded.answer
            ),
        }
    }

    Ok(recorded)
}
