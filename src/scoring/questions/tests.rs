//! Unit tests for batch scoring

use super::*;
use crate::cli::types::{EpisodeNumber, SeasonId};
use crate::storage::NewQuestion;
use chrono::{DateTime, TimeZone, Utc};

struct League {
    db: LedgerDatabase,
    league_season: LeagueSeasonId,
    answered: TeamId,
    silent: TeamId,
}

fn before_air() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap()
}

fn setup() -> League {
    let mut db = LedgerDatabase::new_in_memory().unwrap();
    let season: SeasonId = db.create_season("Heroes vs Villains").unwrap();
    db.upsert_episode(
        season,
        EpisodeNumber::new(1),
        Some(Utc.with_ymd_and_hms(2024, 3, 7, 1, 0, 0).unwrap()),
    )
    .unwrap();
    let league_season = db
        .create_league_season(season, "Office League", EpisodeNumber::new(1))
        .unwrap();
    let answered = db.create_team(league_season, "Tribal Council").unwrap();
    let silent = db.create_team(league_season, "Hidden Idols").unwrap();

    League {
        db,
        league_season,
        answered,
        silent,
    }
}

fn fill_in(league_season: LeagueSeasonId, text: &str) -> NewQuestion {
    NewQuestion {
        league_season_id: league_season,
        episode_number: EpisodeNumber::new(1),
        text: text.to_string(),
        question_type: QuestionType::FillInTheBlank,
        options: vec![],
        point_value: 5,
        is_wager: false,
        min_wager: None,
        max_wager: None,
    }
}

#[test]
fn test_answered_and_missing_teams() {
    let mut league = setup();
    let q = league
        .db
        .create_question(&fill_in(league.league_season, "Who wins immunity?"))
        .unwrap();
    league
        .db
        .submit_answer(q, league.answered, "Rob", None, before_air())
        .unwrap();

    let summary = league
        .db
        .score_questions(league.league_season, &[ScoreRequest::new(q, " rob ")])
        .unwrap();
    assert_eq!(
        summary,
        ScoringSummary {
            scored_count: 1,
            answers_scored: 1,
            teams_recalculated: 1,
        }
    );

    let answer = league.db.get_answer(q, league.answered).unwrap().unwrap();
    assert_eq!(answer.points_earned, Some(5));
    assert!(league.db.get_answer(q, league.silent).unwrap().is_none());

    assert_eq!(league.db.get_team(league.answered).unwrap().total_points, 5);
    assert_eq!(league.db.get_team(league.silent).unwrap().total_points, 0);

    let question = league.db.get_question(q).unwrap();
    assert!(question.is_scored);
    assert_eq!(question.correct_answer.as_deref(), Some("rob"));
}

#[test]
fn test_rescoring_is_rejected_and_points_unchanged() {
    let mut league = setup();
    let q = league
        .db
        .create_question(&fill_in(league.league_season, "Who is voted out?"))
        .unwrap();
    league
        .db
        .submit_answer(q, league.answered, "Sandra", None, before_air())
        .unwrap();
    league
        .db
        .score_questions(league.league_season, &[ScoreRequest::new(q, "Sandra")])
        .unwrap();

    let err = league
        .db
        .score_questions(league.league_season, &[ScoreRequest::new(q, "Rob")])
        .unwrap_err();
    assert!(matches!(err, LedgerError::QuestionAlreadyScored { .. }));

    let answer = league.db.get_answer(q, league.answered).unwrap().unwrap();
    assert_eq!(answer.points_earned, Some(5));
    assert_eq!(
        league.db.get_question(q).unwrap().correct_answer.as_deref(),
        Some("Sandra")
    );
}

#[test]
fn test_invalid_request_aborts_whole_batch() {
    let mut league = setup();
    let first = league
        .db
        .create_question(&fill_in(league.league_season, "Who finds an idol?"))
        .unwrap();
    let mut choice = fill_in(league.league_season, "Which tribe wins?");
    choice.question_type = QuestionType::MultipleChoice;
    choice.options = vec!["Heroes".to_string(), "Villains".to_string()];
    let second = league.db.create_question(&choice).unwrap();

    league
        .db
        .submit_answer(first, league.answered, "Russell", None, before_air())
        .unwrap();

    let err = league
        .db
        .score_questions(
            league.league_season,
            &[
                ScoreRequest::new(first, "Russell"),
                ScoreRequest::new(second, "Nobody"),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidOption { .. }));

    assert!(!league.db.get_question(first).unwrap().is_scored);
    assert_eq!(
        league
            .db
            .get_answer(first, league.answered)
            .unwrap()
            .unwrap()
            .points_earned,
        None
    );
    assert_eq!(league.db.get_team(league.answered).unwrap().total_points, 0);
}

#[test]
fn test_multiple_choice_correct_answer_stored_as_option() {
    let mut league = setup();
    let mut choice = fill_in(league.league_season, "Which tribe wins?");
    choice.question_type = QuestionType::MultipleChoice;
    choice.options = vec!["Heroes".to_string(), "Villains".to_string()];
    let q = league.db.create_question(&choice).unwrap();

    league
        .db
        .score_questions(league.league_season, &[ScoreRequest::new(q, "villains")])
        .unwrap();
    assert_eq!(
        league.db.get_question(q).unwrap().correct_answer.as_deref(),
        Some("Villains")
    );
}

#[test]
fn test_question_from_other_league_season_is_rejected() {
    let mut league = setup();
    let season = league.db.get_league_season(league.league_season).unwrap().season_id;
    let other = league
        .db
        .create_league_season(season, "Family League", EpisodeNumber::new(1))
        .unwrap();
    let q = league
        .db
        .create_question(&fill_in(other, "Who cries first?"))
        .unwrap();

    let err = league
        .db
        .score_questions(league.league_season, &[ScoreRequest::new(q, "Coach")])
        .unwrap_err();
    assert!(matches!(err, LedgerError::LeagueSeasonMismatch { .. }));
    assert!(!league.db.get_question(q).unwrap().is_scored);
}

#[test]
fn test_duplicate_question_in_batch_is_rejected() {
    let mut league = setup();
    let q = league
        .db
        .create_question(&fill_in(league.league_season, "Who wins reward?"))
        .unwrap();

    let err = league
        .db
        .score_questions(
            league.league_season,
            &[ScoreRequest::new(q, "Rob"), ScoreRequest::new(q, "Sandra")],
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateQuestion { .. }));
}

#[test]
fn test_empty_batch_scores_nothing() {
    let mut league = setup();
    let summary = league.db.score_questions(league.league_season, &[]).unwrap();
    assert_eq!(summary, ScoringSummary::default());
}

#[test]
fn test_wager_question_scores_signed_wagers() {
    let mut league = setup();
    let mut wager = fill_in(league.league_season, "Who wins the final challenge?");
    wager.is_wager = true;
    wager.min_wager = Some(1);
    wager.max_wager = Some(10);
    let q = league.db.create_question(&wager).unwrap();

    league
        .db
        .submit_answer(q, league.answered, "Parvati", Some(4), before_air())
        .unwrap();
    league
        .db
        .submit_answer(q, league.silent, "Russell", Some(6), before_air())
        .unwrap();

    league
        .db
        .score_questions(league.league_season, &[ScoreRequest::new(q, "Parvati")])
        .unwrap();

    assert_eq!(league.db.get_team(league.answered).unwrap().total_points, 4);
    assert_eq!(league.db.get_team(league.silent).unwrap().total_points, -6);
}
