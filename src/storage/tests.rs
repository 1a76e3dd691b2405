//! Unit tests for storage functionality

use super::*;
use crate::cli::types::{CastawayId, EpisodeNumber, LeagueSeasonId, SeasonId, TeamId};
use crate::error::LedgerError;
use chrono::{TimeZone, Utc};

struct Seeded {
    db: LedgerDatabase,
    season: SeasonId,
    league_season: LeagueSeasonId,
    team: TeamId,
    castaway: CastawayId,
}

fn create_test_db() -> LedgerDatabase {
    LedgerDatabase::new_in_memory().unwrap()
}

fn create_seeded_db() -> Seeded {
    let mut db = create_test_db();
    let season = db.create_season("Cagayan").unwrap();
    let castaway = db.add_castaway(season, "Tony").unwrap();
    let league_season = db
        .create_league_season(season, "Office League", EpisodeNumber::new(1))
        .unwrap();
    let team = db.create_team(league_season, "Spy Shack").unwrap();

    Seeded {
        db,
        season,
        league_season,
        team,
        castaway,
    }
}

fn question(league_season: LeagueSeasonId) -> NewQuestion {
    NewQuestion {
        league_season_id: league_season,
        episode_number: EpisodeNumber::new(1),
        text: "Who plays an idol?".to_string(),
        question_type: QuestionType::MultipleChoice,
        options: vec!["Tony".to_string(), "Woo".to_string()],
        point_value: 3,
        is_wager: false,
        min_wager: None,
        max_wager: None,
    }
}

#[test]
fn test_database_creation() {
    let db = create_test_db();
    let count: i64 = db
        .conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 10);
}

#[test]
fn test_schema_initialization_is_repeatable() {
    let mut db = create_test_db();
    assert!(db.initialize_schema().is_ok());
}

#[test]
fn test_missing_rows_are_not_found() {
    let db = create_test_db();
    let err = db.get_team(TeamId::new(99)).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "team", id: 99 }));
    assert!(matches!(
        db.get_league_season(LeagueSeasonId::new(1)),
        Err(LedgerError::NotFound { .. })
    ));
}

#[test]
fn test_castaway_status_round_trip() {
    let mut seeded = create_seeded_db();
    seeded
        .db
        .set_castaway_status(seeded.castaway, CastawayStatus::Jury)
        .unwrap();
    assert_eq!(
        seeded.db.get_castaway(seeded.castaway).unwrap().status,
        CastawayStatus::Jury
    );
    assert!("eliminated".parse::<CastawayStatus>().is_ok());
    assert!("voted off".parse::<CastawayStatus>().is_err());
}

#[test]
fn test_roster_interval_lifecycle() {
    let mut seeded = create_seeded_db();
    let db = &mut seeded.db;

    db.add_team_castaway(seeded.team, seeded.castaway, EpisodeNumber::new(1))
        .unwrap();

    // Already on the team
    let err = db
        .add_team_castaway(seeded.team, seeded.castaway, EpisodeNumber::new(2))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInterval { .. }));

    db.close_team_castaway(seeded.team, seeded.castaway, EpisodeNumber::new(3))
        .unwrap();

    // Rejoining must start after the previous end
    assert!(db
        .add_team_castaway(seeded.team, seeded.castaway, EpisodeNumber::new(3))
        .is_err());
    db.add_team_castaway(seeded.team, seeded.castaway, EpisodeNumber::new(6))
        .unwrap();

    let intervals = db.team_castaway_intervals(seeded.team).unwrap();
    assert_eq!(intervals.len(), 2);
    assert_eq!(intervals[0].end_episode, Some(EpisodeNumber::new(3)));
    assert_eq!(intervals[1].start_episode, EpisodeNumber::new(6));
    assert_eq!(intervals[1].end_episode, None);
}

#[test]
fn test_close_interval_rejects_end_before_start() {
    let mut seeded = create_seeded_db();
    seeded
        .db
        .add_team_castaway(seeded.team, seeded.castaway, EpisodeNumber::new(4))
        .unwrap();

    let err = seeded
        .db
        .close_team_castaway(seeded.team, seeded.castaway, EpisodeNumber::new(3))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInterval { .. }));
}

#[test]
fn test_close_interval_without_open_interval() {
    let mut seeded = create_seeded_db();
    let err = seeded
        .db
        .close_team_castaway(seeded.team, seeded.castaway, EpisodeNumber::new(3))
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
}

#[test]
fn test_castaway_from_other_season_rejected() {
    let mut seeded = create_seeded_db();
    let other_season = seeded.db.create_season("Gabon").unwrap();
    let stranger = seeded.db.add_castaway(other_season, "Bob").unwrap();

    let err = seeded
        .db
        .add_team_castaway(seeded.team, stranger, EpisodeNumber::new(1))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInterval { .. }));
    assert_ne!(other_season, seeded.season);
}

#[test]
fn test_retention_config_upsert_and_validation() {
    let mut seeded = create_seeded_db();
    let db = &mut seeded.db;

    db.set_retention_points(seeded.league_season, EpisodeNumber::new(1), 2)
        .unwrap();
    db.set_retention_points(seeded.league_season, EpisodeNumber::new(1), 3)
        .unwrap();
    let err = db
        .set_retention_points(seeded.league_season, EpisodeNumber::new(2), -1)
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidRetention { .. }));

    let configs = db.retention_configs(seeded.league_season).unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].points_per_castaway, 3);
}

#[test]
fn test_create_question_round_trip() {
    let mut seeded = create_seeded_db();
    let id = seeded.db.create_question(&question(seeded.league_season)).unwrap();

    let stored = seeded.db.get_question(id).unwrap();
    assert_eq!(stored.options, vec!["Tony".to_string(), "Woo".to_string()]);
    assert_eq!(stored.question_type, QuestionType::MultipleChoice);
    assert!(!stored.is_scored);
    assert_eq!(stored.correct_answer, None);

    let listed = seeded
        .db
        .questions_for_episode(seeded.league_season, EpisodeNumber::new(1))
        .unwrap();
    assert_eq!(listed, vec![stored]);
}

#[test]
fn test_create_question_validation() {
    let mut seeded = create_seeded_db();

    let mut duplicate_options = question(seeded.league_season);
    duplicate_options.options = vec!["Tony".to_string(), " tony ".to_string()];
    assert!(matches!(
        seeded.db.create_question(&duplicate_options),
        Err(LedgerError::InvalidQuestion { .. })
    ));

    let mut blank = question(seeded.league_season);
    blank.text = "   ".to_string();
    assert!(seeded.db.create_question(&blank).is_err());

    let mut inverted = question(seeded.league_season);
    inverted.is_wager = true;
    inverted.min_wager = Some(10);
    inverted.max_wager = Some(5);
    assert!(matches!(
        seeded.db.create_question(&inverted),
        Err(LedgerError::InvalidQuestion { .. })
    ));
}

#[test]
fn test_update_and_delete_unscored_question() {
    let mut seeded = create_seeded_db();
    let id = seeded.db.create_question(&question(seeded.league_season)).unwrap();

    let updated = seeded
        .db
        .update_question(
            id,
            &QuestionUpdate {
                point_value: Some(8),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.point_value, 8);
    assert_eq!(updated.text, "Who plays an idol?");

    seeded.db.delete_question(id).unwrap();
    assert!(matches!(
        seeded.db.get_question(id),
        Err(LedgerError::NotFound { .. })
    ));
}

#[test]
fn test_edit_cannot_strand_submitted_answers() {
    let mut seeded = create_seeded_db();
    let id = seeded.db.create_question(&question(seeded.league_season)).unwrap();
    let now = Utc.with_ymd_and_hms(2014, 2, 26, 12, 0, 0).unwrap();
    seeded
        .db
        .submit_answer(id, seeded.team, "woo", None, now)
        .unwrap();

    let dropped_option = QuestionUpdate {
        options: Some(vec!["Tony".to_string(), "Kass".to_string()]),
        ..Default::default()
    };
    assert!(matches!(
        seeded.db.update_question(id, &dropped_option),
        Err(LedgerError::InvalidQuestion { .. })
    ));

    // A wager question would need a wager the stored answer never made.
    let made_wager = QuestionUpdate {
        is_wager: Some(true),
        min_wager: Some(Some(1)),
        max_wager: Some(Some(5)),
        ..Default::default()
    };
    assert!(seeded.db.update_question(id, &made_wager).is_err());

    let unchanged = seeded.db.get_question(id).unwrap();
    assert_eq!(unchanged.options, vec!["Tony".to_string(), "Woo".to_string()]);
    assert!(!unchanged.is_wager);

    let renamed = seeded
        .db
        .update_question(
            id,
            &QuestionUpdate {
                options: Some(vec!["Tony".to_string(), "Woo".to_string(), "Kass".to_string()]),
                point_value: Some(4),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.options.len(), 3);
    assert_eq!(renamed.point_value, 4);
}

#[test]
fn test_wager_bounds_are_capped() {
    let mut seeded = create_seeded_db();
    let mut huge = question(seeded.league_season);
    huge.question_type = QuestionType::FillInTheBlank;
    huge.options = vec![];
    huge.is_wager = true;
    huge.min_wager = Some(0);
    huge.max_wager = Some(i64::MAX);

    assert!(matches!(
        seeded.db.create_question(&huge),
        Err(LedgerError::InvalidQuestion { .. })
    ));

    huge.max_wager = Some(crate::scoring::answers::MAX_WAGER);
    assert!(seeded.db.create_question(&huge).is_ok());
}

#[test]
fn test_scored_question_is_immutable() {
    let mut seeded = create_seeded_db();
    let id = seeded.db.create_question(&question(seeded.league_season)).unwrap();
    seeded
        .db
        .score_questions(
            seeded.league_season,
            &[crate::scoring::ScoreRequest::new(id, "Tony")],
        )
        .unwrap();

    let update = QuestionUpdate {
        text: Some("Edited".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        seeded.db.update_question(id, &update),
        Err(LedgerError::QuestionAlreadyScored { .. })
    ));
    assert!(matches!(
        seeded.db.delete_question(id),
        Err(LedgerError::QuestionAlreadyScored { .. })
    ));
}

#[test]
fn test_standings_share_rank_on_ties() {
    let mut seeded = create_seeded_db();
    let second = seeded.db.create_team(seeded.league_season, "Brains").unwrap();
    let third = seeded.db.create_team(seeded.league_season, "Aparri").unwrap();

    seeded
        .db
        .conn
        .execute(
            "UPDATE teams SET total_points = CASE team_id WHEN ? THEN 10 WHEN ? THEN 10 ELSE 4 END",
            rusqlite::params![seeded.team, second],
        )
        .unwrap();

    let standings = seeded.db.get_standings(seeded.league_season).unwrap();
    let ranks: Vec<(u32, &str, i64)> = standings
        .iter()
        .map(|standing| (standing.rank, standing.name.as_str(), standing.total_points))
        .collect();
    assert_eq!(
        ranks,
        vec![(1, "Brains", 10), (1, "Spy Shack", 10), (3, "Aparri", 4)]
    );
    assert_eq!(standings[2].team_id, third);
}

#[test]
fn test_load_fixture() {
    let json = r#"{
        "seasons": [{
            "id": 40,
            "name": "Winners at War",
            "episodes": [
                {"number": 1, "air_date": "2024-02-20T01:00:00Z"},
                {"number": 2}
            ],
            "castaways": [
                {"id": 1, "name": "Sandra"},
                {"id": 2, "name": "Parvati", "status": "ELIMINATED"}
            ]
        }],
        "league_seasons": [{
            "id": 7,
            "season_id": 40,
            "name": "Office League",
            "active_episode": 2,
            "retention": [{"episode": 1, "points_per_castaway": 2}],
            "teams": [{
                "id": 3,
                "name": "Queens",
                "roster": [
                    {"castaway_id": 2, "start_episode": 1, "end_episode": 1},
                    {"castaway_id": 1, "start_episode": 1}
                ]
            }],
            "questions": [{
                "id": 11,
                "episode_number": 1,
                "text": "Who goes home?",
                "question_type": "FILL_IN_THE_BLANK",
                "point_value": 5
            }]
        }]
    }"#;
    let fixture: Fixture = serde_json::from_str(json).unwrap();

    let mut db = create_test_db();
    let summary = db.load_fixture(&fixture).unwrap();
    assert_eq!(
        summary,
        FixtureSummary {
            seasons: 1,
            episodes: 2,
            castaways: 2,
            league_seasons: 1,
            teams: 1,
            roster_intervals: 2,
            questions: 1,
        }
    );

    let league = db.get_league_season(LeagueSeasonId::new(7)).unwrap();
    assert_eq!(league.active_episode, EpisodeNumber::new(2));
    assert_eq!(
        db.get_castaway(CastawayId::new(2)).unwrap().status,
        CastawayStatus::Eliminated
    );
    assert!(db.list_episodes(SeasonId::new(40)).unwrap()[0].air_date.is_some());
    assert_eq!(db.team_castaway_intervals(TeamId::new(3)).unwrap().len(), 2);
    assert_eq!(
        db.get_question(crate::cli::types::QuestionId::new(11))
            .unwrap()
            .point_value,
        5
    );
}

#[test]
fn test_failed_fixture_writes_nothing() {
    let json = r#"{
        "seasons": [{"id": 1, "name": "Borneo", "castaways": [{"id": 1, "name": "Richard"}]}],
        "league_seasons": [{
            "id": 1,
            "season_id": 1,
            "name": "League",
            "retention": [{"episode": 1, "points_per_castaway": -3}]
        }]
    }"#;
    let fixture: Fixture = serde_json::from_str(json).unwrap();

    let mut db = create_test_db();
    assert!(db.load_fixture(&fixture).is_err());
    assert!(db.get_castaway(CastawayId::new(1)).is_err());
}
