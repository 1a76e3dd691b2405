//! Scoring and recalculation commands

use crate::{
    scoring::{LeagueRecalculation, ScoreRequest, ScoringSummary, TeamRecalculation},
    storage::LedgerDatabase,
    EpisodeNumber, LeagueSeasonId, Result, TeamId,
};

use super::print_json;

/// Score a batch of questions and report what was written
pub fn handle_score(
    db: &mut LedgerDatabase,
    league_season: LeagueSeasonId,
    requests: &[ScoreRequest],
    as_json: bool,
) -> Result<ScoringSummary> {
    let summary = db.score_questions(league_season, requests)?;

    if as_json {
        print_json(&summary)?;
    } else {
        println!(
            "✓ Scored {} question(s): {} answer(s), {} team(s) recalculated",
            summary.scored_count, summary.answers_scored, summary.teams_recalculated
        );
    }

    Ok(summary)
}

/// Rebuild one team's ledger. Without an explicit bound the league's default
/// recalculation bound is used.
pub fn handle_recalculate_team(
    db: &mut LedgerDatabase,
    team: TeamId,
    through_episode: Option<EpisodeNumber>,
    as_json: bool,
) -> Result<TeamRecalculation> {
    let max_episode = match through_episode {
        Some(episode) => episode,
        None => {
            let league_season = db.get_team(team)?.league_season_id;
            db.default_recalculation_bound(league_season)?
        }
    };

    let outcome = db.recalculate_team_history(team, max_episode)?;

    if as_json {
        print_json(&outcome)?;
    } else {
        println!(
            "✓ Team {} recalculated through episode {}: {} points",
            outcome.team_id, outcome.max_episode, outcome.final_total
        );
    }

    Ok(outcome)
}

pub fn handle_recalculate_all(
    db: &mut LedgerDatabase,
    league_season: LeagueSeasonId,
    as_json: bool,
) -> Result<LeagueRecalculation> {
    let outcome = db.recalculate_all_episode_points(league_season)?;

    if as_json {
        print_json(&outcome)?;
    } else {
        println!(
            "✓ {} team(s) recalculated through episode {}",
            outcome.teams_recalculated, outcome.max_episode
        );
        for failure in &outcome.failures {
            println!("⚠ Team {} failed: {}", failure.team_id, failure.error);
        }
    }

    Ok(outcome)
}
