//! Read-only views: episode states, results, standings and team ledgers.
//!
//! Each handler returns the value it printed so callers (and tests) can
//! inspect it without parsing stdout.

use crate::{
    scoring::{EpisodeResults, EpisodeStatus, LeagueEpisodeStates},
    storage::{LedgerDatabase, Standing, TeamEpisodePoints},
    EpisodeNumber, LeagueSeasonId, Result, TeamId,
};
use chrono::{DateTime, Utc};

use super::print_json;

fn print_status(status: &EpisodeStatus) {
    let air_date = status
        .air_date
        .map(|air_date| air_date.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unscheduled".to_string());
    println!(
        "Episode {:>2}  {:<20} {}/{} scored  airs {}{}",
        status.episode_number.as_u16(),
        status.state.to_string(),
        status.scored_count,
        status.question_count,
        air_date,
        if status.can_submit { "  [open]" } else { "" }
    );
}

pub fn handle_episode_state(
    db: &LedgerDatabase,
    league_season: LeagueSeasonId,
    now: DateTime<Utc>,
    as_json: bool,
) -> Result<LeagueEpisodeStates> {
    let states = db.get_league_episode_states(league_season, now)?;

    if as_json {
        print_json(&states)?;
    } else {
        println!(
            "League season {} (active episode {})",
            states.league_season_id, states.active_episode
        );
        for status in &states.episodes {
            print_status(status);
        }
        if states.actions.is_empty() {
            println!("No commissioner actions pending");
        } else {
            println!("Commissioner actions:");
            for action in &states.actions {
                println!("  {} for episode {}", action.kind, action.episode_number);
            }
        }
    }

    Ok(states)
}

pub fn handle_single_episode_state(
    db: &LedgerDatabase,
    league_season: LeagueSeasonId,
    episode: EpisodeNumber,
    now: DateTime<Utc>,
    as_json: bool,
) -> Result<EpisodeStatus> {
    let status = db.get_episode_state(league_season, episode, now)?;

    if as_json {
        print_json(&status)?;
    } else {
        print_status(&status);
    }

    Ok(status)
}

pub fn handle_results(
    db: &LedgerDatabase,
    league_season: LeagueSeasonId,
    episode: EpisodeNumber,
    viewer: TeamId,
    now: DateTime<Utc>,
    as_json: bool,
) -> Result<EpisodeResults> {
    let results = db.get_episode_results(league_season, episode, viewer, now)?;

    if as_json {
        print_json(&results)?;
        return Ok(results);
    }

    println!("Episode {} results for team {}", results.episode_number, viewer);
    if !results.deadline_passed {
        println!("(other teams' answers are hidden until the episode airs)");
    }
    for entry in &results.questions {
        let question = &entry.question;
        let correct = match &question.correct_answer {
            Some(answer) if question.is_scored => format!("  [answer: {}]", answer),
            _ => String::new(),
        };
        println!("Q{} {}{}", question.question_id, question.text, correct);
        for answer in &entry.answers {
            let points = answer
                .points_earned
                .map(|points| format!("{:+}", points))
                .unwrap_or_else(|| "-".to_string());
            let wager = answer
                .wager_amount
                .map(|wager| format!(" (wager {})", wager))
                .unwrap_or_default();
            println!(
                "    {:<24} {}{}  {}",
                answer.team_name, answer.answer, wager, points
            );
        }
    }

    Ok(results)
}

pub fn handle_standings(
    db: &LedgerDatabase,
    league_season: LeagueSeasonId,
    as_json: bool,
) -> Result<Vec<Standing>> {
    let standings = db.get_standings(league_season)?;

    if as_json {
        print_json(&standings)?;
    } else {
        for standing in &standings {
            println!(
                "{:>3}. {:<24} {:>6}",
                standing.rank, standing.name, standing.total_points
            );
        }
    }

    Ok(standings)
}

pub fn handle_ledger(
    db: &LedgerDatabase,
    team: TeamId,
    as_json: bool,
) -> Result<Vec<TeamEpisodePoints>> {
    let rows = db.get_team_ledger(team)?;

    if as_json {
        print_json(&rows)?;
    } else if rows.is_empty() {
        println!("Team {} has no ledger rows yet", team);
    } else {
        println!("Episode  Questions  Retention  Episode  Running");
        for row in &rows {
            println!(
                "{:>7}  {:>9}  {:>9}  {:>7}  {:>7}",
                row.episode_number.as_u16(),
                row.question_points,
                row.retention_points,
                row.total_episode_points,
                row.running_total
            );
        }
    }

    Ok(rows)
}
