//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::Context;
use castaway_ledger::{
    cli::{Cli, Commands},
    commands::{
        load::handle_load,
        open_database, resolve_league_season,
        scoring::{handle_recalculate_all, handle_recalculate_team, handle_score},
        submit::{handle_submit_answer, SubmitAnswerParams},
        views::{
            handle_episode_state, handle_ledger, handle_results, handle_single_episode_state,
            handle_standings,
        },
    },
};
use chrono::Utc;
use clap::Parser;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("castaway_ledger={}", default_level).into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI.
fn main() -> anyhow::Result<()> {
    let app = Cli::parse();
    let global = app.global;
    init_tracing(global.verbose);

    let now = global.now.unwrap_or_else(Utc::now);
    let as_json = global.json;
    let mut db = open_database(global.db).context("failed to open ledger database")?;

    match app.command {
        Commands::Load { path } => {
            handle_load(&mut db, &path, as_json)
                .with_context(|| format!("failed to load fixture {}", path.display()))?;
        }

        Commands::SubmitAnswer {
            question,
            team,
            answer,
            wager,
        } => {
            handle_submit_answer(
                &mut db,
                SubmitAnswerParams {
                    question,
                    team,
                    answer,
                    wager,
                    now,
                    as_json,
                },
            )
            .context("answer rejected")?;
        }

        Commands::Score { answers } => {
            let league_season = resolve_league_season(global.league_season)?;
            handle_score(&mut db, league_season, &answers, as_json)
                .context("scoring batch rejected")?;
        }

        Commands::Recalculate {
            team,
            through_episode,
            all,
        } => match team {
            Some(team) if !all => {
                handle_recalculate_team(&mut db, team, through_episode, as_json)
                    .with_context(|| format!("failed to recalculate team {}", team))?;
            }
            _ => {
                let league_season = resolve_league_season(global.league_season)?;
                handle_recalculate_all(&mut db, league_season, as_json)
                    .context("league recalculation failed")?;
            }
        },

        Commands::EpisodeState { episode } => {
            let league_season = resolve_league_season(global.league_season)?;
            match episode {
                Some(episode) => {
                    handle_single_episode_state(&db, league_season, episode, now, as_json)?;
                }
                None => {
                    handle_episode_state(&db, league_season, now, as_json)?;
                }
            }
        }

        Commands::Results { episode, team } => {
            let league_season = resolve_league_season(global.league_season)?;
            handle_results(&db, league_season, episode, team, now, as_json)?;
        }

        Commands::Standings => {
            let league_season = resolve_league_season(global.league_season)?;
            handle_standings(&db, league_season, as_json)?;
        }

        Commands::Ledger { team } => {
            handle_ledger(&db, team, as_json)?;
        }
    }

    Ok(())
}
