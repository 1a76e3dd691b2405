//! Fixture loading command

use crate::{
    storage::{Fixture, FixtureSummary, LedgerDatabase},
    Result,
};
use std::path::Path;

use super::print_json;

/// Load a JSON fixture into the database in one transaction
pub fn handle_load(db: &mut LedgerDatabase, path: &Path, as_json: bool) -> Result<FixtureSummary> {
    let fixture = Fixture::from_path(path)?;
    let summary = db.load_fixture(&fixture)?;
    tracing::info!(path = %path.display(), "fixture loaded");

    if as_json {
        print_json(&summary)?;
    } else {
        println!("✓ Loaded {}", path.display());
        println!(
            "  {} season(s), {} episode(s), {} castaway(s)",
            summary.seasons, summary.episodes, summary.castaways
        );
        println!(
            "  {} league season(s), {} team(s), {} roster interval(s), {} question(s)",
            summary.league_seasons, summary.teams, summary.roster_intervals, summary.questions
        );
    }

    Ok(summary)
}
