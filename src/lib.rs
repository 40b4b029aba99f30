pub mod api;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod domain;
pub mod errors;
pub mod http;
pub mod rate_limiter;
pub mod services;
pub mod store;

use std::io;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use cli::Cli;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::delivery::ConsoleAuditLog;
use crate::domain::{LeaderboardSort, RefereeProfile};
use crate::services::server::ServerService;
use crate::services::RosterService;
use crate::store::DataStore;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_stats(user_id: &str) -> Result<()> {
    let profile = local_roster(&AppConfig::from_env()).profile(user_id)?;
    print_profile(&profile);
    Ok(())
}

pub fn handle_leaderboard(sort_by: LeaderboardSort) -> Result<()> {
    let rows = local_roster(&AppConfig::from_env()).leaderboard(sort_by);
    if rows.is_empty() {
        println!("No referees registered yet.");
        return Ok(());
    }

    println!("{}", format!("🏆 Leaderboard ({:?})", sort_by).bold());
    for row in rows {
        let medal = match row.rank {
            1 => "🥇".to_string(),
            2 => "🥈".to_string(),
            3 => "🥉".to_string(),
            n => format!("{}.", n),
        };
        println!(
            "{:>3} {:<24} ⭐ {:.1}  |  ⚽ {}",
            medal,
            row.name,
            row.rating,
            row.matches
        );
    }
    Ok(())
}

pub fn handle_history() -> Result<()> {
    let entries = local_roster(&AppConfig::from_env()).history();
    if entries.is_empty() {
        println!("No matches have been recorded yet.");
        return Ok(());
    }

    println!("{}", "📜 Match history".bold());
    for entry in entries {
        println!(
            "{} {} | {} {} | {}",
            entry.record.date.to_string().dimmed(),
            entry.record.fixture.bold(),
            entry.record.match_type,
            entry.record.time,
            entry.ref_name.cyan()
        );
    }
    Ok(())
}

pub fn handle_reset(yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to wipe the data store without --yes");
    }

    let config = AppConfig::from_env();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (_, audit) = delivery::from_settings(&config.delivery)?;
        let store = Arc::new(DataStore::from_settings(&config.store));
        let roster = RosterService::new(store, audit, config.league.clone());
        roster.reset("cli").await?;
        println!("{}", "Database wiped. The previous state is in the backup file.".yellow());
        Ok::<(), anyhow::Error>(())
    })
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
    Ok(())
}

fn local_roster(config: &AppConfig) -> RosterService {
    let store = Arc::new(DataStore::from_settings(&config.store));
    RosterService::new(store, Arc::new(ConsoleAuditLog), config.league.clone())
}

fn print_profile(profile: &RefereeProfile) {
    let status = match profile.status.as_str() {
        "ACTIVE" => profile.status.green(),
        "SUSPENDED" => profile.status.red(),
        _ => profile.status.yellow(),
    };

    println!("{} {}", "👤".bold(), profile.name.bold());
    println!("  ID:          {}", profile.referee_id);
    println!("  Category:    {}", profile.category);
    println!("  Status:      {}", status);
    println!("  Rating:      ⭐ {:.1}/5", profile.rating);
    println!("  Matches:     {}", profile.matches_completed);
    println!("  Strikes:     {}", profile.strikes);
    println!("  Working:     {}", join(&profile.availability));
    if !profile.clubs.is_empty() {
        println!("  Conflicts:   {}", profile.clubs.join(", "));
    }
    if let Some(feedback) = &profile.latest_feedback {
        println!(
            "  Latest:      \"{}\" - {} ({}⭐)",
            feedback.comment, feedback.from_name, feedback.stars
        );
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}
