use anyhow::Result;

use referee_ops::cli::Command;
use referee_ops::{
    handle_completions, handle_history, handle_leaderboard, handle_reset, handle_serve, handle_stats,
    interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Stats { user_id } => handle_stats(user_id),
        Command::Leaderboard { sort_by } => handle_leaderboard(*sort_by),
        Command::History => handle_history(),
        Command::Reset { yes } => handle_reset(*yes),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
