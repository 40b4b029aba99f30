use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::domain::LeaderboardSort;

#[derive(Parser, Debug)]
#[command(author, version, about = "referee desk: registration, match assignment and roster upkeep")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Show a referee's profile card
    Stats {
        /// Chat user id of the referee
        user_id: String,
    },
    /// Show the top referees
    Leaderboard {
        /// rating or matches
        #[arg(long = "sort-by", default_value = "rating")]
        sort_by: LeaderboardSort,
    },
    /// Show the latest accepted matches
    History,
    /// Wipe the data store (the previous document stays in the backup file)
    Reset {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}
