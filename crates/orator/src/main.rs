// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orator - a Telegram bot that scores English pronunciation.
//!
//! This is the binary entry point: `serve` runs the bot, `user` and `usage`
//! are administration commands against the same database.

mod admin;
mod serve;

use clap::{Parser, Subcommand};

/// Orator - pronunciation assessment bot.
#[derive(Parser, Debug)]
#[command(name = "orator", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Telegram bot until SIGINT/SIGTERM.
    Serve,
    /// Inspect or adjust a user's quota.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Summarize inference usage and estimated cost for one day.
    Usage {
        /// Day to summarize (YYYY-MM-DD, UTC). Defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Show a user's plan, quota and referrals.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Upgrade a user to premium for a number of days.
    GrantPremium {
        id: String,
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Add bonus attempts to a user.
    AddBonus { id: String, amount: u32 },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match orator_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            orator_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::User { action }) => match action {
            UserCommands::Show { id, json } => admin::show_user(&config, &id, json).await,
            UserCommands::GrantPremium { id, days } => {
                admin::grant_premium(&config, &id, days).await
            }
            UserCommands::AddBonus { id, amount } => admin::add_bonus(&config, &id, amount).await,
        },
        Some(Commands::Usage { date, json }) => {
            admin::usage(&config, date.as_deref(), json).await
        }
        None => {
            println!("orator: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
