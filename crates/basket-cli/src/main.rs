//! Basket CLI - shopping list from the terminal
//!
//! Plan at home, tick things off in the store, against the same Supabase
//! project the desktop app uses.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::{
    add::run_add, auth_cmd::run_auth, buy::run_buy, category::run_category,
    completions::run_completions, config::run_config, delete::run_delete, list::run_list,
    need::run_need, reset::run_reset, watch::run_watch,
};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("basket=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::List { store, json } => run_list(store, json, profile).await?,
        Commands::Add { category, name } => run_add(&category, &name, profile).await?,
        Commands::Category { command } => run_category(command, profile).await?,
        Commands::Need { item } => run_need(&item, profile).await?,
        Commands::Buy { item } => run_buy(&item, profile).await?,
        Commands::Delete { item } => run_delete(&item, profile).await?,
        Commands::Reset => run_reset(profile).await?,
        Commands::Watch { store } => run_watch(store, profile).await?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Auth { command } => run_auth(command, profile).await?,
    }

    Ok(())
}
