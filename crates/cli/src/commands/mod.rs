//! Command implementations and dispatch.

pub mod login;
pub mod rest;

use anyhow::{Context, Result};
use thingsboard_client::ThingsBoardClient;
use thingsboard_config::Config;

use crate::args::Commands;

/// Build a client from the resolved configuration.
pub fn build_client_from_config(config: &Config) -> Result<ThingsBoardClient> {
    ThingsBoardClient::builder()
        .from_config(config)
        .build()
        .context("Failed to build ThingsBoard client")
}

/// Route a parsed subcommand to its handler.
pub async fn run_command(command: Commands, config: Config) -> Result<()> {
    let client = build_client_from_config(&config)?;

    match command {
        Commands::Login => login::run(&client).await,
        Commands::Get { path, query } => rest::get(&client, &path, &query).await,
        Commands::Post { path, body } => rest::post(&client, &path, &body).await,
        Commands::Delete { path } => rest::delete(&client, &path).await,
    }
}
