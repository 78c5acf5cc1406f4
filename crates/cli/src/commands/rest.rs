//! Raw REST commands: GET, POST and DELETE against arbitrary API paths.

use anyhow::{Context, Result};
use serde_json::Value;
use thingsboard_client::ThingsBoardClient;
use tracing::debug;

pub async fn get(client: &ThingsBoardClient, path: &str, query: &[(String, String)]) -> Result<()> {
    let query: Vec<(&str, &str)> = query
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    debug!(path, params = query.len(), "GET");

    match client.get_optional(path, &query).await? {
        Some(value) => print_json(&value),
        None => {
            println!("not found");
            Ok(())
        }
    }
}

pub async fn post(client: &ThingsBoardClient, path: &str, body: &str) -> Result<()> {
    let body: Value = serde_json::from_str(body).context("Request body is not valid JSON")?;

    debug!(path, "POST");

    let value = client.post_json(path, &body).await?;
    print_json(&value)
}

pub async fn delete(client: &ThingsBoardClient, path: &str) -> Result<()> {
    debug!(path, "DELETE");

    if client.delete(path).await? {
        println!("deleted");
    } else {
        println!("not found");
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to format response")?;
    println!("{}", output);
    Ok(())
}
