//! Command handlers for the inspection commands

use anyhow::{Context, Result};
use colored::*;

use odata_mapper::api::ODataConnection;
use odata_mapper::api::constants::METADATA_SEGMENT;
use odata_mapper::api::query::filter_suffix_pairs;
use odata_mapper::codec::xml::pretty_print;

use crate::config::Config;

fn connect(config: &Config, entity: &str) -> Result<ODataConnection> {
    let connection_config = config.connection_config(entity)?;
    ODataConnection::new(connection_config).context("Failed to create OData connection")
}

pub fn handle_metadata(config: &Config, pretty: bool) -> Result<()> {
    let mut connection = connect(config, METADATA_SEGMENT)?;
    let metadata = connection
        .fetch_metadata()
        .with_context(|| format!("Failed to fetch {}", connection.metadata_url()))?;

    if pretty {
        match pretty_print(&metadata) {
            Some(formatted) => println!("{}", formatted),
            None => {
                log::warn!("Metadata is not well-formed XML, printing it unchanged");
                println!("{}", metadata);
            }
        }
    } else {
        println!("{}", metadata);
    }
    Ok(())
}

pub fn handle_get(config: &Config, path: &str) -> Result<()> {
    let path = path.trim_start_matches('/');
    let entity = path
        .split(['/', '(', '?'])
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(METADATA_SEGMENT);

    let mut connection = connect(config, entity)?;
    let url = format!("{}{}", connection.service_root_url(), path);
    let response = connection
        .inspect(&url)
        .with_context(|| format!("GET {} failed", url))?;

    let status = response.status_line();
    if response.status().is_success() {
        println!("{}", status.bright_green().bold());
    } else {
        println!("{}", status.bright_red().bold());
    }
    if let Some(message) = response.sap_message() {
        println!("{} {}", "sap-message:".dimmed(), message);
    }
    println!();
    println!("{}", response.document_as_string()?);
    Ok(())
}

pub fn handle_count(config: &Config, entity: &str, filters: &[String]) -> Result<()> {
    let pairs = filters
        .iter()
        .map(|filter| parse_filter(filter))
        .collect::<Result<Vec<_>>>()?;
    let suffix = if pairs.is_empty() {
        String::new()
    } else {
        filter_suffix_pairs(&pairs)?
    };

    let mut connection = connect(config, entity)?;
    let count = connection
        .count(&suffix)
        .with_context(|| format!("Failed to count {}", entity))?;
    println!("{} {}", entity.cyan(), count.to_string().bold());
    Ok(())
}

/// `NAME=VALUE`, with VALUE already an OData literal such as `5` or `'text'`
fn parse_filter(filter: &str) -> Result<(&str, &str)> {
    match filter.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
            Ok((name.trim(), value.trim()))
        }
        _ => anyhow::bail!("Filter must look like NAME=VALUE: {:?}", filter),
    }
}
