//! `flightlookup` - CLI and HTTP server for flight lookups
//!
//! This binary runs the lookup server, answers one-shot flight and airport
//! queries, and hosts the interactive lookup session.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;

use flightlookup::cli::{
    repl, AirportsCommand, BackendArgs, Cli, Command, ConfigCommand, FlightsCommand,
    LookupCommand, ServeCommand, StatusCommand,
};
use flightlookup::client::{DebounceTiming, HttpBackend, LookupBackend, LookupClient};
use flightlookup::display::{airport_line, flight_card};
use flightlookup::server::{self, ServerHandle};
use flightlookup::services::ProviderStatus;
use flightlookup::{init_logging, Config, FlightQuery, RouteQuery, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.command {
        Command::Serve(cmd) => handle_serve(config, &cmd).await,
        Command::Flights(cmd) => handle_flights(&config, &cmd).await,
        Command::Airports(cmd) => handle_airports(&config, &cmd).await,
        Command::Lookup(cmd) => handle_lookup(&config, &cmd).await,
        Command::Status(cmd) => handle_status(&config, &cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

/// In-process services, or a client for the server named on the command
/// line or in `client.server_url`.
fn backend(config: &Config, args: &BackendArgs) -> anyhow::Result<Arc<dyn LookupBackend>> {
    match args.server.as_ref().or(config.client.server_url.as_ref()) {
        Some(url) => {
            info!(%url, "using remote lookup server");
            Ok(Arc::new(HttpBackend::new(url, config.request_timeout())?))
        }
        None => Ok(Arc::new(Services::from_config(config)?)),
    }
}

async fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    if let Some(addr) = cmd.addr {
        config.server.addr = addr;
    }
    let services = Arc::new(Services::from_config(&config)?);
    let handle = ServerHandle::start(&config, services).await?;
    println!("Listening on {}", handle.url());

    server::ctrl_c().await;
    handle.shutdown().await?;
    Ok(())
}

async fn handle_flights(config: &Config, cmd: &FlightsCommand) -> anyhow::Result<()> {
    let query = match (&cmd.number, &cmd.date, &cmd.from, &cmd.to) {
        (Some(number), ..) => FlightQuery::Number(number.clone()),
        (None, None, None, None) => FlightQuery::Catalog,
        (None, date, from, to) => FlightQuery::Route(RouteQuery::new(
            date.as_deref().unwrap_or_default(),
            from.as_deref().unwrap_or_default(),
            to.as_deref().unwrap_or_default(),
        )),
    };

    let flights = backend(config, &cmd.backend)?
        .search_flights(&query)
        .await
        .context("flight lookup failed")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&flights)?);
    } else if flights.is_empty() {
        match query {
            FlightQuery::Route(route) if !route.is_complete() => {
                println!("A route search needs --date, --from and --to.");
            }
            FlightQuery::Route(_) => println!("No flights found for this route on that date."),
            FlightQuery::Number(_) | FlightQuery::Catalog => {
                println!("No flights found with that number.");
            }
        }
    } else {
        for flight in &flights {
            println!("{}", flight_card(flight));
        }
    }
    Ok(())
}

async fn handle_airports(config: &Config, cmd: &AirportsCommand) -> anyhow::Result<()> {
    let airports = backend(config, &cmd.backend)?
        .search_airports(&cmd.query)
        .await
        .context("airport search failed")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&airports)?);
    } else if airports.is_empty() {
        println!("No airports match {:?} (at least 2 characters are needed).", cmd.query);
    } else {
        for airport in &airports {
            println!("{}", airport_line(airport));
        }
    }
    Ok(())
}

async fn handle_lookup(config: &Config, cmd: &LookupCommand) -> anyhow::Result<()> {
    let timing = DebounceTiming::from_config(config);
    let client = LookupClient::spawn(backend(config, &cmd.backend)?, timing);
    let patience = config.request_timeout() + timing.flight.max(timing.airport);

    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let result = repl::run(&client, input, &mut stdout, patience).await;
    client.shutdown().await?;
    result?;
    Ok(())
}

async fn handle_status(config: &Config, cmd: &StatusCommand) -> anyhow::Result<()> {
    let status: ProviderStatus = match cmd.server.as_ref() {
        Some(url) => {
            let url = format!("{}/status", url.trim_end_matches('/'));
            reqwest::get(&url)
                .await?
                .error_for_status()?
                .json()
                .await
                .with_context(|| format!("reading {url}"))?
        }
        None => Services::from_config(config)?.status().clone(),
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("flightlookup status");
        println!("-------------------");
        println!("Mode:          {}", status.mode);
        if status.has_api_key {
            println!("API key:       configured ({} characters)", status.key_length);
        } else {
            println!("API key:       not configured");
        }
        if cmd.server.is_none() {
            println!("Provider:      {}", config.upstream.base_url);
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Address:            {}", config.server.addr);
                println!("  Request timeout:    {}s", config.server.request_timeout_secs);
                println!();
                println!("[Upstream]");
                println!("  Base URL:           {}", config.upstream.base_url);
                println!(
                    "  Access key:         {}",
                    config.upstream.access_key.as_deref().unwrap_or("(none)")
                );
                println!("  Timeout:            {}s", config.upstream.timeout_secs);
                println!("  Cache TTL:          {}s", config.upstream.cache_ttl_secs);
                println!("  Mock fallback:      {}", config.upstream.mock_fallback);
                println!();
                println!("[Client]");
                println!(
                    "  Server URL:         {}",
                    config.client.server_url.as_deref().unwrap_or("(in-process)")
                );
                println!("  Flight debounce:    {}ms", config.client.flight_debounce_ms);
                println!("  Airport debounce:   {}ms", config.client.airport_debounce_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
