//! Line-oriented front end for a [`LookupClient`].
//!
//! Each line is either plain text, which becomes the flight number, or a
//! `:command`. After every line the session is allowed to settle (debounce
//! timer fired and query answered) before the relevant part of its state is
//! printed.

use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use crate::client::{Field, FieldState, LookupClient, SearchMode, Session};
use crate::display::{airport_line, flight_card};
use crate::error::Result;

/// Help text for the interactive session.
pub const HELP: &str = "\
Commands:
  <text>                 type a flight number (flight mode)
  :mode flight|route     switch search mode
  :origin <text>         type the departure airport (route mode)
  :dest <text>           type the arrival airport (route mode)
  :date <YYYY-MM-DD>     set the flight date (route mode)
  :pick <n>              choose flight suggestion n
  :pick origin|dest <n>  choose airport suggestion n
  :submit                run the search
  :show                  print the current state
  :help                  show this help
  :quit                  leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Blank line.
    Nothing,
    /// Free text for the current mode's main field.
    Text(String),
    /// Switch mode.
    Mode(SearchMode),
    /// Set a specific field.
    Input(Field, String),
    /// Choose a flight suggestion (zero-based).
    PickFlight(usize),
    /// Choose an airport suggestion (zero-based).
    PickAirport(Field, usize),
    /// Run the search.
    Submit,
    /// Print everything.
    Show,
    /// Print help.
    Help,
    /// Leave.
    Quit,
}

/// Parse one input line.
///
/// Suggestion numbers are one-based as printed.
///
/// # Errors
///
/// Returns a message describing why the line is not understood.
pub fn parse_line(line: &str) -> std::result::Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Nothing);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(ReplCommand::Text(line.to_string()));
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, r)| (n, r.trim()));
    match name {
        "mode" => match rest {
            "flight" | "number" => Ok(ReplCommand::Mode(SearchMode::FlightNumber)),
            "route" => Ok(ReplCommand::Mode(SearchMode::Route)),
            other => Err(format!("unknown mode '{other}', expected flight or route")),
        },
        "origin" | "from" => Ok(ReplCommand::Input(Field::Origin, rest.to_string())),
        "dest" | "to" => Ok(ReplCommand::Input(Field::Destination, rest.to_string())),
        "date" => Ok(ReplCommand::Input(Field::Date, rest.to_string())),
        "pick" => parse_pick(rest),
        "submit" | "go" => Ok(ReplCommand::Submit),
        "show" => Ok(ReplCommand::Show),
        "help" | "h" => Ok(ReplCommand::Help),
        "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
        other => Err(format!("unknown command ':{other}', try :help")),
    }
}

fn parse_pick(args: &str) -> std::result::Result<ReplCommand, String> {
    let mut parts = args.split_whitespace();
    let (field, number) = match (parts.next(), parts.next(), parts.next()) {
        (Some(n), None, None) => (None, n),
        (Some("origin" | "from"), Some(n), None) => (Some(Field::Origin), n),
        (Some("dest" | "to"), Some(n), None) => (Some(Field::Destination), n),
        _ => return Err("usage: :pick <n> or :pick origin|dest <n>".to_string()),
    };
    let index = number
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| format!("'{number}' is not a suggestion number"))?;
    Ok(match field {
        Some(field) => ReplCommand::PickAirport(field, index),
        None => ReplCommand::PickFlight(index),
    })
}

/// Read commands from `input` until EOF or `:quit`, printing to `out`.
///
/// `patience` bounds how long to wait for the session to settle after each
/// line.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails, or the session
/// stops.
pub async fn run<R, W>(
    client: &LookupClient,
    input: R,
    out: &mut W,
    patience: Duration,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "Flight lookup. Type :help for commands.")?;
    prompt(client, out)?;

    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{message}")?;
                prompt(client, out)?;
                continue;
            }
        };

        match command {
            ReplCommand::Nothing => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => writeln!(out, "{HELP}")?,
            ReplCommand::Show => render_all(&client.state(), out)?,
            ReplCommand::Mode(mode) => {
                client.set_mode(mode)?;
                settle(client, patience, |_| true).await?;
            }
            ReplCommand::Text(text) => {
                if client.state().mode() == SearchMode::Route {
                    writeln!(out, "In route mode use :origin, :dest and :date.")?;
                } else {
                    type_into(client, Field::FlightNumber, text, out, patience).await?;
                }
            }
            ReplCommand::Input(field, text) => {
                if client.state().mode() == SearchMode::FlightNumber {
                    writeln!(out, "Switch to route mode first with :mode route.")?;
                } else {
                    type_into(client, field, text, out, patience).await?;
                }
            }
            ReplCommand::PickFlight(index) => {
                client.pick_flight(index)?;
                let state = settle(client, patience, |_| true).await?;
                render_results(&state, out)?;
            }
            ReplCommand::PickAirport(field, index) => {
                client.pick_airport(field, index)?;
                let state = settle(client, patience, |_| true).await?;
                writeln!(out, "{field}: {}", state.value(field))?;
            }
            ReplCommand::Submit => {
                client.submit()?;
                let state = settle(client, patience, |s| !s.is_loading()).await?;
                render_results(&state, out)?;
            }
        }
        prompt(client, out)?;
    }
    Ok(())
}

async fn type_into<W: Write>(
    client: &LookupClient,
    field: Field,
    text: String,
    out: &mut W,
    patience: Duration,
) -> Result<()> {
    client.input(field, text)?;
    let state = settle(client, patience, |s| {
        s.field_state(field) != FieldState::DebouncePending
    })
    .await?;
    render_suggestions(&state, field, out)
}

/// Wait for the session to settle, falling back to the latest state.
async fn settle<F>(client: &LookupClient, patience: Duration, condition: F) -> Result<Session>
where
    F: FnMut(&Session) -> bool,
{
    if let Ok(settled) = tokio::time::timeout(patience, client.settle(condition)).await {
        settled
    } else {
        warn!("lookup session did not settle within {patience:?}");
        Ok(client.state())
    }
}

fn prompt<W: Write>(client: &LookupClient, out: &mut W) -> Result<()> {
    let label = match client.state().mode() {
        SearchMode::FlightNumber => "flight",
        SearchMode::Route => "route",
    };
    write!(out, "{label}> ")?;
    out.flush()?;
    Ok(())
}

fn render_suggestions<W: Write>(state: &Session, field: Field, out: &mut W) -> Result<()> {
    match field {
        Field::FlightNumber => {
            for (i, flight) in state.flight_suggestions().iter().enumerate() {
                writeln!(
                    out,
                    "  {}. {} {} ({} -> {})",
                    i + 1,
                    flight.flight_number,
                    flight.airline,
                    flight.start_location,
                    flight.end_location
                )?;
            }
        }
        Field::Origin | Field::Destination => {
            for (i, airport) in state.airport_suggestions(field).iter().enumerate() {
                writeln!(out, "  {}. {}", i + 1, airport_line(airport))?;
            }
        }
        Field::Date => {}
    }
    Ok(())
}

fn render_results<W: Write>(state: &Session, out: &mut W) -> Result<()> {
    if state.is_loading() {
        writeln!(out, "Searching...")?;
    }
    if let Some(notice) = state.notice() {
        writeln!(out, "{notice}")?;
    }
    for flight in state.results() {
        write!(out, "{}", flight_card(flight))?;
    }
    Ok(())
}

fn render_all<W: Write>(state: &Session, out: &mut W) -> Result<()> {
    match state.mode() {
        SearchMode::FlightNumber => {
            writeln!(out, "flight number: {}", state.value(Field::FlightNumber))?;
        }
        SearchMode::Route => {
            for field in [Field::Date, Field::Origin, Field::Destination] {
                writeln!(out, "{field}: {}", state.value(field))?;
            }
        }
    }
    render_suggestions(state, Field::FlightNumber, out)?;
    render_suggestions(state, Field::Origin, out)?;
    render_suggestions(state, Field::Destination, out)?;
    render_results(state, out)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::DebounceTiming;
    use crate::services::Services;

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse_line(" AA123 "), Ok(ReplCommand::Text("AA123".to_string())));
        assert_eq!(parse_line("   "), Ok(ReplCommand::Nothing));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_line(":mode route"),
            Ok(ReplCommand::Mode(SearchMode::Route))
        );
        assert_eq!(
            parse_line(":origin new york"),
            Ok(ReplCommand::Input(Field::Origin, "new york".to_string()))
        );
        assert_eq!(
            parse_line(":date"),
            Ok(ReplCommand::Input(Field::Date, String::new()))
        );
        assert_eq!(parse_line(":go"), Ok(ReplCommand::Submit));
        assert_eq!(parse_line(":q"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn test_parse_pick() {
        assert_eq!(parse_line(":pick 2"), Ok(ReplCommand::PickFlight(1)));
        assert_eq!(
            parse_line(":pick dest 1"),
            Ok(ReplCommand::PickAirport(Field::Destination, 0))
        );
        assert!(parse_line(":pick 0").is_err());
        assert!(parse_line(":pick origin x").is_err());
        assert!(parse_line(":pick").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line(":mode sideways").unwrap_err().contains("sideways"));
        assert!(parse_line(":fly").unwrap_err().contains(":help"));
    }

    async fn run_script(script: &str) -> String {
        let client = LookupClient::spawn(Arc::new(Services::mock()), DebounceTiming::default());
        let mut out = Vec::new();
        run(&client, script.as_bytes(), &mut out, Duration::from_secs(5))
            .await
            .unwrap();
        client.shutdown().await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_flight_number_session() {
        let out = run_script("aa\n:pick 1\nzz9\n:submit\n:quit\n").await;
        assert!(out.contains("1. AA123 American Airlines"));
        assert!(out.contains("[+] On Time"));
        assert!(out.contains("No flights found with that number."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_session() {
        let out = run_script(
            ":mode route\n:origin jfk\n:pick origin 1\n:dest LHR\n:date 2025-12-18\n:submit\n",
        )
        .await;
        assert!(out.contains("1. JFK - John F. Kennedy International Airport"));
        assert!(out.contains("origin: JFK - John F. Kennedy International Airport"));
        assert!(out.contains("AA123 American Airlines"));
        assert!(out.contains("route> "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_guidance() {
        let out = run_script(":origin jfk\n:mode route\nAA123\n").await;
        assert!(out.contains("Switch to route mode first"));
        assert!(out.contains("In route mode use :origin"));
    }
}
