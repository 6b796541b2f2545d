//! gobus-stops - Inspect and edit a bus's stop schedule

use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use libgobus::types::{NewSchedule, NewScheduleStop};
use libgobus::{GobusError, GobusService, Result};

#[derive(Parser, Debug)]
#[command(name = "gobus-stops")]
#[command(version)]
#[command(about = "Show, create and delete a bus's stop schedule")]
#[command(long_about = r#"Show, create and delete a bus's stop schedule.

Requires a logged-in session (see gobus-login). Stop specifications take
the form NAME@HH:MM and are sent in the order given; the server computes
distances and cumulative fares.

EXAMPLES:
    gobus-stops show 68f1c2...
    gobus-stops show 68f1c2... --format json

    gobus-stops add 68f1c2... \
        --stop "Majestic@06:30" \
        --stop "Jayanagar@06:55" \
        --stop "Electronic City@07:40"

    gobus-stops delete 68f1c2... 9a3e50...

EXIT CODES:
    0 - Success
    1 - API, storage or configuration error
    2 - Session expired / authentication rejected
    3 - Invalid input
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the schedule for a bus
    Show {
        bus_id: String,
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Create a schedule for a bus from a list of stops
    Add {
        bus_id: String,
        /// Stop specification, NAME@HH:MM (repeatable, in route order)
        #[arg(long = "stop", required = true)]
        stops: Vec<String>,
    },
    /// Delete a schedule from a bus
    Delete {
        bus_id: String,
        schedule_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    libgobus::logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Parses `NAME@HH:MM` into a stop, assigning the given sequence id.
fn parse_stop(spec: &str, index: usize) -> Result<NewScheduleStop> {
    let (name, time) = spec.rsplit_once('@').ok_or_else(|| {
        GobusError::InvalidInput(format!(
            "Stop '{}' is not of the form NAME@HH:MM",
            spec
        ))
    })?;

    if name.trim().is_empty() {
        return Err(GobusError::InvalidInput(format!(
            "Stop '{}' has an empty stand name",
            spec
        )));
    }
    if NaiveTime::parse_from_str(time, "%H:%M").is_err() {
        return Err(GobusError::InvalidInput(format!(
            "Stop '{}' has an invalid time (expected HH:MM)",
            spec
        )));
    }

    Ok(NewScheduleStop {
        id: (index + 1).to_string(),
        stand_name: name.trim().to_string(),
        arrival_time: time.to_string(),
    })
}

async fn run(cli: Cli) -> Result<()> {
    let service = GobusService::new().await?;

    match cli.command {
        Command::Show { bus_id, format } => {
            service.schedules().fetch(&bus_id).await?;
            let schedule = service.schedules().entry(&bus_id).flatten();
            match format.as_str() {
                "json" => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&schedule).unwrap_or_default()
                    );
                }
                _ => match schedule {
                    Some(schedule) => {
                        println!("Schedule {}", schedule.id);
                        for stop in &schedule.stops {
                            println!(
                                "  {}  {}  ({:.1} km, \u{20b9}{:.2})",
                                stop.arrival_time,
                                stop.stand.name,
                                stop.stand.distance,
                                stop.stand.price
                            );
                        }
                    }
                    None => println!("No schedule for bus {}", bus_id),
                },
            }
        }
        Command::Add { bus_id, stops } => {
            if stops.len() < 2 {
                return Err(GobusError::InvalidInput(
                    "A schedule needs at least two stops".to_string(),
                ));
            }
            let stops = stops
                .iter()
                .enumerate()
                .map(|(i, spec)| parse_stop(spec, i))
                .collect::<Result<Vec<_>>>()?;

            let schedule = NewSchedule { bus_id, stops };
            service.schedules().create(&schedule).await?;
            println!("Schedule created");
        }
        Command::Delete {
            bus_id,
            schedule_id,
        } => {
            service
                .schedules()
                .delete_schedule(&bus_id, &schedule_id)
                .await?;
            println!("Schedule deleted");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stop_valid() {
        let stop = parse_stop("Majestic@06:30", 0).unwrap();
        assert_eq!(stop.id, "1");
        assert_eq!(stop.stand_name, "Majestic");
        assert_eq!(stop.arrival_time, "06:30");
    }

    #[test]
    fn test_parse_stop_name_may_contain_at() {
        // rsplit keeps everything before the last '@' as the name
        let stop = parse_stop("Stop@Junction@14:05", 4).unwrap();
        assert_eq!(stop.id, "5");
        assert_eq!(stop.stand_name, "Stop@Junction");
        assert_eq!(stop.arrival_time, "14:05");
    }

    #[test]
    fn test_parse_stop_rejects_missing_time() {
        let err = parse_stop("Majestic", 0).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_parse_stop_rejects_bad_time() {
        assert!(parse_stop("Majestic@6:99", 0).is_err());
        assert!(parse_stop("Majestic@noon", 0).is_err());
    }

    #[test]
    fn test_parse_stop_rejects_empty_name() {
        assert!(parse_stop("@06:30", 0).is_err());
        assert!(parse_stop("   @06:30", 0).is_err());
    }
}
