//! gobus-search - Search bus schedules between stands

use clap::{Parser, Subcommand};
use libgobus::types::RecentSearch;
use libgobus::{GobusError, GobusService, Result};

#[derive(Parser, Debug)]
#[command(name = "gobus-search")]
#[command(version)]
#[command(about = "Search bus schedules between boarding points")]
#[command(long_about = r#"Search bus schedules between boarding points.

EXAMPLES:
    # List the known stands
    gobus-search stands

    # Search by stand name (case-insensitive); the search is remembered
    gobus-search go --from Central --to Airport

    # JSON output for scripting
    gobus-search go --from Central --to Airport --format json
    gobus-search go --from Central --to Airport --format json | jq '.[].bus.name'

    # Recent searches (most recent first, at most five are kept)
    gobus-search recent
    gobus-search clear-recent

EXIT CODES:
    0 - Success (including empty results)
    1 - API, storage or configuration error
    2 - Session expired / authentication rejected
    3 - Invalid input (e.g. unknown stand name)
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
    /// List the boarding-point reference list
    Stands,
    /// Search schedules from one stand to another
    Go {
        /// Origin stand name
        #[arg(long, value_name = "STAND")]
        from: String,

        /// Destination stand name
        #[arg(long, value_name = "STAND")]
        to: String,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Do not record this search in the recent list
        #[arg(long)]
        no_recent: bool,
    },
    /// Show recent searches, most recent first
    Recent {
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Clear the recent-search list
    ClearRecent,
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

async fn run(cli: Cli) -> Result<()> {
    let service = GobusService::new().await?;

    match cli.command {
        Command::Stands => {
            service.search().fetch_stands().await?;
            for stand in service.search().stands() {
                println!("{}\t{}", stand.id, stand.name);
            }
        }
        Command::Go {
            from,
            to,
            format,
            no_recent,
        } => {
            service.search().fetch_stands().await?;

            let origin = service.search().stand_by_name(&from).ok_or_else(|| {
                GobusError::InvalidInput(format!("Unknown stand: '{}'", from))
            })?;
            let destination = service.search().stand_by_name(&to).ok_or_else(|| {
                GobusError::InvalidInput(format!("Unknown stand: '{}'", to))
            })?;
            if origin.id == destination.id {
                return Err(GobusError::InvalidInput(
                    "Origin and destination must differ".to_string(),
                ));
            }

            let hits = service
                .search()
                .search(&origin.id, &destination.id)
                .await?;

            if !no_recent {
                service
                    .search()
                    .add_recent(RecentSearch::new(
                        origin.name.clone(),
                        destination.name.clone(),
                        origin.id.clone(),
                        destination.id.clone(),
                    ))
                    .await?;
            }

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&hits).unwrap_or_default());
                }
                _ => {
                    if hits.is_empty() {
                        println!("No buses found from {} to {}", origin.name, destination.name);
                        return Ok(());
                    }
                    for hit in &hits {
                        let fare = hit
                            .fare()
                            .map(|f| format!("₹{:.2}", f))
                            .unwrap_or_else(|| "-".to_string());
                        println!(
                            "{} | {} → {} | {} | {}",
                            hit.bus.name,
                            hit.source_time.as_deref().unwrap_or("?"),
                            hit.destination_time.as_deref().unwrap_or("?"),
                            hit.duration.as_deref().unwrap_or("?"),
                            fare
                        );
                        for stop in &hit.stops {
                            println!("  {} {}", stop.arrival_time, stop.stand.name);
                        }
                    }
                }
            }
        }
        Command::Recent { format } => {
            let recent = service.search().recent();
            match format.as_str() {
                "json" => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&recent).unwrap_or_default()
                    );
                }
                _ => {
                    for search in recent {
                        println!("{} → {}", search.from, search.to);
                    }
                }
            }
        }
        Command::ClearRecent => {
            service.search().clear_recent().await?;
            println!("Recent searches cleared");
        }
    }

    Ok(())
}
