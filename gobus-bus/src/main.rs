//! gobus-bus - Manage your registered buses

use clap::{Parser, Subcommand};
use libgobus::types::{Bus, BusPatch};
use libgobus::{GobusError, GobusService, Result};

#[derive(Parser, Debug)]
#[command(name = "gobus-bus")]
#[command(version)]
#[command(about = "List, register, update and delete your buses")]
#[command(long_about = r#"List, register, update and delete your buses.

Requires a logged-in session (see gobus-login). Every successful write
resynchronizes the local snapshot from the server.

EXAMPLES:
    gobus-bus list
    gobus-bus list --format json

    gobus-bus add --name "Morning Express" --registration KA-01-1234 \
        --number 42 --bus-type deluxe --seats 44 --ac

    gobus-bus update 68f1c2... --seats 52 --express
    gobus-bus delete 68f1c2...

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
    /// List your buses
    List {
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Register a new bus
    Add {
        #[arg(long)]
        name: String,
        /// Registration plate number
        #[arg(long)]
        registration: String,
        /// Operator's bus number
        #[arg(long)]
        number: String,
        #[arg(long, default_value = "regular")]
        bus_type: String,
        #[arg(long)]
        seats: u32,
        /// Air-conditioned
        #[arg(long)]
        ac: bool,
        /// Express service (fewer stops)
        #[arg(long)]
        express: bool,
    },
    /// Update fields of an existing bus
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        registration: Option<String>,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        bus_type: Option<String>,
        #[arg(long)]
        seats: Option<u32>,
        #[arg(long)]
        ac: Option<bool>,
        #[arg(long)]
        express: Option<bool>,
    },
    /// Delete a bus (its cached schedule is evicted too)
    Delete {
        id: String,
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

fn print_bus(bus: &Bus) {
    let id = bus.id.as_deref().unwrap_or("-");
    let mut tags = Vec::new();
    if bus.is_ac {
        tags.push("AC");
    }
    if bus.is_express {
        tags.push("express");
    }
    println!(
        "{} | {} | {} | {} | {} seats{}{}",
        id,
        bus.name,
        bus.registration_number,
        bus.bus_type,
        bus.seat_capacity,
        if tags.is_empty() { "" } else { " | " },
        tags.join(", ")
    );
}

async fn run(cli: Cli) -> Result<()> {
    let service = GobusService::new().await?;

    match cli.command {
        Command::List { format } => {
            service.buses().fetch().await?;
            let buses = service.buses().my_buses().unwrap_or_default();
            match format.as_str() {
                "json" => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&buses).unwrap_or_default()
                    );
                }
                _ => {
                    if buses.is_empty() {
                        println!("No buses registered");
                    }
                    for bus in &buses {
                        print_bus(bus);
                    }
                }
            }
        }
        Command::Add {
            name,
            registration,
            number,
            bus_type,
            seats,
            ac,
            express,
        } => {
            if name.trim().is_empty() {
                return Err(GobusError::InvalidInput("Bus name is required".to_string()));
            }
            if registration.trim().is_empty() {
                return Err(GobusError::InvalidInput(
                    "Registration number is required".to_string(),
                ));
            }
            if seats == 0 {
                return Err(GobusError::InvalidInput(
                    "Seat capacity must be greater than zero".to_string(),
                ));
            }

            let bus = Bus {
                id: None,
                name,
                registration_number: registration,
                bus_number: number,
                bus_type: bus_type.to_lowercase(),
                seat_capacity: seats,
                is_ac: ac,
                is_express: express,
                owner: None,
            };
            service.buses().add(&bus).await?;
            println!("Bus registered");
        }
        Command::Update {
            id,
            name,
            registration,
            number,
            bus_type,
            seats,
            ac,
            express,
        } => {
            let patch = BusPatch {
                name,
                registration_number: registration,
                bus_number: number,
                bus_type: bus_type.map(|t| t.to_lowercase()),
                seat_capacity: seats,
                is_ac: ac,
                is_express: express,
            };
            service.buses().update(&id, &patch).await?;
            println!("Bus updated");
        }
        Command::Delete { id } => {
            service.buses().delete(&id).await?;
            println!("Bus deleted");
        }
    }

    Ok(())
}
