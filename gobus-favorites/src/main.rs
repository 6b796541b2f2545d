//! gobus-favorites - Manage your favorite buses

use clap::{Parser, Subcommand};
use libgobus::types::Bus;
use libgobus::{GobusService, Result};

#[derive(Parser, Debug)]
#[command(name = "gobus-favorites")]
#[command(version)]
#[command(about = "List, add and remove favorite buses")]
#[command(long_about = r#"List, add and remove favorite buses.

Requires a logged-in session (see gobus-login). Favorites are stored
server-side and shared across devices.

EXAMPLES:
    gobus-favorites list
    gobus-favorites list --format json

    gobus-favorites add 68f1c2...
    gobus-favorites remove 68f1c2...

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
    /// List favorite buses
    List {
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Add a bus to favorites
    Add {
        bus_id: String,
    },
    /// Remove a bus from favorites
    Remove {
        bus_id: String,
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
    println!(
        "{} | {} | {} | {}",
        id, bus.name, bus.registration_number, bus.bus_type
    );
}

async fn run(cli: Cli) -> Result<()> {
    let service = GobusService::new().await?;

    match cli.command {
        Command::List { format } => {
            let favorites = service.favorites().await?;
            match format.as_str() {
                "json" => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&favorites).unwrap_or_default()
                    );
                }
                _ => {
                    if favorites.is_empty() {
                        println!("No favorite buses");
                    }
                    for bus in &favorites {
                        print_bus(bus);
                    }
                }
            }
        }
        Command::Add { bus_id } => {
            service.add_favorite(&bus_id).await?;
            println!("Added to favorites");
        }
        Command::Remove { bus_id } => {
            service.remove_favorite(&bus_id).await?;
            println!("Removed from favorites");
        }
    }

    Ok(())
}
