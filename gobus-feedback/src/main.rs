//! gobus-feedback - Send feedback to the GoBus team

use clap::Parser;
use libgobus::{GobusService, Result};

#[derive(Parser, Debug)]
#[command(name = "gobus-feedback")]
#[command(version)]
#[command(about = "Send feedback to the GoBus team")]
#[command(long_about = r#"Send feedback to the GoBus team.

Requires a logged-in session (see gobus-login). The message is delivered
to the support inbox under your account's name and email.

EXAMPLES:
    gobus-feedback "The 6:30 express was marked AC but wasn't"
    echo "Schedule search is great" | gobus-feedback

EXIT CODES:
    0 - Success
    1 - API, storage or configuration error
    2 - Session expired / authentication rejected
    3 - Invalid input (empty message)
"#)]
struct Cli {
    /// Feedback message (reads from stdin if not provided)
    message: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
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
    let message = match cli.message {
        Some(message) => message,
        None => {
            use std::io::Read;
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let service = GobusService::new().await?;
    service.send_feedback(&message).await?;
    println!("Feedback sent");

    Ok(())
}
