//! gobus-login - Manage the GoBus session (OTP login, profile, logout)

use clap::{Parser, Subcommand};
use libgobus::service::LoginOutcome;
use libgobus::types::{Role, UserProfile};
use libgobus::{GobusService, Result};

#[derive(Parser, Debug)]
#[command(name = "gobus-login")]
#[command(version)]
#[command(about = "Log in to GoBus via email OTP and manage the local session")]
#[command(long_about = r#"Log in to GoBus via email OTP and manage the local session.

EXAMPLES:
    # Request an OTP
    gobus-login request asha@example.com

    # Verify the OTP you received
    gobus-login verify 123456

    # First-time users complete their profile after verifying
    gobus-login register --name "Asha" --email asha@example.com \
        --phone 9999999999 --role passenger

    # Inspect and end the session
    gobus-login whoami
    gobus-login whoami --format json
    gobus-login logout

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
    /// Request an OTP for the given email address
    Request {
        email: String,
    },
    /// Verify an OTP and establish the session
    Verify {
        otp: u32,
    },
    /// Complete a first-time registration
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "passenger")]
        role: Role,
        #[arg(long)]
        address: Option<String>,
    },
    /// Show the current session
    Whoami {
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// End the session, clearing user and token
    Logout,
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
        Command::Request { email } => {
            service.request_otp(&email).await?;
            println!("OTP sent to {}", email.trim());
        }
        Command::Verify { otp } => match service.verify_otp(otp).await? {
            LoginOutcome::Existing(user) => {
                println!("Logged in as {}", user.name);
            }
            LoginOutcome::NeedsProfile => {
                println!("OTP accepted. Complete your profile with: gobus-login register");
            }
        },
        Command::Register {
            name,
            email,
            phone,
            role,
            address,
        } => {
            let profile = UserProfile {
                name,
                email,
                phone,
                role,
                address,
            };
            let user = service.complete_profile(&profile).await?;
            println!("Welcome {}! You are registered as a {}.", user.name, role);
        }
        Command::Whoami { format } => {
            let session = service.session().snapshot();
            match format.as_str() {
                "json" => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&session)
                            .unwrap_or_else(|_| "{}".to_string())
                    );
                }
                _ => match session.user {
                    Some(user) if session.is_logged_in => {
                        println!("{} <{}>", user.name, user.email);
                        if let Some(role) = user.role {
                            println!("role: {}", role);
                        }
                    }
                    _ => println!("Not logged in"),
                },
            }
        }
        Command::Logout => {
            service.logout().await?;
            println!("Logged out");
        }
    }

    Ok(())
}
