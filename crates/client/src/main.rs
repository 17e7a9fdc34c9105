//! StockPanel console - drive the admin console core from a terminal.
//!
//! Every command restores the persisted session first, exactly as the UI does
//! on startup, and prints JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stockpanel_client::{AppState, ClientConfig, Navigator, reads};

#[derive(Parser)]
#[command(name = "stockpanel")]
#[command(about = "Session and access control for the StockPanel inventory console")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides STOCKPANEL_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session database path (overrides STOCKPANEL_STATE_DB)
    #[arg(long, global = true)]
    state_db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        #[arg(short, long)]
        email: String,

        /// Password (falls back to STOCKPANEL_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Clear the persisted session
    Logout,

    /// Show the current session
    Whoami,

    /// List the navigation entries visible to the current session
    Nav,

    /// Run the route guard for a location
    Open {
        /// Location such as /users or /orders?page=2
        path: String,
    },

    /// Fetch dashboard statistics (zeros when unavailable)
    Stats,

    /// Change the password of the logged-in user
    ChangePassword {
        #[arg(long)]
        old: String,

        #[arg(long)]
        new: String,
    },
}

#[derive(Serialize)]
struct Whoami<'a> {
    authenticated: bool,
    user: Option<&'a stockpanel_auth::User>,
    full_name: Option<String>,
    role: Option<&'static str>,
}

#[derive(Serialize)]
struct Opened<'a> {
    decision: &'a stockpanel_auth::GuardDecision,
    location: stockpanel_client::Location,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockpanel_observability::init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config = ClientConfig {
            api_url: ClientConfig::new(api_url)?.api_url,
            ..config
        };
    }
    if let Some(state_db) = cli.state_db {
        config.state_db = Some(state_db);
    }

    let app = AppState::open(config).await?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => std::env::var("STOCKPANEL_PASSWORD")
                    .context("no --password given and STOCKPANEL_PASSWORD is unset")?,
            };
            let user = app.login(&email, &password).await?;
            print_json(&serde_json::json!({
                "user": user,
                "location": app.history.current(),
            }))?;
        }
        Commands::Logout => {
            app.logout().await?;
            print_json(&serde_json::json!({ "authenticated": false }))?;
        }
        Commands::Whoami => {
            let snapshot = app.session.snapshot();
            let user = snapshot.user.as_ref().filter(|_| snapshot.is_authenticated());
            print_json(&Whoami {
                authenticated: snapshot.is_authenticated(),
                user,
                full_name: user.map(|u| u.full_name()),
                role: snapshot.role().map(|r| r.display_key()),
            })?;
        }
        Commands::Nav => {
            print_json(&app.visible_navigation())?;
        }
        Commands::Open { path } => {
            let decision = app.open_location(&path).await;
            print_json(&Opened {
                decision: &decision,
                location: app.history.current(),
            })?;
        }
        Commands::Stats => {
            let stats = reads::dashboard_stats_or_default(&app.api).await;
            print_json(&stats)?;
        }
        Commands::ChangePassword { old, new } => {
            app.api.change_password(&old, &new).await?;
            print_json(&serde_json::json!({ "changed": true }))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
