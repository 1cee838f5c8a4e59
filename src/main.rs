//! Commandes CLI - terminal client for the clients/commandes API
//!
//! Every command is a screen behind a route guard; the guards decide from
//! the stored access token whether the screen opens or where to go instead.

mod api;
mod app;
mod auth;
mod config;
mod models;
mod routes;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::commandes::CommandeChanges;
use app::{login_target, value_or_prompt, App};
use models::{ClientPayload, CommandePayload};
use routes::Route;

#[derive(Parser)]
#[command(name = "commandes-cli")]
#[command(about = "Terminal client for managing clients and commandes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session tokens
    Login {
        username: String,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// Screen to open after a successful login
        #[arg(long)]
        return_url: Option<String>,
    },

    /// Create a USER account
    Register(AccountArgs),

    /// Log out and clear stored tokens
    Logout,

    /// Show current authentication status
    Status,

    /// Show or change configuration
    Config {
        /// Base URL of the API
        #[arg(long)]
        api_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Manage clients
    #[command(subcommand)]
    Clients(ClientCommands),

    /// Manage commandes
    #[command(subcommand)]
    Commandes(CommandeCommands),

    /// Administration
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Args)]
struct AccountArgs {
    username: String,

    #[arg(short, long)]
    email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(short, long)]
    password: Option<String>,

    /// Password confirmation (prompted when omitted)
    #[arg(long)]
    confirm: Option<String>,
}

#[derive(Subcommand)]
enum ClientCommands {
    /// List clients
    List {
        /// Filter on name or email
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one client
    Show { id: i64 },
    /// Create a client (ADMIN)
    Add {
        #[arg(long)]
        nom: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telephone: Option<String>,
    },
    /// Update a client (ADMIN)
    Edit {
        id: i64,
        #[arg(long)]
        nom: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telephone: Option<String>,
    },
    /// Delete a client
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum CommandeCommands {
    /// List commandes
    List {
        /// Only commandes of this client
        #[arg(short, long)]
        client: Option<i64>,
    },
    /// Show one commande
    Show { id: i64 },
    /// Create a commande (ADMIN)
    Add {
        #[arg(long)]
        description: String,
        #[arg(long)]
        montant: f64,
        /// Order date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        client: i64,
    },
    /// Update a commande (ADMIN)
    Edit {
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        montant: Option<f64>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        client: Option<i64>,
    },
    /// Delete a commande
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create an ADMIN account
    Create(AccountArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut app = App::new()?;

    match cli.command {
        Commands::Login {
            username,
            password,
            return_url,
        } => {
            if !app.enter(&login_target(return_url.as_deref())).await? {
                println!("Already logged in. Use 'logout' to switch accounts.");
                return Ok(());
            }
            let password = value_or_prompt(password, "Password")?;
            tracing::info!("Logging in...");
            auth::login(&mut app.api, &username, &password).await?;
            app.open(return_url.as_deref().unwrap_or(&Route::Clients.path()))
                .await?;
        }
        Commands::Register(args) => {
            if app.enter(&Route::Register.path()).await? {
                let (password, confirm) = passwords(&args)?;
                auth::register(
                    &mut app.api,
                    &args.username,
                    &password,
                    &confirm,
                    args.email.as_deref(),
                )
                .await?;
            }
        }
        Commands::Logout => {
            tracing::info!("Logging out...");
            auth::logout(&mut app.api)?;
        }
        Commands::Status => {
            auth::status(&app.api, &app.config)?;
        }
        Commands::Config { api_url, timeout } => {
            let mut config = app.config.clone();
            if api_url.is_none() && timeout.is_none() {
                println!("api_url:      {}", config.api_url);
                println!("timeout_secs: {}", config.timeout_secs);
                return Ok(());
            }
            if let Some(url) = api_url {
                config.api_url = url;
            }
            if let Some(secs) = timeout {
                config.timeout_secs = secs;
            }
            config.save()?;
            println!("Configuration saved.");
        }
        Commands::Clients(cmd) => run_clients(&mut app, cmd).await?,
        Commands::Commandes(cmd) => run_commandes(&mut app, cmd).await?,
        Commands::Admin(AdminCommands::Create(args)) => {
            if app.enter(&Route::AdminCreate.path()).await? {
                let (password, confirm) = passwords(&args)?;
                auth::create_admin(
                    &mut app.api,
                    &args.username,
                    &password,
                    &confirm,
                    args.email.as_deref(),
                )
                .await?;
            }
        }
    }

    Ok(())
}

fn passwords(args: &AccountArgs) -> Result<(String, String)> {
    let password = value_or_prompt(args.password.clone(), "Password")?;
    let confirm = value_or_prompt(args.confirm.clone(), "Confirm password")?;
    Ok((password, confirm))
}

async fn run_clients(app: &mut App, cmd: ClientCommands) -> Result<()> {
    match cmd {
        ClientCommands::List { search } => {
            let target = match &search {
                Some(term) => format!(
                    "{}?{}",
                    Route::Clients.path(),
                    url::form_urlencoded::Serializer::new(String::new())
                        .append_pair("search", term)
                        .finish()
                ),
                None => Route::Clients.path(),
            };
            if app.enter(&target).await? {
                api::clients::list_clients(&mut app.api, search.as_deref()).await?;
                if app.is_admin() {
                    println!("Admin: 'clients add', 'clients edit <id>' and 'clients delete <id>' are available.");
                }
            }
        }
        ClientCommands::Show { id } => {
            if app.enter(&Route::Clients.path()).await? {
                api::clients::show_client(&mut app.api, id).await?;
            }
        }
        ClientCommands::Add {
            nom,
            email,
            telephone,
        } => {
            if app.enter(&Route::ClientAdd.path()).await? {
                let payload = ClientPayload {
                    nom: Some(nom),
                    email,
                    telephone,
                };
                api::clients::add_client(&mut app.api, payload).await?;
            }
        }
        ClientCommands::Edit {
            id,
            nom,
            email,
            telephone,
        } => {
            if app.enter(&Route::ClientEdit(id).path()).await? {
                let changes = ClientPayload {
                    nom,
                    email,
                    telephone,
                };
                api::clients::edit_client(&mut app.api, id, changes).await?;
            }
        }
        ClientCommands::Delete { id } => {
            if app.enter(&Route::Clients.path()).await? {
                api::clients::remove_client(&mut app.api, id).await?;
            }
        }
    }
    Ok(())
}

async fn run_commandes(app: &mut App, cmd: CommandeCommands) -> Result<()> {
    match cmd {
        CommandeCommands::List { client } => {
            let target = match client {
                Some(id) => format!("{}?clientId={}", Route::Commandes.path(), id),
                None => Route::Commandes.path(),
            };
            if app.enter(&target).await? {
                api::commandes::list_commandes(&mut app.api, client).await?;
            }
        }
        CommandeCommands::Show { id } => {
            if app.enter(&Route::Commandes.path()).await? {
                api::commandes::show_commande(&mut app.api, id).await?;
            }
        }
        CommandeCommands::Add {
            description,
            montant,
            date,
            client,
        } => {
            if app.enter(&Route::CommandeAdd.path()).await? {
                let payload = CommandePayload {
                    description,
                    montant,
                    date_commande: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                    client_id: client,
                };
                api::commandes::add_commande(&mut app.api, payload).await?;
            }
        }
        CommandeCommands::Edit {
            id,
            description,
            montant,
            date,
            client,
        } => {
            if app.enter(&Route::CommandeEdit(id).path()).await? {
                let changes = CommandeChanges {
                    description,
                    montant,
                    date,
                    client_id: client,
                };
                api::commandes::edit_commande(&mut app.api, id, changes).await?;
            }
        }
        CommandeCommands::Delete { id } => {
            if app.enter(&Route::Commandes.path()).await? {
                api::commandes::remove_commande(&mut app.api, id).await?;
            }
        }
    }
    Ok(())
}
