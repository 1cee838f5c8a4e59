//! Screen dispatch: guarded navigation in front of every command

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};

use crate::api::{clients, commandes, ApiClient};
use crate::auth::guards::{Navigation, DEFAULT_LANDING, LOGIN_PATH, RETURN_URL_PARAM};
use crate::auth::session::now_secs;
use crate::auth::{FileStorage, Session};
use crate::config::Config;
use crate::routes::{self, Arrival, Route};

pub struct App {
    pub config: Config,
    pub api: ApiClient<FileStorage>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        let store = Config::open_token_store()?;
        let api = ApiClient::new(&config, store)?;
        Ok(Self { config, api })
    }

    /// Run the guards for `target`. `true` when the requested screen may open;
    /// otherwise the redirect has already been followed.
    pub async fn enter(&mut self, target: &str) -> Result<bool> {
        let arrival = routes::navigate(self.api.store_mut(), target, now_secs())?;
        if !arrival.redirected() {
            return Ok(true);
        }

        tracing::debug!("{} -> {}", target, arrival.nav.url());
        self.display(&arrival).await?;
        Ok(false)
    }

    /// Navigate to `target` and render whatever screen it lands on.
    pub async fn open(&mut self, target: &str) -> Result<()> {
        let arrival = routes::navigate(self.api.store_mut(), target, now_secs())?;
        self.display(&arrival).await
    }

    /// Render a screen that needs no further input.
    async fn display(&mut self, arrival: &Arrival) -> Result<()> {
        match arrival.route {
            Route::Login => {
                let return_url = arrival
                    .nav
                    .query_param(RETURN_URL_PARAM)
                    .unwrap_or(DEFAULT_LANDING);
                bail!(
                    "Login required. Run 'commandes-cli login <username> --return-url {}'.",
                    return_url
                )
            }
            Route::Clients => {
                if arrival.redirected() {
                    println!("Showing {} instead.", arrival.route);
                }
                let search = arrival.nav.query_param("search");
                clients::list_clients(&mut self.api, search).await
            }
            Route::Commandes => {
                if arrival.redirected() {
                    println!("Showing {} instead.", arrival.route);
                }
                let client_id = arrival
                    .nav
                    .query_param("clientId")
                    .and_then(|id| id.parse().ok());
                commandes::list_commandes(&mut self.api, client_id).await
            }
            other => {
                println!("Ready for {}.", other);
                Ok(())
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        Session::new(self.api.store()).is_admin()
    }
}

/// `/login` carrying an optional return target.
pub fn login_target(return_url: Option<&str>) -> String {
    match return_url {
        Some(url) => Navigation {
            path: LOGIN_PATH.to_string(),
            query: vec![(RETURN_URL_PARAM.to_string(), url.to_string())],
        }
        .url(),
        None => LOGIN_PATH.to_string(),
    }
}

/// Read one line from stdin after printing `label`.
pub fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Use the value given on the command line, or ask for it.
pub fn value_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}
