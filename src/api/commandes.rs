//! Commandes endpoints and their terminal screens

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use super::{screen_error, ApiClient, ApiError};
use crate::auth::Storage;
use crate::models::{filter_by_client, Commande, CommandePayload};

fn commande_path(id: i64) -> String {
    format!("/commandes/{}", id)
}

pub async fn fetch_commandes<S: Storage>(
    api: &mut ApiClient<S>,
) -> Result<Vec<Commande>, ApiError> {
    api.get("/commandes").await
}

pub async fn fetch_commande<S: Storage>(
    api: &mut ApiClient<S>,
    id: i64,
) -> Result<Commande, ApiError> {
    api.get(&commande_path(id)).await
}

pub async fn create_commande<S: Storage>(
    api: &mut ApiClient<S>,
    payload: &CommandePayload,
) -> Result<Commande, ApiError> {
    api.post("/commandes", payload).await
}

pub async fn update_commande<S: Storage>(
    api: &mut ApiClient<S>,
    id: i64,
    payload: &CommandePayload,
) -> Result<Commande, ApiError> {
    api.put(&commande_path(id), payload).await
}

pub async fn delete_commande<S: Storage>(
    api: &mut ApiClient<S>,
    id: i64,
) -> Result<(), ApiError> {
    api.delete(&commande_path(id)).await
}

/// Changes requested on the command line; unset fields stay as they are.
#[derive(Debug, Clone, Default)]
pub struct CommandeChanges {
    pub description: Option<String>,
    pub montant: Option<f64>,
    pub date: Option<NaiveDate>,
    pub client_id: Option<i64>,
}

impl CommandeChanges {
    fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.montant.is_none()
            && self.date.is_none()
            && self.client_id.is_none()
    }

    /// Overlay the changes on the current record.
    fn apply(self, current: &Commande) -> Result<CommandePayload> {
        let client_id = self
            .client_id
            .or_else(|| current.client.as_ref().map(|c| c.id))
            .context("Commande has no client; pass --client")?;
        let date_commande = self
            .date
            .or_else(|| current.date())
            .context("Commande has no readable date; pass --date")?;

        Ok(CommandePayload {
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            montant: self.montant.unwrap_or(current.montant),
            date_commande,
            client_id,
        })
    }
}

fn print_commande_row(c: &Commande) {
    let client = c
        .client
        .as_ref()
        .map(|cl| format!("{} ({})", cl.nom, cl.id))
        .unwrap_or_else(|| "-".to_string());
    let date = c
        .date()
        .map(|d| d.to_string())
        .unwrap_or_else(|| c.date_commande.clone());
    println!(
        "  {:<6} {:<30} {:>10.2} {:<12} {}",
        c.id, c.description, c.montant, date, client
    );
}

/// List commandes, optionally only those of one client.
pub async fn list_commandes<S: Storage>(
    api: &mut ApiClient<S>,
    client_id: Option<i64>,
) -> Result<()> {
    let commandes = fetch_commandes(api)
        .await
        .map_err(|e| screen_error(e, "load commandes"))?;
    let shown = filter_by_client(&commandes, client_id);

    match client_id {
        Some(id) => println!("\nCommandes of client {}:", id),
        None => println!("\nCommandes:"),
    }
    println!("{:-<80}", "");
    println!(
        "  {:<6} {:<30} {:>10} {:<12} {}",
        "ID", "Description", "Montant", "Date", "Client"
    );

    if shown.is_empty() {
        println!("  (no commandes found)");
        return Ok(());
    }

    for c in &shown {
        print_commande_row(c);
    }

    let total: f64 = shown.iter().map(|c| c.montant).sum();
    println!("\n{} commandes, total {:.2}", shown.len(), total);
    Ok(())
}

pub async fn show_commande<S: Storage>(api: &mut ApiClient<S>, id: i64) -> Result<()> {
    let c = fetch_commande(api, id)
        .await
        .map_err(|e| screen_error(e, &format!("load commande {}", id)))?;

    println!();
    println!("ID:          {}", c.id);
    println!("Description: {}", c.description);
    println!("Montant:     {:.2}", c.montant);
    println!("Date:        {}", c.date_commande);
    match &c.client {
        Some(cl) => println!("Client:      {} ({})", cl.nom, cl.id),
        None => println!("Client:      (none)"),
    }
    Ok(())
}

pub async fn add_commande<S: Storage>(api: &mut ApiClient<S>, payload: CommandePayload) -> Result<()> {
    if payload.description.trim().is_empty() {
        bail!("All fields are required: --description cannot be blank.");
    }

    let created = create_commande(api, &payload)
        .await
        .map_err(|e| screen_error(e, "create commande"))?;
    println!("Commande created (id {}).", created.id);
    Ok(())
}

pub async fn edit_commande<S: Storage>(
    api: &mut ApiClient<S>,
    id: i64,
    changes: CommandeChanges,
) -> Result<()> {
    if changes.is_empty() {
        bail!("Nothing to update: pass --description, --montant, --date or --client.");
    }

    let current = fetch_commande(api, id)
        .await
        .map_err(|e| screen_error(e, &format!("load commande {}", id)))?;
    let payload = changes.apply(&current)?;

    update_commande(api, id, &payload)
        .await
        .map_err(|e| screen_error(e, &format!("update commande {}", id)))?;
    println!("Commande {} updated.", id);
    Ok(())
}

pub async fn remove_commande<S: Storage>(api: &mut ApiClient<S>, id: i64) -> Result<()> {
    delete_commande(api, id)
        .await
        .map_err(|e| screen_error(e, &format!("delete commande {}", id)))?;
    println!("Commande {} deleted.", id);
    Ok(())
}
