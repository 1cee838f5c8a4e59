//! Clients endpoints and their terminal screens

use anyhow::{bail, Result};

use super::{screen_error, ApiClient, ApiError};
use crate::auth::Storage;
use crate::models::{filter_clients, Client, ClientPayload};

fn client_path(id: i64) -> String {
    format!("/clients/{}", id)
}

pub async fn fetch_clients<S: Storage>(api: &mut ApiClient<S>) -> Result<Vec<Client>, ApiError> {
    api.get("/clients").await
}

pub async fn fetch_client<S: Storage>(api: &mut ApiClient<S>, id: i64) -> Result<Client, ApiError> {
    api.get(&client_path(id)).await
}

pub async fn create_client<S: Storage>(
    api: &mut ApiClient<S>,
    payload: &ClientPayload,
) -> Result<Client, ApiError> {
    api.post("/clients", payload).await
}

pub async fn update_client<S: Storage>(
    api: &mut ApiClient<S>,
    id: i64,
    payload: &ClientPayload,
) -> Result<Client, ApiError> {
    api.put(&client_path(id), payload).await
}

pub async fn delete_client<S: Storage>(api: &mut ApiClient<S>, id: i64) -> Result<(), ApiError> {
    api.delete(&client_path(id)).await
}

fn print_client_row(c: &Client) {
    let orders = c
        .orders_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:<6} {:<24} {:<30} {:<16} {}",
        c.id, c.nom, c.email, c.telephone, orders
    );
}

/// List clients, optionally narrowed by a name/email search.
pub async fn list_clients<S: Storage>(api: &mut ApiClient<S>, search: Option<&str>) -> Result<()> {
    let clients = fetch_clients(api)
        .await
        .map_err(|e| screen_error(e, "load clients"))?;
    let shown = filter_clients(&clients, search.unwrap_or(""));

    println!("\nClients:");
    println!("{:-<90}", "");
    println!(
        "  {:<6} {:<24} {:<30} {:<16} {}",
        "ID", "Nom", "Email", "Telephone", "Commandes"
    );

    if shown.is_empty() {
        println!("  (no clients found)");
        return Ok(());
    }

    for c in &shown {
        print_client_row(c);
    }
    println!("\n{} of {} clients", shown.len(), clients.len());
    Ok(())
}

pub async fn show_client<S: Storage>(api: &mut ApiClient<S>, id: i64) -> Result<()> {
    let c = fetch_client(api, id)
        .await
        .map_err(|e| screen_error(e, &format!("load client {}", id)))?;

    println!();
    println!("ID:        {}", c.id);
    println!("Nom:       {}", c.nom);
    println!("Email:     {}", c.email);
    println!("Telephone: {}", c.telephone);
    if let Some(n) = c.orders_count {
        println!("Commandes: {}", n);
    }
    Ok(())
}

pub async fn add_client<S: Storage>(api: &mut ApiClient<S>, payload: ClientPayload) -> Result<()> {
    if payload.nom.as_deref().map_or(true, |n| n.trim().is_empty()) {
        bail!("A client needs a name (--nom).");
    }

    let created = create_client(api, &payload)
        .await
        .map_err(|e| screen_error(e, "create client"))?;
    println!("Client created (id {}).", created.id);
    Ok(())
}

/// Update only the given fields, keeping the rest from the current record.
pub async fn edit_client<S: Storage>(
    api: &mut ApiClient<S>,
    id: i64,
    changes: ClientPayload,
) -> Result<()> {
    if changes.is_empty() {
        bail!("Nothing to update: pass --nom, --email or --telephone.");
    }

    let current = fetch_client(api, id)
        .await
        .map_err(|e| screen_error(e, &format!("load client {}", id)))?;

    let payload = ClientPayload {
        nom: changes.nom.or(Some(current.nom)),
        email: changes.email.or(Some(current.email)),
        telephone: changes.telephone.or(Some(current.telephone)),
    };

    update_client(api, id, &payload)
        .await
        .map_err(|e| screen_error(e, &format!("update client {}", id)))?;
    println!("Client {} updated.", id);
    Ok(())
}

pub async fn remove_client<S: Storage>(api: &mut ApiClient<S>, id: i64) -> Result<()> {
    delete_client(api, id)
        .await
        .map_err(|e| screen_error(e, &format!("delete client {}", id)))?;
    println!("Client {} deleted.", id);
    Ok(())
}
