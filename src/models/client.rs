//! Client entity

use serde::{Deserialize, Serialize};

/// Customer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telephone: String,
    /// Number of commandes, when the API includes it
    pub orders_count: Option<u32>,
}

/// Body for creating or updating a client
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
}

impl ClientPayload {
    pub fn is_empty(&self) -> bool {
        self.nom.is_none() && self.email.is_none() && self.telephone.is_none()
    }
}

/// Case-insensitive search on name or email. A blank term keeps everything.
pub fn filter_clients<'a>(clients: &'a [Client], term: &str) -> Vec<&'a Client> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return clients.iter().collect();
    }

    clients
        .iter()
        .filter(|c| c.nom.to_lowercase().contains(&term) || c.email.to_lowercase().contains(&term))
        .collect()
}
