//! Commande (order) entity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Client;

/// Order placed by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commande {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub montant: f64,
    /// ISO date (or date-time) as sent by the backend
    #[serde(default)]
    pub date_commande: String,
    pub client: Option<Client>,
}

impl Commande {
    /// Calendar date of the order, if the backend value parses.
    pub fn date(&self) -> Option<NaiveDate> {
        let date_part = self.date_commande.get(..10)?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

/// Body for creating or updating a commande
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandePayload {
    pub description: String,
    pub montant: f64,
    #[serde(serialize_with = "serialize_date")]
    pub date_commande: NaiveDate,
    pub client_id: i64,
}

fn serialize_date<S: serde::Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&date.format("%Y-%m-%d").to_string())
}

/// Keep only the commandes of `client_id`; `None` keeps everything.
pub fn filter_by_client(commandes: &[Commande], client_id: Option<i64>) -> Vec<&Commande> {
    match client_id {
        None => commandes.iter().collect(),
        Some(id) => commandes
            .iter()
            .filter(|c| c.client.as_ref().map_or(false, |cl| cl.id == id))
            .collect(),
    }
}
