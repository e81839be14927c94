// ============================================================================
// API Client : ExchangeRate-API
// ============================================================================
// Récupère les taux de change depuis exchangerate-api.com
//
// Endpoint : GET {base_url}/v6/{api_key}/latest/{BASE}
// Réponse  : { "base_code": "USD", "time_last_update_unix": 1700000000,
//              "conversion_rates": { "EUR": 0.9, ... }, ... }
//
// CONCEPTS RUST :
// 1. async/await : l'appel réseau ne bloque pas le thread
// 2. Result + Context : chaque étape ajoute du contexte à l'erreur
// 3. Serde : désérialisation JSON automatique
// ============================================================================

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::models::{Currency, RateSnapshot, RateTable};

// ============================================================================
// Structure pour parser la réponse JSON
// ============================================================================
// Seul conversion_rates est obligatoire. Les autres champs de la réponse
// (result, documentation, terms_of_use, ...) sont ignorés par serde.
// ============================================================================

#[derive(Debug, Deserialize)]
struct LatestResponse {
    base_code: Option<String>,
    time_last_update_unix: Option<i64>,
    conversion_rates: HashMap<String, f64>,
}

/// Client HTTP vers le fournisseur de taux
///
/// CONCEPT RUST : reqwest::Client
/// - Contient un pool de connexions, on le crée une seule fois
/// - Clone est peu coûteux (Arc interne), on peut le partager entre tâches
#[derive(Debug, Clone)]
pub struct ExchangeRateClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ExchangeRateClient {
    /// Crée le client depuis la configuration
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("lazyfx/", env!("CARGO_PKG_VERSION")));

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Construit l'URL de l'endpoint "latest" pour une devise de base
    pub fn latest_url(&self, base: Currency) -> String {
        format!("{}/v6/{}/latest/{}", self.base_url, self.api_key, base.code())
    }

    /// Même URL avec la clé masquée, pour les logs
    fn redacted_url(&self, base: Currency) -> String {
        format!("{}/v6/***/latest/{}", self.base_url, base.code())
    }

    /// Récupère la table des taux pour une devise de base
    ///
    /// Toute erreur (transport, statut HTTP non-2xx, JSON invalide) est
    /// propagée avec son contexte ; l'appelant la réduit au message générique.
    #[instrument(skip(self), fields(base = %base))]
    pub async fn fetch_latest(&self, base: Currency) -> Result<RateSnapshot> {
        debug!(url = %self.redacted_url(base), "Sending HTTP request to rate provider");

        let response = self
            .client
            .get(self.latest_url(base))
            .send()
            .await
            .context("Échec de la requête HTTP vers le fournisseur de taux")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, "Rate provider returned error status");
            anyhow::bail!("Le fournisseur de taux a retourné une erreur : HTTP {}", status);
        }

        let body: LatestResponse = response
            .json()
            .await
            .context("Échec du parsing JSON de la réponse du fournisseur")?;

        // Base inattendue : on le signale, la table est gardée
        if let Some(code) = body.base_code.as_deref() {
            if code != base.code() {
                warn!(requested = %base, received = code, "Rate provider answered for another base currency");
            }
        }

        let snapshot = RateSnapshot {
            last_update: body
                .time_last_update_unix
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            rates: RateTable::from(body.conversion_rates),
        };

        info!(rates = snapshot.rates.len(), "Successfully fetched exchange rates");
        Ok(snapshot)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
// CONCEPT : wiremock
// - Démarre un vrai serveur HTTP local pour chaque test
// - Pas de dépendance au réseau ni à une clé API réelle
// ============================================================================
