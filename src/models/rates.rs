// ============================================================================
// Structures : RateTable et RateSnapshot
// ============================================================================
// Table des taux de change relative à une devise de base, et conversion
//
// CONCEPTS RUST :
// 1. Newtype pattern : RateTable enveloppe un HashMap pour contrôler l'API
// 2. Fonction pure : convert() ne dépend que de ses arguments
// 3. Formatage : {:.3} arrondit à 3 décimales
// ============================================================================

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::Currency;

/// Taux de change : code devise -> multiplicateur relatif à la devise de base
///
/// La table est toujours remplacée en entier, jamais fusionnée.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Crée une table vide (état au démarrage)
    pub fn new() -> Self {
        Self::default()
    }

    /// Retourne le taux pour une devise, s'il existe
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.rates.get(currency.code()).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

// CONCEPT RUST : From trait
// - Permet de construire une RateTable depuis le HashMap désérialisé
impl From<HashMap<String, f64>> for RateTable {
    fn from(rates: HashMap<String, f64>) -> Self {
        Self { rates }
    }
}

impl<const N: usize> From<[(&str, f64); N]> for RateTable {
    fn from(pairs: [(&str, f64); N]) -> Self {
        Self {
            rates: pairs
                .into_iter()
                .map(|(code, rate)| (code.to_string(), rate))
                .collect(),
        }
    }
}

/// Résultat d'un fetch réussi : la table et ses métadonnées
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    /// Date de dernière mise à jour des taux côté fournisseur
    pub last_update: Option<DateTime<Utc>>,

    /// Les taux eux-mêmes
    pub rates: RateTable,
}

impl RateSnapshot {
    /// Snapshot sans métadonnées
    pub fn from_rates(rates: RateTable) -> Self {
        Self {
            last_update: None,
            rates,
        }
    }
}

/// Convertit un montant vers la devise cible
///
/// - Pas de taux pour la cible : retourne "0" (pas d'erreur)
/// - Sinon : montant * taux, formaté avec exactement 3 décimales
pub fn convert(amount: f64, rates: &RateTable, target: Currency) -> String {
    match rates.rate(target) {
        Some(rate) => format!("{:.3}", amount * rate),
        None => "0".to_string(),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_formats_three_decimals() {
        let rates = RateTable::from([("EUR", 0.9), ("JPY", 149.5)]);

        assert_eq!(convert(10.0, &rates, Currency::EUR), "9.000");
        assert_eq!(convert(2.5, &rates, Currency::JPY), "373.750");
        assert_eq!(convert(0.0, &rates, Currency::EUR), "0.000");
    }

    #[test]
    fn test_convert_missing_target_returns_zero() {
        let rates = RateTable::from([("EUR", 0.9)]);
        assert_eq!(convert(10.0, &rates, Currency::GBP), "0");
        assert_eq!(convert(10.0, &RateTable::new(), Currency::EUR), "0");
    }

    #[test]
    fn test_rate_lookup() {
        let rates = RateTable::from([("CHF", 0.88), ("XAF", 600.0)]);
        assert_eq!(rates.rate(Currency::CHF), Some(0.88));
        assert_eq!(rates.rate(Currency::USD), None);
        assert_eq!(rates.len(), 2);
    }
}
