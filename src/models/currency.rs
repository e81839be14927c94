// ============================================================================
// Enum : Currency
// ============================================================================
// Les neuf devises proposées par le convertisseur
//
// CONCEPTS RUST :
// 1. Enum fermé : l'ensemble des devises est connu à la compilation
// 2. Traits standards : Display et FromStr pour convertir vers/depuis texte
// 3. Copy : une devise est une petite valeur, copiée plutôt que partagée
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Devise supportée par le convertisseur
///
/// L'ordre des variants est celui des sélecteurs à l'écran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    AUD,
    CAD,
    JPY,
    CHF,
    CNY,
    INR,
}

/// Liste immuable des devises, dans l'ordre d'affichage
pub const CURRENCIES: [Currency; 9] = [
    Currency::USD,
    Currency::EUR,
    Currency::GBP,
    Currency::AUD,
    Currency::CAD,
    Currency::JPY,
    Currency::CHF,
    Currency::CNY,
    Currency::INR,
];

impl Currency {
    /// Code ISO 4217 de la devise (ex: "USD")
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::AUD => "AUD",
            Currency::CAD => "CAD",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
        }
    }

    /// Retourne toutes les devises supportées
    pub fn all() -> &'static [Currency] {
        &CURRENCIES
    }

    /// Position dans la liste (utilisée par les sélecteurs)
    pub fn index(&self) -> usize {
        CURRENCIES
            .iter()
            .position(|c| c == self)
            .unwrap_or(0)
    }

    /// Retourne la devise suivante (cycle)
    ///
    /// CONCEPT : Arithmétique modulaire
    /// - INR → USD : on reboucle au début de la liste
    pub fn next(&self) -> Currency {
        CURRENCIES[(self.index() + 1) % CURRENCIES.len()]
    }

    /// Retourne la devise précédente (cycle)
    pub fn previous(&self) -> Currency {
        CURRENCIES[(self.index() + CURRENCIES.len() - 1) % CURRENCIES.len()]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Erreur de parsing d'un code devise inconnu
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("devise non supportée : {0} (attendu : USD, EUR, GBP, AUD, CAD, JPY, CHF, CNY, INR)")]
pub struct UnknownCurrency(pub String);

// CONCEPT RUST : FromStr
// - Permet d'écrire "usd".parse::<Currency>()
// - Utilisé par clap et par serde (via try_from)
impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        CURRENCIES
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

impl TryFrom<String> for Currency {
    type Error = UnknownCurrency;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
