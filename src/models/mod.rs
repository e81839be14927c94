// ============================================================================
// Module : models
// ============================================================================
// Ce module contient les structures de données du convertisseur
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod currency; // Devises supportées (fichier currency.rs)
pub mod rates;    // Table des taux et conversion (fichier rates.rs)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazyfx::models::currency::Currency;
// On peut faire : use lazyfx::models::Currency;
pub use currency::{Currency, UnknownCurrency, CURRENCIES};
pub use rates::{convert, RateSnapshot, RateTable};
