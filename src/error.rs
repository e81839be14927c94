// ============================================================================
// Erreurs affichées à l'utilisateur
// ============================================================================
// Seules deux erreurs sont visibles dans le bandeau. Le détail technique
// (timeout, DNS, JSON invalide, HTTP 4xx/5xx) part dans les logs.
//
// CONCEPT RUST : thiserror
// - #[error("...")] génère l'implémentation de Display
// - Le texte est exactement celui du bandeau
// ============================================================================

use thiserror::Error;

/// Erreur visible dans le bandeau de l'interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Devise de base et devise cible identiques (aucun appel réseau)
    #[error("Base and target currencies must be different.")]
    SameCurrency,

    /// Échec du fetch, quelle que soit la cause
    #[error("Failed to fetch exchange rates. Please try again.")]
    FetchFailed,
}
