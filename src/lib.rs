// ============================================================================
// LazyFx - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;    // Client du fournisseur de taux
pub mod app;    // État de l'application
pub mod config; // Configuration (YAML + environnement)
pub mod error;  // Erreurs affichées à l'utilisateur
pub mod models; // Devises, table des taux, conversion
pub mod ui;     // Interface utilisateur
