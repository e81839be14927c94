// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Rendu du convertisseur

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{action_for, Event, EventHandler};
