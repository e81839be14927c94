// ============================================================================
// Module : api
// ============================================================================
// Client HTTP du fournisseur de taux de change
// ============================================================================

pub mod exchangerate; // Client ExchangeRate-API

// Re-export du client
pub use exchangerate::ExchangeRateClient;
