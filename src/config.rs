// ============================================================================
// Configuration
// ============================================================================
// Paramètres du convertisseur : clé API, URL du fournisseur, devises par
// défaut, timeout optionnel.
//
// Ordre de chargement :
// 1. Valeurs par défaut (Config::default)
// 2. Fichier YAML (~/.config/lazyfx/config.yaml ou --config)
// 3. Variable d'environnement LAZYFX_API_KEY
// 4. Arguments de la ligne de commande (appliqués dans main.rs)
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::Currency;

/// URL du fournisseur de taux (exchangerate-api.com)
pub const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com";

/// Variable d'environnement qui surcharge la clé API du fichier
pub const API_KEY_ENV: &str = "LAZYFX_API_KEY";

/// Configuration complète de l'application
///
/// CONCEPT RUST : #[serde(default)]
/// - Les champs absents du fichier prennent la valeur de Config::default()
/// - Un fichier ne contenant que "api_key: ..." est donc valide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Clé API, intégrée au chemin de l'URL par le fournisseur
    pub api_key: String,

    /// URL de base du fournisseur (surchargée dans les tests)
    pub base_url: String,

    pub default_base: Currency,
    pub default_target: Currency,
    pub default_amount: f64,

    /// Timeout des requêtes HTTP en secondes (None : pas de timeout)
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_base: Currency::USD,
            default_target: Currency::EUR,
            default_amount: 1.0,
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Chemin par défaut du fichier de configuration
    ///
    /// - Linux : ~/.config/lazyfx/config.yaml
    /// - macOS : ~/Library/Application Support/lazyfx/config.yaml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lazyfx").join("config.yaml"))
    }

    /// Charge la configuration
    ///
    /// - `path` explicite : le fichier doit exister
    /// - sinon : le fichier par défaut est optionnel
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::load_from_path(&default)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Lit et parse un fichier YAML
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire le fichier de config : {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Fichier de config invalide : {}", path.display()))?;

        info!(path = %path.display(), "Configuration chargée");
        Ok(config)
    }

    /// Applique la clé API venant de l'environnement (si non vide)
    pub fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            debug!("API key overridden from environment");
            self.api_key = key.trim().to_string();
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
