// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état du convertisseur de devises
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Séquencement : chaque fetch reçoit un identifiant croissant
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Le rendu lit depuis App
// - Toutes les modifications passent par les méthodes de App
// - App n'est modifiée que par la boucle d'événements (un seul thread)
// ============================================================================

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::ConversionError;
use crate::models::{convert, Currency, RateSnapshot, RateTable};

/// Pas d'incrément du montant avec +/-
pub const AMOUNT_STEP: f64 = 0.01;

// ============================================================================
// Enum : Field
// ============================================================================
// Le champ du formulaire qui a le focus clavier
// ============================================================================

/// Champ actif du formulaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Sélecteur de la devise de base
    Base,

    /// Sélecteur de la devise cible
    Target,

    /// Saisie du montant
    Amount,
}

impl Field {
    /// Champ suivant (Tab) : Base → Target → Amount → Base
    pub fn next(&self) -> Field {
        match self {
            Field::Base => Field::Target,
            Field::Target => Field::Amount,
            Field::Amount => Field::Base,
        }
    }

    /// Champ précédent (Shift-Tab)
    pub fn previous(&self) -> Field {
        match self {
            Field::Base => Field::Amount,
            Field::Target => Field::Base,
            Field::Amount => Field::Target,
        }
    }
}

// ============================================================================
// Enum Action
// ============================================================================
// CONCEPT : Séparer "quelle touche" de "que faire"
// - ui::events traduit les touches en Actions selon le champ actif
// - App::handle_action applique l'Action et dit s'il faut lancer un fetch
// ============================================================================

/// Action demandée par l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// 'q' (two-step) : demande ou confirme la sortie
    Quit,

    /// Ctrl-C : sortie immédiate
    ForceQuit,

    FocusNext,
    FocusPrevious,

    NextCurrency,
    PreviousCurrency,

    /// 's' : inverse base et cible
    SwapCurrencies,

    /// Caractère saisi dans le montant
    AmountChar(char),
    AmountBackspace,

    /// '+' / '-' : pas de 0.01
    StepAmount(i32),

    /// Toute autre touche
    Other,
}

/// Demande de fetch émise par begin_fetch()
///
/// CONCEPT : Request sequencing
/// - `id` est strictement croissant
/// - Seul le résultat portant le dernier id émis est appliqué
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: u64,
    pub base: Currency,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' => true
    pub confirm_quit: bool,

    /// Champ qui reçoit les touches
    pub focus: Field,

    pub base_currency: Currency,
    pub target_currency: Currency,

    /// Texte saisi pour le montant (ex: "12.5")
    /// CONCEPT : on garde le texte brut pour pouvoir afficher "12." pendant la saisie
    pub amount_input: String,

    /// Dernière table de taux reçue (vide au démarrage)
    pub rates: RateTable,

    /// Date de mise à jour annoncée par le fournisseur
    pub rates_updated: Option<DateTime<Utc>>,

    /// Erreur affichée dans le bandeau
    pub error: Option<ConversionError>,

    /// Un fetch est en cours
    pub is_loading: bool,

    /// Identifiant du dernier fetch émis
    latest_request: u64,
}

impl App {
    /// Crée l'état initial à partir des sélections par défaut
    pub fn new(base: Currency, target: Currency, amount: f64) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            focus: Field::Base,
            base_currency: base,
            target_currency: target,
            amount_input: amount.max(0.0).to_string(),
            rates: RateTable::new(),
            rates_updated: None,
            error: None,
            is_loading: false,
            latest_request: 0,
        }
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit (n'importe quelle autre touche)
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Dispatch des actions
    // ========================================================================

    /// Applique une action utilisateur sur l'état
    ///
    /// Retourne la requête à envoyer au worker quand base ou cible a changé.
    /// Les actions sur le montant ne retournent jamais de requête : le
    /// résultat est recalculé au prochain rendu depuis la table existante.
    pub fn handle_action(&mut self, action: Action) -> Option<FetchRequest> {
        if action != Action::Quit {
            self.cancel_quit();
        }

        let selection_changed = match action {
            Action::Quit => {
                // Two-step : première pression demande, deuxième confirme
                if self.is_awaiting_quit_confirmation() {
                    info!("User confirmed quit");
                    self.quit();
                } else {
                    info!("User requested quit (awaiting confirmation)");
                    self.request_quit();
                }
                false
            }
            Action::ForceQuit => {
                info!("User forced quit");
                self.quit();
                false
            }
            Action::FocusNext => {
                self.focus_next();
                false
            }
            Action::FocusPrevious => {
                self.focus_previous();
                false
            }
            Action::NextCurrency => self.select_next_currency(),
            Action::PreviousCurrency => self.select_previous_currency(),
            Action::SwapCurrencies => self.swap_currencies(),
            Action::AmountChar(c) => {
                self.push_amount_char(c);
                false
            }
            Action::AmountBackspace => {
                self.amount_backspace();
                false
            }
            Action::StepAmount(steps) => {
                self.step_amount(steps);
                false
            }
            Action::Other => false,
        };

        if !selection_changed {
            return None;
        }

        info!(base = %self.base_currency, target = %self.target_currency, "Currency selection changed");
        self.begin_fetch()
    }

    // ========================================================================
    // Focus
    // ========================================================================

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    // ========================================================================
    // Sélection des devises
    // ========================================================================
    // Chaque méthode retourne true si la sélection a changé : l'appelant
    // doit alors lancer un nouveau fetch (begin_fetch).
    // ========================================================================

    /// Change la devise de base
    pub fn set_base(&mut self, currency: Currency) -> bool {
        let changed = self.base_currency != currency;
        self.base_currency = currency;
        changed
    }

    /// Change la devise cible
    pub fn set_target(&mut self, currency: Currency) -> bool {
        let changed = self.target_currency != currency;
        self.target_currency = currency;
        changed
    }

    /// Devise suivante sur le sélecteur actif (sans effet sur le montant)
    pub fn select_next_currency(&mut self) -> bool {
        match self.focus {
            Field::Base => self.set_base(self.base_currency.next()),
            Field::Target => self.set_target(self.target_currency.next()),
            Field::Amount => false,
        }
    }

    /// Devise précédente sur le sélecteur actif
    pub fn select_previous_currency(&mut self) -> bool {
        match self.focus {
            Field::Base => self.set_base(self.base_currency.previous()),
            Field::Target => self.set_target(self.target_currency.previous()),
            Field::Amount => false,
        }
    }

    /// Inverse base et cible
    pub fn swap_currencies(&mut self) -> bool {
        std::mem::swap(&mut self.base_currency, &mut self.target_currency);
        self.base_currency != self.target_currency
    }

    // ========================================================================
    // Saisie du montant
    // ========================================================================
    // Modifier le montant ne déclenche jamais de fetch : le résultat est
    // recalculé au prochain rendu depuis la table existante.
    // ========================================================================

    /// Montant courant (saisie vide ou invalide => 0)
    pub fn amount(&self) -> f64 {
        self.amount_input
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.max(0.0))
            .unwrap_or(0.0)
    }

    /// Ajoute un caractère à la saisie (chiffres et un seul point)
    pub fn push_amount_char(&mut self, c: char) {
        match c {
            '0'..='9' => {
                // "0" suivi d'un chiffre : on remplace plutôt que d'écrire "07"
                if self.amount_input == "0" {
                    self.amount_input.clear();
                }
                self.amount_input.push(c);
            }
            '.' | ',' if !self.amount_input.contains('.') => {
                if self.amount_input.is_empty() {
                    self.amount_input.push('0');
                }
                self.amount_input.push('.');
            }
            _ => {}
        }
    }

    /// Supprime le dernier caractère de la saisie
    pub fn amount_backspace(&mut self) {
        self.amount_input.pop();
    }

    /// Incrémente/décrémente le montant d'un pas (jamais en dessous de 0)
    ///
    /// La précision saisie est conservée : 0.004 + 0.01 => "0.014"
    pub fn step_amount(&mut self, steps: i32) {
        let decimals = fraction_digits(&self.amount_input).max(2);
        let value = (self.amount() + AMOUNT_STEP * steps as f64).max(0.0);
        self.amount_input = format_amount(value, decimals);
    }

    // ========================================================================
    // Fetch des taux
    // ========================================================================

    /// Démarre une tentative de fetch
    ///
    /// - Efface l'erreur précédente
    /// - Invalide tout fetch encore en vol (nouvel id)
    /// - base == cible : erreur, pas de requête, taux inchangés
    /// - sinon : is_loading = true et retourne la requête à envoyer
    pub fn begin_fetch(&mut self) -> Option<FetchRequest> {
        self.error = None;
        self.latest_request += 1;

        if self.base_currency == self.target_currency {
            info!(currency = %self.base_currency, "Same base and target currency, skipping fetch");
            self.error = Some(ConversionError::SameCurrency);
            self.is_loading = false;
            return None;
        }

        self.is_loading = true;
        let request = FetchRequest {
            id: self.latest_request,
            base: self.base_currency,
        };
        debug!(?request, "Fetch started");
        Some(request)
    }

    /// Applique le résultat d'un fetch
    ///
    /// Retourne false si le résultat est périmé (un fetch plus récent a été
    /// émis entre-temps) : dans ce cas l'état n'est pas modifié.
    pub fn apply_fetch_result(
        &mut self,
        request_id: u64,
        result: Result<RateSnapshot, String>,
    ) -> bool {
        if request_id != self.latest_request {
            warn!(
                request_id,
                latest = self.latest_request,
                "Ignoring superseded fetch result"
            );
            return false;
        }

        self.is_loading = false;
        match result {
            Ok(snapshot) => {
                info!(request_id, rates = snapshot.rates.len(), "Applying new rate table");
                self.rates = snapshot.rates;
                self.rates_updated = snapshot.last_update;
                self.error = None;
            }
            Err(reason) => {
                warn!(request_id, %reason, "Fetch failed, keeping previous rates");
                self.error = Some(ConversionError::FetchFailed);
            }
        }
        true
    }

    /// Identifiant du dernier fetch émis
    pub fn latest_request_id(&self) -> u64 {
        self.latest_request
    }

    // ========================================================================
    // Valeurs dérivées (recalculées à chaque rendu)
    // ========================================================================

    /// Texte du bandeau d'erreur
    pub fn error_message(&self) -> Option<String> {
        self.error.map(|e| e.to_string())
    }

    /// Montant converti, formaté (ex: "9.000", ou "0" sans taux)
    pub fn converted(&self) -> String {
        convert(self.amount(), &self.rates, self.target_currency)
    }

    /// Résultat avec la devise cible (ex: "9.000 EUR")
    pub fn converted_display(&self) -> String {
        format!("{} {}", self.converted(), self.target_currency)
    }

    /// Montant converti avec la devise de base (ex: "10 USD")
    ///
    /// Même précision que la saisie : le montant affiché est celui converti.
    pub fn amount_display(&self) -> String {
        format!(
            "{} {}",
            format_amount(self.amount(), fraction_digits(&self.amount_input)),
            self.base_currency
        )
    }
}

impl Default for App {
    /// USD → EUR, montant 1
    fn default() -> Self {
        Self::new(Currency::USD, Currency::EUR, 1.0)
    }
}

/// Nombre de chiffres après le point dans une saisie ("12.345" => 3)
fn fraction_digits(input: &str) -> usize {
    input.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
}

/// Formate un montant sans zéros inutiles (1.50 => "1.5", 2.00 => "2")
pub fn format_amount(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, f64)]) -> RateSnapshot {
        let rates: std::collections::HashMap<String, f64> =
            pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect();
        RateSnapshot::from_rates(RateTable::from(rates))
    }

    #[test]
    fn test_app_creation() {
        let app = App::default();
        assert!(app.is_running());
        assert_eq!(app.base_currency, Currency::USD);
        assert_eq!(app.target_currency, Currency::EUR);
        assert_eq!(app.amount(), 1.0);
        assert!(app.rates.is_empty());
        assert!(!app.is_loading);
        assert_eq!(app.error, None);
    }

    #[test]
    fn test_same_currency_skips_fetch() {
        let mut app = App::new(Currency::USD, Currency::EUR, 10.0);
        let request = app.begin_fetch().unwrap();
        app.apply_fetch_result(request.id, Ok(snapshot(&[("EUR", 0.9)])));

        app.set_target(Currency::USD);
        assert!(app.begin_fetch().is_none());
        assert_eq!(
            app.error_message().as_deref(),
            Some("Base and target currencies must be different.")
        );
        assert!(!app.is_loading);
        // Les taux restent ceux du fetch précédent
        assert_eq!(app.rates.rate(Currency::EUR), Some(0.9));
    }

    #[test]
    fn test_successful_fetch_updates_result() {
        let mut app = App::new(Currency::USD, Currency::EUR, 10.0);
        let request = app.begin_fetch().unwrap();
        assert!(app.is_loading);
        assert_eq!(request.base, Currency::USD);

        assert!(app.apply_fetch_result(request.id, Ok(snapshot(&[("EUR", 0.9)]))));
        assert!(!app.is_loading);
        assert_eq!(app.converted_display(), "9.000 EUR");
        assert_eq!(app.amount_display(), "10 USD");
    }

    #[test]
    fn test_failed_fetch_keeps_previous_rates() {
        let mut app = App::default();
        let first = app.begin_fetch().unwrap();
        app.apply_fetch_result(first.id, Ok(snapshot(&[("EUR", 0.9)])));

        app.set_base(Currency::GBP);
        let second = app.begin_fetch().unwrap();
        app.apply_fetch_result(second.id, Err("HTTP 500".to_string()));

        assert!(!app.is_loading);
        assert_eq!(
            app.error_message().as_deref(),
            Some("Failed to fetch exchange rates. Please try again.")
        );
        assert_eq!(app.rates.rate(Currency::EUR), Some(0.9));
    }

    #[test]
    fn test_new_fetch_clears_error() {
        let mut app = App::default();
        let request = app.begin_fetch().unwrap();
        app.apply_fetch_result(request.id, Err("boom".to_string()));
        assert!(app.error.is_some());

        app.set_target(Currency::JPY);
        app.begin_fetch();
        assert_eq!(app.error, None);
        assert!(app.is_loading);
    }

    #[test]
    fn test_superseded_result_is_ignored() {
        let mut app = App::default();
        let old = app.begin_fetch().unwrap();

        app.set_base(Currency::GBP);
        let new = app.begin_fetch().unwrap();
        assert!(new.id > old.id);

        // La nouvelle réponse arrive d'abord, l'ancienne ensuite
        assert!(app.apply_fetch_result(new.id, Ok(snapshot(&[("EUR", 1.15)]))));
        assert!(!app.apply_fetch_result(old.id, Ok(snapshot(&[("EUR", 0.9)]))));

        assert_eq!(app.rates.rate(Currency::EUR), Some(1.15));
        assert!(!app.is_loading);
    }

    #[test]
    fn test_stale_result_does_not_clear_loading() {
        let mut app = App::default();
        let old = app.begin_fetch().unwrap();
        app.set_target(Currency::CHF);
        app.begin_fetch().unwrap();

        app.apply_fetch_result(old.id, Err("late".to_string()));
        assert!(app.is_loading);
        assert_eq!(app.error, None);
    }

    #[test]
    fn test_amount_change_does_not_need_fetch() {
        let mut app = App::new(Currency::USD, Currency::EUR, 10.0);
        let request = app.begin_fetch().unwrap();
        app.apply_fetch_result(request.id, Ok(snapshot(&[("EUR", 0.9)])));
        let id = app.latest_request_id();

        app.focus = Field::Amount;
        app.push_amount_char('0');
        assert!(!app.select_next_currency());
        assert_eq!(app.latest_request_id(), id);
        assert_eq!(app.converted_display(), "90.000 EUR");
    }

    #[test]
    fn test_missing_target_rate_shows_zero() {
        let mut app = App::default();
        let request = app.begin_fetch().unwrap();
        app.apply_fetch_result(request.id, Ok(snapshot(&[("GBP", 0.8)])));
        assert_eq!(app.converted_display(), "0 EUR");
    }

    #[test]
    fn test_amount_input() {
        let mut app = App::default();
        app.amount_input.clear();
        assert_eq!(app.amount(), 0.0);

        app.push_amount_char('.');
        app.push_amount_char('5');
        app.push_amount_char('.');
        app.push_amount_char('x');
        assert_eq!(app.amount_input, "0.5");

        app.amount_backspace();
        assert_eq!(app.amount_input, "0.");
        assert_eq!(app.amount(), 0.0);

        app.amount_input = "0".to_string();
        app.push_amount_char('7');
        assert_eq!(app.amount_input, "7");
    }

    #[test]
    fn test_step_amount_never_negative() {
        let mut app = App::new(Currency::USD, Currency::EUR, 0.01);
        app.step_amount(1);
        assert_eq!(app.amount_input, "0.02");
        app.step_amount(-5);
        assert_eq!(app.amount_input, "0");
        assert_eq!(app.amount(), 0.0);
    }

    #[test]
    fn test_selection_changes() {
        let mut app = App::default();
        assert!(app.select_next_currency());
        assert_eq!(app.base_currency, Currency::EUR);

        app.focus_next();
        assert_eq!(app.focus, Field::Target);
        assert!(app.select_previous_currency());
        assert_eq!(app.target_currency, Currency::USD);

        assert!(!app.set_target(Currency::USD));
        assert!(app.swap_currencies());
        assert_eq!(app.base_currency, Currency::USD);
        assert_eq!(app.target_currency, Currency::EUR);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(10.0, 2), "10");
        assert_eq!(format_amount(1.5, 2), "1.5");
        assert_eq!(format_amount(0.0, 2), "0");
        assert_eq!(format_amount(1.239, 2), "1.24");
        assert_eq!(format_amount(100.0, 0), "100");
        assert_eq!(fraction_digits("0.004"), 3);
        assert_eq!(fraction_digits("12"), 0);
    }

    #[test]
    fn test_amount_display_keeps_typed_precision() {
        let mut app = App::default();
        let request = app.begin_fetch().unwrap();
        app.apply_fetch_result(request.id, Ok(snapshot(&[("EUR", 1.0)])));

        app.amount_input.clear();
        for c in ".004".chars() {
            app.push_amount_char(c);
        }
        assert_eq!(app.amount_input, "0.004");
        assert_eq!(app.amount_display(), "0.004 USD");
        assert_eq!(app.converted_display(), "0.004 EUR");

        // Le pas de 0.01 ne tronque pas la saisie
        app.step_amount(1);
        assert_eq!(app.amount_input, "0.014");
        assert_eq!(app.amount_display(), "0.014 USD");
    }

    #[test]
    fn test_amount_actions_never_fetch() {
        let mut app = App::default();
        app.begin_fetch().unwrap();
        let id = app.latest_request_id();
        app.focus = Field::Amount;

        assert_eq!(app.handle_action(Action::AmountChar('5')), None);
        assert_eq!(app.handle_action(Action::StepAmount(1)), None);
        assert_eq!(app.handle_action(Action::StepAmount(-1)), None);
        assert_eq!(app.handle_action(Action::AmountBackspace), None);
        // Flèches sur le champ montant : pas de changement de devise
        assert_eq!(app.handle_action(Action::NextCurrency), None);
        assert_eq!(app.latest_request_id(), id);
        assert_eq!(app.amount_input, "1");
    }

    #[test]
    fn test_currency_actions_fetch() {
        let mut app = App::new(Currency::USD, Currency::JPY, 1.0);

        let request = app.handle_action(Action::NextCurrency).unwrap();
        assert_eq!(request.base, Currency::EUR);
        assert_eq!(app.base_currency, Currency::EUR);

        app.handle_action(Action::FocusNext);
        assert_eq!(app.focus, Field::Target);
        // Cible JPY -> CHF : la requête reste sur la base EUR
        let request = app.handle_action(Action::NextCurrency).unwrap();
        assert_eq!(request.base, Currency::EUR);
        assert_eq!(request.id, app.latest_request_id());
        assert_eq!(app.target_currency, Currency::CHF);
        assert!(app.is_loading);

        let request = app.handle_action(Action::SwapCurrencies).unwrap();
        assert_eq!(request.base, Currency::CHF);
    }

    #[test]
    fn test_selection_to_same_currency_does_not_fetch() {
        let mut app = App::new(Currency::USD, Currency::EUR, 1.0);
        app.focus = Field::Target;

        // EUR -> USD : base == cible, erreur sans requête
        assert_eq!(app.handle_action(Action::PreviousCurrency), None);
        assert_eq!(app.error, Some(ConversionError::SameCurrency));

        // Inverser deux devises identiques ne change rien
        let id = app.latest_request_id();
        assert_eq!(app.handle_action(Action::SwapCurrencies), None);
        assert_eq!(app.latest_request_id(), id);
    }

    #[test]
    fn test_quit_action_needs_confirmation() {
        let mut app = App::default();
        app.handle_action(Action::Quit);
        assert!(app.is_running());
        app.handle_action(Action::Other);
        app.handle_action(Action::Quit);
        assert!(app.is_running());
        app.handle_action(Action::Quit);
        assert!(!app.is_running());
    }

    #[test]
    fn test_quit_confirmation() {
        let mut app = App::default();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }
}
