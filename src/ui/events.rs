// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier et les traduit en actions du convertisseur
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : KeyCode + modifiers => Action
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{Action, Field};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (pas d'entrée pendant le timeout)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick de 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// - Si pas d'événement pendant tick_rate, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Traduction touche -> Action
// ============================================================================
// La traduction dépend du champ actif : les flèches changent la devise sur
// un sélecteur et font un pas sur le montant. App::handle_action applique
// ensuite l'action.
// ============================================================================

/// Traduit un événement clavier en action selon le champ actif
pub fn action_for(event: &Event, focus: Field) -> Option<Action> {
    let key = match event {
        Event::Key(key) => key,
        Event::Tick => return None,
    };

    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        return Some(Action::ForceQuit);
    }

    let action = match (key.code, focus) {
        (KeyCode::Char('q') | KeyCode::Char('Q'), _) => Action::Quit,
        (KeyCode::Tab, _) => Action::FocusNext,
        (KeyCode::BackTab, _) => Action::FocusPrevious,
        (KeyCode::Char('s') | KeyCode::Char('S'), _) => Action::SwapCurrencies,

        // Sélecteurs : flèches et touches Vim
        (KeyCode::Down | KeyCode::Right | KeyCode::Char('j') | KeyCode::Char('l'), Field::Base | Field::Target) => {
            Action::NextCurrency
        }
        (KeyCode::Up | KeyCode::Left | KeyCode::Char('k') | KeyCode::Char('h'), Field::Base | Field::Target) => {
            Action::PreviousCurrency
        }

        // Montant : saisie numérique
        (KeyCode::Char(c), Field::Amount) if c.is_ascii_digit() || c == '.' || c == ',' => {
            Action::AmountChar(c)
        }
        (KeyCode::Backspace, Field::Amount) => Action::AmountBackspace,
        (KeyCode::Char('+') | KeyCode::Up, Field::Amount) => Action::StepAmount(1),
        (KeyCode::Char('-') | KeyCode::Down, Field::Amount) => Action::StepAmount(-1),

        _ => Action::Other,
    };

    Some(action)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(action_for(&key(KeyCode::Char('q')), Field::Base), Some(Action::Quit));
        assert_eq!(action_for(&key(KeyCode::Char('q')), Field::Amount), Some(Action::Quit));

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action_for(&ctrl_c, Field::Amount), Some(Action::ForceQuit));

        assert_eq!(action_for(&Event::Tick, Field::Base), None);
    }

    #[test]
    fn test_selector_keys_depend_on_focus() {
        assert_eq!(action_for(&key(KeyCode::Down), Field::Base), Some(Action::NextCurrency));
        assert_eq!(action_for(&key(KeyCode::Char('k')), Field::Target), Some(Action::PreviousCurrency));
        assert_eq!(action_for(&key(KeyCode::Down), Field::Amount), Some(Action::StepAmount(-1)));
        assert_eq!(action_for(&key(KeyCode::Char('j')), Field::Amount), Some(Action::Other));
    }

    #[test]
    fn test_amount_keys() {
        assert_eq!(action_for(&key(KeyCode::Char('7')), Field::Amount), Some(Action::AmountChar('7')));
        assert_eq!(action_for(&key(KeyCode::Char('7')), Field::Base), Some(Action::Other));
        assert_eq!(action_for(&key(KeyCode::Backspace), Field::Amount), Some(Action::AmountBackspace));
        assert_eq!(action_for(&key(KeyCode::Char('+')), Field::Amount), Some(Action::StepAmount(1)));
    }

    #[test]
    fn test_focus_keys() {
        assert_eq!(action_for(&key(KeyCode::Tab), Field::Amount), Some(Action::FocusNext));
        assert_eq!(action_for(&key(KeyCode::BackTab), Field::Base), Some(Action::FocusPrevious));
    }
}
