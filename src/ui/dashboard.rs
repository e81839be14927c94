// ============================================================================
// Dashboard - Rendu du convertisseur
// ============================================================================
// Dessine le formulaire de conversion avec les widgets de ratatui
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : Block, Paragraph, Tabs
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
//
// Le rendu n'a aucune logique propre : il lit App et affiche.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, Field};
use crate::models::Currency;

/// Dessine l'interface complète
///
/// # Arguments
/// * `frame` - Surface de dessin ratatui
/// * `app` - État de l'application (lecture seule)
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_currency_selector(frame, app, Field::Base, chunks[1]);
    render_currency_selector(frame, app, Field::Target, chunks[2]);
    render_amount_input(frame, app, chunks[3]);
    render_result_panel(frame, app, chunks[4]);
    render_footer(frame, app, chunks[5]);
}

/// Crée le layout vertical (header, 3 champs, résultat, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Base Currency
            Constraint::Length(3), // Target Currency
            Constraint::Length(3), // Amount
            Constraint::Min(5),    // Résultat / erreur / chargement
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

/// Style de bordure : jaune pour le champ actif
fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Currency Converter",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )))
    .block(block)
    .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Dessine un sélecteur de devise
///
/// CONCEPT RATATUI : Tabs
/// - Une ligne de titres dont un seul est sélectionné
/// - Correspond bien à un <select> à 9 options
fn render_currency_selector(frame: &mut Frame, app: &App, field: Field, area: Rect) {
    let (title, selected) = match field {
        Field::Base => (" Base Currency ", app.base_currency),
        _ => (" Target Currency ", app.target_currency),
    };
    let focused = app.focus == field;

    let titles: Vec<Line> = Currency::all()
        .iter()
        .map(|c| Line::from(c.code()))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused))
                .title(title),
        )
        .select(selected.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(if focused { Color::Yellow } else { Color::Cyan })
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_amount_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Field::Amount;

    let mut spans = vec![Span::styled(
        app.amount_input.clone(),
        Style::default().fg(Color::White),
    )];
    if focused {
        // Curseur simulé
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(" Amount "),
    );

    frame.render_widget(paragraph, area);
}

/// Panneau de résultat : chargement, erreur, ou conversion
///
/// CONCEPT : Rendu conditionnel
/// - is_loading a la priorité
/// - puis l'erreur
/// - sinon la ligne de conversion
fn render_result_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Result ");

    let text = if app.is_loading {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Fetching rates...",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::SLOW_BLINK),
            )),
        ]
    } else if let Some(message) = app.error_message() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("⚠ {}", message),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
        ]
    } else {
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    app.amount_display(),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" = "),
                Span::styled(
                    app.converted_display(),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if let Some(updated) = app.rates_updated {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Rates as of {}", updated.format("%Y-%m-%d %H:%M UTC")),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.is_awaiting_quit_confirmation() {
        Line::from(Span::styled(
            "Appuyez encore sur 'q' pour quitter",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    } else {
        let hint = match app.focus {
            Field::Amount => "0-9 . saisir | ⌫ effacer | +/- pas de 0.01",
            _ => "←→/↑↓ changer la devise | s inverser",
        };
        Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" champ suivant | "),
            Span::raw(hint),
            Span::raw(" | "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" quitter"),
        ])
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
// CONCEPT RATATUI : TestBackend
// - Backend en mémoire : on dessine puis on lit le buffer
// ============================================================================
