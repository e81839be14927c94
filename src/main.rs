// ============================================================================
// LazyFx - Convertisseur de devises dans le terminal
// ============================================================================
// Choisir une devise de base, une devise cible, un montant : les taux sont
// récupérés en direct et le montant converti s'affiche.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Worker thread + channels : les appels réseau ne bloquent pas l'UI
// 4. Request sequencing : seule la réponse la plus récente est appliquée
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazyfx::api::ExchangeRateClient;
use lazyfx::app::{App, FetchRequest};
use lazyfx::config::Config;
use lazyfx::models::{Currency, RateSnapshot};
use lazyfx::ui::{action_for, render, EventHandler};

// ============================================================================
// Ligne de commande
// ============================================================================

/// Convertisseur de devises avec taux en direct
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Fichier de configuration YAML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Devise de base au démarrage (ex: USD)
    #[arg(short, long)]
    base: Option<Currency>,

    /// Devise cible au démarrage (ex: EUR)
    #[arg(short, long)]
    target: Option<Currency>,

    /// Montant au démarrage
    #[arg(short, long)]
    amount: Option<f64>,

    /// Clé API exchangerate-api.com (prioritaire sur le fichier et l'environnement)
    #[arg(long)]
    api_key: Option<String>,
}

impl Cli {
    /// Applique les arguments sur la configuration chargée
    fn apply(&self, config: &mut Config) {
        if let Some(base) = self.base {
            config.default_base = base;
        }
        if let Some(target) = self.target {
            config.default_target = target;
        }
        if let Some(amount) = self.amount {
            config.default_amount = amount.max(0.0);
        }
        if let Some(key) = &self.api_key {
            config.api_key = key.clone();
        }
    }
}

// ============================================================================
// Commandes et résultats du worker thread
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Récupérer les taux pour une devise de base
    FetchRates { request_id: u64, base: Currency },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    RatesLoaded { request_id: u64, snapshot: RateSnapshot },
    RatesFailed { request_id: u64, error: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers ./logs/lazyfx.log
///
/// # Utilisation
/// ```bash
/// tail -f logs/lazyfx.log
/// RUST_LOG=lazyfx=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazyfx.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazyfx=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyFx starting up");

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    if config.api_key.is_empty() {
        warn!("No API key configured, requests will be rejected by the provider");
    }

    let client = ExchangeRateClient::new(&config)?;

    // Le runtime tokio appartient au worker thread
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(runtime, client, command_rx, result_tx);

    let mut app = App::new(
        config.default_base,
        config.default_target,
        config.default_amount,
    );

    // Premier fetch au démarrage, avant même le premier rendu
    if let Some(request) = app.begin_fetch() {
        send_fetch(&mut app, request, &command_tx);
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Thread + async runtime
// - Le worker reçoit des AppCommand et renvoie des AppResult
// - Chaque fetch est une tâche tokio séparée : un nouveau choix de devise
//   n'attend jamais la fin d'une requête lente
// - Le worker ne touche jamais à App : seule la boucle d'événements modifie
//   l'état
// ============================================================================

fn spawn_background_worker(
    runtime: tokio::runtime::Runtime,
    client: ExchangeRateClient,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    std::thread::spawn(move || {
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            match command {
                AppCommand::FetchRates { request_id, base } => {
                    let client = client.clone();
                    let result_tx = result_tx.clone();

                    runtime.spawn(async move {
                        let result = match client.fetch_latest(base).await {
                            Ok(snapshot) => AppResult::RatesLoaded { request_id, snapshot },
                            Err(e) => {
                                error!(request_id, base = %base, error = ?e, "Failed to fetch exchange rates");
                                AppResult::RatesFailed {
                                    request_id,
                                    error: format!("{:#}", e),
                                }
                            }
                        };
                        // L'UI peut être fermée entre-temps
                        let _ = result_tx.send(result);
                    });
                }
            }
        }

        // Channel fermé : le runtime est détruit avec le thread
        info!("Worker thread exiting (channel closed)");
    });
}

/// Envoie une requête au worker
///
/// CONCEPT : Request sequencing
/// - begin_fetch() (appelé par App) alloue un nouvel id, ce qui périme toute
///   requête en vol
/// - Si le worker a disparu, la requête échoue tout de suite
fn send_fetch(app: &mut App, request: FetchRequest, command_tx: &mpsc::Sender<AppCommand>) {
    let command = AppCommand::FetchRates {
        request_id: request.id,
        base: request.base,
    };
    if command_tx.send(command).is_err() {
        error!("Worker thread disconnected!");
        app.apply_fetch_result(request.id, Err("worker disconnected".to_string()));
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Appliquer les résultats du worker
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input) et mettre à jour l'état
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    let mut worker_connected = true;

    while app.is_running() {
        // 0. RÉSULTATS : try_recv ne bloque pas
        while worker_connected {
            match result_rx.try_recv() {
                Ok(AppResult::RatesLoaded { request_id, snapshot }) => {
                    app.apply_fetch_result(request_id, Ok(snapshot));
                }
                Ok(AppResult::RatesFailed { request_id, error }) => {
                    app.apply_fetch_result(request_id, Err(error));
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    // Plus rien n'arrivera : on arrête d'interroger le channel
                    error!("Worker thread disconnected!");
                    worker_connected = false;
                }
            }
        }

        // 1. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 2. INPUT + UPDATE : seul un changement de devise produit une requête
        let event = events.next()?;
        if let Some(action) = action_for(&event, app.focus) {
            if let Some(request) = app.handle_action(action) {
                send_fetch(app, request, command_tx);
            }
        }
    }

    Ok(())
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Impossible d'activer le raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
