use std::env;
use std::sync::Arc;

use stockpulse_rs::api::ApiClient;
use stockpulse_rs::config::Config;
use stockpulse_rs::events::Event;
use stockpulse_rs::market::{StatusPoller, SystemClock};
use stockpulse_rs::suggest::{Key, ListView, SelectAction, SuggestionController, UiInput};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "stockpulse.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let path = env::var("STOCKPULSE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let mut cfg = Config::load_or_default(&path)?;
    if let Ok(base) = env::var("STOCKPULSE_API_BASE") {
        cfg.api.base_url = base;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.general.log_level)),
        )
        .init();
    info!("Loaded config from {}: {:?}", path, cfg);

    let client = Arc::new(ApiClient::new(cfg.api.clone())?);

    // Create the event channel
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    // Market status header
    let poller = StatusPoller::new(
        Arc::clone(&client),
        Arc::new(SystemClock),
        cfg.poller.clone(),
        tx.clone(),
    );
    let (stop_tx, stop_rx) = oneshot::channel();
    let poller_task = tokio::spawn(poller.run(stop_rx));

    // Search box
    let controller = SuggestionController::new(Arc::clone(&client), cfg.suggest.clone(), tx.clone());
    let (input_tx, input_rx) = mpsc::channel::<UiInput>(100);
    tokio::spawn(controller.run(input_rx));

    spawn_stdin(input_tx, tx.clone());

    let ctrl_c_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c_tx.send(Event::Shutdown).await;
        }
    });
    drop(tx);

    println!("Type to search. Commands: :up :down :enter :esc :hover N :pick N :away");

    // Main event loop
    while let Some(event) = rx.recv().await {
        match event {
            Event::SuggestionsRendered(ListView::Hidden) => {}
            Event::SuggestionsRendered(ListView::NoMatch { message }) => {
                println!("  ({})", message);
            }
            Event::SuggestionsRendered(ListView::Items { items, active }) => {
                for (i, item) in items.iter().enumerate() {
                    let marker = if active == Some(i) { '>' } else { ' ' };
                    println!("{} {:>2}. {:<12} {}", marker, i, item.symbol, item.company_name);
                }
            }
            Event::ActiveChanged(Some(index)) => {
                println!("  [{}]", index);
            }
            Event::ActiveChanged(None) => {}
            Event::SelectionMade { symbol, action } => match action {
                SelectAction::Fill => println!("input = {}", symbol),
                SelectAction::FillAndSubmit => println!("analyze {}", symbol),
                SelectAction::Navigate => println!("-> {}", client.detail_url(&symbol)),
            },
            Event::RawSubmitted { text } => {
                println!("submit {:?}", text);
            }
            Event::Dismissed => {}
            Event::MarketStatus(ind) => {
                let moves: Vec<String> = ind
                    .indices
                    .iter()
                    .map(|m| format!("{} {:+.2}%", m.name, m.change_pct))
                    .collect();
                println!(
                    "[{}] {} | {}",
                    ind.label(),
                    ind.updated_label().unwrap_or_else(|| "Last updated: --".to_string()),
                    moves.join("  ")
                );
            }
            Event::CadenceChanged { state, interval } => {
                info!("Status refresh for {:?} every {:?}", state, interval);
            }
            Event::Shutdown => {
                println!("Shutting down...");
                break;
            }
        }
    }

    let _ = stop_tx.send(());
    let _ = poller_task.await;
    Ok(())
}

/// Feeds stdin lines to the search controller. EOF shuts everything down.
fn spawn_stdin(input_tx: mpsc::Sender<UiInput>, tx: mpsc::Sender<Event>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if input_tx.send(parse_command(&line)).await.is_err() {
                break;
            }
        }
        let _ = tx.send(Event::Shutdown).await;
    });
}

fn parse_command(line: &str) -> UiInput {
    let mut parts = line.trim().splitn(2, ' ');
    let index = |arg: Option<&str>| arg.and_then(|s| s.trim().parse::<usize>().ok());

    match parts.next() {
        Some(":up") => UiInput::Key(Key::ArrowUp),
        Some(":down") => UiInput::Key(Key::ArrowDown),
        Some(":enter") => UiInput::Key(Key::Enter),
        Some(":esc") => UiInput::Key(Key::Escape),
        Some(":away") => UiInput::ClickOutside,
        Some(":hover") => match index(parts.next()) {
            Some(n) => UiInput::Hover(n),
            None => UiInput::Key(Key::Other),
        },
        Some(":pick") => match index(parts.next()) {
            Some(n) => UiInput::Click(n),
            None => UiInput::Key(Key::Other),
        },
        _ => UiInput::Text(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        assert_eq!(parse_command(":down"), UiInput::Key(Key::ArrowDown));
        assert_eq!(parse_command(" :up "), UiInput::Key(Key::ArrowUp));
        assert_eq!(parse_command(":enter"), UiInput::Key(Key::Enter));
        assert_eq!(parse_command(":esc"), UiInput::Key(Key::Escape));
        assert_eq!(parse_command(":away"), UiInput::ClickOutside);
    }

    #[test]
    fn test_parse_indexed() {
        assert_eq!(parse_command(":pick 2"), UiInput::Click(2));
        assert_eq!(parse_command(":hover 0"), UiInput::Hover(0));
        assert_eq!(parse_command(":pick x"), UiInput::Key(Key::Other));
    }

    #[test]
    fn test_plain_text_kept_raw() {
        assert_eq!(parse_command("  tata "), UiInput::Text("  tata ".to_string()));
    }
}
