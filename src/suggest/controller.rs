use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{EnterPolicy, Key, ListView, Suggestion, SuggestionSession, SuggestionSource};
use crate::api::ApiError;
use crate::config::SuggestSettings;
use crate::events::Event;

/// Input events from the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiInput {
    /// Input field changed to this raw text
    Text(String),
    Key(Key),
    /// Pointer entered suggestion `n`
    Hover(usize),
    /// Pointer clicked suggestion `n`
    Click(usize),
    /// Click landed outside both the input and the list
    ClickOutside,
}

// Work finished in a spawned task, tagged with the sequence number that
// was current when it started.
enum Completion {
    DebounceElapsed {
        seq: u64,
        query: String,
    },
    LookupFinished {
        seq: u64,
        query: String,
        result: Result<Vec<Suggestion>, ApiError>,
    },
}

/// Autocomplete controller for one search input.
///
/// Keystrokes are debounced, the last quiet query is looked up, and the
/// result replaces the list only if no newer input arrived meanwhile.
/// Every input, dismissal and selection bumps `latest_seq`; a completion
/// whose seq is older is dropped on the floor.
pub struct SuggestionController<S> {
    source: Arc<S>,
    settings: SuggestSettings,
    tx: mpsc::Sender<Event>,

    session: SuggestionSession,
    raw_input: String,
    latest_seq: u64,
    debounce: Option<JoinHandle<()>>,

    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: SuggestionSource> SuggestionController<S> {
    pub fn new(source: Arc<S>, settings: SuggestSettings, tx: mpsc::Sender<Event>) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            source,
            settings,
            tx,
            session: SuggestionSession::new(),
            raw_input: String::new(),
            latest_seq: 0,
            debounce: None,
            done_tx,
            done_rx,
        }
    }

    pub fn session(&self) -> &SuggestionSession {
        &self.session
    }

    /// Current contents of the input, as last reported or filled.
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// Drive the controller from a stream of host inputs until it closes.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<UiInput>) {
        loop {
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => self.handle(input).await,
                    None => break,
                },
                Some(done) = self.done_rx.recv() => self.complete(done).await,
            }
        }
        self.shutdown();
    }

    pub async fn handle(&mut self, input: UiInput) {
        match input {
            UiInput::Text(text) => self.on_input(&text).await,
            UiInput::Key(key) => self.on_key(key).await,
            UiInput::Hover(index) => self.on_hover(index).await,
            UiInput::Click(index) => self.on_select(index).await,
            UiInput::ClickOutside => self.on_outside_click().await,
        }
    }

    /// Wait for the next timer or lookup to finish and apply it.
    pub async fn step(&mut self) {
        if let Some(done) = self.done_rx.recv().await {
            self.complete(done).await;
        }
    }

    // =========================================================================
    // HOST INPUT
    // =========================================================================

    pub async fn on_input(&mut self, raw: &str) {
        self.raw_input = raw.to_string();
        self.invalidate();

        let query = raw.trim();
        if query.chars().count() < self.settings.min_query_len {
            if self.session.hide() {
                self.emit(Event::SuggestionsRendered(ListView::Hidden)).await;
            }
            return;
        }

        let seq = self.latest_seq;
        let query = query.to_string();
        let delay = Duration::from_millis(self.settings.debounce_ms);
        let done = self.done_tx.clone();

        debug!("[suggest] debounce armed for {:?} (seq {})", query, seq);
        self.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = done.send(Completion::DebounceElapsed { seq, query });
        }));
    }

    pub async fn on_key(&mut self, key: Key) {
        match key {
            Key::ArrowDown => {
                if let Some(index) = self.session.move_next() {
                    self.emit(Event::ActiveChanged(Some(index))).await;
                }
            }
            Key::ArrowUp => {
                if let Some(index) = self.session.move_prev() {
                    self.emit(Event::ActiveChanged(Some(index))).await;
                }
            }
            Key::Enter => self.on_enter().await,
            Key::Escape => self.dismiss().await,
            Key::Other => {}
        }
    }

    pub async fn on_hover(&mut self, index: usize) {
        if self.session.set_active(index) {
            self.emit(Event::ActiveChanged(Some(index))).await;
        }
    }

    /// Pointer selection. Same outcome as highlighting and pressing Enter.
    pub async fn on_select(&mut self, index: usize) {
        if let Some(item) = self.session.item(index).cloned() {
            self.session.set_active(index);
            self.select(item).await;
        }
    }

    pub async fn on_outside_click(&mut self) {
        self.dismiss().await;
    }

    /// Cancel pending work. Called when the host page goes away.
    pub fn shutdown(&mut self) {
        self.invalidate();
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn on_enter(&mut self) {
        if let Some(item) = self.session.active_item().cloned() {
            self.select(item).await;
            return;
        }

        let text = self.raw_input.trim().to_string();
        if self.settings.enter_policy != EnterPolicy::SubmitRaw || text.is_empty() {
            return;
        }

        self.invalidate();
        if self.session.hide() {
            self.emit(Event::SuggestionsRendered(ListView::Hidden)).await;
        }
        self.emit(Event::RawSubmitted { text }).await;
    }

    async fn select(&mut self, item: Suggestion) {
        self.invalidate();
        self.session.hide();
        self.raw_input = item.symbol.clone();

        self.emit(Event::SuggestionsRendered(ListView::Hidden)).await;
        self.emit(Event::SelectionMade {
            symbol: item.symbol,
            action: self.settings.select_action,
        })
        .await;
    }

    async fn dismiss(&mut self) {
        self.invalidate();
        if self.session.hide() {
            self.emit(Event::SuggestionsRendered(ListView::Hidden)).await;
            self.emit(Event::Dismissed).await;
        }
    }

    async fn complete(&mut self, done: Completion) {
        match done {
            Completion::DebounceElapsed { seq, query } => {
                if seq != self.latest_seq {
                    return;
                }
                self.debounce = None;
                self.start_lookup(seq, query);
            }
            Completion::LookupFinished { seq, query, result } => {
                if seq != self.latest_seq {
                    debug!(
                        "[suggest] discarding stale response for {:?} (seq {}, latest {})",
                        query, seq, self.latest_seq
                    );
                    return;
                }

                match result {
                    Ok(items) => {
                        self.session.replace_results(query, items);
                        let view = self.session.view(&self.settings.no_match_text);
                        self.emit(Event::SuggestionsRendered(view)).await;
                    }
                    Err(e) => {
                        warn!("[suggest] lookup for {:?} failed: {}", query, e);
                        if self.session.hide() {
                            self.emit(Event::SuggestionsRendered(ListView::Hidden))
                                .await;
                        }
                    }
                }
            }
        }
    }

    fn start_lookup(&self, seq: u64, query: String) {
        let source = Arc::clone(&self.source);
        let done = self.done_tx.clone();

        debug!("[suggest] lookup {:?} (seq {})", query, seq);
        tokio::spawn(async move {
            let result = source.lookup(&query).await;
            let _ = done.send(Completion::LookupFinished { seq, query, result });
        });
    }

    // Cancels the debounce timer and orphans any lookup in flight.
    fn invalidate(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
        self.latest_seq += 1;
    }

    async fn emit(&self, event: Event) {
        let _ = self.tx.send(event).await;
    }
}

impl<S> Drop for SuggestionController<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
    }
}
