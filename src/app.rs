//! Application state management for coinlens
//!
//! Holds the current view, the fetched price series and derived summary,
//! and the supersede guard that keeps slow fetches for a previously
//! selected range from overwriting the latest request's result.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::cache::CacheManager;
use crate::cli::StartupConfig;
use crate::data::{
    derive_summary, MarketClient, MarketSnapshot, PriceSeries, SeriesSource, Summary,
};
use crate::fetch_task::{self, FetchMessage};
use crate::range::RangeSelector;

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while the first fetch runs
    Loading,
    /// Main dashboard with chart and summary
    Dashboard,
    /// Nothing to show; fetch failed before any data arrived
    Error(String),
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Token identifier being tracked
    pub token: String,
    /// Fiat currency prices are quoted in
    pub currency: String,
    /// Optional wallet balance in native units
    pub balance: Option<f64>,
    /// Range tab selection
    pub selector: RangeSelector,
    /// Currently displayed price series
    pub series: Option<PriceSeries>,
    /// Whether the displayed series is stale cache data
    pub series_is_stale: bool,
    /// Summary derived from the displayed series
    pub summary: Option<Summary>,
    /// Current price and 24h change
    pub snapshot: Option<MarketSnapshot>,
    /// Error shown alongside existing data (fetch failed after data arrived)
    pub error: Option<String>,
    /// Whether a series fetch is in flight for the latest request
    pub is_fetching: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Timestamp of the last accepted series result
    pub last_refresh: Option<DateTime<Local>>,
    /// Sequence number of the most recently issued series request
    latest_seq: u64,
    /// Sender handed to background fetch tasks
    tx: mpsc::Sender<FetchMessage>,
    /// Receiver drained by the event loop
    rx: mpsc::Receiver<FetchMessage>,
    /// Market API client
    client: MarketClient,
    /// Response cache, absent when disabled or unavailable
    cache: Option<CacheManager>,
}

impl App {
    /// Creates a new App from the startup configuration
    pub fn new(config: StartupConfig) -> Self {
        let cache = if config.use_cache {
            CacheManager::new()
        } else {
            None
        };
        let (tx, rx) = fetch_task::channel();

        let mut selector = RangeSelector::new();
        selector.select(config.initial_range);

        Self {
            state: AppState::Loading,
            token: config.token,
            currency: config.currency,
            balance: config.balance,
            selector,
            series: None,
            series_is_stale: false,
            summary: None,
            snapshot: None,
            error: None,
            is_fetching: false,
            should_quit: false,
            show_help: false,
            last_refresh: None,
            latest_seq: 0,
            tx,
            rx,
            client: MarketClient::new(),
            cache,
        }
    }

    /// Sequence number of the latest issued series request
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Issues a new series fetch for the active range
    ///
    /// Bumps the request sequence so that any still-running fetch for an
    /// earlier request is discarded when it resolves.
    pub fn request_series(&mut self) {
        self.latest_seq += 1;
        self.error = None;
        fetch_task::spawn_series_fetch(
            self.tx.clone(),
            self.client.clone(),
            self.cache.clone(),
            self.token.clone(),
            self.selector.duration_days(),
            self.currency.clone(),
            self.latest_seq,
        );
    }

    /// Issues a snapshot fetch for the current price and 24h change
    pub fn request_snapshot(&mut self) {
        fetch_task::spawn_snapshot_fetch(
            self.tx.clone(),
            self.client.clone(),
            self.token.clone(),
            self.currency.clone(),
        );
    }

    /// Drains pending fetch messages and applies them
    pub fn poll_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.apply_message(message);
        }
    }

    /// Applies one fetch message, enforcing the supersede guard
    ///
    /// Series messages carrying a sequence older than the latest request
    /// are dropped: the UI reflects the most recently requested range, not
    /// the most recently completed fetch.
    pub fn apply_message(&mut self, message: FetchMessage) {
        match message {
            FetchMessage::SeriesStarted { seq } => {
                if seq == self.latest_seq {
                    self.is_fetching = true;
                }
            }
            FetchMessage::SeriesInterim {
                seq,
                duration_days,
                series,
            } => {
                if seq != self.latest_seq {
                    return;
                }
                self.summary = derive_summary(&series, duration_days);
                self.series = Some(series);
                self.series_is_stale = true;
                self.state = AppState::Dashboard;
            }
            FetchMessage::SeriesLoaded {
                seq,
                duration_days,
                outcome,
            } => {
                if seq != self.latest_seq {
                    return;
                }
                self.summary = derive_summary(&outcome.series, duration_days);
                self.series_is_stale = outcome.source == SeriesSource::StaleCache;
                self.series = Some(outcome.series);
                self.is_fetching = false;
                self.last_refresh = Some(Local::now());
                self.state = AppState::Dashboard;
            }
            FetchMessage::SeriesFailed { seq, error } => {
                if seq != self.latest_seq {
                    return;
                }
                self.is_fetching = false;
                if self.series.is_some() {
                    // Keep showing what we have; surface the error inline
                    self.error = Some(error);
                } else {
                    self.state = AppState::Error(error);
                }
            }
            FetchMessage::SnapshotLoaded(snapshot) => {
                self.snapshot = Some(snapshot);
            }
            FetchMessage::SnapshotFailed(error) => {
                if self.snapshot.is_none() {
                    self.error.get_or_insert(error);
                }
            }
        }
    }

    /// Handles a keyboard event
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys while shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.selector.select_previous().is_some() {
                    self.request_series();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.selector.select_next().is_some() {
                    self.request_series();
                }
            }
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                if self.selector.select_index(index).is_some() {
                    self.request_series();
                }
            }
            KeyCode::Char('r') => {
                self.request_series();
                self.request_snapshot();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }
}
