//! Background fetch tasks
//!
//! Series and snapshot fetches run as spawned tokio tasks and report back
//! to the main application over an mpsc channel. Every series request
//! carries a sequence number; the app discards any message whose sequence
//! is older than the latest request, so a slow fetch for a previously
//! selected range can never overwrite a newer range's result.

use tokio::sync::mpsc;

use crate::cache::CacheManager;
use crate::data::{
    FetchedSeries, MarketClient, MarketSnapshot, PriceHistoryService, PriceSeries,
};

/// Messages sent from background fetch tasks to the main app
#[derive(Debug)]
pub enum FetchMessage {
    /// A series fetch has started
    SeriesStarted { seq: u64 },
    /// Stale cached data surfaced while a rate-limited fetch retries
    SeriesInterim {
        seq: u64,
        duration_days: u32,
        series: PriceSeries,
    },
    /// A series fetch finished successfully
    SeriesLoaded {
        seq: u64,
        duration_days: u32,
        outcome: FetchedSeries,
    },
    /// A series fetch failed
    SeriesFailed { seq: u64, error: String },
    /// The current-market snapshot was refreshed
    SnapshotLoaded(MarketSnapshot),
    /// The snapshot fetch failed
    SnapshotFailed(String),
}

/// Channel capacity for fetch messages
const CHANNEL_CAPACITY: usize = 32;

/// Creates the fetch message channel
pub fn channel() -> (mpsc::Sender<FetchMessage>, mpsc::Receiver<FetchMessage>) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Spawns a background task fetching the price series for one request
///
/// The task reports start, optional interim stale data, and the final
/// outcome, all tagged with `seq` for the supersede guard.
pub fn spawn_series_fetch(
    tx: mpsc::Sender<FetchMessage>,
    client: MarketClient,
    cache: Option<CacheManager>,
    token: String,
    duration_days: u32,
    currency: String,
    seq: u64,
) {
    tokio::spawn(async move {
        let _ = tx.send(FetchMessage::SeriesStarted { seq }).await;

        let service = PriceHistoryService::new(client, cache);
        let interim_tx = tx.clone();
        let result = service
            .fetch_with_interim(&token, duration_days, &currency, |series| {
                let _ = interim_tx.try_send(FetchMessage::SeriesInterim {
                    seq,
                    duration_days,
                    series,
                });
            })
            .await;

        let message = match result {
            Ok(outcome) => FetchMessage::SeriesLoaded {
                seq,
                duration_days,
                outcome,
            },
            Err(e) => FetchMessage::SeriesFailed {
                seq,
                error: e.to_string(),
            },
        };
        let _ = tx.send(message).await;
    });
}

/// Spawns a background task refreshing the current-market snapshot
pub fn spawn_snapshot_fetch(
    tx: mpsc::Sender<FetchMessage>,
    client: MarketClient,
    token: String,
    currency: String,
) {
    tokio::spawn(async move {
        let message = match client.coin_snapshot(&token, &currency).await {
            Ok(snapshot) => FetchMessage::SnapshotLoaded(snapshot),
            Err(e) => FetchMessage::SnapshotFailed(e.to_string()),
        };
        let _ = tx.send(message).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_has_capacity() {
        let (tx, mut rx) = channel();
        tx.try_send(FetchMessage::SeriesStarted { seq: 1 })
            .expect("Channel should accept a message");
        assert!(matches!(
            rx.try_recv(),
            Ok(FetchMessage::SeriesStarted { seq: 1 })
        ));
    }

    #[test]
    fn test_try_recv_empty_channel() {
        let (_tx, mut rx) = channel();
        assert!(rx.try_recv().is_err());
    }
}
