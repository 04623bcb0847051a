//! Change feed
//!
//! Every write publishes a [`ChangeEvent`] on a broadcast channel. With
//! Postgres, a listener task also forwards `NOTIFY` messages emitted by
//! table triggers so writes made by other clients are seen too.
//!
//! Subscribers never receive diffs: each signal means "reload what you
//! derive from this kind". A subscriber that falls behind gets a single
//! [`FeedSignal::Reload`] instead of the events it missed.

use std::time::Duration;

use gamesales_types::{ChangeEvent, ChangeKind};
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Postgres channel the table triggers notify on; payload is the table name
pub const NOTIFY_CHANNEL: &str = "gamesales_changes";

/// Delay before retrying a failed listener connection
const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Broadcast sender shared by the store and all subscribers
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a change; dropped silently when nobody is subscribed
    pub fn publish(&self, kind: ChangeKind) {
        let receivers = self.tx.send(ChangeEvent::now(kind)).unwrap_or(0);
        debug!(?kind, receivers, "Published change");
    }

    /// Publish every kind, forcing subscribers into a full reload
    pub fn publish_all(&self) {
        for kind in ChangeKind::ALL {
            self.publish(kind);
        }
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

/// What a subscriber should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSignal {
    /// Reload data derived from this kind
    Changed(ChangeEvent),
    /// Events were missed; reload everything
    Reload,
}

impl FeedSignal {
    /// Whether views built from `kind` must be recomputed
    pub fn touches(&self, kind: ChangeKind) -> bool {
        match self {
            Self::Changed(event) => event.kind == kind,
            Self::Reload => true,
        }
    }
}

/// Receiving half of the feed
#[derive(Debug)]
pub struct ChangeSubscription {
    rx: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    /// Wait for the next signal; `None` once the feed is gone
    pub async fn next(&mut self) -> Option<FeedSignal> {
        match self.rx.recv().await {
            Ok(event) => Some(FeedSignal::Changed(event)),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Change subscriber lagged; forcing full reload");
                Some(FeedSignal::Reload)
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

/// Forward Postgres notifications into the feed until the task is aborted
pub fn spawn_pg_listener(pool: PgPool, feed: ChangeFeed) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let mut listener = match PgListener::connect_with(&pool).await {
                Ok(listener) => listener,
                Err(e) => {
                    warn!(error = %e, "Change listener could not connect; retrying");
                    tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                    continue;
                }
            };
            if let Err(e) = listener.listen(NOTIFY_CHANNEL).await {
                warn!(error = %e, "LISTEN {} failed; retrying", NOTIFY_CHANNEL);
                tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                continue;
            }
            info!(channel = NOTIFY_CHANNEL, "Listening for backend changes");

            loop {
                match listener.try_recv().await {
                    Ok(Some(notification)) => match ChangeKind::from_table(notification.payload()) {
                        Some(kind) => feed.publish(kind),
                        None => debug!(payload = notification.payload(), "Ignoring unknown table"),
                    },
                    Ok(None) => {
                        // Notifications sent while reconnecting are lost
                        warn!("Change listener connection lost; reconnecting");
                        feed.publish_all();
                    }
                    Err(e) => {
                        warn!(error = %e, "Change listener failed");
                        feed.publish_all();
                        tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                        break;
                    }
                }
            }
        }
    })
}
