use std::time::Duration;

use nostr_sdk::prelude::*;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use super::subscriptions::{live_follow_up_filter, EventSource};
use crate::error::{FeedError, Result};
use crate::models::FeedEvent;
use crate::store::SharedEventStore;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Relay-backed event source. Relay pooling, signing and verification are
/// all `nostr-sdk`'s; this only adapts its events into the feed store.
#[derive(Clone)]
pub struct RelaySource {
    client: Client,
}

impl RelaySource {
    /// Connect to `relays`, signing with `keys` when given.
    pub async fn connect(relays: &[String], keys: Option<Keys>) -> Result<Self> {
        let client = match keys {
            Some(keys) => Client::builder().signer(keys).build(),
            None => Client::default(),
        };

        for url in relays {
            client.add_relay(url.as_str()).await.map_err(FeedError::relay)?;
        }

        tracing::info!(relays = relays.len(), "connecting to relays");
        tokio::time::timeout(CONNECT_TIMEOUT, client.connect())
            .await
            .map_err(|_| FeedError::Relay {
                message: format!("Connection timed out after {:?}", CONNECT_TIMEOUT),
            })?;

        Ok(Self { client })
    }

    /// Subscribe to `filters` and insert every matching event into `store`
    /// until `cancel` flips to `true`. `on_change` runs after each new event
    /// so callers can recompute their views from the updated snapshot.
    pub async fn follow<F>(
        &self,
        filters: Vec<Filter>,
        store: SharedEventStore,
        mut cancel: watch::Receiver<bool>,
        on_change: F,
    ) -> Result<()>
    where
        F: Fn(&FeedEvent),
    {
        let mut notifications = self.client.notifications();

        for filter in filters {
            self.subscribe(filter).await?;
        }

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                notification = notifications.recv() => match notification {
                    Ok(RelayPoolNotification::Event { event, .. }) => {
                        let event = FeedEvent::from(event.as_ref());
                        let inserted = store.write().insert(event.clone());
                        if inserted {
                            if let Some(filter) = live_follow_up_filter(&event) {
                                if let Err(e) = self.subscribe(filter).await {
                                    tracing::warn!(thread = %event.id, error = %e, "failed to follow new thread");
                                }
                            }
                            on_change(&event);
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }

        self.client.unsubscribe_all().await;
        tracing::debug!("follow stopped, subscriptions closed");
        Ok(())
    }

    async fn subscribe(&self, filter: Filter) -> Result<()> {
        let filter_json = serde_json::to_string(&filter).unwrap_or_default();
        let output = self
            .client
            .subscribe(filter, None)
            .await
            .map_err(FeedError::relay)?;
        tracing::debug!(subscription = %output.val, filter = %filter_json, "subscribed");
        Ok(())
    }

    pub async fn disconnect(&self) {
        self.client.disconnect().await;
        tracing::debug!("disconnected from relays");
    }
}

impl EventSource for RelaySource {
    async fn fetch(&self, filter: Filter, timeout: Duration) -> Result<Vec<FeedEvent>> {
        let events = self
            .client
            .fetch_events(filter, timeout)
            .await
            .map_err(FeedError::relay)?;
        Ok(events.into_iter().map(FeedEvent::from).collect())
    }
}
