//! Row-level change notifications.
//!
//! Postgres triggers publish every insert, update and delete of the noticeboard tables to the
//! [`CHANNEL`] channel. A single [`listener`] task forwards them into the [`RealtimeHub`], which
//! fans them out to subscribers that registered interest in a table and an event type, the same
//! way a hosted `postgres_changes` subscription is scoped.

mod listener;

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

pub use listener::spawn_listener;

pub const CHANNEL: &str = "noticeboard_changes";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Table {
    NoticeboardItems,
    NoticeboardInteractions,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    #[serde(rename = "event")]
    pub kind: ChangeKind,
    pub record_id: Option<Uuid>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EventFilter {
    Any,
    Only(ChangeKind),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChangeFilter {
    pub table: Table,
    pub event: EventFilter,
}

impl ChangeFilter {
    pub fn any(table: Table) -> Self {
        Self { table, event: EventFilter::Any }
    }

    pub fn only(table: Table, kind: ChangeKind) -> Self {
        Self { table, event: EventFilter::Only(kind) }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        self.table == event.table && match self.event {
            EventFilter::Any => true,
            EventFilter::Only(kind) => kind == event.kind,
        }
    }
}

/// What a subscriber gets: either a matching change or a notice that it fell behind and
/// some changes were dropped. Both mean the subscriber's data is stale.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Change(ChangeEvent),
    Missed(u64),
}

#[derive(Clone, Debug)]
pub struct RealtimeHub {
    sender: broadcast::Sender<ChangeEvent>,
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of subscribers the event was delivered to.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        log::debug!("publishing {event:?}");
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self, filters: Vec<ChangeFilter>) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            filters,
        }
    }
}

pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    filters: Vec<ChangeFilter>,
}

impl Subscription {
    /// Waits for the next matching change. `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filters.iter().any(|f| f.matches(&event)) =>
                    return Some(Notification::Change(event)),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("a realtime subscriber lagged behind, {skipped} events were skipped");
                    return Some(Notification::Missed(skipped))
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Notification> {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription.next()
                .await
                .map(|notification| (notification, subscription))
        })
    }
}
