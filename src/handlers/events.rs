use std::convert::Infallible;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Serialize;
use crate::realtime::{ChangeKind, Notification, Subscription, Table};

pub const NOTICE_LIST_KEY: &str = "noticeList";
pub const NOTICE_ADMIN_LIST_KEY: &str = "noticeAdminList";

/// Tells the client which cached query is stale and must be fetched again.
#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invalidation {
    pub query_key: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<ChangeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missed: Option<u64>,
}

impl Invalidation {
    pub fn new(query_key: &'static str, notification: Notification) -> Self {
        match notification {
            Notification::Change(change) => Self {
                query_key,
                table: Some(change.table),
                event: Some(change.kind),
                missed: None,
            },
            Notification::Missed(n) => Self {
                query_key,
                table: None,
                event: None,
                missed: Some(n),
            },
        }
    }
}

pub fn invalidations(subscription: Subscription, query_key: &'static str) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = subscription.into_stream()
        .filter_map(move |notification| {
            let invalidation = Invalidation::new(query_key, notification);
            let event = match Event::default().event("invalidate").json_data(&invalidation) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    log::error!("couldn't serialize {invalidation:?}: {e}");
                    None
                }
            };
            futures::future::ready(event)
        });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use crate::realtime::{ChangeEvent, ChangeKind, Notification, Table};
    use super::{Invalidation, NOTICE_LIST_KEY};

    #[test]
    fn invalidation_payload() {
        let change = Notification::Change(ChangeEvent {
            table: Table::NoticeboardInteractions,
            kind: ChangeKind::Update,
            record_id: None,
        });
        let value = serde_json::to_value(Invalidation::new(NOTICE_LIST_KEY, change)).unwrap();
        assert_eq!(value, json!({
            "queryKey": "noticeList",
            "table": "noticeboard_interactions",
            "event": "UPDATE",
        }));

        let value = serde_json::to_value(Invalidation::new(NOTICE_LIST_KEY, Notification::Missed(3))).unwrap();
        assert_eq!(value, json!({ "queryKey": "noticeList", "missed": 3 }));
    }
}
