//! Per-view snapshot buffers with request sequencing.
//!
//! Every refresh takes a ticket before fetching. A successful fetch replaces
//! the buffered snapshot only if no newer ticket has been issued since;
//! older responses are discarded, failures included. A failed fetch for the
//! latest ticket leaves the buffer alone so the previous snapshot can still
//! be served, marked stale.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Monotonic sequence number handed out by [`SequencedView::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The snapshot was replaced.
    Applied,
    /// A newer request was issued; the buffer was left untouched.
    Superseded,
    /// The latest fetch failed; the previous snapshot was kept.
    Failed,
}

/// Data to serve for one completed fetch.
#[derive(Debug, Clone)]
pub struct Published<T> {
    pub data: Arc<T>,
    pub outcome: CompletionOutcome,
    pub error: Option<String>,
    pub sequence: u64,
    pub refreshed_at: DateTime<Utc>,
}

impl<T> Published<T> {
    pub fn is_stale(&self) -> bool {
        self.outcome == CompletionOutcome::Failed
    }

    /// Wraps a derived view of this snapshot for the response body.
    pub fn envelope<V>(&self, data: V) -> ViewEnvelope<V> {
        ViewEnvelope {
            data,
            stale: self.is_stale(),
            error: self.error.clone(),
            sequence: self.sequence,
            refreshed_at: self.refreshed_at,
        }
    }
}

/// Response body of every read view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ViewEnvelope<V> {
    pub data: V,
    /// True when the latest refresh failed and an earlier snapshot is shown
    pub stale: bool,
    /// Why the latest refresh failed, when `stale`
    pub error: Option<String>,
    /// Sequence number of the snapshot being shown
    pub sequence: u64,
    /// When the snapshot being shown was fetched
    pub refreshed_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Buffer<T> {
    latest_issued: u64,
    applied: u64,
    snapshot: Option<Arc<T>>,
    refreshed_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

#[derive(Debug)]
pub struct SequencedView<T> {
    name: &'static str,
    buffer: Mutex<Buffer<T>>,
}

impl<T> SequencedView<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            buffer: Mutex::new(Buffer {
                latest_issued: 0,
                applied: 0,
                snapshot: None,
                refreshed_at: None,
                last_error: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Buffer<T>> {
        // The buffer is only ever replaced wholesale, so a poisoned lock
        // still holds a consistent value.
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn begin(&self) -> FetchTicket {
        let mut buffer = self.lock();
        buffer.latest_issued += 1;
        FetchTicket(buffer.latest_issued)
    }

    /// Currently buffered snapshot, if any fetch has succeeded yet.
    pub fn current(&self) -> Option<Arc<T>> {
        self.lock().snapshot.clone()
    }

    /// Settles the fetch identified by `ticket`.
    ///
    /// On failure of the latest ticket the previous snapshot is returned
    /// marked stale; with no previous snapshot the error itself is returned.
    /// A failure for an older ticket is superseded like a late success and
    /// never marks the buffer stale.
    pub fn complete(
        &self,
        ticket: FetchTicket,
        result: Result<T, ServiceError>,
    ) -> Result<Published<T>, ServiceError> {
        let now = Utc::now();
        let mut buffer = self.lock();

        match result {
            Ok(data) => {
                let data = Arc::new(data);
                if ticket.0 < buffer.latest_issued {
                    counter!("shipyard_view.superseded", 1, "view" => self.name);
                    debug!(
                        view = self.name,
                        ticket = ticket.0,
                        latest = buffer.latest_issued,
                        "discarding superseded response"
                    );
                    return Ok(Published {
                        data,
                        outcome: CompletionOutcome::Superseded,
                        error: None,
                        sequence: ticket.0,
                        refreshed_at: now,
                    });
                }

                buffer.applied = ticket.0;
                buffer.snapshot = Some(Arc::clone(&data));
                buffer.refreshed_at = Some(now);
                buffer.last_error = None;
                Ok(Published {
                    data,
                    outcome: CompletionOutcome::Applied,
                    error: None,
                    sequence: ticket.0,
                    refreshed_at: now,
                })
            }
            Err(err) => {
                counter!(
                    "shipyard_view.fetch_failures",
                    1,
                    "view" => self.name,
                    "kind" => err.kind()
                );
                if ticket.0 < buffer.latest_issued {
                    counter!("shipyard_view.superseded", 1, "view" => self.name);
                    debug!(
                        view = self.name,
                        ticket = ticket.0,
                        latest = buffer.latest_issued,
                        error = %err,
                        "discarding superseded failure"
                    );
                    return match (&buffer.snapshot, buffer.refreshed_at) {
                        (Some(snapshot), Some(refreshed_at)) => Ok(Published {
                            data: Arc::clone(snapshot),
                            outcome: CompletionOutcome::Superseded,
                            error: None,
                            sequence: buffer.applied,
                            refreshed_at,
                        }),
                        _ => Err(err),
                    };
                }

                let message = err.response_message();
                warn!(
                    view = self.name,
                    ticket = ticket.0,
                    error = %err,
                    previous_error = buffer.last_error.as_deref(),
                    "view refresh failed"
                );
                buffer.last_error = Some(message.clone());

                match (&buffer.snapshot, buffer.refreshed_at) {
                    (Some(snapshot), Some(refreshed_at)) => Ok(Published {
                        data: Arc::clone(snapshot),
                        outcome: CompletionOutcome::Failed,
                        error: Some(message),
                        sequence: buffer.applied,
                        refreshed_at,
                    }),
                    _ => Err(err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn first_success_is_applied() {
        let view = SequencedView::new("test");
        let ticket = view.begin();
        let published = view.complete(ticket, Ok(vec![1, 2])).unwrap();

        assert_eq!(published.outcome, CompletionOutcome::Applied);
        assert_eq!(*published.data, vec![1, 2]);
        assert_eq!(view.current().as_deref(), Some(&vec![1, 2]));
    }

    #[test]
    fn older_response_is_discarded_when_newer_request_is_outstanding() {
        let view = SequencedView::new("test");
        let slow = view.begin();
        let fast = view.begin();

        let fast_result = view.complete(fast, Ok("fast")).unwrap();
        assert_eq!(fast_result.outcome, CompletionOutcome::Applied);

        let slow_result = view.complete(slow, Ok("slow")).unwrap();
        assert_eq!(slow_result.outcome, CompletionOutcome::Superseded);
        assert_eq!(view.current().as_deref(), Some(&"fast"));
    }

    #[test]
    fn older_response_is_discarded_even_if_it_lands_first() {
        let view = SequencedView::new("test");
        let slow = view.begin();
        let _fast = view.begin();

        let slow_result = view.complete(slow, Ok(1)).unwrap();
        assert_eq!(slow_result.outcome, CompletionOutcome::Superseded);
        assert!(view.current().is_none());
    }

    #[test]
    fn failure_keeps_previous_snapshot_and_marks_it_stale() {
        let view = SequencedView::new("test");
        let first = view.begin();
        view.complete(first, Ok(10)).unwrap();

        let second = view.begin();
        let published = view
            .complete(second, Err(ServiceError::db_error("connection refused")))
            .unwrap();

        assert_eq!(published.outcome, CompletionOutcome::Failed);
        assert!(published.is_stale());
        assert_eq!(*published.data, 10);
        assert_eq!(published.sequence, first.sequence());
        assert_eq!(published.error.as_deref(), Some("Database error"));
        assert_eq!(view.lock().last_error.as_deref(), Some("Database error"));

        let envelope = published.envelope("derived");
        assert!(envelope.stale);
        assert_eq!(envelope.data, "derived");
    }

    #[test]
    fn failure_without_snapshot_surfaces_the_error() {
        let view: SequencedView<u8> = SequencedView::new("test");
        let ticket = view.begin();
        let result = view.complete(ticket, Err(ServiceError::Timeout("slow".into())));
        assert_matches!(result, Err(ServiceError::Timeout(_)));
    }

    #[test]
    fn success_after_failure_clears_the_error() {
        let view = SequencedView::new("test");
        let t1 = view.begin();
        view.complete(t1, Ok(1)).unwrap();
        let t2 = view.begin();
        view.complete(t2, Err(ServiceError::db_error("down"))).unwrap();
        let t3 = view.begin();
        let published = view.complete(t3, Ok(2)).unwrap();

        assert!(!published.is_stale());
        assert!(view.lock().last_error.is_none());
        assert_eq!(published.sequence, 3);
    }

    #[test]
    fn late_failure_of_older_ticket_does_not_mark_newer_snapshot_stale() {
        let view = SequencedView::new("test");
        let old = view.begin();
        let new = view.begin();
        view.complete(new, Ok(2)).unwrap();

        let published = view
            .complete(old, Err(ServiceError::db_error("connection reset")))
            .unwrap();

        assert_eq!(published.outcome, CompletionOutcome::Superseded);
        assert!(!published.is_stale());
        assert!(published.error.is_none());
        assert_eq!(*published.data, 2);
        assert_eq!(published.sequence, new.sequence());
        assert!(view.lock().last_error.is_none());

        let envelope = published.envelope(());
        assert!(!envelope.stale);
        assert!(envelope.error.is_none());
    }

    #[test]
    fn late_failure_of_older_ticket_without_snapshot_surfaces_the_error() {
        let view: SequencedView<u8> = SequencedView::new("test");
        let old = view.begin();
        let _new = view.begin();

        let result = view.complete(old, Err(ServiceError::db_error("down")));
        assert_matches!(result, Err(ServiceError::DatabaseError(_)));
        assert!(view.lock().last_error.is_none());
    }
}
