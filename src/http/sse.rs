use std::convert::Infallible;
use std::pin::Pin;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::session::{PracticeSessionController, SessionSnapshot};

pub type SessionStream = Sse<Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>>;

/// Server-Sent Events of session snapshots, named after the session state.
///
/// A lagged subscriber skips ahead; every snapshot carries the full state.
pub fn session_snapshots(controller: &PracticeSessionController) -> SessionStream {
    let stream = BroadcastStream::new(controller.subscribe())
        .filter_map(|item| async move { snapshot_event(item).map(Ok) });

    Sse::new(Box::pin(stream) as Pin<Box<_>>).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(5))
            .text("session-keepalive"),
    )
}

fn snapshot_event(item: Result<SessionSnapshot, BroadcastStreamRecvError>) -> Option<Event> {
    let snapshot = match item {
        Ok(snapshot) => snapshot,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            log::debug!("[DebugHttp] Snapshot stream lagged by {}", skipped);
            return None;
        }
    };
    match Event::default()
        .event(snapshot.session.name())
        .id(snapshot.generation.to_string())
        .json_data(&snapshot)
    {
        Ok(event) => Some(event),
        Err(err) => {
            log::warn!("[DebugHttp] Dropping unserializable snapshot: {}", err);
            None
        }
    }
}
