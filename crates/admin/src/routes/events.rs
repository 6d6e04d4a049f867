//! Live-update stream for the dashboard tables.
//!
//! Every invalidation in the shared query cache is forwarded as an SSE event
//! named after the stale key (`products`, `orders`, `contactMessages`).
//! Table fragments listen with `hx-trigger="sse:<key>"` and re-fetch.

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use futures::Stream;
use knots_folds_client::QueryKey;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(events))
}

/// Stream invalidated keys to the browser.
///
/// GET /events
async fn events(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Live-update stream opened");
    Sse::new(invalidation_events(state.sync().subscribe())).keep_alive(KeepAlive::default())
}

/// Turn the cache's invalidation broadcast into SSE events.
///
/// A receiver that fell behind has missed keys it cannot name, so every key
/// is reported stale.
pub fn invalidation_events(
    mut receiver: broadcast::Receiver<QueryKey>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(key) => {
                    yield Ok(key_event(key));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Live-update stream lagged, refreshing everything");
                    for key in QueryKey::ALL {
                        yield Ok(key_event(key));
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

fn key_event(key: QueryKey) -> Event {
    Event::default().event(key.as_str()).data(key.as_str())
}
