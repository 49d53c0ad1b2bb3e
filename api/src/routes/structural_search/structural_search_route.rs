use std::{convert::Infallible, sync::Arc};

use axum::{
    Json,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use futures::stream;
use searcher::FileMatch;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::structural_search::{
        structural_search_event::SearchEvent, structural_search_request::StructuralSearchRequest,
    },
};

/// Result lines buffered for one response before the search gives up on the
/// client.
const STREAM_BUFFER: usize = 256;

/// Forwards matches into the response channel. A full buffer (client not
/// reading) or a closed one (client gone) cancels the search.
fn event_sender(
    tx: mpsc::Sender<SearchEvent>,
    cancel: CancellationToken,
) -> impl Fn(FileMatch) + Send + Sync {
    move |fm: FileMatch| match tx.try_send(SearchEvent::Match(fm)) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            if !cancel.is_cancelled() {
                warn!(buffer = STREAM_BUFFER, "client is not reading results, cancelling");
            }
            cancel.cancel();
        }
        Err(TrySendError::Closed(_)) => cancel.cancel(),
    }
}

/// HTTP endpoint running one structural search.
///
/// Validation failures are answered with a regular JSON error envelope. Once the
/// search starts the response is `application/x-ndjson`: one `match` line per
/// file, then a `done` or `error` line. Closing the connection cancels the
/// search.
#[instrument(name = "structural_search_route", skip_all)]
pub async fn structural_search_route(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StructuralSearchRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = body?;
    body.validate()?;
    info!(
        repo = %body.request.repo,
        indexed = body.request.indexed,
        languages = ?body.request.languages,
        "structural search requested"
    );

    let (tx, rx) = mpsc::channel::<SearchEvent>(STREAM_BUFFER);
    let cancel = CancellationToken::new();
    let searcher = Arc::clone(&state.searcher);
    let task_cancel = cancel.clone();

    tokio::spawn(async move {
        let sender = event_sender(tx.clone(), task_cancel.clone());

        let res = searcher
            .search(
                &body.request,
                body.snapshot_path.as_deref(),
                &sender,
                &task_cancel,
            )
            .await;

        let last = match res {
            Ok(stats) => {
                debug!(files = stats.files, cancelled = stats.cancelled, "search done");
                SearchEvent::Done(stats)
            }
            Err(e) => {
                warn!(error = %e, "structural search failed");
                SearchEvent::from_error(e)
            }
        };
        // Receiver gone means the client left; nothing to report to.
        let _ = tx.send(last).await;
    });

    // The guard lives as long as the body; dropping it cancels the search.
    let guard = cancel.drop_guard();
    let lines = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        rx.recv()
            .await
            .map(|ev| (Ok::<_, Infallible>(ev.to_ndjson()), (rx, guard)))
    });

    Ok((
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(lines),
    )
        .into_response())
}
