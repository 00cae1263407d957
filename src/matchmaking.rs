use crate::models::{SessionCard, SessionStatus};
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub fn match_latency(status: SessionStatus) -> Duration {
    match status {
        SessionStatus::Live => Duration::from_millis(600),
        SessionStatus::Soon => Duration::from_millis(900),
        SessionStatus::Later => Duration::from_millis(1200),
    }
}

/// Resolves with the same session after a status-dependent delay, or `None`
/// if `cancel` fires first.
pub async fn request_match(session: SessionCard, cancel: &CancellationToken) -> Option<SessionCard> {
    let latency = match_latency(session.status);
    debug!(session = %session.id, ?latency, "matchmaking started");

    tokio::select! {
        _ = cancel.cancelled() => {
            debug!(session = %session.id, "matchmaking cancelled");
            None
        }
        _ = sleep(latency) => Some(session),
    }
}
