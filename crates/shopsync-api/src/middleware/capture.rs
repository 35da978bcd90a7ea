//! Error capture.
//!
//! Failed handler responses carry a [`CapturedError`]. The error is
//! logged with its full source chain; the body stays empty unless
//! `gateway.display_errors` is set, in which case a diagnostic is echoed.
//! Execution-time and memory-exhaustion messages are translated for shop
//! operators, everything else is shown verbatim.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::error;

use shopsync_core::error::AppError;

use crate::error::CapturedError;
use crate::state::AppState;

pub async fn error_capture(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    let Some(CapturedError(err)) = response.extensions_mut().remove::<CapturedError>() else {
        return response;
    };

    error!(
        path = %path,
        kind = %err.kind,
        error = %err,
        chain = %source_chain(&err),
        "Unhandled error in sync request"
    );

    if state.config.gateway.display_errors {
        *response.body_mut() = Body::from(translate(&err.message));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
    }
    response
}

fn source_chain(err: &AppError) -> String {
    let mut chain = Vec::new();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain.join(": ")
}

/// Operator-facing text for a captured diagnostic.
pub fn translate(message: &str) -> String {
    if let Some(seconds) = between(message, "Maximum execution time of ", " second") {
        return format!(
            "Die maximale Ausführungszeit von {seconds} Sekunden wurde überschritten. \
             Bitte erhöhen Sie das Zeitlimit des Servers oder übertragen Sie weniger Daten pro Abgleich."
        );
    }
    if let Some(bytes) = between(message, "Allowed memory size of ", " bytes exhausted") {
        return format!(
            "Der zulässige Arbeitsspeicher von {bytes} Bytes ist erschöpft. \
             Bitte erhöhen Sie das Speicherlimit des Servers oder übertragen Sie weniger Daten pro Abgleich."
        );
    }
    message.to_string()
}

fn between<'a>(message: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    let start = message.find(prefix)? + prefix.len();
    let rest = &message[start..];
    let value = &rest[..rest.find(suffix)?];
    value
        .chars()
        .all(|c| c.is_ascii_digit())
        .then_some(value)
        .filter(|v| !v.is_empty())
}
