//! Mapping of transport-layer failures into the core gateway taxonomy.

use gas_sync_core::GatewayError;

const BODY_PREVIEW_LIMIT: usize = 240;

/// Convert a ureq failure into a [`GatewayError`], keeping a short response
/// body preview for status errors.
pub(crate) fn gateway_err(err: ureq::Error) -> GatewayError {
    match err {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_string()
                .map(|body| truncate_body(&body))
                .unwrap_or_else(|_| "<unreadable response body>".to_string());
            GatewayError::Status { status, message }
        }
        ureq::Error::Transport(transport) => GatewayError::Transport(transport.to_string()),
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_PREVIEW_LIMIT {
        return trimmed.to_string();
    }
    let preview: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    format!("{preview}…")
}
