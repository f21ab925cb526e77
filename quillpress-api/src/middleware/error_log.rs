/// Error response logging
///
/// Records method, path and status of every 4xx and 5xx response: client
/// errors at `warn`, server errors at `error`. Internal detail is logged where
/// the error is rendered, so this layer never sees it.

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{error, warn};

pub async fn log_errors(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status();

    if status.is_server_error() {
        error!(%method, %path, status = status.as_u16(), "Request failed");
    } else if status.is_client_error() {
        warn!(%method, %path, status = status.as_u16(), "Request rejected");
    }

    response
}
